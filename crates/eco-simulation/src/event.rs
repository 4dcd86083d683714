use std::collections::VecDeque;
use std::fmt;

use eco_core::{EntityId, Species};
use serde::Serialize;

use crate::behavior::DeathReason;

/// What kind of ecosystem event occurred.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EcoEventKind {
    /// An entity was created by reproduction or an external spawn.
    Born {
        /// The new entity.
        id: EntityId,
        /// Its species.
        species: Species,
        /// Parents, empty for external spawns.
        parents: Vec<EntityId>,
    },
    /// An entity was removed at commit.
    Died {
        /// The removed entity.
        id: EntityId,
        /// Its species.
        species: Species,
        /// Why it died.
        cause: DeathReason,
    },
    /// One entity ate another.
    Consumed {
        /// The eater.
        consumer: EntityId,
        /// The eaten entity.
        target: EntityId,
        /// Energy transferred before clamping to the eater's cap.
        energy: f64,
    },
    /// A spawn was refused because the population was at its cap.
    SpawnDropped {
        /// Species of the offspring that was not created.
        species: Species,
        /// The entity that asked for the spawn, if any.
        initiator: Option<EntityId>,
    },
    /// A plant appeared through periodic regrowth.
    Regrowth {
        /// The new plant.
        id: EntityId,
    },
}

impl EcoEventKind {
    /// Check whether a given entity is involved in this event.
    pub fn involves(&self, entity: EntityId) -> bool {
        match self {
            Self::Born { id, parents, .. } => *id == entity || parents.contains(&entity),
            Self::Died { id, .. } | Self::Regrowth { id } => *id == entity,
            Self::Consumed {
                consumer, target, ..
            } => *consumer == entity || *target == entity,
            Self::SpawnDropped { initiator, .. } => *initiator == Some(entity),
        }
    }
}

impl fmt::Display for EcoEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Born {
                id,
                species,
                parents,
            } if parents.is_empty() => write!(f, "{species} {id} spawned"),
            Self::Born {
                id,
                species,
                parents,
            } => {
                let names: Vec<String> = parents.iter().map(ToString::to_string).collect();
                write!(f, "{species} {id} born to {}", names.join(" and "))
            }
            Self::Died { id, species, cause } => write!(f, "{species} {id} {cause}"),
            Self::Consumed {
                consumer,
                target,
                energy,
            } => write!(f, "{consumer} ate {target} (+{energy:.1})"),
            Self::SpawnDropped { species, .. } => {
                write!(f, "{species} spawn dropped at population cap")
            }
            Self::Regrowth { id } => write!(f, "plante {id} regrew"),
        }
    }
}

/// A record of something that happened during a tick's commit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EcoEvent {
    /// The tick whose commit produced this event.
    pub tick: u64,
    /// The specific kind of event that occurred.
    #[serde(flatten)]
    pub kind: EcoEventKind,
}

impl EcoEvent {
    /// Create an event for the given tick.
    pub fn new(tick: u64, kind: EcoEventKind) -> Self {
        Self { tick, kind }
    }
}

impl fmt::Display for EcoEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.tick, self.kind)
    }
}

/// Bounded log of ecosystem events, oldest dropped first.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: VecDeque<EcoEvent>,
    max_events: usize,
}

impl EventLog {
    /// Create a new event log with the given maximum capacity (0 = unlimited).
    pub fn new(max_events: usize) -> Self {
        Self {
            events: VecDeque::new(),
            max_events,
        }
    }

    /// Change the capacity, trimming the oldest events if needed.
    pub fn set_max_events(&mut self, max_events: usize) {
        self.max_events = max_events;
        self.trim();
    }

    /// Append an event, dropping the oldest events if the log exceeds its capacity.
    pub fn push(&mut self, event: EcoEvent) {
        self.events.push_back(event);
        self.trim();
    }

    fn trim(&mut self) {
        if self.max_events == 0 {
            return;
        }
        while self.events.len() > self.max_events {
            self.events.pop_front();
        }
    }

    /// Iterate over all recorded events, oldest first.
    pub fn events(&self) -> impl DoubleEndedIterator<Item = &EcoEvent> + '_ {
        self.events.iter()
    }

    /// Return all events that occurred at the given tick.
    pub fn events_at_tick(&self, tick: u64) -> Vec<&EcoEvent> {
        self.events.iter().filter(|e| e.tick == tick).collect()
    }

    /// Return all events involving the given entity.
    pub fn events_for_entity(&self, id: EntityId) -> Vec<&EcoEvent> {
        self.events.iter().filter(|e| e.kind.involves(id)).collect()
    }

    /// Return the number of recorded events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Return `true` if no events have been recorded.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Remove all recorded events.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn died(tick: u64, id: u64) -> EcoEvent {
        EcoEvent::new(
            tick,
            EcoEventKind::Died {
                id: EntityId(id),
                species: Species::Proie,
                cause: DeathReason::Starved,
            },
        )
    }

    #[test]
    fn event_log_push_and_query() {
        let mut log = EventLog::new(0);
        log.push(died(1, 4));
        assert_eq!(log.len(), 1);
        assert_eq!(log.events_at_tick(1).len(), 1);
        assert_eq!(log.events_for_entity(EntityId(4)).len(), 1);
        assert!(log.events_for_entity(EntityId(5)).is_empty());
    }

    #[test]
    fn event_log_max_events_trims() {
        let mut log = EventLog::new(2);
        for i in 0..5 {
            log.push(died(i, i));
        }
        assert_eq!(log.len(), 2);
        let ticks: Vec<u64> = log.events().map(|e| e.tick).collect();
        assert_eq!(ticks, vec![3, 4]);
    }

    #[test]
    fn shrinking_capacity_trims_immediately() {
        let mut log = EventLog::new(0);
        for i in 0..10 {
            log.push(died(i, i));
        }
        log.set_max_events(3);
        assert_eq!(log.len(), 3);
        assert_eq!(log.events().next().map(|e| e.tick), Some(7));
    }

    #[test]
    fn event_kind_involves_entity() {
        let born = EcoEventKind::Born {
            id: EntityId(10),
            species: Species::Proie,
            parents: vec![EntityId(1), EntityId(2)],
        };
        assert!(born.involves(EntityId(10)));
        assert!(born.involves(EntityId(2)));
        assert!(!born.involves(EntityId(3)));

        let eaten = EcoEventKind::Consumed {
            consumer: EntityId(1),
            target: EntityId(2),
            energy: 30.0,
        };
        assert!(eaten.involves(EntityId(1)));
        assert!(eaten.involves(EntityId(2)));

        let dropped = EcoEventKind::SpawnDropped {
            species: Species::Plante,
            initiator: None,
        };
        assert!(!dropped.involves(EntityId(1)));
    }

    #[test]
    fn event_display_reads_naturally() {
        let born = EcoEvent::new(
            3,
            EcoEventKind::Born {
                id: EntityId(10),
                species: Species::Proie,
                parents: vec![EntityId(1), EntityId(2)],
            },
        );
        assert_eq!(born.to_string(), "[3] proie #10 born to #1 and #2");
        assert_eq!(died(1, 4).to_string(), "[1] proie #4 starved");
    }

    #[test]
    fn event_serializes_flat() {
        let json = serde_json::to_value(died(2, 9)).unwrap();
        assert_eq!(json["tick"], 2);
        assert_eq!(json["kind"], "died");
        assert_eq!(json["cause"], "starved");
    }

    #[test]
    fn event_log_clear() {
        let mut log = EventLog::new(0);
        log.push(died(1, 1));
        assert!(!log.is_empty());
        log.clear();
        assert!(log.is_empty());
    }
}
