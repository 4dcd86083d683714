use std::collections::{BTreeMap, VecDeque};

use eco_core::{Entity, EntityId, Species};
use serde::{Deserialize, Serialize};

/// Counters and population figures for one committed tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickStats {
    /// The tick these figures describe.
    pub tick: u64,
    /// Live plants after commit.
    pub plants: usize,
    /// Live prey after commit.
    pub prey: usize,
    /// Live predators after commit.
    pub predators: usize,
    /// Entities created this tick.
    pub births: usize,
    /// Entities removed this tick.
    pub deaths: usize,
    /// Deaths from zero energy.
    pub starved: usize,
    /// Deaths from reaching max age.
    pub aged: usize,
    /// Plants eaten by prey.
    pub plants_consumed: usize,
    /// Prey eaten by predators.
    pub prey_consumed: usize,
    /// Spawns refused at the population cap.
    pub dropped_spawns: usize,
    /// Mean energy over all live entities (0 when empty).
    pub mean_energy: f64,
    /// Summed plant energy.
    pub plant_energy: f64,
    /// Summed prey energy.
    pub prey_energy: f64,
    /// Summed predator energy.
    pub predator_energy: f64,
}

impl TickStats {
    /// Fill the population and energy figures from the live entity map.
    pub fn census(&mut self, entities: &BTreeMap<EntityId, Entity>) {
        self.plants = 0;
        self.prey = 0;
        self.predators = 0;
        self.plant_energy = 0.0;
        self.prey_energy = 0.0;
        self.predator_energy = 0.0;
        for entity in entities.values() {
            match entity.species {
                Species::Plante => {
                    self.plants += 1;
                    self.plant_energy += entity.energy;
                }
                Species::Proie => {
                    self.prey += 1;
                    self.prey_energy += entity.energy;
                }
                Species::Predateur => {
                    self.predators += 1;
                    self.predator_energy += entity.energy;
                }
            }
        }
        let total = self.population();
        self.mean_energy = if total == 0 {
            0.0
        } else {
            (self.plant_energy + self.prey_energy + self.predator_energy) / total as f64
        };
    }

    /// Total live entities.
    pub fn population(&self) -> usize {
        self.plants + self.prey + self.predators
    }

    /// Live count for one species.
    pub fn count(&self, species: Species) -> usize {
        match species {
            Species::Plante => self.plants,
            Species::Proie => self.prey,
            Species::Predateur => self.predators,
        }
    }

    /// Summed energy for one species.
    pub fn energy(&self, species: Species) -> f64 {
        match species {
            Species::Plante => self.plant_energy,
            Species::Proie => self.prey_energy,
            Species::Predateur => self.predator_energy,
        }
    }

    /// Deaths by being eaten.
    pub fn consumed(&self) -> usize {
        self.plants_consumed + self.prey_consumed
    }
}

/// Running totals since the last reset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsTotals {
    /// Ticks recorded.
    pub ticks: u64,
    /// Entities created.
    pub births: u64,
    /// Entities removed.
    pub deaths: u64,
    /// Spawns refused at the population cap.
    pub dropped_spawns: u64,
    /// Plants eaten.
    pub plants_consumed: u64,
    /// Prey eaten.
    pub prey_consumed: u64,
}

/// An owned copy of the collector's state for observers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// Most recent tick, if any has run.
    pub current: Option<TickStats>,
    /// Retained history, oldest first.
    pub history: Vec<TickStats>,
    /// Running totals.
    pub totals: StatsTotals,
}

/// Bounded rolling history of per-tick statistics.
#[derive(Debug, Clone)]
pub struct StatsCollector {
    capacity: usize,
    history: VecDeque<TickStats>,
    totals: StatsTotals,
}

impl StatsCollector {
    /// Create a collector keeping at most `capacity` records (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            history: VecDeque::with_capacity(capacity),
            totals: StatsTotals::default(),
        }
    }

    /// Append one tick's figures, evicting the oldest record when full.
    pub fn record(&mut self, stats: TickStats) {
        self.totals.ticks += 1;
        self.totals.births += stats.births as u64;
        self.totals.deaths += stats.deaths as u64;
        self.totals.dropped_spawns += stats.dropped_spawns as u64;
        self.totals.plants_consumed += stats.plants_consumed as u64;
        self.totals.prey_consumed += stats.prey_consumed as u64;
        while self.history.len() >= self.capacity {
            self.history.pop_front();
        }
        self.history.push_back(stats);
    }

    /// Change the history length, evicting the oldest records if needed.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        while self.history.len() > self.capacity {
            self.history.pop_front();
        }
    }

    /// Forget all history and totals.
    pub fn clear(&mut self) {
        self.history.clear();
        self.totals = StatsTotals::default();
    }

    /// Most recent record.
    pub fn latest(&self) -> Option<&TickStats> {
        self.history.back()
    }

    /// Retained records, oldest first.
    pub fn history(&self) -> impl ExactSizeIterator<Item = &TickStats> + '_ {
        self.history.iter()
    }

    /// Running totals.
    pub fn totals(&self) -> &StatsTotals {
        &self.totals
    }

    /// Maximum number of retained records.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Owned copy for observers.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            current: self.latest().cloned(),
            history: self.history.iter().cloned().collect(),
            totals: self.totals.clone(),
        }
    }
}
