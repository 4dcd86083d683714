use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::snapshot::EntitySnapshot;
use crate::Vec2;

/// Unique identifier for every entity in the ecosystem.
///
/// Assigned from a monotonically increasing counter and never reused, so
/// ascending id order doubles as creation order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The species of an entity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Species {
    /// Primary producer: grows and spreads, never moves.
    Plante,
    /// Herbivore: forages plants, flees predators.
    Proie,
    /// Carnivore: hunts prey.
    Predateur,
}

/// Which behaviors a species participates in.
///
/// This is the per-species behavior table consulted by the update rules in
/// place of a class hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Eats plants.
    pub forager: bool,
    /// Eats prey.
    pub hunter: bool,
    /// Runs from predators.
    pub fleeing: bool,
    /// Moves and metabolizes.
    pub mobile: bool,
}

impl Species {
    /// Every species, in canonical order.
    pub const ALL: [Species; 3] = [Species::Plante, Species::Proie, Species::Predateur];

    /// Whether this species is an animal (moves, metabolizes, mates).
    pub fn is_animal(self) -> bool {
        self.capabilities().mobile
    }

    /// The behavior table for this species.
    pub fn capabilities(self) -> Capabilities {
        match self {
            Self::Plante => Capabilities {
                forager: false,
                hunter: false,
                fleeing: false,
                mobile: false,
            },
            Self::Proie => Capabilities {
                forager: true,
                hunter: false,
                fleeing: true,
                mobile: true,
            },
            Self::Predateur => Capabilities {
                forager: false,
                hunter: true,
                fleeing: false,
                mobile: true,
            },
        }
    }

    /// The species this one feeds on, if any.
    pub fn food(self) -> Option<Species> {
        let caps = self.capabilities();
        if caps.hunter {
            Some(Self::Proie)
        } else if caps.forager {
            Some(Self::Plante)
        } else {
            None
        }
    }

    /// Parse a species name. Accepts the canonical names and English aliases.
    pub fn parse(s: &str) -> CoreResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "plante" | "plant" => Ok(Self::Plante),
            "proie" | "prey" => Ok(Self::Proie),
            "predateur" | "prédateur" | "predator" => Ok(Self::Predateur),
            _ => Err(CoreError::UnknownSpecies(s.to_string())),
        }
    }
}

impl FromStr for Species {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plante => write!(f, "plante"),
            Self::Proie => write!(f, "proie"),
            Self::Predateur => write!(f, "predateur"),
        }
    }
}

/// What an animal is currently trying to do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BehaviorState {
    /// No target; drifting and occasionally turning.
    #[default]
    Wandering,
    /// Moving toward food.
    SeekingFood,
    /// Moving away from a predator.
    Fleeing,
    /// Moving toward a partner.
    SeekingMate,
}

impl fmt::Display for BehaviorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wandering => write!(f, "wandering"),
            Self::SeekingFood => write!(f, "seeking food"),
            Self::Fleeing => write!(f, "fleeing"),
            Self::SeekingMate => write!(f, "seeking mate"),
        }
    }
}

/// Movement and reproduction state shared by all animals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Motion {
    /// Current heading, in world units per second.
    pub velocity: Vec2,
    /// Current behavior.
    pub behavior: BehaviorState,
    /// Seconds of simulated time since this animal last reproduced.
    pub since_reproduction: f64,
}

impl Motion {
    /// A wandering animal with the given heading and a fresh reproduction timer.
    pub fn new(velocity: Vec2) -> Self {
        Self {
            velocity,
            behavior: BehaviorState::Wandering,
            since_reproduction: 0.0,
        }
    }
}

/// Species-specific state carried next to the shared entity fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "body", rename_all = "snake_case")]
pub enum Body {
    /// Stationary producer.
    Plant {
        /// Energy gained per second of simulated time.
        growth_rate: f64,
    },
    /// Mobile consumer.
    Animal(Motion),
}

impl Body {
    fn label(&self) -> &'static str {
        match self {
            Self::Plant { .. } => "plant",
            Self::Animal(_) => "animal",
        }
    }
}

/// A live inhabitant of the ecosystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Unique, never-reused identifier.
    pub id: EntityId,
    /// Species tag selecting the behavior table.
    pub species: Species,
    /// Position in world coordinates.
    pub position: Vec2,
    /// Stored energy; zero means death.
    pub energy: f64,
    /// Age in ticks.
    pub age: u64,
    /// Age in ticks at which the entity dies.
    pub max_age: u64,
    /// Species-specific state.
    #[serde(flatten)]
    pub body: Body,
}

impl Entity {
    /// Create a plant.
    pub fn plant(id: EntityId, position: Vec2, energy: f64, growth_rate: f64, max_age: u64) -> Self {
        Self {
            id,
            species: Species::Plante,
            position,
            energy,
            age: 0,
            max_age,
            body: Body::Plant { growth_rate },
        }
    }

    /// Create an animal of the given species with a starting heading.
    pub fn animal(
        id: EntityId,
        species: Species,
        position: Vec2,
        energy: f64,
        velocity: Vec2,
        max_age: u64,
    ) -> CoreResult<Self> {
        Self::with_body(
            id,
            species,
            position,
            energy,
            max_age,
            Body::Animal(Motion::new(velocity)),
        )
    }

    /// Create an entity from an explicit body, checking it matches the species.
    pub fn with_body(
        id: EntityId,
        species: Species,
        position: Vec2,
        energy: f64,
        max_age: u64,
        body: Body,
    ) -> CoreResult<Self> {
        let matches = match &body {
            Body::Plant { .. } => !species.is_animal(),
            Body::Animal(_) => species.is_animal(),
        };
        if !matches {
            return Err(CoreError::BodyMismatch {
                species: species.to_string(),
                body: body.label(),
            });
        }
        Ok(Self {
            id,
            species,
            position,
            energy,
            age: 0,
            max_age,
            body,
        })
    }

    /// Movement state, if this entity is an animal.
    pub fn motion(&self) -> Option<&Motion> {
        match &self.body {
            Body::Animal(m) => Some(m),
            Body::Plant { .. } => None,
        }
    }

    /// Mutable movement state, if this entity is an animal.
    pub fn motion_mut(&mut self) -> Option<&mut Motion> {
        match &mut self.body {
            Body::Animal(m) => Some(m),
            Body::Plant { .. } => None,
        }
    }

    /// Current velocity; plants are always at rest.
    pub fn velocity(&self) -> Vec2 {
        self.motion().map_or(Vec2::ZERO, |m| m.velocity)
    }

    /// Current behavior, for animals.
    pub fn behavior(&self) -> Option<BehaviorState> {
        self.motion().map(|m| m.behavior)
    }

    /// Growth rate, for plants.
    pub fn growth_rate(&self) -> Option<f64> {
        match self.body {
            Body::Plant { growth_rate } => Some(growth_rate),
            Body::Animal(_) => None,
        }
    }

    /// An owned, read-only copy of the fields observers care about.
    pub fn snapshot(&self) -> EntitySnapshot {
        EntitySnapshot {
            id: self.id,
            species: self.species,
            position: self.position,
            velocity: self.velocity(),
            energy: self.energy,
            age: self.age,
            behavior: self.behavior(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_id_display_and_order() {
        assert_eq!(EntityId(7).to_string(), "#7");
        assert!(EntityId(3) < EntityId(10));
    }

    #[test]
    fn species_parse_accepts_aliases() {
        assert_eq!(Species::parse("plante").unwrap(), Species::Plante);
        assert_eq!(Species::parse("Prey").unwrap(), Species::Proie);
        assert_eq!("predator".parse::<Species>().unwrap(), Species::Predateur);
        assert!(matches!(
            Species::parse("unicorn"),
            Err(CoreError::UnknownSpecies(_))
        ));
    }

    #[test]
    fn species_behavior_table() {
        assert!(!Species::Plante.is_animal());
        assert!(Species::Proie.capabilities().fleeing);
        assert!(Species::Predateur.capabilities().hunter);
        assert_eq!(Species::Proie.food(), Some(Species::Plante));
        assert_eq!(Species::Predateur.food(), Some(Species::Proie));
        assert_eq!(Species::Plante.food(), None);
    }

    #[test]
    fn animal_constructor_rejects_plants() {
        let result = Entity::animal(
            EntityId(1),
            Species::Plante,
            Vec2::ZERO,
            10.0,
            Vec2::ZERO,
            100,
        );
        assert!(matches!(result, Err(CoreError::BodyMismatch { .. })));
    }

    #[test]
    fn plant_has_no_motion() {
        let p = Entity::plant(EntityId(1), Vec2::new(5.0, 5.0), 10.0, 0.5, 100);
        assert!(p.motion().is_none());
        assert_eq!(p.velocity(), Vec2::ZERO);
        assert_eq!(p.growth_rate(), Some(0.5));
        assert!(p.behavior().is_none());
    }

    #[test]
    fn entity_serializes_with_flat_body() {
        let e = Entity::animal(
            EntityId(4),
            Species::Proie,
            Vec2::new(1.0, 2.0),
            50.0,
            Vec2::new(80.0, 0.0),
            1000,
        )
        .unwrap();
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["species"], "proie");
        assert_eq!(json["body"], "animal");
        assert_eq!(json["behavior"], "wandering");
        let back: Entity = serde_json::from_value(json).unwrap();
        assert_eq!(back, e);
    }

    #[test]
    fn snapshot_copies_fields() {
        let e = Entity::animal(
            EntityId(9),
            Species::Predateur,
            Vec2::new(3.0, 4.0),
            70.0,
            Vec2::new(-1.0, 0.0),
            500,
        )
        .unwrap();
        let snap = e.snapshot();
        assert_eq!(snap.id, EntityId(9));
        assert_eq!(snap.species, Species::Predateur);
        assert_eq!(snap.behavior, Some(BehaviorState::Wandering));
        assert_eq!(snap.velocity, Vec2::new(-1.0, 0.0));
    }
}
