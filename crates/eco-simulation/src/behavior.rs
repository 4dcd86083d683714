//! Per-species update rules.
//!
//! Every rule reads one entity plus a [`Neighborhood`] and returns an
//! [`Outcome`]. Nothing here mutates shared state; the ecosystem commits
//! outcomes after the whole compute pass has finished.

use std::fmt;

use eco_core::{BehaviorState, Entity, EntityId, Motion, Species, Vec2};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::{AnimalParams, PlantParams, SimConfig, WorldBounds};
use crate::context::Neighborhood;

/// Why an entity left the ecosystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeathReason {
    /// Energy reached zero.
    Starved,
    /// Age reached the species' maximum.
    Aged,
    /// Eaten by another entity.
    Consumed,
}

impl fmt::Display for DeathReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Starved => write!(f, "starved"),
            Self::Aged => write!(f, "aged out"),
            Self::Consumed => write!(f, "consumed"),
        }
    }
}

/// The next values of an entity's own mutable fields.
#[derive(Debug, Clone, PartialEq)]
pub struct StateDelta {
    /// Position after movement.
    pub position: Vec2,
    /// Energy after growth or metabolism, before any gains from eating.
    pub energy: f64,
    /// Age after this tick.
    pub age: u64,
    /// Movement state after this tick, for animals.
    pub motion: Option<Motion>,
}

/// A request to create a new entity, resolved at commit.
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnRequest {
    /// The entity asking for the spawn.
    pub initiator: EntityId,
    /// The mating partner, for animal births.
    pub partner: Option<EntityId>,
    /// Species of the offspring.
    pub species: Species,
    /// Where the offspring appears.
    pub position: Vec2,
    /// Initial heading of the offspring.
    pub velocity: Vec2,
    /// Energy the offspring starts with.
    pub energy: f64,
    /// Energy each parent pays if the spawn succeeds.
    pub parent_cost: f64,
}

/// Everything one entity's update produced for the current tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    /// The entity's own next state.
    pub delta: StateDelta,
    /// Offspring to create, if any.
    pub spawn: Option<SpawnRequest>,
    /// Entity this one is trying to eat.
    pub consume: Option<EntityId>,
    /// Death declared by the entity's own rule.
    pub death: Option<DeathReason>,
}

impl Outcome {
    fn unchanged(entity: &Entity) -> Self {
        Self {
            delta: StateDelta {
                position: entity.position,
                energy: entity.energy,
                age: entity.age.saturating_add(1),
                motion: entity.motion().cloned(),
            },
            spawn: None,
            consume: None,
            death: None,
        }
    }
}

/// Vectors shorter than this have no usable direction.
const MIN_DIRECTION: f64 = 0.01;

/// Unit vectors for the eight compass headings wandering animals choose from.
const COMPASS: [(f64, f64); 8] = [
    (1.0, 0.0),
    (std::f64::consts::FRAC_1_SQRT_2, std::f64::consts::FRAC_1_SQRT_2),
    (0.0, 1.0),
    (-std::f64::consts::FRAC_1_SQRT_2, std::f64::consts::FRAC_1_SQRT_2),
    (-1.0, 0.0),
    (-std::f64::consts::FRAC_1_SQRT_2, -std::f64::consts::FRAC_1_SQRT_2),
    (0.0, -1.0),
    (std::f64::consts::FRAC_1_SQRT_2, -std::f64::consts::FRAC_1_SQRT_2),
];

/// A random compass heading at the given speed.
pub fn random_heading<R: Rng + ?Sized>(rng: &mut R, speed: f64) -> Vec2 {
    let (x, y) = COMPASS[rng.random_range(0..COMPASS.len())];
    Vec2::new(x, y) * speed
}

/// Run the update rule for the entity's species.
pub fn update<R: Rng + ?Sized>(
    entity: &Entity,
    config: &SimConfig,
    dt: f64,
    hood: &Neighborhood<'_>,
    rng: &mut R,
) -> Outcome {
    match entity.species {
        Species::Plante => update_plant(entity, &config.plant, &config.world, dt, rng),
        Species::Proie => update_animal(entity, &config.prey, &config.world, dt, hood, rng),
        Species::Predateur => {
            update_animal(entity, &config.predator, &config.world, dt, hood, rng)
        }
    }
}

fn update_plant<R: Rng + ?Sized>(
    plant: &Entity,
    params: &PlantParams,
    world: &WorldBounds,
    dt: f64,
    rng: &mut R,
) -> Outcome {
    let mut outcome = Outcome::unchanged(plant);
    let growth = plant.growth_rate().unwrap_or(params.growth_rate);
    let energy = (plant.energy + growth * dt).min(params.energy_cap);
    outcome.delta.energy = energy;

    if energy > params.reproduce_threshold {
        let angle = rng.random_range(0.0..std::f64::consts::TAU);
        let distance = params.spread_radius * rng.random::<f64>().sqrt();
        let offset = Vec2::new(angle.cos(), angle.sin()) * distance;
        outcome.spawn = Some(SpawnRequest {
            initiator: plant.id,
            partner: None,
            species: Species::Plante,
            position: world.clamp(plant.position + offset),
            velocity: Vec2::ZERO,
            energy: params.offspring_energy,
            parent_cost: params.offspring_energy,
        });
    }

    outcome.death = declare_death(energy, outcome.delta.age, plant.max_age);
    outcome
}

/// Whether an animal may start a mating this tick.
fn ready_to_mate(animal: &Entity, params: &AnimalParams) -> bool {
    animal.energy > params.reproduce_threshold
        && animal
            .motion()
            .is_some_and(|m| m.since_reproduction >= params.reproduction_cooldown)
}

fn update_animal<R: Rng + ?Sized>(
    animal: &Entity,
    params: &AnimalParams,
    world: &WorldBounds,
    dt: f64,
    hood: &Neighborhood<'_>,
    rng: &mut R,
) -> Outcome {
    let mut outcome = Outcome::unchanged(animal);
    let Some(mut motion) = animal.motion().cloned() else {
        return outcome;
    };
    let caps = animal.species.capabilities();
    let here = animal.position;
    let ready = ready_to_mate(animal, params);
    let eligible = |e: &Entity| ready_to_mate(e, params);

    let threat = if caps.fleeing {
        hood.nearest(here, params.flee_radius, Species::Predateur, animal.id, |_| true)
    } else {
        None
    };
    let mate = if ready && threat.is_none() {
        hood.nearest(here, params.detection_radius, animal.species, animal.id, eligible)
    } else {
        None
    };
    let food_radius = if caps.hunter {
        params.hunt_radius
    } else {
        params.detection_radius
    };
    let food = match (threat, mate, animal.species.food()) {
        (None, None, Some(species)) => hood.nearest(here, food_radius, species, animal.id, |_| true),
        _ => None,
    };

    if let Some(threat) = threat {
        motion.behavior = BehaviorState::Fleeing;
        motion.velocity = steer(here - threat.position, motion.velocity, params.speed, rng);
    } else if let Some(mate) = mate {
        motion.behavior = BehaviorState::SeekingMate;
        motion.velocity = steer(mate.position - here, motion.velocity, params.speed, rng);
    } else if let Some(food) = food {
        motion.behavior = BehaviorState::SeekingFood;
        motion.velocity = steer(food.position - here, motion.velocity, params.speed, rng);
        if food.position.distance(here) <= params.contact_radius {
            outcome.consume = Some(food.id);
        }
    } else {
        let settled = motion.behavior == BehaviorState::Wandering
            && unit(motion.velocity).is_some();
        motion.behavior = BehaviorState::Wandering;
        if !settled || rng.random_bool(params.wander_turn_chance) {
            motion.velocity = random_heading(rng, params.speed);
        }
    }

    let partner = if ready {
        hood.nearest(here, params.contact_radius, animal.species, animal.id, eligible)
            .filter(|_| rng.random_bool(params.reproduction_chance))
    } else {
        None
    };
    if let Some(partner) = partner {
        outcome.spawn = Some(SpawnRequest {
            initiator: animal.id,
            partner: Some(partner.id),
            species: animal.species,
            position: world.clamp((here + partner.position) * 0.5),
            velocity: random_heading(rng, params.speed),
            energy: params.offspring_energy,
            parent_cost: params.reproduction_cost,
        });
    }

    let (position, velocity) = bounce(here + motion.velocity * dt, motion.velocity, world);
    motion.velocity = velocity;
    motion.since_reproduction += dt;

    let energy = animal.energy - params.burn_rate(velocity.length()) * dt;
    outcome.delta.position = position;
    outcome.delta.energy = energy.max(0.0);
    outcome.delta.motion = Some(motion);
    outcome.death = declare_death(energy, outcome.delta.age, animal.max_age);
    outcome
}

/// Full-speed heading along `direction`, keeping the current heading when
/// the direction is degenerate (and picking a random one if that is too).
fn steer<R: Rng + ?Sized>(direction: Vec2, current: Vec2, speed: f64, rng: &mut R) -> Vec2 {
    match unit(direction).or_else(|| unit(current)) {
        Some(unit) => unit * speed,
        None => random_heading(rng, speed),
    }
}

/// Direction of `v`, or `None` when it is too short to point anywhere.
fn unit(v: Vec2) -> Option<Vec2> {
    (v.length() > MIN_DIRECTION).then(|| v.normalize())
}

/// Reflect a moved point off the usable area's edges.
fn bounce(mut position: Vec2, mut velocity: Vec2, world: &WorldBounds) -> (Vec2, Vec2) {
    let (min, max) = (world.min(), world.max());
    if position.x < min.x || position.x > max.x {
        velocity.x = -velocity.x;
    }
    if position.y < min.y || position.y > max.y {
        velocity.y = -velocity.y;
    }
    position = world.clamp(position);
    (position, velocity)
}

fn declare_death(energy: f64, age: u64, max_age: u64) -> Option<DeathReason> {
    if energy <= 0.0 {
        Some(DeathReason::Starved)
    } else if age >= max_age {
        Some(DeathReason::Aged)
    } else {
        None
    }
}
