use eco_core::{Species, Vec2};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ConfigError;

/// The rectangular world the entities live in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldBounds {
    /// World width in world units.
    pub width: f64,
    /// World height in world units.
    pub height: f64,
    /// Border strip animals bounce off and plants never spawn in.
    pub margin: f64,
}

impl Default for WorldBounds {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
            margin: 30.0,
        }
    }
}

impl WorldBounds {
    /// Lowest usable corner.
    pub fn min(&self) -> Vec2 {
        Vec2::new(self.margin, self.margin)
    }

    /// Highest usable corner.
    pub fn max(&self) -> Vec2 {
        Vec2::new(self.width - self.margin, self.height - self.margin)
    }

    /// Clamp a point into the usable area.
    pub fn clamp(&self, p: Vec2) -> Vec2 {
        p.clamp(self.min(), self.max())
    }

    /// Whether a point lies in the usable area.
    pub fn contains(&self, p: Vec2) -> bool {
        let (min, max) = (self.min(), self.max());
        p.x >= min.x && p.x <= max.x && p.y >= min.y && p.y <= max.y
    }

    /// The shorter world side; interaction radii must stay below it.
    pub fn smallest_side(&self) -> f64 {
        self.width.min(self.height)
    }
}

/// Number of entities seeded by a reset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitialPopulation {
    /// Plants seeded at reset.
    pub plants: usize,
    /// Prey seeded at reset.
    pub prey: usize,
    /// Predators seeded at reset.
    pub predators: usize,
}

impl Default for InitialPopulation {
    fn default() -> Self {
        Self {
            plants: 40,
            prey: 20,
            predators: 4,
        }
    }
}

impl InitialPopulation {
    /// Total seeded entities.
    pub fn total(&self) -> usize {
        self.plants + self.prey + self.predators
    }
}

/// Growth and spreading constants for plants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlantParams {
    /// Energy of a freshly seeded plant.
    pub initial_energy: f64,
    /// Energy gained per second.
    pub growth_rate: f64,
    /// Maximum stored energy.
    pub energy_cap: f64,
    /// Energy above which a plant spreads an offspring.
    pub reproduce_threshold: f64,
    /// Energy handed to (and paid for) each offspring.
    pub offspring_energy: f64,
    /// Maximum distance of an offspring from its parent.
    pub spread_radius: f64,
    /// Lifespan in ticks.
    pub max_age: u64,
}

impl Default for PlantParams {
    fn default() -> Self {
        Self {
            initial_energy: 10.0,
            growth_rate: 0.5,
            energy_cap: 30.0,
            reproduce_threshold: 25.0,
            offspring_energy: 8.0,
            spread_radius: 40.0,
            max_age: 9_000,
        }
    }
}

/// Movement, metabolism, and reproduction constants for one animal species.
///
/// Defaults come from [`AnimalParams::prey`] or [`AnimalParams::predator`];
/// a partial section in a configuration file is laid over the matching one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimalParams {
    /// Energy of a freshly seeded animal.
    pub initial_energy: f64,
    /// Maximum stored energy.
    pub max_energy: f64,
    /// Cruising speed in world units per second.
    pub speed: f64,
    /// Energy burned per second at rest.
    pub metabolic_cost: f64,
    /// Extra energy burned per second per unit of speed.
    pub movement_cost: f64,
    /// Energy above which the animal may mate.
    pub reproduce_threshold: f64,
    /// Energy each parent pays when an offspring is born.
    pub reproduction_cost: f64,
    /// Seconds that must pass between two matings.
    pub reproduction_cooldown: f64,
    /// Probability per tick that an eligible adjacent pair mates.
    pub reproduction_chance: f64,
    /// Energy of a newborn.
    pub offspring_energy: f64,
    /// Range at which food and partners are noticed.
    pub detection_radius: f64,
    /// Range at which predators are noticed (prey only).
    pub flee_radius: f64,
    /// Range at which prey is noticed (predators only).
    pub hunt_radius: f64,
    /// Distance at which two entities count as adjacent.
    pub contact_radius: f64,
    /// Probability per tick that a wandering animal picks a new heading.
    pub wander_turn_chance: f64,
    /// Lifespan in ticks.
    pub max_age: u64,
}

impl AnimalParams {
    /// Defaults for prey.
    pub fn prey() -> Self {
        Self {
            initial_energy: 100.0,
            max_energy: 100.0,
            speed: 80.0,
            metabolic_cost: 0.1,
            movement_cost: 0.01,
            reproduce_threshold: 70.0,
            reproduction_cost: 25.0,
            reproduction_cooldown: 40.0,
            reproduction_chance: 0.25,
            offspring_energy: 60.0,
            detection_radius: 100.0,
            flee_radius: 150.0,
            hunt_radius: 1.0,
            contact_radius: 20.0,
            wander_turn_chance: 0.05,
            max_age: 18_000,
        }
    }

    /// Defaults for predators.
    pub fn predator() -> Self {
        Self {
            initial_energy: 100.0,
            max_energy: 100.0,
            speed: 120.0,
            metabolic_cost: 0.35,
            movement_cost: 0.02,
            reproduce_threshold: 30.0,
            reproduction_cost: 20.0,
            reproduction_cooldown: 15.0,
            reproduction_chance: 0.25,
            offspring_energy: 60.0,
            detection_radius: 150.0,
            flee_radius: 1.0,
            hunt_radius: 150.0,
            contact_radius: 40.0,
            wander_turn_chance: 0.10,
            max_age: 18_000,
        }
    }

    /// Energy burned per second at the given speed.
    pub fn burn_rate(&self, speed: f64) -> f64 {
        self.metabolic_cost + speed * self.movement_cost
    }
}

/// An animal section as written in a configuration file, every key optional.
#[derive(Deserialize)]
struct AnimalSection {
    initial_energy: Option<f64>,
    max_energy: Option<f64>,
    speed: Option<f64>,
    metabolic_cost: Option<f64>,
    movement_cost: Option<f64>,
    reproduce_threshold: Option<f64>,
    reproduction_cost: Option<f64>,
    reproduction_cooldown: Option<f64>,
    reproduction_chance: Option<f64>,
    offspring_energy: Option<f64>,
    detection_radius: Option<f64>,
    flee_radius: Option<f64>,
    hunt_radius: Option<f64>,
    contact_radius: Option<f64>,
    wander_turn_chance: Option<f64>,
    max_age: Option<u64>,
}

impl AnimalSection {
    fn over(self, base: AnimalParams) -> AnimalParams {
        AnimalParams {
            initial_energy: self.initial_energy.unwrap_or(base.initial_energy),
            max_energy: self.max_energy.unwrap_or(base.max_energy),
            speed: self.speed.unwrap_or(base.speed),
            metabolic_cost: self.metabolic_cost.unwrap_or(base.metabolic_cost),
            movement_cost: self.movement_cost.unwrap_or(base.movement_cost),
            reproduce_threshold: self.reproduce_threshold.unwrap_or(base.reproduce_threshold),
            reproduction_cost: self.reproduction_cost.unwrap_or(base.reproduction_cost),
            reproduction_cooldown: self
                .reproduction_cooldown
                .unwrap_or(base.reproduction_cooldown),
            reproduction_chance: self.reproduction_chance.unwrap_or(base.reproduction_chance),
            offspring_energy: self.offspring_energy.unwrap_or(base.offspring_energy),
            detection_radius: self.detection_radius.unwrap_or(base.detection_radius),
            flee_radius: self.flee_radius.unwrap_or(base.flee_radius),
            hunt_radius: self.hunt_radius.unwrap_or(base.hunt_radius),
            contact_radius: self.contact_radius.unwrap_or(base.contact_radius),
            wander_turn_chance: self.wander_turn_chance.unwrap_or(base.wander_turn_chance),
            max_age: self.max_age.unwrap_or(base.max_age),
        }
    }
}

fn prey_section<'de, D: Deserializer<'de>>(deserializer: D) -> Result<AnimalParams, D::Error> {
    Ok(AnimalSection::deserialize(deserializer)?.over(AnimalParams::prey()))
}

fn predator_section<'de, D: Deserializer<'de>>(deserializer: D) -> Result<AnimalParams, D::Error> {
    Ok(AnimalSection::deserialize(deserializer)?.over(AnimalParams::predator()))
}

/// Every name accepted by [`SimConfig::set_parameter`].
pub const PARAMETER_NAMES: &[&str] = &[
    "population_cap",
    "timestep",
    "max_catch_up_ticks",
    "regrowth_interval",
    "max_plants",
    "history_capacity",
    "max_events",
    "plant.initial_energy",
    "plant.growth_rate",
    "plant.energy_cap",
    "plant.reproduce_threshold",
    "plant.offspring_energy",
    "plant.spread_radius",
    "plant.max_age",
    "prey.initial_energy",
    "prey.max_energy",
    "prey.speed",
    "prey.metabolic_cost",
    "prey.movement_cost",
    "prey.reproduce_threshold",
    "prey.reproduction_cost",
    "prey.reproduction_cooldown",
    "prey.reproduction_chance",
    "prey.offspring_energy",
    "prey.detection_radius",
    "prey.flee_radius",
    "prey.contact_radius",
    "prey.wander_turn_chance",
    "prey.max_age",
    "predator.initial_energy",
    "predator.max_energy",
    "predator.speed",
    "predator.metabolic_cost",
    "predator.movement_cost",
    "predator.reproduce_threshold",
    "predator.reproduction_cost",
    "predator.reproduction_cooldown",
    "predator.reproduction_chance",
    "predator.offspring_energy",
    "predator.detection_radius",
    "predator.hunt_radius",
    "predator.contact_radius",
    "predator.wander_turn_chance",
    "predator.max_age",
];

/// A mutable handle to one numeric parameter.
enum Field<'a> {
    Real(&'a mut f64),
    Count(&'a mut usize),
    Ticks(&'a mut u64),
    Small(&'a mut u32),
}

/// Configuration for a simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// RNG seed for deterministic simulation.
    pub seed: u64,
    /// Simulated seconds per tick.
    pub timestep: f64,
    /// Maximum ticks run in a single frame before excess time is dropped.
    pub max_catch_up_ticks: u32,
    /// Hard limit on live entities of all species.
    pub population_cap: usize,
    /// Number of per-tick stats records kept.
    pub history_capacity: usize,
    /// Maximum event log size (oldest events dropped when exceeded). 0 = unlimited.
    pub max_events: usize,
    /// World dimensions.
    pub world: WorldBounds,
    /// Population seeded by a reset.
    pub initial: InitialPopulation,
    /// Seconds between spontaneous plant appearances. 0 disables regrowth.
    pub regrowth_interval: f64,
    /// Plant count above which no new plants appear.
    pub max_plants: usize,
    /// Plant constants.
    pub plant: PlantParams,
    /// Prey constants.
    #[serde(deserialize_with = "prey_section")]
    pub prey: AnimalParams,
    /// Predator constants.
    #[serde(deserialize_with = "predator_section")]
    pub predator: AnimalParams,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            timestep: 1.0 / 30.0,
            max_catch_up_ticks: 5,
            population_cap: 1_000,
            history_capacity: 600,
            max_events: 2_000,
            world: WorldBounds::default(),
            initial: InitialPopulation::default(),
            regrowth_interval: 5.0,
            max_plants: 60,
            plant: PlantParams::default(),
            prey: AnimalParams::prey(),
            predator: AnimalParams::predator(),
        }
    }
}

impl SimConfig {
    /// Set the RNG seed for deterministic simulation.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the simulated seconds per tick.
    pub fn with_timestep(mut self, timestep: f64) -> Self {
        self.timestep = timestep;
        self
    }

    /// Set the live population cap.
    pub fn with_population_cap(mut self, cap: usize) -> Self {
        self.population_cap = cap;
        self
    }

    /// Set the population seeded at reset.
    pub fn with_initial(mut self, plants: usize, prey: usize, predators: usize) -> Self {
        self.initial = InitialPopulation {
            plants,
            prey,
            predators,
        };
        self
    }

    /// Set the world size.
    pub fn with_world(mut self, width: f64, height: f64) -> Self {
        self.world.width = width;
        self.world.height = height;
        self
    }

    /// Set the stats history length.
    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }

    /// Set the maximum event log size (0 = unlimited).
    pub fn with_max_events(mut self, max: usize) -> Self {
        self.max_events = max;
        self
    }

    /// Set the plant regrowth interval in seconds (0 disables regrowth).
    pub fn with_regrowth_interval(mut self, seconds: f64) -> Self {
        self.regrowth_interval = seconds;
        self
    }

    /// The constants for an animal species; `None` for plants.
    pub fn animal(&self, species: Species) -> Option<&AnimalParams> {
        match species {
            Species::Proie => Some(&self.prey),
            Species::Predateur => Some(&self.predator),
            Species::Plante => None,
        }
    }

    /// The largest interaction radius any rule queries; sizes spatial cells.
    pub fn max_interaction_radius(&self) -> f64 {
        [
            self.prey.detection_radius,
            self.prey.flee_radius,
            self.prey.contact_radius,
            self.predator.detection_radius,
            self.predator.hunt_radius,
            self.predator.contact_radius,
            self.plant.spread_radius,
        ]
        .into_iter()
        .fold(0.0, f64::max)
    }

    /// Read a parameter by its dotted name.
    pub fn get_parameter(&self, name: &str) -> Option<f64> {
        let mut copy = self.clone();
        let value = match copy.field(name)? {
            Field::Real(v) => *v,
            Field::Count(v) => *v as f64,
            Field::Ticks(v) => *v as f64,
            Field::Small(v) => f64::from(*v),
        };
        Some(value)
    }

    /// Change one parameter, keeping the old configuration if the result
    /// does not validate.
    pub fn set_parameter(&mut self, name: &str, value: f64) -> Result<(), ConfigError> {
        let mut candidate = self.clone();
        let field = candidate
            .field(name)
            .ok_or_else(|| ConfigError::UnknownParameter(name.to_string()))?;
        match field {
            Field::Real(v) => *v = value,
            Field::Count(v) => *v = whole(name, value)? as usize,
            Field::Ticks(v) => *v = whole(name, value)?,
            Field::Small(v) => {
                *v = u32::try_from(whole(name, value)?)
                    .map_err(|_| ConfigError::invalid(name, "value is too large"))?;
            }
        }
        candidate.validate()?;
        *self = candidate;
        Ok(())
    }

    fn field(&mut self, name: &str) -> Option<Field<'_>> {
        let field = match name {
            "population_cap" => Field::Count(&mut self.population_cap),
            "timestep" => Field::Real(&mut self.timestep),
            "max_catch_up_ticks" => Field::Small(&mut self.max_catch_up_ticks),
            "regrowth_interval" => Field::Real(&mut self.regrowth_interval),
            "max_plants" => Field::Count(&mut self.max_plants),
            "history_capacity" => Field::Count(&mut self.history_capacity),
            "max_events" => Field::Count(&mut self.max_events),
            _ => {
                let (group, key) = name.split_once('.')?;
                return match group {
                    "plant" => plant_field(&mut self.plant, key),
                    "prey" if key != "hunt_radius" => animal_field(&mut self.prey, key),
                    "predator" if key != "flee_radius" => animal_field(&mut self.predator, key),
                    _ => None,
                };
            }
        };
        Some(field)
    }

    /// Check every parameter, reporting the first one out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("timestep", self.timestep)?;
        if self.max_catch_up_ticks == 0 {
            return Err(ConfigError::invalid("max_catch_up_ticks", "must be at least 1"));
        }
        if self.population_cap == 0 {
            return Err(ConfigError::invalid("population_cap", "must be at least 1"));
        }
        if self.history_capacity == 0 {
            return Err(ConfigError::invalid("history_capacity", "must be at least 1"));
        }
        if self.initial.total() > self.population_cap {
            return Err(ConfigError::invalid(
                "initial",
                format!(
                    "seeds {} entities but population_cap is {}",
                    self.initial.total(),
                    self.population_cap
                ),
            ));
        }

        positive("world.width", self.world.width)?;
        positive("world.height", self.world.height)?;
        non_negative("world.margin", self.world.margin)?;
        if self.world.margin * 2.0 >= self.world.smallest_side() {
            return Err(ConfigError::invalid(
                "world.margin",
                "leaves no usable space inside the world",
            ));
        }

        non_negative("regrowth_interval", self.regrowth_interval)?;
        self.validate_plant()?;
        validate_animal("prey", &self.prey, &self.world, false)?;
        validate_animal("predator", &self.predator, &self.world, true)?;
        Ok(())
    }

    fn validate_plant(&self) -> Result<(), ConfigError> {
        let p = &self.plant;
        non_negative("plant.growth_rate", p.growth_rate)?;
        positive("plant.energy_cap", p.energy_cap)?;
        non_negative("plant.reproduce_threshold", p.reproduce_threshold)?;
        below_cap("plant.reproduce_threshold", p.reproduce_threshold, p.energy_cap)?;
        within_cap("plant.initial_energy", p.initial_energy, p.energy_cap)?;
        within_cap("plant.offspring_energy", p.offspring_energy, p.energy_cap)?;
        radius("plant.spread_radius", p.spread_radius, &self.world)?;
        if p.max_age == 0 {
            return Err(ConfigError::invalid("plant.max_age", "must be at least 1"));
        }
        Ok(())
    }
}

fn plant_field<'a>(p: &'a mut PlantParams, key: &str) -> Option<Field<'a>> {
    Some(match key {
        "initial_energy" => Field::Real(&mut p.initial_energy),
        "growth_rate" => Field::Real(&mut p.growth_rate),
        "energy_cap" => Field::Real(&mut p.energy_cap),
        "reproduce_threshold" => Field::Real(&mut p.reproduce_threshold),
        "offspring_energy" => Field::Real(&mut p.offspring_energy),
        "spread_radius" => Field::Real(&mut p.spread_radius),
        "max_age" => Field::Ticks(&mut p.max_age),
        _ => return None,
    })
}

fn animal_field<'a>(a: &'a mut AnimalParams, key: &str) -> Option<Field<'a>> {
    Some(match key {
        "initial_energy" => Field::Real(&mut a.initial_energy),
        "max_energy" => Field::Real(&mut a.max_energy),
        "speed" => Field::Real(&mut a.speed),
        "metabolic_cost" => Field::Real(&mut a.metabolic_cost),
        "movement_cost" => Field::Real(&mut a.movement_cost),
        "reproduce_threshold" => Field::Real(&mut a.reproduce_threshold),
        "reproduction_cost" => Field::Real(&mut a.reproduction_cost),
        "reproduction_cooldown" => Field::Real(&mut a.reproduction_cooldown),
        "reproduction_chance" => Field::Real(&mut a.reproduction_chance),
        "offspring_energy" => Field::Real(&mut a.offspring_energy),
        "detection_radius" => Field::Real(&mut a.detection_radius),
        "flee_radius" => Field::Real(&mut a.flee_radius),
        "hunt_radius" => Field::Real(&mut a.hunt_radius),
        "contact_radius" => Field::Real(&mut a.contact_radius),
        "wander_turn_chance" => Field::Real(&mut a.wander_turn_chance),
        "max_age" => Field::Ticks(&mut a.max_age),
        _ => return None,
    })
}

fn validate_animal(
    group: &str,
    a: &AnimalParams,
    world: &WorldBounds,
    hunter: bool,
) -> Result<(), ConfigError> {
    let name = |key: &str| format!("{group}.{key}");
    positive(&name("max_energy"), a.max_energy)?;
    within_cap(&name("initial_energy"), a.initial_energy, a.max_energy)?;
    within_cap(&name("offspring_energy"), a.offspring_energy, a.max_energy)?;
    non_negative(&name("speed"), a.speed)?;
    non_negative(&name("metabolic_cost"), a.metabolic_cost)?;
    non_negative(&name("movement_cost"), a.movement_cost)?;
    non_negative(&name("reproduce_threshold"), a.reproduce_threshold)?;
    below_cap(&name("reproduce_threshold"), a.reproduce_threshold, a.max_energy)?;
    non_negative(&name("reproduction_cost"), a.reproduction_cost)?;
    non_negative(&name("reproduction_cooldown"), a.reproduction_cooldown)?;
    probability(&name("reproduction_chance"), a.reproduction_chance)?;
    probability(&name("wander_turn_chance"), a.wander_turn_chance)?;
    radius(&name("detection_radius"), a.detection_radius, world)?;
    radius(&name("contact_radius"), a.contact_radius, world)?;
    if hunter {
        radius(&name("hunt_radius"), a.hunt_radius, world)?;
    } else {
        radius(&name("flee_radius"), a.flee_radius, world)?;
    }
    if a.max_age == 0 {
        return Err(ConfigError::invalid(name("max_age"), "must be at least 1"));
    }
    Ok(())
}

fn whole(name: &str, value: f64) -> Result<u64, ConfigError> {
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 {
        return Err(ConfigError::invalid(
            name,
            format!("expected a non-negative whole number, got {value}"),
        ));
    }
    Ok(value as u64)
}

fn non_negative(name: &str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::invalid(
            name,
            format!("must be a finite value >= 0, got {value}"),
        ));
    }
    Ok(())
}

fn positive(name: &str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ConfigError::invalid(
            name,
            format!("must be a finite value > 0, got {value}"),
        ));
    }
    Ok(())
}

fn probability(name: &str, value: f64) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::invalid(
            name,
            format!("must be a probability in [0, 1], got {value}"),
        ));
    }
    Ok(())
}

fn within_cap(name: &str, value: f64, cap: f64) -> Result<(), ConfigError> {
    positive(name, value)?;
    if value > cap {
        return Err(ConfigError::invalid(
            name,
            format!("{value} exceeds the energy cap of {cap}"),
        ));
    }
    Ok(())
}

/// A threshold at or above the cap can never be exceeded.
fn below_cap(name: &str, value: f64, cap: f64) -> Result<(), ConfigError> {
    if value >= cap {
        return Err(ConfigError::invalid(
            name,
            format!("{value} is not below the energy cap of {cap}"),
        ));
    }
    Ok(())
}

fn radius(name: &str, value: f64, world: &WorldBounds) -> Result<(), ConfigError> {
    positive(name, value)?;
    if value >= world.smallest_side() {
        return Err(ConfigError::invalid(
            name,
            format!(
                "{value} is not smaller than the world ({})",
                world.smallest_side()
            ),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_default_values() {
        let config = SimConfig::default();
        assert_eq!(config.seed, 42);
        assert!((config.timestep - 1.0 / 30.0).abs() < f64::EPSILON);
        assert_eq!(config.max_plants, 60);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_builder_chain() {
        let config = SimConfig::default()
            .with_seed(123)
            .with_timestep(0.5)
            .with_population_cap(50)
            .with_initial(10, 5, 1)
            .with_max_events(10);
        assert_eq!(config.seed, 123);
        assert!((config.timestep - 0.5).abs() < f64::EPSILON);
        assert_eq!(config.population_cap, 50);
        assert_eq!(config.initial.total(), 16);
        assert_eq!(config.max_events, 10);
    }

    #[test]
    fn every_listed_parameter_resolves() {
        let config = SimConfig::default();
        for name in PARAMETER_NAMES {
            assert!(
                config.get_parameter(name).is_some(),
                "parameter {name} should resolve"
            );
        }
    }

    #[test]
    fn set_parameter_updates_value() {
        let mut config = SimConfig::default();
        config.set_parameter("prey.flee_radius", 90.0).unwrap();
        assert_eq!(config.prey.flee_radius, 90.0);
        config.set_parameter("population_cap", 250.0).unwrap();
        assert_eq!(config.population_cap, 250);
    }

    #[test]
    fn set_parameter_rejects_unknown_names() {
        let mut config = SimConfig::default();
        let err = config.set_parameter("prey.wings", 1.0).unwrap_err();
        assert_eq!(err, ConfigError::UnknownParameter("prey.wings".into()));
        assert!(config.set_parameter("prey.hunt_radius", 10.0).is_err());
        assert!(config.set_parameter("predator.flee_radius", 10.0).is_err());
    }

    #[test]
    fn negative_rate_is_rejected_and_config_unchanged() {
        let mut config = SimConfig::default();
        let before = config.clone();
        let err = config.set_parameter("plant.growth_rate", -1.0).unwrap_err();
        match err {
            ConfigError::InvalidParameter { name, .. } => assert_eq!(name, "plant.growth_rate"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(config, before);
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let mut config = SimConfig::default();
        assert!(config.set_parameter("population_cap", 0.0).is_err());
        let config = SimConfig::default().with_history_capacity(0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidParameter { ref name, .. }) if name == "history_capacity"
        ));
    }

    #[test]
    fn radius_as_large_as_world_is_rejected() {
        let mut config = SimConfig::default();
        let err = config
            .set_parameter("predator.hunt_radius", 720.0)
            .unwrap_err();
        assert!(err.to_string().contains("predator.hunt_radius"));
    }

    #[test]
    fn fractional_count_is_rejected() {
        let mut config = SimConfig::default();
        assert!(config.set_parameter("population_cap", 10.5).is_err());
        assert!(config.set_parameter("max_catch_up_ticks", -1.0).is_err());
    }

    #[test]
    fn initial_population_must_fit_under_cap() {
        let config = SimConfig::default()
            .with_population_cap(10)
            .with_initial(5, 5, 5);
        assert!(config.validate().is_err());
    }

    #[test]
    fn max_interaction_radius_picks_largest() {
        let config = SimConfig::default();
        assert_eq!(config.max_interaction_radius(), 150.0);
    }

    #[test]
    fn partial_json_uses_defaults() {
        let config: SimConfig =
            serde_json::from_str(r#"{ "seed": 7, "prey": { "speed": 60.0 } }"#).unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.prey.speed, 60.0);
        assert_eq!(config.prey.flee_radius, 150.0);
        assert_eq!(config.population_cap, 1_000);
    }

    #[test]
    fn partial_predator_section_keeps_predator_defaults() {
        let config: SimConfig =
            serde_json::from_str(r#"{ "predator": { "speed": 60.0 } }"#).unwrap();
        let defaults = AnimalParams::predator();
        assert_eq!(config.predator.speed, 60.0);
        assert_eq!(config.predator.hunt_radius, defaults.hunt_radius);
        assert_eq!(config.predator.contact_radius, defaults.contact_radius);
        assert_eq!(config.predator.metabolic_cost, defaults.metabolic_cost);
        assert_eq!(config.predator.reproduce_threshold, defaults.reproduce_threshold);
        assert_eq!(config.prey, AnimalParams::prey());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn saved_config_reads_back_unchanged() {
        let mut config = SimConfig::default();
        config.predator.hunt_radius = 120.0;
        config.prey.max_age = 500;
        let json = serde_json::to_string(&config).unwrap();
        let back: SimConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn threshold_at_cap_is_rejected() {
        let mut config = SimConfig::default();
        let err = config
            .set_parameter("plant.reproduce_threshold", 30.0)
            .unwrap_err();
        assert!(err.to_string().contains("plant.reproduce_threshold"));
        let err = config
            .set_parameter("prey.reproduce_threshold", 100.0)
            .unwrap_err();
        assert!(err.to_string().contains("prey.reproduce_threshold"));
        assert!(config.set_parameter("predator.reproduce_threshold", 99.0).is_ok());
    }
}
