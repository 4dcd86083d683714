use std::collections::{BTreeMap, BTreeSet};

use eco_core::{Body, Entity, EntityId, EntitySnapshot, Motion, Species, Vec2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, trace, warn};

use crate::behavior::{self, DeathReason, Outcome, SpawnRequest};
use crate::config::SimConfig;
use crate::context::Neighborhood;
use crate::error::{ConfigError, SimError, SimResult};
use crate::event::{EcoEvent, EcoEventKind, EventLog};
use crate::spatial::SpatialIndex;
use crate::stats::{StatsCollector, TickStats};

/// Salt separating the regrowth stream from per-entity streams.
const REGROWTH_STREAM: u64 = u64::MAX;
/// Salt separating external spawn headings from per-entity streams.
const SPAWN_STREAM: u64 = u64::MAX - 1;

/// Deterministic RNG for one `(seed, tick, stream)` triple.
///
/// Every entity draws from its own stream each tick, so an entity's outcome
/// never depends on which entities were updated before it.
fn stream_rng(seed: u64, tick: u64, stream: u64) -> StdRng {
    let mut x = seed;
    for part in [tick, stream] {
        x = splitmix64(x ^ splitmix64(part));
    }
    StdRng::seed_from_u64(x)
}

fn splitmix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D4_9BB1_3311_3EB);
    z ^ (z >> 31)
}

/// Owns every live entity and advances them one tick at a time.
///
/// A tick runs in three phases. The index phase rebuilds the
/// [`SpatialIndex`]. The compute phase asks every entity, in ascending id
/// order, for an [`Outcome`] against a read-only [`Neighborhood`]. The commit
/// phase resolves claims, spawns and deaths in a fixed order and records
/// statistics. Only the commit phase changes entity state.
pub struct Ecosysteme {
    config: SimConfig,
    entities: BTreeMap<EntityId, Entity>,
    index: SpatialIndex,
    next_id: u64,
    tick: u64,
    regrowth_timer: f64,
    stats: StatsCollector,
    events: EventLog,
    pending: TickStats,
}

impl std::fmt::Debug for Ecosysteme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ecosysteme")
            .field("tick", &self.tick)
            .field("population", &self.entities.len())
            .field("next_id", &self.next_id)
            .field("events", &self.events.len())
            .finish()
    }
}

impl Ecosysteme {
    /// Validate the configuration and seed the initial population.
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut eco = Self::bare(config);
        eco.seed_population();
        Ok(eco)
    }

    fn bare(config: SimConfig) -> Self {
        let index = SpatialIndex::new(config.max_interaction_radius());
        let stats = StatsCollector::new(config.history_capacity);
        let events = EventLog::new(config.max_events);
        Self {
            config,
            entities: BTreeMap::new(),
            index,
            next_id: 1,
            tick: 0,
            regrowth_timer: 0.0,
            stats,
            events,
            pending: TickStats::default(),
        }
    }

    /// Rebuild an ecosystem from saved parts, checking its invariants.
    pub fn restore(
        config: SimConfig,
        tick: u64,
        next_id: u64,
        regrowth_timer: f64,
        entities: Vec<Entity>,
    ) -> SimResult<Self> {
        config.validate()?;
        if entities.len() > config.population_cap {
            return Err(SimError::CorruptState(format!(
                "{} entities exceed population_cap {}",
                entities.len(),
                config.population_cap
            )));
        }
        if !regrowth_timer.is_finite() || regrowth_timer < 0.0 {
            return Err(SimError::CorruptState(format!(
                "invalid regrowth timer {regrowth_timer}"
            )));
        }
        let mut eco = Self::bare(config);
        eco.tick = tick;
        eco.next_id = next_id;
        eco.regrowth_timer = regrowth_timer;
        for entity in entities {
            let entity = Entity::with_body(
                entity.id,
                entity.species,
                entity.position,
                entity.energy,
                entity.max_age,
                entity.body,
            )
            .map(|fresh| Entity {
                age: entity.age,
                ..fresh
            })?;
            if entity.id.0 >= next_id {
                return Err(SimError::CorruptState(format!(
                    "entity {} is not below next_id {next_id}",
                    entity.id
                )));
            }
            if !entity.energy.is_finite() || entity.energy <= 0.0 {
                return Err(SimError::CorruptState(format!(
                    "entity {} has invalid energy {}",
                    entity.id, entity.energy
                )));
            }
            if !entity.position.x.is_finite() || !entity.position.y.is_finite() {
                return Err(SimError::CorruptState(format!(
                    "entity {} has a non-finite position",
                    entity.id
                )));
            }
            let id = entity.id;
            if eco.entities.insert(id, entity).is_some() {
                return Err(SimError::CorruptState(format!("duplicate entity id {id}")));
            }
        }
        eco.reindex();
        info!(tick, population = eco.entities.len(), "ecosystem restored");
        Ok(eco)
    }

    /// Discard every entity and reseed the world with a new seed.
    pub fn reset(&mut self, seed: u64) {
        self.config.seed = seed;
        self.entities.clear();
        self.index.clear();
        self.next_id = 1;
        self.tick = 0;
        self.regrowth_timer = 0.0;
        self.stats.clear();
        self.events.clear();
        self.pending = TickStats::default();
        self.seed_population();
        info!(seed, population = self.entities.len(), "ecosystem reset");
    }

    fn seed_population(&mut self) {
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let initial = self.config.initial.clone();
        let groups = [
            (Species::Plante, initial.plants),
            (Species::Proie, initial.prey),
            (Species::Predateur, initial.predators),
        ];
        for (species, count) in groups {
            for _ in 0..count {
                let position = self.random_position(&mut rng);
                let entity = self.fresh_entity(species, position, &mut rng);
                self.insert(entity);
            }
        }
        self.reindex();
    }

    fn random_position<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec2 {
        let (min, max) = (self.config.world.min(), self.config.world.max());
        Vec2::new(
            rng.random_range(min.x..=max.x),
            rng.random_range(min.y..=max.y),
        )
    }

    /// Build an entity with species defaults and a random heading.
    fn fresh_entity<R: Rng + ?Sized>(
        &mut self,
        species: Species,
        position: Vec2,
        rng: &mut R,
    ) -> Entity {
        match self.config.animal(species) {
            Some(params) => {
                let (energy, speed) = (params.initial_energy, params.speed);
                self.make_entity(species, position, energy, behavior::random_heading(rng, speed))
            }
            None => self.make_entity(species, position, self.config.plant.initial_energy, Vec2::ZERO),
        }
    }

    /// Build an entity with the next id; plants ignore `velocity`.
    fn make_entity(&mut self, species: Species, position: Vec2, energy: f64, velocity: Vec2) -> Entity {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        match self.config.animal(species) {
            Some(params) => Entity {
                id,
                species,
                position,
                energy,
                age: 0,
                max_age: params.max_age,
                body: Body::Animal(Motion::new(velocity)),
            },
            None => {
                let plant = &self.config.plant;
                Entity::plant(id, position, energy, plant.growth_rate, plant.max_age)
            }
        }
    }

    fn insert(&mut self, entity: Entity) {
        self.index.insert_or_update(entity.id, entity.position);
        self.entities.insert(entity.id, entity);
    }

    fn reindex(&mut self) {
        let cell = self.config.max_interaction_radius();
        self.index
            .rebuild(cell, self.entities.values().map(|e| (e.id, e.position)));
    }

    /// Mutable access for internal mutation paths.
    ///
    /// An id missing from the collection means a stale id leaked across a
    /// tick boundary: debug builds stop here, release builds ignore it.
    fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        let found = self.entities.get_mut(&id);
        debug_assert!(found.is_some(), "stale entity id {id}");
        if found.is_none() {
            warn!(%id, "ignoring stale entity id");
        }
        found
    }

    /// Add an entity from outside the tick loop.
    ///
    /// The position is clamped into the world. Returns `None` when the
    /// population is at its cap; the drop is counted in the next tick's
    /// statistics.
    pub fn spawn_entity(&mut self, species: Species, position: Vec2) -> SimResult<Option<EntityId>> {
        if !position.x.is_finite() || !position.y.is_finite() {
            return Err(SimError::InvalidPosition {
                x: position.x,
                y: position.y,
            });
        }
        if self.entities.len() >= self.config.population_cap {
            self.pending.dropped_spawns += 1;
            self.events.push(EcoEvent::new(
                self.tick,
                EcoEventKind::SpawnDropped {
                    species,
                    initiator: None,
                },
            ));
            debug!(%species, "spawn dropped at population cap");
            return Ok(None);
        }
        let mut rng = stream_rng(self.config.seed, self.tick, SPAWN_STREAM ^ self.next_id);
        let position = self.config.world.clamp(position);
        let entity = self.fresh_entity(species, position, &mut rng);
        let id = entity.id;
        self.insert(entity);
        self.pending.births += 1;
        self.events.push(EcoEvent::new(
            self.tick,
            EcoEventKind::Born {
                id,
                species,
                parents: Vec::new(),
            },
        ));
        trace!(%id, %species, "entity spawned");
        Ok(Some(id))
    }

    /// Change one parameter by name. The old value stays if validation fails.
    ///
    /// The population cap cannot drop below the live population.
    pub fn set_parameter(&mut self, name: &str, value: f64) -> Result<(), ConfigError> {
        let live = self.entities.len();
        if name == "population_cap" && value < live as f64 {
            return Err(ConfigError::invalid(
                name,
                format!("{value} is below the live population of {live}"),
            ));
        }
        self.config.set_parameter(name, value)?;
        match name {
            "plant.growth_rate" => {
                for entity in self.entities.values_mut() {
                    if let Body::Plant { growth_rate } = &mut entity.body {
                        *growth_rate = value;
                    }
                }
            }
            "history_capacity" => self.stats.set_capacity(self.config.history_capacity),
            "max_events" => self.events.set_max_events(self.config.max_events),
            _ => {}
        }
        info!(name, value, "parameter changed");
        Ok(())
    }

    /// Run `n` ticks back to back.
    pub fn run(&mut self, n: u64) {
        for _ in 0..n {
            self.tick();
        }
    }

    /// Advance the whole ecosystem by one timestep.
    pub fn tick(&mut self) {
        self.tick += 1;
        let tick = self.tick;
        let dt = self.config.timestep;

        self.reindex();

        let outcomes: BTreeMap<EntityId, Outcome> = {
            let hood = Neighborhood::new(&self.entities, &self.index);
            let seed = self.config.seed;
            self.entities
                .values()
                .map(|entity| {
                    let mut rng = stream_rng(seed, tick, entity.id.0);
                    let outcome = behavior::update(entity, &self.config, dt, &hood, &mut rng);
                    (entity.id, outcome)
                })
                .collect()
        };

        self.commit(tick, dt, outcomes);
    }

    fn commit(&mut self, tick: u64, dt: f64, mut outcomes: BTreeMap<EntityId, Outcome>) {
        let mut stats = std::mem::take(&mut self.pending);
        stats.tick = tick;

        // Deaths declared by an entity's own rule void its claims and spawns.
        let mut dead: BTreeMap<EntityId, DeathReason> = BTreeMap::new();
        for (&id, outcome) in &mut outcomes {
            if let Some(reason) = outcome.death {
                dead.insert(id, reason);
                outcome.consume = None;
                outcome.spawn = None;
            }
        }

        // Hunters resolve before foragers; within a species the lower id wins.
        let mut gains: BTreeMap<EntityId, f64> = BTreeMap::new();
        for eater in [Species::Predateur, Species::Proie] {
            for (&id, outcome) in &outcomes {
                let Some(target) = outcome.consume else {
                    continue;
                };
                if dead.contains_key(&id) || self.species_of(id) != Some(eater) {
                    continue;
                }
                let Some(prey) = self.entities.get(&target) else {
                    continue;
                };
                if dead.contains_key(&target) || Some(prey.species) != eater.food() {
                    continue;
                }
                let energy = prey.energy;
                dead.insert(target, DeathReason::Consumed);
                *gains.entry(id).or_default() += energy;
                match prey.species {
                    Species::Plante => stats.plants_consumed += 1,
                    _ => stats.prey_consumed += 1,
                }
                self.events.push(EcoEvent::new(
                    tick,
                    EcoEventKind::Consumed {
                        consumer: id,
                        target,
                        energy,
                    },
                ));
            }
        }

        // Survivors take their computed state plus whatever they ate.
        let mut spawns: Vec<SpawnRequest> = Vec::new();
        for (id, outcome) in outcomes {
            if let Some(spawn) = outcome.spawn {
                spawns.push(spawn);
            }
            if dead.contains_key(&id) {
                continue;
            }
            let cap = self.energy_cap(id);
            let gain = gains.get(&id).copied().unwrap_or(0.0);
            let Some(entity) = self.entity_mut(id) else {
                continue;
            };
            entity.position = outcome.delta.position;
            entity.age = outcome.delta.age;
            entity.energy = (outcome.delta.energy + gain).min(cap);
            if let (Some(slot), Some(motion)) = (entity.motion_mut(), outcome.delta.motion) {
                *slot = motion;
            }
            self.index.insert_or_update(id, outcome.delta.position);
        }

        self.commit_spawns(tick, spawns, &dead, &mut stats);
        self.regrow(tick, dt, &dead, &mut stats);

        for (&id, entity) in &mut self.entities {
            if !dead.contains_key(&id) && entity.energy <= 0.0 {
                entity.energy = 0.0;
                dead.insert(id, DeathReason::Starved);
            }
        }

        for (id, reason) in dead {
            self.index.remove(id);
            let Some(entity) = self.entities.remove(&id) else {
                continue;
            };
            stats.deaths += 1;
            match reason {
                DeathReason::Starved => stats.starved += 1,
                DeathReason::Aged => stats.aged += 1,
                DeathReason::Consumed => {}
            }
            trace!(%id, species = %entity.species, %reason, "entity died");
            self.events.push(EcoEvent::new(
                tick,
                EcoEventKind::Died {
                    id,
                    species: entity.species,
                    cause: reason,
                },
            ));
        }

        stats.census(&self.entities);
        debug!(
            tick,
            population = stats.population(),
            births = stats.births,
            deaths = stats.deaths,
            dropped = stats.dropped_spawns,
            cells = self.index.cell_count(),
            "tick committed"
        );
        self.stats.record(stats);
    }

    fn commit_spawns(
        &mut self,
        tick: u64,
        mut spawns: Vec<SpawnRequest>,
        dead: &BTreeMap<EntityId, DeathReason>,
        stats: &mut TickStats,
    ) {
        spawns.sort_by_key(|s| s.initiator);
        let mut mated: BTreeSet<EntityId> = BTreeSet::new();
        let mut live = self.entities.len() - dead.len();
        let mut plants = self
            .entities
            .values()
            .filter(|e| e.species == Species::Plante && !dead.contains_key(&e.id))
            .count();

        for spawn in spawns {
            if dead.contains_key(&spawn.initiator) || mated.contains(&spawn.initiator) {
                continue;
            }
            if let Some(partner) = spawn.partner {
                if dead.contains_key(&partner)
                    || mated.contains(&partner)
                    || !self.entities.contains_key(&partner)
                {
                    continue;
                }
            }
            if spawn.species == Species::Plante && plants >= self.config.max_plants {
                continue;
            }
            if live >= self.config.population_cap {
                stats.dropped_spawns += 1;
                self.events.push(EcoEvent::new(
                    tick,
                    EcoEventKind::SpawnDropped {
                        species: spawn.species,
                        initiator: Some(spawn.initiator),
                    },
                ));
                continue;
            }

            let mut parents = vec![spawn.initiator];
            parents.extend(spawn.partner);
            for &parent in &parents {
                if let Some(entity) = self.entity_mut(parent) {
                    entity.energy -= spawn.parent_cost;
                    if let Some(motion) = entity.motion_mut() {
                        motion.since_reproduction = 0.0;
                    }
                }
                mated.insert(parent);
            }

            let child = self.make_entity(spawn.species, spawn.position, spawn.energy, spawn.velocity);
            let id = child.id;
            self.insert(child);
            live += 1;
            if spawn.species == Species::Plante {
                plants += 1;
            }
            stats.births += 1;
            trace!(%id, species = %spawn.species, "entity born");
            self.events.push(EcoEvent::new(
                tick,
                EcoEventKind::Born {
                    id,
                    species: spawn.species,
                    parents,
                },
            ));
        }
    }

    /// Seed a plant every `regrowth_interval` seconds while below `max_plants`.
    fn regrow(
        &mut self,
        tick: u64,
        dt: f64,
        dead: &BTreeMap<EntityId, DeathReason>,
        stats: &mut TickStats,
    ) {
        let interval = self.config.regrowth_interval;
        if interval <= 0.0 {
            return;
        }
        self.regrowth_timer += dt;
        let mut rng = stream_rng(self.config.seed, tick, REGROWTH_STREAM);
        while self.regrowth_timer >= interval {
            self.regrowth_timer -= interval;
            let live = self.entities.len() - dead.len();
            let plants = self
                .entities
                .values()
                .filter(|e| e.species == Species::Plante && !dead.contains_key(&e.id))
                .count();
            if plants >= self.config.max_plants {
                continue;
            }
            if live >= self.config.population_cap {
                stats.dropped_spawns += 1;
                self.events.push(EcoEvent::new(
                    tick,
                    EcoEventKind::SpawnDropped {
                        species: Species::Plante,
                        initiator: None,
                    },
                ));
                continue;
            }
            let position = self.random_position(&mut rng);
            let plant = self.fresh_entity(Species::Plante, position, &mut rng);
            let id = plant.id;
            self.insert(plant);
            stats.births += 1;
            self.events.push(EcoEvent::new(tick, EcoEventKind::Regrowth { id }));
        }
    }

    fn species_of(&self, id: EntityId) -> Option<Species> {
        self.entities.get(&id).map(|e| e.species)
    }

    fn energy_cap(&self, id: EntityId) -> f64 {
        match self.species_of(id).and_then(|s| self.config.animal(s)) {
            Some(params) => params.max_energy,
            None => self.config.plant.energy_cap,
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Ticks committed since the last reset.
    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    /// The id the next created entity will receive.
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    /// Simulated seconds accumulated toward the next regrowth.
    pub fn regrowth_timer(&self) -> f64 {
        self.regrowth_timer
    }

    /// Live population.
    pub fn population(&self) -> usize {
        self.entities.len()
    }

    /// Live count of one species.
    pub fn count(&self, species: Species) -> usize {
        self.entities.values().filter(|e| e.species == species).count()
    }

    /// Look up a live entity.
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Live entities in ascending id order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.entities.values()
    }

    /// Owned snapshots of every live entity, ascending by id.
    pub fn snapshot(&self) -> Vec<EntitySnapshot> {
        self.entities.values().map(Entity::snapshot).collect()
    }

    /// Ids of the live entities.
    pub fn live_ids(&self) -> BTreeSet<EntityId> {
        self.entities.keys().copied().collect()
    }

    /// Ids currently held by the spatial index.
    pub fn index_ids(&self) -> BTreeSet<EntityId> {
        self.index.ids().collect()
    }

    /// Collected statistics.
    pub fn stats(&self) -> &StatsCollector {
        &self.stats
    }

    /// Spawns dropped at the population cap, including ones not yet folded
    /// into a committed tick.
    pub fn dropped_spawns(&self) -> u64 {
        self.stats.totals().dropped_spawns + self.pending.dropped_spawns as u64
    }

    /// The event log.
    pub fn events(&self) -> &EventLog {
        &self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet_config() -> SimConfig {
        SimConfig::default()
            .with_initial(0, 0, 0)
            .with_regrowth_interval(0.0)
    }

    #[test]
    fn new_seeds_initial_population() {
        let eco = Ecosysteme::new(SimConfig::default()).unwrap();
        assert_eq!(eco.count(Species::Plante), 40);
        assert_eq!(eco.count(Species::Proie), 20);
        assert_eq!(eco.count(Species::Predateur), 4);
        assert_eq!(eco.next_id(), 65);
        assert_eq!(eco.index_ids(), eco.live_ids());
        for e in eco.entities() {
            assert!(eco.config().world.contains(e.position));
        }
    }

    #[test]
    fn new_rejects_invalid_config() {
        let config = SimConfig::default().with_timestep(0.0);
        assert!(matches!(
            Ecosysteme::new(config),
            Err(ConfigError::InvalidParameter { ref name, .. }) if name == "timestep"
        ));
    }

    #[test]
    fn ids_are_never_reused() {
        let mut eco = Ecosysteme::new(quiet_config()).unwrap();
        eco.set_parameter("prey.max_age", 1.0).unwrap();
        let a = eco
            .spawn_entity(Species::Proie, Vec2::new(100.0, 100.0))
            .unwrap()
            .unwrap();
        eco.tick();
        assert!(eco.entity(a).is_none());
        let b = eco
            .spawn_entity(Species::Proie, Vec2::new(200.0, 200.0))
            .unwrap()
            .unwrap();
        assert_eq!(b, EntityId(a.0 + 1));
    }

    #[test]
    fn spawn_clamps_into_world() {
        let mut eco = Ecosysteme::new(quiet_config()).unwrap();
        let id = eco
            .spawn_entity(Species::Plante, Vec2::new(-50.0, 5_000.0))
            .unwrap()
            .unwrap();
        let pos = eco.entity(id).unwrap().position;
        assert!(eco.config().world.contains(pos));
    }

    #[test]
    fn spawn_rejects_nan_position() {
        let mut eco = Ecosysteme::new(quiet_config()).unwrap();
        let err = eco
            .spawn_entity(Species::Plante, Vec2::new(f64::NAN, 0.0))
            .unwrap_err();
        assert!(matches!(err, SimError::InvalidPosition { .. }));
        assert_eq!(eco.population(), 0);
    }

    #[test]
    fn reset_is_reproducible() {
        let mut eco = Ecosysteme::new(SimConfig::default().with_seed(5)).unwrap();
        eco.run(30);
        eco.reset(9);
        let fresh = Ecosysteme::new(SimConfig::default().with_seed(9)).unwrap();
        assert_eq!(eco.snapshot(), fresh.snapshot());
        assert_eq!(eco.current_tick(), 0);
        assert!(eco.stats().latest().is_none());
    }

    #[test]
    fn growth_rate_change_reaches_existing_plants() {
        let mut eco = Ecosysteme::new(quiet_config()).unwrap();
        let id = eco
            .spawn_entity(Species::Plante, Vec2::new(300.0, 300.0))
            .unwrap()
            .unwrap();
        eco.set_parameter("plant.growth_rate", 2.0).unwrap();
        assert_eq!(eco.entity(id).unwrap().growth_rate(), Some(2.0));
    }

    #[test]
    fn invalid_parameter_keeps_config() {
        let mut eco = Ecosysteme::new(quiet_config()).unwrap();
        let before = eco.config().clone();
        assert!(eco.set_parameter("prey.metabolic_cost", -0.5).is_err());
        assert_eq!(eco.config(), &before);
    }

    #[test]
    fn regrowth_adds_plants_on_interval() {
        let config = quiet_config()
            .with_timestep(1.0)
            .with_regrowth_interval(5.0);
        let mut eco = Ecosysteme::new(config).unwrap();
        eco.run(4);
        assert_eq!(eco.count(Species::Plante), 0);
        eco.tick();
        assert_eq!(eco.count(Species::Plante), 1);
        assert_eq!(eco.stats().latest().unwrap().births, 1);
    }

    #[test]
    fn mating_pair_produces_one_offspring() {
        let mut config = quiet_config().with_timestep(0.1);
        config.prey.reproduction_chance = 1.0;
        config.prey.reproduction_cooldown = 0.0;
        config.prey.initial_energy = 90.0;
        let mut eco = Ecosysteme::new(config).unwrap();
        let a = eco
            .spawn_entity(Species::Proie, Vec2::new(400.0, 400.0))
            .unwrap()
            .unwrap();
        let b = eco
            .spawn_entity(Species::Proie, Vec2::new(405.0, 400.0))
            .unwrap()
            .unwrap();
        eco.tick();
        assert_eq!(eco.count(Species::Proie), 3);
        let latest = eco.stats().latest().unwrap();
        assert_eq!(latest.births, 3, "two external spawns plus one offspring");
        let cost = eco.config().prey.reproduction_cost;
        for parent in [a, b] {
            let e = eco.entity(parent).unwrap();
            assert!(e.energy < 90.0 - cost + 1e-9);
            assert_eq!(e.motion().unwrap().since_reproduction, 0.0);
        }
    }

    #[test]
    fn plant_reproduction_respects_max_plants() {
        let mut config = quiet_config().with_timestep(1.0);
        config.max_plants = 1;
        config.plant.initial_energy = 29.0;
        let mut eco = Ecosysteme::new(config).unwrap();
        eco.spawn_entity(Species::Plante, Vec2::new(400.0, 400.0))
            .unwrap();
        eco.tick();
        assert_eq!(eco.count(Species::Plante), 1);
        assert_eq!(eco.stats().latest().unwrap().dropped_spawns, 0);
        assert!(
            !eco.events()
                .events()
                .any(|e| matches!(e.kind, EcoEventKind::SpawnDropped { .. }))
        );
    }

    #[test]
    fn capacity_parameters_resize_history_and_log() {
        let mut eco = Ecosysteme::new(SimConfig::default().with_seed(8)).unwrap();
        eco.run(20);
        assert_eq!(eco.stats().history().len(), 20);

        eco.set_parameter("history_capacity", 5.0).unwrap();
        eco.set_parameter("max_events", 3.0).unwrap();
        assert_eq!(eco.stats().capacity(), 5);
        assert_eq!(eco.stats().history().len(), 5);
        assert!(eco.events().len() <= 3);

        eco.run(10);
        assert_eq!(eco.stats().history().len(), 5);
        assert_eq!(eco.stats().latest().unwrap().tick, 30);
        assert!(eco.events().len() <= 3);
        assert!(eco.set_parameter("history_capacity", 0.0).is_err());
    }

    #[test]
    fn population_cap_cannot_drop_below_live_population() {
        let mut eco = Ecosysteme::new(quiet_config().with_timestep(1.0)).unwrap();
        for i in 0..10 {
            eco.spawn_entity(Species::Plante, Vec2::new(100.0 + 40.0 * f64::from(i), 300.0))
                .unwrap();
        }
        let err = eco.set_parameter("population_cap", 5.0).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidParameter { ref name, .. } if name == "population_cap"
        ));
        assert_eq!(eco.config().population_cap, 1_000);

        eco.set_parameter("population_cap", 10.0).unwrap();
        eco.tick();
        assert!(eco.population() <= eco.config().population_cap);
    }

    #[test]
    fn index_matches_live_set_after_ticks() {
        let mut eco = Ecosysteme::new(SimConfig::default().with_seed(3)).unwrap();
        for _ in 0..120 {
            eco.tick();
            assert_eq!(eco.index_ids(), eco.live_ids());
        }
    }

    #[test]
    fn stream_rng_differs_per_stream() {
        let a: u64 = stream_rng(1, 1, 1).random();
        let b: u64 = stream_rng(1, 1, 2).random();
        let c: u64 = stream_rng(1, 2, 1).random();
        let again: u64 = stream_rng(1, 1, 1).random();
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_eq!(a, again);
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "stale entity id")]
    fn stale_id_fails_fast_in_debug() {
        let mut eco = Ecosysteme::new(quiet_config()).unwrap();
        let _ = eco.entity_mut(EntityId(999));
    }
}
