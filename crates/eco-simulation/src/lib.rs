//! Tick-based ecosystem simulation of plants, prey and predators.
//!
//! The [`Ecosysteme`] owns every entity and advances them in fixed steps:
//! rebuild the spatial index, compute an outcome per entity against a
//! read-only neighborhood, then commit claims, births and deaths in a fixed
//! order. A [`Simulation`] wraps one ecosystem with a [`SimulationClock`]
//! so a UI can feed frame times and [`Command`]s and read snapshots back.

/// Per-species update rules and their outcomes.
pub mod behavior;
/// Fixed-timestep clock.
pub mod clock;
/// Control commands accepted by the simulation.
pub mod command;
/// Configuration types, validation and named parameters.
pub mod config;
/// Read-only neighborhood view used by update rules.
pub mod context;
/// The entity-owning orchestrator.
pub mod ecosystem;
/// Error types for the simulation crate.
pub mod error;
/// Ecosystem event types and the event log.
pub mod event;
/// JSON save and restore.
pub mod persist;
/// Top-level simulation driven by frames and commands.
pub mod simulation;
/// Grid-based spatial index.
pub mod spatial;
/// Rolling per-tick statistics.
pub mod stats;

/// Re-exports of [`behavior::DeathReason`] and [`behavior::Outcome`].
pub use behavior::{DeathReason, Outcome};
/// Re-export of [`clock::SimulationClock`].
pub use clock::SimulationClock;
/// Re-export of [`command::Command`].
pub use command::Command;
/// Re-exports of the configuration types.
pub use config::{AnimalParams, InitialPopulation, PARAMETER_NAMES, PlantParams, SimConfig, WorldBounds};
/// Re-export of [`context::Neighborhood`].
pub use context::Neighborhood;
/// Re-export of [`ecosystem::Ecosysteme`].
pub use ecosystem::Ecosysteme;
/// Re-exports of [`error::ConfigError`], [`error::SimError`] and [`error::SimResult`].
pub use error::{ConfigError, SimError, SimResult};
/// Re-exports of [`event::EcoEvent`], [`event::EcoEventKind`] and [`event::EventLog`].
pub use event::{EcoEvent, EcoEventKind, EventLog};
/// Re-export of [`persist::SavedState`].
pub use persist::SavedState;
/// Re-exports of [`simulation::Simulation`] and its frame types.
pub use simulation::{FrameReport, FrameSnapshot, Simulation};
/// Re-export of [`spatial::SpatialIndex`].
pub use spatial::SpatialIndex;
/// Re-exports of the statistics types.
pub use stats::{StatsCollector, StatsSnapshot, StatsTotals, TickStats};
