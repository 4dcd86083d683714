//! Core types for the ecosystem simulation: entities, species, and snapshots.
//!
//! This crate defines the data model the simulation engine operates on. It
//! holds no behavior beyond construction and inspection; the update rules
//! and the tick orchestrator live in `eco-simulation`.

/// Entity identifiers, species, behavior states, and the entity record.
pub mod entity;
/// Error types used throughout the crate.
pub mod error;
/// Read-only entity views for observers.
pub mod snapshot;

/// Re-export core entity types.
pub use entity::{BehaviorState, Body, Capabilities, Entity, EntityId, Motion, Species};
/// Re-export error types.
pub use error::{CoreError, CoreResult};
/// Re-export snapshot types.
pub use snapshot::EntitySnapshot;
/// Positions and velocities are double-precision `glam` vectors.
pub use glam::DVec2 as Vec2;
