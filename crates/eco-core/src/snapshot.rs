use serde::{Deserialize, Serialize};

use crate::entity::{BehaviorState, EntityId, Species};
use crate::Vec2;

/// Immutable, owned view of one entity handed to observers after a commit.
///
/// Snapshots never borrow from the ecosystem, so a renderer may hold them
/// across ticks without observing partial updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    /// The entity's identifier.
    pub id: EntityId,
    /// The entity's species.
    pub species: Species,
    /// Position in world coordinates.
    pub position: Vec2,
    /// Heading; zero for plants.
    pub velocity: Vec2,
    /// Stored energy.
    pub energy: f64,
    /// Age in ticks.
    pub age: u64,
    /// Behavior state, for animals.
    pub behavior: Option<BehaviorState>,
}
