use std::collections::BTreeMap;

use eco_core::{Entity, EntityId, Species, Vec2};

use crate::spatial::SpatialIndex;

/// Read-only view of the world handed to each entity's update.
///
/// Borrows the entity map and the spatial index as they stood when the
/// tick's index phase finished, so every update in a tick sees the same
/// start-of-tick state.
#[derive(Debug, Clone, Copy)]
pub struct Neighborhood<'a> {
    entities: &'a BTreeMap<EntityId, Entity>,
    index: &'a SpatialIndex,
}

impl<'a> Neighborhood<'a> {
    /// Wrap an entity map and the index built from it.
    pub fn new(entities: &'a BTreeMap<EntityId, Entity>, index: &'a SpatialIndex) -> Self {
        Self { entities, index }
    }

    /// Look up an entity by id.
    pub fn get(&self, id: EntityId) -> Option<&'a Entity> {
        self.entities.get(&id)
    }

    /// Entities of `species` within `radius` of `from`, excluding `exclude`,
    /// in ascending id order.
    pub fn within(
        &self,
        from: Vec2,
        radius: f64,
        species: Species,
        exclude: EntityId,
    ) -> Vec<&'a Entity> {
        let limit = radius * radius;
        let mut found: Vec<&'a Entity> = self
            .index
            .query_radius(from, radius)
            .into_iter()
            .filter(|&id| id != exclude)
            .filter_map(|id| self.entities.get(&id))
            .filter(|e| e.species == species && e.position.distance_squared(from) <= limit)
            .collect();
        found.sort_by_key(|e| e.id);
        found
    }

    /// The closest entity of `species` within `radius` that passes `accept`.
    ///
    /// Equal distances go to the lower id, so the answer never depends on
    /// bucket order inside the index.
    pub fn nearest(
        &self,
        from: Vec2,
        radius: f64,
        species: Species,
        exclude: EntityId,
        accept: impl Fn(&Entity) -> bool,
    ) -> Option<&'a Entity> {
        self.within(from, radius, species, exclude)
            .into_iter()
            .filter(|e| accept(*e))
            .min_by(|a, b| {
                a.position
                    .distance_squared(from)
                    .total_cmp(&b.position.distance_squared(from))
                    .then(a.id.cmp(&b.id))
            })
    }
}
