use std::collections::HashMap;

use eco_core::{EntityId, Vec2};

type Cell = (i32, i32);

/// Uniform grid over entity positions for radius queries.
///
/// The index only ever holds identifiers. The ecosystem's entity map stays
/// the single source of truth for which entities exist.
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    cell_size: f64,
    cells: HashMap<Cell, Vec<EntityId>>,
    entity_cells: HashMap<EntityId, Cell>,
}

impl SpatialIndex {
    /// Create an empty index. Non-positive cell sizes fall back to 1.
    pub fn new(cell_size: f64) -> Self {
        Self {
            cell_size: sanitize(cell_size),
            cells: HashMap::new(),
            entity_cells: HashMap::new(),
        }
    }

    /// Side length of one grid cell.
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    fn cell_of(&self, position: Vec2) -> Cell {
        (
            (position.x / self.cell_size).floor() as i32,
            (position.y / self.cell_size).floor() as i32,
        )
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.cells.clear();
        self.entity_cells.clear();
    }

    /// Clear the index and refill it with a new cell size.
    pub fn rebuild(&mut self, cell_size: f64, entries: impl IntoIterator<Item = (EntityId, Vec2)>) {
        self.clear();
        self.cell_size = sanitize(cell_size);
        for (id, position) in entries {
            self.insert_or_update(id, position);
        }
    }

    /// Place an id at a position, moving it if it was already indexed.
    pub fn insert_or_update(&mut self, id: EntityId, position: Vec2) {
        let cell = self.cell_of(position);
        if self.entity_cells.get(&id) == Some(&cell) {
            return;
        }
        self.detach(id);
        self.cells.entry(cell).or_insert_with(|| Vec::with_capacity(8)).push(id);
        self.entity_cells.insert(id, cell);
    }

    /// Forget an id. Unknown ids are ignored.
    pub fn remove(&mut self, id: EntityId) {
        self.detach(id);
    }

    fn detach(&mut self, id: EntityId) {
        let Some(cell) = self.entity_cells.remove(&id) else {
            return;
        };
        if let Some(ids) = self.cells.get_mut(&cell) {
            if let Some(pos) = ids.iter().position(|&e| e == id) {
                ids.swap_remove(pos);
            }
            if ids.is_empty() {
                self.cells.remove(&cell);
            }
        }
    }

    /// Every id in the cells overlapping the query circle.
    ///
    /// This is a superset of the ids within `radius`; callers filter by
    /// exact distance.
    pub fn query_radius(&self, position: Vec2, radius: f64) -> Vec<EntityId> {
        let mut found = Vec::new();
        self.query_radius_into(position, radius, &mut found);
        found
    }

    /// Same as [`SpatialIndex::query_radius`], reusing a caller buffer.
    pub fn query_radius_into(&self, position: Vec2, radius: f64, found: &mut Vec<EntityId>) {
        found.clear();
        if !radius.is_finite() || radius < 0.0 {
            return;
        }
        let (cx, cy) = self.cell_of(position);
        let reach = (radius / self.cell_size).ceil() as i32;
        for dy in -reach..=reach {
            for dx in -reach..=reach {
                if let Some(ids) = self.cells.get(&(cx + dx, cy + dy)) {
                    found.extend(ids.iter().copied());
                }
            }
        }
    }

    /// Whether an id is indexed.
    pub fn contains(&self, id: EntityId) -> bool {
        self.entity_cells.contains_key(&id)
    }

    /// Number of indexed ids.
    pub fn len(&self) -> usize {
        self.entity_cells.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.entity_cells.is_empty()
    }

    /// All indexed ids, in no particular order.
    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entity_cells.keys().copied()
    }

    /// Number of occupied cells.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new(1.0)
    }
}

fn sanitize(cell_size: f64) -> f64 {
    if cell_size.is_finite() && cell_size > 0.0 {
        cell_size
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn id(n: u64) -> EntityId {
        EntityId(n)
    }

    #[test]
    fn insert_and_query_same_cell() {
        let mut index = SpatialIndex::new(10.0);
        index.insert_or_update(id(1), Vec2::new(1.0, 1.0));
        index.insert_or_update(id(2), Vec2::new(2.0, 2.0));
        let found = index.query_radius(Vec2::new(0.0, 0.0), 5.0);
        assert!(found.contains(&id(1)));
        assert!(found.contains(&id(2)));
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn query_skips_distant_cells() {
        let mut index = SpatialIndex::new(10.0);
        index.insert_or_update(id(1), Vec2::new(5.0, 5.0));
        index.insert_or_update(id(2), Vec2::new(500.0, 500.0));
        let found = index.query_radius(Vec2::new(5.0, 5.0), 10.0);
        assert_eq!(found, vec![id(1)]);
    }

    #[test]
    fn query_reaches_neighbor_cells() {
        let mut index = SpatialIndex::new(10.0);
        index.insert_or_update(id(1), Vec2::new(9.9, 0.0));
        index.insert_or_update(id(2), Vec2::new(10.1, 0.0));
        let found = index.query_radius(Vec2::new(9.9, 0.0), 1.0);
        assert!(found.contains(&id(2)));
    }

    #[test]
    fn update_moves_between_cells() {
        let mut index = SpatialIndex::new(10.0);
        index.insert_or_update(id(1), Vec2::new(1.0, 1.0));
        index.insert_or_update(id(1), Vec2::new(95.0, 95.0));
        assert_eq!(index.len(), 1);
        assert_eq!(index.cell_count(), 1);
        assert!(index.query_radius(Vec2::new(1.0, 1.0), 5.0).is_empty());
        assert_eq!(index.query_radius(Vec2::new(95.0, 95.0), 5.0), vec![id(1)]);
    }

    #[test]
    fn remove_unknown_id_is_noop() {
        let mut index = SpatialIndex::new(10.0);
        index.insert_or_update(id(1), Vec2::ZERO);
        index.remove(id(99));
        assert_eq!(index.len(), 1);
        index.remove(id(1));
        assert!(index.is_empty());
        assert_eq!(index.cell_count(), 0);
    }

    #[test]
    fn negative_coordinates_use_floor() {
        let mut index = SpatialIndex::new(10.0);
        index.insert_or_update(id(1), Vec2::new(-0.5, -0.5));
        index.insert_or_update(id(2), Vec2::new(0.5, 0.5));
        assert_eq!(index.cell_count(), 2);
    }

    #[test]
    fn rebuild_replaces_contents() {
        let mut index = SpatialIndex::new(10.0);
        index.insert_or_update(id(1), Vec2::ZERO);
        index.rebuild(25.0, [(id(2), Vec2::new(3.0, 3.0)), (id(3), Vec2::new(30.0, 3.0))]);
        assert!(!index.contains(id(1)));
        assert_eq!(index.cell_size(), 25.0);
        let ids: BTreeSet<_> = index.ids().collect();
        assert_eq!(ids, BTreeSet::from([id(2), id(3)]));
    }

    #[test]
    fn invalid_cell_size_falls_back() {
        assert_eq!(SpatialIndex::new(0.0).cell_size(), 1.0);
        assert_eq!(SpatialIndex::new(f64::NAN).cell_size(), 1.0);
    }

    proptest::proptest! {
        #[test]
        fn query_is_superset_of_brute_force(
            points in proptest::collection::vec((0.0f64..500.0, 0.0f64..500.0), 1..60),
            cx in 0.0f64..500.0,
            cy in 0.0f64..500.0,
            radius in 1.0f64..120.0,
            cell in 5.0f64..150.0,
        ) {
            let mut index = SpatialIndex::new(cell);
            for (i, (x, y)) in points.iter().enumerate() {
                index.insert_or_update(EntityId(i as u64), Vec2::new(*x, *y));
            }
            let center = Vec2::new(cx, cy);
            let found: BTreeSet<_> = index.query_radius(center, radius).into_iter().collect();
            for (i, (x, y)) in points.iter().enumerate() {
                if Vec2::new(*x, *y).distance(center) <= radius {
                    proptest::prop_assert!(found.contains(&EntityId(i as u64)));
                }
            }
        }
    }
}
