//! Uniform-grid spatial hash, spec.md §4.3. Plain `std` collections, no
//! external crate, matching the teacher's preference for `HashMap`/`HashSet`
//! over a dependency for in-process indexing.

use std::collections::HashMap;

use tanks_core::config::CELL_SIZE;
use tanks_core::Bounds;

use crate::entities::{ShellId, TankId, TreeId, UpgradeId};

/// Identifies an entity in the index by its stable id — the collision pass
/// looks the id back up in whichever table/vec actually owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityRef {
    Tank(TankId),
    Shell(ShellId),
    Tree(TreeId),
    Upgrade(UpgradeId),
}

type Cell = (i32, i32);

#[derive(Default)]
pub struct SpatialHash {
    cells: HashMap<Cell, Vec<EntityRef>>,
}

fn cell_of(x: f32, y: f32) -> Cell {
    ((x / CELL_SIZE).floor() as i32, (y / CELL_SIZE).floor() as i32)
}

fn cells_for(bounds: Bounds) -> impl Iterator<Item = Cell> {
    let min = cell_of(bounds.x, bounds.y);
    let max = cell_of(bounds.x + bounds.w, bounds.y + bounds.h);
    (min.0..=max.0).flat_map(move |cx| (min.1..=max.1).map(move |cy| (cx, cy)))
}

impl SpatialHash {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    pub fn insert(&mut self, bounds: Bounds, entity: EntityRef) {
        for cell in cells_for(bounds) {
            self.cells.entry(cell).or_default().push(entity);
        }
    }

    /// Enumerates all cells `bounds` (optionally expanded by `radius`)
    /// touches, returning the union of their contents excluding `exclude`.
    pub fn query(&self, bounds: Bounds, radius: f32, exclude: Option<EntityRef>) -> Vec<EntityRef> {
        let query_bounds = if radius > 0.0 { bounds.expanded(radius) } else { bounds };
        let mut seen = std::collections::HashSet::new();
        let mut out = Vec::new();
        for cell in cells_for(query_bounds) {
            if let Some(entities) = self.cells.get(&cell) {
                for &e in entities {
                    if Some(e) == exclude {
                        continue;
                    }
                    if seen.insert(e) {
                        out.push(e);
                    }
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_spanning_multiple_cells_found_from_either_side() {
        let mut hash = SpatialHash::new();
        let bounds = Bounds::new(45.0, 45.0, 10.0, 10.0);
        let id = TankId::new();
        hash.insert(bounds, EntityRef::Tank(id));

        let near_a = hash.query(Bounds::new(0.0, 0.0, 5.0, 5.0), 0.0, None);
        let near_b = hash.query(Bounds::new(55.0, 55.0, 5.0, 5.0), 0.0, None);
        assert!(near_a.contains(&EntityRef::Tank(id)));
        assert!(near_b.contains(&EntityRef::Tank(id)));
    }

    #[test]
    fn query_excludes_self() {
        let mut hash = SpatialHash::new();
        let bounds = Bounds::new(0.0, 0.0, 10.0, 10.0);
        let id = TankId::new();
        hash.insert(bounds, EntityRef::Tank(id));
        let results = hash.query(bounds, 0.0, Some(EntityRef::Tank(id)));
        assert!(!results.contains(&EntityRef::Tank(id)));
    }

    #[test]
    fn query_radius_widens_search() {
        let mut hash = SpatialHash::new();
        let id = UpgradeId::new();
        hash.insert(Bounds::new(200.0, 200.0, 5.0, 5.0), EntityRef::Upgrade(id));
        let tight = hash.query(Bounds::new(0.0, 0.0, 5.0, 5.0), 0.0, None);
        let wide = hash.query(Bounds::new(0.0, 0.0, 5.0, 5.0), 250.0, None);
        assert!(!tight.contains(&EntityRef::Upgrade(id)));
        assert!(wide.contains(&EntityRef::Upgrade(id)));
    }
}
