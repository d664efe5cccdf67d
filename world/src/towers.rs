//! Authoritative tower state management utilities.

use std::collections::BTreeMap;

use glam::Vec2;
use path_defence_core::{TileCoord, TowerId};

use crate::projectiles::Projectile;

/// Tower stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct TowerState {
    /// Identifier allocated by the world for the tower.
    pub(crate) id: TowerId,
    /// Tile the tower was built on.
    pub(crate) tile: TileCoord,
    /// Pixel position projectiles depart from.
    pub(crate) center: Vec2,
    /// Projectiles fired since the list was last drained.
    pub(crate) pending: Vec<Projectile>,
}

/// Registry that stores towers and manages identifier allocation.
///
/// Towers are never removed, so iteration order is purchase order.
#[derive(Debug)]
pub(crate) struct TowerRegistry {
    entries: BTreeMap<TowerId, TowerState>,
    next_tower_id: TowerId,
}

impl TowerRegistry {
    /// Creates an empty tower registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_tower_id: TowerId::new(0),
        }
    }

    /// Stores a new tower and returns its identifier.
    pub(crate) fn insert(&mut self, tile: TileCoord, center: Vec2) -> TowerId {
        let id = self.next_tower_id;
        self.next_tower_id = TowerId::new(id.get().saturating_add(1));
        let _ = self.entries.insert(
            id,
            TowerState {
                id,
                tile,
                center,
                pending: Vec::new(),
            },
        );
        id
    }

    pub(crate) fn get(&self, tower: TowerId) -> Option<&TowerState> {
        self.entries.get(&tower)
    }

    pub(crate) fn get_mut(&mut self, tower: TowerId) -> Option<&mut TowerState> {
        self.entries.get_mut(&tower)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &TowerState> {
        self.entries.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut TowerState> {
        self.entries.values_mut()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_starts_empty_with_zero_identifier() {
        let registry = TowerRegistry::new();
        assert!(registry.entries.is_empty());
        assert_eq!(registry.next_tower_id.get(), 0);
    }

    #[test]
    fn identifiers_follow_purchase_order() {
        let mut registry = TowerRegistry::new();
        let first = registry.insert(TileCoord::new(5, 5), Vec2::new(352.0, 352.0));
        let second = registry.insert(TileCoord::new(1, 1), Vec2::new(96.0, 96.0));

        assert_eq!(first, TowerId::new(0));
        assert_eq!(second, TowerId::new(1));
        let order: Vec<TileCoord> = registry.iter().map(|tower| tower.tile).collect();
        assert_eq!(order, vec![TileCoord::new(5, 5), TileCoord::new(1, 1)]);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn new_towers_have_no_pending_projectiles() {
        let mut registry = TowerRegistry::new();
        let id = registry.insert(TileCoord::new(2, 3), Vec2::new(160.0, 224.0));
        let tower = registry.get(id).expect("tower stored");
        assert!(tower.pending.is_empty());
        assert_eq!(tower.id, id);
    }
}
