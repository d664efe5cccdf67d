#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that computes deterministic tower targets from world snapshots.
//!
//! Each tower targets the earliest-spawned live monster whose position lies
//! within its range. Spawn order is the order monsters walk the path, so this
//! favours the monster that has been exposed longest.

use glam::Vec2;
use path_defence_core::{MonsterId, MonsterView, TowerTarget, TowerView};

/// Tower targeting system that reuses scratch buffers to avoid repeated allocations.
#[derive(Debug, Default)]
pub struct TowerTargeting {
    monster_workspace: Vec<MonsterCandidate>,
}

impl TowerTargeting {
    /// Creates a new tower targeting system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes tower targets for the provided world snapshot.
    ///
    /// The output buffer is cleared before populating it with the latest
    /// assignments. Towers without a monster in range are omitted, so the
    /// output stays sorted by tower identifier.
    pub fn handle(&mut self, towers: &TowerView, monsters: &MonsterView, out: &mut Vec<TowerTarget>) {
        out.clear();

        if towers.is_empty() || monsters.is_empty() {
            return;
        }

        self.prepare_monster_workspace(monsters);
        if self.monster_workspace.is_empty() {
            return;
        }

        for tower in towers.iter() {
            let range_sq = tower.range * tower.range;
            let selected = self
                .monster_workspace
                .iter()
                .find(|candidate| candidate.position.distance_squared(tower.center) <= range_sq);

            if let Some(candidate) = selected {
                out.push(TowerTarget {
                    tower: tower.id,
                    monster: candidate.id,
                    tower_center: tower.center,
                    monster_position: candidate.position,
                });
            }
        }
    }

    fn prepare_monster_workspace(&mut self, monsters: &MonsterView) {
        self.monster_workspace.clear();
        self.monster_workspace.reserve(monsters.len());

        for snapshot in monsters.iter() {
            if snapshot.kill_switch {
                continue;
            }

            self.monster_workspace.push(MonsterCandidate {
                id: snapshot.id,
                position: snapshot.position,
            });
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct MonsterCandidate {
    id: MonsterId,
    position: Vec2,
}
