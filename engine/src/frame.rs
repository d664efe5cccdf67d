//! Per-tick publication consumed by presentation adapters.

use std::mem;

use path_defence_core::{Event, MonsterId, ProjectileId, TowerId};
use serde::Serialize;

/// Labels shown to the player, published once per running tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct StatusLabels {
    /// Current level (wave) counter.
    pub level: u32,
    /// Lives left.
    pub lives: u32,
    /// Resources available for purchases.
    pub resources: u32,
    /// Accumulated score.
    pub score: u64,
    /// Seconds until the next level-up.
    pub countdown: u32,
}

/// Entity a presenter attaches or detaches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum EntityRef {
    /// A monster on the path.
    Monster(MonsterId),
    /// A bought tower.
    Tower(TowerId),
    /// A projectile in flight.
    Projectile(ProjectileId),
}

/// Diff published to the presenter at the end of every running tick.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Frame {
    /// Labels after the tick's sub-steps.
    pub labels: StatusLabels,
    /// Entities that appeared since the previous frame.
    pub added: Vec<EntityRef>,
    /// Entities that left since the previous frame.
    pub removed: Vec<EntityRef>,
}

/// Consumer of published frames.
pub trait Presenter {
    /// Receives the frame produced by a running tick.
    fn present(&mut self, frame: &Frame);
}

/// Presenter that discards every frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullPresenter;

impl Presenter for NullPresenter {
    fn present(&mut self, _frame: &Frame) {}
}

impl Presenter for Vec<Frame> {
    fn present(&mut self, frame: &Frame) {
        self.push(frame.clone());
    }
}

/// Accumulates entity churn between publications.
#[derive(Debug, Default)]
pub(crate) struct FrameBuilder {
    added: Vec<EntityRef>,
    removed: Vec<EntityRef>,
}

impl FrameBuilder {
    pub(crate) fn record(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::MonsterSpawned { monster, .. } => {
                    self.added.push(EntityRef::Monster(*monster));
                }
                Event::TowerPurchased { tower, .. } => self.added.push(EntityRef::Tower(*tower)),
                Event::ProjectileLaunched { projectile, .. } => {
                    self.added.push(EntityRef::Projectile(*projectile));
                }
                Event::MonsterSettled { monster, .. } => {
                    self.removed.push(EntityRef::Monster(*monster));
                }
                Event::ProjectileResolved { projectile, .. } => {
                    self.removed.push(EntityRef::Projectile(*projectile));
                }
                _ => {}
            }
        }
    }

    pub(crate) fn finish(&mut self, labels: StatusLabels) -> Frame {
        Frame {
            labels,
            added: mem::take(&mut self.added),
            removed: mem::take(&mut self.removed),
        }
    }
}
