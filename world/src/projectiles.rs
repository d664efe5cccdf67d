//! Projectile travel bookkeeping.

use glam::Vec2;
use path_defence_core::{MonsterId, ProjectileId, TowerId};

/// Projectile fired by a tower. Travels for a fixed number of ticks.
#[derive(Clone, Debug)]
pub(crate) struct Projectile {
    pub(crate) id: ProjectileId,
    pub(crate) tower: TowerId,
    pub(crate) target: MonsterId,
    pub(crate) origin: Vec2,
    pub(crate) destination: Vec2,
    elapsed_ticks: u32,
    travel_ticks: u32,
}

impl Projectile {
    pub(crate) fn new(
        id: ProjectileId,
        tower: TowerId,
        target: MonsterId,
        origin: Vec2,
        destination: Vec2,
        travel_ticks: u32,
    ) -> Self {
        Self {
            id,
            tower,
            target,
            origin,
            destination,
            elapsed_ticks: 0,
            travel_ticks,
        }
    }

    /// Advances travel by one tick, returning `true` once the destination is reached.
    pub(crate) fn advance(&mut self) -> bool {
        self.elapsed_ticks = self.elapsed_ticks.saturating_add(1);
        self.elapsed_ticks >= self.travel_ticks
    }

    pub(crate) fn progress(&self) -> f32 {
        if self.travel_ticks == 0 {
            return 1.0;
        }
        (self.elapsed_ticks as f32 / self.travel_ticks as f32).min(1.0)
    }

    pub(crate) fn position(&self) -> Vec2 {
        self.origin.lerp(self.destination, self.progress())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn projectile(travel_ticks: u32) -> Projectile {
        Projectile::new(
            ProjectileId::new(1),
            TowerId::new(0),
            MonsterId::new(0),
            Vec2::new(0.0, 0.0),
            Vec2::new(100.0, 0.0),
            travel_ticks,
        )
    }

    #[test]
    fn arrives_after_fixed_duration() {
        let mut projectile = projectile(4);
        assert!(!projectile.advance());
        assert!(!projectile.advance());
        assert!((projectile.position().x - 50.0).abs() < 1e-4);
        assert!(!projectile.advance());
        assert!(projectile.advance());
        assert!((projectile.position().x - 100.0).abs() < 1e-4);
    }

    #[test]
    fn zero_duration_arrives_immediately() {
        let mut projectile = projectile(0);
        assert!((projectile.progress() - 1.0).abs() < f32::EPSILON);
        assert!(projectile.advance());
    }
}
