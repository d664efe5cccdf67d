//! Monster state and per-tick update rules.

use path_defence_core::MonsterId;

/// Monster walking the path. Lives in the world's live set until settled.
#[derive(Clone, Debug)]
pub(crate) struct Monster {
    pub(crate) id: MonsterId,
    pub(crate) health: u32,
    /// Distance travelled along the path, in pixels.
    pub(crate) progress: f32,
    pub(crate) reward: u32,
    /// Set once health is gone or the path is finished; never cleared.
    pub(crate) kill_switch: bool,
    pub(crate) path_finished: bool,
}

impl Monster {
    pub(crate) fn spawn(id: MonsterId, health: u32, reward: u32) -> Self {
        Self {
            id,
            health,
            progress: 0.0,
            reward,
            kill_switch: false,
            path_finished: false,
        }
    }

    /// Advances the monster by `step` pixels along a path of `path_length`.
    ///
    /// Returns `true` when this call carried the monster over the end of the
    /// path. Dead monsters do not move.
    pub(crate) fn update_location(&mut self, step: f32, path_length: f32) -> bool {
        if self.health == 0 {
            self.kill_switch = true;
        }
        if self.kill_switch {
            return false;
        }

        self.progress += step;
        if self.progress >= path_length {
            self.progress = path_length;
            self.path_finished = true;
            self.kill_switch = true;
            return true;
        }
        false
    }

    /// Applies a hit and returns the remaining health, or `None` when the
    /// monster was already dead or finished and ignores the hit.
    pub(crate) fn take_damage(&mut self, damage: u32) -> Option<u32> {
        if self.kill_switch {
            return None;
        }

        self.health = self.health.saturating_sub(damage);
        if self.health == 0 {
            self.kill_switch = true;
        }
        Some(self.health)
    }
}
