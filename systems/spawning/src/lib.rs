#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wave clock that turns elapsed wall-clock seconds into spawn and level commands.
//!
//! Once per elapsed second the countdown drops by one. While it sits above the
//! spawn threshold a monster is spawned; when it reaches zero the level
//! advances and the countdown restarts at the wave length. A fresh session
//! starts below the threshold, so the first wave only begins after the first
//! level-up.

use std::time::Duration;

use path_defence_core::Command;

/// Configuration parameters required to construct the wave clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    initial_countdown: u32,
    wave_length: u32,
    spawn_threshold: u32,
    monster_health: u32,
}

impl Config {
    /// Creates a new configuration.
    #[must_use]
    pub const fn new(
        initial_countdown: u32,
        wave_length: u32,
        spawn_threshold: u32,
        monster_health: u32,
    ) -> Self {
        Self {
            initial_countdown,
            wave_length,
            spawn_threshold,
            monster_health,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(10, 30, 19, 3)
    }
}

/// Pure system that advances the per-second wave countdown.
#[derive(Debug)]
pub struct WaveClock {
    config: Config,
    countdown: u32,
    last_second: u64,
}

impl WaveClock {
    /// Creates a wave clock at the configured initial countdown.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            countdown: config.initial_countdown,
            config,
            last_second: 0,
        }
    }

    /// Seconds left until the next level-up.
    #[must_use]
    pub const fn countdown(&self) -> u32 {
        self.countdown
    }

    /// Observes the host timestamp and emits wave commands on second boundaries.
    ///
    /// Only the whole-second part of `now` matters. Repeated calls within the
    /// same second are ignored, and a jump across several seconds still counts
    /// as a single boundary. Returns `true` when a boundary was processed.
    pub fn handle(&mut self, now: Duration, out: &mut Vec<Command>) -> bool {
        let second = now.as_secs();
        if second == self.last_second {
            return false;
        }
        self.last_second = second;

        self.countdown = self.countdown.saturating_sub(1);
        if self.countdown > self.config.spawn_threshold {
            out.push(Command::SpawnMonster {
                health: self.config.monster_health,
            });
        } else if self.countdown == 0 {
            out.push(Command::AdvanceLevel);
            self.countdown = self.config.wave_length;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_second_of_session_is_not_a_boundary() {
        let mut clock = WaveClock::new(Config::default());
        let mut out = Vec::new();
        assert!(!clock.handle(Duration::from_millis(400), &mut out));
        assert_eq!(clock.countdown(), 10);
        assert!(out.is_empty());
    }

    #[test]
    fn same_second_is_processed_once() {
        let mut clock = WaveClock::new(Config::default());
        let mut out = Vec::new();
        assert!(clock.handle(Duration::from_millis(1_200), &mut out));
        assert!(!clock.handle(Duration::from_millis(1_700), &mut out));
        assert!(!clock.handle(Duration::from_millis(1_200), &mut out));
        assert_eq!(clock.countdown(), 9);
    }

    #[test]
    fn skipped_seconds_count_once() {
        let mut clock = WaveClock::new(Config::default());
        let mut out = Vec::new();
        assert!(clock.handle(Duration::from_secs(5), &mut out));
        assert_eq!(clock.countdown(), 9);
    }

    #[test]
    fn reaching_zero_levels_up_and_resets() {
        let mut clock = WaveClock::new(Config::new(1, 30, 19, 3));
        let mut out = Vec::new();
        assert!(clock.handle(Duration::from_secs(1), &mut out));
        assert_eq!(out, vec![Command::AdvanceLevel]);
        assert_eq!(clock.countdown(), 30);
    }

    #[test]
    fn countdown_above_threshold_spawns_configured_health() {
        let mut clock = WaveClock::new(Config::new(30, 30, 19, 7));
        let mut out = Vec::new();
        assert!(clock.handle(Duration::from_secs(1), &mut out));
        assert_eq!(out, vec![Command::SpawnMonster { health: 7 }]);
    }
}
