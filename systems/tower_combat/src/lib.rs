#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Virtual scheduler for per-tower attack triggers.
//!
//! Every tower owns a recurring trigger whose cadence is independent of the
//! frame rate and of the wave clock. The engine polls the scheduler with the
//! host timestamp; triggers that came due since the last poll emit
//! `Command::FireProjectile` for their tower's current target. Pausing the
//! session cancels every trigger and resuming re-arms them.

use std::{collections::BTreeMap, time::Duration};

use path_defence_core::{Command, Event, SessionState, TowerId, TowerTarget};

/// Configuration parameters required to construct the combat system.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    attack_period: Duration,
}

impl Config {
    /// Creates a new configuration with the provided trigger period.
    #[must_use]
    pub const fn new(attack_period: Duration) -> Self {
        Self { attack_period }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

/// Scheduling state of a single tower's attack trigger.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TriggerState {
    /// Armed but not yet anchored to the host clock; anchors on the next poll.
    Idle,
    /// Fires once `now` reaches `next_due`.
    Scheduled {
        /// Host timestamp of the next firing.
        next_due: Duration,
    },
    /// Suspended until the session resumes.
    Cancelled,
}

#[derive(Clone, Copy, Debug)]
struct AttackTrigger {
    state: TriggerState,
}

impl AttackTrigger {
    fn new(armed: bool) -> Self {
        let state = if armed {
            TriggerState::Idle
        } else {
            TriggerState::Cancelled
        };
        Self { state }
    }

    fn cancel(&mut self) {
        self.state = TriggerState::Cancelled;
    }

    fn start(&mut self) {
        if self.state == TriggerState::Cancelled {
            self.state = TriggerState::Idle;
        }
    }

    /// Returns `true` when at least one period elapsed since the previous
    /// poll. Missed periods collapse into a single firing and the trigger
    /// re-anchors on the first period boundary after `now`.
    fn poll(&mut self, now: Duration, period: Duration) -> bool {
        if period.is_zero() {
            return false;
        }

        match self.state {
            TriggerState::Cancelled => false,
            TriggerState::Idle => {
                self.state = TriggerState::Scheduled {
                    next_due: now.saturating_add(period),
                };
                false
            }
            TriggerState::Scheduled { next_due } => {
                if now < next_due {
                    return false;
                }
                let missed = (now - next_due).as_nanos() / period.as_nanos();
                let periods = u32::try_from(missed.saturating_add(1)).unwrap_or(u32::MAX);
                self.state = TriggerState::Scheduled {
                    next_due: next_due.saturating_add(period.saturating_mul(periods)),
                };
                true
            }
        }
    }
}

/// Tower combat system that owns every tower's attack trigger.
#[derive(Debug)]
pub struct TowerCombat {
    attack_period: Duration,
    session: SessionState,
    triggers: BTreeMap<TowerId, AttackTrigger>,
}

impl TowerCombat {
    /// Creates a combat system for a running session with no towers.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            attack_period: config.attack_period,
            session: SessionState::Running,
            triggers: BTreeMap::new(),
        }
    }

    /// Reacts to world events: registers bought towers and cascades session
    /// transitions to every trigger.
    pub fn observe(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::TowerPurchased { tower, .. } => {
                    let armed = self.session == SessionState::Running;
                    let _ = self.triggers.insert(*tower, AttackTrigger::new(armed));
                }
                Event::SessionStateChanged { to, .. } => {
                    self.session = *to;
                    if *to == SessionState::Running {
                        self.triggers.values_mut().for_each(AttackTrigger::start);
                    } else {
                        self.triggers.values_mut().for_each(AttackTrigger::cancel);
                    }
                }
                _ => {}
            }
        }
    }

    /// Polls every trigger and emits one `Command::FireProjectile` per due
    /// trigger, however late the poll is.
    ///
    /// A trigger that fires while its tower has no target simply consumes the
    /// period. `tower_targets` must be sorted by tower identifier.
    pub fn handle(&mut self, now: Duration, tower_targets: &[TowerTarget], out: &mut Vec<Command>) {
        if self.session != SessionState::Running {
            return;
        }

        for (tower, trigger) in &mut self.triggers {
            if !trigger.poll(now, self.attack_period) {
                continue;
            }

            if let Some(target) = find_target(tower_targets, *tower) {
                out.push(Command::FireProjectile {
                    tower: *tower,
                    target: target.monster,
                });
            }
        }
    }

    /// Scheduling state of a tower's trigger, if the tower is known.
    #[must_use]
    pub fn trigger_state(&self, tower: TowerId) -> Option<TriggerState> {
        self.triggers.get(&tower).map(|trigger| trigger.state)
    }
}

fn find_target(targets: &[TowerTarget], tower: TowerId) -> Option<&TowerTarget> {
    targets
        .binary_search_by_key(&tower, |target| target.tower)
        .ok()
        .map(|index| &targets[index])
}
