#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Simulation tick engine for Path Defence.
//!
//! A [`Session`] owns the authoritative world together with the wave clock,
//! the targeting system and the tower attack scheduler. The host drives it by
//! calling [`Session::tick`] once per frame with a monotonic timestamp; every
//! running tick executes the same fixed sequence of sub-steps and publishes a
//! single [`Frame`] to the host's [`Presenter`].
//!
//! All mutation funnels through one private command executor, so the session
//! is the only owner of the world and nothing can interleave with the
//! settlement pass.

mod config;
mod frame;

use std::{mem, time::Duration};

use glam::Vec2;
use path_defence_core::{
    Command, Event, PathGrid, PurchaseError, SessionState, TowerId, TowerTarget,
    TransitionError,
};
use path_defence_system_spawning::{Config as WaveConfig, WaveClock};
use path_defence_system_tower_combat::{Config as CombatConfig, TowerCombat};
use path_defence_system_tower_targeting::TowerTargeting;
use path_defence_world::{self as world, query, MapError, TileMap, World};
use thiserror::Error;
use tracing::{debug, info, trace};

pub use config::{CombatSettings, MapSettings, SessionConfig, WaveSettings};
pub use frame::{EntityRef, Frame, NullPresenter, Presenter, StatusLabels};
pub use path_defence_system_tower_combat::TriggerState;

use frame::FrameBuilder;

/// Reasons a session cannot be started.
#[derive(Debug, Error, PartialEq)]
pub enum SessionError {
    /// The configured map could not be built.
    #[error("invalid map: {0}")]
    Map(#[from] MapError),
    /// Towers would never fire.
    #[error("tower attack period must be positive")]
    ZeroAttackPeriod,
    /// The countdown would reset to zero and level up every second.
    #[error("wave length must be positive")]
    ZeroWaveLength,
    /// Monsters would never reach the end of the path.
    #[error("monster step must be a positive number of pixels, got {0}")]
    InvalidMonsterStep(f32),
}

/// A single game session and the engine that advances it.
#[derive(Debug)]
pub struct Session {
    world: World,
    waves: WaveClock,
    targeting: TowerTargeting,
    combat: TowerCombat,
    frame: FrameBuilder,
    commands: Vec<Command>,
    events: Vec<Event>,
    targets: Vec<TowerTarget>,
}

impl Session {
    /// Builds the map and starts a running session.
    pub fn new(config: SessionConfig) -> Result<Self, SessionError> {
        if config.combat.attack_period_ms == 0 {
            return Err(SessionError::ZeroAttackPeriod);
        }
        if config.waves.wave_length == 0 {
            return Err(SessionError::ZeroWaveLength);
        }
        let step = config.rules.monster_step;
        if !(step.is_finite() && step > 0.0) {
            return Err(SessionError::InvalidMonsterStep(step));
        }

        let map = TileMap::new(
            config.map.columns,
            config.map.rows,
            config.rules.tile_length,
            &config.map.waypoint_tiles(),
        )?;
        let waves = WaveClock::new(WaveConfig::new(
            config.waves.initial_countdown,
            config.waves.wave_length,
            config.waves.spawn_threshold,
            config.rules.monster_health,
        ));
        let combat = TowerCombat::new(CombatConfig::new(config.combat.attack_period()));

        info!(
            columns = config.map.columns,
            rows = config.map.rows,
            path_length = map.path().length(),
            "session started"
        );

        Ok(Self {
            world: World::new(config.rules, map),
            waves,
            targeting: TowerTargeting::new(),
            combat,
            frame: FrameBuilder::default(),
            commands: Vec::new(),
            events: Vec::new(),
            targets: Vec::new(),
        })
    }

    /// Advances the session by one frame.
    ///
    /// Does nothing unless the session is running. Otherwise polls the tower
    /// attack triggers, then settles, drains, moves monsters, moves
    /// projectiles, publishes a frame and finally runs the wave clock. A tick
    /// that exhausts the last life stops the session after publishing.
    pub fn tick<P>(&mut self, now: Duration, presenter: &mut P)
    where
        P: Presenter + ?Sized,
    {
        if query::session_state(&self.world) != SessionState::Running {
            return;
        }
        trace!(?now, "tick");

        self.targets.clear();
        let towers = query::tower_view(&self.world);
        if !towers.is_empty() {
            let monsters = query::monster_view(&self.world);
            self.targeting.handle(&towers, &monsters, &mut self.targets);
        }
        self.combat.handle(now, &self.targets, &mut self.commands);

        let step = query::rules(&self.world).monster_step;
        self.commands.extend([
            Command::SettleMonsters,
            Command::DrainProjectiles,
            Command::AdvanceMonsters { step },
            Command::AdvanceProjectiles,
        ]);
        self.flush_commands();

        let labels = self.labels();
        let frame = self.frame.finish(labels);
        presenter.present(&frame);

        if query::lives(&self.world) == 0 {
            info!(
                score = query::score(&self.world),
                level = query::level(&self.world),
                "no lives left, stopping session"
            );
            self.execute(Command::SetSessionState {
                state: SessionState::Stopped,
            });
            return;
        }

        if self.waves.handle(now, &mut self.commands) {
            trace!(countdown = self.waves.countdown(), "second elapsed");
        }
        self.flush_commands();
    }

    /// Buys a tower on the tile under the pixel position.
    ///
    /// Purchases are accepted while running or paused. A rejected purchase
    /// changes nothing.
    pub fn buy_tower(&mut self, x: f32, y: f32) -> Result<TowerId, PurchaseError> {
        self.execute(Command::PurchaseTower {
            position: Vec2::new(x, y),
        });
        // `apply` answers a purchase with exactly one of these two events;
        // the last arm is never taken.
        match self.events.as_slice() {
            [Event::TowerPurchased { tower, .. }] => Ok(*tower),
            [Event::TowerPurchaseRejected { reason, .. }] => Err(*reason),
            _ => Err(PurchaseError::SessionStopped),
        }
    }

    /// Suspends the session and every tower's attack trigger.
    pub fn pause(&mut self) -> Result<(), TransitionError> {
        self.transition(SessionState::Paused)
    }

    /// Resumes a paused session and re-arms the attack triggers.
    pub fn resume(&mut self) -> Result<(), TransitionError> {
        self.transition(SessionState::Running)
    }

    /// Ends the session for good.
    pub fn stop(&mut self) -> Result<(), TransitionError> {
        self.transition(SessionState::Stopped)
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        query::session_state(&self.world)
    }

    /// Labels as they would be published right now.
    #[must_use]
    pub fn labels(&self) -> StatusLabels {
        StatusLabels {
            level: query::level(&self.world),
            lives: query::lives(&self.world),
            resources: query::resources(&self.world),
            score: query::score(&self.world),
            countdown: self.waves.countdown(),
        }
    }

    /// Read-only access to the world for [`query`] functions.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Scheduling state of a tower's attack trigger.
    #[must_use]
    pub fn attack_trigger(&self, tower: TowerId) -> Option<TriggerState> {
        self.combat.trigger_state(tower)
    }

    fn transition(&mut self, state: SessionState) -> Result<(), TransitionError> {
        self.execute(Command::SetSessionState { state });
        // `apply` answers a transition with exactly one of these two events;
        // the last arm is never taken.
        match self.events.as_slice() {
            [Event::SessionStateChanged { .. }] => Ok(()),
            [Event::SessionTransitionRejected { error }] => Err(*error),
            _ => Err(TransitionError {
                from: self.state(),
                requested: state,
            }),
        }
    }

    fn flush_commands(&mut self) {
        let mut commands = mem::take(&mut self.commands);
        for command in commands.drain(..) {
            self.execute(command);
        }
        self.commands = commands;
    }

    fn execute(&mut self, command: Command) {
        self.events.clear();
        world::apply(&mut self.world, command, &mut self.events);
        self.combat.observe(&self.events);
        self.frame.record(&self.events);
        log_events(&self.events);
    }
}

fn log_events(events: &[Event]) {
    for event in events {
        match event {
            Event::LevelAdvanced { level } => info!(level = *level, "level advanced"),
            Event::SessionStateChanged { from, to } => {
                info!(from = ?from, to = ?to, "session state changed");
            }
            Event::SessionTransitionRejected { error } => {
                debug!(%error, "session transition rejected");
            }
            Event::LivesExhausted => info!("lives exhausted"),
            Event::TowerPurchased { tower, tile, cost } => {
                debug!(tower = tower.get(), %tile, cost = *cost, "tower purchased");
            }
            Event::TowerPurchaseRejected { position, reason } => {
                debug!(x = position.x, y = position.y, %reason, "tower purchase rejected");
            }
            Event::MonsterSettled { monster, outcome } => {
                trace!(monster = monster.get(), ?outcome, "monster settled");
            }
            _ => {}
        }
    }
}
