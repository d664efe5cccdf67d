#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative game state management for Path Defence.
//!
//! The [`World`] owns every piece of mutable session data: the economy
//! counters, the live monster set, the towers and the in-flight projectiles.
//! It is mutated exclusively through [`apply`] and observed through the
//! [`query`] module.

mod monsters;
mod projectiles;
mod tile_map;
mod towers;

use glam::Vec2;
use path_defence_core::{
    Command, Event, MonsterId, PathGrid, ProjectileId, PurchaseError, Rules, SessionState,
    Settlement, TileCoord, TowerId, TransitionError, WaypointPath,
};

pub use tile_map::{
    default_waypoints, MapError, TileMap, DEFAULT_COLUMNS, DEFAULT_ROWS, DEFAULT_WAYPOINTS,
};

use monsters::Monster;
use projectiles::Projectile;
use towers::TowerRegistry;

/// Represents the authoritative Path Defence session state.
#[derive(Debug)]
pub struct World {
    rules: Rules,
    grid: Box<dyn PathGrid>,
    path: WaypointPath,
    session: SessionState,
    level: u32,
    lives: u32,
    resources: u32,
    score: u64,
    monsters: Vec<Monster>,
    towers: TowerRegistry,
    projectiles: Vec<Projectile>,
    removal_queue: Vec<MonsterId>,
    next_monster_id: MonsterId,
    next_projectile_id: ProjectileId,
}

impl World {
    /// Creates a running session on the provided grid.
    ///
    /// The grid's path is captured once; it is treated as fixed for the
    /// lifetime of the world.
    #[must_use]
    pub fn new<G>(rules: Rules, grid: G) -> Self
    where
        G: PathGrid + 'static,
    {
        let path = grid.path().clone();
        Self {
            level: 1,
            lives: rules.starting_lives,
            resources: rules.starting_resources,
            score: 0,
            rules,
            grid: Box::new(grid),
            path,
            session: SessionState::Running,
            monsters: Vec::new(),
            towers: TowerRegistry::new(),
            projectiles: Vec::new(),
            removal_queue: Vec::new(),
            next_monster_id: MonsterId::new(0),
            next_projectile_id: ProjectileId::new(0),
        }
    }

    fn is_running(&self) -> bool {
        self.session == SessionState::Running
    }

    fn monster_index(&self, monster: MonsterId) -> Option<usize> {
        self.monsters
            .binary_search_by_key(&monster, |candidate| candidate.id)
            .ok()
    }

    fn spawn_monster(&mut self, health: u32, out_events: &mut Vec<Event>) {
        if !self.is_running() {
            return;
        }

        let id = self.next_monster_id;
        self.next_monster_id = MonsterId::new(id.get().saturating_add(1));
        self.monsters
            .push(Monster::spawn(id, health, self.rules.monster_reward));
        out_events.push(Event::MonsterSpawned {
            monster: id,
            position: self.path.start(),
            health,
        });
    }

    fn advance_level(&mut self, out_events: &mut Vec<Event>) {
        if !self.is_running() {
            return;
        }

        self.level = self.level.saturating_add(1);
        out_events.push(Event::LevelAdvanced { level: self.level });
    }

    fn purchase_tower(&mut self, position: Vec2) -> Result<(TowerId, TileCoord), PurchaseError> {
        if self.session == SessionState::Stopped {
            return Err(PurchaseError::SessionStopped);
        }

        let tile = TileCoord::from_pixel(position, self.rules.tile_length)
            .filter(|tile| self.grid.contains(*tile))
            .ok_or(PurchaseError::OutOfBounds)?;
        if !self.grid.is_tile_open(tile) {
            return Err(PurchaseError::TileUnavailable(tile));
        }

        let cost = self.rules.tower_cost;
        if self.resources < cost {
            return Err(PurchaseError::InsufficientResources {
                cost,
                available: self.resources,
            });
        }

        self.resources -= cost;
        let tower = self
            .towers
            .insert(tile, tile.center(self.rules.tile_length));
        self.grid.occupy(tile);
        Ok((tower, tile))
    }

    fn fire_projectile(&mut self, tower: TowerId, target: MonsterId, out_events: &mut Vec<Event>) {
        if !self.is_running() {
            return;
        }

        let Some(index) = self.monster_index(target) else {
            return;
        };
        let monster = &self.monsters[index];
        if monster.kill_switch {
            return;
        }
        let destination = self.path.position_at(monster.progress);

        let Some(state) = self.towers.get_mut(tower) else {
            return;
        };
        let id = self.next_projectile_id;
        self.next_projectile_id = ProjectileId::new(id.get().saturating_add(1));
        state.pending.push(Projectile::new(
            id,
            tower,
            target,
            state.center,
            destination,
            self.rules.projectile_travel_ticks,
        ));
        out_events.push(Event::ProjectileQueued {
            projectile: id,
            tower,
            target,
        });
    }

    /// Mark, settle, then compact. Settlement runs exactly once per monster
    /// because settled monsters leave the live set in the same pass.
    fn settle_monsters(&mut self, out_events: &mut Vec<Event>) {
        if !self.is_running() {
            return;
        }

        self.removal_queue.clear();
        let lives_before = self.lives;

        for monster in &self.monsters {
            if !monster.kill_switch {
                continue;
            }
            debug_assert!(
                self.removal_queue.last() < Some(&monster.id),
                "monster {} settled twice",
                monster.id.get()
            );
            self.removal_queue.push(monster.id);

            let outcome = if monster.path_finished {
                self.lives = self.lives.saturating_sub(1);
                Settlement::Escaped
            } else {
                let score = u64::from(monster.reward) * u64::from(self.level);
                self.resources = self.resources.saturating_add(monster.reward);
                self.score = self.score.saturating_add(score);
                Settlement::Slain {
                    reward: monster.reward,
                    score,
                }
            };
            out_events.push(Event::MonsterSettled {
                monster: monster.id,
                outcome,
            });
        }

        if self.removal_queue.is_empty() {
            return;
        }

        let queue = &self.removal_queue;
        self.monsters
            .retain(|monster| queue.binary_search(&monster.id).is_err());
        self.removal_queue.clear();

        if lives_before > 0 && self.lives == 0 {
            out_events.push(Event::LivesExhausted);
        }
    }

    fn drain_projectiles(&mut self, out_events: &mut Vec<Event>) {
        if !self.is_running() {
            return;
        }

        for tower in self.towers.iter_mut() {
            for projectile in tower.pending.drain(..) {
                out_events.push(Event::ProjectileLaunched {
                    projectile: projectile.id,
                    tower: projectile.tower,
                    target: projectile.target,
                    origin: projectile.origin,
                    destination: projectile.destination,
                });
                self.projectiles.push(projectile);
            }
        }
    }

    fn advance_monsters(&mut self, step: f32, out_events: &mut Vec<Event>) {
        if !self.is_running() {
            return;
        }

        let path_length = self.path.length();
        for monster in &mut self.monsters {
            if monster.update_location(step, path_length) {
                out_events.push(Event::MonsterReachedEnd {
                    monster: monster.id,
                });
            }
        }
    }

    fn advance_projectiles(&mut self, out_events: &mut Vec<Event>) {
        if !self.is_running() {
            return;
        }

        let Self {
            projectiles,
            monsters,
            rules,
            ..
        } = self;
        let damage = rules.projectile_damage;

        projectiles.retain_mut(|projectile| {
            if !projectile.advance() {
                return true;
            }

            let hit = monsters
                .binary_search_by_key(&projectile.target, |monster| monster.id)
                .ok()
                .and_then(|index| monsters[index].take_damage(damage))
                .map(|remaining| {
                    out_events.push(Event::MonsterDamaged {
                        monster: projectile.target,
                        remaining,
                    });
                    projectile.target
                });
            out_events.push(Event::ProjectileResolved {
                projectile: projectile.id,
                hit,
            });
            false
        });
    }

    fn set_session_state(&mut self, requested: SessionState, out_events: &mut Vec<Event>) {
        let from = self.session;
        if !from.can_transition_to(requested) {
            out_events.push(Event::SessionTransitionRejected {
                error: TransitionError { from, requested },
            });
            return;
        }

        self.session = requested;
        out_events.push(Event::SessionStateChanged {
            from,
            to: requested,
        });
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(Rules::default(), TileMap::default())
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Tick sub-step commands are ignored unless the session is running.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::SpawnMonster { health } => world.spawn_monster(health, out_events),
        Command::AdvanceLevel => world.advance_level(out_events),
        Command::PurchaseTower { position } => match world.purchase_tower(position) {
            Ok((tower, tile)) => out_events.push(Event::TowerPurchased {
                tower,
                tile,
                cost: world.rules.tower_cost,
            }),
            Err(reason) => out_events.push(Event::TowerPurchaseRejected { position, reason }),
        },
        Command::FireProjectile { tower, target } => {
            world.fire_projectile(tower, target, out_events);
        }
        Command::SettleMonsters => world.settle_monsters(out_events),
        Command::DrainProjectiles => world.drain_projectiles(out_events),
        Command::AdvanceMonsters { step } => world.advance_monsters(step, out_events),
        Command::AdvanceProjectiles => world.advance_projectiles(out_events),
        Command::SetSessionState { state } => world.set_session_state(state, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use path_defence_core::{
        MonsterSnapshot, MonsterView, PathGrid, ProjectileSnapshot, Rules, SessionState,
        TileCoord, TowerId, TowerSnapshot, TowerView, WaypointPath,
    };

    use super::World;

    /// Numeric rules the world was created with.
    #[must_use]
    pub fn rules(world: &World) -> &Rules {
        &world.rules
    }

    /// Current lifecycle state of the session.
    #[must_use]
    pub fn session_state(world: &World) -> SessionState {
        world.session
    }

    /// Current level (wave) counter, starting at 1.
    #[must_use]
    pub fn level(world: &World) -> u32 {
        world.level
    }

    /// Lives left.
    #[must_use]
    pub fn lives(world: &World) -> u32 {
        world.lives
    }

    /// Resources available for purchases.
    #[must_use]
    pub fn resources(world: &World) -> u32 {
        world.resources
    }

    /// Accumulated score.
    #[must_use]
    pub fn score(world: &World) -> u64 {
        world.score
    }

    /// Fixed path monsters walk along.
    #[must_use]
    pub fn path(world: &World) -> &WaypointPath {
        &world.path
    }

    /// Grid dimensions in tiles.
    #[must_use]
    pub fn dimensions(world: &World) -> (u32, u32) {
        world.grid.dimensions()
    }

    /// Reports whether a tower could be built on the tile.
    #[must_use]
    pub fn is_tile_open(world: &World, tile: TileCoord) -> bool {
        world.grid.is_tile_open(tile)
    }

    /// Enumerates every buildable tile in row-major order.
    #[must_use]
    pub fn open_tiles(world: &World) -> Vec<TileCoord> {
        let (columns, rows) = world.grid.dimensions();
        (0..rows)
            .flat_map(|row| (0..columns).map(move |column| TileCoord::new(column, row)))
            .filter(|tile| world.grid.is_tile_open(*tile))
            .collect()
    }

    /// Captures a read-only view of the live monsters in spawn order.
    #[must_use]
    pub fn monster_view(world: &World) -> MonsterView {
        MonsterView::from_snapshots(
            world
                .monsters
                .iter()
                .map(|monster| MonsterSnapshot {
                    id: monster.id,
                    position: world.path.position_at(monster.progress),
                    health: monster.health,
                    progress: monster.progress,
                    kill_switch: monster.kill_switch,
                    path_finished: monster.path_finished,
                })
                .collect(),
        )
    }

    /// Captures a read-only view of the towers in purchase order.
    #[must_use]
    pub fn tower_view(world: &World) -> TowerView {
        TowerView::from_snapshots(
            world
                .towers
                .iter()
                .map(|tower| TowerSnapshot {
                    id: tower.id,
                    tile: tower.tile,
                    center: tower.center,
                    range: world.rules.tower_range,
                    pending_projectiles: tower.pending.len(),
                })
                .collect(),
        )
    }

    /// Number of towers bought so far.
    #[must_use]
    pub fn tower_count(world: &World) -> usize {
        world.towers.len()
    }

    /// Number of projectiles a tower fired that have not been drained yet.
    #[must_use]
    pub fn pending_projectiles(world: &World, tower: TowerId) -> Option<usize> {
        world.towers.get(tower).map(|tower| tower.pending.len())
    }

    /// Captures the projectiles currently travelling.
    #[must_use]
    pub fn projectile_view(world: &World) -> Vec<ProjectileSnapshot> {
        world
            .projectiles
            .iter()
            .map(|projectile| ProjectileSnapshot {
                id: projectile.id,
                tower: projectile.tower,
                target: projectile.target,
                position: projectile.position(),
                progress: projectile.progress(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(world: &mut World, command: Command) -> Vec<Event> {
        let mut events = Vec::new();
        apply(world, command, &mut events);
        events
    }

    #[test]
    fn fresh_world_uses_rules() {
        let world = World::default();
        assert_eq!(query::level(&world), 1);
        assert_eq!(query::lives(&world), 20);
        assert_eq!(query::resources(&world), 100);
        assert_eq!(query::score(&world), 0);
        assert_eq!(query::session_state(&world), SessionState::Running);
        assert!(query::monster_view(&world).is_empty());
    }

    #[test]
    fn spawned_monsters_keep_spawn_order() {
        let mut world = World::default();
        let first = run(&mut world, Command::SpawnMonster { health: 3 });
        let _ = run(&mut world, Command::SpawnMonster { health: 3 });

        assert_eq!(
            first,
            vec![Event::MonsterSpawned {
                monster: MonsterId::new(0),
                position: query::path(&world).start(),
                health: 3,
            }]
        );
        let ids: Vec<u32> = query::monster_view(&world)
            .iter()
            .map(|monster| monster.id.get())
            .collect();
        assert_eq!(ids, vec![0, 1]);
    }

    #[test]
    fn level_advances_by_one() {
        let mut world = World::default();
        let events = run(&mut world, Command::AdvanceLevel);
        assert_eq!(events, vec![Event::LevelAdvanced { level: 2 }]);
        assert_eq!(query::level(&world), 2);
    }

    #[test]
    fn purchase_converts_pixels_to_tiles() {
        let mut world = World::default();
        let events = run(
            &mut world,
            Command::PurchaseTower {
                position: Vec2::new(100.0, 170.0),
            },
        );

        assert_eq!(
            events,
            vec![Event::TowerPurchased {
                tower: TowerId::new(0),
                tile: TileCoord::new(1, 2),
                cost: 50,
            }]
        );
        let tower = query::tower_view(&world).into_vec()[0];
        assert_eq!(tower.center, Vec2::new(96.0, 160.0));
    }

    #[test]
    fn purchase_outside_map_is_rejected() {
        let mut world = World::default();
        let events = run(
            &mut world,
            Command::PurchaseTower {
                position: Vec2::new(1300.0, 10.0),
            },
        );
        assert_eq!(
            events,
            vec![Event::TowerPurchaseRejected {
                position: Vec2::new(1300.0, 10.0),
                reason: PurchaseError::OutOfBounds,
            }]
        );
        assert_eq!(query::resources(&world), 100);
    }

    #[test]
    fn session_transitions_are_validated() {
        let mut world = World::default();
        let events = run(
            &mut world,
            Command::SetSessionState {
                state: SessionState::Running,
            },
        );
        assert_eq!(
            events,
            vec![Event::SessionTransitionRejected {
                error: TransitionError {
                    from: SessionState::Running,
                    requested: SessionState::Running,
                },
            }]
        );

        let events = run(
            &mut world,
            Command::SetSessionState {
                state: SessionState::Paused,
            },
        );
        assert_eq!(
            events,
            vec![Event::SessionStateChanged {
                from: SessionState::Running,
                to: SessionState::Paused,
            }]
        );
    }

    #[test]
    fn paused_world_ignores_tick_sub_steps() {
        let mut world = World::default();
        let _ = run(&mut world, Command::SpawnMonster { health: 3 });
        let _ = run(
            &mut world,
            Command::SetSessionState {
                state: SessionState::Paused,
            },
        );

        assert!(run(&mut world, Command::SpawnMonster { health: 3 }).is_empty());
        assert!(run(&mut world, Command::AdvanceMonsters { step: 10.0 }).is_empty());
        assert!(run(&mut world, Command::AdvanceLevel).is_empty());
        let monsters = query::monster_view(&world).into_vec();
        assert_eq!(monsters.len(), 1);
        assert_eq!(monsters[0].progress, 0.0);
        assert_eq!(query::level(&world), 1);
    }

    #[test]
    fn open_tiles_exclude_path_and_towers() {
        let mut world = World::default();
        let before = query::open_tiles(&world);
        assert!(!before.contains(&TileCoord::new(0, 1)));
        assert!(before.contains(&TileCoord::new(0, 0)));

        let _ = run(
            &mut world,
            Command::PurchaseTower {
                position: Vec2::new(10.0, 10.0),
            },
        );
        let after = query::open_tiles(&world);
        assert_eq!(after.len(), before.len() - 1);
        assert!(!after.contains(&TileCoord::new(0, 0)));
    }
}
