#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Path Defence engine.
//!
//! This crate defines the message surface that connects the tick engine, the
//! authoritative world, and pure systems. The engine submits [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems and
//! presentation adapters to react to. Systems consume immutable views and
//! respond exclusively with new command batches.

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifecycle state of a single game session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionState {
    /// The simulation advances on every tick.
    Running,
    /// Ticks are ignored and tower attack triggers are suspended.
    Paused,
    /// Terminal state; the session never advances again.
    Stopped,
}

impl SessionState {
    /// Reports whether the session may move from `self` into `next`.
    #[must_use]
    pub const fn can_transition_to(self, next: SessionState) -> bool {
        matches!(
            (self, next),
            (Self::Running, Self::Paused)
                | (Self::Paused, Self::Running)
                | (Self::Running, Self::Stopped)
                | (Self::Paused, Self::Stopped)
        )
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Creates a monster at the start of the path.
    SpawnMonster {
        /// Health assigned to the new monster.
        health: u32,
    },
    /// Increments the level (wave) counter by one.
    AdvanceLevel,
    /// Attempts to buy a tower on the tile under the provided pixel position.
    PurchaseTower {
        /// Pixel-space position selected by the player.
        position: Vec2,
    },
    /// Queues a projectile from a tower towards a monster.
    FireProjectile {
        /// Tower that fired.
        tower: TowerId,
        /// Monster the projectile travels towards.
        target: MonsterId,
    },
    /// Settles and removes every monster whose kill switch is set.
    SettleMonsters,
    /// Moves every tower's queued projectiles into the active set.
    DrainProjectiles,
    /// Advances every live monster along the path.
    AdvanceMonsters {
        /// Distance travelled along the path, in pixels.
        step: f32,
    },
    /// Advances in-flight projectiles and resolves the ones that arrived.
    AdvanceProjectiles,
    /// Requests a session lifecycle transition.
    SetSessionState {
        /// State the session should enter.
        state: SessionState,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// A monster entered the path.
    MonsterSpawned {
        /// Identifier assigned to the monster.
        monster: MonsterId,
        /// Pixel position the monster starts at.
        position: Vec2,
        /// Starting health.
        health: u32,
    },
    /// A projectile hit a live monster.
    MonsterDamaged {
        /// Monster that was hit.
        monster: MonsterId,
        /// Health left after the hit.
        remaining: u32,
    },
    /// A monster walked off the end of the path.
    MonsterReachedEnd {
        /// Monster that finished the path.
        monster: MonsterId,
    },
    /// A dead or finished monster was settled and removed.
    MonsterSettled {
        /// Monster that was removed.
        monster: MonsterId,
        /// Bookkeeping applied for the monster.
        outcome: Settlement,
    },
    /// Lives dropped to zero.
    LivesExhausted,
    /// The level counter advanced.
    LevelAdvanced {
        /// Level after the increment.
        level: u32,
    },
    /// A tower was bought and placed.
    TowerPurchased {
        /// Identifier allocated to the tower.
        tower: TowerId,
        /// Tile the tower occupies.
        tile: TileCoord,
        /// Resources deducted for the purchase.
        cost: u32,
    },
    /// A tower purchase was rejected without mutating state.
    TowerPurchaseRejected {
        /// Pixel position supplied with the request.
        position: Vec2,
        /// Reason the purchase failed.
        reason: PurchaseError,
    },
    /// A tower appended a projectile to its pending list.
    ProjectileQueued {
        /// Identifier allocated to the projectile.
        projectile: ProjectileId,
        /// Tower that fired.
        tower: TowerId,
        /// Monster being targeted.
        target: MonsterId,
    },
    /// A queued projectile was drained into the active set.
    ProjectileLaunched {
        /// Projectile that started travelling.
        projectile: ProjectileId,
        /// Tower that fired.
        tower: TowerId,
        /// Monster being targeted.
        target: MonsterId,
        /// Pixel position the projectile departs from.
        origin: Vec2,
        /// Pixel position the projectile travels to.
        destination: Vec2,
    },
    /// A projectile completed its travel and left the active set.
    ProjectileResolved {
        /// Projectile that finished travelling.
        projectile: ProjectileId,
        /// Monster that took damage, if the target was still live.
        hit: Option<MonsterId>,
    },
    /// The session moved between lifecycle states.
    SessionStateChanged {
        /// State before the transition.
        from: SessionState,
        /// State after the transition.
        to: SessionState,
    },
    /// A lifecycle transition was refused.
    SessionTransitionRejected {
        /// Details of the refused transition.
        error: TransitionError,
    },
}

/// Bookkeeping applied exactly once when a monster leaves the live set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Settlement {
    /// The monster was killed before finishing the path.
    Slain {
        /// Resources credited to the player.
        reward: u32,
        /// Score credited to the player (reward multiplied by level).
        score: u64,
    },
    /// The monster finished the path and cost the player a life.
    Escaped,
}

/// Reasons a tower purchase may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum PurchaseError {
    /// The player cannot afford the tower.
    #[error("tower costs {cost} but only {available} resources are available")]
    InsufficientResources {
        /// Price of a tower.
        cost: u32,
        /// Resources held when the purchase was attempted.
        available: u32,
    },
    /// The tile is part of the path or already holds a tower.
    #[error("tile {0} is not open for construction")]
    TileUnavailable(TileCoord),
    /// The position lies outside the grid.
    #[error("position lies outside the map")]
    OutOfBounds,
    /// The session has ended.
    #[error("the session has stopped")]
    SessionStopped,
}

/// A lifecycle transition that the session state machine does not allow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
#[error("cannot move session from {from:?} to {requested:?}")]
pub struct TransitionError {
    /// State the session was in.
    pub from: SessionState,
    /// State that was requested.
    pub requested: SessionState,
}

/// Unique identifier assigned to a monster. Allocation order matches spawn order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MonsterId(u32);

impl MonsterId {
    /// Creates a new monster identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a tower. Allocation order matches purchase order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the tower identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single map tile expressed as column and row indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    column: u32,
    row: u32,
}

impl TileCoord {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the tile.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the tile.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Resolves the tile containing the provided pixel position.
    ///
    /// Returns `None` for negative or non-finite positions and for a
    /// non-positive tile length.
    #[must_use]
    pub fn from_pixel(position: Vec2, tile_length: f32) -> Option<Self> {
        if !position.is_finite() || !(tile_length > 0.0) {
            return None;
        }
        if position.x < 0.0 || position.y < 0.0 {
            return None;
        }

        let column = (position.x / tile_length).floor();
        let row = (position.y / tile_length).floor();
        if column > u32::MAX as f32 || row > u32::MAX as f32 {
            return None;
        }
        Some(Self::new(column as u32, row as u32))
    }

    /// Pixel position of the tile's centre.
    #[must_use]
    pub fn center(self, tile_length: f32) -> Vec2 {
        Vec2::new(
            (self.column as f32 + 0.5) * tile_length,
            (self.row as f32 + 0.5) * tile_length,
        )
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// Ordered pixel-space waypoints that monsters follow from start to end.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WaypointPath {
    points: Vec<Vec2>,
    cumulative: Vec<f32>,
}

impl WaypointPath {
    /// Builds a path through the provided waypoints.
    #[must_use]
    pub fn new(points: Vec<Vec2>) -> Self {
        let mut cumulative = Vec::with_capacity(points.len());
        let mut travelled = 0.0;
        let mut previous: Option<Vec2> = None;
        for point in &points {
            if let Some(previous) = previous {
                travelled += previous.distance(*point);
            }
            cumulative.push(travelled);
            previous = Some(*point);
        }
        Self { points, cumulative }
    }

    /// Waypoints in travel order.
    #[must_use]
    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    /// Total length of the path in pixels.
    #[must_use]
    pub fn length(&self) -> f32 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    /// First waypoint, or the origin for an empty path.
    #[must_use]
    pub fn start(&self) -> Vec2 {
        self.points.first().copied().unwrap_or(Vec2::ZERO)
    }

    /// Interpolates the position reached after travelling `distance` pixels.
    ///
    /// Distances are clamped to the path, so anything past the end resolves
    /// to the final waypoint.
    #[must_use]
    pub fn position_at(&self, distance: f32) -> Vec2 {
        let Some(last) = self.points.last().copied() else {
            return Vec2::ZERO;
        };
        if distance <= 0.0 {
            return self.start();
        }
        if distance >= self.length() {
            return last;
        }

        let segment = self
            .cumulative
            .partition_point(|travelled| *travelled <= distance)
            .saturating_sub(1);
        let from = self.points[segment];
        let to = self.points[segment + 1];
        let span = self.cumulative[segment + 1] - self.cumulative[segment];
        if span <= 0.0 {
            return from;
        }
        from.lerp(to, (distance - self.cumulative[segment]) / span)
    }

    /// Shortest distance from `point` to any segment of the path.
    #[must_use]
    pub fn distance_to(&self, point: Vec2) -> f32 {
        match self.points.as_slice() {
            [] => f32::INFINITY,
            [only] => only.distance(point),
            points => points
                .windows(2)
                .map(|segment| distance_to_segment(point, segment[0], segment[1]))
                .fold(f32::INFINITY, f32::min),
        }
    }
}

fn distance_to_segment(point: Vec2, from: Vec2, to: Vec2) -> f32 {
    let span = to - from;
    let length_sq = span.length_squared();
    if length_sq <= f32::EPSILON {
        return from.distance(point);
    }
    let t = ((point - from).dot(span) / length_sq).clamp(0.0, 1.0);
    (from + span * t).distance(point)
}

/// Read-only contract of the map that supplies the path and tile occupancy.
pub trait PathGrid: fmt::Debug {
    /// Number of tile columns and rows in the grid.
    fn dimensions(&self) -> (u32, u32);

    /// Reports whether a tower may be built on the tile.
    fn is_tile_open(&self, tile: TileCoord) -> bool;

    /// Fixed path that monsters traverse.
    fn path(&self) -> &WaypointPath;

    /// Marks the tile as permanently occupied.
    fn occupy(&mut self, tile: TileCoord);

    /// Reports whether the tile lies inside the grid.
    fn contains(&self, tile: TileCoord) -> bool {
        let (columns, rows) = self.dimensions();
        tile.column() < columns && tile.row() < rows
    }
}

/// Numeric rules governing economy, entities and movement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rules {
    /// Lives the player starts with.
    pub starting_lives: u32,
    /// Resources the player starts with.
    pub starting_resources: u32,
    /// Price of a single tower.
    pub tower_cost: u32,
    /// Side length of a square tile in pixels.
    pub tile_length: f32,
    /// Health assigned to freshly spawned monsters.
    pub monster_health: u32,
    /// Resources credited when a monster is slain.
    pub monster_reward: u32,
    /// Distance a monster travels along the path each tick, in pixels.
    pub monster_step: f32,
    /// Health removed by a single projectile hit.
    pub projectile_damage: u32,
    /// Ticks a projectile needs to reach its destination.
    pub projectile_travel_ticks: u32,
    /// Targeting radius of a tower measured from its tile centre, in pixels.
    pub tower_range: f32,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            starting_lives: 20,
            starting_resources: 100,
            tower_cost: 50,
            tile_length: 64.0,
            monster_health: 3,
            monster_reward: 10,
            monster_step: 1.0,
            projectile_damage: 1,
            projectile_travel_ticks: 20,
            tower_range: 192.0,
        }
    }
}

/// Immutable representation of a single monster used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MonsterSnapshot {
    /// Identifier assigned to the monster.
    pub id: MonsterId,
    /// Current pixel position on the path.
    pub position: Vec2,
    /// Remaining health.
    pub health: u32,
    /// Distance travelled along the path, in pixels.
    pub progress: f32,
    /// Set once the monster died or finished the path.
    pub kill_switch: bool,
    /// Set when the monster reached the end of the path before dying.
    pub path_finished: bool,
}

/// Read-only snapshot describing all monsters in spawn order.
#[derive(Clone, Debug, Default)]
pub struct MonsterView {
    snapshots: Vec<MonsterSnapshot>,
}

impl MonsterView {
    /// Creates a new monster view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<MonsterSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in spawn order.
    pub fn iter(&self) -> impl Iterator<Item = &MonsterSnapshot> {
        self.snapshots.iter()
    }

    /// Number of monsters captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view holds no monsters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<MonsterSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single tower used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerSnapshot {
    /// Identifier allocated to the tower.
    pub id: TowerId,
    /// Tile the tower occupies.
    pub tile: TileCoord,
    /// Pixel position of the tile centre.
    pub center: Vec2,
    /// Targeting radius in pixels.
    pub range: f32,
    /// Projectiles fired but not yet drained.
    pub pending_projectiles: usize,
}

/// Read-only snapshot describing all towers in purchase order.
#[derive(Clone, Debug, Default)]
pub struct TowerView {
    snapshots: Vec<TowerSnapshot>,
}

impl TowerView {
    /// Creates a new tower view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured tower snapshots in purchase order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerSnapshot> {
        self.snapshots.iter()
    }

    /// Number of towers captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view holds no towers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of an in-flight projectile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSnapshot {
    /// Identifier allocated to the projectile.
    pub id: ProjectileId,
    /// Tower that fired the projectile.
    pub tower: TowerId,
    /// Monster the projectile travels towards.
    pub target: MonsterId,
    /// Current interpolated pixel position.
    pub position: Vec2,
    /// Fraction of the travel completed, in `0.0..=1.0`.
    pub progress: f32,
}

/// Target assignment produced for a tower.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerTarget {
    /// Tower that owns the assignment.
    pub tower: TowerId,
    /// Monster selected as the target.
    pub monster: MonsterId,
    /// Pixel position of the tower's tile centre.
    pub tower_center: Vec2,
    /// Pixel position of the monster when the target was selected.
    pub monster_position: Vec2,
}
