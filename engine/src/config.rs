//! Session configuration.

use std::time::Duration;

use path_defence_core::{Rules, TileCoord};
use path_defence_world::{DEFAULT_COLUMNS, DEFAULT_ROWS, DEFAULT_WAYPOINTS};
use serde::{Deserialize, Serialize};

/// Everything needed to start a session. Missing sections fall back to the
/// classic 20x12 map and its pacing.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Economy, entity and movement rules.
    pub rules: Rules,
    /// Wave clock pacing.
    pub waves: WaveSettings,
    /// Tower attack cadence.
    pub combat: CombatSettings,
    /// Grid layout and monster path.
    pub map: MapSettings,
}

/// Pacing of the per-second wave clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveSettings {
    /// Countdown value at session start.
    pub initial_countdown: u32,
    /// Countdown value after every level-up.
    pub wave_length: u32,
    /// A monster spawns each second while the countdown is above this value.
    pub spawn_threshold: u32,
}

impl Default for WaveSettings {
    fn default() -> Self {
        Self {
            initial_countdown: 10,
            wave_length: 30,
            spawn_threshold: 19,
        }
    }
}

/// Tower attack cadence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatSettings {
    /// Milliseconds between two firings of the same tower.
    pub attack_period_ms: u64,
}

impl CombatSettings {
    /// Attack period as a duration.
    #[must_use]
    pub fn attack_period(&self) -> Duration {
        Duration::from_millis(self.attack_period_ms)
    }
}

impl Default for CombatSettings {
    fn default() -> Self {
        Self {
            attack_period_ms: 1_000,
        }
    }
}

/// Grid layout. Waypoints are `[column, row]` pairs joined by straight
/// horizontal or vertical segments.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapSettings {
    /// Number of tile columns.
    pub columns: u32,
    /// Number of tile rows.
    pub rows: u32,
    /// Tiles the monster path turns at, in walking order.
    pub waypoints: Vec<[u32; 2]>,
}

impl MapSettings {
    /// Waypoints converted to tile coordinates.
    #[must_use]
    pub fn waypoint_tiles(&self) -> Vec<TileCoord> {
        self.waypoints
            .iter()
            .map(|[column, row]| TileCoord::new(*column, *row))
            .collect()
    }
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            columns: DEFAULT_COLUMNS,
            rows: DEFAULT_ROWS,
            waypoints: DEFAULT_WAYPOINTS
                .iter()
                .map(|(column, row)| [*column, *row])
                .collect(),
        }
    }
}
