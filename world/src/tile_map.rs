//! Default grid provider: a fixed tile map with a carved monster path.

use path_defence_core::{PathGrid, TileCoord, WaypointPath};
use thiserror::Error;

/// Number of tile columns in the default map (1280 pixels at 64 pixels per tile).
pub const DEFAULT_COLUMNS: u32 = 20;
/// Number of tile rows in the default map (800 pixels at 64 pixels per tile).
pub const DEFAULT_ROWS: u32 = 12;
/// Serpentine path carved into the default map, as `(column, row)` tiles.
pub const DEFAULT_WAYPOINTS: [(u32, u32); 6] = [(0, 1), (17, 1), (17, 5), (2, 5), (2, 9), (19, 9)];

const DEFAULT_TILE_LENGTH: f32 = 64.0;

/// Reasons a tile map cannot be built from the supplied layout.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum MapError {
    /// Either dimension is zero.
    #[error("the map needs at least one column and one row")]
    EmptyGrid,
    /// The tile length is zero, negative or not a number.
    #[error("tile length must be positive, got {0}")]
    InvalidTileLength(f32),
    /// The path does not have a start and an end.
    #[error("a path needs at least two waypoints, got {0}")]
    TooFewWaypoints(usize),
    /// A waypoint lies outside the grid.
    #[error("waypoint {0} lies outside the map")]
    WaypointOutOfBounds(TileCoord),
    /// Two consecutive waypoints share neither a row nor a column.
    #[error("path segment from {from} to {to} is not axis-aligned")]
    DiagonalSegment {
        /// Waypoint the segment starts at.
        from: TileCoord,
        /// Waypoint the segment ends at.
        to: TileCoord,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TileKind {
    Open,
    Path,
    Tower,
}

/// Rectangular tile map with a fixed path and tower occupancy.
#[derive(Clone, Debug)]
pub struct TileMap {
    columns: u32,
    rows: u32,
    tile_length: f32,
    tiles: Vec<TileKind>,
    path: WaypointPath,
}

impl TileMap {
    /// Builds a map of the given size with a path through `waypoints`.
    ///
    /// Consecutive waypoints must share a row or a column; every tile between
    /// them becomes part of the path and can never hold a tower.
    pub fn new(
        columns: u32,
        rows: u32,
        tile_length: f32,
        waypoints: &[TileCoord],
    ) -> Result<Self, MapError> {
        if columns == 0 || rows == 0 {
            return Err(MapError::EmptyGrid);
        }
        if !(tile_length.is_finite() && tile_length > 0.0) {
            return Err(MapError::InvalidTileLength(tile_length));
        }
        if waypoints.len() < 2 {
            return Err(MapError::TooFewWaypoints(waypoints.len()));
        }
        if let Some(outside) = waypoints
            .iter()
            .find(|waypoint| waypoint.column() >= columns || waypoint.row() >= rows)
        {
            return Err(MapError::WaypointOutOfBounds(*outside));
        }
        for pair in waypoints.windows(2) {
            let (from, to) = (pair[0], pair[1]);
            if from.column() != to.column() && from.row() != to.row() {
                return Err(MapError::DiagonalSegment { from, to });
            }
        }

        Ok(Self::carve(columns, rows, tile_length, waypoints))
    }

    fn carve(columns: u32, rows: u32, tile_length: f32, waypoints: &[TileCoord]) -> Self {
        let capacity_u64 = u64::from(columns) * u64::from(rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        let mut map = Self {
            columns,
            rows,
            tile_length,
            tiles: vec![TileKind::Open; capacity],
            path: WaypointPath::new(
                waypoints
                    .iter()
                    .map(|waypoint| waypoint.center(tile_length))
                    .collect(),
            ),
        };

        for pair in waypoints.windows(2) {
            let (from, to) = (pair[0], pair[1]);
            for column in from.column().min(to.column())..=from.column().max(to.column()) {
                for row in from.row().min(to.row())..=from.row().max(to.row()) {
                    map.set(TileCoord::new(column, row), TileKind::Path);
                }
            }
        }
        map
    }

    /// Side length of a single tile in pixels.
    #[must_use]
    pub const fn tile_length(&self) -> f32 {
        self.tile_length
    }

    /// Reports whether the tile is part of the monster path.
    #[must_use]
    pub fn is_path(&self, tile: TileCoord) -> bool {
        self.kind(tile) == Some(TileKind::Path)
    }

    fn kind(&self, tile: TileCoord) -> Option<TileKind> {
        self.index(tile)
            .and_then(|index| self.tiles.get(index).copied())
    }

    fn set(&mut self, tile: TileCoord, kind: TileKind) {
        if let Some(index) = self.index(tile) {
            if let Some(slot) = self.tiles.get_mut(index) {
                *slot = kind;
            }
        }
    }

    fn index(&self, tile: TileCoord) -> Option<usize> {
        if tile.column() < self.columns && tile.row() < self.rows {
            let row = usize::try_from(tile.row()).ok()?;
            let column = usize::try_from(tile.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

impl Default for TileMap {
    fn default() -> Self {
        Self::carve(
            DEFAULT_COLUMNS,
            DEFAULT_ROWS,
            DEFAULT_TILE_LENGTH,
            &default_waypoints(),
        )
    }
}

/// Waypoints of the default map as tile coordinates.
#[must_use]
pub fn default_waypoints() -> Vec<TileCoord> {
    DEFAULT_WAYPOINTS
        .iter()
        .map(|(column, row)| TileCoord::new(*column, *row))
        .collect()
}

impl PathGrid for TileMap {
    fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    fn is_tile_open(&self, tile: TileCoord) -> bool {
        self.kind(tile) == Some(TileKind::Open)
    }

    fn path(&self) -> &WaypointPath {
        &self.path
    }

    fn occupy(&mut self, tile: TileCoord) {
        self.set(tile, TileKind::Tower);
    }
}
