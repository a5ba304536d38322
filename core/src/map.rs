//! Tile grid owned by the world and shared with adapters.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Location of a single tile expressed as column and row coordinates.
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

    /// Computes the Chebyshev distance between two tile coordinates.
    #[must_use]
    pub fn chebyshev_distance(self, other: TileCoord) -> u32 {
        self.column
            .abs_diff(other.column)
            .max(self.row.abs_diff(other.row))
    }
}

/// Terrain classification carried by every tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    /// Buildable ground that enemies may also traverse.
    Open,
    /// Paved ground reserved for enemy traffic.
    Path,
    /// Impassable terrain excluded from pathfinding.
    Obstacle,
    /// The tile enemies attack; reaching it costs the player health.
    Base,
    /// The tile where new enemies appear.
    Spawn,
}

impl TileKind {
    /// Resolves a kind from its map file code.
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Open),
            1 => Some(Self::Path),
            2 => Some(Self::Obstacle),
            3 => Some(Self::Base),
            4 => Some(Self::Spawn),
            _ => None,
        }
    }

    /// Map file code for this kind.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Open => 0,
            Self::Path => 1,
            Self::Obstacle => 2,
            Self::Base => 3,
            Self::Spawn => 4,
        }
    }
}

/// Errors produced while parsing a map text file.
#[derive(Debug, Error)]
pub enum MapParseError {
    /// The input contained no tile rows.
    #[error("map text contains no tile rows")]
    Empty,
    /// A row's width did not match the first row's width.
    #[error("row at line {line} holds {found} tiles, expected {expected}")]
    RaggedRow {
        /// One-based line number of the offending row.
        line: usize,
        /// Width established by the first row.
        expected: usize,
        /// Width actually found.
        found: usize,
    },
    /// A token was not a valid integer.
    #[error("line {line} contains non-numeric token '{token}'")]
    InvalidToken {
        /// One-based line number of the offending token.
        line: usize,
        /// The token that failed to parse.
        token: String,
    },
    /// An integer code did not map to a tile kind.
    #[error("line {line} contains unknown tile code {code}")]
    UnknownCode {
        /// One-based line number of the offending code.
        line: usize,
        /// The unrecognized code value.
        code: i64,
    },
}

/// Rectangular grid of tiles with a fixed edge length in world units.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TileMap {
    columns: u32,
    rows: u32,
    tile_length: f32,
    tiles: Vec<TileKind>,
}

impl TileMap {
    /// Fallback grid dimensions used when no map can be loaded.
    const FALLBACK_COLUMNS: u32 = 16;
    /// Fallback grid rows used when no map can be loaded.
    const FALLBACK_ROWS: u32 = 12;
    /// Fallback tile edge length in world units.
    const FALLBACK_TILE_LENGTH: f32 = 48.0;

    /// Creates a map of the given dimensions filled with open tiles.
    #[must_use]
    pub fn new(columns: u32, rows: u32, tile_length: f32) -> Self {
        let capacity = columns as usize * rows as usize;
        Self {
            columns,
            rows,
            tile_length,
            tiles: vec![TileKind::Open; capacity],
        }
    }

    /// Default-generated grid used when map loading fails.
    ///
    /// Mirrors the classic 16x12 layout with a paved middle row. The
    /// fallback carries no base or spawn tile, so pathfinding degrades to
    /// all-unreachable and enemies hold position.
    #[must_use]
    pub fn fallback() -> Self {
        let mut map = Self::new(
            Self::FALLBACK_COLUMNS,
            Self::FALLBACK_ROWS,
            Self::FALLBACK_TILE_LENGTH,
        );
        let middle = Self::FALLBACK_ROWS / 2;
        for column in 0..Self::FALLBACK_COLUMNS {
            map.set_tile(TileCoord::new(column, middle), TileKind::Path);
        }
        map
    }

    /// Parses whitespace-separated tile codes, one row per line.
    ///
    /// Blank lines are skipped and trailing whitespace is tolerated. Every
    /// row after the first must match the first row's width.
    pub fn parse(text: &str, tile_length: f32) -> Result<Self, MapParseError> {
        let mut tiles = Vec::new();
        let mut columns = 0usize;
        let mut rows = 0u32;

        for (index, line) in text.lines().enumerate() {
            let line_number = index + 1;
            if line.trim().is_empty() {
                continue;
            }

            let mut width = 0usize;
            for token in line.split_whitespace() {
                let code: i64 = token
                    .parse()
                    .map_err(|_| MapParseError::InvalidToken {
                        line: line_number,
                        token: token.to_owned(),
                    })?;
                let kind = u8::try_from(code)
                    .ok()
                    .and_then(TileKind::from_code)
                    .ok_or(MapParseError::UnknownCode {
                        line: line_number,
                        code,
                    })?;
                tiles.push(kind);
                width += 1;
            }

            if rows == 0 {
                columns = width;
            } else if width != columns {
                return Err(MapParseError::RaggedRow {
                    line: line_number,
                    expected: columns,
                    found: width,
                });
            }
            rows += 1;
        }

        if rows == 0 || columns == 0 {
            return Err(MapParseError::Empty);
        }

        Ok(Self {
            columns: columns as u32,
            rows,
            tile_length,
            tiles,
        })
    }

    /// Renders the map as whitespace-separated codes, one row per line.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut text = String::new();
        for row in 0..self.rows {
            for column in 0..self.columns {
                if column > 0 {
                    text.push(' ');
                }
                let kind = self.tiles[(row * self.columns + column) as usize];
                text.push_str(&kind.code().to_string());
            }
            text.push('\n');
        }
        text
    }

    /// Number of tile columns.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of tile rows.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Edge length of a single square tile in world units.
    #[must_use]
    pub const fn tile_length(&self) -> f32 {
        self.tile_length
    }

    /// Terrain kind of the provided tile, `None` outside the grid.
    #[must_use]
    pub fn tile(&self, tile: TileCoord) -> Option<TileKind> {
        self.index(tile).map(|index| self.tiles[index])
    }

    /// Overwrites a tile's terrain kind; out-of-bounds writes are ignored.
    pub fn set_tile(&mut self, tile: TileCoord, kind: TileKind) {
        if let Some(index) = self.index(tile) {
            self.tiles[index] = kind;
        }
    }

    /// World coordinate of the tile's center.
    #[must_use]
    pub fn tile_center(&self, tile: TileCoord) -> Vec2 {
        Vec2::new(
            (tile.column() as f32 + 0.5) * self.tile_length,
            (tile.row() as f32 + 0.5) * self.tile_length,
        )
    }

    /// Quantizes a world position to the tile containing it, clamping
    /// positions outside the grid to the nearest edge tile.
    #[must_use]
    pub fn tile_at(&self, position: Vec2) -> TileCoord {
        let column = (position.x / self.tile_length).floor() as i64;
        let row = (position.y / self.tile_length).floor() as i64;
        TileCoord::new(
            column.clamp(0, i64::from(self.columns.saturating_sub(1))) as u32,
            row.clamp(0, i64::from(self.rows.saturating_sub(1))) as u32,
        )
    }

    /// Quantizes a world position to a tile, `None` when the position lies
    /// outside the grid rectangle.
    #[must_use]
    pub fn tile_at_checked(&self, position: Vec2) -> Option<TileCoord> {
        if position.x < 0.0 || position.y < 0.0 {
            return None;
        }
        let column = (position.x / self.tile_length).floor() as i64;
        let row = (position.y / self.tile_length).floor() as i64;
        if column >= i64::from(self.columns) || row >= i64::from(self.rows) {
            return None;
        }
        Some(TileCoord::new(column as u32, row as u32))
    }

    /// First base tile in row-major order, if the map declares one.
    #[must_use]
    pub fn base_tile(&self) -> Option<TileCoord> {
        self.find_tile(TileKind::Base)
    }

    /// First spawn tile in row-major order, if the map declares one.
    #[must_use]
    pub fn spawn_tile(&self) -> Option<TileCoord> {
        self.find_tile(TileKind::Spawn)
    }

    fn find_tile(&self, kind: TileKind) -> Option<TileCoord> {
        for row in 0..self.rows {
            for column in 0..self.columns {
                if self.tiles[(row * self.columns + column) as usize] == kind {
                    return Some(TileCoord::new(column, row));
                }
            }
        }
        None
    }

    fn index(&self, tile: TileCoord) -> Option<usize> {
        if tile.column() < self.columns && tile.row() < self.rows {
            Some((tile.row() * self.columns + tile.column()) as usize)
        } else {
            None
        }
    }
}
