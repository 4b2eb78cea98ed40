use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Result, SimonError};

/// Unpressed tiles show each lit channel at this fraction of full intensity.
const DARK_VALUE: f32 = 204.0 / 255.0;

/// Immutable board position. Equality is structural.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    pub column: u8,
    pub row: u8,
}

impl Coordinate {
    pub const fn new(column: u8, row: u8) -> Self {
        Self { column, row }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// Dimensions of the tile grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSize {
    pub columns: u8,
    pub rows: u8,
}

impl BoardSize {
    pub const fn new(columns: u8, rows: u8) -> Self {
        Self { columns, rows }
    }

    pub fn contains(&self, coordinate: Coordinate) -> bool {
        coordinate.column < self.columns && coordinate.row < self.rows
    }

    /// Returns `coordinate` unchanged if it lies on the board.
    pub fn check(&self, coordinate: Coordinate) -> Result<Coordinate> {
        if self.contains(coordinate) {
            Ok(coordinate)
        } else {
            Err(SimonError::CoordinateOutOfBounds {
                coordinate,
                columns: self.columns,
                rows: self.rows,
            })
        }
    }

    pub fn cell_count(&self) -> usize {
        self.columns as usize * self.rows as usize
    }

    /// The four corners in flash order: bottom-left, top-left, top-right,
    /// bottom-right. Degenerate boards repeat corners.
    pub fn corners(&self) -> [Coordinate; 4] {
        let last_column = self.columns.saturating_sub(1);
        let last_row = self.rows.saturating_sub(1);
        [
            Coordinate::new(0, 0),
            Coordinate::new(0, last_row),
            Coordinate::new(last_column, last_row),
            Coordinate::new(last_column, 0),
        ]
    }

    /// All coordinates in row-major order.
    pub fn coordinates(&self) -> impl Iterator<Item = Coordinate> {
        let columns = self.columns;
        (0..self.rows).flat_map(move |row| (0..columns).map(move |column| Coordinate::new(column, row)))
    }
}

impl Default for BoardSize {
    fn default() -> Self {
        Self::new(2, 2)
    }
}

/// A point in host screen space. The origin is the bottom-left corner of the
/// board area and `y` grows upwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f32,
    pub y: f32,
}

impl ScreenPoint {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Linear RGB triple with channels in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    fn dimmed(self) -> Self {
        Self::new(self.r * DARK_VALUE, self.g * DARK_VALUE, self.b * DARK_VALUE)
    }
}

/// Identity of a tile: its name and the two colors it alternates between.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileColor {
    pub name: String,
    pub unpressed: Rgb,
    pub pressed: Rgb,
}

impl TileColor {
    pub fn from_pressed(name: impl Into<String>, pressed: Rgb) -> Self {
        Self {
            name: name.into(),
            unpressed: pressed.dimmed(),
            pressed,
        }
    }

    pub fn green() -> Self {
        Self::from_pressed("green", Rgb::new(0.0, 1.0, 0.0))
    }

    pub fn blue() -> Self {
        Self::from_pressed("blue", Rgb::new(0.0, 0.0, 1.0))
    }

    pub fn red() -> Self {
        Self::from_pressed("red", Rgb::new(1.0, 0.0, 0.0))
    }

    pub fn yellow() -> Self {
        Self::from_pressed("yellow", Rgb::new(1.0, 1.0, 0.0))
    }

    /// Color for `coordinate`, tiling the classic 2x2 palette across the board.
    pub fn for_coordinate(coordinate: Coordinate) -> Self {
        match (coordinate.column % 2, coordinate.row % 2) {
            (0, 0) => Self::green(),
            (0, _) => Self::blue(),
            (_, 0) => Self::yellow(),
            _ => Self::red(),
        }
    }
}

/// A board position paired with its color. Owned by the board collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub coordinate: Coordinate,
    pub color: TileColor,
}

/// Builds the default cells for a board, row-major.
pub fn default_cells(size: BoardSize) -> Vec<Cell> {
    size.coordinates()
        .map(|coordinate| Cell {
            coordinate,
            color: TileColor::for_coordinate(coordinate),
        })
        .collect()
}

/// Collaborator the rule engine drives for visual and audio feedback, and asks
/// to hit-test touches. The engine never mutates cells directly.
pub trait Board {
    /// Enters (`pressed = true`) or leaves the pressed state of a tile.
    fn highlight(&mut self, coordinate: Coordinate, pressed: bool);

    /// Fire-and-forget audio cue for a tile.
    fn play_tone(&mut self, coordinate: Coordinate);

    /// Maps a screen point to a tile, or `None` when no tile was hit.
    fn resolve_touch(&self, point: ScreenPoint) -> Option<Coordinate>;
}

/// Equal-sized tiles laid out over a `width` x `height` rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    pub size: BoardSize,
    pub width: f32,
    pub height: f32,
}

impl GridLayout {
    pub fn new(size: BoardSize, width: f32, height: f32) -> Self {
        Self {
            size,
            width,
            height,
        }
    }

    pub fn tile_width(&self) -> f32 {
        self.width / self.size.columns.max(1) as f32
    }

    pub fn tile_height(&self) -> f32 {
        self.height / self.size.rows.max(1) as f32
    }

    /// Resolves `point` to the tile containing it.
    pub fn resolve(&self, point: ScreenPoint) -> Option<Coordinate> {
        if !(point.x >= 0.0 && point.y >= 0.0 && point.x < self.width && point.y < self.height) {
            return None;
        }
        if self.size.columns == 0 || self.size.rows == 0 {
            return None;
        }

        let column = ((point.x / self.tile_width()) as u8).min(self.size.columns - 1);
        let row = ((point.y / self.tile_height()) as u8).min(self.size.rows - 1);
        Some(Coordinate::new(column, row))
    }

    /// Center of a tile in screen space.
    pub fn center_of(&self, coordinate: Coordinate) -> ScreenPoint {
        ScreenPoint::new(
            (coordinate.column as f32 + 0.5) * self.tile_width(),
            (coordinate.row as f32 + 0.5) * self.tile_height(),
        )
    }
}
