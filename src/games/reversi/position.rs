//! Board coordinates and the eight scan directions.

use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Width and height of the board.
pub const BOARD_SIZE: usize = 8;

/// Number of cells on the board.
pub const CELL_COUNT: usize = BOARD_SIZE * BOARD_SIZE;

const COLUMN_LABELS: [char; BOARD_SIZE] = ['a', 'b', 'c', 'd', 'e', 'f', 'g', 'h'];

/// A cell on the 8x8 board.
///
/// Row 0 is the top row. The linear index is `row * 8 + col`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    row: u8,
    col: u8,
}

impl Position {
    /// Creates a position, or `None` when outside the board.
    pub fn new(row: usize, col: usize) -> Option<Self> {
        (row < BOARD_SIZE && col < BOARD_SIZE).then_some(Self {
            row: row as u8,
            col: col as u8,
        })
    }

    /// Creates a position from a linear index (0-63).
    pub fn from_index(index: usize) -> Option<Self> {
        Self::new(index / BOARD_SIZE, index % BOARD_SIZE)
    }

    /// Returns the linear index (0-63).
    pub fn index(self) -> usize {
        self.row as usize * BOARD_SIZE + self.col as usize
    }

    /// Returns the row (0-7).
    pub fn row(self) -> usize {
        self.row as usize
    }

    /// Returns the column (0-7).
    pub fn col(self) -> usize {
        self.col as usize
    }

    /// Returns the adjacent cell in `direction`, or `None` off the board.
    pub fn step(self, direction: Direction) -> Option<Self> {
        let (dr, dc) = direction.delta();
        let row = self.row as isize + dr;
        let col = self.col as isize + dc;
        if row < 0 || col < 0 {
            return None;
        }
        Self::new(row as usize, col as usize)
    }

    /// Iterates all 64 positions in row-major order.
    pub fn all() -> impl Iterator<Item = Position> {
        (0..CELL_COUNT).filter_map(Self::from_index)
    }

    /// Parses algebraic notation (`d3`) or a linear index (`19`).
    #[instrument]
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase();
        if let Ok(index) = s.parse::<usize>() {
            return Self::from_index(index);
        }

        let mut chars = s.chars();
        let col = chars.next().and_then(|c| COLUMN_LABELS.iter().position(|&l| l == c))?;
        let row = chars.as_str().parse::<usize>().ok()?.checked_sub(1)?;
        Self::new(row, col)
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", COLUMN_LABELS[self.col()], self.row() + 1)
    }
}

/// One of the eight straight lines leaving a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter)]
pub enum Direction {
    /// Up and left.
    NorthWest,
    /// Up.
    North,
    /// Up and right.
    NorthEast,
    /// Left.
    West,
    /// Right.
    East,
    /// Down and left.
    SouthWest,
    /// Down.
    South,
    /// Down and right.
    SouthEast,
}

impl Direction {
    /// Row and column offsets.
    pub fn delta(self) -> (isize, isize) {
        match self {
            Direction::NorthWest => (-1, -1),
            Direction::North => (-1, 0),
            Direction::NorthEast => (-1, 1),
            Direction::West => (0, -1),
            Direction::East => (0, 1),
            Direction::SouthWest => (1, -1),
            Direction::South => (1, 0),
            Direction::SouthEast => (1, 1),
        }
    }
}
