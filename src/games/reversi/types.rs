//! Core domain types for Reversi.

use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Stone color, also used to name the side to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    /// Black moves first.
    Black,
    /// White moves second.
    White,
}

impl Color {
    /// Returns the opposing color.
    pub fn opponent(self) -> Self {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }

    /// Symbol used by the text renderer.
    pub fn symbol(self) -> char {
        match self {
            Color::Black => '●',
            Color::White => '○',
        }
    }
}

/// Occupancy of a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SquareState {
    /// No stone.
    #[default]
    Empty,
    /// A stone of the given color.
    Occupied(Color),
}

impl SquareState {
    /// Returns the stone color, if any.
    pub fn color(self) -> Option<Color> {
        match self {
            SquareState::Empty => None,
            SquareState::Occupied(color) => Some(color),
        }
    }

    /// Returns true if no stone is present.
    pub fn is_empty(self) -> bool {
        matches!(self, SquareState::Empty)
    }
}

/// A board cell: occupancy plus the step at which its stone was placed.
///
/// Only [`Board`](super::Board) mutates squares. `place` and `flip` have
/// preconditions the board has already checked, so violations are
/// programmer errors and trip a debug assertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Square {
    state: SquareState,
    placed_at_step: Option<u32>,
}

impl Square {
    /// Returns the occupancy.
    pub fn state(&self) -> SquareState {
        self.state
    }

    /// Returns the 1-based step at which the stone was placed.
    ///
    /// Seeded center stones report `None`.
    pub fn placed_at_step(&self) -> Option<u32> {
        self.placed_at_step
    }

    /// Puts a stone on an empty square.
    #[instrument(level = "trace", skip(self))]
    pub(super) fn place(&mut self, color: Color, step: Option<u32>) {
        debug_assert!(self.state.is_empty(), "place on occupied square");
        self.state = SquareState::Occupied(color);
        self.placed_at_step = step;
    }

    /// Turns the stone over.
    pub(super) fn flip(&mut self) {
        match self.state {
            SquareState::Occupied(color) => self.state = SquareState::Occupied(color.opponent()),
            SquareState::Empty => debug_assert!(false, "flip on empty square"),
        }
    }

    /// Removes the stone.
    pub(super) fn clear(&mut self) {
        *self = Self::default();
    }
}
