//! Plies, trace entries and engine errors.
//!
//! A ply is what a side does on its turn: place a stone or pass. Moves pair
//! a ply with the color that made it and make up the board's trace.

use super::position::{CELL_COUNT, Position};
use super::types::Color;
use serde::{Deserialize, Serialize};

/// One turn's action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ply {
    /// Place a stone on the cell.
    Place(Position),
    /// Forced pass, legal only when no placement is.
    Pass,
}

impl Ply {
    /// Index into a legal mask: 0-63 for cells, 64 for pass.
    pub fn mask_index(self) -> usize {
        match self {
            Ply::Place(pos) => pos.index(),
            Ply::Pass => CELL_COUNT,
        }
    }

    /// Inverse of [`Ply::mask_index`].
    pub fn from_mask_index(index: usize) -> Option<Self> {
        if index == CELL_COUNT {
            Some(Ply::Pass)
        } else {
            Position::from_index(index).map(Ply::Place)
        }
    }

    /// Parses `pass` or a cell in algebraic/index notation.
    pub fn parse(s: &str) -> Option<Self> {
        if s.trim().eq_ignore_ascii_case("pass") {
            return Some(Ply::Pass);
        }
        Position::parse(s).map(Ply::Place)
    }

    /// Returns the cell, if this ply places a stone.
    pub fn position(self) -> Option<Position> {
        match self {
            Ply::Place(pos) => Some(pos),
            Ply::Pass => None,
        }
    }
}

impl std::fmt::Display for Ply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Ply::Place(pos) => write!(f, "{}", pos),
            Ply::Pass => write!(f, "pass"),
        }
    }
}

/// A trace entry: a ply and the color that made it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_new::new)]
pub struct Move {
    /// What was played.
    pub ply: Ply,
    /// Who played it.
    pub color: Color,
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.color, self.ply)
    }
}

/// Errors raised by the engine when a ply is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum EngineError {
    /// The cell is occupied or no run would be sandwiched.
    #[display("{} cannot play {}", color, position)]
    IllegalMove {
        /// Side that attempted the move.
        color: Color,
        /// Target cell.
        position: Position,
    },

    /// Pass attempted while a placement is available.
    #[display("{} cannot pass while a legal move exists", _0)]
    IllegalPass(#[error(not(source))] Color),

    /// Both sides are blocked; no further plies are accepted.
    #[display("Game is already over")]
    GameOver,

    /// The trace holds no ply by this color.
    #[display("{} has no ply to retract", _0)]
    NothingToRetract(#[error(not(source))] Color),
}
