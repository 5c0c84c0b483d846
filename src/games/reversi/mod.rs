//! Reversi rules: squares, board, sandwich flips and the turn engine.

mod action;
mod board;
mod engine;
mod position;
mod types;

pub use action::{EngineError, Move, Ply};
pub use board::{Board, Movability, Score};
pub use engine::Engine;
pub use position::{BOARD_SIZE, CELL_COUNT, Direction, Position};
pub use types::{Color, Square, SquareState};
