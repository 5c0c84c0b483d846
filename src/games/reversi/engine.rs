//! Turn wrapper over the board.

use super::action::{EngineError, Move, Ply};
use super::board::{Board, Movability, Score};
use super::position::{CELL_COUNT, Position};
use super::types::{Color, Square};
use tracing::{debug, instrument, warn};

/// Reversi engine: a board plus the side to move.
///
/// The mover alternates once per accepted ply. A forced pass is a ply too:
/// it alternates the mover without placing a stone. Like [`Board`], the
/// engine is single-caller and `!Sync`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Engine {
    board: Board,
    mover: Color,
}

impl Engine {
    /// Creates an engine at the initial position, Black to move.
    #[instrument]
    pub fn new() -> Self {
        Self {
            board: Board::new(),
            mover: Color::Black,
        }
    }

    /// Returns the board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns the side to move.
    pub fn mover(&self) -> Color {
        self.mover
    }

    /// Plies played since the last reset, passes included.
    pub fn step(&self) -> u32 {
        self.board.trace().len() as u32
    }

    /// Most recent ply, `None` before the first one.
    pub fn last_move(&self) -> Option<Move> {
        self.board.last_move()
    }

    /// Returns the square at `pos`.
    pub fn square(&self, pos: Position) -> &Square {
        self.board.square(pos)
    }

    /// Returns the cached aggregate.
    pub fn score(&self) -> Score {
        self.board.score()
    }

    /// Neither side can place a stone.
    pub fn is_end(&self) -> bool {
        self.score().is_end()
    }

    /// Black has a legal placement.
    pub fn black_can_move(&self) -> bool {
        self.score().movability.black
    }

    /// White has a legal placement.
    pub fn white_can_move(&self) -> bool {
        self.score().movability.white
    }

    /// The side to move has a legal placement.
    pub fn turn_enable(&self) -> bool {
        self.score().movability.allows(self.mover)
    }

    /// Which colors may play at `pos`.
    pub fn movability(&self, pos: Position) -> Movability {
        self.board.movability(pos)
    }

    /// Whether the mover may play `ply`.
    ///
    /// A cell is enabled iff the board allows the mover there. A pass is
    /// enabled iff the mover has no legal cell. After the game ends this
    /// still answers the legality question; [`Engine::make_move`] rejects
    /// every ply with [`EngineError::GameOver`].
    pub fn enable(&self, ply: Ply) -> bool {
        match ply {
            Ply::Place(pos) => self.board.legal(pos, self.mover),
            Ply::Pass => !self.turn_enable(),
        }
    }

    /// Legal mask for the mover: 64 cells then pass.
    pub fn legal_mask(&self) -> Vec<bool> {
        (0..=CELL_COUNT)
            .map(|i| Ply::from_mask_index(i).is_some_and(|ply| self.enable(ply)))
            .collect()
    }

    /// Plays `ply` for the mover and hands the turn over.
    ///
    /// # Errors
    ///
    /// - [`EngineError::GameOver`] once both sides are blocked.
    /// - [`EngineError::IllegalMove`] for an occupied or non-sandwiching cell.
    /// - [`EngineError::IllegalPass`] when the mover has a legal placement.
    #[instrument(skip(self), fields(mover = %self.mover, step = self.step()))]
    pub fn make_move(&mut self, ply: Ply) -> Result<(), EngineError> {
        if self.is_end() {
            warn!("Ply after game end");
            return Err(EngineError::GameOver);
        }
        if !self.enable(ply) {
            let err = match ply {
                Ply::Place(position) => EngineError::IllegalMove {
                    color: self.mover,
                    position,
                },
                Ply::Pass => EngineError::IllegalPass(self.mover),
            };
            warn!(error = %err, "Rejected ply");
            return Err(err);
        }

        self.board.make_move(ply, self.mover);
        self.mover = self.mover.opponent();
        debug!(%ply, next = %self.mover, "Ply accepted");
        Ok(())
    }

    /// Undoes `color`'s last round and gives `color` the move.
    ///
    /// See [`Board::retract_last_round`] for which plies are removed.
    #[instrument(skip(self))]
    pub fn retract_last_round(&mut self, color: Color) -> Result<usize, EngineError> {
        let removed = self.board.retract_last_round(color)?;
        self.mover = color;
        Ok(removed)
    }

    /// Restarts at the initial position with an empty trace.
    #[instrument(skip(self))]
    pub fn reset(&mut self) {
        self.board.reset(false);
        self.mover = Color::Black;
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "turn = {}", self.mover)?;
        write!(f, "{}", self.board)
    }
}
