//! Reversi board: squares, trace and the cached aggregate.
//!
//! The aggregate (stone counts plus per-side movability) is invalidated by
//! every mutation and rebuilt by a full board pass on the next read. One
//! flip can change the legality of any empty cell on a line through it, so
//! the pass never updates incrementally.

use super::action::{EngineError, Move, Ply};
use super::position::{BOARD_SIZE, CELL_COUNT, Direction, Position};
use super::types::{Color, Square, SquareState};
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use strum::IntoEnumIterator;
use tracing::{debug, instrument, trace};

/// Which sides may legally place a stone (on a cell, or anywhere).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Movability {
    /// Black has a legal placement.
    pub black: bool,
    /// White has a legal placement.
    pub white: bool,
}

impl Movability {
    /// Returns the bit for `color`.
    pub fn allows(self, color: Color) -> bool {
        match color {
            Color::Black => self.black,
            Color::White => self.white,
        }
    }

    fn set(&mut self, color: Color) {
        match color {
            Color::Black => self.black = true,
            Color::White => self.white = true,
        }
    }

    fn union(self, other: Self) -> Self {
        Self {
            black: self.black || other.black,
            white: self.white || other.white,
        }
    }

    /// Both bits clear: nobody can move.
    pub fn is_end(self) -> bool {
        !self.black && !self.white
    }
}

/// Stone counts and movability from one full board pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Score {
    /// Black stones on the board.
    pub black: u8,
    /// White stones on the board.
    pub white: u8,
    /// Which sides have a legal placement.
    pub movability: Movability,
}

impl Score {
    /// Empty cells.
    pub fn empty(&self) -> u8 {
        CELL_COUNT as u8 - self.black - self.white
    }

    /// True when neither side can move.
    pub fn is_end(&self) -> bool {
        self.movability.is_end()
    }

    /// Color with more stones, `None` on a tie.
    pub fn leader(&self) -> Option<Color> {
        match self.black.cmp(&self.white) {
            std::cmp::Ordering::Greater => Some(Color::Black),
            std::cmp::Ordering::Less => Some(Color::White),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// Stone count for `color`.
    pub fn count(&self, color: Color) -> u8 {
        match color {
            Color::Black => self.black,
            Color::White => self.white,
        }
    }
}

type Grid<T> = [[T; BOARD_SIZE]; BOARD_SIZE];

/// 8x8 Reversi board with its move trace.
///
/// Reads of the aggregate go through interior mutability, so `Board` is
/// `!Sync`. It is meant to be driven by one caller at a time.
#[derive(Debug, Clone)]
pub struct Board {
    squares: Grid<Square>,
    trace: Vec<Move>,
    dirty: Cell<bool>,
    score: Cell<Score>,
    cell_movability: RefCell<Grid<Movability>>,
}

impl Board {
    /// Creates a board with the four center stones.
    #[instrument]
    pub fn new() -> Self {
        let mut board = Self {
            squares: [[Square::default(); BOARD_SIZE]; BOARD_SIZE],
            trace: Vec::new(),
            dirty: Cell::new(true),
            score: Cell::new(Score::default()),
            cell_movability: RefCell::new([[Movability::default(); BOARD_SIZE]; BOARD_SIZE]),
        };
        board.seed();
        board
    }

    /// Returns the square at `pos`.
    pub fn square(&self, pos: Position) -> &Square {
        &self.squares[pos.row()][pos.col()]
    }

    /// Returns the occupancy at `pos`.
    pub fn state(&self, pos: Position) -> SquareState {
        self.square(pos).state()
    }

    /// Returns the ply trace since the last full reset.
    pub fn trace(&self) -> &[Move] {
        &self.trace
    }

    /// Returns the most recent trace entry.
    pub fn last_move(&self) -> Option<Move> {
        self.trace.last().copied()
    }

    /// Returns the aggregate, recomputing it first if the board changed.
    pub fn score(&self) -> Score {
        self.refresh();
        self.score.get()
    }

    /// Returns which colors may play at `pos` (both false when occupied).
    pub fn movability(&self, pos: Position) -> Movability {
        self.refresh();
        self.cell_movability.borrow()[pos.row()][pos.col()]
    }

    /// True iff placing `color` at `pos` sandwiches at least one run.
    pub fn legal(&self, pos: Position, color: Color) -> bool {
        self.movability(pos).allows(color)
    }

    /// All cells where `color` may play, in row-major order.
    pub fn legal_positions(&self, color: Color) -> Vec<Position> {
        Position::all().filter(|&pos| self.legal(pos, color)).collect()
    }

    /// Applies a ply for `color`.
    ///
    /// Placement legality is the caller's precondition; the engine checks
    /// it before calling. A pass only appends to the trace.
    #[instrument(skip(self), fields(step = self.trace.len() + 1))]
    pub fn make_move(&mut self, ply: Ply, color: Color) {
        if let Ply::Place(pos) = ply {
            debug_assert!(self.legal(pos, color), "illegal placement reached the board");
            let step = self.trace.len() as u32 + 1;
            self.place(pos, color, Some(step));
        }
        self.trace.push(Move::new(ply, color));
    }

    /// Retracts `color`'s most recent ply and any opponent ply after it.
    ///
    /// Plies alternate, so this removes one entry when the trace ends with
    /// `color` and two otherwise. The board is then rebuilt by replaying the
    /// remaining trace from the initial position. Returns how many plies
    /// were removed.
    #[instrument(skip(self), fields(trace_len = self.trace.len()))]
    pub fn retract_last_round(&mut self, color: Color) -> Result<usize, EngineError> {
        let removed = match self.trace.as_slice() {
            [.., last] if last.color == color => 1,
            [.., own, _] if own.color == color => 2,
            _ => return Err(EngineError::NothingToRetract(color)),
        };
        let keep = self.trace.len() - removed;
        self.trace.truncate(keep);
        self.reset(true);
        debug!(removed, remaining = keep, "Retracted round");
        Ok(removed)
    }

    /// Clears the board and seeds the center stones.
    ///
    /// With `replay`, the current trace is replayed over the fresh board;
    /// otherwise the trace is cleared as well.
    #[instrument(skip(self))]
    pub fn reset(&mut self, replay: bool) {
        for square in self.squares.iter_mut().flatten() {
            square.clear();
        }
        self.seed();

        let trace = std::mem::take(&mut self.trace);
        if replay {
            for entry in trace {
                self.make_move(entry.ply, entry.color);
            }
        }
    }

    fn seed(&mut self) {
        let lo = BOARD_SIZE / 2 - 1;
        let hi = lo + 1;
        self.squares[lo][lo].place(Color::Black, None);
        self.squares[hi][hi].place(Color::Black, None);
        self.squares[lo][hi].place(Color::White, None);
        self.squares[hi][lo].place(Color::White, None);
        self.dirty.set(true);
    }

    fn place(&mut self, pos: Position, color: Color, step: Option<u32>) {
        self.squares[pos.row()][pos.col()].place(color, step);
        for direction in Direction::iter() {
            if let Some(run) = self.sandwiched_run(pos, direction, color) {
                trace!(?direction, flipped = run.len(), "Flipping run");
                for cell in run {
                    self.squares[cell.row()][cell.col()].flip();
                }
            }
        }
        self.dirty.set(true);
    }

    /// Walks the opposite-color run leaving `from` in `direction`.
    ///
    /// Returns the run iff it is non-empty and terminated by `color` before
    /// an empty cell or the board edge. At most seven steps are taken.
    fn sandwiched_run(
        &self,
        from: Position,
        direction: Direction,
        color: Color,
    ) -> Option<Vec<Position>> {
        let mut run = Vec::new();
        let mut cursor = from.step(direction);
        while let Some(pos) = cursor {
            match self.state(pos) {
                SquareState::Occupied(c) if c != color => run.push(pos),
                SquareState::Occupied(_) => return (!run.is_empty()).then_some(run),
                SquareState::Empty => return None,
            }
            cursor = pos.step(direction);
        }
        None
    }

    /// Which colors would enable a sandwich at the empty cell `pos`.
    ///
    /// Per direction, the first neighbor's color fixes the run; the
    /// direction enables the opposite color iff the run ends on it.
    fn enablers(&self, pos: Position) -> Movability {
        Direction::iter().fold(Movability::default(), |acc, direction| {
            let mut found = Movability::default();
            if let Some(SquareState::Occupied(run_color)) =
                pos.step(direction).map(|p| self.state(p))
            {
                let mover = run_color.opponent();
                if self.sandwiched_run(pos, direction, mover).is_some() {
                    found.set(mover);
                }
            }
            acc.union(found)
        })
    }

    fn refresh(&self) {
        if !self.dirty.get() {
            return;
        }

        let mut score = Score::default();
        let mut cells = self.cell_movability.borrow_mut();
        for pos in Position::all() {
            let movability = match self.state(pos) {
                SquareState::Occupied(Color::Black) => {
                    score.black += 1;
                    Movability::default()
                }
                SquareState::Occupied(Color::White) => {
                    score.white += 1;
                    Movability::default()
                }
                SquareState::Empty => self.enablers(pos),
            };
            score.movability = score.movability.union(movability);
            cells[pos.row()][pos.col()] = movability;
        }

        debug_assert_eq!(
            score.black as usize + score.white as usize + score.empty() as usize,
            CELL_COUNT
        );
        self.score.set(score);
        self.dirty.set(false);
        trace!(black = score.black, white = score.white, "Recomputed aggregate");
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Board {
    fn eq(&self, other: &Self) -> bool {
        self.squares == other.squares && self.trace == other.trace
    }
}

impl Eq for Board {}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let score = self.score();
        writeln!(
            f,
            "  a b c d e f g h    {} {} : {} {}",
            Color::Black.symbol(),
            score.black,
            score.white,
            Color::White.symbol()
        )?;
        for row in 0..BOARD_SIZE {
            write!(f, "{}", row + 1)?;
            for col in 0..BOARD_SIZE {
                let symbol = Position::new(row, col)
                    .and_then(|pos| self.state(pos).color())
                    .map(Color::symbol)
                    .unwrap_or('·');
                write!(f, " {}", symbol)?;
            }
            if row + 1 < BOARD_SIZE {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}
