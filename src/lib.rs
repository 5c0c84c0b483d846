//! Strictly Reversi library - Reversi engine and turn orchestration
//!
//! This library provides a Reversi/Othello engine with cached legality and
//! score computation, plus a tick-driven orchestrator that lets humans or
//! machine agents drive either side.
//!
//! # Architecture
//!
//! - **Engine**: board, flip algorithm, legality cache, retraction
//! - **Orchestrator**: `NotReady -> Play -> End -> Confirm -> Reset` state
//!   machine with a single outstanding decision request
//! - **Tallies**: color, human-vs-machine and team win counters
//! - **Runner**: async loop connecting the orchestrator to deciders
//!
//! # Example
//!
//! ```no_run
//! use strictly_reversi::{MatchConfig, MatchRunner};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = MatchConfig::selfplay().with_machine_delay_ms(0);
//! let mut runner = MatchRunner::from_config(&config, None)?;
//! let outcomes = runner.run(2).await?;
//! println!("{:?}", outcomes[0].winner);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod agent;
mod games;
mod match_config;
mod orchestrator;
mod players;
mod runner;
mod tally;

// Crate-level exports - Engine
pub use games::reversi::{
    BOARD_SIZE, Board, CELL_COUNT, Color, Direction, Engine, EngineError, Movability, Move, Ply,
    Position, Score, Square, SquareState,
};

// Crate-level exports - Agent handles
pub use agent::{Agent, AgentError, AgentId, MatchPhase, Role, TeamId};

// Crate-level exports - Tallies
pub use tally::{ColorTally, Headline, RaceTally, Tallies, TeamRecord, TeamTally};

// Crate-level exports - Orchestration
pub use orchestrator::{
    AgentResult, ConfirmChoice, ConfirmPrompt, Decision, DecisionRequest, GameState, MatchOutcome,
    MatchResult, Orchestrator, OrchestratorSettings, Snapshot, SquareView, Tick, TurnError,
};

// Crate-level exports - Players
pub use players::{
    Confirmer, Decider, FirstLegal, HumanInput, HumanPlayer, LineConfirmer, ScriptedConfirmer,
    SharedLines, shared_lines, stdin_lines,
};

// Crate-level exports - Runner and configuration
pub use match_config::{ConfigError, MatchConfig, SeatConfig};
pub use runner::{MatchEvent, MatchRunner};
