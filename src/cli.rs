//! Command-line interface for strictly_reversi.

use clap::{Parser, Subcommand, ValueEnum};
use strictly_reversi::Color;

/// Strictly Reversi - Reversi engine with pluggable human and machine agents
#[derive(Parser, Debug)]
#[command(name = "strictly_reversi")]
#[command(about = "Reversi between humans and machine agents", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Side a human asks to play.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    /// Move first
    Black,
    /// Move second
    White,
}

impl From<Side> for Color {
    fn from(side: Side) -> Self {
        match side {
            Side::Black => Color::Black,
            Side::White => Color::White,
        }
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play at the terminal against the first-legal machine
    Play {
        /// Path to match configuration
        #[arg(short, long, default_value = "reversi.toml")]
        config: std::path::PathBuf,

        /// Number of matches to play
        #[arg(short, long, default_value = "1")]
        matches: u32,

        /// Color for the human when exactly one side is human
        #[arg(long, value_enum)]
        side: Option<Side>,

        /// Print a JSON snapshot after every ply instead of the board
        #[arg(long)]
        json: bool,
    },

    /// Let two first-legal machines play each other
    Selfplay {
        /// Number of matches to play
        #[arg(short, long, default_value = "2")]
        matches: u32,

        /// Keep colors fixed between matches
        #[arg(long)]
        no_rotate: bool,

        /// Print a JSON snapshot after every ply instead of the board
        #[arg(long)]
        json: bool,
    },
}
