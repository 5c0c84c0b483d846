//! Human player reading commands from a line source.

use crate::games::reversi::Ply;
use crate::orchestrator::Snapshot;
use anyhow::Result;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, warn};

/// Line receiver shared between the human player and the confirmer.
pub type SharedLines = Arc<Mutex<mpsc::UnboundedReceiver<String>>>;

/// Wraps a receiver for sharing.
pub fn shared_lines(rx: mpsc::UnboundedReceiver<String>) -> SharedLines {
    Arc::new(Mutex::new(rx))
}

/// Spawns a task forwarding stdin lines into a shared receiver.
pub fn stdin_lines() -> SharedLines {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    warn!(error = %e, "Stdin read failed");
                    break;
                }
            }
        }
    });
    shared_lines(rx)
}

/// What a human asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HumanInput {
    /// Place a stone or pass.
    Play(Ply),
    /// Retract the last round.
    Undo,
}

impl HumanInput {
    /// Parses `undo`, `pass`, an algebraic cell or a cell index.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.eq_ignore_ascii_case("undo") || line.eq_ignore_ascii_case("u") {
            return Some(HumanInput::Undo);
        }
        Ply::parse(line).map(HumanInput::Play)
    }
}

/// Human player using line input.
pub struct HumanPlayer {
    name: String,
    lines: SharedLines,
}

impl HumanPlayer {
    /// Creates a new human player.
    pub fn new(name: impl Into<String>, lines: SharedLines) -> Self {
        Self {
            name: name.into(),
            lines,
        }
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Waits for the next well-formed command.
    ///
    /// Unparseable lines are skipped. Legality is left to the orchestrator.
    pub async fn next_input(&mut self, snapshot: &Snapshot) -> Result<HumanInput> {
        debug!(
            human = %self.name,
            color = %snapshot.mover,
            step = snapshot.step,
            "Waiting for input"
        );

        let mut lines = self.lines.lock().await;
        while let Some(line) = lines.recv().await {
            match HumanInput::parse(&line) {
                Some(input) => return Ok(input),
                None => warn!(human = %self.name, line = %line.trim(), "Unrecognised input"),
            }
        }

        anyhow::bail!("Input channel closed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::reversi::Position;

    #[test]
    fn test_parse_commands() {
        assert_eq!(HumanInput::parse(" undo "), Some(HumanInput::Undo));
        assert_eq!(HumanInput::parse("pass"), Some(HumanInput::Play(Ply::Pass)));
        assert_eq!(
            HumanInput::parse("e3"),
            Some(HumanInput::Play(Ply::Place(Position::new(2, 4).unwrap())))
        );
        assert_eq!(HumanInput::parse("z9"), None);
    }
}
