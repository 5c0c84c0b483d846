//! Decision collaborators driven by the match runner.

mod confirm;
mod human;
mod simple_ai;

pub use confirm::{LineConfirmer, ScriptedConfirmer};
pub use human::{HumanInput, HumanPlayer, SharedLines, shared_lines, stdin_lines};
pub use simple_ai::FirstLegal;

use crate::games::reversi::Ply;
use crate::orchestrator::{ConfirmChoice, ConfirmPrompt, DecisionRequest, MatchOutcome, TurnError};
use anyhow::Result;

/// Machine agent that answers decision requests.
#[async_trait::async_trait]
pub trait Decider: Send {
    /// Picks a ply for the request.
    ///
    /// The request carries a snapshot and the 65-entry legal mask; the
    /// decider is free to ignore both, the orchestrator validates the answer.
    async fn decide(&mut self, request: &DecisionRequest) -> Result<Ply>;

    /// Called once per finished match while this decider seats a machine.
    fn on_match_end(&mut self, _outcome: &MatchOutcome) {}

    /// Called when the orchestrator discarded this decider's answer.
    fn on_rejected(&mut self, _error: &TurnError) {}

    /// Display name.
    fn name(&self) -> &str;
}

/// Resolves the confirm step after a match with a human.
#[async_trait::async_trait]
pub trait Confirmer: Send {
    /// Returns the chosen option.
    async fn confirm(&mut self, prompt: &ConfirmPrompt) -> Result<ConfirmChoice>;
}
