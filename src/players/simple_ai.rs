//! Machine that plays the first legal ply.

use super::Decider;
use crate::games::reversi::Ply;
use crate::orchestrator::{DecisionRequest, MatchOutcome, TurnError};
use anyhow::Result;
use tracing::{debug, info, warn};

/// Picks the lowest legal mask index: cells in row-major order, then pass.
pub struct FirstLegal {
    name: String,
}

impl FirstLegal {
    /// Creates a new first-legal machine.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait::async_trait]
impl Decider for FirstLegal {
    async fn decide(&mut self, request: &DecisionRequest) -> Result<Ply> {
        debug!(
            ai = %self.name,
            color = %request.color,
            step = request.snapshot.step,
            "AI making move"
        );

        let Some(ply) = request.legal_plies().into_iter().next() else {
            anyhow::bail!("No legal ply for {}", request.color);
        };

        debug!(ai = %self.name, %ply, "AI chose ply");
        Ok(ply)
    }

    fn on_match_end(&mut self, outcome: &MatchOutcome) {
        info!(ai = %self.name, winner = ?outcome.winner, steps = outcome.steps, "Match finished");
    }

    fn on_rejected(&mut self, error: &TurnError) {
        warn!(ai = %self.name, %error, "Decision rejected");
    }

    fn name(&self) -> &str {
        &self.name
    }
}
