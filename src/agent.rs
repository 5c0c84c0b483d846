//! Agent handles: identity, team, role and color of each side.
//!
//! The orchestrator owns two handles for the lifetime of a session. Role and
//! color may only change while the match is at its start or has ended.

use crate::games::reversi::Color;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

/// Which of the two handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
pub enum AgentId {
    /// Seated as Black at session start.
    First,
    /// Seated as White at session start.
    Second,
}

impl AgentId {
    /// Array index for per-agent storage.
    pub fn index(self) -> usize {
        match self {
            AgentId::First => 0,
            AgentId::Second => 1,
        }
    }
}

/// Persistent team identity, independent of the color currently played.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[display("team {}", _0)]
pub struct TeamId(pub u8);

/// Who drives an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Moves arrive from a UI click or the terminal.
    Human,
    /// Moves arrive from a decision request.
    Machine,
}

impl Role {
    /// The other role.
    pub fn swapped(self) -> Self {
        match self {
            Role::Human => Role::Machine,
            Role::Machine => Role::Human,
        }
    }
}

/// Where the current match stands, as far as handle changes are concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum MatchPhase {
    /// No ply played yet.
    Start,
    /// Plies played and the game is not over.
    InProgress,
    /// Neither side can move.
    Ended,
}

impl MatchPhase {
    /// True at start or end.
    pub fn is_boundary(self) -> bool {
        !matches!(self, MatchPhase::InProgress)
    }
}

/// Error changing a handle.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum AgentError {
    /// Role or color change requested mid-match.
    #[display("{} cannot change {} while the match is in progress", agent, what)]
    RoleLocked {
        /// The handle.
        agent: AgentId,
        /// `"role"` or `"color"`.
        what: &'static str,
    },
}

/// One side of the session.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct Agent {
    /// Handle identity.
    id: AgentId,
    /// Display name.
    name: String,
    /// Team, stable across color swaps.
    team: TeamId,
    /// Human or machine.
    role: Role,
    /// Color currently played.
    color: Color,
}

impl Agent {
    /// Creates a handle.
    #[instrument(skip(name), fields(name = %name.as_ref()))]
    pub fn new(id: AgentId, name: impl AsRef<str>, team: TeamId, role: Role, color: Color) -> Self {
        Self {
            id,
            name: name.as_ref().to_string(),
            team,
            role,
            color,
        }
    }

    /// Driven by a human.
    pub fn is_human(&self) -> bool {
        self.role == Role::Human
    }

    /// Driven by a machine.
    pub fn is_machine(&self) -> bool {
        self.role == Role::Machine
    }

    /// Sets the role, only at a match boundary.
    #[instrument(skip(self), fields(agent = %self.id))]
    pub fn set_role(&mut self, role: Role, phase: MatchPhase) -> Result<(), AgentError> {
        self.ensure_boundary(phase, "role")?;
        if self.role != role {
            info!(from = %self.role, to = %role, "Role changed");
            self.role = role;
        }
        Ok(())
    }

    /// Swaps human and machine, only at a match boundary.
    pub fn change_role(&mut self, phase: MatchPhase) -> Result<(), AgentError> {
        self.set_role(self.role.swapped(), phase)
    }

    /// Swaps color, only at a match boundary. The team is unchanged.
    #[instrument(skip(self), fields(agent = %self.id))]
    pub fn change_color(&mut self, phase: MatchPhase) -> Result<(), AgentError> {
        self.ensure_boundary(phase, "color")?;
        self.color = self.color.opponent();
        info!(color = %self.color, team = %self.team, "Color changed");
        Ok(())
    }

    fn ensure_boundary(&self, phase: MatchPhase, what: &'static str) -> Result<(), AgentError> {
        if phase.is_boundary() {
            Ok(())
        } else {
            warn!(agent = %self.id, what, "Handle change refused mid-match");
            Err(AgentError::RoleLocked { agent: self.id, what })
        }
    }
}
