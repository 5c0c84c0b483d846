//! Match configuration loaded from TOML.

use crate::agent::{Agent, AgentId, Role, TeamId};
use crate::games::reversi::Color;
use crate::orchestrator::OrchestratorSettings;
use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// One side of the board at session start.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_", into)]
pub struct SeatConfig {
    /// Display name.
    name: String,

    /// Human or machine.
    role: Role,

    /// Persistent team identity.
    team: TeamId,
}

impl SeatConfig {
    /// Creates a seat.
    pub fn new(name: impl Into<String>, role: Role, team: TeamId) -> Self {
        Self {
            name: name.into(),
            role,
            team,
        }
    }
}

/// Session configuration.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_")]
pub struct MatchConfig {
    /// Seat playing Black in the first match.
    #[serde(default = "default_black")]
    black: SeatConfig,

    /// Seat playing White in the first match.
    #[serde(default = "default_white")]
    white: SeatConfig,

    /// Apply forced passes for machines without asking them.
    #[serde(default = "default_true")]
    auto_pass: bool,

    /// Swap colors after each machine-only match.
    #[serde(default = "default_true")]
    force_color_rotation: bool,

    /// Pause before machine decisions when a human plays.
    #[serde(default = "default_machine_delay_ms")]
    machine_delay_ms: u64,

    /// Consecutive rejected decisions tolerated from one machine.
    #[serde(default = "default_max_rejections")]
    max_rejections: u32,
}

#[instrument]
fn default_black() -> SeatConfig {
    SeatConfig::new("Human", Role::Human, TeamId(1))
}

#[instrument]
fn default_white() -> SeatConfig {
    SeatConfig::new("FirstLegal", Role::Machine, TeamId(0))
}

#[instrument]
fn default_true() -> bool {
    true
}

#[instrument]
fn default_machine_delay_ms() -> u64 {
    500
}

#[instrument]
fn default_max_rejections() -> u32 {
    3
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            black: default_black(),
            white: default_white(),
            auto_pass: default_true(),
            force_color_rotation: default_true(),
            machine_delay_ms: default_machine_delay_ms(),
            max_rejections: default_max_rejections(),
        }
    }
}

impl MatchConfig {
    /// Two first-legal machines, both teams at their default ids.
    pub fn selfplay() -> Self {
        Self::default()
            .with_black(SeatConfig::new("FirstLegal A", Role::Machine, TeamId(1)))
            .with_white(SeatConfig::new("FirstLegal B", Role::Machine, TeamId(0)))
    }

    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.validate()?;

        info!(black = %config.black.name, white = %config.white.name, "Config loaded successfully");
        Ok(config)
    }

    /// Loads `path` if it exists, defaults otherwise.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            info!("Config file missing, using defaults");
            Ok(Self::default())
        }
    }

    /// Rejects settings the orchestrator cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_rejections == 0 {
            return Err(ConfigError::new("max_rejections must be at least 1".to_string()));
        }
        if self.black.team == self.white.team {
            return Err(ConfigError::new(format!(
                "both seats use {}; teams must differ",
                self.black.team
            )));
        }
        Ok(())
    }

    /// Orchestrator switches.
    pub fn settings(&self) -> OrchestratorSettings {
        OrchestratorSettings::new(
            self.auto_pass,
            self.force_color_rotation,
            Duration::from_millis(self.machine_delay_ms),
        )
    }

    /// Agent handles: first on Black, second on White.
    pub fn agents(&self) -> (Agent, Agent) {
        let build = |id: AgentId, seat: &SeatConfig, color: Color| {
            Agent::new(id, &seat.name, seat.team, seat.role, color)
        };
        (
            build(AgentId::First, &self.black, Color::Black),
            build(AgentId::Second, &self.white, Color::White),
        )
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[black]
name = "alice"
role = "human"
team = 7

[white]
name = "bot"
role = "machine"
team = 3
"#
        )
        .unwrap();

        let config = MatchConfig::from_file(file.path()).unwrap();
        assert_eq!(config.black().name(), "alice");
        assert_eq!(*config.white().team(), TeamId(3));
        assert!(*config.auto_pass());
        assert!(*config.force_color_rotation());
        assert_eq!(*config.machine_delay_ms(), 500);
        assert_eq!(*config.max_rejections(), 3);
    }

    #[test]
    fn test_parse_error_reports_location() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "auto_pass = \"sometimes\"").unwrap();

        let err = MatchConfig::from_file(file.path()).unwrap_err();
        assert!(err.message.starts_with("Failed to parse config"));
        assert!(err.file.ends_with("match_config.rs"));
    }

    #[test]
    fn test_same_team_rejected() {
        let config =
            MatchConfig::default().with_white(SeatConfig::new("bot", Role::Machine, TeamId(1)));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_or_default_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let config = MatchConfig::load_or_default(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, MatchConfig::default());
    }

    #[test]
    fn test_agents_and_settings() {
        let config = MatchConfig::selfplay().with_machine_delay_ms(0);
        let (first, second) = config.agents();
        assert_eq!(*first.color(), Color::Black);
        assert!(second.is_machine());
        assert_eq!(config.settings().machine_delay, Duration::ZERO);
    }
}
