//! Turn coordination between two agents.
//!
//! The orchestrator is a tick-driven state machine:
//!
//! ```text
//! NotReady -> Play <-> End -> Confirm -> Reset -> Play
//!                        \________________/
//!                    (no human: End -> Reset)
//! ```
//!
//! At most one decision request is outstanding. While it is, every tick is
//! a no-op. The response comes back through [`Orchestrator::respond`].

use crate::agent::{Agent, AgentError, AgentId, MatchPhase, Role};
use crate::games::reversi::{
    Color, Engine, EngineError, Move, Movability, Ply, Position, Score, SquareState,
};
use crate::tally::Tallies;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

/// Orchestrator state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, derive_more::Display)]
pub enum GameState {
    /// Constructed, waiting for [`Orchestrator::start`].
    NotReady,
    /// A match is being played.
    Play,
    /// The match just ended; tallies are recorded on the next tick.
    End,
    /// Waiting for a human to continue or change sides.
    Confirm,
    /// The board is reinitialised on the next tick.
    Reset,
}

/// Session-wide behaviour switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_new::new)]
pub struct OrchestratorSettings {
    /// Play forced passes for machines without asking them.
    pub auto_pass: bool,
    /// Swap colors after every machine-only match.
    pub force_color_rotation: bool,
    /// Pause before a machine decides when a human is watching.
    pub machine_delay: Duration,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            auto_pass: true,
            force_color_rotation: true,
            machine_delay: Duration::from_millis(500),
        }
    }
}

/// Errors from driving the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum TurnError {
    /// A decision arrived from an agent that was not asked.
    #[display("decision from {} but {:?} is pending", got, expected)]
    AgentMismatch {
        /// Pending agent, if any.
        expected: Option<AgentId>,
        /// Responding agent.
        got: AgentId,
    },

    /// A decision claimed a color other than the mover's.
    #[display("{} answered for {} but {} is to move", agent, claimed, mover)]
    TeamMismatch {
        /// Responding agent.
        agent: AgentId,
        /// Color in the decision.
        claimed: Color,
        /// Actual mover.
        mover: Color,
    },

    /// A human input arrived while a machine is to move.
    #[display("it is not a human's turn ({} to move)", _0)]
    NotHumanTurn(#[error(not(source))] Color),

    /// A human input arrived while a request is outstanding.
    #[display("a decision request is pending for {}", _0)]
    RequestPending(#[error(not(source))] AgentId),

    /// The operation does not apply in the current state.
    #[display("cannot {} in state {}", action, state)]
    WrongState {
        /// What was attempted.
        action: &'static str,
        /// Current state.
        state: GameState,
    },

    /// Both handles were seated on the same color.
    #[display("both agents are seated as {}", _0)]
    SeatConflict(#[error(not(source))] Color),

    /// The engine rejected the ply.
    #[display("{}", _0)]
    Engine(EngineError),

    /// A handle change was refused.
    #[display("{}", _0)]
    Agent(AgentError),
}

impl From<EngineError> for TurnError {
    fn from(err: EngineError) -> Self {
        Self::Engine(err)
    }
}

impl From<AgentError> for TurnError {
    fn from(err: AgentError) -> Self {
        Self::Agent(err)
    }
}

/// Read-only view of one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SquareView {
    /// Cell.
    pub position: Position,
    /// Occupancy.
    pub state: SquareState,
    /// Step at which the stone was placed.
    pub placed_at_step: Option<u32>,
    /// Which colors may play here.
    pub movability: Movability,
}

/// Read-only view of the session for renderers and deciders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    /// Orchestrator state.
    pub game_state: GameState,
    /// All 64 cells, row-major.
    pub squares: Vec<SquareView>,
    /// Side to move.
    pub mover: Color,
    /// Most recent ply.
    pub last_move: Option<Move>,
    /// Plies since reset.
    pub step: u32,
    /// Counts and movability.
    pub score: Score,
    /// Running tallies.
    pub tallies: Tallies,
    /// A human may act now.
    pub human_turn: bool,
}

/// A request for one agent to pick a ply.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecisionRequest {
    /// Who is asked.
    pub agent: AgentId,
    /// Color the agent plays.
    pub color: Color,
    /// Board at request time.
    pub snapshot: Snapshot,
    /// 64 cells then pass.
    pub legal_mask: Vec<bool>,
    /// Wait this long before deciding.
    pub delay: Option<Duration>,
}

impl DecisionRequest {
    /// Legal plies in mask order.
    pub fn legal_plies(&self) -> Vec<Ply> {
        self.legal_mask
            .iter()
            .enumerate()
            .filter(|&(_, &legal)| legal)
            .filter_map(|(i, _)| Ply::from_mask_index(i))
            .collect()
    }
}

/// An agent's answer to a [`DecisionRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, derive_new::new)]
pub struct Decision {
    /// Responding agent.
    pub agent: AgentId,
    /// Color the agent claims to move for.
    pub color: Color,
    /// Chosen ply.
    pub ply: Ply,
}

/// Result of a match from one agent's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, derive_more::Display)]
pub enum MatchResult {
    /// More stones.
    Win,
    /// Fewer stones.
    Loss,
    /// Equal counts.
    Draw,
}

impl MatchResult {
    /// Terminal reward for learning agents.
    pub fn reward(self) -> f32 {
        match self {
            MatchResult::Win => 1.0,
            MatchResult::Loss => -1.0,
            MatchResult::Draw => 0.0,
        }
    }
}

/// Per-agent line of a [`MatchOutcome`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentResult {
    /// Handle as it was at the end of the match.
    pub agent: Agent,
    /// Win, loss or draw.
    pub result: MatchResult,
}

/// Summary of a finished match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchOutcome {
    /// Color with more stones.
    pub winner: Option<Color>,
    /// Final counts.
    pub score: Score,
    /// Plies played.
    pub steps: u32,
    /// One entry per agent, indexed by [`AgentId::index`].
    pub results: [AgentResult; 2],
}

impl MatchOutcome {
    /// Line for `agent`.
    pub fn result_for(&self, agent: AgentId) -> &AgentResult {
        &self.results[agent.index()]
    }
}

/// What the caller of [`Orchestrator::confirm`] chose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConfirmChoice {
    /// Swap human and machine roles, then reset.
    Change,
    /// Reset with the same roles.
    Continue,
}

/// Message and choices for the confirm dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfirmPrompt {
    /// Headline, e.g. "You Win".
    pub message: String,
    /// Buttons in display order.
    pub choices: [(&'static str, ConfirmChoice); 2],
}

/// Result of one [`Orchestrator::tick`].
#[derive(Debug, Clone, PartialEq)]
pub enum Tick {
    /// A decision request is outstanding.
    Blocked,
    /// Nothing to do (not started).
    Idle,
    /// A human of this color must act through [`Orchestrator::human_move`].
    AwaitingHuman(Color),
    /// The state changed.
    Transition {
        /// Previous state.
        from: GameState,
        /// New state.
        to: GameState,
    },
    /// A forced pass was applied for a machine.
    AutoPassed(Color),
    /// A decision was requested; deliver the answer to [`Orchestrator::respond`].
    Requested(DecisionRequest),
    /// The match was scored and tallied.
    Ended(MatchOutcome),
    /// Waiting for [`Orchestrator::confirm`].
    AwaitingConfirm(ConfirmPrompt),
}

/// Tick-driven coordinator of one Reversi session.
///
/// Owns the engine, both agent handles and the tallies. The engine is reset
/// in place between matches, so tallies outlive individual matches.
#[derive(Debug)]
pub struct Orchestrator {
    engine: Engine,
    state: GameState,
    agents: [Agent; 2],
    pending: Option<AgentId>,
    tallies: Tallies,
    settings: OrchestratorSettings,
    prompt: Option<ConfirmPrompt>,
    matches_played: u32,
}

impl Orchestrator {
    /// Creates an orchestrator in [`GameState::NotReady`].
    ///
    /// `first` and `second` must be seated on different colors.
    #[instrument(skip_all, fields(first = %first.name(), second = %second.name()))]
    pub fn new(
        first: Agent,
        second: Agent,
        settings: OrchestratorSettings,
    ) -> Result<Self, TurnError> {
        if first.color() == second.color() {
            error!(color = %first.color(), "Both agents on one color");
            return Err(TurnError::SeatConflict(*first.color()));
        }
        let tallies = Tallies::new(*first.team(), *second.team());
        Ok(Self {
            engine: Engine::new(),
            state: GameState::NotReady,
            agents: [first, second],
            pending: None,
            tallies,
            settings,
            prompt: None,
            matches_played: 0,
        })
    }

    /// Current state.
    pub fn state(&self) -> GameState {
        self.state
    }

    /// The engine, read-only.
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Both handles, indexed by [`AgentId::index`].
    pub fn agents(&self) -> &[Agent; 2] {
        &self.agents
    }

    /// Handle by id.
    pub fn agent(&self, id: AgentId) -> &Agent {
        &self.agents[id.index()]
    }

    /// Handle currently playing `color`.
    pub fn agent_for(&self, color: Color) -> &Agent {
        if *self.agents[0].color() == color {
            &self.agents[0]
        } else {
            &self.agents[1]
        }
    }

    /// Agent with an outstanding request.
    pub fn pending(&self) -> Option<AgentId> {
        self.pending
    }

    /// Running tallies.
    pub fn tallies(&self) -> &Tallies {
        &self.tallies
    }

    /// Behaviour switches.
    pub fn settings(&self) -> &OrchestratorSettings {
        &self.settings
    }

    /// Matches scored so far.
    pub fn matches_played(&self) -> u32 {
        self.matches_played
    }

    /// Exactly one side is human.
    pub fn human_vs_machine(&self) -> bool {
        self.agents[0].is_human() != self.agents[1].is_human()
    }

    /// At least one side is human.
    pub fn some_human(&self) -> bool {
        self.agents.iter().any(Agent::is_human)
    }

    /// Both sides are machines.
    pub fn machine_only(&self) -> bool {
        self.agents.iter().all(Agent::is_machine)
    }

    /// A human may act now: playing, mover is human, nothing pending.
    pub fn human_turn(&self) -> bool {
        self.state == GameState::Play
            && self.pending.is_none()
            && self.agent_for(self.engine.mover()).is_human()
    }

    fn phase(&self) -> MatchPhase {
        if self.engine.is_end() {
            MatchPhase::Ended
        } else if self.engine.step() == 0 {
            MatchPhase::Start
        } else {
            MatchPhase::InProgress
        }
    }

    fn transition(&mut self, to: GameState) -> Tick {
        let from = self.state;
        info!(%from, %to, "State transition");
        self.state = to;
        Tick::Transition { from, to }
    }

    /// Leaves [`GameState::NotReady`] and starts the first match.
    ///
    /// In a human-vs-machine session `human_color` seats the human on that
    /// color; otherwise it is ignored.
    #[instrument(skip(self))]
    pub fn start(&mut self, human_color: Option<Color>) -> Result<(), TurnError> {
        if self.state != GameState::NotReady {
            return Err(TurnError::WrongState {
                action: "start",
                state: self.state,
            });
        }
        if let (Some(color), true) = (human_color, self.human_vs_machine()) {
            let phase = self.phase();
            for agent in &mut self.agents {
                let role = if *agent.color() == color { Role::Human } else { Role::Machine };
                agent.set_role(role, phase)?;
            }
        }
        self.transition(GameState::Play);
        Ok(())
    }

    /// Advances the state machine by one step.
    #[instrument(skip(self), fields(state = %self.state, step = self.engine.step()))]
    pub fn tick(&mut self) -> Tick {
        if let Some(agent) = self.pending {
            debug!(%agent, "Tick skipped, request outstanding");
            return Tick::Blocked;
        }

        match self.state {
            GameState::NotReady => Tick::Idle,
            GameState::Play => self.tick_play(),
            GameState::End => self.tick_end(),
            GameState::Confirm => match self.prompt.clone() {
                Some(prompt) => Tick::AwaitingConfirm(prompt),
                None => self.transition(GameState::Reset),
            },
            GameState::Reset => {
                self.engine.reset();
                info!(
                    black = %self.agent_for(Color::Black).role(),
                    white = %self.agent_for(Color::White).role(),
                    "Match reset"
                );
                self.transition(GameState::Play)
            }
        }
    }

    fn tick_play(&mut self) -> Tick {
        if self.engine.is_end() {
            return self.transition(GameState::End);
        }

        let mover = self.engine.mover();
        let agent = self.agent_for(mover);
        if agent.is_human() {
            return Tick::AwaitingHuman(mover);
        }
        let id = *agent.id();

        if self.settings.auto_pass && !self.engine.turn_enable() {
            return match self.engine.make_move(Ply::Pass) {
                Ok(()) => {
                    info!(%mover, step = self.engine.step(), "Forced pass");
                    Tick::AutoPassed(mover)
                }
                Err(err) => {
                    error!(error = %err, "Forced pass rejected");
                    Tick::Idle
                }
            };
        }

        let delay = self.some_human().then_some(self.settings.machine_delay);
        let request = DecisionRequest {
            agent: id,
            color: mover,
            snapshot: self.snapshot(),
            legal_mask: self.engine.legal_mask(),
            delay,
        };
        self.pending = Some(id);
        debug!(agent = %id, %mover, "Decision requested");
        Tick::Requested(request)
    }

    fn tick_end(&mut self) -> Tick {
        let outcome = self.conclude();

        if self.some_human() {
            self.prompt = Some(self.confirm_prompt(&outcome));
            self.transition(GameState::Confirm);
        } else {
            if self.settings.force_color_rotation {
                if let Err(err) = self.swap_colors() {
                    error!(error = %err, "Color rotation refused");
                }
            }
            self.transition(GameState::Reset);
        }
        Tick::Ended(outcome)
    }

    /// Scores the finished match and updates all three tallies.
    fn conclude(&mut self) -> MatchOutcome {
        let score = self.engine.score();
        let winner = score.leader();

        let race = self
            .human_vs_machine()
            .then(|| winner.map(|color| *self.agent_for(color).role()));
        let team = winner.map(|color| (*self.agent_for(color).team(), color));
        self.tallies.record(winner, race, team);
        self.matches_played += 1;

        let results = self.agents.clone().map(|agent| {
            let result = match winner {
                None => MatchResult::Draw,
                Some(color) if color == *agent.color() => MatchResult::Win,
                Some(_) => MatchResult::Loss,
            };
            AgentResult { agent, result }
        });

        info!(
            ?winner,
            black = score.black,
            white = score.white,
            steps = self.engine.step(),
            matches = self.matches_played,
            "Match concluded"
        );
        MatchOutcome {
            winner,
            score,
            steps: self.engine.step(),
            results,
        }
    }

    fn confirm_prompt(&self, outcome: &MatchOutcome) -> ConfirmPrompt {
        let message = if self.human_vs_machine() {
            let human = self
                .agents
                .iter()
                .find(|a| a.is_human())
                .map(|a| outcome.result_for(*a.id()).result);
            match human {
                Some(MatchResult::Win) => "You Win",
                Some(MatchResult::Loss) => "You Lose",
                _ => "Draw",
            }
        } else {
            match outcome.winner {
                Some(Color::Black) => "Black Win",
                Some(Color::White) => "White Win",
                None => "Draw",
            }
        };
        ConfirmPrompt {
            message: message.to_string(),
            choices: [("Change", ConfirmChoice::Change), ("Continue", ConfirmChoice::Continue)],
        }
    }

    /// Resolves the confirm step. `Change` swaps both agents' roles.
    #[instrument(skip(self))]
    pub fn confirm(&mut self, choice: ConfirmChoice) -> Result<(), TurnError> {
        if self.state != GameState::Confirm {
            return Err(TurnError::WrongState {
                action: "confirm",
                state: self.state,
            });
        }
        if choice == ConfirmChoice::Change {
            self.swap_roles()?;
        }
        self.prompt = None;
        self.transition(GameState::Reset);
        Ok(())
    }

    /// Swaps human and machine on both sides. Match boundaries only.
    #[instrument(skip(self))]
    pub fn swap_roles(&mut self) -> Result<(), TurnError> {
        let phase = self.phase();
        for agent in &mut self.agents {
            agent.change_role(phase)?;
        }
        Ok(())
    }

    /// Swaps colors of both sides. Match boundaries only.
    #[instrument(skip(self))]
    pub fn swap_colors(&mut self) -> Result<(), TurnError> {
        let phase = self.phase();
        for agent in &mut self.agents {
            agent.change_color(phase)?;
        }
        Ok(())
    }

    /// Accepts the answer to the outstanding request.
    ///
    /// A decision from an agent that is not pending is discarded and the
    /// request stays outstanding. Any other rejection (wrong color, illegal
    /// ply) also discards the decision but clears the request, so the next
    /// tick asks again.
    #[instrument(skip(self), fields(pending = ?self.pending))]
    pub fn respond(&mut self, decision: Decision) -> Result<(), TurnError> {
        if self.pending != Some(decision.agent) {
            let err = TurnError::AgentMismatch {
                expected: self.pending,
                got: decision.agent,
            };
            error!(error = %err, "Decision discarded");
            return Err(err);
        }
        self.pending = None;

        let mover = self.engine.mover();
        let seated = *self.agent(decision.agent).color();
        if decision.color != mover || seated != mover {
            let err = TurnError::TeamMismatch {
                agent: decision.agent,
                claimed: decision.color,
                mover,
            };
            warn!(error = %err, "Decision discarded");
            return Err(err);
        }

        self.engine.make_move(decision.ply).map_err(|err| {
            warn!(error = %err, agent = %decision.agent, "Decision rejected by engine");
            TurnError::from(err)
        })?;
        debug!(agent = %decision.agent, ply = %decision.ply, "Decision applied");
        Ok(())
    }

    /// Applies a human's click or pass button.
    #[instrument(skip(self))]
    pub fn human_move(&mut self, ply: Ply) -> Result<(), TurnError> {
        self.ensure_human_turn("move")?;
        self.engine.make_move(ply)?;
        Ok(())
    }

    /// Retracts the human's last round in a human-vs-machine match.
    ///
    /// Allowed on the human's turn only. Returns the number of plies removed.
    #[instrument(skip(self))]
    pub fn undo_last_round(&mut self) -> Result<usize, TurnError> {
        if !self.human_vs_machine() {
            return Err(TurnError::WrongState {
                action: "undo outside human-vs-machine",
                state: self.state,
            });
        }
        let color = self.ensure_human_turn("undo")?;
        let removed = self.engine.retract_last_round(color)?;
        info!(%color, removed, step = self.engine.step(), "Round retracted");
        Ok(removed)
    }

    fn ensure_human_turn(&self, action: &'static str) -> Result<Color, TurnError> {
        if self.state != GameState::Play {
            return Err(TurnError::WrongState {
                action,
                state: self.state,
            });
        }
        if let Some(agent) = self.pending {
            return Err(TurnError::RequestPending(agent));
        }
        let mover = self.engine.mover();
        if !self.agent_for(mover).is_human() {
            return Err(TurnError::NotHumanTurn(mover));
        }
        Ok(mover)
    }

    /// Builds a read-only view for renderers and deciders.
    pub fn snapshot(&self) -> Snapshot {
        let squares = Position::all()
            .map(|position| {
                let square = self.engine.square(position);
                SquareView {
                    position,
                    state: square.state(),
                    placed_at_step: square.placed_at_step(),
                    movability: self.engine.movability(position),
                }
            })
            .collect();
        Snapshot {
            game_state: self.state,
            squares,
            mover: self.engine.mover(),
            last_move: self.engine.last_move(),
            step: self.engine.step(),
            score: self.engine.score(),
            tallies: self.tallies,
            human_turn: self.human_turn(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::TeamId;

    fn machines() -> Orchestrator {
        let first = Agent::new(AgentId::First, "m1", TeamId(1), Role::Machine, Color::Black);
        let second = Agent::new(AgentId::Second, "m2", TeamId(0), Role::Machine, Color::White);
        Orchestrator::new(first, second, OrchestratorSettings::default()).unwrap()
    }

    fn e3() -> Ply {
        Ply::Place(Position::new(2, 4).unwrap())
    }

    #[test]
    fn test_not_ready_until_started() {
        let mut orch = machines();
        assert_eq!(orch.tick(), Tick::Idle);
        orch.start(None).unwrap();
        assert_eq!(orch.state(), GameState::Play);
        assert!(matches!(orch.start(None), Err(TurnError::WrongState { .. })));
    }

    #[test]
    fn test_seat_conflict() {
        let first = Agent::new(AgentId::First, "a", TeamId(1), Role::Machine, Color::Black);
        let second = Agent::new(AgentId::Second, "b", TeamId(0), Role::Machine, Color::Black);
        let err = Orchestrator::new(first, second, OrchestratorSettings::default()).unwrap_err();
        assert_eq!(err, TurnError::SeatConflict(Color::Black));
    }

    #[test]
    fn test_request_blocks_further_ticks() {
        let mut orch = machines();
        orch.start(None).unwrap();

        let Tick::Requested(request) = orch.tick() else {
            panic!("expected a decision request");
        };
        assert_eq!(request.agent, AgentId::First);
        assert_eq!(request.color, Color::Black);
        assert_eq!(request.delay, None);
        assert_eq!(request.legal_plies().len(), 4);
        assert_eq!(orch.pending(), Some(AgentId::First));

        assert_eq!(orch.tick(), Tick::Blocked);
        assert_eq!(orch.tick(), Tick::Blocked);
    }

    #[test]
    fn test_respond_applies_and_clears_pending() {
        let mut orch = machines();
        orch.start(None).unwrap();
        let _ = orch.tick();

        orch.respond(Decision::new(AgentId::First, Color::Black, e3())).unwrap();
        assert_eq!(orch.pending(), None);
        assert_eq!(orch.engine().mover(), Color::White);
        assert_eq!(orch.engine().score().black, 4);
    }

    #[test]
    fn test_agent_mismatch_keeps_request() {
        let mut orch = machines();
        orch.start(None).unwrap();
        let _ = orch.tick();

        let err = orch.respond(Decision::new(AgentId::Second, Color::White, e3())).unwrap_err();
        assert!(matches!(
            err,
            TurnError::AgentMismatch {
                expected: Some(AgentId::First),
                got: AgentId::Second
            }
        ));
        assert_eq!(orch.pending(), Some(AgentId::First));
        assert_eq!(orch.engine().step(), 0);
    }

    #[test]
    fn test_team_mismatch_discards_without_mutation() {
        let mut orch = machines();
        orch.start(None).unwrap();
        let _ = orch.tick();

        let err = orch.respond(Decision::new(AgentId::First, Color::White, e3())).unwrap_err();
        assert!(matches!(
            err,
            TurnError::TeamMismatch {
                claimed: Color::White,
                mover: Color::Black,
                ..
            }
        ));
        assert_eq!(orch.engine().step(), 0);
        assert_eq!(orch.pending(), None);
    }

    #[test]
    fn test_illegal_decision_surfaces_engine_error() {
        let mut orch = machines();
        orch.start(None).unwrap();
        let _ = orch.tick();

        let corner = Ply::Place(Position::new(0, 0).unwrap());
        let err = orch.respond(Decision::new(AgentId::First, Color::Black, corner)).unwrap_err();
        assert!(matches!(err, TurnError::Engine(EngineError::IllegalMove { .. })));
        let err = {
            let _ = orch.tick();
            orch.respond(Decision::new(AgentId::First, Color::Black, Ply::Pass)).unwrap_err()
        };
        assert_eq!(err, TurnError::Engine(EngineError::IllegalPass(Color::Black)));
    }

    #[test]
    fn test_human_move_gating() {
        let first = Agent::new(AgentId::First, "human", TeamId(1), Role::Human, Color::Black);
        let second = Agent::new(AgentId::Second, "machine", TeamId(0), Role::Machine, Color::White);
        let mut orch = Orchestrator::new(first, second, OrchestratorSettings::default()).unwrap();

        assert!(matches!(orch.human_move(e3()), Err(TurnError::WrongState { .. })));
        orch.start(None).unwrap();
        assert_eq!(orch.tick(), Tick::AwaitingHuman(Color::Black));
        assert!(orch.human_turn());
        orch.human_move(e3()).unwrap();

        let Tick::Requested(request) = orch.tick() else {
            panic!("expected machine request");
        };
        assert_eq!(request.delay, Some(Duration::from_millis(500)));
        assert_eq!(orch.human_move(Ply::Pass), Err(TurnError::RequestPending(AgentId::Second)));
    }

    #[test]
    fn test_start_seats_human_on_requested_color() {
        let first = Agent::new(AgentId::First, "human", TeamId(1), Role::Human, Color::Black);
        let second = Agent::new(AgentId::Second, "machine", TeamId(0), Role::Machine, Color::White);
        let mut orch = Orchestrator::new(first, second, OrchestratorSettings::default()).unwrap();

        orch.start(Some(Color::White)).unwrap();
        assert!(orch.agent_for(Color::White).is_human());
        assert!(orch.agent_for(Color::Black).is_machine());
        assert!(matches!(orch.tick(), Tick::Requested(_)));
    }
}
