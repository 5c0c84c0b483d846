//! Async driver that turns orchestrator ticks into collaborator calls.

use crate::agent::AgentId;
use crate::games::reversi::{Color, Move};
use crate::match_config::MatchConfig;
use crate::orchestrator::{
    ConfirmChoice, ConfirmPrompt, Decision, DecisionRequest, GameState, MatchOutcome, Orchestrator,
    Snapshot, Tick,
};
use crate::players::{
    Confirmer, Decider, FirstLegal, HumanInput, HumanPlayer, LineConfirmer, ScriptedConfirmer,
    SharedLines,
};
use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

/// Messages sent from the runner to a front end.
#[derive(Debug, Clone)]
pub enum MatchEvent {
    /// Orchestrator state changed.
    Transition {
        /// Previous state.
        from: GameState,
        /// New state.
        to: GameState,
    },
    /// A human of this color is expected to act.
    HumanTurn(Color),
    /// The confirm step is waiting for a choice.
    ConfirmRequested(ConfirmPrompt),
    /// A ply was accepted.
    Played {
        /// The ply and its color.
        mv: Move,
        /// Text rendering of the engine after the ply.
        board: String,
        /// View after the ply.
        snapshot: Box<Snapshot>,
    },
    /// A human retracted a round.
    Undone {
        /// Human's color.
        color: Color,
        /// Plies removed.
        removed: usize,
    },
    /// A decision or input was discarded.
    Rejected {
        /// Offending agent.
        agent: AgentId,
        /// Why.
        error: String,
    },
    /// A match finished.
    Ended(MatchOutcome),
    /// The confirm step was resolved.
    Confirmed {
        /// Prompt headline.
        message: String,
        /// Choice made.
        choice: ConfirmChoice,
    },
}

/// Owns an orchestrator and the collaborators that answer it.
pub struct MatchRunner {
    orchestrator: Orchestrator,
    deciders: [Box<dyn Decider>; 2],
    human: Option<HumanPlayer>,
    confirmer: Box<dyn Confirmer>,
    max_rejections: u32,
    events: Option<mpsc::UnboundedSender<MatchEvent>>,
}

impl MatchRunner {
    /// Creates a runner. `deciders` are indexed by [`AgentId::index`].
    pub fn new(
        orchestrator: Orchestrator,
        deciders: [Box<dyn Decider>; 2],
        confirmer: Box<dyn Confirmer>,
    ) -> Self {
        Self {
            orchestrator,
            deciders,
            human: None,
            confirmer,
            max_rejections: 3,
            events: None,
        }
    }

    /// Builds a runner from configuration.
    ///
    /// Both agents get a first-legal decider so roles can be swapped later.
    /// With `lines`, humans read from them and so does the confirm step;
    /// without, confirmations always continue.
    #[instrument(skip_all)]
    pub fn from_config(config: &MatchConfig, lines: Option<SharedLines>) -> Result<Self> {
        config.validate()?;
        let (first, second) = config.agents();
        let deciders: [Box<dyn Decider>; 2] = [
            Box::new(FirstLegal::new(first.name().as_str())),
            Box::new(FirstLegal::new(second.name().as_str())),
        ];
        let human_name = [&first, &second]
            .into_iter()
            .find(|a| a.is_human())
            .map(|a| a.name().clone())
            .unwrap_or_else(|| "Human".to_string());

        let orchestrator = Orchestrator::new(first, second, config.settings())?;
        let runner = match lines {
            Some(lines) => {
                let confirmer = Box::new(LineConfirmer::new(lines.clone()));
                Self::new(orchestrator, deciders, confirmer)
                    .with_human(HumanPlayer::new(human_name, lines))
            }
            None => Self::new(orchestrator, deciders, Box::new(ScriptedConfirmer::default())),
        };
        Ok(runner.with_max_rejections(*config.max_rejections()))
    }

    /// Attaches the human input source.
    pub fn with_human(mut self, human: HumanPlayer) -> Self {
        self.human = Some(human);
        self
    }

    /// Sets how many consecutive rejected decisions end the run.
    pub fn with_max_rejections(mut self, max_rejections: u32) -> Self {
        self.max_rejections = max_rejections.max(1);
        self
    }

    /// Sends [`MatchEvent`]s to `tx`.
    pub fn with_events(mut self, tx: mpsc::UnboundedSender<MatchEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    /// The orchestrator, read-only.
    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    /// The orchestrator, for starting and handle changes between runs.
    pub fn orchestrator_mut(&mut self) -> &mut Orchestrator {
        &mut self.orchestrator
    }

    /// Plays until `matches` more matches have ended.
    ///
    /// Starts the orchestrator if needed. Returns the outcomes in order.
    ///
    /// # Errors
    ///
    /// Fails when a collaborator fails, when a human is to move but no input
    /// is attached, or when a machine exceeds the rejection limit.
    #[instrument(skip(self))]
    pub async fn run(&mut self, matches: u32) -> Result<Vec<MatchOutcome>> {
        let mut outcomes = Vec::new();
        if matches == 0 {
            return Ok(outcomes);
        }
        if self.orchestrator.state() == GameState::NotReady {
            self.orchestrator.start(None)?;
        }

        let mut rejections = 0;
        loop {
            match self.orchestrator.tick() {
                Tick::Idle => {
                    anyhow::bail!("Orchestrator idle in state {}", self.orchestrator.state())
                }
                Tick::Blocked => anyhow::bail!("Decision request left outstanding"),
                Tick::Transition { from, to } => {
                    emit(&self.events, MatchEvent::Transition { from, to })
                }
                Tick::AutoPassed(color) => {
                    debug!(%color, "Auto pass");
                    self.emit_played();
                }
                Tick::AwaitingHuman(color) => self.drive_human(color).await?,
                Tick::Requested(request) => self.drive_machine(request, &mut rejections).await?,
                Tick::Ended(outcome) => {
                    for id in [AgentId::First, AgentId::Second] {
                        if self.orchestrator.agent(id).is_machine() {
                            self.deciders[id.index()].on_match_end(&outcome);
                        }
                    }
                    emit(&self.events, MatchEvent::Ended(outcome.clone()));
                    outcomes.push(outcome);
                    if outcomes.len() >= matches as usize {
                        info!(matches = outcomes.len(), "Run complete");
                        return Ok(outcomes);
                    }
                }
                Tick::AwaitingConfirm(prompt) => {
                    emit(&self.events, MatchEvent::ConfirmRequested(prompt.clone()));
                    let choice = self.confirmer.confirm(&prompt).await?;
                    self.orchestrator.confirm(choice)?;
                    emit(
                        &self.events,
                        MatchEvent::Confirmed {
                            message: prompt.message,
                            choice,
                        },
                    );
                }
            }
        }
    }

    async fn drive_machine(
        &mut self,
        request: DecisionRequest,
        rejections: &mut u32,
    ) -> Result<()> {
        if let Some(delay) = request.delay {
            tokio::time::sleep(delay).await;
        }

        let agent = request.agent;
        let decider = &mut self.deciders[agent.index()];
        let ply = decider
            .decide(&request)
            .await
            .with_context(|| format!("{} failed to decide", decider.name()))?;

        match self.orchestrator.respond(Decision::new(agent, request.color, ply)) {
            Ok(()) => {
                *rejections = 0;
                self.emit_played();
                Ok(())
            }
            Err(err) => {
                decider.on_rejected(&err);
                *rejections += 1;
                warn!(
                    %agent,
                    %ply,
                    error = %err,
                    rejections = *rejections,
                    "Machine decision rejected"
                );
                emit(
                    &self.events,
                    MatchEvent::Rejected {
                        agent,
                        error: err.to_string(),
                    },
                );
                if *rejections >= self.max_rejections {
                    anyhow::bail!(
                        "{} ({}) ended its episode after {} rejected decisions: {}",
                        decider.name(),
                        agent,
                        rejections,
                        err
                    );
                }
                Ok(())
            }
        }
    }

    async fn drive_human(&mut self, color: Color) -> Result<()> {
        let agent = *self.orchestrator.agent_for(color).id();
        let snapshot = self.orchestrator.snapshot();
        emit(&self.events, MatchEvent::HumanTurn(color));
        let Some(human) = self.human.as_mut() else {
            anyhow::bail!("{} is human-controlled but no input is attached", color);
        };

        let result = match human.next_input(&snapshot).await? {
            HumanInput::Play(ply) => self.orchestrator.human_move(ply).map(|()| self.emit_played()),
            HumanInput::Undo => self.orchestrator.undo_last_round().map(|removed| {
                emit(&self.events, MatchEvent::Undone { color, removed });
            }),
        };

        if let Err(err) = result {
            warn!(%agent, error = %err, "Human input rejected");
            emit(
                &self.events,
                MatchEvent::Rejected {
                    agent,
                    error: err.to_string(),
                },
            );
        }
        Ok(())
    }

    fn emit_played(&self) {
        let Some(tx) = &self.events else {
            return;
        };
        let Some(mv) = self.orchestrator.engine().last_move() else {
            return;
        };
        let event = MatchEvent::Played {
            mv,
            board: self.orchestrator.engine().to_string(),
            snapshot: Box::new(self.orchestrator.snapshot()),
        };
        if tx.send(event).is_err() {
            debug!("Event receiver dropped");
        }
    }
}

fn emit(events: &Option<mpsc::UnboundedSender<MatchEvent>>, event: MatchEvent) {
    if let Some(tx) = events {
        if tx.send(event).is_err() {
            debug!("Event receiver dropped");
        }
    }
}
