//! Async runner: self-play, scripted humans and episode termination.

use std::sync::{Arc, Mutex};
use strictly_reversi::{
    Agent, AgentId, Color, Decider, DecisionRequest, FirstLegal, HumanPlayer, MatchConfig,
    MatchEvent, MatchOutcome, MatchResult, MatchRunner, Orchestrator, OrchestratorSettings, Ply,
    Role, ScriptedConfirmer, SeatConfig, TeamId, TurnError, shared_lines,
};
use tokio::sync::mpsc;

const BLACK_PLIES: &str =
    "e3 c2 c1 a1 e1 e2 g1 b3 a3 c3 h2 g3 f4 a5 c6 c4 g5 g4 b6 h5 e6 g6 a7 c7 e7 g7 b8 d8 h7 g8";
const WHITE_PLIES: &str =
    "d3 d2 b1 d1 f2 f1 g2 b2 a2 f3 h1 h3 a4 f5 c5 b5 d6 b4 h4 a6 f6 h6 b7 d7 f7 a8 c8 e8 f8 h8";

fn drain(rx: &mut mpsc::UnboundedReceiver<MatchEvent>) -> Vec<MatchEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// First-legal machine that records its results.
struct Recorder {
    inner: FirstLegal,
    agent: AgentId,
    results: Arc<Mutex<Vec<(AgentId, MatchResult)>>>,
}

#[async_trait::async_trait]
impl Decider for Recorder {
    async fn decide(&mut self, request: &DecisionRequest) -> anyhow::Result<Ply> {
        self.inner.decide(request).await
    }

    fn on_match_end(&mut self, outcome: &MatchOutcome) {
        let result = outcome.result_for(self.agent).result;
        self.results.lock().unwrap().push((self.agent, result));
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

/// Always passes, which is illegal at the opening.
struct Stubborn;

#[async_trait::async_trait]
impl Decider for Stubborn {
    async fn decide(&mut self, _request: &DecisionRequest) -> anyhow::Result<Ply> {
        Ok(Ply::Pass)
    }

    fn on_rejected(&mut self, error: &TurnError) {
        assert_eq!(error.to_string(), "Black cannot pass while a legal move exists");
    }

    fn name(&self) -> &str {
        "stubborn"
    }
}

fn machines(settings: OrchestratorSettings) -> Orchestrator {
    let first = Agent::new(AgentId::First, "a", TeamId(1), Role::Machine, Color::Black);
    let second = Agent::new(AgentId::Second, "b", TeamId(0), Role::Machine, Color::White);
    Orchestrator::new(first, second, settings).unwrap()
}

#[tokio::test]
async fn test_selfplay_rotates_and_tallies() {
    let config = MatchConfig::selfplay().with_machine_delay_ms(0);
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut runner = MatchRunner::from_config(&config, None).unwrap().with_events(tx);

    let outcomes = runner.run(2).await.unwrap();
    assert_eq!(outcomes.len(), 2);
    for outcome in &outcomes {
        assert_eq!(outcome.winner, Some(Color::Black));
        assert_eq!((outcome.score.black, outcome.score.white), (40, 24));
        assert_eq!(outcome.steps, 60);
    }
    assert_eq!(outcomes[0].result_for(AgentId::First).result, MatchResult::Win);
    assert_eq!(outcomes[1].result_for(AgentId::First).result, MatchResult::Loss);

    let orch = runner.orchestrator();
    assert_eq!(*orch.tallies().color().black(), 2);
    assert_eq!(orch.matches_played(), 2);
    assert_eq!(
        orch.tallies().headline(true, true, false).to_string(),
        "Team A : Team B : Draw = 1 : 1 : 0"
    );

    let events = drain(&mut rx);
    let plies = events.iter().filter(|e| matches!(e, MatchEvent::Played { .. })).count();
    assert_eq!(plies, 120);
    assert_eq!(events.iter().filter(|e| matches!(e, MatchEvent::Ended(_))).count(), 2);
}

#[tokio::test]
async fn test_on_match_end_reaches_deciders() {
    let results = Arc::new(Mutex::new(Vec::new()));
    let recorder = |agent: AgentId| {
        Box::new(Recorder {
            inner: FirstLegal::new(format!("{}", agent)),
            agent,
            results: results.clone(),
        }) as Box<dyn Decider>
    };
    let settings = OrchestratorSettings::new(true, false, std::time::Duration::ZERO);
    let mut runner = MatchRunner::new(
        machines(settings),
        [recorder(AgentId::First), recorder(AgentId::Second)],
        Box::new(ScriptedConfirmer::default()),
    );

    runner.run(1).await.unwrap();
    let results = results.lock().unwrap();
    assert_eq!(
        *results,
        vec![(AgentId::First, MatchResult::Win), (AgentId::Second, MatchResult::Loss)]
    );
}

#[tokio::test]
async fn test_on_match_end_skips_human_seat() {
    let results = Arc::new(Mutex::new(Vec::new()));
    let recorder = |agent: AgentId| {
        Box::new(Recorder {
            inner: FirstLegal::new(format!("{}", agent)),
            agent,
            results: results.clone(),
        }) as Box<dyn Decider>
    };
    let first = Agent::new(AgentId::First, "alice", TeamId(1), Role::Human, Color::Black);
    let second = Agent::new(AgentId::Second, "bot", TeamId(0), Role::Machine, Color::White);
    let settings = OrchestratorSettings::new(true, false, std::time::Duration::ZERO);
    let orch = Orchestrator::new(first, second, settings).unwrap();

    let (line_tx, line_rx) = mpsc::unbounded_channel();
    for line in BLACK_PLIES.split(' ') {
        line_tx.send(line.to_string()).unwrap();
    }
    let mut runner = MatchRunner::new(
        orch,
        [recorder(AgentId::First), recorder(AgentId::Second)],
        Box::new(ScriptedConfirmer::default()),
    )
    .with_human(HumanPlayer::new("alice", shared_lines(line_rx)));

    let outcomes = runner.run(1).await.unwrap();
    assert_eq!(outcomes[0].winner, Some(Color::Black));
    assert_eq!(*results.lock().unwrap(), vec![(AgentId::Second, MatchResult::Loss)]);
}

#[tokio::test]
async fn test_rejection_limit_ends_episode() {
    let mut runner = MatchRunner::new(
        machines(OrchestratorSettings::default()),
        [Box::new(Stubborn) as Box<dyn Decider>, Box::new(FirstLegal::new("b"))],
        Box::new(ScriptedConfirmer::default()),
    )
    .with_max_rejections(2);

    let err = runner.run(1).await.unwrap_err();
    let message = err.to_string();
    assert!(message.contains("stubborn"), "{}", message);
    assert!(message.contains("after 2 rejected decisions"), "{}", message);
    assert_eq!(runner.orchestrator().engine().step(), 0);
}

#[tokio::test]
async fn test_human_without_input_fails() {
    let config = MatchConfig::default().with_machine_delay_ms(0);
    let mut runner = MatchRunner::from_config(&config, None).unwrap();
    let err = runner.run(1).await.unwrap_err();
    assert!(err.to_string().contains("no input is attached"));
}

#[tokio::test]
async fn test_scripted_human_plays_both_sides_across_change() {
    let config = MatchConfig::default()
        .with_black(SeatConfig::new("alice", Role::Human, TeamId(1)))
        .with_white(SeatConfig::new("bot", Role::Machine, TeamId(0)))
        .with_machine_delay_ms(0);

    let (line_tx, line_rx) = mpsc::unbounded_channel();
    for line in ["zz", "a1"].into_iter().chain(BLACK_PLIES.split(' ')) {
        line_tx.send(line.to_string()).unwrap();
    }
    line_tx.send("change".to_string()).unwrap();
    for line in WHITE_PLIES.split(' ') {
        line_tx.send(line.to_string()).unwrap();
    }

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut runner = MatchRunner::from_config(&config, Some(shared_lines(line_rx)))
        .unwrap()
        .with_events(tx);

    let first = runner.run(1).await.unwrap();
    assert_eq!(first[0].result_for(AgentId::First).result, MatchResult::Win);
    let events = drain(&mut rx);
    let rejected: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            MatchEvent::Rejected { agent, error } => Some((*agent, error.clone())),
            _ => None,
        })
        .collect();
    assert_eq!(rejected, vec![(AgentId::First, "Black cannot play a1".to_string())]);
    assert!(events.iter().any(|e| matches!(e, MatchEvent::HumanTurn(Color::Black))));

    // The confirm step reads "change": the White seat is now the human one.
    let second = runner.run(1).await.unwrap();
    let events = drain(&mut rx);
    assert!(events.iter().any(|e| matches!(
        e,
        MatchEvent::Confirmed { message, .. } if message == "You Win"
    )));

    let orch = runner.orchestrator();
    assert!(orch.agent(AgentId::First).is_machine());
    assert!(orch.agent(AgentId::Second).is_human());
    assert_eq!(second[0].result_for(AgentId::Second).result, MatchResult::Loss);
    assert_eq!(second[0].winner, Some(Color::Black));
    assert_eq!(*orch.tallies().race().human(), 1);
    assert_eq!(*orch.tallies().race().machine(), 1);
}

#[tokio::test]
async fn test_human_undo_through_runner() {
    let config = MatchConfig::default().with_machine_delay_ms(0);
    let (line_tx, line_rx) = mpsc::unbounded_channel();
    for line in ["e3", "undo"].into_iter().chain(BLACK_PLIES.split(' ')) {
        line_tx.send(line.to_string()).unwrap();
    }

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut runner = MatchRunner::from_config(&config, Some(shared_lines(line_rx)))
        .unwrap()
        .with_events(tx);

    let outcomes = runner.run(1).await.unwrap();
    assert_eq!(outcomes[0].steps, 60);
    let events = drain(&mut rx);
    assert!(events.iter().any(|e| matches!(
        e,
        MatchEvent::Undone {
            color: Color::Black,
            removed: 2
        }
    )));
}
