//! Strictly Reversi - terminal front end
//!
//! Runs human-vs-machine matches on stdin/stdout, or machine self-play.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use strictly_reversi::{MatchConfig, MatchEvent, MatchOutcome, MatchRunner, stdin_lines};
use tokio::sync::mpsc;
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,strictly_reversi=debug")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Play {
            config,
            matches,
            side,
            json,
        } => run_play(config, matches, side.map(Into::into), json).await,
        Command::Selfplay {
            matches,
            no_rotate,
            json,
        } => run_selfplay(matches, no_rotate, json).await,
    }
}

/// Play at the terminal
#[instrument(skip_all, fields(config_path = %config.display()))]
async fn run_play(
    config: std::path::PathBuf,
    matches: u32,
    side: Option<strictly_reversi::Color>,
    json: bool,
) -> Result<()> {
    let config = MatchConfig::load_or_default(&config)?;
    info!(black = %config.black().name(), white = %config.white().name(), "Starting play");

    println!("Enter a cell (e.g. d3), \"pass\" or \"undo\". After a match: \"change\" or Enter.");
    let (tx, rx) = mpsc::unbounded_channel();
    let mut runner = MatchRunner::from_config(&config, Some(stdin_lines()))?.with_events(tx);
    runner.orchestrator_mut().start(side)?;
    println!("{}", runner.orchestrator().engine());

    let outcomes = drive(&mut runner, rx, matches, json).await?;
    report(&runner, &outcomes, json)
}

/// Machine self-play
#[instrument]
async fn run_selfplay(matches: u32, no_rotate: bool, json: bool) -> Result<()> {
    let config = MatchConfig::selfplay()
        .with_force_color_rotation(!no_rotate)
        .with_machine_delay_ms(0);
    info!(matches, rotate = !no_rotate, "Starting self-play");

    let (tx, rx) = mpsc::unbounded_channel();
    let mut runner = MatchRunner::from_config(&config, None)?.with_events(tx);
    let outcomes = drive(&mut runner, rx, matches, json).await?;
    report(&runner, &outcomes, json)
}

/// Runs the matches while printing events as they arrive.
async fn drive(
    runner: &mut MatchRunner,
    mut rx: mpsc::UnboundedReceiver<MatchEvent>,
    matches: u32,
    json: bool,
) -> Result<Vec<MatchOutcome>> {
    // Events print while the runner waits on input; the rest drain afterwards.
    let outcomes = {
        let printer = async {
            while let Some(event) = rx.recv().await {
                print_event(&event, json);
            }
        };
        tokio::select! {
            result = runner.run(matches) => result?,
            _ = printer => anyhow::bail!("Event channel closed early"),
        }
    };
    while let Ok(event) = rx.try_recv() {
        print_event(&event, json);
    }
    Ok(outcomes)
}

fn print_event(event: &MatchEvent, json: bool) {
    match event {
        MatchEvent::Played { mv, board, snapshot } => {
            if json {
                match serde_json::to_string(snapshot) {
                    Ok(line) => println!("{}", line),
                    Err(e) => tracing::warn!(error = %e, "Snapshot serialization failed"),
                }
            } else {
                println!("{}\n{}", mv, board);
            }
        }
        MatchEvent::Undone { color, removed } => println!("{} took back {} plies", color, removed),
        MatchEvent::Rejected { agent, error } => println!("Rejected ({}): {}", agent, error),
        MatchEvent::Ended(outcome) => println!(
            "Game over: black {} white {} ({})",
            outcome.score.black,
            outcome.score.white,
            outcome.winner.map_or("draw".to_string(), |c| format!("{} wins", c))
        ),
        MatchEvent::Confirmed { message, choice } => println!("{} -> {:?}", message, choice),
        MatchEvent::HumanTurn(color) => println!("{} to move:", color),
        MatchEvent::ConfirmRequested(prompt) => {
            let labels: Vec<_> = prompt.choices.iter().map(|(label, _)| *label).collect();
            println!("{} [{}]", prompt.message, labels.join(" / "));
        }
        MatchEvent::Transition { .. } => {}
    }
}

fn report(runner: &MatchRunner, outcomes: &[MatchOutcome], json: bool) -> Result<()> {
    let orchestrator = runner.orchestrator();
    if json {
        println!("{}", serde_json::to_string(orchestrator.tallies())?);
    } else {
        let headline = orchestrator.tallies().headline(
            orchestrator.settings().force_color_rotation,
            orchestrator.machine_only(),
            orchestrator.human_vs_machine(),
        );
        println!("{} matches played", outcomes.len());
        println!("{}", headline);
    }
    Ok(())
}
