//! Headless Scenario Runner
//!
//! Plays a scenario with a fixed answer policy and prints the session result.
//! Useful for checking scenario pacing and scoring without a learner.

use clap::{Parser, ValueEnum};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::path::PathBuf;

use clinical_sim::core::config::EngineConfig;
use clinical_sim::core::types::Phase;
use clinical_sim::engine::{SessionController, SessionResult, TracingObserver};
use clinical_sim::scenario::{library, resolve_scenario};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Policy {
    /// Always pick the correct option
    Correct,
    /// Always pick option 0
    First,
    /// Pick a uniformly random option
    Random,
    /// Never answer
    Lapse,
}

/// Headless Scenario Runner - play a scenario with a scripted learner
#[derive(Parser, Debug)]
#[command(name = "scenario_runner")]
#[command(about = "Run a clinical scenario with a fixed answer policy and report the result")]
struct Args {
    /// Built-in scenario id or path to a .toml/.json scenario
    #[arg(long, default_value = "acute-mi")]
    scenario: String,

    /// Engine configuration TOML file
    #[arg(long)]
    config: Option<PathBuf>,

    /// How the scripted learner answers
    #[arg(long, value_enum, default_value_t = Policy::Correct)]
    policy: Policy,

    /// Random seed for drift and the random policy
    #[arg(long)]
    seed: Option<u64>,

    /// Complete the session after this many simulated seconds
    #[arg(long, default_value_t = 600)]
    max_ticks: u64,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,

    /// List built-in scenarios and exit
    #[arg(long)]
    list: bool,

    /// Log every snapshot
    #[arg(long, short = 'v')]
    verbose: bool,
}

/// JSON output structure
#[derive(Serialize)]
struct RunReport<'a> {
    policy: String,
    seed: u64,
    accuracy: f32,
    #[serde(flatten)]
    result: &'a SessionResult,
}

fn main() {
    let args = Args::parse();

    let filter = if args.verbose {
        "clinical_sim=debug"
    } else {
        "clinical_sim=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if args.list {
        for scenario in library::all() {
            println!(
                "{:<14} {} ({} events)",
                scenario.id,
                scenario.title,
                scenario.events.len()
            );
        }
        return;
    }

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> clinical_sim::Result<()> {
    let seed = args.seed.unwrap_or_else(rand::random);
    let mut rng = StdRng::seed_from_u64(seed);

    let config = match &args.config {
        Some(path) => EngineConfig::load_from_toml(path)?,
        None => EngineConfig::default(),
    }
    .with_seed(seed);

    let scenario = resolve_scenario(&args.scenario)?;
    let mut controller = SessionController::new(config)?;
    if args.verbose {
        controller.add_observer(Box::new(TracingObserver));
    }
    controller.start(scenario)?;

    while controller.phase() != Phase::Completed {
        let elapsed = controller.state().map(|s| s.time()).unwrap_or(0);
        if elapsed >= args.max_ticks {
            controller.complete()?;
            break;
        }

        match controller.phase() {
            Phase::AwaitingDecision => {
                let choice = controller.state().and_then(|s| s.pending_event()).and_then(|event| {
                    match args.policy {
                        Policy::Correct => event.correct_option,
                        Policy::First if event.has_options() => Some(0),
                        Policy::Random if event.has_options() => {
                            Some(rng.gen_range(0..event.options.len()))
                        }
                        _ => None,
                    }
                });
                controller.submit_decision(choice)?;
            }
            Phase::Running => {
                controller.advance(args.max_ticks - elapsed)?;
            }
            other => {
                eprintln!("Unexpected phase {}", other);
                controller.complete()?;
            }
        }
    }

    let Some(result) = controller.result() else {
        return Ok(());
    };

    if args.format == "text" {
        println!("{}", result.summary());
        for record in &result.decision_history {
            println!(
                "  t={:>4}s {:<22} {:?} {}",
                record.resolved_at,
                record.event_id.as_str(),
                record.chosen_option,
                if record.correct { "correct" } else { "incorrect" }
            );
        }
    } else {
        let report = RunReport {
            policy: format!("{:?}", args.policy).to_lowercase(),
            seed,
            accuracy: result.accuracy(),
            result,
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&report).unwrap_or_else(|_| "{}".to_string())
        );
    }
    Ok(())
}
