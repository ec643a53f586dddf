//! Clinical Sim - Entry Point
//!
//! Interactive console session over a built-in or file scenario.
//! Usage: `clinical-sim [scenario-id-or-path] [config.toml]`

use clinical_sim::core::config::EngineConfig;
use clinical_sim::core::error::Result;
use clinical_sim::core::types::Phase;
use clinical_sim::engine::{SessionController, TracingObserver};
use clinical_sim::scenario::{library, resolve_scenario};
use clinical_sim::vitals::{VitalChannel, VitalStatus};

use std::io::{self, Write};
use std::path::Path;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "clinical_sim=info".into()),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let scenario_name = args.next().unwrap_or_else(|| library::BUILTIN_IDS[0].to_string());
    let config = match args.next() {
        Some(path) => EngineConfig::load_from_toml(Path::new(&path))?,
        None => EngineConfig::default(),
    };

    let scenario = resolve_scenario(&scenario_name)?;
    tracing::info!("Loaded scenario '{}'", scenario.id);

    println!("\n=== {} ===", scenario.title);
    if !scenario.description.is_empty() {
        println!("{}", scenario.description);
    }
    if !scenario.objectives.is_empty() {
        println!("\nObjectives:");
        for objective in &scenario.objectives {
            println!("  - {}", objective);
        }
    }
    println!();
    println!("Commands:");
    println!("  tick / t        - Advance one second");
    println!("  run <n>         - Advance n seconds");
    println!("  pause / p       - Pause or resume");
    println!("  answer <n> / a  - Choose option n for the pending decision");
    println!("  skip            - Let the decision window lapse");
    println!("  status / s      - Show vitals and score");
    println!("  complete        - End the session now");
    println!("  quit / q        - Exit");
    println!();

    let mut controller = SessionController::new(config)?;
    controller.add_observer(Box::new(TracingObserver));
    controller.start(scenario)?;

    loop {
        if controller.phase() == Phase::Completed {
            break;
        }

        display_status(&controller);

        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if input == "quit" || input == "q" {
            break;
        }

        let outcome = match input {
            "tick" | "t" => controller.tick().map(|_| ()),
            "pause" | "p" => controller.toggle_pause().map(|phase| println!("Session {}", phase)),
            "skip" => controller.submit_decision(None).map(|record| {
                println!("No answer given.");
                print_explanation(record.explanation.as_deref());
            }),
            "status" | "s" => {
                display_detailed_status(&controller);
                Ok(())
            }
            "complete" => controller.complete().map(|_| ()),
            _ => {
                if let Some(n) = input.strip_prefix("run ") {
                    match n.trim().parse::<u64>() {
                        Ok(n) => controller.advance(n).map(|report| {
                            println!("Advanced {} second(s).", report.ticks);
                        }),
                        Err(_) => {
                            println!("Usage: run <number>");
                            Ok(())
                        }
                    }
                } else if let Some(n) = input
                    .strip_prefix("answer ")
                    .or_else(|| input.strip_prefix("a "))
                {
                    match n.trim().parse::<usize>() {
                        Ok(n) => controller.submit_decision(Some(n)).map(|record| {
                            println!("{}", if record.correct { "Correct." } else { "Incorrect." });
                            print_explanation(record.explanation.as_deref());
                        }),
                        Err(_) => {
                            println!("Usage: answer <option number>");
                            Ok(())
                        }
                    }
                } else {
                    println!("Unknown command. Available: tick, run <n>, pause, answer <n>, skip, status, complete, quit");
                    Ok(())
                }
            }
        };

        if let Err(e) = outcome {
            println!("Cannot do that: {}", e);
        }
    }

    match controller.result() {
        Some(result) => println!("\n{}", result.summary()),
        None => println!("\nSession abandoned."),
    }
    Ok(())
}

fn print_explanation(explanation: Option<&str>) {
    if let Some(text) = explanation {
        println!("  {}", text);
    }
}

fn status_marker(status: VitalStatus) -> &'static str {
    match status {
        VitalStatus::Normal => " ",
        VitalStatus::Warning => "!",
        VitalStatus::Critical => "X",
    }
}

/// Display a brief status line and any pending decision
fn display_status(controller: &SessionController) {
    let Some(snapshot) = controller.snapshot() else {
        return;
    };
    let v = &snapshot.vitals;
    println!();
    println!(
        "--- t={}s | {} | score {} | HR {:.0} BP {:.0}/{:.0} SpO2 {:.0}% ---",
        snapshot.time,
        snapshot.phase,
        snapshot.score,
        v.heart_rate,
        v.blood_pressure_systolic,
        v.blood_pressure_diastolic,
        v.oxygen_saturation
    );

    if let Some(pending) = &snapshot.pending {
        println!("DECISION: {}", pending.prompt);
        for (i, option) in pending.options.iter().enumerate() {
            println!("  [{}] {}", i, option);
        }
        if pending.options.is_empty() {
            println!("  (observation - type 'skip' to acknowledge)");
        }
    }
}

/// Display every channel with its classification
fn display_detailed_status(controller: &SessionController) {
    let Some(snapshot) = controller.snapshot() else {
        return;
    };
    println!();
    for channel in VitalChannel::ALL {
        let status = snapshot.status(channel).unwrap_or(VitalStatus::Normal);
        println!(
            " {} {:<18} {:>6.1} {}",
            status_marker(status),
            channel.to_string(),
            snapshot.vitals.get(channel),
            channel.unit()
        );
    }
    if let Some(state) = controller.state() {
        println!(
            "Decisions: {} made, {} event(s) remaining",
            state.history().len(),
            state.events_remaining()
        );
        if let Some(next) = state.next_event_at() {
            println!("Next event at t={}s", next);
        }
    }
}
