//! Real-time driver
//!
//! Runs a started session against the wall clock: one `advance(1)` per tick
//! interval, with learner commands arriving on a channel in between. Ticks and
//! commands are handled one at a time on a single task, so tick processing
//! never overlaps itself or a decision.

use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::core::error::{Result, SimError};
use crate::core::types::{EventId, Phase};
use crate::engine::history::DecisionRecord;
use crate::engine::result::SessionResult;
use crate::engine::session::SessionController;

/// Requests a render surface can send to a running session
#[derive(Debug)]
pub enum SessionCommand {
    Submit {
        /// When set, the decision is rejected if this is not the pending event
        event_id: Option<EventId>,
        option: Option<usize>,
        reply: Option<oneshot::Sender<Result<DecisionRecord>>>,
    },
    TogglePause {
        reply: Option<oneshot::Sender<Result<Phase>>>,
    },
    Complete {
        reply: Option<oneshot::Sender<Result<SessionResult>>>,
    },
}

#[derive(Debug, Clone)]
pub struct RealtimeOptions {
    pub tick_interval: Duration,
    /// Submit a lapsed decision after waiting this long. Off by default.
    pub decision_timeout: Option<Duration>,
}

impl Default for RealtimeOptions {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(1),
            decision_timeout: None,
        }
    }
}

/// Drive `controller` until its session completes
///
/// The session must already be started. Command errors go back to the
/// sender through its reply channel; only engine failures during a tick end
/// the loop with an error.
pub async fn run(
    controller: &mut SessionController,
    mut commands: mpsc::Receiver<SessionCommand>,
    options: RealtimeOptions,
) -> Result<SessionResult> {
    if !controller.phase().is_active() {
        return Err(SimError::phase("run in real time", controller.phase()));
    }

    let mut interval = time::interval_at(
        Instant::now() + options.tick_interval,
        options.tick_interval,
    );
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut commands_open = true;
    // The event the decision window belongs to, and when it opened
    let mut window: Option<(EventId, Instant)> = None;

    loop {
        if controller.phase() == Phase::Completed {
            return controller
                .result()
                .cloned()
                .ok_or_else(|| SimError::DriverStopped("completed without a result".into()));
        }

        let pending_id = match controller.phase() {
            Phase::AwaitingDecision => controller
                .state()
                .and_then(|s| s.pending_event())
                .map(|e| e.id.clone()),
            _ => None,
        };
        window = match (window.take(), pending_id) {
            (Some((id, opened)), Some(pending)) if id == pending => Some((id, opened)),
            (_, Some(pending)) => Some((pending, Instant::now())),
            (_, None) => None,
        };

        if !commands_open {
            let stuck = match controller.phase() {
                Phase::Paused => true,
                Phase::AwaitingDecision => options.decision_timeout.is_none(),
                _ => false,
            };
            if stuck {
                return Err(SimError::DriverStopped(format!(
                    "command channel closed while session is {}",
                    controller.phase()
                )));
            }
        }

        let deadline = match (&window, options.decision_timeout) {
            (Some((_, opened)), Some(timeout)) => Some(*opened + timeout),
            _ => None,
        };

        tokio::select! {
            _ = interval.tick() => {
                if controller.phase() == Phase::Running {
                    controller.advance(1)?;
                }
            }
            command = commands.recv(), if commands_open => {
                match command {
                    Some(command) => handle_command(controller, command),
                    None => {
                        tracing::debug!("Command channel closed");
                        commands_open = false;
                    }
                }
            }
            _ = time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                tracing::warn!("Decision window lapsed; submitting no answer");
                controller.submit_decision(None)?;
            }
        }
    }
}

fn handle_command(controller: &mut SessionController, command: SessionCommand) {
    match command {
        SessionCommand::Submit {
            event_id,
            option,
            reply,
        } => {
            let outcome = match event_id {
                Some(id) => controller.submit_decision_for(&id, option),
                None => controller.submit_decision(option),
            };
            send_reply(reply, outcome);
        }
        SessionCommand::TogglePause { reply } => {
            send_reply(reply, controller.toggle_pause());
        }
        SessionCommand::Complete { reply } => {
            send_reply(reply, controller.complete());
        }
    }
}

fn send_reply<T>(reply: Option<oneshot::Sender<Result<T>>>, outcome: Result<T>) {
    match reply {
        Some(reply) => {
            // The requester may have given up waiting
            let _ = reply.send(outcome);
        }
        None => {
            if let Err(e) = outcome {
                tracing::warn!("Command failed with no reply channel: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::EngineConfig;
    use crate::engine::result::CompletionReason;
    use crate::scenario::{ClinicalEvent, ScenarioDefinition};
    use crate::vitals::VitalSigns;

    fn started(scenario: ScenarioDefinition) -> SessionController {
        let mut c = SessionController::new(EngineConfig::without_drift()).unwrap();
        c.start(scenario).unwrap();
        c
    }

    #[tokio::test(start_paused = true)]
    async fn test_runs_until_duration() {
        let mut c = started(
            ScenarioDefinition::new("timed", "Timed", VitalSigns::default()).with_duration(3),
        );
        let (_tx, rx) = mpsc::channel(8);

        let result = run(&mut c, rx, RealtimeOptions::default()).await.unwrap();
        assert_eq!(result.total_time_elapsed, 3);
        assert_eq!(result.reason, CompletionReason::DurationReached);
    }

    #[tokio::test(start_paused = true)]
    async fn test_decision_via_channel() {
        let scenario = ScenarioDefinition::new("one", "One", VitalSigns::default())
            .with_event(ClinicalEvent::decision("e", 2, "?", &["A", "B"], 1));
        let mut c = started(scenario);
        let (tx, rx) = mpsc::channel(8);

        tokio::spawn(async move {
            time::sleep(Duration::from_millis(2500)).await;
            let (reply_tx, reply_rx) = oneshot::channel();
            tx.send(SessionCommand::Submit {
                event_id: Some(EventId::from("e")),
                option: Some(1),
                reply: Some(reply_tx),
            })
            .await
            .unwrap();
            let record = reply_rx.await.unwrap().unwrap();
            assert!(record.correct);
        });

        let result = run(&mut c, rx, RealtimeOptions::default()).await.unwrap();
        assert_eq!(result.final_score, 100);
        assert_eq!(result.decision_history.len(), 1);
        assert_eq!(result.total_time_elapsed, 2);
        assert_eq!(result.reason, CompletionReason::AllEventsResolved);
    }

    #[tokio::test(start_paused = true)]
    async fn test_decision_timeout_submits_lapse() {
        let scenario = ScenarioDefinition::new("one", "One", VitalSigns::default())
            .with_event(ClinicalEvent::decision("e", 1, "?", &["A", "B"], 0));
        let mut c = started(scenario);
        let (_tx, rx) = mpsc::channel(8);
        let options = RealtimeOptions {
            decision_timeout: Some(Duration::from_secs(10)),
            ..RealtimeOptions::default()
        };

        let result = run(&mut c, rx, options).await.unwrap();
        assert_eq!(result.final_score, 90);
        assert_eq!(result.decision_history[0].chosen_option, None);
        assert!(!result.decision_history[0].correct);
    }

    #[tokio::test(start_paused = true)]
    async fn test_queued_event_gets_its_own_window() {
        let scenario = ScenarioDefinition::new("pair", "Pair", VitalSigns::default())
            .with_event(ClinicalEvent::decision("a", 1, "?", &["A", "B"], 0))
            .with_event(ClinicalEvent::decision("b", 1, "?", &["A", "B"], 0));
        let mut c = started(scenario);
        let (tx, rx) = mpsc::channel(8);
        let options = RealtimeOptions {
            decision_timeout: Some(Duration::from_secs(10)),
            ..RealtimeOptions::default()
        };

        tokio::spawn(async move {
            for (id, wait) in [("a", 10), ("b", 5)] {
                time::sleep(Duration::from_secs(wait)).await;
                let (reply_tx, reply_rx) = oneshot::channel();
                tx.send(SessionCommand::Submit {
                    event_id: Some(EventId::from(id)),
                    option: Some(0),
                    reply: Some(reply_tx),
                })
                .await
                .unwrap();
                reply_rx.await.unwrap().unwrap();
            }
        });

        // "b" became pending at 10s, so its window runs until 20s
        let result = run(&mut c, rx, options).await.unwrap();
        let chosen: Vec<(&str, Option<usize>)> = result
            .decision_history
            .iter()
            .map(|r| (r.event_id.as_str(), r.chosen_option))
            .collect();
        assert_eq!(chosen, vec![("a", Some(0)), ("b", Some(0))]);
        assert_eq!(result.final_score, 100);
    }

    #[tokio::test(start_paused = true)]
    async fn test_queued_event_lapses_after_its_own_window() {
        let scenario = ScenarioDefinition::new("pair", "Pair", VitalSigns::default())
            .with_event(ClinicalEvent::decision("a", 1, "?", &["A", "B"], 0))
            .with_event(ClinicalEvent::decision("b", 1, "?", &["A", "B"], 0));
        let mut c = started(scenario);
        let (tx, rx) = mpsc::channel(8);
        let options = RealtimeOptions {
            decision_timeout: Some(Duration::from_secs(10)),
            ..RealtimeOptions::default()
        };

        let answered_at = tokio::spawn(async move {
            time::sleep(Duration::from_secs(5)).await;
            let (reply_tx, reply_rx) = oneshot::channel();
            tx.send(SessionCommand::Submit {
                event_id: None,
                option: Some(0),
                reply: Some(reply_tx),
            })
            .await
            .unwrap();
            reply_rx.await.unwrap().unwrap();
            let at = Instant::now();
            // Keep the channel open so only the timeout can resolve "b"
            time::sleep(Duration::from_secs(60)).await;
            drop(tx);
            at
        });

        let result = run(&mut c, rx, options).await.unwrap();
        let lapsed_at = Instant::now();
        let answered_at = answered_at.await.unwrap();

        assert_eq!(result.decision_history[1].chosen_option, None);
        // "b" lapses a full window after "a" was answered
        assert!(lapsed_at.duration_since(answered_at) >= Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_channel_while_awaiting_is_error() {
        let scenario = ScenarioDefinition::new("one", "One", VitalSigns::default())
            .with_event(ClinicalEvent::decision("e", 1, "?", &["A", "B"], 0));
        let mut c = started(scenario);
        let (tx, rx) = mpsc::channel(8);
        drop(tx);

        let result = run(&mut c, rx, RealtimeOptions::default()).await;
        assert!(matches!(result, Err(SimError::DriverStopped(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_complete_command() {
        let mut c = started(ScenarioDefinition::new(
            "open",
            "Open ended",
            VitalSigns::default(),
        ));
        let (tx, rx) = mpsc::channel(8);

        tokio::spawn(async move {
            time::sleep(Duration::from_millis(4500)).await;
            tx.send(SessionCommand::Complete { reply: None }).await.unwrap();
        });

        let result = run(&mut c, rx, RealtimeOptions::default()).await.unwrap();
        assert_eq!(result.reason, CompletionReason::Manual);
        assert_eq!(result.total_time_elapsed, 4);
    }

    #[tokio::test]
    async fn test_requires_started_session() {
        let mut c = SessionController::new(EngineConfig::without_drift()).unwrap();
        let (_tx, rx) = mpsc::channel(1);
        assert!(run(&mut c, rx, RealtimeOptions::default()).await.is_err());
    }
}
