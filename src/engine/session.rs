//! Session controller - the phase machine that owns session state
//!
//! Tick pipeline: clock -> vitals drift -> due events. A due event pauses the
//! clock and moves the session to `AwaitingDecision`; the decision resolves
//! the event, applies score and impact, and resumes the clock.
//!
//! Time only moves when the host calls `advance`. There is no internal timer.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::VecDeque;

use crate::core::config::EngineConfig;
use crate::core::error::{Result, SimError};
use crate::core::types::{EventId, Phase, SessionId, Tick};
use crate::engine::clock::SimulationClock;
use crate::engine::history::{DecisionRecord, EventHistory};
use crate::engine::observer::SessionObserver;
use crate::engine::resolver::DecisionResolver;
use crate::engine::result::{CompletionReason, PendingDecision, SessionResult, SessionSnapshot};
use crate::engine::scheduler::EventScheduler;
use crate::scenario::{ClinicalEvent, ScenarioDefinition};
use crate::vitals::{VitalChannel, VitalSigns, VitalsModel};

/// Mutable state of one session, owned by the controller
#[derive(Debug, Clone)]
pub struct SessionState {
    id: SessionId,
    scenario: ScenarioDefinition,
    time: Tick,
    vitals: VitalSigns,
    score: u32,
    history: EventHistory,
    scheduler: EventScheduler,
    /// Events that came due and are not yet resolved. Only the front one is
    /// awaiting a decision.
    pending: VecDeque<ClinicalEvent>,
    last_resolved_at: Option<Tick>,
}

impl SessionState {
    fn new(scenario: ScenarioDefinition, baseline_score: u32) -> Self {
        Self {
            id: SessionId::new(),
            time: 0,
            vitals: scenario.initial_vitals,
            score: baseline_score,
            history: EventHistory::new(),
            scheduler: EventScheduler::new(&scenario.events),
            pending: VecDeque::new(),
            last_resolved_at: None,
            scenario,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn scenario(&self) -> &ScenarioDefinition {
        &self.scenario
    }

    pub fn time(&self) -> Tick {
        self.time
    }

    pub fn vitals(&self) -> &VitalSigns {
        &self.vitals
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn history(&self) -> &EventHistory {
        &self.history
    }

    pub fn pending_event(&self) -> Option<&ClinicalEvent> {
        self.pending.front()
    }

    pub fn events_remaining(&self) -> usize {
        self.scheduler.remaining() + self.pending.len()
    }

    pub fn next_event_at(&self) -> Option<Tick> {
        self.scheduler.next_due_at()
    }
}

/// What happened during one `advance` call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub ticks: u64,
    pub fired: Vec<EventId>,
    pub completed: Option<CompletionReason>,
}

pub struct SessionController {
    config: EngineConfig,
    vitals_model: VitalsModel,
    resolver: DecisionResolver,
    clock: SimulationClock,
    rng: ChaCha8Rng,
    phase: Phase,
    state: Option<SessionState>,
    result: Option<SessionResult>,
    observers: Vec<Box<dyn SessionObserver>>,
}

impl SessionController {
    /// Create a controller; seeds drift from `config.seed` or from entropy
    pub fn new(config: EngineConfig) -> Result<Self> {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self::with_rng(config, rng)
    }

    /// Create a controller with an explicit random source
    pub fn with_rng(config: EngineConfig, rng: ChaCha8Rng) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            vitals_model: VitalsModel::new(config.drift.clone()),
            resolver: DecisionResolver::new(config.incorrect_penalty),
            config,
            clock: SimulationClock::new(),
            rng,
            phase: Phase::Idle,
            state: None,
            result: None,
            observers: Vec::new(),
        })
    }

    pub fn add_observer(&mut self, observer: Box<dyn SessionObserver>) {
        self.observers.push(observer);
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    pub fn state(&self) -> Option<&SessionState> {
        self.state.as_ref()
    }

    /// The result of the last completed session
    pub fn result(&self) -> Option<&SessionResult> {
        self.result.as_ref()
    }

    pub fn pending_decision(&self) -> Option<PendingDecision> {
        self.state
            .as_ref()
            .and_then(|s| s.pending.front())
            .map(PendingDecision::from)
    }

    /// Read-only view for render surfaces; `None` outside an active session
    pub fn snapshot(&self) -> Option<SessionSnapshot> {
        let state = self.state.as_ref()?;
        Some(SessionSnapshot {
            session_id: state.id,
            scenario_id: state.scenario.id.clone(),
            time: state.time,
            vitals: state.vitals,
            statuses: VitalChannel::ALL
                .iter()
                .map(|c| (*c, state.vitals.status(*c)))
                .collect(),
            score: state.score,
            phase: self.phase,
            pending: state.pending.front().map(PendingDecision::from),
            queued: state.pending.len().saturating_sub(1),
        })
    }

    /// Begin a session: Idle -> Running
    pub fn start(&mut self, scenario: ScenarioDefinition) -> Result<()> {
        if self.phase != Phase::Idle {
            tracing::warn!("Rejected start while {}", self.phase);
            return Err(SimError::phase("start a session", self.phase));
        }
        scenario.validate()?;

        let state = SessionState::new(scenario, self.config.baseline_score);
        tracing::info!(
            "Session {} started: '{}' with {} events",
            state.id,
            state.scenario.id,
            state.scenario.events.len()
        );
        self.state = Some(state);
        self.result = None;
        self.clock.reset();
        self.clock.start();
        self.phase = Phase::Running;

        // Events scheduled at t=0 are due before the first tick
        self.collect_due_events()?;
        self.notify_snapshot();
        Ok(())
    }

    /// Advance simulated time by up to `seconds` ticks
    ///
    /// Stops early when an event comes due or the session completes. Calling
    /// this while paused or awaiting a decision is a no-op.
    pub fn advance(&mut self, seconds: u64) -> Result<TickReport> {
        match self.phase {
            Phase::Idle | Phase::Completed => {
                return Err(SimError::phase("advance the clock", self.phase));
            }
            Phase::Paused | Phase::AwaitingDecision => return Ok(TickReport::default()),
            Phase::Running => {}
        }

        let mut report = TickReport::default();
        for _ in 0..seconds {
            if let Some(reason) = self.completion_due() {
                self.finish(reason)?;
                report.completed = Some(reason);
                return Ok(report);
            }
            if !self.clock.tick() {
                break;
            }
            report.ticks += 1;
            self.run_tick(&mut report)?;
            if self.phase != Phase::Running {
                break;
            }
        }

        if self.phase == Phase::Running {
            if let Some(reason) = self.completion_due() {
                self.finish(reason)?;
                report.completed = Some(reason);
            }
        }
        Ok(report)
    }

    /// Advance by exactly one tick
    pub fn tick(&mut self) -> Result<TickReport> {
        self.advance(1)
    }

    /// Running <-> Paused. Not available while a decision is pending.
    pub fn toggle_pause(&mut self) -> Result<Phase> {
        match self.phase {
            Phase::Running => {
                self.clock.pause();
                self.phase = Phase::Paused;
            }
            Phase::Paused => {
                self.clock.resume();
                self.phase = Phase::Running;
            }
            other => {
                tracing::warn!("Rejected pause toggle while {}", other);
                return Err(SimError::phase("toggle pause", other));
            }
        }
        tracing::debug!("Session {}", self.phase);
        self.notify_snapshot();
        Ok(self.phase)
    }

    /// Resolve the pending event with the learner's choice
    ///
    /// `None` records a lapsed decision window.
    pub fn submit_decision(&mut self, option: Option<usize>) -> Result<DecisionRecord> {
        if self.phase != Phase::AwaitingDecision {
            tracing::warn!("Rejected decision while {}", self.phase);
            return Err(SimError::phase("submit a decision", self.phase));
        }
        let phase = self.phase;
        let Some(state) = self.state.as_mut() else {
            return Err(SimError::phase("submit a decision", phase));
        };
        let Some(event) = state.pending.pop_front() else {
            return Err(SimError::phase("submit a decision", phase));
        };

        let resolution = self.resolver.resolve(&event, option);
        let score = (i64::from(state.score) + i64::from(resolution.score_delta)).max(0);
        state.score = u32::try_from(score).unwrap_or(u32::MAX);
        state.vitals = VitalsModel::apply_impact(&state.vitals, &resolution.impact);

        let record = DecisionRecord {
            event_id: event.id.clone(),
            resolved_at: state.time,
            chosen_option: option,
            correct: resolution.correct,
            score_delta: resolution.score_delta,
            explanation: event.explanation.clone(),
        };
        state.history.append(record.clone());
        state.last_resolved_at = Some(state.time);

        tracing::info!(
            "Decision on '{}' at t={}: {:?} ({}) score={}",
            event.id,
            state.time,
            option,
            if resolution.correct { "correct" } else { "incorrect" },
            state.score
        );

        // Events that came due together are resolved one after another
        // before the clock runs again
        if state.pending.is_empty() {
            self.phase = Phase::Running;
            self.clock.resume();
        }
        self.notify_snapshot();
        Ok(record)
    }

    /// Like `submit_decision`, but rejects a choice aimed at an event that is
    /// no longer the pending one
    pub fn submit_decision_for(
        &mut self,
        event_id: &EventId,
        option: Option<usize>,
    ) -> Result<DecisionRecord> {
        if self.phase != Phase::AwaitingDecision {
            tracing::warn!("Rejected decision for '{}' while {}", event_id, self.phase);
            return Err(SimError::phase("submit a decision", self.phase));
        }
        let pending = self
            .state
            .as_ref()
            .and_then(|s| s.pending.front())
            .map(|e| e.id.clone());
        if pending.as_ref() != Some(event_id) {
            tracing::warn!("Stale decision for '{}' (pending {:?})", event_id, pending);
            return Err(SimError::StaleDecision {
                submitted: event_id.clone(),
                pending,
            });
        }
        self.submit_decision(option)
    }

    /// End the session early and produce its result
    pub fn complete(&mut self) -> Result<SessionResult> {
        if !self.phase.is_active() {
            tracing::warn!("Rejected completion while {}", self.phase);
            return Err(SimError::phase("complete the session", self.phase));
        }
        self.finish(CompletionReason::Manual)
    }

    /// Discard the session and return to Idle
    pub fn reset(&mut self) {
        self.clock.reset();
        self.state = None;
        self.result = None;
        self.phase = Phase::Idle;
        tracing::info!("Session controller reset");
    }

    fn run_tick(&mut self, report: &mut TickReport) -> Result<()> {
        let phase = self.phase;
        let Some(state) = self.state.as_mut() else {
            return Err(SimError::phase("advance the clock", phase));
        };
        state.time += 1;
        state.vitals = self.vitals_model.drift(&state.vitals, &mut self.rng);
        tracing::trace!("t={} vitals={:?}", state.time, state.vitals);

        let fired = self.collect_due_events()?;
        report.fired.extend(fired);
        self.notify_snapshot();
        Ok(())
    }

    /// Move due events into the pending queue; pauses the clock if any
    fn collect_due_events(&mut self) -> Result<Vec<EventId>> {
        let phase = self.phase;
        let Some(state) = self.state.as_mut() else {
            return Err(SimError::phase("check due events", phase));
        };

        // Checked before firing so a rejected event stays in the schedule
        for event in state.scheduler.peek_due(state.time) {
            event.validate()?;
        }
        let due = state.scheduler.due_events(state.time);
        if due.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<EventId> = due.iter().map(|e| e.id.clone()).collect();
        state.pending.extend(due);
        self.clock.pause();
        self.phase = Phase::AwaitingDecision;
        tracing::debug!("Awaiting decision on '{}' at t={}", ids[0], state.time);
        Ok(ids)
    }

    fn completion_due(&self) -> Option<CompletionReason> {
        let state = self.state.as_ref()?;
        if !state.pending.is_empty() {
            return None;
        }

        if !state.scheduler.is_empty() && state.scheduler.all_fired() {
            if let Some(at) = state.last_resolved_at {
                if state.time >= at.saturating_add(self.config.wrap_up_seconds) {
                    return Some(CompletionReason::AllEventsResolved);
                }
            }
        }

        match state.scenario.duration_seconds {
            Some(duration) if state.time >= duration => Some(CompletionReason::DurationReached),
            _ => None,
        }
    }

    fn finish(&mut self, reason: CompletionReason) -> Result<SessionResult> {
        self.clock.stop();
        let previous = self.phase;
        self.phase = Phase::Completed;
        self.notify_snapshot();

        let Some(state) = self.state.take() else {
            return Err(SimError::phase("complete the session", previous));
        };
        let result = SessionResult {
            session_id: state.id,
            scenario_id: state.scenario.id,
            final_score: state.score,
            decision_history: state.history.into_records(),
            final_vitals: state.vitals,
            total_time_elapsed: state.time,
            reason,
        };
        tracing::info!("Session {} completed ({:?}): score {}", result.session_id, reason, result.final_score);

        for observer in self.observers.iter_mut() {
            observer.on_complete(&result);
        }
        self.result = Some(result.clone());
        Ok(result)
    }

    fn notify_snapshot(&mut self) {
        if self.observers.is_empty() {
            return;
        }
        if let Some(snapshot) = self.snapshot() {
            for observer in self.observers.iter_mut() {
                observer.on_snapshot(&snapshot);
            }
        }
    }
}
