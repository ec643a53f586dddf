//! Session observers
//!
//! Render surfaces and result sinks subscribe to a controller through this
//! trait. They only ever see copies of session state.

use std::sync::{Arc, Mutex};

use crate::engine::result::{SessionResult, SessionSnapshot};

pub trait SessionObserver: Send {
    /// Called after every tick and every resolved decision
    fn on_snapshot(&mut self, snapshot: &SessionSnapshot);

    /// Called once when the session completes
    fn on_complete(&mut self, _result: &SessionResult) {}
}

/// Logs snapshots and results through `tracing`
#[derive(Debug, Default)]
pub struct TracingObserver;

impl SessionObserver for TracingObserver {
    fn on_snapshot(&mut self, snapshot: &SessionSnapshot) {
        tracing::debug!(
            t = snapshot.time,
            phase = %snapshot.phase,
            score = snapshot.score,
            hr = snapshot.vitals.heart_rate,
            spo2 = snapshot.vitals.oxygen_saturation,
            pending = ?snapshot.pending.as_ref().map(|p| p.event_id.as_str()),
            "session snapshot"
        );
    }

    fn on_complete(&mut self, result: &SessionResult) {
        tracing::info!(
            scenario = %result.scenario_id,
            score = result.final_score,
            elapsed = result.total_time_elapsed,
            "session result ready"
        );
    }
}

/// Collects everything it observes into shared buffers
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    pub snapshots: Arc<Mutex<Vec<SessionSnapshot>>>,
    pub results: Arc<Mutex<Vec<SessionResult>>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot_count(&self) -> usize {
        self.snapshots.lock().map(|s| s.len()).unwrap_or(0)
    }

    pub fn last_snapshot(&self) -> Option<SessionSnapshot> {
        self.snapshots.lock().ok().and_then(|s| s.last().cloned())
    }

    pub fn results(&self) -> Vec<SessionResult> {
        self.results.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

impl SessionObserver for RecordingObserver {
    fn on_snapshot(&mut self, snapshot: &SessionSnapshot) {
        if let Ok(mut snapshots) = self.snapshots.lock() {
            snapshots.push(snapshot.clone());
        }
    }

    fn on_complete(&mut self, result: &SessionResult) {
        if let Ok(mut results) = self.results.lock() {
            results.push(result.clone());
        }
    }
}
