//! Session snapshots and the final result payload

use serde::{Deserialize, Serialize};

use crate::core::types::{EventId, Phase, SessionId, Tick};
use crate::engine::history::DecisionRecord;
use crate::scenario::{ClinicalEvent, EventKind};
use crate::vitals::{VitalChannel, VitalSigns, VitalStatus};

/// Why a session ended
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompletionReason {
    /// `complete()` called by the learner or host
    Manual,
    /// The last event fired and was resolved
    AllEventsResolved,
    /// Simulation time reached the scenario's duration
    DurationReached,
}

/// The pending decision as shown to the learner (no answer key)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PendingDecision {
    pub event_id: EventId,
    pub timestamp: Tick,
    pub kind: EventKind,
    pub prompt: String,
    pub options: Vec<String>,
}

impl From<&ClinicalEvent> for PendingDecision {
    fn from(event: &ClinicalEvent) -> Self {
        Self {
            event_id: event.id.clone(),
            timestamp: event.timestamp,
            kind: event.kind,
            prompt: event.prompt.clone(),
            options: event.options.clone(),
        }
    }
}

/// Read-only view of the session for render surfaces
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id: SessionId,
    pub scenario_id: String,
    pub time: Tick,
    pub vitals: VitalSigns,
    pub statuses: Vec<(VitalChannel, VitalStatus)>,
    pub score: u32,
    pub phase: Phase,
    pub pending: Option<PendingDecision>,
    /// Events that came due together with the pending one, still to resolve
    pub queued: usize,
}

impl SessionSnapshot {
    pub fn status(&self, channel: VitalChannel) -> Option<VitalStatus> {
        self.statuses
            .iter()
            .find(|(c, _)| *c == channel)
            .map(|(_, s)| *s)
    }
}

/// Immutable payload produced at completion
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionResult {
    pub session_id: SessionId,
    pub scenario_id: String,
    pub final_score: u32,
    pub decision_history: Vec<DecisionRecord>,
    pub final_vitals: VitalSigns,
    pub total_time_elapsed: Tick,
    pub reason: CompletionReason,
}

impl SessionResult {
    pub fn correct_count(&self) -> usize {
        self.decision_history.iter().filter(|r| r.correct).count()
    }

    /// Fraction of decisions answered correctly; 1.0 with no decisions
    pub fn accuracy(&self) -> f32 {
        if self.decision_history.is_empty() {
            return 1.0;
        }
        self.correct_count() as f32 / self.decision_history.len() as f32
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(&self).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn summary(&self) -> String {
        format!(
            "Scenario '{}' finished after {}s ({:?})\nScore {} | {}/{} decisions correct | HR {:.0} BP {:.0}/{:.0} SpO2 {:.0}%",
            self.scenario_id,
            self.total_time_elapsed,
            self.reason,
            self.final_score,
            self.correct_count(),
            self.decision_history.len(),
            self.final_vitals.heart_rate,
            self.final_vitals.blood_pressure_systolic,
            self.final_vitals.blood_pressure_diastolic,
            self.final_vitals.oxygen_saturation,
        )
    }
}
