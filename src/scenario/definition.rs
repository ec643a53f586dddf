//! Scenario and clinical event definitions
//!
//! A scenario is immutable input to a session. Validation happens when a
//! session starts so that authoring mistakes fail fast instead of being
//! silently clamped like runtime vitals.

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SimError};
use crate::core::types::{EventId, Tick};
use crate::vitals::{VitalChannel, VitalSigns, VitalsDelta};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    #[default]
    Decision,
    Observation,
    Intervention,
}

/// A timed decision point in a scenario
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClinicalEvent {
    pub id: EventId,
    /// Seconds from session start
    pub timestamp: Tick,
    pub kind: EventKind,
    pub prompt: String,
    pub options: Vec<String>,
    /// Index into `options`; ignored when there are no options
    pub correct_option: Option<usize>,
    /// Applied on resolution regardless of correctness
    pub impact: Option<VitalsDelta>,
    pub explanation: Option<String>,
}

impl ClinicalEvent {
    pub fn decision(
        id: impl Into<String>,
        timestamp: Tick,
        prompt: impl Into<String>,
        options: &[&str],
        correct_option: usize,
    ) -> Self {
        Self {
            id: EventId::new(id),
            timestamp,
            kind: EventKind::Decision,
            prompt: prompt.into(),
            options: options.iter().map(|o| o.to_string()).collect(),
            correct_option: Some(correct_option),
            impact: None,
            explanation: None,
        }
    }

    pub fn intervention(
        id: impl Into<String>,
        timestamp: Tick,
        prompt: impl Into<String>,
        options: &[&str],
        correct_option: usize,
    ) -> Self {
        Self {
            kind: EventKind::Intervention,
            ..Self::decision(id, timestamp, prompt, options, correct_option)
        }
    }

    /// An event with no options; it resolves as correct with no score change
    pub fn observation(id: impl Into<String>, timestamp: Tick, prompt: impl Into<String>) -> Self {
        Self {
            id: EventId::new(id),
            timestamp,
            kind: EventKind::Observation,
            prompt: prompt.into(),
            options: Vec::new(),
            correct_option: None,
            impact: None,
            explanation: None,
        }
    }

    pub fn with_impact(mut self, impact: VitalsDelta) -> Self {
        self.impact = Some(impact);
        self
    }

    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }

    pub fn has_options(&self) -> bool {
        !self.options.is_empty()
    }

    /// Check the event's own invariants
    pub fn validate(&self) -> Result<()> {
        if self.id.as_str().trim().is_empty() {
            return Err(SimError::OutOfRangeInput(format!(
                "event at t={} has an empty id",
                self.timestamp
            )));
        }

        match (self.has_options(), self.correct_option) {
            (true, Some(idx)) if idx >= self.options.len() => {
                return Err(SimError::OutOfRangeInput(format!(
                    "event '{}': correct_option {} but only {} options",
                    self.id,
                    idx,
                    self.options.len()
                )));
            }
            (true, None) => {
                return Err(SimError::OutOfRangeInput(format!(
                    "event '{}' has options but no correct_option",
                    self.id
                )));
            }
            (false, Some(idx)) => {
                return Err(SimError::OutOfRangeInput(format!(
                    "event '{}': correct_option {} references a non-existent option",
                    self.id, idx
                )));
            }
            _ => {}
        }

        if let Some(impact) = &self.impact {
            for (channel, delta) in impact.entries() {
                if !delta.is_finite() {
                    return Err(SimError::OutOfRangeInput(format!(
                        "event '{}': impact on {} is not a finite number",
                        self.id, channel
                    )));
                }
            }
        }

        Ok(())
    }
}

/// Immutable scenario input
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioDefinition {
    pub id: String,
    pub title: String,
    pub description: String,
    pub difficulty: Option<String>,
    pub initial_vitals: VitalSigns,
    /// Ordered by definition; events sharing a timestamp fire in this order
    pub events: Vec<ClinicalEvent>,
    /// Display-only
    pub objectives: Vec<String>,
    /// Auto-complete once simulation time reaches this many seconds
    pub duration_seconds: Option<Tick>,
}

impl ScenarioDefinition {
    pub fn new(id: impl Into<String>, title: impl Into<String>, initial_vitals: VitalSigns) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            difficulty: None,
            initial_vitals,
            events: Vec::new(),
            objectives: Vec::new(),
            duration_seconds: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_difficulty(mut self, difficulty: impl Into<String>) -> Self {
        self.difficulty = Some(difficulty.into());
        self
    }

    pub fn with_event(mut self, event: ClinicalEvent) -> Self {
        self.events.push(event);
        self
    }

    pub fn with_objective(mut self, objective: impl Into<String>) -> Self {
        self.objectives.push(objective.into());
        self
    }

    pub fn with_duration(mut self, seconds: Tick) -> Self {
        self.duration_seconds = Some(seconds);
        self
    }

    pub fn event(&self, id: &EventId) -> Option<&ClinicalEvent> {
        self.events.iter().find(|e| &e.id == id)
    }

    /// Timestamp of the latest scheduled event
    pub fn last_event_at(&self) -> Option<Tick> {
        self.events.iter().map(|e| e.timestamp).max()
    }

    /// Validate every authoring invariant
    pub fn validate(&self) -> Result<()> {
        for channel in VitalChannel::ALL {
            let value = self.initial_vitals.get(channel);
            if !channel.range().contains(value) {
                return Err(SimError::OutOfRangeInput(format!(
                    "scenario '{}': initial {} {} outside {}..={}",
                    self.id,
                    channel,
                    value,
                    channel.range().hard_min,
                    channel.range().hard_max
                )));
            }
        }

        let mut seen = AHashSet::new();
        for event in &self.events {
            event.validate()?;
            if !seen.insert(event.id.clone()) {
                return Err(SimError::OutOfRangeInput(format!(
                    "scenario '{}': duplicate event id '{}'",
                    self.id, event.id
                )));
            }
            if let Some(duration) = self.duration_seconds {
                if event.timestamp > duration {
                    return Err(SimError::OutOfRangeInput(format!(
                        "scenario '{}': event '{}' at t={} is after the {}s duration",
                        self.id, event.id, event.timestamp, duration
                    )));
                }
            }
        }

        Ok(())
    }
}
