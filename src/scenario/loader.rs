//! Scenario loading from TOML and JSON
//!
//! Files are parsed into an authoring representation with signed numbers
//! first, so a negative timestamp or option index surfaces as
//! `OutOfRangeInput` instead of an opaque parse failure.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::core::error::{Result, SimError};
use crate::core::types::{EventId, Tick};
use crate::scenario::definition::{ClinicalEvent, EventKind, ScenarioDefinition};
use crate::vitals::{VitalSigns, VitalsDelta};

#[derive(Debug, Deserialize)]
struct RawScenario {
    id: String,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    difficulty: Option<String>,
    initial_vitals: VitalSigns,
    #[serde(default)]
    events: Vec<RawEvent>,
    #[serde(default)]
    objectives: Vec<String>,
    #[serde(default)]
    duration_seconds: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    id: String,
    timestamp: i64,
    #[serde(default)]
    kind: EventKind,
    prompt: String,
    #[serde(default)]
    options: Vec<String>,
    #[serde(default)]
    correct_option: Option<i64>,
    #[serde(default)]
    impact: Option<VitalsDelta>,
    #[serde(default)]
    explanation: Option<String>,
}

fn non_negative(value: i64, what: impl FnOnce() -> String) -> Result<u64> {
    u64::try_from(value)
        .map_err(|_| SimError::OutOfRangeInput(format!("{} must be non-negative, got {}", what(), value)))
}

impl RawEvent {
    fn into_event(self) -> Result<ClinicalEvent> {
        let id = self.id;
        let timestamp: Tick = non_negative(self.timestamp, || format!("event '{}' timestamp", id))?;
        let correct_option = match self.correct_option {
            Some(idx) => {
                let idx = non_negative(idx, || format!("event '{}' correct_option", id))?;
                Some(usize::try_from(idx).map_err(|_| {
                    SimError::OutOfRangeInput(format!("event '{}' correct_option {} is too large", id, idx))
                })?)
            }
            None => None,
        };

        Ok(ClinicalEvent {
            id: EventId(id),
            timestamp,
            kind: self.kind,
            prompt: self.prompt,
            options: self.options,
            correct_option,
            impact: self.impact,
            explanation: self.explanation,
        })
    }
}

impl RawScenario {
    fn into_definition(self) -> Result<ScenarioDefinition> {
        let duration_seconds = match self.duration_seconds {
            Some(d) => Some(non_negative(d, || "duration_seconds".to_string())?),
            None => None,
        };
        let events = self
            .events
            .into_iter()
            .map(RawEvent::into_event)
            .collect::<Result<Vec<_>>>()?;

        let scenario = ScenarioDefinition {
            id: self.id,
            title: self.title,
            description: self.description,
            difficulty: self.difficulty,
            initial_vitals: self.initial_vitals,
            events,
            objectives: self.objectives,
            duration_seconds,
        };
        scenario.validate()?;
        Ok(scenario)
    }
}

impl ScenarioDefinition {
    /// Load a scenario from a TOML file
    pub fn load_from_toml(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_toml(&content)
    }

    /// Parse a scenario from a TOML string
    pub fn parse_toml(content: &str) -> Result<Self> {
        let raw: RawScenario = toml::from_str(content)?;
        raw.into_definition()
    }

    /// Parse a scenario from JSON
    pub fn from_json(content: &str) -> Result<Self> {
        let raw: RawScenario = serde_json::from_str(content)?;
        raw.into_definition()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Resolve a scenario by built-in id, or by path to a `.toml`/`.json` file
pub fn resolve_scenario(name_or_path: &str) -> Result<ScenarioDefinition> {
    if let Some(scenario) = crate::scenario::library::builtin(name_or_path) {
        return Ok(scenario);
    }

    let path = PathBuf::from(name_or_path);
    if !path.exists() {
        return Err(SimError::ScenarioNotFound(name_or_path.to_string()));
    }

    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => ScenarioDefinition::from_json(&std::fs::read_to_string(&path)?),
        _ => ScenarioDefinition::load_from_toml(&path),
    }
}
