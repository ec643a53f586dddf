use thiserror::Error;

use crate::core::types::{EventId, Phase};

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Cannot {operation} while session is {phase}")]
    InvalidPhaseTransition {
        operation: &'static str,
        phase: Phase,
    },

    #[error("Scenario input out of range: {0}")]
    OutOfRangeInput(String),

    #[error("Stale decision for event '{submitted}' (pending: {pending:?})")]
    StaleDecision {
        submitted: EventId,
        pending: Option<EventId>,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Scenario not found: {0}")]
    ScenarioNotFound(String),

    #[error("Real-time driver stopped: {0}")]
    DriverStopped(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

impl SimError {
    pub fn phase(operation: &'static str, phase: Phase) -> Self {
        SimError::InvalidPhaseTransition { operation, phase }
    }
}

pub type Result<T> = std::result::Result<T, SimError>;
