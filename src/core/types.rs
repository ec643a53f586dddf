//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Simulation time in whole seconds since session start
pub type Tick = u64;

/// Unique identifier for a simulation session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a clinical event, unique within its scenario
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub String);

impl EventId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EventId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Session phases
///
/// `Paused` is only ever entered by the user. The engine pauses the clock on
/// its own when an event comes due, but the session is then `AwaitingDecision`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Phase {
    #[default]
    Idle,
    Running,
    Paused,
    AwaitingDecision,
    Completed,
}

impl Phase {
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            Phase::Running | Phase::Paused | Phase::AwaitingDecision
        )
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::Running => "running",
            Phase::Paused => "paused",
            Phase::AwaitingDecision => "awaiting-decision",
            Phase::Completed => "completed",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_ids_unique() {
        assert_ne!(SessionId::new(), SessionId::new());
    }

    #[test]
    fn test_event_id_serializes_as_plain_string() {
        let id = EventId::from("ecg-review");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"ecg-review\"");
    }

    #[test]
    fn test_active_phases() {
        assert!(!Phase::Idle.is_active());
        assert!(Phase::Running.is_active());
        assert!(Phase::Paused.is_active());
        assert!(Phase::AwaitingDecision.is_active());
        assert!(!Phase::Completed.is_active());
    }
}
