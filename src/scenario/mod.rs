//! Scenario definitions, loading and the built-in library

pub mod definition;
pub mod library;
pub mod loader;

pub use definition::{ClinicalEvent, EventKind, ScenarioDefinition};
pub use loader::resolve_scenario;
