//! Clinical Sim - vital-sign scenario simulator for clinical education
//!
//! A session drifts patient vitals once per simulated second, stops at timed
//! decision points, applies the clinical consequence of each decision and
//! scores the learner.

pub mod core;
pub mod engine;
pub mod scenario;
pub mod vitals;

pub use crate::core::{EngineConfig, Phase, Result, SimError};
pub use crate::engine::{SessionController, SessionResult, SessionSnapshot};
pub use crate::scenario::{ClinicalEvent, ScenarioDefinition};
pub use crate::vitals::{VitalChannel, VitalSigns, VitalsDelta};
