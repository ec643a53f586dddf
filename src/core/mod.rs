pub mod config;
pub mod error;
pub mod types;

pub use config::{DriftConfig, EngineConfig};
pub use error::{Result, SimError};
pub use types::{EventId, Phase, SessionId, Tick};
