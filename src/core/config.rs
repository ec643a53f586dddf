//! Engine configuration with documented constants
//!
//! Scoring and drift tunables live here so that scenario authors and tests
//! can change pacing without touching the engine.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::error::{Result, SimError};
use crate::core::types::Tick;
use crate::vitals::VitalChannel;

/// Maximum random perturbation per tick for each vital channel
///
/// Drift is uniform in `[-magnitude, +magnitude]` and compounds tick over
/// tick. A magnitude of zero disables drift for that channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriftConfig {
    pub heart_rate: f32,
    pub blood_pressure_systolic: f32,
    pub blood_pressure_diastolic: f32,
    pub temperature: f32,
    pub respiratory_rate: f32,
    pub oxygen_saturation: f32,
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            heart_rate: 2.0,
            blood_pressure_systolic: 3.0,
            blood_pressure_diastolic: 2.0,
            temperature: 0.1,
            respiratory_rate: 1.0,
            oxygen_saturation: 1.0,
        }
    }
}

impl DriftConfig {
    /// Drift disabled on every channel
    pub fn none() -> Self {
        Self {
            heart_rate: 0.0,
            blood_pressure_systolic: 0.0,
            blood_pressure_diastolic: 0.0,
            temperature: 0.0,
            respiratory_rate: 0.0,
            oxygen_saturation: 0.0,
        }
    }

    pub fn magnitude(&self, channel: VitalChannel) -> f32 {
        match channel {
            VitalChannel::HeartRate => self.heart_rate,
            VitalChannel::BloodPressureSystolic => self.blood_pressure_systolic,
            VitalChannel::BloodPressureDiastolic => self.blood_pressure_diastolic,
            VitalChannel::Temperature => self.temperature,
            VitalChannel::RespiratoryRate => self.respiratory_rate,
            VitalChannel::OxygenSaturation => self.oxygen_saturation,
        }
    }
}

/// Configuration for a simulation session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Score every session starts with
    pub baseline_score: u32,

    /// Points removed for an incorrect (or lapsed) decision
    ///
    /// Applied as a negative delta; the session score never drops below 0.
    pub incorrect_penalty: u32,

    /// Seconds the session keeps ticking after the last event is resolved
    ///
    /// At 0 the next tick request after the final decision completes the
    /// session without advancing time.
    pub wrap_up_seconds: Tick,

    /// Seed for vitals drift. `None` seeds from entropy.
    pub seed: Option<u64>,

    pub drift: DriftConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            baseline_score: 100,
            incorrect_penalty: 10,
            wrap_up_seconds: 0,
            seed: None,
            drift: DriftConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deterministic config with drift disabled
    pub fn without_drift() -> Self {
        Self {
            drift: DriftConfig::none(),
            seed: Some(0),
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.incorrect_penalty > self.baseline_score {
            return Err(SimError::InvalidConfig(format!(
                "incorrect_penalty ({}) exceeds baseline_score ({})",
                self.incorrect_penalty, self.baseline_score
            )));
        }

        for channel in VitalChannel::ALL {
            let magnitude = self.drift.magnitude(channel);
            if !magnitude.is_finite() || magnitude < 0.0 {
                return Err(SimError::InvalidConfig(format!(
                    "drift magnitude for {} must be a non-negative number, got {}",
                    channel, magnitude
                )));
            }
            let range = channel.range();
            if magnitude > range.hard_max - range.hard_min {
                return Err(SimError::InvalidConfig(format!(
                    "drift magnitude for {} ({}) is wider than its hard range",
                    channel, magnitude
                )));
            }
        }

        Ok(())
    }

    /// Load configuration from a TOML file
    pub fn load_from_toml(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_toml(&content)
    }

    /// Parse configuration from a TOML string; missing keys keep their defaults
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }
}
