//! Vital sign channels and their physiological ranges
//!
//! Every channel has a hard range that values are clamped into, and two
//! nested bands used for status classification. Anything inside the hard
//! range but outside the warning band is critical.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VitalChannel {
    HeartRate,
    BloodPressureSystolic,
    BloodPressureDiastolic,
    Temperature,
    RespiratoryRate,
    OxygenSaturation,
}

/// Status classification for a single reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum VitalStatus {
    Normal,
    Warning,
    Critical,
}

/// Hard clamp plus classification bands for one channel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelRange {
    pub hard_min: f32,
    pub hard_max: f32,
    pub normal_min: f32,
    pub normal_max: f32,
    pub warning_min: f32,
    pub warning_max: f32,
}

const HEART_RATE: ChannelRange = ChannelRange {
    hard_min: 20.0,
    hard_max: 250.0,
    normal_min: 60.0,
    normal_max: 100.0,
    warning_min: 50.0,
    warning_max: 120.0,
};

const SYSTOLIC: ChannelRange = ChannelRange {
    hard_min: 40.0,
    hard_max: 250.0,
    normal_min: 90.0,
    normal_max: 140.0,
    warning_min: 80.0,
    warning_max: 160.0,
};

const DIASTOLIC: ChannelRange = ChannelRange {
    hard_min: 20.0,
    hard_max: 150.0,
    normal_min: 60.0,
    normal_max: 90.0,
    warning_min: 50.0,
    warning_max: 100.0,
};

// Celsius
const TEMPERATURE: ChannelRange = ChannelRange {
    hard_min: 30.0,
    hard_max: 44.0,
    normal_min: 36.1,
    normal_max: 37.5,
    warning_min: 35.0,
    warning_max: 38.5,
};

const RESPIRATORY_RATE: ChannelRange = ChannelRange {
    hard_min: 0.0,
    hard_max: 60.0,
    normal_min: 12.0,
    normal_max: 20.0,
    warning_min: 8.0,
    warning_max: 30.0,
};

const OXYGEN_SATURATION: ChannelRange = ChannelRange {
    hard_min: 50.0,
    hard_max: 100.0,
    normal_min: 95.0,
    normal_max: 100.0,
    warning_min: 90.0,
    warning_max: 100.0,
};

impl VitalChannel {
    pub const ALL: [VitalChannel; 6] = [
        VitalChannel::HeartRate,
        VitalChannel::BloodPressureSystolic,
        VitalChannel::BloodPressureDiastolic,
        VitalChannel::Temperature,
        VitalChannel::RespiratoryRate,
        VitalChannel::OxygenSaturation,
    ];

    pub fn range(&self) -> ChannelRange {
        match self {
            VitalChannel::HeartRate => HEART_RATE,
            VitalChannel::BloodPressureSystolic => SYSTOLIC,
            VitalChannel::BloodPressureDiastolic => DIASTOLIC,
            VitalChannel::Temperature => TEMPERATURE,
            VitalChannel::RespiratoryRate => RESPIRATORY_RATE,
            VitalChannel::OxygenSaturation => OXYGEN_SATURATION,
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            VitalChannel::HeartRate => "bpm",
            VitalChannel::BloodPressureSystolic | VitalChannel::BloodPressureDiastolic => "mmHg",
            VitalChannel::Temperature => "°C",
            VitalChannel::RespiratoryRate => "/min",
            VitalChannel::OxygenSaturation => "%",
        }
    }
}

impl fmt::Display for VitalChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            VitalChannel::HeartRate => "heart rate",
            VitalChannel::BloodPressureSystolic => "systolic BP",
            VitalChannel::BloodPressureDiastolic => "diastolic BP",
            VitalChannel::Temperature => "temperature",
            VitalChannel::RespiratoryRate => "respiratory rate",
            VitalChannel::OxygenSaturation => "SpO2",
        };
        f.write_str(label)
    }
}

impl ChannelRange {
    /// Clamp into the hard range. NaN collapses to the bottom of the normal band.
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            return self.normal_min;
        }
        value.clamp(self.hard_min, self.hard_max)
    }

    pub fn contains(&self, value: f32) -> bool {
        value >= self.hard_min && value <= self.hard_max
    }

    pub fn classify(&self, value: f32) -> VitalStatus {
        if value >= self.normal_min && value <= self.normal_max {
            VitalStatus::Normal
        } else if value >= self.warning_min && value <= self.warning_max {
            VitalStatus::Warning
        } else {
            VitalStatus::Critical
        }
    }
}
