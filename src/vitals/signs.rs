//! Vital sign readings and partial deltas

use serde::{Deserialize, Serialize};

use crate::vitals::channel::{VitalChannel, VitalStatus};

/// A full set of vital sign readings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VitalSigns {
    pub heart_rate: f32,
    pub blood_pressure_systolic: f32,
    pub blood_pressure_diastolic: f32,
    pub temperature: f32,
    pub respiratory_rate: f32,
    pub oxygen_saturation: f32,
}

impl Default for VitalSigns {
    /// A healthy adult at rest
    fn default() -> Self {
        Self {
            heart_rate: 75.0,
            blood_pressure_systolic: 120.0,
            blood_pressure_diastolic: 80.0,
            temperature: 36.8,
            respiratory_rate: 16.0,
            oxygen_saturation: 98.0,
        }
    }
}

impl VitalSigns {
    pub fn get(&self, channel: VitalChannel) -> f32 {
        match channel {
            VitalChannel::HeartRate => self.heart_rate,
            VitalChannel::BloodPressureSystolic => self.blood_pressure_systolic,
            VitalChannel::BloodPressureDiastolic => self.blood_pressure_diastolic,
            VitalChannel::Temperature => self.temperature,
            VitalChannel::RespiratoryRate => self.respiratory_rate,
            VitalChannel::OxygenSaturation => self.oxygen_saturation,
        }
    }

    /// Set a channel, clamped to its hard range
    pub fn set(&mut self, channel: VitalChannel, value: f32) {
        let value = channel.range().clamp(value);
        match channel {
            VitalChannel::HeartRate => self.heart_rate = value,
            VitalChannel::BloodPressureSystolic => self.blood_pressure_systolic = value,
            VitalChannel::BloodPressureDiastolic => self.blood_pressure_diastolic = value,
            VitalChannel::Temperature => self.temperature = value,
            VitalChannel::RespiratoryRate => self.respiratory_rate = value,
            VitalChannel::OxygenSaturation => self.oxygen_saturation = value,
        }
    }

    /// Copy with every channel clamped to its hard range
    pub fn clamped(&self) -> Self {
        let mut out = *self;
        for channel in VitalChannel::ALL {
            out.set(channel, self.get(channel));
        }
        out
    }

    pub fn within_hard_ranges(&self) -> bool {
        VitalChannel::ALL
            .iter()
            .all(|c| c.range().contains(self.get(*c)))
    }

    pub fn status(&self, channel: VitalChannel) -> VitalStatus {
        channel.range().classify(self.get(channel))
    }

    /// Worst status across all channels
    pub fn overall_status(&self) -> VitalStatus {
        VitalChannel::ALL
            .iter()
            .map(|c| self.status(*c))
            .max()
            .unwrap_or(VitalStatus::Normal)
    }
}

/// Partial vital sign change attached to a clinical event
///
/// Channels left as `None` are untouched when the delta is applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VitalsDelta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heart_rate: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blood_pressure_systolic: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blood_pressure_diastolic: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub respiratory_rate: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oxygen_saturation: Option<f32>,
}

impl VitalsDelta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, channel: VitalChannel, delta: f32) -> Self {
        let slot = match channel {
            VitalChannel::HeartRate => &mut self.heart_rate,
            VitalChannel::BloodPressureSystolic => &mut self.blood_pressure_systolic,
            VitalChannel::BloodPressureDiastolic => &mut self.blood_pressure_diastolic,
            VitalChannel::Temperature => &mut self.temperature,
            VitalChannel::RespiratoryRate => &mut self.respiratory_rate,
            VitalChannel::OxygenSaturation => &mut self.oxygen_saturation,
        };
        *slot = Some(delta);
        self
    }

    pub fn get(&self, channel: VitalChannel) -> Option<f32> {
        match channel {
            VitalChannel::HeartRate => self.heart_rate,
            VitalChannel::BloodPressureSystolic => self.blood_pressure_systolic,
            VitalChannel::BloodPressureDiastolic => self.blood_pressure_diastolic,
            VitalChannel::Temperature => self.temperature,
            VitalChannel::RespiratoryRate => self.respiratory_rate,
            VitalChannel::OxygenSaturation => self.oxygen_saturation,
        }
    }

    pub fn is_empty(&self) -> bool {
        VitalChannel::ALL.iter().all(|c| self.get(*c).is_none())
    }

    /// Present channels in canonical order
    pub fn entries(&self) -> impl Iterator<Item = (VitalChannel, f32)> + '_ {
        VitalChannel::ALL
            .into_iter()
            .filter_map(move |c| self.get(c).map(|d| (c, d)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_clamps() {
        let mut vitals = VitalSigns::default();
        vitals.set(VitalChannel::OxygenSaturation, 120.0);
        assert_eq!(vitals.oxygen_saturation, 100.0);
        vitals.set(VitalChannel::HeartRate, -5.0);
        assert_eq!(vitals.heart_rate, 20.0);
    }

    #[test]
    fn test_default_vitals_are_normal() {
        let vitals = VitalSigns::default();
        assert!(vitals.within_hard_ranges());
        assert_eq!(vitals.overall_status(), VitalStatus::Normal);
    }

    #[test]
    fn test_overall_status_is_worst_channel() {
        let vitals = VitalSigns {
            oxygen_saturation: 82.0,
            ..VitalSigns::default()
        };
        assert_eq!(vitals.overall_status(), VitalStatus::Critical);
    }

    #[test]
    fn test_delta_entries() {
        let delta = VitalsDelta::new()
            .with(VitalChannel::Temperature, 0.5)
            .with(VitalChannel::HeartRate, 20.0);
        let entries: Vec<_> = delta.entries().collect();
        assert_eq!(
            entries,
            vec![(VitalChannel::HeartRate, 20.0), (VitalChannel::Temperature, 0.5)]
        );
        assert!(!delta.is_empty());
        assert!(VitalsDelta::new().is_empty());
    }

    #[test]
    fn test_delta_deserializes_partial() {
        let delta: VitalsDelta = serde_json::from_str(r#"{"heart_rate": 20}"#).unwrap();
        assert_eq!(delta.heart_rate, Some(20.0));
        assert_eq!(delta.temperature, None);
    }
}
