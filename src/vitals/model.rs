//! Vitals model - drift and discrete impacts
//!
//! Both operations are pure: they take the current readings and return new
//! ones. The caller stores the result as the baseline for the next tick, so
//! drift compounds as a random walk inside the hard ranges.

use rand::Rng;

use crate::core::config::DriftConfig;
use crate::vitals::channel::{VitalChannel, VitalStatus};
use crate::vitals::signs::{VitalSigns, VitalsDelta};

#[derive(Debug, Clone, Default)]
pub struct VitalsModel {
    drift: DriftConfig,
}

impl VitalsModel {
    pub fn new(drift: DriftConfig) -> Self {
        Self { drift }
    }

    pub fn drift_config(&self) -> &DriftConfig {
        &self.drift
    }

    /// Apply one tick of bounded random drift to every channel
    pub fn drift<R: Rng + ?Sized>(&self, current: &VitalSigns, rng: &mut R) -> VitalSigns {
        let mut next = *current;
        for channel in VitalChannel::ALL {
            let magnitude = self.drift.magnitude(channel);
            let perturbation = if magnitude > 0.0 {
                rng.gen_range(-magnitude..=magnitude)
            } else {
                0.0
            };
            next.set(channel, current.get(channel) + perturbation);
        }
        next
    }

    /// Add each present delta and clamp; absent channels are unchanged
    pub fn apply_impact(current: &VitalSigns, impact: &VitalsDelta) -> VitalSigns {
        let mut next = *current;
        for (channel, delta) in impact.entries() {
            next.set(channel, current.get(channel) + delta);
        }
        next
    }

    pub fn classify(channel: VitalChannel, value: f32) -> VitalStatus {
        channel.range().classify(value)
    }
}
