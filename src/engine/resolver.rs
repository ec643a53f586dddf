//! Decision resolution
//!
//! Correctness drives the score only. The event's impact is the clinical
//! consequence of the moment and applies whatever the learner chose.

use serde::{Deserialize, Serialize};

use crate::scenario::ClinicalEvent;
use crate::vitals::VitalsDelta;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub correct: bool,
    pub score_delta: i32,
    pub impact: VitalsDelta,
}

#[derive(Debug, Clone)]
pub struct DecisionResolver {
    penalty: u32,
}

impl Default for DecisionResolver {
    fn default() -> Self {
        Self::new(10)
    }
}

impl DecisionResolver {
    pub fn new(penalty: u32) -> Self {
        Self { penalty }
    }

    pub fn penalty(&self) -> u32 {
        self.penalty
    }

    /// Resolve a learner's choice
    ///
    /// `None` means the decision window lapsed; for an event with options
    /// that counts as incorrect. Events without options are always correct.
    pub fn resolve(&self, event: &ClinicalEvent, chosen: Option<usize>) -> Resolution {
        let correct = if event.has_options() {
            chosen.is_some() && chosen == event.correct_option
        } else {
            true
        };

        let score_delta = if correct {
            0
        } else {
            -(self.penalty.min(i32::MAX as u32) as i32)
        };

        Resolution {
            correct,
            score_delta,
            impact: event.impact.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vitals::VitalChannel;

    fn event() -> ClinicalEvent {
        ClinicalEvent::decision("e", 5, "?", &["A", "B"], 1)
            .with_impact(VitalsDelta::new().with(VitalChannel::HeartRate, 20.0))
    }

    #[test]
    fn test_correct_choice() {
        let r = DecisionResolver::default().resolve(&event(), Some(1));
        assert!(r.correct);
        assert_eq!(r.score_delta, 0);
    }

    #[test]
    fn test_incorrect_choice_penalized() {
        let r = DecisionResolver::default().resolve(&event(), Some(0));
        assert!(!r.correct);
        assert_eq!(r.score_delta, -10);
    }

    #[test]
    fn test_lapsed_choice_is_incorrect() {
        let r = DecisionResolver::default().resolve(&event(), None);
        assert!(!r.correct);
        assert_eq!(r.score_delta, -10);
    }

    #[test]
    fn test_impact_applies_regardless_of_correctness() {
        let resolver = DecisionResolver::default();
        let right = resolver.resolve(&event(), Some(1));
        let wrong = resolver.resolve(&event(), Some(0));
        assert_eq!(right.impact, wrong.impact);
        assert_eq!(right.impact.heart_rate, Some(20.0));
    }

    #[test]
    fn test_observation_is_vacuously_correct() {
        let obs = ClinicalEvent::observation("o", 3, "Look");
        let r = DecisionResolver::default().resolve(&obs, None);
        assert!(r.correct);
        assert_eq!(r.score_delta, 0);
        assert!(r.impact.is_empty());
    }

    #[test]
    fn test_custom_penalty() {
        let r = DecisionResolver::new(25).resolve(&event(), Some(0));
        assert_eq!(r.score_delta, -25);
    }
}
