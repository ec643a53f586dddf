//! Event scheduler
//!
//! Surfaces each scenario event exactly once. Due events come back ordered by
//! timestamp, then by definition order.

use ahash::AHashSet;

use crate::core::types::{EventId, Tick};
use crate::scenario::ClinicalEvent;

#[derive(Debug, Clone, Default)]
pub struct EventScheduler {
    /// Stable-sorted by timestamp, so equal timestamps keep definition order
    events: Vec<ClinicalEvent>,
    fired: AHashSet<EventId>,
}

impl EventScheduler {
    pub fn new(events: &[ClinicalEvent]) -> Self {
        let mut events = events.to_vec();
        events.sort_by_key(|e| e.timestamp);
        Self {
            events,
            fired: AHashSet::new(),
        }
    }

    /// Return every unfired event scheduled at or before `current_time`,
    /// marking them fired
    ///
    /// With one-second ticks this is the set sharing `current_time`. Events
    /// left behind (time moved past them without a check) are still returned,
    /// earliest first, rather than skipped.
    pub fn due_events(&mut self, current_time: Tick) -> Vec<ClinicalEvent> {
        let due: Vec<ClinicalEvent> = self.peek_due(current_time).cloned().collect();
        for event in &due {
            self.fired.insert(event.id.clone());
        }
        if !due.is_empty() {
            tracing::debug!(
                "{} event(s) due at t={}: {:?}",
                due.len(),
                current_time,
                due.iter().map(|e| e.id.as_str()).collect::<Vec<_>>()
            );
        }
        due
    }

    /// Events `due_events` would return, without marking them fired
    pub fn peek_due(&self, current_time: Tick) -> impl Iterator<Item = &ClinicalEvent> {
        self.events
            .iter()
            .take_while(move |e| e.timestamp <= current_time)
            .filter(|e| !self.fired.contains(&e.id))
    }

    pub fn has_fired(&self, id: &EventId) -> bool {
        self.fired.contains(id)
    }

    pub fn fired_count(&self) -> usize {
        self.fired.len()
    }

    pub fn remaining(&self) -> usize {
        self.events.len() - self.fired.len()
    }

    pub fn all_fired(&self) -> bool {
        self.remaining() == 0
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Timestamp of the earliest unfired event
    pub fn next_due_at(&self) -> Option<Tick> {
        self.events
            .iter()
            .find(|e| !self.fired.contains(&e.id))
            .map(|e| e.timestamp)
    }
}
