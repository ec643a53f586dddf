//! Decision records and the append-only session ledger

use serde::{Deserialize, Serialize};

use crate::core::types::{EventId, Tick};

/// One learner response
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub event_id: EventId,
    pub resolved_at: Tick,
    /// `None` when the decision window lapsed
    pub chosen_option: Option<usize>,
    pub correct: bool,
    pub score_delta: i32,
    pub explanation: Option<String>,
}

/// Ordered ledger of decisions; entries are never changed once appended
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EventHistory {
    records: Vec<DecisionRecord>,
}

impl EventHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn append(&mut self, record: DecisionRecord) {
        debug_assert!(
            self.records
                .last()
                .map_or(true, |last| last.resolved_at <= record.resolved_at),
            "history must stay ordered by resolution time"
        );
        self.records.push(record);
    }

    pub fn records(&self) -> &[DecisionRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &DecisionRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last(&self) -> Option<&DecisionRecord> {
        self.records.last()
    }

    pub fn correct_count(&self) -> usize {
        self.records.iter().filter(|r| r.correct).count()
    }

    pub fn incorrect_count(&self) -> usize {
        self.records.len() - self.correct_count()
    }

    pub fn lapsed_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.chosen_option.is_none() && !r.correct)
            .count()
    }

    pub fn into_records(self) -> Vec<DecisionRecord> {
        self.records
    }
}
