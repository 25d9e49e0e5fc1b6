//! Observability hooks fired after a request has been filtered.

use std::sync::{Mutex, PoisonError};

use serde::Serialize;

/// Outcome of one resolution request, as seen by listeners.
#[derive(Debug, Clone, Copy)]
pub struct ImportEvent<'a> {
    pub origin: &'a str,
    /// Candidates that survived exclusion and filtering.
    pub candidates: &'a [String],
    pub exclusions: &'a [String],
}

/// Receives import events in registration order. Listeners observe only;
/// nothing they do changes the outcome.
pub trait ImportListener: Send + Sync {
    fn on_import(&self, event: &ImportEvent<'_>);
}

/// What one import site contributed, recorded by [`ConditionReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteRecord {
    pub origin: String,
    pub candidates: Vec<String>,
    pub exclusions: Vec<String>,
}

/// Collects every import event for later reporting.
#[derive(Debug, Default)]
pub struct ConditionReport {
    records: Mutex<Vec<SiteRecord>>,
}

impl ConditionReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<SiteRecord> {
        self.lock().clone()
    }

    /// Exclusions across all recorded sites, deduplicated, first-seen order.
    pub fn exclusions(&self) -> Vec<String> {
        let records = self.lock();
        let mut seen = Vec::new();
        for exclusion in records.iter().flat_map(|r| &r.exclusions) {
            if !seen.contains(exclusion) {
                seen.push(exclusion.clone());
            }
        }
        seen
    }

    /// Surviving candidates recorded for `origin`.
    pub fn candidates(&self, origin: &str) -> Vec<String> {
        self.lock()
            .iter()
            .filter(|record| record.origin == origin)
            .flat_map(|record| record.candidates.iter().cloned())
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<SiteRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ImportListener for ConditionReport {
    fn on_import(&self, event: &ImportEvent<'_>) {
        self.lock().push(SiteRecord {
            origin: event.origin.to_string(),
            candidates: event.candidates.to_vec(),
            exclusions: event.exclusions.to_vec(),
        });
    }
}
