//! The counters collaborator: named, concurrency-safe request counters.
//!
//! Passive bookkeeping only: incrementing never blocks a request and never
//! touches the dispatch tree. Counts are eventually consistent and cheap to
//! record from any coroutine.

use dashmap::DashMap;
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// A concurrent map of named `u64` counters.
///
/// The counter set is open-ended: incrementing an unknown name creates it
/// at zero first. Safe under concurrent increment from independent request
/// coroutines.
#[derive(Debug, Default)]
pub struct Counters {
    counts: DashMap<String, u64>,
}

impl Counters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one to the named counter.
    pub fn increment(&self, name: &str) {
        *self.counts.entry(name.to_string()).or_insert(0) += 1;
    }

    /// Current value of the named counter (zero if never incremented).
    pub fn get(&self, name: &str) -> u64 {
        self.counts.get(name).map(|v| *v).unwrap_or(0)
    }

    /// Stable-ordered snapshot of every counter.
    pub fn snapshot(&self) -> BTreeMap<String, u64> {
        self.counts
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect()
    }

    /// The snapshot rendered as a JSON object, for the `/stats` endpoint.
    pub fn snapshot_json(&self) -> Value {
        json!(self.snapshot())
    }
}
