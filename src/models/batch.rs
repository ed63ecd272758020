//! Batch lookup result.

use std::collections::BTreeSet;

use serde::Serialize;

use super::{PlayerHandle, Report};

/// Outcome of a roster lookup. Every processed name lands in exactly one bucket.
///
/// A cancelled run carries only the names that finished before cancellation;
/// callers decide whether to show or drop it.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchResult {
    /// Successful reports, in processing order
    pub succeeded: Vec<Report>,

    /// Private profiles, with or without a known rank
    pub private: BTreeSet<PlayerHandle>,

    /// Unresolved names and failed fetches
    pub not_found: BTreeSet<PlayerHandle>,

    /// Set when the run was cancelled before every name was looked up
    pub cancelled: bool,
}

impl BatchResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of names across all buckets.
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.private.len() + self.not_found.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}
