//! Age-based orphan classification
//!
//! Pure functions only; the caller supplies `now` so decisions are
//! reproducible within a run.

use chrono::{DateTime, Utc};

use super::types::{DirectoryEntry, OrphanDecision};

/// Whole days elapsed since `last_modified`, rounded down.
///
/// Timestamps in the future count as zero days old.
pub fn age_days(last_modified: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    let age = now.signed_duration_since(last_modified);
    age.num_days().max(0) as u64
}

/// Orphan iff a threshold is configured and the age reaches it
pub fn is_orphan(age_days: u64, threshold: Option<u64>) -> bool {
    threshold.is_some_and(|threshold| age_days >= threshold)
}

/// Check a scanned entry against the threshold
pub fn classify(entry: &DirectoryEntry, threshold: Option<u64>) -> bool {
    is_orphan(entry.age_days, threshold)
}

/// Classify an entry, keeping the threshold alongside the verdict
pub fn decide(entry: DirectoryEntry, threshold: Option<u64>) -> OrphanDecision {
    let is_orphan = classify(&entry, threshold);
    OrphanDecision {
        entry,
        is_orphan,
        threshold,
    }
}
