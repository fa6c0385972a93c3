//! Data produced by scanning and sweeping

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EntryError;

/// Execution mode of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// Report orphans, never delete
    Analyze,
    /// Delete orphans unless the config asks for a dry run
    Sweep,
}

impl RunMode {
    /// Whether a run in this mode actually removes directories
    pub fn deletes(self, dry_run: bool) -> bool {
        matches!(self, RunMode::Sweep) && !dry_run
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RunMode::Analyze => "analyze",
            RunMode::Sweep => "sweep",
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immediate child directory of the target, as seen by the scanner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub path: PathBuf,
    /// The directory's own mtime, not the newest descendant
    pub last_modified: DateTime<Utc>,
    /// Total size of every regular file beneath the directory
    pub size_bytes: u64,
    pub age_days: u64,
}

/// Outcome of classifying one entry against the age threshold
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrphanDecision {
    pub entry: DirectoryEntry,
    pub is_orphan: bool,
    pub threshold: Option<u64>,
}

impl OrphanDecision {
    /// Human-readable reason an entry was kept
    pub fn skip_reason(&self) -> String {
        match self.threshold {
            Some(threshold) => format!(
                "Only {} days old (threshold: {})",
                self.entry.age_days, threshold
            ),
            None => "Age filtering disabled (days_old not configured)".to_string(),
        }
    }
}

/// A scanned candidate that was not classified as an orphan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedEntry {
    pub path: PathBuf,
    pub age_days: u64,
    pub reason: String,
}

impl From<OrphanDecision> for SkippedEntry {
    fn from(decision: OrphanDecision) -> Self {
        let reason = decision.skip_reason();
        Self {
            path: decision.entry.path,
            age_days: decision.entry.age_days,
            reason,
        }
    }
}

/// Result of one analyze or sweep run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepResult {
    pub run_id: Uuid,
    pub mode: RunMode,
    /// True whenever nothing was eligible for deletion: analyze runs and dry-run sweeps
    pub dry_run: bool,
    pub candidates_scanned: usize,
    /// Orphans, largest first
    #[serde(rename = "orphans")]
    pub orphans_found: Vec<DirectoryEntry>,
    pub skipped: Vec<SkippedEntry>,
    /// Bytes actually freed by a live sweep, or the size estimate otherwise
    pub bytes_reclaimed_or_estimated: u64,
    pub errors: Vec<EntryError>,
    /// Set when the run stopped early on cancellation or deadline
    pub cancelled: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl SweepResult {
    /// Bytes this run really freed from disk
    pub fn bytes_reclaimed(&self) -> u64 {
        if self.mode.deletes(self.dry_run) {
            self.bytes_reclaimed_or_estimated
        } else {
            0
        }
    }

    pub fn orphan_count(&self) -> usize {
        self.orphans_found.len()
    }
}

/// Format bytes as human-readable string
pub fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.2} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.2} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.2} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}
