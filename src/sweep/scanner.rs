//! Candidate discovery
//!
//! Lists the immediate child directories of the target path and measures
//! each one. This is blocking filesystem work; async callers run it on the
//! blocking pool.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};
use walkdir::WalkDir;

use super::age::age_days;
use super::cancel::CancelSignal;
use super::types::DirectoryEntry;
use crate::config::SweepConfig;
use crate::error::{EntryError, Result, SweepError};

/// Everything a scan produced before finishing or being cancelled
#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub entries: Vec<DirectoryEntry>,
    pub errors: Vec<EntryError>,
    /// Children left out because their name is on the exclude list
    pub excluded: usize,
    pub cancelled: bool,
}

/// Size of one candidate and the descendants the walk could not read
#[derive(Debug, Default)]
struct DirSize {
    bytes: u64,
    unreadable: usize,
    first_error: Option<String>,
}

impl DirSize {
    fn note_unreadable(&mut self, error: impl std::fmt::Display) {
        self.unreadable += 1;
        if self.first_error.is_none() {
            self.first_error = Some(error.to_string());
        }
    }
}

enum SizeWalk {
    Complete(DirSize),
    Cancelled,
}

/// Scan the immediate child directories of the configured target path.
///
/// Fails only when the target itself cannot be read. Problems with a single
/// child are recorded in [`ScanOutcome::errors`]; a child whose subtree could
/// only be partly measured is still listed.
pub fn scan(
    config: &SweepConfig,
    now: DateTime<Utc>,
    cancel: &CancelSignal,
) -> Result<ScanOutcome> {
    let target_path = config.target_path();
    let metadata =
        fs::metadata(target_path).map_err(|e| SweepError::path_not_found(target_path, e))?;
    if !metadata.is_dir() {
        return Err(SweepError::path_not_found(target_path, "not a directory"));
    }

    let entries =
        fs::read_dir(target_path).map_err(|e| SweepError::path_not_found(target_path, e))?;

    let mut outcome = ScanOutcome::default();

    for entry in entries {
        if cancel.is_cancelled() {
            warn!("Scan of {} cancelled", target_path.display());
            outcome.cancelled = true;
            break;
        }

        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                outcome
                    .errors
                    .push(EntryError::new(target_path, format!("Failed to list entry: {e}")));
                continue;
            }
        };
        let path = entry.path();

        let file_type = match entry.file_type() {
            Ok(file_type) => file_type,
            Err(e) => {
                outcome
                    .errors
                    .push(EntryError::new(&path, format!("Failed to stat: {e}")));
                continue;
            }
        };

        if file_type.is_symlink() {
            // Link targets are never swept; only a dangling link is worth reporting
            if let Err(e) = fs::metadata(&path) {
                outcome
                    .errors
                    .push(EntryError::new(&path, format!("Broken symlink: {e}")));
            } else {
                debug!("Skipping symlink {}", path.display());
            }
            continue;
        }

        if !file_type.is_dir() {
            continue;
        }

        let name = entry.file_name();
        if name.to_str().is_some_and(|name| config.is_excluded(name)) {
            debug!("Skipping excluded directory {}", path.display());
            outcome.excluded += 1;
            continue;
        }

        let modified = match fs::symlink_metadata(&path).and_then(|m| m.modified()) {
            Ok(modified) => modified,
            Err(e) => {
                outcome
                    .errors
                    .push(EntryError::new(&path, format!("Failed to read metadata: {e}")));
                continue;
            }
        };

        let size = match dir_size(&path, cancel) {
            Ok(SizeWalk::Complete(size)) => size,
            Ok(SizeWalk::Cancelled) => {
                warn!("Scan of {} cancelled", target_path.display());
                outcome.cancelled = true;
                break;
            }
            Err(e) => {
                outcome
                    .errors
                    .push(EntryError::new(&path, format!("Failed to measure: {e}")));
                continue;
            }
        };

        if let Some(first_error) = &size.first_error {
            let message = format!(
                "Size underestimated: {} unreadable entries (first: {})",
                size.unreadable, first_error
            );
            warn!("{}: {}", path.display(), message);
            outcome.errors.push(EntryError::new(&path, message));
        }

        let last_modified = DateTime::<Utc>::from(modified);
        outcome.entries.push(DirectoryEntry {
            path,
            last_modified,
            size_bytes: size.bytes,
            age_days: age_days(last_modified, now),
        });
    }

    debug!(
        "Scanned {}: {} candidates, {} errors, {} excluded",
        target_path.display(),
        outcome.entries.len(),
        outcome.errors.len(),
        outcome.excluded
    );

    Ok(outcome)
}

/// Total size of regular files beneath `dir`, without following symlinks.
///
/// An unreadable `dir` fails the walk; unreadable descendants are counted in
/// the returned [`DirSize`].
fn dir_size(dir: &Path, cancel: &CancelSignal) -> std::result::Result<SizeWalk, walkdir::Error> {
    let mut size = DirSize::default();

    for entry in WalkDir::new(dir).follow_links(false) {
        if cancel.is_cancelled() {
            return Ok(SizeWalk::Cancelled);
        }

        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => return Err(e),
            Err(e) => {
                size.note_unreadable(e);
                continue;
            }
        };

        if entry.file_type().is_file() {
            match entry.metadata() {
                Ok(metadata) => size.bytes += metadata.len(),
                Err(e) => size.note_unreadable(e),
            }
        }
    }

    Ok(SizeWalk::Complete(size))
}
