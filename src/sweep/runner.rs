//! Run orchestration: scan, classify, then delete or record

use chrono::Utc;
use tokio::fs;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{error, info, warn};
use uuid::Uuid;

use super::age;
use super::cancel::CancelSignal;
use super::scanner;
use super::types::{format_bytes, DirectoryEntry, RunMode, SkippedEntry, SweepResult};
use crate::config::SweepConfig;
use crate::error::{EntryError, Result, SweepError};
use crate::stats::StatsRegistry;

/// Executes analyze and sweep runs, one at a time, and owns the run statistics
#[derive(Debug, Default)]
pub struct Sweeper {
    stats: StatsRegistry,
    run_lock: Mutex<()>,
}

/// Proof that the holder owns the run lock; released on drop
#[derive(Debug)]
pub struct RunGuard<'a> {
    _lock: MutexGuard<'a, ()>,
    mode: RunMode,
}

impl RunGuard<'_> {
    pub fn mode(&self) -> RunMode {
        self.mode
    }
}

#[derive(Debug, Default)]
struct DeletionOutcome {
    reclaimed: u64,
    errors: Vec<EntryError>,
    cancelled: bool,
}

impl Sweeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> &StatsRegistry {
        &self.stats
    }

    /// Check whether a run currently holds the lock
    pub fn is_running(&self) -> bool {
        self.run_lock.try_lock().is_err()
    }

    /// Take the run lock without waiting, failing with [`SweepError::Busy`] if held
    pub fn begin(&self, mode: RunMode) -> Result<RunGuard<'_>> {
        match self.run_lock.try_lock() {
            Ok(lock) => Ok(RunGuard { _lock: lock, mode }),
            Err(_) => {
                warn!("Rejecting {} request: a run is already in progress", mode);
                Err(SweepError::Busy { requested: mode })
            }
        }
    }

    /// Run `mode` against `config`, rejecting the call if another run is active
    pub async fn run(
        &self,
        config: &SweepConfig,
        mode: RunMode,
        cancel: &CancelSignal,
    ) -> Result<SweepResult> {
        let guard = self.begin(mode)?;
        self.run_locked(&guard, config, cancel).await
    }

    /// Run under a lock already taken with [`begin`](Self::begin)
    pub async fn run_locked(
        &self,
        guard: &RunGuard<'_>,
        config: &SweepConfig,
        cancel: &CancelSignal,
    ) -> Result<SweepResult> {
        let mode = guard.mode();
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let dry_run = !mode.deletes(config.dry_run);

        info!(
            "Starting {} run {} on {} (days_old={:?}, dry_run={})",
            mode,
            run_id,
            config.target_path.display(),
            config.days_old,
            dry_run
        );

        let scan_config = config.clone();
        let scan_cancel = cancel.clone();
        let scan = tokio::task::spawn_blocking(move || {
            scanner::scan(&scan_config, started_at, &scan_cancel)
        })
        .await?
        .inspect_err(|e| error!("Run {} aborted: {}", run_id, e))?;

        let candidates_scanned = scan.entries.len();
        let mut orphans_found: Vec<DirectoryEntry> = Vec::new();
        let mut skipped: Vec<SkippedEntry> = Vec::new();
        for entry in scan.entries {
            let decision = age::decide(entry, config.days_old);
            if decision.is_orphan {
                orphans_found.push(decision.entry);
            } else {
                skipped.push(decision.into());
            }
        }
        orphans_found.sort_by(|a, b| b.size_bytes.cmp(&a.size_bytes));

        let mut errors = scan.errors;
        let mut cancelled = scan.cancelled;

        let bytes_reclaimed_or_estimated = if dry_run {
            for orphan in &orphans_found {
                info!(
                    "[DRY RUN] Would delete {} ({}, {} days old)",
                    orphan.path.display(),
                    format_bytes(orphan.size_bytes),
                    orphan.age_days
                );
            }
            orphans_found.iter().map(|o| o.size_bytes).sum()
        } else {
            let deletion = delete_orphans(&orphans_found, cancel).await;
            errors.extend(deletion.errors);
            cancelled |= deletion.cancelled;
            deletion.reclaimed
        };

        let result = SweepResult {
            run_id,
            mode,
            dry_run,
            candidates_scanned,
            orphans_found,
            skipped,
            bytes_reclaimed_or_estimated,
            errors,
            cancelled,
            started_at,
            finished_at: Utc::now(),
        };

        self.stats.record(&result);

        info!(
            "{} run {} complete: {} orphans of {} candidates, {} {}, {} errors{}",
            mode,
            run_id,
            result.orphan_count(),
            result.candidates_scanned,
            format_bytes(result.bytes_reclaimed_or_estimated),
            if dry_run { "reclaimable" } else { "freed" },
            result.errors.len(),
            if result.cancelled { " (cancelled)" } else { "" }
        );

        Ok(result)
    }
}

/// Delete each orphan in order, stopping early only on cancellation
async fn delete_orphans(orphans: &[DirectoryEntry], cancel: &CancelSignal) -> DeletionOutcome {
    let mut outcome = DeletionOutcome::default();

    for (index, orphan) in orphans.iter().enumerate() {
        if cancel.is_cancelled() {
            warn!(
                "Cancellation requested; leaving {} remaining orphan(s) in place",
                orphans.len() - index
            );
            outcome.cancelled = true;
            break;
        }

        match fs::remove_dir_all(&orphan.path).await {
            Ok(()) => {
                info!(
                    "Deleted {} ({}, {} days old)",
                    orphan.path.display(),
                    format_bytes(orphan.size_bytes),
                    orphan.age_days
                );
                outcome.reclaimed += orphan.size_bytes;
            }
            Err(e) => {
                let message = match e.kind() {
                    std::io::ErrorKind::PermissionDenied => format!("Permission denied: {e}"),
                    std::io::ErrorKind::NotFound => format!("Directory disappeared: {e}"),
                    _ => format!("Failed to delete: {e}"),
                };
                error!("{}: {}", orphan.path.display(), message);
                outcome.errors.push(EntryError::new(&orphan.path, message));
            }
        }
    }

    outcome
}
