//! Cumulative run statistics for a worker instance

use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::sweep::SweepResult;

/// Totals across every completed run since the worker was created
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub total_runs: u64,
    pub total_orphans_found: u64,
    /// Only live sweeps contribute; dry runs and analyze runs never do
    pub total_bytes_reclaimed: u64,
    pub last_run_result: Option<SweepResult>,
    pub last_error_count: usize,
}

/// Registry holding the worker's [`Stats`].
///
/// Writers hold the lock only for the fold in [`record`](Self::record), so
/// readers never wait on an in-progress run.
#[derive(Debug, Default)]
pub struct StatsRegistry {
    inner: RwLock<Stats>,
}

impl StatsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a finished run into the totals
    pub fn record(&self, result: &SweepResult) {
        let mut stats = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        stats.total_runs += 1;
        stats.total_orphans_found += result.orphan_count() as u64;
        stats.total_bytes_reclaimed += result.bytes_reclaimed();
        stats.last_error_count = result.errors.len();
        stats.last_run_result = Some(result.clone());
    }

    /// Consistent copy of the current totals
    pub fn snapshot(&self) -> Stats {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
