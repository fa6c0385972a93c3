//! # Disk Sweeper
//!
//! Reclaims disk space under a configured directory by deleting immediate
//! child directories whose own modification time is older than a threshold.
//!
//! ## Usage
//!
//! ```bash
//! disk-sweeper --target-path /var/lib/video-storage --days-old 30 analyze
//! disk-sweeper --config sweeper.toml sweep
//! ```
//!
//! ## Modules
//!
//! - `config` - Validated configuration and attribute layering (file, env, flags)
//! - `error` - Error types for runs and commands
//! - `stats` - Cumulative statistics across runs
//! - `sweep` - Scanning, age classification, deletion and cancellation
//! - `worker` - Command dispatch and the host integration seam
//! - `testing` - Filesystem fixtures with backdated modification times
pub mod config;
pub mod error;
pub mod stats;
pub mod sweep;
pub mod worker;

pub mod testing;

pub use config::{SweepAttributes, SweepConfig};
pub use error::{EntryError, Result, SweepError};
pub use stats::{Stats, StatsRegistry};
pub use sweep::{CancelSignal, RunMode, SweepResult};
pub use worker::{Command, CommandResponse, HostResource, StatusReport, Worker};
