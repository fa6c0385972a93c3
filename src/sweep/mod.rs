//! The sweep engine
//!
//! - `scanner` lists and measures the immediate child directories of a target
//! - `age` decides which of them are orphaned by age
//! - `runner` drives a run and deletes or records each orphan
//! - `cancel` lets callers stop a run between units of work

pub mod age;
pub mod cancel;
pub mod runner;
pub mod scanner;
pub mod types;

pub use cancel::CancelSignal;
pub use runner::{RunGuard, Sweeper};
pub use scanner::{scan, ScanOutcome};
pub use types::{
    format_bytes, DirectoryEntry, OrphanDecision, RunMode, SkippedEntry, SweepResult,
};
