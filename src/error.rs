//! Error types for the sweeper worker

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sweep::RunMode;

/// Result type for worker operations
pub type Result<T> = std::result::Result<T, SweepError>;

/// Errors surfaced to the caller of a command.
///
/// Failures on a single candidate directory are never represented here; they
/// are collected as [`EntryError`] values inside the run result instead.
#[derive(Error, Debug)]
pub enum SweepError {
    /// Missing or invalid configuration attribute
    #[error("Configuration error: {0}")]
    Config(String),

    /// The target directory could not be accessed at scan time
    #[error("Target path not found: {}: {reason}", path.display())]
    PathNotFound { path: PathBuf, reason: String },

    /// Another analyze or sweep run holds the run lock
    #[error("Cannot start {requested}: another run is already in progress")]
    Busy { requested: RunMode },

    /// Command name outside of the supported set
    #[error("Unknown command: '{0}'. Valid commands: status, analyze, sweep")]
    UnknownCommand(String),

    /// Command object or result could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A blocking filesystem task died before reporting back
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl SweepError {
    /// Create a configuration error
    pub fn config<E: std::fmt::Display>(msg: E) -> Self {
        Self::Config(msg.to_string())
    }

    /// Create a path-not-found error for the given target
    pub fn path_not_found<E: std::fmt::Display>(path: impl Into<PathBuf>, reason: E) -> Self {
        Self::PathNotFound {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Check if this is a busy rejection; the caller may simply retry later
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Busy { .. })
    }
}

/// A failure on one candidate directory, recovered locally during a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryError {
    pub path: PathBuf,
    pub message: String,
}

impl EntryError {
    pub fn new<E: std::fmt::Display>(path: impl Into<PathBuf>, message: E) -> Self {
        Self {
            path: path.into(),
            message: message.to_string(),
        }
    }
}
