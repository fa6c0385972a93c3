//! Command surface exposed to the host

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, SweepError};
use crate::stats::Stats;
use crate::sweep::{RunMode, SweepResult};

/// The closed set of commands a worker answers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Command {
    Status,
    Analyze,
    Sweep,
}

impl Command {
    pub fn as_str(self) -> &'static str {
        match self {
            Command::Status => "status",
            Command::Analyze => "analyze",
            Command::Sweep => "sweep",
        }
    }

    /// Run mode for commands that take the run lock
    pub fn run_mode(self) -> Option<RunMode> {
        match self {
            Command::Status => None,
            Command::Analyze => Some(RunMode::Analyze),
            Command::Sweep => Some(RunMode::Sweep),
        }
    }

    /// Parse a `{ "command": ... }` object; a missing key means `status`
    pub fn from_request(request: &Value) -> Result<Self> {
        match request.get("command") {
            None | Some(Value::Null) => Ok(Command::Status),
            Some(Value::String(name)) => name.parse(),
            Some(other) => Err(SweepError::UnknownCommand(other.to_string())),
        }
    }
}

impl FromStr for Command {
    type Err = SweepError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "status" => Ok(Command::Status),
            "analyze" => Ok(Command::Analyze),
            "sweep" => Ok(Command::Sweep),
            other => Err(SweepError::UnknownCommand(other.to_string())),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Answer to `status`: active configuration plus cumulative statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusReport {
    pub target_path: PathBuf,
    pub days_old: Option<u64>,
    pub dry_run: bool,
    pub exclude: Vec<String>,
    #[serde(with = "humantime_serde")]
    pub run_timeout: Option<Duration>,
    pub target_exists: bool,
    pub run_in_progress: bool,
    #[serde(flatten)]
    pub stats: Stats,
}

/// Result of dispatching any command
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CommandResponse {
    Status(Box<StatusReport>),
    Run(Box<SweepResult>),
}

impl CommandResponse {
    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn as_run(&self) -> Option<&SweepResult> {
        match self {
            CommandResponse::Run(result) => Some(result.as_ref()),
            CommandResponse::Status(_) => None,
        }
    }

    pub fn as_status(&self) -> Option<&StatusReport> {
        match self {
            CommandResponse::Status(report) => Some(report.as_ref()),
            CommandResponse::Run(_) => None,
        }
    }
}
