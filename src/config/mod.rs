//! Worker configuration
//!
//! Attributes arrive from the host as a loosely-typed object and are parsed
//! into a [`SweepAttributes`] layer. Layers from several sources (config file,
//! environment, command-line flags) can be merged before a single validation
//! pass produces the immutable [`SweepConfig`] a run works from.

pub mod loader;

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, SweepError};

pub use loader::{env_attributes, load_attributes_file};

/// Validated configuration for a sweep worker.
///
/// Replaced wholesale on reconfiguration, never mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepConfig {
    /// Directory whose immediate children are sweep candidates
    pub target_path: PathBuf,
    /// Minimum age in days for a child to count as orphaned; `None` disables age filtering
    pub days_old: Option<u64>,
    /// Report would-be deletions without deleting anything
    pub dry_run: bool,
    /// Child directory names that are never candidates
    pub exclude: Vec<String>,
    /// Deadline applied to every analyze/sweep run
    #[serde(with = "humantime_serde")]
    pub run_timeout: Option<Duration>,
}

impl SweepConfig {
    /// Create a config for `target_path` with age filtering disabled and deletion enabled
    pub fn new(target_path: impl Into<PathBuf>) -> Self {
        Self {
            target_path: target_path.into(),
            days_old: None,
            dry_run: false,
            exclude: Vec::new(),
            run_timeout: None,
        }
    }

    pub fn with_days_old(mut self, days_old: u64) -> Self {
        self.days_old = Some(days_old);
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_exclude<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_run_timeout(mut self, timeout: Duration) -> Self {
        self.run_timeout = Some(timeout);
        self
    }

    /// Parse and validate a host attribute object
    pub fn from_attributes(attributes: &Value) -> Result<Self> {
        SweepAttributes::from_value(attributes)?.validate()
    }

    /// Check whether a child directory name is protected from sweeping
    pub fn is_excluded(&self, name: &str) -> bool {
        self.exclude.iter().any(|excluded| excluded == name)
    }

    pub fn target_path(&self) -> &Path {
        &self.target_path
    }
}

/// One unvalidated layer of configuration attributes.
///
/// Every field is optional so that layers can be merged; `validate` enforces
/// the required ones.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SweepAttributes {
    pub target_path: Option<String>,
    /// Kept as a double: host runtimes deliver every attribute number that way
    pub days_old: Option<f64>,
    pub dry_run: Option<bool>,
    pub exclude: Option<Vec<String>>,
    #[serde(with = "humantime_serde")]
    pub run_timeout: Option<Duration>,
}

impl SweepAttributes {
    /// Parse attributes from a host object.
    ///
    /// Accepts either the attributes directly or an object whose `json` field
    /// holds them serialized as a string.
    pub fn from_value(value: &Value) -> Result<Self> {
        let unwrapped;
        let value = match value.get("json").and_then(Value::as_str) {
            Some(raw) => {
                unwrapped = serde_json::from_str::<Value>(raw).map_err(|e| {
                    SweepError::config(format!("Failed to parse json attribute: {e}"))
                })?;
                &unwrapped
            }
            None => value,
        };

        if value.is_null() {
            return Ok(Self::default());
        }

        serde_json::from_value(value.clone())
            .map_err(|e| SweepError::config(format!("Invalid attributes: {e}")))
    }

    /// Overlay `other` on top of `self`; fields set in `other` win
    pub fn merge(self, other: SweepAttributes) -> SweepAttributes {
        SweepAttributes {
            target_path: other.target_path.or(self.target_path),
            days_old: other.days_old.or(self.days_old),
            dry_run: other.dry_run.or(self.dry_run),
            exclude: other.exclude.or(self.exclude),
            run_timeout: other.run_timeout.or(self.run_timeout),
        }
    }

    /// Validate the merged attributes into a [`SweepConfig`]
    pub fn validate(self) -> Result<SweepConfig> {
        let target_path = match self.target_path.as_deref().map(str::trim) {
            Some(path) if !path.is_empty() => PathBuf::from(path),
            Some(_) => return Err(SweepError::config("target_path must not be empty")),
            None => return Err(SweepError::config("target_path is required")),
        };

        let days_old = self.days_old.map(validate_days_old).transpose()?;

        let exclude = self
            .exclude
            .unwrap_or_default()
            .into_iter()
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect();

        Ok(SweepConfig {
            target_path,
            days_old,
            dry_run: self.dry_run.unwrap_or(false),
            exclude,
            run_timeout: self.run_timeout,
        })
    }
}

fn validate_days_old(raw: f64) -> Result<u64> {
    if !raw.is_finite() || raw.fract() != 0.0 {
        return Err(SweepError::config(format!(
            "days_old must be a whole number of days, got {raw}"
        )));
    }
    if raw < 0.0 {
        return Err(SweepError::config(format!(
            "days_old must be non-negative, got {raw}"
        )));
    }
    Ok(raw as u64)
}
