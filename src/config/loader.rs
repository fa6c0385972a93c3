use std::path::Path;

use tokio::fs;

use super::SweepAttributes;
use crate::error::{Result, SweepError};

/// Load an attribute layer from a TOML or JSON file, chosen by extension
pub async fn load_attributes_file(path: &Path) -> Result<SweepAttributes> {
    let content = fs::read_to_string(path).await.map_err(|e| {
        SweepError::config(format!("Failed to read config {}: {e}", path.display()))
    })?;

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if is_json {
        let value: serde_json::Value = serde_json::from_str(&content).map_err(|e| {
            SweepError::config(format!("Failed to parse {}: {e}", path.display()))
        })?;
        SweepAttributes::from_value(&value)
    } else {
        toml::from_str(&content)
            .map_err(|e| SweepError::config(format!("Failed to parse {}: {e}", path.display())))
    }
}

/// Attribute layer from `DISK_SWEEPER_*` environment variables
pub fn env_attributes() -> Result<SweepAttributes> {
    env_attributes_from(|key| std::env::var(key).ok())
}

fn env_attributes_from(lookup: impl Fn(&str) -> Option<String>) -> Result<SweepAttributes> {
    let mut attributes = SweepAttributes::default();

    if let Some(target_path) = lookup("DISK_SWEEPER_TARGET_PATH") {
        attributes.target_path = Some(target_path);
    }

    if let Some(days_old) = lookup("DISK_SWEEPER_DAYS_OLD") {
        let value = days_old.trim().parse::<f64>().map_err(|_| {
            SweepError::config(format!("DISK_SWEEPER_DAYS_OLD is not a number: {days_old}"))
        })?;
        attributes.days_old = Some(value);
    }

    if let Some(dry_run) = lookup("DISK_SWEEPER_DRY_RUN") {
        let value = dry_run.trim().parse::<bool>().map_err(|_| {
            SweepError::config(format!("DISK_SWEEPER_DRY_RUN is not a boolean: {dry_run}"))
        })?;
        attributes.dry_run = Some(value);
    }

    Ok(attributes)
}
