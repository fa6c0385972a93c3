//! Host runtime integration seam

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

/// What a host runtime needs from a configurable, command-driven resource.
///
/// Adapters for a concrete host translate its config and command messages
/// into these calls.
#[async_trait]
pub trait HostResource: Send + Sync {
    /// Apply a new attribute object, replacing the active configuration
    fn reconfigure(&self, attributes: &Value) -> Result<()>;

    /// Execute a `{ "command": ... }` object and return the JSON result
    async fn do_command(&self, command: &Value) -> Result<Value>;
}
