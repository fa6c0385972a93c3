//! The sweeper worker
//!
//! A [`Worker`] is the context object a host holds: the active
//! configuration, the [`Sweeper`] with its statistics, and the command
//! dispatcher tying them together. Share it behind an `Arc` when commands
//! arrive from several callers.

pub mod command;
pub mod host;

use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, error, info};

use crate::config::SweepConfig;
use crate::error::Result;
use crate::stats::Stats;
use crate::sweep::{CancelSignal, Sweeper};

pub use command::{Command, CommandResponse, StatusReport};
pub use host::HostResource;

/// Disk sweeper worker
#[derive(Debug)]
pub struct Worker {
    config: RwLock<Arc<SweepConfig>>,
    sweeper: Sweeper,
}

impl Worker {
    /// Create a worker with zeroed statistics
    pub fn new(config: SweepConfig) -> Self {
        log_configuration(&config);
        Self {
            config: RwLock::new(Arc::new(config)),
            sweeper: Sweeper::new(),
        }
    }

    /// Create a worker from a host attribute object
    pub fn from_attributes(attributes: &Value) -> Result<Self> {
        Ok(Self::new(SweepConfig::from_attributes(attributes)?))
    }

    /// Snapshot of the active configuration
    pub fn config(&self) -> Arc<SweepConfig> {
        self.config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Swap in a new configuration.
    ///
    /// A run already in progress keeps the snapshot it started with.
    pub fn reconfigure(&self, config: SweepConfig) {
        log_configuration(&config);
        *self.config.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(config);
    }

    pub fn sweeper(&self) -> &Sweeper {
        &self.sweeper
    }

    pub fn stats(&self) -> Stats {
        self.sweeper.stats().snapshot()
    }

    /// Active configuration and the last committed statistics; never waits on a run
    pub fn status(&self) -> StatusReport {
        let config = self.config();
        StatusReport {
            target_path: config.target_path.clone(),
            days_old: config.days_old,
            dry_run: config.dry_run,
            exclude: config.exclude.clone(),
            run_timeout: config.run_timeout,
            target_exists: config.target_path.is_dir(),
            run_in_progress: self.sweeper.is_running(),
            stats: self.stats(),
        }
    }

    /// Execute a command with no external cancellation
    pub async fn dispatch(&self, command: Command) -> Result<CommandResponse> {
        self.dispatch_with_cancel(command, &CancelSignal::new()).await
    }

    /// Execute a command; `cancel` can stop an analyze or sweep run early.
    ///
    /// The configured `run_timeout`, if any, is added as a deadline.
    pub async fn dispatch_with_cancel(
        &self,
        command: Command,
        cancel: &CancelSignal,
    ) -> Result<CommandResponse> {
        debug!("Executing command: {}", command);

        let Some(mode) = command.run_mode() else {
            return Ok(CommandResponse::Status(Box::new(self.status())));
        };

        let config = self.config();
        let cancel = cancel.clone().with_timeout(config.run_timeout);
        let result = self.sweeper.run(&config, mode, &cancel).await?;
        Ok(CommandResponse::Run(Box::new(result)))
    }

    /// Execute a command given by name
    pub async fn dispatch_named(&self, name: &str) -> Result<CommandResponse> {
        let command = name
            .parse::<Command>()
            .inspect_err(|e| error!("{}", e))?;
        self.dispatch(command).await
    }

    /// Execute a `{ "command": ... }` object and serialize the response
    pub async fn do_command_with_cancel(
        &self,
        request: &Value,
        cancel: &CancelSignal,
    ) -> Result<Value> {
        let command = Command::from_request(request).inspect_err(|e| error!("{}", e))?;
        self.dispatch_with_cancel(command, cancel).await?.to_value()
    }
}

#[async_trait]
impl HostResource for Worker {
    fn reconfigure(&self, attributes: &Value) -> Result<()> {
        let config = SweepConfig::from_attributes(attributes)?;
        Worker::reconfigure(self, config);
        Ok(())
    }

    async fn do_command(&self, command: &Value) -> Result<Value> {
        self.do_command_with_cancel(command, &CancelSignal::new())
            .await
    }
}

fn log_configuration(config: &SweepConfig) {
    info!(
        "Worker configured: path={}, days_old={:?}, dry_run={}, exclude={:?}",
        config.target_path.display(),
        config.days_old,
        config.dry_run,
        config.exclude
    );
}
