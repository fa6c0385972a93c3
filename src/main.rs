use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use disk_sweeper::config::{env_attributes, load_attributes_file};
use disk_sweeper::{CancelSignal, Command, SweepAttributes, Worker};
use tracing::{debug, error, trace, warn};
use tracing_subscriber::EnvFilter;

/// Delete stale subdirectories to reclaim disk space
#[derive(Parser)]
#[command(name = "disk-sweeper")]
#[command(
    about = "Disk Sweeper - Reclaim space by removing orphaned directories",
    long_about = None
)]
struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a TOML or JSON configuration file
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    /// Directory whose immediate subdirectories are swept
    #[arg(long, global = true)]
    target_path: Option<String>,

    /// Age in days past which a subdirectory counts as orphaned
    #[arg(long, global = true)]
    days_old: Option<u64>,

    /// Report what a sweep would delete without deleting anything
    /// (`--dry-run=false` overrides a dry run set by file or environment)
    #[arg(
        long,
        global = true,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    dry_run: Option<bool>,

    /// Subdirectory name never to sweep (repeatable)
    #[arg(long = "exclude", global = true)]
    exclude: Vec<String>,

    /// Cancel a run that takes longer than this many seconds
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show configuration and cumulative statistics (default command)
    Status,
    /// Report orphaned directories without deleting them
    Analyze,
    /// Delete orphaned directories (respects --dry-run)
    Sweep,
    /// Execute a raw command object, e.g. '{"command": "analyze"}'
    Exec {
        /// JSON command object
        request: String,
    },
}

impl Cli {
    fn attributes(&self) -> SweepAttributes {
        SweepAttributes {
            target_path: self.target_path.clone(),
            days_old: self.days_old.map(|days| days as f64),
            dry_run: self.dry_run,
            exclude: (!self.exclude.is_empty()).then(|| self.exclude.clone()),
            run_timeout: self.timeout_secs.map(Duration::from_secs),
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(cli.verbose >= 2)
        .init();

    debug!("disk-sweeper started with verbosity level: {}", cli.verbose);
    trace!("Full CLI args: {:?}", std::env::args().collect::<Vec<_>>());

    if let Err(e) = run(cli).await {
        error!("Fatal error: {:#}", e);
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut attributes = SweepAttributes::default();
    if let Some(path) = &cli.config {
        attributes = load_attributes_file(path).await?;
    }
    attributes = attributes.merge(env_attributes()?).merge(cli.attributes());

    let worker = Worker::new(attributes.validate()?);

    let cancel = CancelSignal::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received; cancelling the current run");
            on_interrupt.cancel();
        }
    });

    let command = match cli.command.unwrap_or(Commands::Status) {
        Commands::Status => Command::Status,
        Commands::Analyze => Command::Analyze,
        Commands::Sweep => Command::Sweep,
        Commands::Exec { request } => {
            let request: serde_json::Value =
                serde_json::from_str(&request).context("Command must be a JSON object")?;
            Command::from_request(&request)?
        }
    };

    let output = worker.dispatch_with_cancel(command, &cancel).await?.to_value()?;

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
