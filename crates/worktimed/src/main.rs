//! worktimed - working-hours enforcement for tagged cloud instances
//!
//! One invocation per process:
//! - Configuration loading
//! - AWS provider construction
//! - A single pass over compute and database instances
//! - The textual report on stdout

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use worktime_cloud_aws::AwsCloud;
use worktime_config::{Policy, load_config};
use worktime_core::{InvocationContext, Runner};
use worktime_util::{
    Clock, FixedClock, SystemClock, WORKTIME_CONFIG_ENV, default_config_path, is_mock_time_active,
};

/// worktimed - Start and stop tagged instances according to their working hours
#[derive(Parser, Debug)]
#[command(name = "worktimed")]
#[command(about = "Start and stop tagged instances according to their working hours", long_about = None)]
struct Args {
    /// Configuration file path (default: ~/.config/worktime/config.toml)
    #[arg(short, long, env = WORKTIME_CONFIG_ENV)]
    config: Option<PathBuf>,

    /// Evaluate at this instant instead of now (RFC 3339)
    #[arg(long, value_parser = parse_instant)]
    at: Option<DateTime<Utc>>,

    /// Report what would be started or stopped without doing it
    #[arg(long)]
    dry_run: bool,

    /// JSON trigger payload to record with the invocation
    #[arg(long)]
    event: Option<PathBuf>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

fn parse_instant(value: &str) -> std::result::Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("expected an RFC 3339 timestamp: {}", e))
}

/// An explicit path must exist; a missing default file falls back to built-in defaults
fn resolve_policy(explicit: Option<&Path>) -> Result<Policy> {
    let (path, explicit) = match explicit {
        Some(path) => (path.to_path_buf(), true),
        None => (default_config_path(), false),
    };

    if !explicit && !path.exists() {
        info!(
            config_path = %path.display(),
            "No configuration file, using built-in defaults"
        );
        return Ok(Policy::default());
    }

    let policy = load_config(&path)
        .with_context(|| format!("Failed to load config from {:?}", path))?;

    info!(
        config_path = %path.display(),
        timezone = %policy.schedule.timezone,
        excluded_envs = ?policy.schedule.excluded_envs,
        "Configuration loaded"
    );

    Ok(policy)
}

fn read_event(path: Option<&Path>) -> Result<serde_json::Value> {
    let Some(path) = path else {
        return Ok(serde_json::Value::Null);
    };
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read event from {:?}", path))?;
    serde_json::from_str(&contents).with_context(|| format!("Invalid JSON in {:?}", path))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "worktimed starting"
    );

    let policy = resolve_policy(args.config.as_deref())?;
    let event = read_event(args.event.as_deref())?;

    let clock: Arc<dyn Clock> = match args.at {
        Some(at) => {
            info!(at = %at, "Evaluating at a fixed instant");
            Arc::new(FixedClock::new(at))
        }
        None => {
            if is_mock_time_active() {
                warn!("Mock time is active; evaluation time is offset");
            }
            Arc::new(SystemClock)
        }
    };

    let cloud = AwsCloud::from_settings(&policy.aws)
        .await
        .context("Failed to initialize AWS provider")?;

    let source = if args.event.is_some() { "event" } else { "cli" };
    let runner = Runner::new(Arc::new(cloud), policy, clock).with_dry_run(args.dry_run);
    runner
        .handle_invocation(&event, &InvocationContext::new(source))
        .await
        .context("Run aborted")?;

    Ok(())
}
