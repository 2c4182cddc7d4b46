use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use tracing::info;

use havvakt_config::HavvaktConfig;
use havvakt_core::GeofencePolygon;
use havvakt_engine::MonitorRuntime;
use havvakt_telemetry::MetricsRecorder;

#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    /// Path to a YAML configuration file; defaults to config/havvakt.yaml
    /// plus HAVVAKT_* environment overrides.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Monitor the restricted area continuously (or once with --once)
    Run(RunArgs),
    /// Validate the configuration and the geofence file, then exit
    Check,
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Run a single evaluation cycle and exit (for cron-style scheduling)
    #[arg(long)]
    pub once: bool,
}

fn load_config(
    path: Option<PathBuf>,
) -> Result<HavvaktConfig, Box<dyn std::error::Error + Send + Sync>> {
    let config = match path {
        Some(path) => HavvaktConfig::load_from_path(path)?,
        None => HavvaktConfig::load()?,
    };
    Ok(config)
}

pub async fn run_monitor(
    config_path: Option<PathBuf>,
    args: RunArgs,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = load_config(config_path)?;
    let metrics = Arc::new(MetricsRecorder::new());
    let runtime = MonitorRuntime::new(config, metrics.clone())?;

    if args.once {
        let summary = runtime.run_once().await;
        info!(
            fixes = summary.fixes_seen,
            dropped = summary.fixes_dropped,
            alerts = summary.alerts,
            vessels = summary.tracked_vessels,
            "single cycle complete"
        );
        print!("{}", metrics.gather_metrics()?);
        return Ok(());
    }

    runtime.run_forever().await;
    Ok(())
}

/// Loads the configuration, parses the geofence and reports what would run.
/// Fails with a nonzero exit on any validation error.
pub async fn check_config(
    config_path: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = load_config(config_path)?;
    let raw = std::fs::read_to_string(&config.monitor.geofence_path)?;
    let geofence = GeofencePolygon::from_geojson(&raw)?;

    println!("configuration OK");
    println!(
        "  geofence: {} ({})",
        config.monitor.geofence_path.display(),
        geofence.name().unwrap_or("unnamed")
    );
    println!("  check interval: {}s", config.monitor.check_interval_secs);
    println!(
        "  trail window: {}h",
        config.monitor.trail_window_hours
    );
    println!(
        "  email alerts: {}",
        if config.alerts.enabled { "enabled" } else { "disabled" }
    );
    println!(
        "  geojson export: {}",
        if config.export.enabled {
            config.export.dir.display().to_string()
        } else {
            "disabled".to_string()
        }
    );
    println!(
        "  sqlite storage: {}",
        if config.storage.enabled {
            config.storage.db_path.display().to_string()
        } else {
            "disabled".to_string()
        }
    );
    Ok(())
}
