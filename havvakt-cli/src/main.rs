//! ## havvakt-cli
//! Havvakt main entrypoint: continuous geofence monitoring over a live
//! AIS feed, a single-cycle mode for cron-style operation, and a config
//! check command.

use clap::Parser;
use havvakt_telemetry::EventLogger;

mod commands;

use commands::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    EventLogger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => commands::run_monitor(cli.config, args).await,
        Commands::Check => commands::check_config(cli.config).await,
    }
}
