//! ## parkside-cli
//! **Operational entrypoint**
//! Runs a driver session against the built-in synthetic engine and renders
//! leaderboard, turn and dice statistics to the console.

use clap::Parser;
use parkside_telemetry::logging::EventLogger;
use parkside_telemetry::metrics::MetricsRecorder;

mod commands;
mod render;

use commands::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    EventLogger::init();
    let metrics = MetricsRecorder::new();
    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate(args) => commands::run_simulate(args, metrics).await,
        Commands::Baseline(args) => commands::run_baseline(args),
    }
}
