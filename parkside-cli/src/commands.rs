use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tokio::sync::mpsc;
use tracing::info;

use parkside_config::ParksideConfig;
use parkside_driver::{DriverSession, SessionOptions};
use parkside_engine::synthetic::SyntheticFactory;
use parkside_engine::{EngineFactory, RuleVariant};
use parkside_telemetry::metrics::MetricsRecorder;

use crate::render::ConsoleSink;

#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the synthetic simulation until the auto-pause target
    Simulate(SimulateArgs),
    /// Print the closed-form expected arrival frequencies and exit
    Baseline(BaselineArgs),
}

#[derive(Args, Debug, Clone)]
pub struct SimulateArgs {
    /// Optional configuration file; defaults and environment apply otherwise.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Engine seed; identical seeds reproduce identical runs.
    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    /// Use the wait-in-jail rule variant instead of pay-to-exit.
    #[arg(long)]
    pub jail_wait: bool,

    /// Number of auto-pause intervals to run before exiting.
    #[arg(long, default_value_t = 1)]
    pub intervals: u32,
}

#[derive(Args, Debug, Clone)]
pub struct BaselineArgs {
    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    #[arg(long)]
    pub jail_wait: bool,
}

fn variant_for(jail_wait: bool) -> RuleVariant {
    if jail_wait {
        RuleVariant::JailWait
    } else {
        RuleVariant::PayToExit
    }
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<ParksideConfig> {
    match path {
        Some(path) => ParksideConfig::load_from_path(path)
            .with_context(|| format!("loading configuration from {}", path.display())),
        None => ParksideConfig::load().context("loading configuration"),
    }
}

pub async fn run_simulate(args: SimulateArgs, metrics: MetricsRecorder) -> anyhow::Result<()> {
    let config = load_config(args.config.as_ref())?;
    let variant = variant_for(args.jail_wait);

    info!(%variant, seed = args.seed, intervals = args.intervals, "starting simulation");

    let (pause_tx, mut pause_rx) = mpsc::unbounded_channel();
    let sink = ConsoleSink::new(pause_tx);

    let session = DriverSession::spawn(
        config,
        Arc::new(SyntheticFactory { seed: args.seed }),
        Box::new(sink),
        metrics.clone(),
        SessionOptions {
            variant,
            autostart: true,
        },
    )?;

    for interval in 1..=args.intervals {
        pause_rx
            .recv()
            .await
            .context("session ended before reaching its target")?;

        if interval < args.intervals {
            info!(interval, "target reached, resuming");
            session.start();
        }
    }

    session.shutdown().await?;

    tracing::debug!(metrics = %metrics.gather_metrics()?, "session metrics");
    Ok(())
}

pub fn run_baseline(args: BaselineArgs) -> anyhow::Result<()> {
    let variant = variant_for(args.jail_wait);
    let factory = SyntheticFactory { seed: args.seed };

    let engine = factory.create(variant)?;
    let frequencies = engine.expected_frequencies(variant);

    println!("expected arrival frequencies ({variant})");
    for (space, freq) in engine.spaces().iter().zip(&frequencies) {
        println!("{:>4}  {:.5}", space.kind.code(), freq);
    }

    Ok(())
}
