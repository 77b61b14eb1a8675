//! Capacity analyzer - batch analysis and forecasting entry point
//!
//! Invoked by an external scheduler on fixed intervals. Each invocation
//! makes one pass over the retained sample window and persists a fresh,
//! timestamp-keyed artifact set; `show` renders the latest artifacts for
//! an operator terminal.

use analyzer_lib::{MetricsAnalyzer, UsageForecaster};
use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod output;

use config::EngineSettings;
use output::ShowTarget;

#[derive(Parser)]
#[command(
    name = "capacity-analyzer",
    about = "Fleet capacity analysis and forecasting",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze the retained window: summaries, trends, anomalies, capacity
    Analyze,
    /// Forecast utilization per (node, metric) and derive alerts
    Forecast,
    /// Run analysis followed by forecasting
    Run,
    /// Render the latest persisted artifacts
    Show {
        /// Artifact to render
        #[arg(value_enum, default_value_t = ShowTarget::Summary)]
        target: ShowTarget,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // JSON logs with env filter; the scheduler captures stdout
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    let cli = Cli::parse();
    let settings = EngineSettings::load()?;

    match cli.command {
        Command::Analyze => run_analysis(&settings)?,
        Command::Forecast => run_forecast(&settings).await?,
        Command::Run => {
            run_analysis(&settings)?;
            run_forecast(&settings).await?;
        }
        Command::Show { target } => output::show(&settings.artifact_store(), target)?,
    }

    Ok(())
}

fn run_analysis(settings: &EngineSettings) -> Result<()> {
    let analyzer = MetricsAnalyzer::new(
        settings.analyzer_config(),
        settings.sample_store(),
        settings.artifact_store(),
    );
    let outcome = analyzer.run(Utc::now())?;
    info!(
        run = %outcome.run_id,
        samples = outcome.samples,
        nodes = outcome.nodes,
        anomalies = outcome.anomalies,
        "Analysis completed"
    );
    Ok(())
}

async fn run_forecast(settings: &EngineSettings) -> Result<()> {
    let forecaster = UsageForecaster::new(
        settings.forecast_config(),
        settings.sample_store(),
        settings.artifact_store(),
    );
    let outcome = forecaster.run(Utc::now()).await?;
    info!(
        run = %outcome.run_id,
        pairs = outcome.pairs_attempted,
        skipped = outcome.pairs_skipped,
        rows = outcome.rows,
        alerts = outcome.alerts,
        "Forecasting completed"
    );
    Ok(())
}
