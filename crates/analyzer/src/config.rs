//! Engine settings
//!
//! Loaded from `ANALYZER_`-prefixed environment variables over serde
//! defaults, then converted into the library's explicit config structs so
//! nothing downstream reads process-wide state.

use analyzer_lib::{AnalyzerConfig, ArtifactStore, ForecastConfig, SampleStore};
use anyhow::Result;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Engine settings
#[derive(Debug, Clone, Deserialize)]
pub struct EngineSettings {
    /// Base data directory
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Sample store file name, relative to the data directory
    #[serde(default = "default_metrics_file")]
    pub metrics_file: String,

    /// Artifact root, relative to the data directory
    #[serde(default = "default_artifacts_dir")]
    pub artifacts_dir: String,

    /// Rolling window for anomaly detection, in samples
    #[serde(default = "default_rolling_window")]
    pub rolling_window: usize,

    /// Trend resample bucket in seconds
    #[serde(default = "default_trend_bucket_secs")]
    pub trend_bucket_secs: u64,

    /// Number of future periods to forecast
    #[serde(default = "default_forecast_periods")]
    pub forecast_periods: usize,

    /// Duration of one forecast period in seconds
    #[serde(default = "default_forecast_period_secs")]
    pub forecast_period_secs: u64,
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_metrics_file() -> String {
    "metrics.jsonl".to_string()
}

fn default_artifacts_dir() -> String {
    "artifacts".to_string()
}

fn default_rolling_window() -> usize {
    24
}

fn default_trend_bucket_secs() -> u64 {
    3600
}

fn default_forecast_periods() -> usize {
    24
}

fn default_forecast_period_secs() -> u64 {
    3600
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            metrics_file: default_metrics_file(),
            artifacts_dir: default_artifacts_dir(),
            rolling_window: default_rolling_window(),
            trend_bucket_secs: default_trend_bucket_secs(),
            forecast_periods: default_forecast_periods(),
            forecast_period_secs: default_forecast_period_secs(),
        }
    }
}

impl EngineSettings {
    /// Load settings from the environment
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("ANALYZER"))
            .build()?;

        Ok(config.try_deserialize().unwrap_or_default())
    }

    pub fn sample_store(&self) -> SampleStore {
        SampleStore::new(Path::new(&self.data_dir).join(&self.metrics_file))
    }

    pub fn artifact_store(&self) -> ArtifactStore {
        ArtifactStore::new(Path::new(&self.data_dir).join(&self.artifacts_dir))
    }

    pub fn analyzer_config(&self) -> AnalyzerConfig {
        AnalyzerConfig {
            rolling_window: self.rolling_window,
            trend_bucket: Duration::from_secs(self.trend_bucket_secs),
            ..Default::default()
        }
    }

    pub fn forecast_config(&self) -> ForecastConfig {
        ForecastConfig {
            horizon_periods: self.forecast_periods,
            period: Duration::from_secs(self.forecast_period_secs),
            ..Default::default()
        }
    }
}
