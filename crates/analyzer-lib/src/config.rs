//! Engine configuration
//!
//! Every threshold and window the pipeline uses lives here, so tests can
//! inject alternate values without touching process-wide state. The defaults
//! mirror the operational tuning the system shipped with.

use std::time::Duration;

/// Default risk tier boundaries (percent mean utilization)
pub const DEFAULT_RISK_HIGH_PCT: f64 = 80.0;
pub const DEFAULT_RISK_MEDIUM_PCT: f64 = 60.0;

/// Default rolling window for anomaly detection (samples)
pub const DEFAULT_ROLLING_WINDOW: usize = 24;

/// Default capacity recommendation boundaries (percent latest utilization)
pub const DEFAULT_SCALE_UP_PCT: f64 = 80.0;
pub const DEFAULT_SCALE_DOWN_PCT: f64 = 20.0;

/// Default minimum samples before a forecast is attempted
pub const DEFAULT_FORECAST_MIN_SAMPLES: usize = 10;

/// Default z value for an 80% uncertainty interval
pub const DEFAULT_INTERVAL_Z: f64 = 1.2816;

/// Configuration for the analysis branch
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Mean utilization above this is High risk
    pub risk_high_pct: f64,
    /// Mean utilization above this (and not High) is Medium risk
    pub risk_medium_pct: f64,
    /// Maximum rolling window, in samples, for anomaly statistics
    pub rolling_window: usize,
    /// Band width in standard deviations; values outside are anomalous
    pub anomaly_band_sigma: f64,
    /// Deviation beyond this many standard deviations is High severity
    pub anomaly_high_sigma: f64,
    /// Latest utilization above this triggers a scale-up recommendation
    pub scale_up_pct: f64,
    /// Latest utilization below this triggers a consolidation recommendation
    pub scale_down_pct: f64,
    /// Resample cadence for trend estimation
    pub trend_bucket: Duration,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            risk_high_pct: DEFAULT_RISK_HIGH_PCT,
            risk_medium_pct: DEFAULT_RISK_MEDIUM_PCT,
            rolling_window: DEFAULT_ROLLING_WINDOW,
            anomaly_band_sigma: 2.0,
            anomaly_high_sigma: 3.0,
            scale_up_pct: DEFAULT_SCALE_UP_PCT,
            scale_down_pct: DEFAULT_SCALE_DOWN_PCT,
            trend_bucket: Duration::from_secs(3600),
        }
    }
}

/// Configuration for the forecasting branch
#[derive(Debug, Clone)]
pub struct ForecastConfig {
    /// Minimum raw samples per (node, metric) pair
    pub min_samples: usize,
    /// Minimum samples remaining after outlier rejection
    pub min_clean_samples: usize,
    /// Points further than this many standard deviations from the series
    /// mean are discarded before fitting
    pub outlier_sigma: f64,
    /// Number of future periods to forecast
    pub horizon_periods: usize,
    /// Duration of one forecast period
    pub period: Duration,
    /// z value applied to the residual standard deviation for the bounds
    pub interval_z: f64,
    /// Maximum predicted value above this raises a Critical alert
    pub critical_max_pct: f64,
    /// Maximum predicted value above this raises a High alert
    pub high_max_pct: f64,
    /// Mean predicted value above this raises a Medium alert
    pub medium_avg_pct: f64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            min_samples: DEFAULT_FORECAST_MIN_SAMPLES,
            min_clean_samples: 5,
            outlier_sigma: 3.0,
            horizon_periods: 24,
            period: Duration::from_secs(3600),
            interval_z: DEFAULT_INTERVAL_Z,
            critical_max_pct: 90.0,
            high_max_pct: 80.0,
            medium_avg_pct: 70.0,
        }
    }
}

impl ForecastConfig {
    /// Human-readable label for the forecast horizon, e.g. "24 hours"
    pub fn horizon_label(&self) -> String {
        let secs = self.period.as_secs() * self.horizon_periods as u64;
        if secs % 3600 == 0 {
            format!("{} hours", secs / 3600)
        } else {
            format!("{} minutes", secs / 60)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_horizon_label() {
        let config = ForecastConfig::default();
        assert_eq!(config.horizon_label(), "24 hours");
    }

    #[test]
    fn test_sub_hourly_horizon_label() {
        let config = ForecastConfig {
            horizon_periods: 6,
            period: Duration::from_secs(600),
            ..Default::default()
        };
        assert_eq!(config.horizon_label(), "60 minutes");
    }
}
