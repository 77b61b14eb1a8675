//! Per-(node, metric) usage forecasting
//!
//! Fits one seasonal trend model per (node, metric) pair over the retained
//! window and produces point forecasts with uncertainty bounds for the
//! configured horizon. Pair fits are mutually independent: each reads only
//! its own slice of the window, so they fan out as parallel blocking tasks
//! and a failure in one never cancels its siblings.

mod accuracy;
mod model;
mod recommend;
mod report;

pub use accuracy::{accuracy, ForecastAccuracy};
pub use model::{SeasonalTrendModel, MODEL_TYPE};
pub use recommend::generate_alerts;
pub use report::render_forecast_report;

use crate::analysis::derive_all;
use crate::config::ForecastConfig;
use crate::error::{AnalyzerError, Result};
use crate::models::{ForecastRow, Metric};
use crate::observability::RunLogger;
use crate::store::{ArtifactKind, ArtifactStore, RunId, SampleStore};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tracing::warn;

/// What one forecast run produced
#[derive(Debug, Clone)]
pub struct ForecastOutcome {
    pub run_id: RunId,
    pub pairs_attempted: usize,
    pub pairs_skipped: usize,
    pub rows: usize,
    pub alerts: usize,
}

/// The forecasting branch of the engine
pub struct UsageForecaster {
    config: ForecastConfig,
    store: SampleStore,
    artifacts: ArtifactStore,
    logger: RunLogger,
}

impl UsageForecaster {
    pub fn new(config: ForecastConfig, store: SampleStore, artifacts: ArtifactStore) -> Self {
        Self {
            config,
            store,
            artifacts,
            logger: RunLogger::new("forecast"),
        }
    }

    /// Forecast every (node, metric) pair and persist the results.
    ///
    /// A run that produces zero forecasts (every pair skipped) is a soft
    /// failure: it is logged and reported in the outcome, but the previous
    /// artifact set stays in place and the call still succeeds.
    pub async fn run(&self, now: DateTime<Utc>) -> Result<ForecastOutcome> {
        self.logger.log_run_started(self.store.path());

        let samples = self.store.read_samples().inspect_err(|e| {
            if e.is_recoverable() {
                self.logger.log_no_data(self.store.path());
            }
        })?;
        let records = derive_all(samples);

        // One series per (node, metric) pair, in stable order
        let mut series: BTreeMap<(String, Metric), Vec<(DateTime<Utc>, f64)>> = BTreeMap::new();
        for record in &records {
            for metric in Metric::ALL {
                series
                    .entry((record.sample.node.clone(), metric))
                    .or_default()
                    .push((record.sample.timestamp, record.utilization(metric)));
            }
        }

        let mut handles = Vec::with_capacity(series.len());
        for ((node, metric), points) in series {
            let config = self.config.clone();
            let task_node = node.clone();
            handles.push((
                node,
                metric,
                tokio::task::spawn_blocking(move || {
                    forecast_pair(&task_node, metric, &points, &config, now)
                }),
            ));
        }

        let pairs_attempted = handles.len();
        let mut pairs_skipped = 0usize;
        let mut rows: Vec<ForecastRow> = Vec::new();
        for (node, metric, handle) in handles {
            match handle.await {
                Ok(Ok(pair_rows)) => {
                    self.logger
                        .log_forecast_generated(&node, metric, pair_rows.len());
                    rows.extend(pair_rows);
                }
                Ok(Err(e)) if e.is_recoverable() => {
                    pairs_skipped += 1;
                    self.logger.log_pair_skipped(&node, metric, &e.to_string());
                }
                Ok(Err(e)) => {
                    pairs_skipped += 1;
                    self.logger.log_pair_failed(&node, metric, &e.to_string());
                }
                // A panicking fit is isolated to its own pair
                Err(join_err) => {
                    pairs_skipped += 1;
                    self.logger
                        .log_pair_failed(&node, metric, &join_err.to_string());
                }
            }
        }

        let run = RunId::from_timestamp(now);
        if rows.is_empty() {
            warn!(
                event = "no_forecasts",
                component = "forecast",
                pairs_attempted = pairs_attempted,
                "No forecasts generated this run"
            );
            return Ok(ForecastOutcome {
                run_id: run,
                pairs_attempted,
                pairs_skipped,
                rows: 0,
                alerts: 0,
            });
        }

        let alerts = generate_alerts(&rows, now, &self.config);

        let forecasts_path = self
            .artifacts
            .write_json(ArtifactKind::Forecasts, &run, &rows)?;
        self.logger
            .log_artifact_written(ArtifactKind::Forecasts, &forecasts_path);
        let alerts_path = self
            .artifacts
            .write_json(ArtifactKind::Recommendations, &run, &alerts)?;
        self.logger
            .log_artifact_written(ArtifactKind::Recommendations, &alerts_path);
        let report_path = self.artifacts.write_text(
            ArtifactKind::ForecastReport,
            &run,
            &render_forecast_report(now, &rows, &alerts),
        )?;
        self.logger
            .log_artifact_written(ArtifactKind::ForecastReport, &report_path);
        self.logger.log_run_completed(&run);

        Ok(ForecastOutcome {
            run_id: run,
            pairs_attempted,
            pairs_skipped,
            rows: rows.len(),
            alerts: alerts.len(),
        })
    }
}

/// Discard points further than `sigma` standard deviations from the series
/// mean. A flat series (zero deviation) is returned unchanged.
fn reject_outliers(
    points: &[(DateTime<Utc>, f64)],
    sigma: f64,
) -> Vec<(DateTime<Utc>, f64)> {
    let n = points.len();
    if n < 2 {
        return points.to_vec();
    }
    let mean = points.iter().map(|(_, y)| y).sum::<f64>() / n as f64;
    let var = points.iter().map(|(_, y)| (y - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    let std_dev = var.sqrt();
    if std_dev < f64::EPSILON {
        return points.to_vec();
    }
    points
        .iter()
        .filter(|(_, y)| (y - mean).abs() <= sigma * std_dev)
        .cloned()
        .collect()
}

/// Fit and forecast one (node, metric) series.
///
/// Preprocessing drops non-finite values and then rejects outliers once;
/// the thresholds are not re-applied iteratively.
fn forecast_pair(
    node: &str,
    metric: Metric,
    points: &[(DateTime<Utc>, f64)],
    config: &ForecastConfig,
    now: DateTime<Utc>,
) -> Result<Vec<ForecastRow>> {
    let finite: Vec<(DateTime<Utc>, f64)> = points
        .iter()
        .filter(|(_, y)| y.is_finite())
        .cloned()
        .collect();
    if finite.len() < config.min_samples {
        return Err(AnalyzerError::InsufficientSamples {
            node: node.to_string(),
            metric,
            have: finite.len(),
            need: config.min_samples,
        });
    }

    let clean = reject_outliers(&finite, config.outlier_sigma);
    if clean.len() < config.min_clean_samples {
        return Err(AnalyzerError::InsufficientSamples {
            node: node.to_string(),
            metric,
            have: clean.len(),
            need: config.min_clean_samples,
        });
    }

    let model =
        SeasonalTrendModel::fit(&clean).ok_or_else(|| AnalyzerError::Computation {
            context: format!("{}/{}", node, metric),
            detail: "model fit rejected series".to_string(),
        })?;

    let actual: Vec<f64> = clean.iter().map(|(_, y)| *y).collect();
    let predicted: Vec<f64> = clean.iter().map(|(ts, _)| model.predict(*ts)).collect();
    let acc = accuracy(&actual, &predicted);

    let period = chrono::Duration::from_std(config.period).map_err(|e| {
        AnalyzerError::Computation {
            context: format!("{}/{}", node, metric),
            detail: format!("invalid forecast period: {}", e),
        }
    })?;
    let last_ts = match clean.last() {
        Some((ts, _)) => *ts,
        None => {
            return Err(AnalyzerError::Computation {
                context: format!("{}/{}", node, metric),
                detail: "empty series after preprocessing".to_string(),
            })
        }
    };

    let rows = (1..=config.horizon_periods)
        .map(|step| {
            let ts = last_ts + period * step as i32;
            let (lower_bound, upper_bound) = model.bounds(ts, config.interval_z);
            ForecastRow {
                timestamp: ts,
                node: node.to_string(),
                metric,
                forecast: model.predict(ts),
                lower_bound,
                upper_bound,
                model_type: MODEL_TYPE.to_string(),
                created_at: now,
                mae: acc.mae,
                mape: acc.mape,
                rmse: acc.rmse,
            }
        })
        .collect();
    Ok(rows)
}
