//! Structured event logging for engine runs
//!
//! Wraps `tracing` so every significant pipeline event carries the same
//! shape: an `event` tag plus typed fields. The binary installs a JSON
//! subscriber, so downstream log tooling can filter on these fields.

use crate::models::Metric;
use crate::store::{ArtifactKind, RunId};
use std::path::Path;
use tracing::{info, warn};

/// Structured logger scoped to one pipeline branch ("analysis" or "forecast")
#[derive(Clone)]
pub struct RunLogger {
    component: &'static str,
}

impl RunLogger {
    pub fn new(component: &'static str) -> Self {
        Self { component }
    }

    pub fn log_run_started(&self, store_path: &Path) {
        info!(
            event = "run_started",
            component = self.component,
            store = %store_path.display(),
            "Starting run"
        );
    }

    pub fn log_no_data(&self, store_path: &Path) {
        warn!(
            event = "no_data",
            component = self.component,
            store = %store_path.display(),
            "No samples available yet, skipping run"
        );
    }

    pub fn log_anomalies_detected(&self, count: usize) {
        info!(
            event = "anomalies_detected",
            component = self.component,
            count = count,
            "Detected anomalies"
        );
    }

    pub fn log_pair_skipped(&self, node: &str, metric: Metric, reason: &str) {
        info!(
            event = "pair_skipped",
            component = self.component,
            node = %node,
            metric = %metric,
            reason = %reason,
            "Skipping series"
        );
    }

    pub fn log_pair_failed(&self, node: &str, metric: Metric, error: &str) {
        warn!(
            event = "pair_failed",
            component = self.component,
            node = %node,
            metric = %metric,
            error = %error,
            "Series computation failed"
        );
    }

    pub fn log_forecast_generated(&self, node: &str, metric: Metric, rows: usize) {
        info!(
            event = "forecast_generated",
            component = self.component,
            node = %node,
            metric = %metric,
            rows = rows,
            "Generated forecast"
        );
    }

    pub fn log_artifact_written(&self, kind: ArtifactKind, path: &Path) {
        info!(
            event = "artifact_written",
            component = self.component,
            kind = kind.dir_name(),
            path = %path.display(),
            "Wrote artifact"
        );
    }

    pub fn log_run_completed(&self, run: &RunId) {
        info!(
            event = "run_completed",
            component = self.component,
            run = %run,
            "Run completed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_logger_creation() {
        let logger = RunLogger::new("analysis");
        assert_eq!(logger.component, "analysis");
    }
}
