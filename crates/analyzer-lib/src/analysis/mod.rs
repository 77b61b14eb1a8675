//! Batch analysis pipeline
//!
//! One invocation reads the full retained sample window and produces the
//! analysis-branch artifacts: node summaries with risk tiers, trend slopes,
//! the cluster capacity roll-up with recommendations, the anomaly list, and
//! the combined plain-text report.

mod anomaly;
mod capacity;
mod report;
mod summary;
mod trend;
pub(crate) mod utilization;


pub use anomaly::detect_anomalies;
pub use capacity::analyze_capacity;
pub use report::render_analysis_report;
pub use summary::summarize;
pub use trend::estimate_trends;
pub use utilization::{derive, derive_all, ratio_pct};

use crate::config::AnalyzerConfig;
use crate::error::Result;
use crate::observability::RunLogger;
use crate::store::{ArtifactKind, ArtifactStore, RunId, SampleStore};
use chrono::{DateTime, Utc};

/// What one analysis run produced
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub run_id: RunId,
    pub samples: usize,
    pub nodes: usize,
    pub anomalies: usize,
}

/// The analysis branch of the engine.
///
/// Each run is a pure function of the retained window: it recomputes every
/// derived entity from raw samples and persists a fresh artifact set under
/// a new run id. No aggregation step can abort another; the only hard
/// failure before artifact I/O is an unreadable sample store.
pub struct MetricsAnalyzer {
    config: AnalyzerConfig,
    store: SampleStore,
    artifacts: ArtifactStore,
    logger: RunLogger,
}

impl MetricsAnalyzer {
    pub fn new(config: AnalyzerConfig, store: SampleStore, artifacts: ArtifactStore) -> Self {
        Self {
            config,
            store,
            artifacts,
            logger: RunLogger::new("analysis"),
        }
    }

    /// Run the full analysis over the retained window.
    ///
    /// `now` stamps the run id and the report; tests inject fixed clocks.
    /// Returns [`crate::error::AnalyzerError::DataUnavailable`] when the
    /// store has no samples yet; callers treat that as "nothing to do".
    pub fn run(&self, now: DateTime<Utc>) -> Result<AnalysisOutcome> {
        self.logger.log_run_started(self.store.path());

        let samples = self.store.read_samples().inspect_err(|e| {
            if e.is_recoverable() {
                self.logger.log_no_data(self.store.path());
            }
        })?;
        let sample_count = samples.len();
        let records = utilization::derive_all(samples);

        let summaries = summarize(&records, &self.config);
        let trends = estimate_trends(&records, &self.config);
        let capacity = analyze_capacity(&records, &self.config);
        let anomalies = detect_anomalies(&records, &self.config);
        self.logger.log_anomalies_detected(anomalies.len());

        let run = RunId::from_timestamp(now);
        let writes = [
            self.artifacts
                .write_json(ArtifactKind::NodeSummary, &run, &summaries)?,
            self.artifacts
                .write_json(ArtifactKind::Trends, &run, &trends)?,
            self.artifacts
                .write_json(ArtifactKind::CapacityAnalysis, &run, &capacity)?,
            self.artifacts
                .write_json(ArtifactKind::Anomalies, &run, &anomalies)?,
            self.artifacts.write_text(
                ArtifactKind::AnalysisReport,
                &run,
                &render_analysis_report(now, &capacity, &summaries, &anomalies),
            )?,
        ];
        for (kind, path) in [
            ArtifactKind::NodeSummary,
            ArtifactKind::Trends,
            ArtifactKind::CapacityAnalysis,
            ArtifactKind::Anomalies,
            ArtifactKind::AnalysisReport,
        ]
        .iter()
        .zip(&writes)
        {
            self.logger.log_artifact_written(*kind, path);
        }
        self.logger.log_run_completed(&run);

        Ok(AnalysisOutcome {
            run_id: run,
            samples: sample_count,
            nodes: summaries.len(),
            anomalies: anomalies.len(),
        })
    }
}
