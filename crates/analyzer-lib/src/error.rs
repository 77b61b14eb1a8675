//! Error types for the analysis and forecasting engine.
//!
//! The taxonomy separates recoverable conditions (no data yet, a series that
//! is too short) from genuine failures. Callers are expected to skip the
//! affected unit of work on recoverable errors and continue the run.

use crate::models::Metric;
use std::path::PathBuf;
use thiserror::Error;

/// Result alias for engine operations
pub type Result<T> = std::result::Result<T, AnalyzerError>;

/// Error type for all engine operations
#[derive(Error, Debug)]
pub enum AnalyzerError {
    /// The backing sample store does not exist or holds no samples.
    ///
    /// Recoverable: the collector has not produced data yet.
    #[error("sample store unavailable at {path}")]
    DataUnavailable { path: PathBuf },

    /// A (node, metric) series is too short for the requested computation.
    ///
    /// Recoverable: the pair is skipped, the run continues.
    #[error("insufficient samples for {node}/{metric}: have {have}, need {need}")]
    InsufficientSamples {
        node: String,
        metric: Metric,
        have: usize,
        need: usize,
    },

    /// Unexpected numeric failure during a model fit or aggregation
    #[error("computation failed for {context}: {detail}")]
    Computation { context: String, detail: String },

    #[error("artifact I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("artifact serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AnalyzerError {
    /// Whether the caller should treat this as "skip and continue"
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AnalyzerError::DataUnavailable { .. } | AnalyzerError::InsufficientSamples { .. }
        )
    }
}
