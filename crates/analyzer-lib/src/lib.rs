//! Analysis and forecasting engine for fleet capacity monitoring
//!
//! This crate provides the core functionality for:
//! - Reading the append-only hypervisor sample stream
//! - Deriving utilization, efficiency, and waste metrics
//! - Per-node summaries, risk tiers, trends, and anomaly detection
//! - Cluster capacity analysis with threshold recommendations
//! - Per-(node, metric) forecasting with severity-tiered alerts
//! - Run-keyed artifact persistence with latest pointers

pub mod analysis;
pub mod config;
pub mod error;
pub mod forecast;
pub mod models;
pub mod observability;
pub mod store;

pub use analysis::{AnalysisOutcome, MetricsAnalyzer};
pub use config::{AnalyzerConfig, ForecastConfig};
pub use error::{AnalyzerError, Result};
pub use forecast::{ForecastOutcome, UsageForecaster};
pub use models::*;
pub use observability::RunLogger;
pub use store::{ArtifactKind, ArtifactStore, RunId, SampleStore};
