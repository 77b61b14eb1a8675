//! Core data models for the capacity analyzer

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One resource observation reported by a hypervisor node.
///
/// Totals are expected to be non-negative and `used <= total`, but neither is
/// enforced here; downstream computations must tolerate violations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HypervisorSample {
    pub timestamp: DateTime<Utc>,
    pub node: String,
    pub vcpus_used: f64,
    pub vcpus_total: f64,
    pub memory_used_mb: f64,
    pub memory_total_mb: f64,
    pub disk_used_gb: f64,
    pub disk_total_gb: f64,
    pub instances: u32,
    pub total_instance_vcpus: f64,
    pub total_instance_memory_mb: f64,
    pub hypervisor_type: String,
    pub state: String,
    pub status: String,
}

/// Sample plus derived percentage metrics.
///
/// Always computed from the raw sample, never trusted from upstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UtilizationRecord {
    #[serde(flatten)]
    pub sample: HypervisorSample,
    pub cpu_utilization: f64,
    pub memory_utilization: f64,
    pub disk_utilization: f64,
    pub cpu_efficiency: f64,
    pub memory_efficiency: f64,
    pub cpu_waste: f64,
    pub memory_waste: f64,
}

impl UtilizationRecord {
    /// Utilization value for a given metric
    pub fn utilization(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Cpu => self.cpu_utilization,
            Metric::Memory => self.memory_utilization,
            Metric::Disk => self.disk_utilization,
        }
    }
}

/// Utilization metric identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Metric {
    #[serde(rename = "cpu_utilization")]
    Cpu,
    #[serde(rename = "memory_utilization")]
    Memory,
    #[serde(rename = "disk_utilization")]
    Disk,
}

impl Metric {
    /// All metrics, in reporting order
    pub const ALL: [Metric; 3] = [Metric::Cpu, Metric::Memory, Metric::Disk];

    /// Column name used in persisted artifacts and alert messages
    pub fn column(&self) -> &'static str {
        match self {
            Metric::Cpu => "cpu_utilization",
            Metric::Memory => "memory_utilization",
            Metric::Disk => "disk_utilization",
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.column())
    }
}

/// Risk tier for a utilization metric. Ordering is by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Risk {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Risk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Risk::Low => write!(f, "Low"),
            Risk::Medium => write!(f, "Medium"),
            Risk::High => write!(f, "High"),
        }
    }
}

/// Aggregate statistics for one metric over the retained window
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MetricStats {
    pub mean: f64,
    pub max: f64,
    pub min: f64,
    /// Sample standard deviation; 0 for a single observation
    pub std_dev: f64,
}

/// Instance-count statistics over the retained window
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct InstanceStats {
    pub mean: f64,
    pub max: u32,
    pub min: u32,
}

/// Per-node summary row: window statistics, static capacity, and risk tiers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSummary {
    pub node: String,
    pub cpu_utilization: MetricStats,
    pub memory_utilization: MetricStats,
    pub disk_utilization: MetricStats,
    pub instances: InstanceStats,
    /// Capacity as first observed for this node
    pub vcpus_total: f64,
    pub memory_total_mb: f64,
    pub disk_total_gb: f64,
    pub cpu_efficiency_mean: f64,
    pub memory_efficiency_mean: f64,
    pub cpu_waste_mean: f64,
    pub memory_waste_mean: f64,
    pub cpu_risk: Risk,
    pub memory_risk: Risk,
    pub disk_risk: Risk,
    pub overall_risk: Risk,
}

/// Severity of a detected anomaly
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AnomalySeverity {
    Medium,
    High,
}

impl std::fmt::Display for AnomalySeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnomalySeverity::Medium => write!(f, "Medium"),
            AnomalySeverity::High => write!(f, "High"),
        }
    }
}

/// A sample flagged as a statistical outlier against its rolling band
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Anomaly {
    pub timestamp: DateTime<Utc>,
    pub node: String,
    pub metric: Metric,
    pub value: f64,
    /// Lower edge of the rolling band at the time of this sample
    pub expected_low: f64,
    /// Upper edge of the rolling band at the time of this sample
    pub expected_high: f64,
    pub severity: AnomalySeverity,
}

impl Anomaly {
    /// Expected range formatted for reports
    pub fn expected_range(&self) -> String {
        format!("{:.2} - {:.2}", self.expected_low, self.expected_high)
    }
}

/// Linear trend slopes for one node, in percent per resample bucket
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NodeTrend {
    pub cpu_trend: f64,
    pub memory_trend: f64,
    pub disk_trend: f64,
    /// Number of resampled buckets the fit used
    pub data_points: usize,
}

/// Trends keyed by node name
pub type TrendMap = BTreeMap<String, NodeTrend>;

/// Cluster-wide capacity totals from the latest sample per node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterCapacity {
    pub total_nodes: usize,
    pub total_instances: u64,
    pub total_vcpus: f64,
    pub used_vcpus: f64,
    pub available_vcpus: f64,
    pub cpu_utilization: f64,
    pub total_memory_gb: f64,
    pub used_memory_gb: f64,
    pub available_memory_gb: f64,
    pub memory_utilization: f64,
    pub total_disk_gb: f64,
    pub used_disk_gb: f64,
    pub available_disk_gb: f64,
    pub disk_utilization: f64,
}

/// Threshold-driven recommendations for one node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeRecommendation {
    pub node: String,
    pub cpu_utilization: f64,
    pub memory_utilization: f64,
    pub disk_utilization: f64,
    pub recommendations: Vec<String>,
}

/// Capacity analysis artifact: cluster roll-up plus per-node recommendations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapacityAnalysis {
    pub cluster: ClusterCapacity,
    pub recommendations: Vec<NodeRecommendation>,
}

/// One forecast point for a (node, metric) pair.
///
/// Accuracy metrics are computed once per pair from the in-sample fit and
/// repeated on every row of that pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastRow {
    pub timestamp: DateTime<Utc>,
    pub node: String,
    pub metric: Metric,
    pub forecast: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub model_type: String,
    pub created_at: DateTime<Utc>,
    pub mae: f64,
    /// Unavailable when no nonzero historical actual exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mape: Option<f64>,
    pub rmse: f64,
}

/// Severity of a forecast-driven capacity alert. Ordering is by urgency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AlertSeverity {
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertSeverity::Medium => write!(f, "Medium"),
            AlertSeverity::High => write!(f, "High"),
            AlertSeverity::Critical => write!(f, "Critical"),
        }
    }
}

/// Forecast-driven capacity recommendation for a (node, metric) pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapacityAlert {
    pub node: String,
    pub metric: Metric,
    pub severity: AlertSeverity,
    pub message: String,
    pub recommended_action: String,
    /// Human-readable horizon the alert covers, e.g. "24 hours"
    pub forecast_period: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_predicted_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_predicted_value: Option<f64>,
}
