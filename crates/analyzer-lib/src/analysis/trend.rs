//! Linear trend estimation
//!
//! Resamples each node's utilization series to a fixed cadence (bucket
//! means) and fits an ordinary least-squares line against the bucket index.
//! The slope is the only output; it is a cheap directional signal, not a
//! forecast.

use crate::config::AnalyzerConfig;
use crate::models::{Metric, NodeTrend, TrendMap, UtilizationRecord};
use std::collections::BTreeMap;
use tracing::debug;

/// Least-squares slope of values against their index
pub(crate) fn least_squares_slope(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let sum_x: f64 = (0..values.len()).map(|i| i as f64).sum();
    let sum_y: f64 = values.iter().sum();
    let sum_xy: f64 = values.iter().enumerate().map(|(i, y)| i as f64 * y).sum();
    let sum_x2: f64 = (0..values.len()).map(|i| (i as f64).powi(2)).sum();
    let denom = n * sum_x2 - sum_x.powi(2);
    if denom.abs() < f64::EPSILON {
        return 0.0;
    }
    (n * sum_xy - sum_x * sum_y) / denom
}

/// Bucket means for one metric over a contiguous bucket range.
///
/// Buckets with no samples contribute 0, matching the resampling behavior
/// the downstream consumers were tuned against.
fn resample(
    records: &[&UtilizationRecord],
    metric: Metric,
    first_bucket: i64,
    bucket_count: usize,
    bucket_secs: i64,
) -> Vec<f64> {
    let mut sums = vec![0.0; bucket_count];
    let mut counts = vec![0usize; bucket_count];
    for record in records {
        let bucket = record.sample.timestamp.timestamp().div_euclid(bucket_secs);
        let index = (bucket - first_bucket) as usize;
        sums[index] += record.utilization(metric);
        counts[index] += 1;
    }
    sums.iter()
        .zip(&counts)
        .map(|(&sum, &count)| if count > 0 { sum / count as f64 } else { 0.0 })
        .collect()
}

/// Estimate per-node utilization trends over the window.
///
/// Nodes whose window spans fewer than two resample buckets are skipped
/// entirely; a missing entry means "no trend", not a zero slope.
pub fn estimate_trends(records: &[UtilizationRecord], config: &AnalyzerConfig) -> TrendMap {
    let bucket_secs = config.trend_bucket.as_secs() as i64;
    let mut by_node: BTreeMap<&str, Vec<&UtilizationRecord>> = BTreeMap::new();
    for record in records {
        by_node.entry(&record.sample.node).or_default().push(record);
    }

    let mut trends = TrendMap::new();
    for (node, group) in by_node {
        let buckets: Vec<i64> = group
            .iter()
            .map(|r| r.sample.timestamp.timestamp().div_euclid(bucket_secs))
            .collect();
        let first = buckets.iter().min().copied().unwrap_or(0);
        let last = buckets.iter().max().copied().unwrap_or(first);
        let bucket_count = (last - first + 1) as usize;

        if bucket_count < 2 {
            debug!(node = node, "Skipping trend: fewer than two resample buckets");
            continue;
        }

        let slope_of = |metric: Metric| {
            least_squares_slope(&resample(&group, metric, first, bucket_count, bucket_secs))
        };

        trends.insert(
            node.to_string(),
            NodeTrend {
                cpu_trend: slope_of(Metric::Cpu),
                memory_trend: slope_of(Metric::Memory),
                disk_trend: slope_of(Metric::Disk),
                data_points: bucket_count,
            },
        );
    }
    trends
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::utilization::derive;
    use crate::models::HypervisorSample;
    use chrono::{Duration, TimeZone, Utc};

    fn record_at(node: &str, minutes: i64, cpu_pct: f64) -> UtilizationRecord {
        let base = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        derive(HypervisorSample {
            timestamp: base + Duration::minutes(minutes),
            node: node.to_string(),
            vcpus_used: cpu_pct,
            vcpus_total: 100.0,
            memory_used_mb: 8192.0,
            memory_total_mb: 16384.0,
            disk_used_gb: 100.0,
            disk_total_gb: 500.0,
            instances: 1,
            total_instance_vcpus: 10.0,
            total_instance_memory_mb: 8192.0,
            hypervisor_type: "QEMU".to_string(),
            state: "up".to_string(),
            status: "enabled".to_string(),
        })
    }

    #[test]
    fn test_perfectly_linear_series_yields_unit_slope() {
        // Utilization rises by exactly 1 percent per hourly bucket, 48 buckets
        let records: Vec<_> = (0..48)
            .map(|h| record_at("node-1", h * 60, 10.0 + h as f64))
            .collect();
        let trends = estimate_trends(&records, &AnalyzerConfig::default());
        let trend = trends.get("node-1").unwrap();
        assert!((trend.cpu_trend - 1.0).abs() < 1e-9);
        assert_eq!(trend.data_points, 48);
        // Memory held constant
        assert!(trend.memory_trend.abs() < 1e-9);
    }

    #[test]
    fn test_single_bucket_node_is_skipped() {
        // Three samples inside one hour collapse into a single bucket
        let records = vec![
            record_at("node-1", 0, 10.0),
            record_at("node-1", 20, 20.0),
            record_at("node-1", 40, 30.0),
        ];
        let trends = estimate_trends(&records, &AnalyzerConfig::default());
        assert!(trends.is_empty());
    }

    #[test]
    fn test_multiple_samples_per_bucket_are_averaged() {
        let records = vec![
            record_at("node-1", 0, 10.0),
            record_at("node-1", 30, 30.0), // bucket 0 mean = 20
            record_at("node-1", 60, 25.0), // bucket 1 mean = 25
        ];
        let trends = estimate_trends(&records, &AnalyzerConfig::default());
        let trend = trends.get("node-1").unwrap();
        assert!((trend.cpu_trend - 5.0).abs() < 1e-9);
        assert_eq!(trend.data_points, 2);
    }

    #[test]
    fn test_gap_buckets_count_toward_data_points() {
        // Samples at hour 0 and hour 3: four buckets, two empty
        let records = vec![record_at("node-1", 0, 10.0), record_at("node-1", 180, 40.0)];
        let trends = estimate_trends(&records, &AnalyzerConfig::default());
        assert_eq!(trends.get("node-1").unwrap().data_points, 4);
    }

    #[test]
    fn test_least_squares_slope_basics() {
        assert_eq!(least_squares_slope(&[]), 0.0);
        assert_eq!(least_squares_slope(&[5.0]), 0.0);
        assert!((least_squares_slope(&[1.0, 2.0, 3.0, 4.0, 5.0]) - 1.0).abs() < 1e-9);
        assert!(least_squares_slope(&[5.0, 4.0, 3.0]) < 0.0);
    }
}
