//! Rolling-window anomaly detection
//!
//! Flags samples whose CPU or memory utilization falls outside a rolling
//! mean-and-deviation band. The band is computed per sample from the
//! trailing window including the sample itself, so the detector reacts to
//! local surprise rather than global extremity: a naturally volatile but
//! stable node produces fewer anomalies than one with a sudden regime
//! shift.

use crate::analysis::summary::round2;
use crate::config::AnalyzerConfig;
use crate::models::{Anomaly, AnomalySeverity, Metric, UtilizationRecord};
use std::collections::BTreeMap;

/// Metrics the detector watches
const DETECTED_METRICS: [Metric; 2] = [Metric::Cpu, Metric::Memory];

/// Mean and sample standard deviation of a window.
///
/// The deviation is undefined for a single observation; the first sample of
/// a series therefore never produces an anomaly.
fn window_stats(window: &[f64]) -> (f64, Option<f64>) {
    let n = window.len();
    let mean = window.iter().sum::<f64>() / n as f64;
    if n < 2 {
        return (mean, None);
    }
    let var = window.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    (mean, Some(var.sqrt()))
}

fn detect_series(
    node: &str,
    metric: Metric,
    series: &[(chrono::DateTime<chrono::Utc>, f64)],
    config: &AnalyzerConfig,
    out: &mut Vec<Anomaly>,
) {
    // At most the last `rolling_window` observations, or all if fewer
    let window_size = config.rolling_window.min(series.len()).max(1);
    for (i, &(timestamp, value)) in series.iter().enumerate() {
        let start = (i + 1).saturating_sub(window_size);
        let window: Vec<f64> = series[start..=i].iter().map(|&(_, v)| v).collect();
        let (mean, Some(std_dev)) = window_stats(&window) else {
            continue;
        };

        let band = config.anomaly_band_sigma * std_dev;
        if value > mean + band || value < mean - band {
            let severity = if (value - mean).abs() > config.anomaly_high_sigma * std_dev {
                AnomalySeverity::High
            } else {
                AnomalySeverity::Medium
            };
            out.push(Anomaly {
                timestamp,
                node: node.to_string(),
                metric,
                value: round2(value),
                expected_low: round2(mean - band),
                expected_high: round2(mean + band),
                severity,
            });
        }
    }
}

/// Detect anomalies across the window, per node and per watched metric.
///
/// Output is ordered by node, then metric, then time.
pub fn detect_anomalies(records: &[UtilizationRecord], config: &AnalyzerConfig) -> Vec<Anomaly> {
    let mut by_node: BTreeMap<&str, Vec<&UtilizationRecord>> = BTreeMap::new();
    for record in records {
        by_node.entry(&record.sample.node).or_default().push(record);
    }

    let mut anomalies = Vec::new();
    for (node, group) in by_node {
        for metric in DETECTED_METRICS {
            let series: Vec<_> = group
                .iter()
                .map(|r| (r.sample.timestamp, r.utilization(metric)))
                .collect();
            detect_series(node, metric, &series, config, &mut anomalies);
        }
    }
    anomalies
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::utilization::derive;
    use crate::models::HypervisorSample;
    use chrono::{Duration, TimeZone, Utc};

    fn record_at(node: &str, hour: i64, cpu_pct: f64) -> UtilizationRecord {
        let base = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        derive(HypervisorSample {
            timestamp: base + Duration::hours(hour),
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
    fn test_constant_series_produces_no_anomalies() {
        let records: Vec<_> = (0..10).map(|h| record_at("node-1", h, 50.0)).collect();
        let anomalies = detect_anomalies(&records, &AnalyzerConfig::default());
        assert!(anomalies.is_empty());
    }

    #[test]
    fn test_single_outlier_in_flat_series() {
        // 30 flat points with one extreme spike
        let mut records: Vec<_> = (0..30).map(|h| record_at("node-1", h, 50.0)).collect();
        records[25] = record_at("node-1", 25, 99.0);

        let anomalies = detect_anomalies(&records, &AnalyzerConfig::default());
        let cpu: Vec<_> = anomalies
            .iter()
            .filter(|a| a.metric == Metric::Cpu)
            .collect();
        assert_eq!(cpu.len(), 1);
        let anomaly = cpu[0];
        assert_eq!(anomaly.value, 99.0);
        // Deviation far exceeds three window deviations
        assert_eq!(anomaly.severity, AnomalySeverity::High);
        // The reported band is the local one, centered near the flat level
        assert!(anomaly.expected_high < 99.0);
        assert!(anomaly.expected_low < anomaly.expected_high);
    }

    #[test]
    fn test_first_sample_never_anomalous() {
        let records = vec![record_at("node-1", 0, 99.0)];
        let anomalies = detect_anomalies(&records, &AnalyzerConfig::default());
        assert!(anomalies.is_empty());
    }

    #[test]
    fn test_moderate_deviation_is_medium() {
        // A noisy series, then a value just past the 2-sigma band but
        // within 3 sigma of the rolling mean.
        let values = [
            50.0, 52.0, 48.0, 51.0, 49.0, 50.0, 52.0, 48.0, 51.0, 49.0, 50.0, 52.0, 48.0, 51.0,
            49.0, 55.5,
        ];
        let records: Vec<_> = values
            .iter()
            .enumerate()
            .map(|(h, &v)| record_at("node-1", h as i64, v))
            .collect();
        let anomalies = detect_anomalies(&records, &AnalyzerConfig::default());
        let cpu: Vec<_> = anomalies
            .iter()
            .filter(|a| a.metric == Metric::Cpu)
            .collect();
        assert_eq!(cpu.len(), 1);
        assert_eq!(cpu[0].severity, AnomalySeverity::Medium);
    }

    #[test]
    fn test_low_side_deviation_detected() {
        let mut records: Vec<_> = (0..30).map(|h| record_at("node-1", h, 50.0)).collect();
        records[20] = record_at("node-1", 20, 2.0);
        let anomalies = detect_anomalies(&records, &AnalyzerConfig::default());
        let cpu: Vec<_> = anomalies
            .iter()
            .filter(|a| a.metric == Metric::Cpu)
            .collect();
        assert_eq!(cpu.len(), 1);
        assert!(cpu[0].value < cpu[0].expected_low);
    }

    #[test]
    fn test_memory_watched_independently() {
        let mut records: Vec<_> = (0..30).map(|h| record_at("node-1", h, 50.0)).collect();
        // Spike memory only
        records[15].memory_utilization = 99.0;
        let anomalies = detect_anomalies(&records, &AnalyzerConfig::default());
        assert!(anomalies.iter().all(|a| a.metric == Metric::Memory));
        assert_eq!(anomalies.len(), 1);
    }

    #[test]
    fn test_nodes_are_isolated() {
        // node-a is volatile, node-b has a regime shift; node-a's variance
        // must not mask node-b's anomaly
        let mut records = Vec::new();
        for h in 0..30 {
            let v = if h % 2 == 0 { 20.0 } else { 80.0 };
            records.push(record_at("node-a", h, v));
            records.push(record_at("node-b", h, 40.0));
        }
        records.push(record_at("node-b", 30, 95.0));
        let anomalies = detect_anomalies(&records, &AnalyzerConfig::default());
        let cpu: Vec<_> = anomalies
            .iter()
            .filter(|a| a.metric == Metric::Cpu)
            .collect();
        assert_eq!(cpu.len(), 1);
        assert_eq!(cpu[0].node, "node-b");
    }
}
