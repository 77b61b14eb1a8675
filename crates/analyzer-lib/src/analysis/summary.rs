//! Per-node summary aggregation
//!
//! Groups the retained window by node and reduces it to one row of window
//! statistics, first-observed capacity, and risk tiers.

use crate::config::AnalyzerConfig;
use crate::models::{InstanceStats, MetricStats, NodeSummary, Risk, UtilizationRecord};
use std::collections::BTreeMap;

/// Round to two decimals, the precision persisted artifacts carry
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn stats(values: &[f64]) -> MetricStats {
    let n = values.len();
    let mean = values.iter().sum::<f64>() / n as f64;
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    // Sample standard deviation; undefined for one observation, reported as 0
    let std_dev = if n > 1 {
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        var.sqrt()
    } else {
        0.0
    };
    MetricStats {
        mean: round2(mean),
        max: round2(max),
        min: round2(min),
        std_dev: round2(std_dev),
    }
}

fn risk_tier(mean_pct: f64, config: &AnalyzerConfig) -> Risk {
    if mean_pct > config.risk_high_pct {
        Risk::High
    } else if mean_pct > config.risk_medium_pct {
        Risk::Medium
    } else {
        Risk::Low
    }
}

/// Aggregate the window into one summary row per node.
///
/// Output is ordered by node name; the order carries no meaning beyond
/// being stable across runs.
pub fn summarize(records: &[UtilizationRecord], config: &AnalyzerConfig) -> Vec<NodeSummary> {
    let mut by_node: BTreeMap<&str, Vec<&UtilizationRecord>> = BTreeMap::new();
    for record in records {
        by_node.entry(&record.sample.node).or_default().push(record);
    }

    by_node
        .into_iter()
        .map(|(node, group)| {
            let cpu = stats(&group.iter().map(|r| r.cpu_utilization).collect::<Vec<_>>());
            let memory = stats(&group.iter().map(|r| r.memory_utilization).collect::<Vec<_>>());
            let disk = stats(&group.iter().map(|r| r.disk_utilization).collect::<Vec<_>>());

            let instance_counts: Vec<u32> = group.iter().map(|r| r.sample.instances).collect();
            let instances = InstanceStats {
                mean: round2(
                    instance_counts.iter().map(|&c| c as f64).sum::<f64>()
                        / instance_counts.len() as f64,
                ),
                max: instance_counts.iter().copied().max().unwrap_or(0),
                min: instance_counts.iter().copied().min().unwrap_or(0),
            };

            let mean_of = |f: fn(&UtilizationRecord) -> f64| {
                round2(group.iter().map(|r| f(r)).sum::<f64>() / group.len() as f64)
            };

            let first = group[0];
            let cpu_risk = risk_tier(cpu.mean, config);
            let memory_risk = risk_tier(memory.mean, config);
            let disk_risk = risk_tier(disk.mean, config);

            NodeSummary {
                node: node.to_string(),
                cpu_utilization: cpu,
                memory_utilization: memory,
                disk_utilization: disk,
                instances,
                vcpus_total: first.sample.vcpus_total,
                memory_total_mb: first.sample.memory_total_mb,
                disk_total_gb: first.sample.disk_total_gb,
                cpu_efficiency_mean: mean_of(|r| r.cpu_efficiency),
                memory_efficiency_mean: mean_of(|r| r.memory_efficiency),
                cpu_waste_mean: mean_of(|r| r.cpu_waste),
                memory_waste_mean: mean_of(|r| r.memory_waste),
                cpu_risk,
                memory_risk,
                disk_risk,
                overall_risk: cpu_risk.max(memory_risk).max(disk_risk),
            }
        })
        .collect()
}
