//! Cluster capacity roll-up and threshold recommendations
//!
//! Works from the most recent sample per node only: capacity planning cares
//! about where the cluster is now, not where it has been.

use crate::analysis::summary::round2;
use crate::analysis::utilization::ratio_pct;
use crate::config::AnalyzerConfig;
use crate::models::{
    CapacityAnalysis, ClusterCapacity, NodeRecommendation, UtilizationRecord,
};
use std::collections::BTreeMap;

/// Latest record per node, keyed and ordered by node name
fn latest_per_node(records: &[UtilizationRecord]) -> BTreeMap<&str, &UtilizationRecord> {
    let mut latest: BTreeMap<&str, &UtilizationRecord> = BTreeMap::new();
    for record in records {
        // Records are time-ordered, so the last insert wins
        latest.insert(&record.sample.node, record);
    }
    latest
}

fn node_recommendations(record: &UtilizationRecord, config: &AnalyzerConfig) -> Vec<String> {
    let mut recs = Vec::new();

    if record.cpu_utilization > config.scale_up_pct {
        recs.push("Consider adding more CPU capacity or migrating instances".to_string());
    } else if record.cpu_utilization < config.scale_down_pct {
        recs.push("CPU capacity is underutilized - consider consolidating instances".to_string());
    }

    if record.memory_utilization > config.scale_up_pct {
        recs.push("Consider adding more memory or migrating instances".to_string());
    } else if record.memory_utilization < config.scale_down_pct {
        recs.push(
            "Memory capacity is underutilized - consider consolidating instances".to_string(),
        );
    }

    if record.disk_utilization > config.scale_up_pct {
        recs.push("Consider adding more disk storage or cleaning up unused data".to_string());
    } else if record.disk_utilization < config.scale_down_pct {
        recs.push("Disk capacity is underutilized".to_string());
    }

    if recs.is_empty() {
        recs.push("Node capacity is well-balanced".to_string());
    }
    recs
}

/// Compute the capacity analysis artifact from the retained window
pub fn analyze_capacity(
    records: &[UtilizationRecord],
    config: &AnalyzerConfig,
) -> CapacityAnalysis {
    let latest = latest_per_node(records);

    let sum_of = |f: fn(&UtilizationRecord) -> f64| latest.values().map(|r| f(r)).sum::<f64>();

    let total_vcpus = sum_of(|r| r.sample.vcpus_total);
    let used_vcpus = sum_of(|r| r.sample.vcpus_used);
    let total_memory_mb = sum_of(|r| r.sample.memory_total_mb);
    let used_memory_mb = sum_of(|r| r.sample.memory_used_mb);
    let total_disk_gb = sum_of(|r| r.sample.disk_total_gb);
    let used_disk_gb = sum_of(|r| r.sample.disk_used_gb);

    let cluster = ClusterCapacity {
        total_nodes: latest.len(),
        total_instances: latest.values().map(|r| r.sample.instances as u64).sum(),
        total_vcpus,
        used_vcpus,
        available_vcpus: total_vcpus - used_vcpus,
        cpu_utilization: round2(ratio_pct(used_vcpus, total_vcpus)),
        total_memory_gb: round2(total_memory_mb / 1024.0),
        used_memory_gb: round2(used_memory_mb / 1024.0),
        available_memory_gb: round2((total_memory_mb - used_memory_mb) / 1024.0),
        memory_utilization: round2(ratio_pct(used_memory_mb, total_memory_mb)),
        total_disk_gb,
        used_disk_gb,
        available_disk_gb: total_disk_gb - used_disk_gb,
        disk_utilization: round2(ratio_pct(used_disk_gb, total_disk_gb)),
    };

    let recommendations = latest
        .values()
        .map(|record| NodeRecommendation {
            node: record.sample.node.clone(),
            cpu_utilization: round2(record.cpu_utilization),
            memory_utilization: round2(record.memory_utilization),
            disk_utilization: round2(record.disk_utilization),
            recommendations: node_recommendations(record, config),
        })
        .collect();

    CapacityAnalysis {
        cluster,
        recommendations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::utilization::derive;
    use crate::models::HypervisorSample;
    use chrono::{Duration, TimeZone, Utc};

    fn record_at(node: &str, hour: i64, vcpus_used: f64) -> UtilizationRecord {
        let base = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        derive(HypervisorSample {
            timestamp: base + Duration::hours(hour),
            node: node.to_string(),
            vcpus_used,
            vcpus_total: 8.0,
            memory_used_mb: 8192.0,
            memory_total_mb: 16384.0,
            disk_used_gb: 200.0,
            disk_total_gb: 500.0,
            instances: 2,
            total_instance_vcpus: 4.0,
            total_instance_memory_mb: 8192.0,
            hypervisor_type: "QEMU".to_string(),
            state: "up".to_string(),
            status: "enabled".to_string(),
        })
    }

    #[test]
    fn test_cluster_totals_use_latest_sample_only() {
        let records = vec![
            record_at("node-a", 0, 2.0),
            record_at("node-b", 0, 2.0),
            record_at("node-a", 1, 7.0), // supersedes the first node-a sample
        ];
        let analysis = analyze_capacity(&records, &AnalyzerConfig::default());
        let cluster = &analysis.cluster;
        assert_eq!(cluster.total_nodes, 2);
        assert_eq!(cluster.total_instances, 4);
        assert_eq!(cluster.total_vcpus, 16.0);
        assert_eq!(cluster.used_vcpus, 9.0);
        assert_eq!(cluster.available_vcpus, 7.0);
        // 9/16 * 100 = 56.25
        assert_eq!(cluster.cpu_utilization, 56.25);
        assert_eq!(cluster.total_memory_gb, 32.0);
        assert_eq!(cluster.memory_utilization, 50.0);
    }

    #[test]
    fn test_high_and_low_thresholds() {
        let records = vec![
            record_at("node-a", 0, 7.0), // 87.5% CPU
            record_at("node-b", 0, 1.0), // 12.5% CPU
        ];
        let analysis = analyze_capacity(&records, &AnalyzerConfig::default());

        let node_a = &analysis.recommendations[0];
        assert_eq!(node_a.node, "node-a");
        assert!(node_a
            .recommendations
            .iter()
            .any(|r| r.contains("adding more CPU capacity")));

        let node_b = &analysis.recommendations[1];
        assert!(node_b
            .recommendations
            .iter()
            .any(|r| r.contains("CPU capacity is underutilized")));
    }

    #[test]
    fn test_balanced_node_gets_single_recommendation() {
        // 50% CPU, 50% memory, 40% disk: all inside the 20-80 band
        let records = vec![record_at("node-a", 0, 4.0)];
        let analysis = analyze_capacity(&records, &AnalyzerConfig::default());
        assert_eq!(
            analysis.recommendations[0].recommendations,
            vec!["Node capacity is well-balanced".to_string()]
        );
    }

    #[test]
    fn test_one_recommendation_per_resource() {
        // Everything maxed out: one recommendation per resource, no repeats
        let mut record = record_at("node-a", 0, 8.0);
        record.memory_utilization = 95.0;
        record.disk_utilization = 95.0;
        let analysis = analyze_capacity(&[record], &AnalyzerConfig::default());
        let recs = &analysis.recommendations[0].recommendations;
        assert_eq!(recs.len(), 3);
        let mut unique = recs.clone();
        unique.dedup();
        assert_eq!(unique.len(), 3);
    }

    #[test]
    fn test_zero_capacity_cluster_does_not_divide_by_zero() {
        let mut record = record_at("node-a", 0, 0.0);
        record.sample.vcpus_total = 0.0;
        record.sample.memory_total_mb = 0.0;
        record.sample.disk_total_gb = 0.0;
        record.sample.memory_used_mb = 0.0;
        record.sample.disk_used_gb = 0.0;
        let analysis = analyze_capacity(&[record], &AnalyzerConfig::default());
        assert_eq!(analysis.cluster.cpu_utilization, 0.0);
        assert_eq!(analysis.cluster.memory_utilization, 0.0);
        assert_eq!(analysis.cluster.disk_utilization, 0.0);
    }
}
