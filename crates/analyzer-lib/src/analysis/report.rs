//! Human-readable analysis report

use crate::models::{Anomaly, CapacityAnalysis, NodeSummary};
use chrono::{DateTime, Utc};
use std::fmt::Write;

/// Number of anomalies listed in full before eliding the rest
const MAX_REPORT_ANOMALIES: usize = 10;

const RULE: &str =
    "================================================================================";
const SECTION_RULE: &str = "----------------------------------------";

/// Render the combined analysis report: cluster overview, node risk,
/// leading anomalies, and capacity recommendations.
pub fn render_analysis_report(
    generated_at: DateTime<Utc>,
    capacity: &CapacityAnalysis,
    summaries: &[NodeSummary],
    anomalies: &[Anomaly],
) -> String {
    let mut out = String::new();

    writeln!(out, "{}", RULE).ok();
    writeln!(out, "FLEET MONITORING ANALYSIS REPORT").ok();
    writeln!(out, "{}", RULE).ok();
    writeln!(
        out,
        "Generated: {}\n",
        generated_at.format("%Y-%m-%d %H:%M:%S")
    )
    .ok();

    let cluster = &capacity.cluster;
    writeln!(out, "CLUSTER OVERVIEW").ok();
    writeln!(out, "{}", SECTION_RULE).ok();
    writeln!(out, "Total Nodes: {}", cluster.total_nodes).ok();
    writeln!(out, "Total Instances: {}", cluster.total_instances).ok();
    writeln!(
        out,
        "CPU Utilization: {}% ({}/{} vCPUs)",
        cluster.cpu_utilization, cluster.used_vcpus, cluster.total_vcpus
    )
    .ok();
    writeln!(
        out,
        "Memory Utilization: {}% ({:.1}/{:.1} GB)",
        cluster.memory_utilization, cluster.used_memory_gb, cluster.total_memory_gb
    )
    .ok();
    writeln!(
        out,
        "Disk Utilization: {}% ({}/{} GB)\n",
        cluster.disk_utilization, cluster.used_disk_gb, cluster.total_disk_gb
    )
    .ok();

    if !summaries.is_empty() {
        writeln!(out, "NODE SUMMARY").ok();
        writeln!(out, "{}", SECTION_RULE).ok();
        for node in summaries {
            writeln!(out, "Node: {}", node.node).ok();
            writeln!(
                out,
                "  CPU Utilization: {:.1}% (Risk: {})",
                node.cpu_utilization.mean, node.cpu_risk
            )
            .ok();
            writeln!(
                out,
                "  Memory Utilization: {:.1}% (Risk: {})",
                node.memory_utilization.mean, node.memory_risk
            )
            .ok();
            writeln!(
                out,
                "  Disk Utilization: {:.1}% (Risk: {})",
                node.disk_utilization.mean, node.disk_risk
            )
            .ok();
            writeln!(out, "  Overall Risk: {}", node.overall_risk).ok();
            writeln!(out, "  Instances: {:.1}\n", node.instances.mean).ok();
        }
    }

    if !anomalies.is_empty() {
        writeln!(out, "DETECTED ANOMALIES").ok();
        writeln!(out, "{}", SECTION_RULE).ok();
        for anomaly in anomalies.iter().take(MAX_REPORT_ANOMALIES) {
            writeln!(out, "Time: {}", anomaly.timestamp.format("%Y-%m-%d %H:%M:%S")).ok();
            writeln!(out, "Node: {}", anomaly.node).ok();
            writeln!(out, "Metric: {}", anomaly.metric).ok();
            writeln!(
                out,
                "Value: {}% (Expected: {}%)",
                anomaly.value,
                anomaly.expected_range()
            )
            .ok();
            writeln!(out, "Severity: {}\n", anomaly.severity).ok();
        }
        if anomalies.len() > MAX_REPORT_ANOMALIES {
            writeln!(
                out,
                "... and {} more anomalies\n",
                anomalies.len() - MAX_REPORT_ANOMALIES
            )
            .ok();
        }
    }

    if !capacity.recommendations.is_empty() {
        writeln!(out, "CAPACITY RECOMMENDATIONS").ok();
        writeln!(out, "{}", SECTION_RULE).ok();
        for rec in &capacity.recommendations {
            writeln!(out, "Node: {}", rec.node).ok();
            for line in &rec.recommendations {
                writeln!(out, "  - {}", line).ok();
            }
            writeln!(out).ok();
        }
    }

    out
}
