//! Terminal rendering for the latest persisted artifacts

use analyzer_lib::{
    AlertSeverity, Anomaly, ArtifactKind, ArtifactStore, CapacityAlert, CapacityAnalysis,
    NodeSummary, Risk,
};
use anyhow::Result;
use clap::ValueEnum;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

/// Which latest artifact to render
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum ShowTarget {
    /// Node summary table with risk tiers
    #[default]
    Summary,
    /// Cluster capacity roll-up and per-node recommendations
    Capacity,
    /// Detected anomalies
    Anomalies,
    /// Forecast-driven capacity alerts
    Recommendations,
    /// The full plain-text analysis report
    Report,
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "!".yellow().bold(), message);
}

fn color_risk(risk: Risk) -> String {
    match risk {
        Risk::Low => risk.to_string().green().to_string(),
        Risk::Medium => risk.to_string().yellow().to_string(),
        Risk::High => risk.to_string().red().to_string(),
    }
}

fn color_alert_severity(severity: AlertSeverity) -> String {
    match severity {
        AlertSeverity::Medium => severity.to_string().yellow().to_string(),
        AlertSeverity::High => severity.to_string().red().to_string(),
        AlertSeverity::Critical => severity.to_string().red().bold().to_string(),
    }
}

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "NODE")]
    node: String,
    #[tabled(rename = "CPU")]
    cpu: String,
    #[tabled(rename = "MEMORY")]
    memory: String,
    #[tabled(rename = "DISK")]
    disk: String,
    #[tabled(rename = "INSTANCES")]
    instances: String,
    #[tabled(rename = "RISK")]
    risk: String,
}

#[derive(Tabled)]
struct AnomalyRow {
    #[tabled(rename = "TIME")]
    time: String,
    #[tabled(rename = "NODE")]
    node: String,
    #[tabled(rename = "METRIC")]
    metric: String,
    #[tabled(rename = "VALUE")]
    value: String,
    #[tabled(rename = "EXPECTED")]
    expected: String,
    #[tabled(rename = "SEVERITY")]
    severity: String,
}

/// Render the requested artifact from its latest run
pub fn show(artifacts: &ArtifactStore, target: ShowTarget) -> Result<()> {
    match target {
        ShowTarget::Summary => show_summary(artifacts),
        ShowTarget::Capacity => show_capacity(artifacts),
        ShowTarget::Anomalies => show_anomalies(artifacts),
        ShowTarget::Recommendations => show_recommendations(artifacts),
        ShowTarget::Report => show_report(artifacts),
    }
}

fn show_summary(artifacts: &ArtifactStore) -> Result<()> {
    let Some(summaries) =
        artifacts.read_latest_json::<Vec<NodeSummary>>(ArtifactKind::NodeSummary)?
    else {
        print_warning("No node summary available yet - run an analysis first");
        return Ok(());
    };

    let rows: Vec<SummaryRow> = summaries
        .iter()
        .map(|s| SummaryRow {
            node: s.node.clone(),
            cpu: format!("{:.1}%", s.cpu_utilization.mean),
            memory: format!("{:.1}%", s.memory_utilization.mean),
            disk: format!("{:.1}%", s.disk_utilization.mean),
            instances: format!("{:.1}", s.instances.mean),
            risk: color_risk(s.overall_risk),
        })
        .collect();
    println!("{}", Table::new(rows).with(Style::rounded()).to_string());
    Ok(())
}

fn show_capacity(artifacts: &ArtifactStore) -> Result<()> {
    let Some(analysis) =
        artifacts.read_latest_json::<CapacityAnalysis>(ArtifactKind::CapacityAnalysis)?
    else {
        print_warning("No capacity analysis available yet - run an analysis first");
        return Ok(());
    };

    let cluster = &analysis.cluster;
    println!("{}", "Cluster".bold());
    println!(
        "  Nodes: {}  Instances: {}",
        cluster.total_nodes, cluster.total_instances
    );
    println!(
        "  CPU: {}% ({}/{} vCPUs)",
        cluster.cpu_utilization, cluster.used_vcpus, cluster.total_vcpus
    );
    println!(
        "  Memory: {}% ({:.1}/{:.1} GB)",
        cluster.memory_utilization, cluster.used_memory_gb, cluster.total_memory_gb
    );
    println!(
        "  Disk: {}% ({}/{} GB)",
        cluster.disk_utilization, cluster.used_disk_gb, cluster.total_disk_gb
    );

    for rec in &analysis.recommendations {
        println!("\n{}", rec.node.bold());
        for line in &rec.recommendations {
            println!("  - {}", line);
        }
    }
    Ok(())
}

fn show_anomalies(artifacts: &ArtifactStore) -> Result<()> {
    let Some(anomalies) =
        artifacts.read_latest_json::<Vec<Anomaly>>(ArtifactKind::Anomalies)?
    else {
        print_warning("No anomaly list available yet - run an analysis first");
        return Ok(());
    };

    if anomalies.is_empty() {
        println!("{}", "No anomalies detected in the latest run".green());
        return Ok(());
    }

    let rows: Vec<AnomalyRow> = anomalies
        .iter()
        .map(|a| AnomalyRow {
            time: a.timestamp.format("%Y-%m-%d %H:%M").to_string(),
            node: a.node.clone(),
            metric: a.metric.to_string(),
            value: format!("{}%", a.value),
            expected: format!("{}%", a.expected_range()),
            severity: match a.severity {
                analyzer_lib::AnomalySeverity::High => a.severity.to_string().red().to_string(),
                analyzer_lib::AnomalySeverity::Medium => {
                    a.severity.to_string().yellow().to_string()
                }
            },
        })
        .collect();
    println!("{}", Table::new(rows).with(Style::rounded()).to_string());
    Ok(())
}

fn show_recommendations(artifacts: &ArtifactStore) -> Result<()> {
    let Some(alerts) =
        artifacts.read_latest_json::<Vec<CapacityAlert>>(ArtifactKind::Recommendations)?
    else {
        print_warning("No recommendations available yet - run a forecast first");
        return Ok(());
    };

    if alerts.is_empty() {
        println!("{}", "No capacity concerns in the latest forecast".green());
        return Ok(());
    }

    // Most urgent first
    let mut alerts = alerts;
    alerts.sort_by(|a, b| b.severity.cmp(&a.severity));
    for alert in &alerts {
        println!(
            "{} {} [{}]",
            color_alert_severity(alert.severity),
            alert.node.bold(),
            alert.metric
        );
        println!("  {}", alert.message);
        println!("  Action: {}", alert.recommended_action);
    }
    Ok(())
}

fn show_report(artifacts: &ArtifactStore) -> Result<()> {
    let Some(report) = artifacts.read_latest_text(ArtifactKind::AnalysisReport)? else {
        print_warning("No analysis report available yet - run an analysis first");
        return Ok(());
    };
    println!("{}", report);
    Ok(())
}
