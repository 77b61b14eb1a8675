//! Human-readable forecast report

use crate::models::{AlertSeverity, CapacityAlert, ForecastRow, Metric};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt::Write;

const RULE: &str =
    "================================================================================";
const SECTION_RULE: &str = "----------------------------------------";

/// "cpu_utilization" -> "Cpu Utilization"
fn title_case(metric: Metric) -> String {
    metric
        .column()
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn write_severity_bucket(
    out: &mut String,
    alerts: &[&CapacityAlert],
    severity: AlertSeverity,
    heading: &str,
) {
    let bucket: Vec<_> = alerts.iter().filter(|a| a.severity == severity).collect();
    if bucket.is_empty() {
        return;
    }
    writeln!(out, "\n{}", heading).ok();
    for alert in bucket {
        writeln!(out, "  - {} - {}", alert.node, alert.message).ok();
        writeln!(out, "    Action: {}\n", alert.recommended_action).ok();
    }
}

/// Render the forecast report: per-pair horizon statistics plus alerts
/// grouped by severity bucket.
pub fn render_forecast_report(
    generated_at: DateTime<Utc>,
    rows: &[ForecastRow],
    alerts: &[CapacityAlert],
) -> String {
    let mut out = String::new();

    writeln!(out, "{}", RULE).ok();
    writeln!(out, "FLEET CAPACITY FORECAST REPORT").ok();
    writeln!(out, "{}", RULE).ok();
    writeln!(
        out,
        "Generated: {}\n",
        generated_at.format("%Y-%m-%d %H:%M:%S")
    )
    .ok();

    if !rows.is_empty() {
        writeln!(out, "FORECAST SUMMARY").ok();
        writeln!(out, "{}", SECTION_RULE).ok();

        let mut by_pair: BTreeMap<(&str, Metric), Vec<f64>> = BTreeMap::new();
        for row in rows {
            by_pair
                .entry((row.node.as_str(), row.metric))
                .or_default()
                .push(row.forecast);
        }

        let mut current_node = "";
        for (&(node, metric), forecasts) in &by_pair {
            if node != current_node {
                writeln!(out, "\nNode: {}", node).ok();
                current_node = node;
            }
            let max = forecasts.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            let avg = forecasts.iter().sum::<f64>() / forecasts.len() as f64;
            writeln!(
                out,
                "  {}: Max {:.1}%, Avg {:.1}%",
                title_case(metric),
                max,
                avg
            )
            .ok();
        }
    }

    if alerts.is_empty() {
        writeln!(out, "\nNo immediate capacity concerns detected").ok();
    } else {
        writeln!(out, "\nCAPACITY RECOMMENDATIONS").ok();
        writeln!(out, "{}", SECTION_RULE).ok();
        let refs: Vec<&CapacityAlert> = alerts.iter().collect();
        write_severity_bucket(&mut out, &refs, AlertSeverity::Critical, "CRITICAL ALERTS:");
        write_severity_bucket(&mut out, &refs, AlertSeverity::High, "HIGH PRIORITY:");
        write_severity_bucket(&mut out, &refs, AlertSeverity::Medium, "MEDIUM PRIORITY:");
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn row(node: &str, metric: Metric, hour: i64, forecast: f64) -> ForecastRow {
        ForecastRow {
            timestamp: now() + Duration::hours(hour),
            node: node.to_string(),
            metric,
            forecast,
            lower_bound: forecast - 5.0,
            upper_bound: forecast + 5.0,
            model_type: "seasonal_trend".to_string(),
            created_at: now(),
            mae: 1.0,
            mape: Some(2.0),
            rmse: 1.5,
        }
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case(Metric::Cpu), "Cpu Utilization");
        assert_eq!(title_case(Metric::Memory), "Memory Utilization");
    }

    #[test]
    fn test_report_with_alerts() {
        let rows = vec![
            row("node-a", Metric::Cpu, 1, 92.0),
            row("node-a", Metric::Cpu, 2, 96.0),
        ];
        let alerts = vec![CapacityAlert {
            node: "node-a".to_string(),
            metric: Metric::Cpu,
            severity: AlertSeverity::Critical,
            message: "Predicted cpu_utilization utilization will reach 96.0% - immediate action required".to_string(),
            recommended_action: "Add capacity or migrate instances immediately".to_string(),
            forecast_period: "24 hours".to_string(),
            max_predicted_value: Some(96.0),
            avg_predicted_value: None,
        }];

        let report = render_forecast_report(now(), &rows, &alerts);
        assert!(report.contains("FLEET CAPACITY FORECAST REPORT"));
        assert!(report.contains("Node: node-a"));
        assert!(report.contains("Cpu Utilization: Max 96.0%, Avg 94.0%"));
        assert!(report.contains("CRITICAL ALERTS:"));
        assert!(report.contains("Action: Add capacity or migrate instances immediately"));
    }

    #[test]
    fn test_quiet_report_notes_no_concerns() {
        let rows = vec![row("node-a", Metric::Cpu, 1, 30.0)];
        let report = render_forecast_report(now(), &rows, &[]);
        assert!(report.contains("No immediate capacity concerns detected"));
        assert!(!report.contains("CRITICAL"));
    }
}
