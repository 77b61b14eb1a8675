//! Forecast-driven capacity recommendations
//!
//! Reduces each (node, metric) pair's forward-looking forecast to at most
//! one alert. The tiers are mutually exclusive and evaluated in priority
//! order: Critical on the predicted maximum, then High on the maximum,
//! then Medium on the predicted mean.

use crate::config::ForecastConfig;
use crate::models::{AlertSeverity, CapacityAlert, ForecastRow, Metric};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Generate severity-tiered alerts from forecast rows.
///
/// Only rows strictly after `now` count toward the horizon statistics.
/// Pairs that cross no threshold produce nothing; the returned list may be
/// empty.
pub fn generate_alerts(
    rows: &[ForecastRow],
    now: DateTime<Utc>,
    config: &ForecastConfig,
) -> Vec<CapacityAlert> {
    let mut by_pair: BTreeMap<(&str, Metric), Vec<f64>> = BTreeMap::new();
    for row in rows.iter().filter(|r| r.timestamp > now) {
        by_pair
            .entry((row.node.as_str(), row.metric))
            .or_default()
            .push(row.forecast);
    }

    let horizon = config.horizon_label();
    let mut alerts = Vec::new();
    for ((node, metric), forecasts) in by_pair {
        let max = forecasts.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let avg = forecasts.iter().sum::<f64>() / forecasts.len() as f64;

        let alert = if max > config.critical_max_pct {
            CapacityAlert {
                node: node.to_string(),
                metric,
                severity: AlertSeverity::Critical,
                message: format!(
                    "Predicted {} utilization will reach {:.1}% - immediate action required",
                    metric, max
                ),
                recommended_action: "Add capacity or migrate instances immediately".to_string(),
                forecast_period: horizon.clone(),
                max_predicted_value: Some(max),
                avg_predicted_value: None,
            }
        } else if max > config.high_max_pct {
            CapacityAlert {
                node: node.to_string(),
                metric,
                severity: AlertSeverity::High,
                message: format!(
                    "Predicted {} utilization will reach {:.1}% - plan for capacity increase",
                    metric, max
                ),
                recommended_action: "Plan capacity increase within 1-2 days".to_string(),
                forecast_period: horizon.clone(),
                max_predicted_value: Some(max),
                avg_predicted_value: None,
            }
        } else if avg > config.medium_avg_pct {
            CapacityAlert {
                node: node.to_string(),
                metric,
                severity: AlertSeverity::Medium,
                message: format!(
                    "Predicted average {} utilization will be {:.1}% - monitor closely",
                    metric, avg
                ),
                recommended_action: "Monitor trends and plan for future capacity needs"
                    .to_string(),
                forecast_period: horizon.clone(),
                max_predicted_value: None,
                avg_predicted_value: Some(avg),
            }
        } else {
            continue;
        };
        alerts.push(alert);
    }
    alerts
}
