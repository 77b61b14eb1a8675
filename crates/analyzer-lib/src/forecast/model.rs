//! Seasonal trend forecasting model
//!
//! Fits a linear trend by ordinary least squares, then additive daily
//! (hour-of-day) and weekly (day-of-week) seasonal components from the
//! detrended residuals. The fit is closed-form and deterministic: the same
//! input always produces the same forecast. Uncertainty bounds come from
//! the standard deviation of the final residuals.

use chrono::{DateTime, Datelike, Timelike, Utc};

/// Model identifier recorded on every forecast row
pub const MODEL_TYPE: &str = "seasonal_trend";

/// Trend-plus-seasonality model for one (node, metric) series
#[derive(Debug, Clone)]
pub struct SeasonalTrendModel {
    origin: DateTime<Utc>,
    intercept: f64,
    slope_per_hour: f64,
    /// Mean detrended residual per hour of day
    hourly: [f64; 24],
    /// Mean remaining residual per day of week (Monday = 0)
    weekday: [f64; 7],
    residual_std: f64,
}

impl SeasonalTrendModel {
    /// Fit the model to a time-ordered series.
    ///
    /// Returns `None` for fewer than two points; the trend is undefined.
    pub fn fit(points: &[(DateTime<Utc>, f64)]) -> Option<Self> {
        if points.len() < 2 {
            return None;
        }

        let origin = points[0].0;
        let xs: Vec<f64> = points
            .iter()
            .map(|(ts, _)| (*ts - origin).num_seconds() as f64 / 3600.0)
            .collect();
        let ys: Vec<f64> = points.iter().map(|(_, y)| *y).collect();
        let n = xs.len() as f64;

        let sum_x: f64 = xs.iter().sum();
        let sum_y: f64 = ys.iter().sum();
        let sum_xy: f64 = xs.iter().zip(&ys).map(|(x, y)| x * y).sum();
        let sum_xx: f64 = xs.iter().map(|x| x * x).sum();

        let denom = n * sum_xx - sum_x * sum_x;
        let (slope_per_hour, intercept) = if denom.abs() < f64::EPSILON {
            // All points share a timestamp; fall back to a flat level
            (0.0, sum_y / n)
        } else {
            let slope = (n * sum_xy - sum_x * sum_y) / denom;
            (slope, (sum_y - slope * sum_x) / n)
        };

        // Daily component from the detrended residuals
        let mut hourly_sum = [0.0f64; 24];
        let mut hourly_count = [0usize; 24];
        let detrended: Vec<f64> = points
            .iter()
            .zip(&xs)
            .map(|((ts, y), x)| {
                let r = y - (intercept + slope_per_hour * x);
                let h = ts.hour() as usize;
                hourly_sum[h] += r;
                hourly_count[h] += 1;
                r
            })
            .collect();
        let mut hourly = [0.0f64; 24];
        for h in 0..24 {
            if hourly_count[h] > 0 {
                hourly[h] = hourly_sum[h] / hourly_count[h] as f64;
            }
        }

        // Weekly component from what the daily component leaves behind
        let mut weekday_sum = [0.0f64; 7];
        let mut weekday_count = [0usize; 7];
        let deseasoned: Vec<f64> = points
            .iter()
            .zip(&detrended)
            .map(|((ts, _), r)| {
                let r = r - hourly[ts.hour() as usize];
                let d = ts.weekday().num_days_from_monday() as usize;
                weekday_sum[d] += r;
                weekday_count[d] += 1;
                r
            })
            .collect();
        let mut weekday = [0.0f64; 7];
        for d in 0..7 {
            if weekday_count[d] > 0 {
                weekday[d] = weekday_sum[d] / weekday_count[d] as f64;
            }
        }

        // Spread of the final residuals drives the uncertainty interval
        let finals: Vec<f64> = points
            .iter()
            .zip(&deseasoned)
            .map(|((ts, _), r)| r - weekday[ts.weekday().num_days_from_monday() as usize])
            .collect();
        let mean_final = finals.iter().sum::<f64>() / n;
        let residual_std = if finals.len() > 1 {
            let var = finals.iter().map(|r| (r - mean_final).powi(2)).sum::<f64>()
                / (finals.len() - 1) as f64;
            var.sqrt()
        } else {
            0.0
        };

        Some(Self {
            origin,
            intercept,
            slope_per_hour,
            hourly,
            weekday,
            residual_std,
        })
    }

    fn seasonal(&self, ts: DateTime<Utc>) -> f64 {
        self.hourly[ts.hour() as usize]
            + self.weekday[ts.weekday().num_days_from_monday() as usize]
    }

    /// Point forecast at a timestamp
    pub fn predict(&self, ts: DateTime<Utc>) -> f64 {
        let x = (ts - self.origin).num_seconds() as f64 / 3600.0;
        self.intercept + self.slope_per_hour * x + self.seasonal(ts)
    }

    /// Uncertainty interval at a timestamp for the given z value
    pub fn bounds(&self, ts: DateTime<Utc>, z: f64) -> (f64, f64) {
        let point = self.predict(ts);
        let half_width = z * self.residual_std;
        (point - half_width, point + half_width)
    }

    pub fn residual_std(&self) -> f64 {
        self.residual_std
    }
}
