//! In-sample forecast accuracy metrics

/// Accuracy of a model's in-sample predictions against historical actuals
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastAccuracy {
    /// Mean absolute error
    pub mae: f64,
    /// Mean absolute percentage error; `None` when no nonzero actual exists
    pub mape: Option<f64>,
    /// Root-mean-square error
    pub rmse: f64,
}

/// Compare predictions against actuals at overlapping timestamps.
///
/// MAPE divides by the actual value, so samples with a zero actual are
/// excluded from it rather than propagating a division by zero.
pub fn accuracy(actual: &[f64], predicted: &[f64]) -> ForecastAccuracy {
    let n = actual.len().min(predicted.len());
    if n == 0 {
        return ForecastAccuracy {
            mae: 0.0,
            mape: None,
            rmse: 0.0,
        };
    }

    let errors: Vec<f64> = actual
        .iter()
        .zip(predicted)
        .take(n)
        .map(|(a, p)| a - p)
        .collect();

    let mae = errors.iter().map(|e| e.abs()).sum::<f64>() / n as f64;
    let rmse = (errors.iter().map(|e| e * e).sum::<f64>() / n as f64).sqrt();

    let pct_errors: Vec<f64> = actual
        .iter()
        .zip(&errors)
        .filter(|(a, _)| a.abs() > f64::EPSILON)
        .map(|(a, e)| (e / a).abs())
        .collect();
    let mape = if pct_errors.is_empty() {
        None
    } else {
        Some(pct_errors.iter().sum::<f64>() / pct_errors.len() as f64 * 100.0)
    };

    ForecastAccuracy { mae, mape, rmse }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_prediction() {
        let actual = [50.0, 60.0, 70.0];
        let acc = accuracy(&actual, &actual);
        assert_eq!(acc.mae, 0.0);
        assert_eq!(acc.rmse, 0.0);
        assert_eq!(acc.mape, Some(0.0));
    }

    #[test]
    fn test_known_errors() {
        let actual = [100.0, 100.0];
        let predicted = [90.0, 110.0];
        let acc = accuracy(&actual, &predicted);
        assert!((acc.mae - 10.0).abs() < 1e-9);
        assert!((acc.rmse - 10.0).abs() < 1e-9);
        assert!((acc.mape.unwrap() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_rmse_weights_large_errors() {
        let actual = [100.0, 100.0];
        let predicted = [100.0, 80.0];
        let acc = accuracy(&actual, &predicted);
        assert!((acc.mae - 10.0).abs() < 1e-9);
        // sqrt((0 + 400) / 2) ~ 14.14
        assert!((acc.rmse - 14.142135).abs() < 1e-3);
    }

    #[test]
    fn test_mape_skips_zero_actuals() {
        let actual = [0.0, 100.0];
        let predicted = [5.0, 90.0];
        let acc = accuracy(&actual, &predicted);
        // Only the nonzero actual contributes: |10/100| = 10%
        assert!((acc.mape.unwrap() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_mape_unavailable_for_all_zero_actuals() {
        let acc = accuracy(&[0.0, 0.0], &[1.0, 2.0]);
        assert_eq!(acc.mape, None);
        assert!(acc.mae > 0.0);
    }

    #[test]
    fn test_empty_series() {
        let acc = accuracy(&[], &[]);
        assert_eq!(acc.mae, 0.0);
        assert_eq!(acc.rmse, 0.0);
        assert_eq!(acc.mape, None);
    }
}
