//! In-sample fit quality

use crate::data::MonthlySeries;
use crate::error::{ForecastError, Result};
use serde::Serialize;
use std::fmt;

/// Error metrics between observed and predicted values
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ErrorMetrics {
    /// Mean Absolute Error
    pub mae: f64,
    /// Mean Squared Error
    pub mse: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Mean Absolute Percentage Error over non-zero actuals
    pub mape: f64,
    /// Symmetric Mean Absolute Percentage Error
    pub smape: f64,
}

impl ErrorMetrics {
    /// Compare `predicted` against `actual` element by element
    pub fn between(actual: &[f64], predicted: &[f64]) -> Result<Self> {
        if actual.len() != predicted.len() || actual.is_empty() {
            return Err(ForecastError::ValidationError(
                "Actual and predicted values must have the same non-zero length".to_string(),
            ));
        }

        let n = actual.len() as f64;
        let errors: Vec<f64> = actual
            .iter()
            .zip(predicted)
            .map(|(&a, &p)| a - p)
            .collect();

        let mae = errors.iter().map(|e| e.abs()).sum::<f64>() / n;
        let mse = errors.iter().map(|e| e.powi(2)).sum::<f64>() / n;

        let (pct_sum, pct_count) = actual
            .iter()
            .zip(&errors)
            .filter(|(&a, _)| a != 0.0)
            .fold((0.0, 0usize), |(sum, count), (&a, &e)| {
                (sum + e.abs() / a.abs() * 100.0, count + 1)
            });
        let mape = if pct_count > 0 {
            pct_sum / pct_count as f64
        } else {
            0.0
        };

        let smape = actual
            .iter()
            .zip(predicted)
            .map(|(&a, &p)| {
                let scale = a.abs() + p.abs();
                if scale == 0.0 {
                    0.0
                } else {
                    200.0 * (a - p).abs() / scale
                }
            })
            .sum::<f64>()
            / n;

        Ok(Self {
            mae,
            mse,
            rmse: mse.sqrt(),
            mape,
            smape,
        })
    }

    /// Compare one-step predictions against the history they were made for
    pub fn in_sample(history: &MonthlySeries, fitted: &MonthlySeries) -> Result<Self> {
        if history.months() != fitted.months() {
            return Err(ForecastError::ValidationError(format!(
                "Fitted values for {:?} are not aligned with its history",
                history.group()
            )));
        }
        Self::between(&history.values(), &fitted.values())
    }
}

impl fmt::Display for ErrorMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MAE={:.4} RMSE={:.4} MAPE={:.2}% SMAPE={:.2}%",
            self.mae, self.rmse, self.mape, self.smape
        )
    }
}
