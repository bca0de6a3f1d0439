//! Descriptive statistics for fit scoring and parameter initialisation

use crate::{MathError, Result};
use statrs::distribution::{ContinuousCDF, Normal};

/// Arithmetic mean; `None` for an empty slice
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// First differences `x[t] - x[t-1]`
pub fn difference(values: &[f64]) -> Vec<f64> {
    values.windows(2).map(|w| w[1] - w[0]).collect()
}

/// Sample autocorrelation at `lag`
///
/// Returns `Ok(0.0)` for a series with zero variance.
pub fn autocorrelation(values: &[f64], lag: usize) -> Result<f64> {
    if lag == 0 {
        return Err(MathError::InvalidInput(
            "Autocorrelation lag must be positive".to_string(),
        ));
    }
    if values.len() <= lag {
        return Err(MathError::InsufficientData(format!(
            "Need more than {} values for lag {}, got {}",
            lag,
            lag,
            values.len()
        )));
    }

    let m = values.iter().sum::<f64>() / values.len() as f64;
    let denom: f64 = values.iter().map(|x| (x - m).powi(2)).sum();
    if denom == 0.0 {
        return Ok(0.0);
    }

    let numer: f64 = values
        .iter()
        .skip(lag)
        .zip(values.iter())
        .map(|(a, b)| (a - m) * (b - m))
        .sum();

    Ok(numer / denom)
}

/// Coefficient of determination `1 - SSE/SST`
///
/// Pairs where either side is not finite are ignored. When the actual
/// values have zero total variance the result is `0.0` by convention.
/// There is no lower bound: a fit worse than the mean is negative.
pub fn r_squared(actual: &[f64], fitted: &[f64]) -> Result<f64> {
    if actual.len() != fitted.len() {
        return Err(MathError::InvalidInput(format!(
            "Actual length ({}) doesn't match fitted length ({})",
            actual.len(),
            fitted.len()
        )));
    }

    let pairs: Vec<(f64, f64)> = actual
        .iter()
        .zip(fitted.iter())
        .filter(|(a, f)| a.is_finite() && f.is_finite())
        .map(|(a, f)| (*a, *f))
        .collect();

    if pairs.is_empty() {
        return Err(MathError::InsufficientData(
            "No finite actual/fitted pairs to score".to_string(),
        ));
    }

    // A constant series can leave rounding residue in the mean, so test
    // the values directly rather than the sum of squares
    let first = pairs[0].0;
    if pairs.iter().all(|(a, _)| *a == first) {
        return Ok(0.0);
    }
    let m = pairs.iter().map(|(a, _)| a).sum::<f64>() / pairs.len() as f64;
    let sst: f64 = pairs.iter().map(|(a, _)| (a - m).powi(2)).sum();
    let sse: f64 = pairs.iter().map(|(a, f)| (a - f).powi(2)).sum();

    Ok(1.0 - sse / sst)
}

/// Two-sided standard normal critical value for a confidence level in (0, 1)
///
/// `normal_quantile(0.95)` is approximately 1.96.
pub fn normal_quantile(confidence_level: f64) -> Result<f64> {
    if !(confidence_level > 0.0 && confidence_level < 1.0) {
        return Err(MathError::InvalidInput(format!(
            "Confidence level must be between 0 and 1, got {}",
            confidence_level
        )));
    }

    let standard = Normal::new(0.0, 1.0)
        .map_err(|e| MathError::CalculationError(e.to_string()))?;

    Ok(standard.inverse_cdf(0.5 + confidence_level / 2.0))
}
