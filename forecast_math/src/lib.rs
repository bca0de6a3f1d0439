//! # Forecast Math
//!
//! Numerical kernels shared by the seasonal forecasting engine.
//! This crate provides a derivative-free optimizer for likelihood
//! maximisation and the descriptive statistics used to score fits.

use thiserror::Error;

pub mod optimization;
pub mod stats;

pub use optimization::{Minimum, NelderMead};
pub use stats::{autocorrelation, difference, mean, normal_quantile, r_squared};

/// Errors that can occur in numerical calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for numerical operations
pub type Result<T> = std::result::Result<T, MathError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_carry_context() {
        let err = MathError::InvalidInput("lag must be positive".to_string());
        assert_eq!(err.to_string(), "Invalid input: lag must be positive");
    }
}
