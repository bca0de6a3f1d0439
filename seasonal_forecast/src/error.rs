//! Error types for the seasonal_forecast crate

use thiserror::Error;

/// Custom error types for the seasonal_forecast crate
///
/// `MalformedGroupKey`, `InsufficientData`, `FitFailed` and `Cancelled` are
/// contained to a single record or group by the pipeline; only
/// `EmptyResultSet` ends a run.
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Composite group key that cannot be split into elementary codes
    #[error("Malformed group key: {0:?}")]
    MalformedGroupKey(String),

    /// Too few monthly points to fit a seasonal model
    #[error("Insufficient data: need at least {needed} monthly points, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// The optimizer did not produce a usable model
    #[error("Model fit failed: {0}")]
    FitFailed(String),

    /// No group produced a forecast
    #[error("Nothing to forecast: no group produced a forecast")]
    EmptyResultSet,

    /// The run was cancelled before this work started
    #[error("Cancelled before the group was fitted")]
    Cancelled,

    /// Error related to data validation
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error while reading or decoding configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from the numerical kernels
    #[error("Math error: {0}")]
    MathError(#[from] forecast_math::MathError),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<serde_json::Error> for ForecastError {
    fn from(err: serde_json::Error) -> Self {
        ForecastError::ConfigError(err.to_string())
    }
}
