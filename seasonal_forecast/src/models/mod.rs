//! Forecasting models for monthly series

use crate::data::{MonthlySeries, YearMonth};
use crate::error::Result;
use crate::metrics::ErrorMetrics;
use serde::Serialize;
use std::fmt::Debug;

pub mod sarima;
pub mod statespace;

/// One forecast month with its interval
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastPoint {
    pub month: YearMonth,
    /// Point forecast
    pub mean: f64,
    /// Lower interval bound
    pub lower: f64,
    /// Upper interval bound
    pub upper: f64,
}

impl ForecastPoint {
    /// Interval width
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}

/// Estimation summary of a trained model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelDiagnostics {
    /// Name of the model
    pub model: String,
    /// Estimated coefficients by name
    pub parameters: Vec<(String, f64)>,
    /// Innovation variance
    pub sigma2: f64,
    /// Maximised log-likelihood
    pub log_likelihood: f64,
    /// Akaike information criterion
    pub aic: f64,
    /// Bayesian information criterion
    pub bic: f64,
    /// Observations contributing to the likelihood
    pub observations: usize,
    /// Optimizer iterations spent
    pub iterations: usize,
}

/// Fitted model, forecast and fit quality for one group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitResult {
    /// Group the model was fitted to
    pub group: String,
    /// In-sample `1 - SSE/SST`; `0.0` for a constant series
    pub r_squared: f64,
    /// One-step-ahead in-sample predictions, month-aligned with the history
    pub fitted: MonthlySeries,
    /// Forecast months following the history
    pub forecast: Vec<ForecastPoint>,
    /// In-sample error metrics
    pub accuracy: ErrorMetrics,
    /// Estimation summary
    pub diagnostics: ModelDiagnostics,
}

impl FitResult {
    /// The last forecast point
    pub fn final_forecast(&self) -> Option<&ForecastPoint> {
        self.forecast.last()
    }
}

/// Trained forecast model
pub trait TrainedForecastModel: Debug {
    /// One-step-ahead predictions for every month of the training series
    fn fitted(&self) -> &MonthlySeries;

    /// Forecast `horizon` months after the training series with intervals
    /// at `confidence_level`
    fn forecast(&self, horizon: usize, confidence_level: f64) -> Result<Vec<ForecastPoint>>;

    /// Estimation summary
    fn diagnostics(&self) -> ModelDiagnostics;

    /// Name of the model
    fn name(&self) -> &str;
}

/// Forecast model that can be trained on a monthly series
pub trait ForecastModel: Debug + Clone + Send + Sync {
    /// The type of trained model produced
    type Trained: TrainedForecastModel;

    /// Train the model on a monthly series
    fn train(&self, series: &MonthlySeries) -> Result<Self::Trained>;

    /// Get the name of the model
    fn name(&self) -> &str;
}
