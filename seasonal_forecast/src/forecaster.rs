//! Per-group fitting and forecasting

use crate::config::ForecastConfig;
use crate::data::MonthlySeries;
use crate::error::{ForecastError, Result};
use crate::metrics::ErrorMetrics;
use crate::models::sarima::{Sarima, SarimaOrder};
use crate::models::{FitResult, ForecastModel, TrainedForecastModel};

/// Fits a model to one monthly series and forecasts a fixed horizon
///
/// A series shorter than `min_required_months` is rejected before any
/// fitting. Every returned [`FitResult`] has exactly `horizon` forecast
/// points starting the month after the history, each with finite
/// `lower <= mean <= upper`.
#[derive(Debug, Clone)]
pub struct SeasonalForecaster<M: ForecastModel = Sarima> {
    model: M,
    horizon: usize,
    confidence_level: f64,
    min_required_months: usize,
}

impl<M: ForecastModel> SeasonalForecaster<M> {
    /// Create a new forecaster
    pub fn new(
        model: M,
        horizon: usize,
        confidence_level: f64,
        min_required_months: usize,
    ) -> Result<Self> {
        if horizon == 0 {
            return Err(ForecastError::InvalidParameter(
                "Forecast horizon must be at least 1 month".to_string(),
            ));
        }
        if !(confidence_level > 0.0 && confidence_level < 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "Confidence level must be in (0, 1), got {}",
                confidence_level
            )));
        }
        if min_required_months == 0 {
            return Err(ForecastError::InvalidParameter(
                "Minimum required months must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            model,
            horizon,
            confidence_level,
            min_required_months,
        })
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }

    pub fn confidence_level(&self) -> f64 {
        self.confidence_level
    }

    pub fn min_required_months(&self) -> usize {
        self.min_required_months
    }

    /// Fit the model to `series` and forecast
    pub fn fit(&self, series: &MonthlySeries) -> Result<FitResult> {
        if series.len() < self.min_required_months {
            return Err(ForecastError::InsufficientData {
                needed: self.min_required_months,
                got: series.len(),
            });
        }

        let trained = self.model.train(series)?;
        let fitted = trained.fitted().clone();

        let r_squared = forecast_math::r_squared(&series.values(), &fitted.values())?;
        let accuracy = ErrorMetrics::in_sample(series, &fitted)?;
        let forecast = trained.forecast(self.horizon, self.confidence_level)?;

        if forecast.len() != self.horizon {
            return Err(ForecastError::FitFailed(format!(
                "{} returned {} forecast months, expected {}",
                trained.name(),
                forecast.len(),
                self.horizon
            )));
        }
        if let Some(bad) = forecast.iter().find(|p| {
            !(p.mean.is_finite() && p.lower.is_finite() && p.upper.is_finite())
                || p.lower > p.mean
                || p.mean > p.upper
        }) {
            return Err(ForecastError::FitFailed(format!(
                "{} produced an invalid forecast at {}",
                trained.name(),
                bad.month
            )));
        }
        if let (Some(last), Some(first)) = (series.last_month(), forecast.first()) {
            if first.month != last.succ() {
                return Err(ForecastError::FitFailed(format!(
                    "Forecast starts at {} but history ends at {}",
                    first.month, last
                )));
            }
        }

        Ok(FitResult {
            group: series.group().to_string(),
            r_squared,
            fitted,
            forecast,
            accuracy,
            diagnostics: trained.diagnostics(),
        })
    }
}

impl SeasonalForecaster<Sarima> {
    /// The monthly seasonal forecaster described by `config`
    pub fn from_config(config: &ForecastConfig) -> Result<Self> {
        let model = Sarima::new(SarimaOrder::monthly(), config.max_iterations)?;
        Self::new(
            model,
            config.horizon_months,
            config.confidence_level,
            config.min_required_months,
        )
    }
}

impl Default for SeasonalForecaster<Sarima> {
    fn default() -> Self {
        Self {
            model: Sarima::monthly(),
            horizon: 60,
            confidence_level: 0.95,
            min_required_months: 12,
        }
    }
}
