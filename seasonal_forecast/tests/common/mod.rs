#![allow(dead_code)]

use chrono::Datelike;
use seasonal_forecast::data::{MonthlyPoint, MonthlySeries, Observation, YearMonth};
use seasonal_forecast::models::{
    ForecastModel, ForecastPoint, ModelDiagnostics, TrainedForecastModel,
};
use seasonal_forecast::{CancellationFlag, Result};

pub fn ym(year: i32, month: u32) -> YearMonth {
    YearMonth::new(year, month).unwrap()
}

/// Monthly series starting January 2015
pub fn series(group: &str, values: &[f64]) -> MonthlySeries {
    let start = ym(2015, 1);
    let points = values
        .iter()
        .enumerate()
        .map(|(i, &v)| MonthlyPoint::new(start.add_months(i), v))
        .collect();
    MonthlySeries::new(group, points).unwrap()
}

/// One observation on the 15th of each month starting January 2015
pub fn monthly_observations(key: &str, values: &[f64]) -> Vec<Observation> {
    let start = ym(2015, 1);
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            let date = start.add_months(i).first_day().unwrap().with_day(15).unwrap();
            Observation::new(date, key, v)
        })
        .collect()
}

/// Forecasts the historical mean with widening bands
#[derive(Debug, Clone, Default)]
pub struct MeanModel {
    /// Set once the first group has been trained
    pub cancel_after_first: Option<CancellationFlag>,
}

#[derive(Debug)]
pub struct TrainedMean {
    level: f64,
    spread: f64,
    last: YearMonth,
    fitted: MonthlySeries,
}

impl ForecastModel for MeanModel {
    type Trained = TrainedMean;

    fn train(&self, series: &MonthlySeries) -> Result<TrainedMean> {
        let level = series.mean().unwrap_or(0.0);
        let spread = series
            .values()
            .iter()
            .map(|v| (v - level).abs())
            .fold(1.0, f64::max);
        let fitted = MonthlySeries::new(
            series.group(),
            series
                .points()
                .iter()
                .map(|p| MonthlyPoint::new(p.month, level))
                .collect(),
        )?;

        if let Some(flag) = &self.cancel_after_first {
            flag.cancel();
        }

        Ok(TrainedMean {
            level,
            spread,
            last: series.last_month().unwrap(),
            fitted,
        })
    }

    fn name(&self) -> &str {
        "Mean"
    }
}

impl TrainedForecastModel for TrainedMean {
    fn fitted(&self) -> &MonthlySeries {
        &self.fitted
    }

    fn forecast(&self, horizon: usize, _confidence_level: f64) -> Result<Vec<ForecastPoint>> {
        Ok((1..=horizon)
            .map(|h| ForecastPoint {
                month: self.last.add_months(h),
                mean: self.level,
                lower: self.level - self.spread * (h as f64).sqrt(),
                upper: self.level + self.spread * (h as f64).sqrt(),
            })
            .collect())
    }

    fn diagnostics(&self) -> ModelDiagnostics {
        ModelDiagnostics {
            model: "Mean".to_string(),
            parameters: vec![("level".to_string(), self.level)],
            sigma2: self.spread.powi(2),
            log_likelihood: 0.0,
            aic: 0.0,
            bic: 0.0,
            observations: self.fitted.len(),
            iterations: 0,
        }
    }

    fn name(&self) -> &str {
        "Mean"
    }
}
