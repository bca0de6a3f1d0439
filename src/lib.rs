//! # Postings Outlook
//!
//! `postings_outlook` forecasts monthly job-posting series per group
//! (the national total, sectors, or states) and ranks the groups by their
//! projected postings.
//!
//! The engine lives in [`seasonal_forecast`]; this crate re-exports it,
//! wires up logging and offers one-call entry points for the preset
//! pipelines.
//!
//! ## Example
//!
//! ```
//! use postings_outlook::prelude::*;
//! use postings_outlook::expand::expand;
//! use chrono::NaiveDate;
//!
//! let record = Observation::new(
//!     NaiveDate::from_ymd_opt(2023, 5, 31).unwrap(),
//!     "Huntington-Ashland, WV-KY-OH",
//!     412.0,
//! );
//! let states: Vec<String> = expand(&record, ExpansionRule::CompositeCodes)
//!     .unwrap()
//!     .into_iter()
//!     .map(|r| r.group_key)
//!     .collect();
//! assert_eq!(states, vec!["WV", "KY", "OH"]);
//! ```

pub mod logging;

pub use forecast_math;
pub use seasonal_forecast::{
    aggregate, config, data, error, expand, forecaster, metrics, models, pipeline, rank, utils,
};

use seasonal_forecast::{ForecastConfig, Observation, PipelineOutput, PipelineProfile, Result};
use tracing::info;

/// Commonly used types
pub mod prelude {
    pub use seasonal_forecast::{
        CancellationFlag, ExpansionRule, FitResult, ForecastConfig, ForecastError,
        ForecastPipeline, MonthlySeries, Observation, PipelineOutput, PipelineProfile,
        RankedResult, RankingKey, Result, SeasonalForecaster, YearMonth,
    };
}

/// Runs a preset pipeline with its default settings.
///
/// # Examples
///
/// ```no_run
/// use postings_outlook::{forecast_profile, prelude::*};
///
/// let observations: Vec<Observation> = Vec::new(); // from the feed
/// let output = forecast_profile(PipelineProfile::Sector, &observations)?;
/// println!("{}", output.to_json()?);
/// # Ok::<(), ForecastError>(())
/// ```
pub fn forecast_profile(
    profile: PipelineProfile,
    observations: &[Observation],
) -> Result<PipelineOutput> {
    forecast_with(ForecastConfig::for_profile(profile), observations)
}

/// Runs the monthly seasonal pipeline with `config`.
pub fn forecast_with(config: ForecastConfig, observations: &[Observation]) -> Result<PipelineOutput> {
    info!(
        horizon = config.horizon_months,
        top_n = config.top_n,
        expansion = ?config.expansion,
        "running postings outlook"
    );
    seasonal_forecast::ForecastPipeline::new(config)?.run(observations)
}
