//! # Seasonal Forecast
//!
//! Grouped seasonal forecasting and ranking of monthly series such as job
//! posting counts.
//!
//! ## Features
//!
//! - Expansion of composite group keys (`"Huntington-Ashland, WV-KY-OH"`)
//!   into elementary groups
//! - Monthly mean aggregation of irregular observations
//! - SARIMA(1,1,1)(1,0,1)\[12\] fitted by exact likelihood with a Kalman
//!   filter, in-sample R², and forecasts with confidence intervals
//! - Ranking of groups by final forecast, mean forecast or history
//! - Parallel per-group fitting with cooperative cancellation
//!
//! Groups that cannot be fitted are skipped and reported; a run only fails
//! when no group produced a forecast.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use seasonal_forecast::config::{ForecastConfig, PipelineProfile};
//! use seasonal_forecast::pipeline::ForecastPipeline;
//! use seasonal_forecast::data::Observation;
//!
//! # fn main() -> seasonal_forecast::Result<()> {
//! let observations: Vec<Observation> = Vec::new(); // from the feed
//!
//! let config = ForecastConfig::for_profile(PipelineProfile::Metro).with_horizon(36);
//! let pipeline = ForecastPipeline::new(config)?;
//! let output = pipeline.run(&observations)?;
//!
//! for outlook in output.outlooks() {
//!     println!("{}: R² = {:.3}", outlook.group_key, outlook.r_squared);
//! }
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod config;
pub mod data;
pub mod error;
pub mod expand;
pub mod forecaster;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod rank;
pub mod utils;

// Re-export commonly used types
pub use crate::config::{ForecastConfig, PipelineProfile};
pub use crate::data::{MonthlySeries, Observation, YearMonth};
pub use crate::error::{ForecastError, Result};
pub use crate::expand::ExpansionRule;
pub use crate::forecaster::SeasonalForecaster;
pub use crate::models::{FitResult, ForecastModel, ForecastPoint, TrainedForecastModel};
pub use crate::pipeline::{CancellationFlag, ForecastPipeline, PipelineOutput};
pub use crate::rank::{RankedResult, RankingKey};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
