//! Run configuration

use crate::error::{ForecastError, Result};
use crate::expand::ExpansionRule;
use crate::rank::RankingKey;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings for one forecasting run
///
/// Missing fields take their defaults when deserialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Months to forecast past the end of each history
    pub horizon_months: usize,
    /// Two-sided interval coverage, in `(0, 1)`
    pub confidence_level: f64,
    /// Shortest history, in observed months, that is fitted
    pub min_required_months: usize,
    /// Groups kept after ranking
    pub top_n: usize,
    pub ranking_key: RankingKey,
    pub expansion: ExpansionRule,
    /// Optimizer iteration budget per fit
    pub max_iterations: usize,
    /// Worker threads; `None` uses the global rayon pool
    pub workers: Option<usize>,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            horizon_months: 60,
            confidence_level: 0.95,
            min_required_months: 12,
            top_n: 10,
            ranking_key: RankingKey::FinalForecast,
            expansion: ExpansionRule::Identity,
            max_iterations: 2000,
            workers: None,
        }
    }
}

impl ForecastConfig {
    /// Defaults for one of the preset pipelines
    pub fn for_profile(profile: PipelineProfile) -> Self {
        let (expansion, top_n) = match profile {
            PipelineProfile::Aggregate => (ExpansionRule::Identity, 1),
            PipelineProfile::Sector => (ExpansionRule::Identity, 10),
            PipelineProfile::Metro => (ExpansionRule::CompositeCodes, 10),
        };
        Self {
            expansion,
            top_n,
            ..Self::default()
        }
    }

    pub fn with_horizon(mut self, months: usize) -> Self {
        self.horizon_months = months;
        self
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    pub fn with_ranking_key(mut self, key: RankingKey) -> Self {
        self.ranking_key = key;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    /// Check every setting is usable
    pub fn validate(&self) -> Result<()> {
        if self.horizon_months == 0 {
            return Err(ForecastError::InvalidParameter(
                "horizon_months must be at least 1".to_string(),
            ));
        }
        if !(self.confidence_level > 0.0 && self.confidence_level < 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "confidence_level must be in (0, 1), got {}",
                self.confidence_level
            )));
        }
        if self.min_required_months == 0 {
            return Err(ForecastError::InvalidParameter(
                "min_required_months must be at least 1".to_string(),
            ));
        }
        if self.top_n == 0 {
            return Err(ForecastError::ValidationError(
                "top_n must be at least 1".to_string(),
            ));
        }
        if self.max_iterations == 0 {
            return Err(ForecastError::InvalidParameter(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        if self.workers == Some(0) {
            return Err(ForecastError::ValidationError(
                "workers must be at least 1 when set".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}

/// Preset pipelines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineProfile {
    /// A single national series
    Aggregate,
    /// Sector series, keys used as-is
    Sector,
    /// Metro series with composite state-code keys
    Metro,
}
