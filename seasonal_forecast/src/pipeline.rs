//! End-to-end run: expand, aggregate, fit every group in parallel, rank

use crate::aggregate::{aggregate_monthly, group_by_key};
use crate::config::ForecastConfig;
use crate::data::{MonthlySeries, Observation};
use crate::error::{ForecastError, Result};
use crate::expand::expand_all;
use crate::forecaster::SeasonalForecaster;
use crate::models::sarima::{Sarima, SarimaOrder};
use crate::models::{FitResult, ForecastModel, ForecastPoint};
use crate::rank::{order, ForecastedGroup, RankedResult};
use rayon::prelude::*;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Shared stop signal for a run
///
/// Fits already in progress finish; groups not yet started are skipped.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A group that produced no forecast, and why
#[derive(Debug)]
pub struct SkippedGroup {
    pub group: String,
    pub error: ForecastError,
}

impl PartialEq for SkippedGroup {
    fn eq(&self, other: &Self) -> bool {
        self.group == other.group && self.error.to_string() == other.error.to_string()
    }
}

impl Serialize for SkippedGroup {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("SkippedGroup", 2)?;
        state.serialize_field("group", &self.group)?;
        state.serialize_field("reason", &self.error.to_string())?;
        state.end()
    }
}

/// Input records dropped before aggregation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DroppedRecords {
    /// Observations with a blank group key
    pub malformed: usize,
    /// Elementary records with an empty code fragment
    pub degenerate: usize,
}

/// One entry of the global ranking
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingEntry {
    pub rank: usize,
    pub group: String,
    pub score: f64,
}

/// What a renderer needs for one group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupOutlook {
    pub group_key: String,
    pub r_squared: f64,
    pub historical: MonthlySeries,
    pub forecast: Vec<ForecastPoint>,
}

/// Result of a run
#[derive(Debug, PartialEq, Serialize)]
pub struct PipelineOutput {
    /// The top groups, best first
    pub ranked: Vec<RankedResult>,
    /// Every fitted group in ranking order
    pub ranking: Vec<RankingEntry>,
    /// Groups without a forecast, in group order
    pub skipped: Vec<SkippedGroup>,
    pub dropped_records: DroppedRecords,
    /// Whether the run was cancelled before every group started
    pub cancelled: bool,
}

impl PipelineOutput {
    /// Renderer view of the top groups
    pub fn outlooks(&self) -> Vec<GroupOutlook> {
        self.ranked
            .iter()
            .map(|r| GroupOutlook {
                group_key: r.fit.group.clone(),
                r_squared: r.fit.r_squared,
                historical: r.historical.clone(),
                forecast: r.fit.forecast.clone(),
            })
            .collect()
    }

    /// Pretty-printed JSON of the whole output
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Runs the whole engine for one configuration
#[derive(Debug)]
pub struct ForecastPipeline<M: ForecastModel = Sarima> {
    config: ForecastConfig,
    forecaster: SeasonalForecaster<M>,
    pool: Option<rayon::ThreadPool>,
}

impl ForecastPipeline<Sarima> {
    /// Pipeline with the monthly seasonal model
    pub fn new(config: ForecastConfig) -> Result<Self> {
        let model = Sarima::new(SarimaOrder::monthly(), config.max_iterations)?;
        Self::with_model(config, model)
    }
}

impl<M: ForecastModel> ForecastPipeline<M> {
    /// Pipeline with any forecast model
    pub fn with_model(config: ForecastConfig, model: M) -> Result<Self> {
        config.validate()?;

        let forecaster = SeasonalForecaster::new(
            model,
            config.horizon_months,
            config.confidence_level,
            config.min_required_months,
        )?;
        let pool = match config.workers {
            Some(n) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build()
                    .map_err(|e| ForecastError::ConfigError(e.to_string()))?,
            ),
            None => None,
        };

        Ok(Self {
            config,
            forecaster,
            pool,
        })
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// Run to completion
    pub fn run(&self, observations: &[Observation]) -> Result<PipelineOutput> {
        self.run_with_cancellation(observations, &CancellationFlag::new())
    }

    /// Run, starting no new group once `cancel` is set
    ///
    /// Fails with `Cancelled` if cancellation left nothing fitted and with
    /// `EmptyResultSet` if no group could be fitted at all.
    pub fn run_with_cancellation(
        &self,
        observations: &[Observation],
        cancel: &CancellationFlag,
    ) -> Result<PipelineOutput> {
        let started = Instant::now();

        let expansion = expand_all(observations, self.config.expansion);
        let dropped_records = DroppedRecords {
            malformed: expansion.malformed,
            degenerate: expansion.degenerate,
        };

        let mut skipped = Vec::new();
        let mut series = Vec::new();
        for (group, records) in group_by_key(expansion.records) {
            match aggregate_monthly(&group, &records) {
                Ok(s) => series.push(s),
                Err(error) => skipped.push(SkippedGroup { group, error }),
            }
        }

        info!(
            observations = observations.len(),
            groups = series.len() + skipped.len(),
            malformed = dropped_records.malformed,
            degenerate = dropped_records.degenerate,
            "starting forecast run"
        );

        let fits = match &self.pool {
            Some(pool) => pool.install(|| self.fit_all(&series, cancel)),
            None => self.fit_all(&series, cancel),
        };

        let mut fitted = Vec::with_capacity(fits.len());
        for (historical, fit) in series.into_iter().zip(fits) {
            match fit {
                Ok(fit) => fitted.push(ForecastedGroup::new(historical, fit)),
                Err(error) => skipped.push(SkippedGroup {
                    group: historical.group().to_string(),
                    error,
                }),
            }
        }
        skipped.sort_by(|a, b| a.group.cmp(&b.group));

        for s in skipped.iter().filter(|s| !matches!(s.error, ForecastError::Cancelled)) {
            warn!(group = %s.group, error = %s.error, "skipping group");
        }

        let cancelled = skipped
            .iter()
            .any(|s| matches!(s.error, ForecastError::Cancelled));
        if fitted.is_empty() {
            return Err(if cancelled {
                ForecastError::Cancelled
            } else {
                ForecastError::EmptyResultSet
            });
        }

        let mut ranked = order(fitted, self.config.ranking_key);
        let ranking: Vec<RankingEntry> = ranked
            .iter()
            .map(|r| RankingEntry {
                rank: r.rank,
                group: r.fit.group.clone(),
                score: r.score,
            })
            .collect();
        ranked.truncate(self.config.top_n);

        info!(
            fitted = ranking.len(),
            skipped = skipped.len(),
            cancelled,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "forecast run finished"
        );

        Ok(PipelineOutput {
            ranked,
            ranking,
            skipped,
            dropped_records,
            cancelled,
        })
    }

    fn fit_all(&self, series: &[MonthlySeries], cancel: &CancellationFlag) -> Vec<Result<FitResult>> {
        series
            .par_iter()
            .map(|s| {
                if cancel.is_cancelled() {
                    return Err(ForecastError::Cancelled);
                }
                let fit = self.forecaster.fit(s);
                if let Ok(f) = &fit {
                    debug!(
                        group = %f.group,
                        r_squared = f.r_squared,
                        months = s.len(),
                        "group fitted"
                    );
                }
                fit
            })
            .collect()
    }
}
