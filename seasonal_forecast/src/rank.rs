//! Ordering and top-N selection of fitted groups

use crate::data::MonthlySeries;
use crate::models::FitResult;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// The scalar groups are compared by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingKey {
    /// Point forecast of the last forecast month
    #[default]
    FinalForecast,
    /// Average point forecast over the horizon
    MeanForecast,
    /// Latest historical value
    LastObserved,
    /// Average historical value
    HistoricalMean,
}

impl RankingKey {
    /// Score of one group; `None` when the group has nothing to score
    pub fn score(&self, group: &ForecastedGroup) -> Option<f64> {
        match self {
            RankingKey::FinalForecast => group.fit.final_forecast().map(|p| p.mean),
            RankingKey::MeanForecast => {
                let means: Vec<f64> = group.fit.forecast.iter().map(|p| p.mean).collect();
                forecast_math::mean(&means)
            }
            RankingKey::LastObserved => group.historical.last_value(),
            RankingKey::HistoricalMean => group.historical.mean(),
        }
    }
}

/// A group's history together with its fit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastedGroup {
    pub historical: MonthlySeries,
    pub fit: FitResult,
}

impl ForecastedGroup {
    pub fn new(historical: MonthlySeries, fit: FitResult) -> Self {
        Self { historical, fit }
    }

    pub fn group(&self) -> &str {
        &self.fit.group
    }
}

/// A group's position in the ranking
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedResult {
    /// 1-based position
    pub rank: usize,
    /// Value of the ranking key
    pub score: f64,
    pub fit: FitResult,
    pub historical: MonthlySeries,
}

impl RankedResult {
    pub fn group(&self) -> &str {
        &self.fit.group
    }
}

/// Every group in ranking order: score descending, ties by group name
/// ascending. Groups without a score sort last.
pub fn order(groups: Vec<ForecastedGroup>, key: RankingKey) -> Vec<RankedResult> {
    let mut scored: Vec<(Option<f64>, ForecastedGroup)> =
        groups.into_iter().map(|g| (key.score(&g), g)).collect();

    scored.sort_by(|(sa, a), (sb, b)| {
        let by_score = match (sa, sb) {
            (Some(x), Some(y)) => y.total_cmp(x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        by_score.then_with(|| a.group().cmp(b.group()))
    });

    scored
        .into_iter()
        .enumerate()
        .map(|(i, (score, g))| RankedResult {
            rank: i + 1,
            score: score.unwrap_or(f64::NAN),
            fit: g.fit,
            historical: g.historical,
        })
        .collect()
}

/// The first `top_n` groups of [`order`]; all of them when fewer qualify
pub fn rank(groups: Vec<ForecastedGroup>, key: RankingKey, top_n: usize) -> Vec<RankedResult> {
    let mut ranked = order(groups, key);
    ranked.truncate(top_n);
    ranked
}
