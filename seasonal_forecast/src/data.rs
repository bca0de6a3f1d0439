//! Observations, calendar months and monthly series

use crate::error::{ForecastError, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single record from the feed: one value for one group on one date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Calendar date of the record
    pub date: NaiveDate,
    /// Group label, possibly composite (e.g. `"Huntington-Ashland, WV-KY-OH"`)
    pub group_key: String,
    /// Observed value
    pub value: f64,
}

impl Observation {
    /// Create a new observation
    pub fn new(date: NaiveDate, group_key: impl Into<String>, value: f64) -> Self {
        Self {
            date,
            group_key: group_key.into(),
            value,
        }
    }
}

/// An observation whose key names exactly one logical group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElementaryGroupObservation {
    /// Calendar date, copied from the source observation
    pub date: NaiveDate,
    /// Elementary group key
    pub group_key: String,
    /// Value, copied from the source observation
    pub value: f64,
}

impl ElementaryGroupObservation {
    /// Create a new elementary observation
    pub fn new(date: NaiveDate, group_key: impl Into<String>, value: f64) -> Self {
        Self {
            date,
            group_key: group_key.into(),
            value,
        }
    }

    /// Whether the key is empty (an empty fragment of a composite key)
    pub fn is_degenerate(&self) -> bool {
        self.group_key.is_empty()
    }
}

/// A calendar month
///
/// Ordered chronologically; arithmetic never skips or repeats a month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    /// Create a month, validating `month` is in `1..=12`
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(ForecastError::InvalidParameter(format!(
                "Month must be between 1 and 12, got {}",
                month
            )));
        }
        Ok(Self { year, month })
    }

    /// The month containing `date`
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// The following month
    pub fn succ(self) -> Self {
        self.add_months(1)
    }

    /// The month `n` months later
    pub fn add_months(self, n: usize) -> Self {
        Self::from_index(self.index() + n as i64)
    }

    /// Signed number of months from `self` to `later`
    pub fn months_until(self, later: YearMonth) -> i64 {
        later.index() - self.index()
    }

    /// First calendar day of the month
    pub fn first_day(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    /// Last calendar day of the month, the date monthly means are plotted at
    pub fn month_end(self) -> Option<NaiveDate> {
        self.succ().first_day()?.pred_opt()
    }

    fn index(self) -> i64 {
        self.year as i64 * 12 + (self.month as i64 - 1)
    }

    fn from_index(index: i64) -> Self {
        Self {
            year: index.div_euclid(12) as i32,
            month: index.rem_euclid(12) as u32 + 1,
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// One point of a monthly series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlyPoint {
    pub month: YearMonth,
    pub value: f64,
}

impl MonthlyPoint {
    pub fn new(month: YearMonth, value: f64) -> Self {
        Self { month, value }
    }
}

/// Monthly series for one group
///
/// Months are strictly increasing. Months without data are absent rather
/// than zero-filled, so consecutive points may be more than a month apart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlySeries {
    group: String,
    points: Vec<MonthlyPoint>,
}

impl MonthlySeries {
    /// Create a series, validating month order and finiteness of values
    pub fn new(group: impl Into<String>, points: Vec<MonthlyPoint>) -> Result<Self> {
        let group = group.into();

        if let Some(bad) = points.iter().find(|p| !p.value.is_finite()) {
            return Err(ForecastError::ValidationError(format!(
                "Series {:?} has a non-finite value at {}",
                group, bad.month
            )));
        }
        if let Some(w) = points.windows(2).find(|w| w[0].month >= w[1].month) {
            return Err(ForecastError::ValidationError(format!(
                "Series {:?} months must be strictly increasing ({} then {})",
                group, w[0].month, w[1].month
            )));
        }

        Ok(Self { group, points })
    }

    /// Group the series belongs to
    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn points(&self) -> &[MonthlyPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Values in month order
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    /// Months in order
    pub fn months(&self) -> Vec<YearMonth> {
        self.points.iter().map(|p| p.month).collect()
    }

    pub fn first_month(&self) -> Option<YearMonth> {
        self.points.first().map(|p| p.month)
    }

    pub fn last_month(&self) -> Option<YearMonth> {
        self.points.last().map(|p| p.month)
    }

    /// Value of the latest month
    pub fn last_value(&self) -> Option<f64> {
        self.points.last().map(|p| p.value)
    }

    /// Mean of the values
    pub fn mean(&self) -> Option<f64> {
        forecast_math::mean(&self.values())
    }

    /// Values laid out on a contiguous monthly grid from the first to the
    /// last month, with `None` for months that have no data
    pub fn to_grid(&self) -> Vec<Option<f64>> {
        let (first, last) = match (self.first_month(), self.last_month()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Vec::new(),
        };

        let mut grid = vec![None; first.months_until(last) as usize + 1];
        for p in &self.points {
            grid[first.months_until(p.month) as usize] = Some(p.value);
        }
        grid
    }
}
