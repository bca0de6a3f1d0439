//! Monthly aggregation of irregular observations

use crate::data::{ElementaryGroupObservation, MonthlyPoint, MonthlySeries, YearMonth};
use crate::error::Result;
use std::collections::BTreeMap;

/// Partition elementary records by group key, in key order
pub fn group_by_key(
    records: Vec<ElementaryGroupObservation>,
) -> BTreeMap<String, Vec<ElementaryGroupObservation>> {
    let mut groups: BTreeMap<String, Vec<ElementaryGroupObservation>> = BTreeMap::new();
    for record in records {
        groups.entry(record.group_key.clone()).or_default().push(record);
    }
    groups
}

/// Mean value per calendar month for one group
///
/// Months with no observations are omitted. Records are sorted by
/// `(date, value)` first, so the same multiset of records always sums in
/// the same order and gives bit-identical means.
pub fn aggregate_monthly(
    group: &str,
    observations: &[ElementaryGroupObservation],
) -> Result<MonthlySeries> {
    let mut sorted: Vec<(chrono::NaiveDate, f64)> =
        observations.iter().map(|o| (o.date, o.value)).collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.total_cmp(&b.1)));

    let mut points: Vec<MonthlyPoint> = Vec::new();
    let mut current: Option<(YearMonth, f64, usize)> = None;

    for (date, value) in sorted {
        let month = YearMonth::from_date(date);
        current = match current {
            Some((m, sum, count)) if m == month => Some((m, sum + value, count + 1)),
            Some((m, sum, count)) => {
                points.push(MonthlyPoint::new(m, sum / count as f64));
                Some((month, value, 1))
            }
            None => Some((month, value, 1)),
        };
    }
    if let Some((m, sum, count)) = current {
        points.push(MonthlyPoint::new(m, sum / count as f64));
    }

    MonthlySeries::new(group, points)
}
