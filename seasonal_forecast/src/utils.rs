//! Synthetic monthly data for examples and tests

use crate::data::{Observation, YearMonth};
use crate::error::{ForecastError, Result};
use chrono::Datelike;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use std::f64::consts::PI;

/// Linear trend plus a 12-month sine wave plus Gaussian noise
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticSeries {
    /// Value in the first month
    pub level: f64,
    /// Change per month
    pub slope: f64,
    /// Amplitude of the yearly cycle
    pub amplitude: f64,
    /// Standard deviation of the noise
    pub noise: f64,
}

impl SyntheticSeries {
    pub fn new(level: f64, slope: f64, amplitude: f64, noise: f64) -> Self {
        Self {
            level,
            slope,
            amplitude,
            noise,
        }
    }

    /// Noise-free value `t` months after the start
    pub fn expected(&self, t: usize) -> f64 {
        let t = t as f64;
        self.level + self.slope * t + self.amplitude * (2.0 * PI * t / 12.0).sin()
    }

    /// `months` observations for `group`, one per month starting at `start`,
    /// each dated on a seeded day between the 1st and the 28th
    pub fn observations(
        &self,
        group: &str,
        start: YearMonth,
        months: usize,
        seed: u64,
    ) -> Result<Vec<Observation>> {
        let normal = Normal::new(0.0, self.noise)
            .map_err(|e| ForecastError::InvalidParameter(e.to_string()))?;
        let mut rng = StdRng::seed_from_u64(seed);

        (0..months)
            .map(|t| {
                let month = start.add_months(t);
                let day = rng.gen_range(1..=28);
                let date = month
                    .first_day()
                    .and_then(|d| d.with_day0(day - 1))
                    .ok_or_else(|| {
                        ForecastError::InvalidParameter(format!("No day {} in {}", day, month))
                    })?;
                Ok(Observation::new(
                    date,
                    group,
                    self.expected(t) + normal.sample(&mut rng),
                ))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_generation_is_repeatable() {
        let gen = SyntheticSeries::new(100.0, 0.5, 10.0, 2.0);
        let start = YearMonth::new(2015, 1).unwrap();

        let a = gen.observations("A", start, 24, 7).unwrap();
        let b = gen.observations("A", start, 24, 7).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 24);
        assert_eq!(YearMonth::from_date(a[23].date), start.add_months(23));
    }

    #[test]
    fn test_expected_has_yearly_cycle() {
        let gen = SyntheticSeries::new(0.0, 0.0, 10.0, 1.0);
        assert!((gen.expected(3) - 10.0).abs() < 1e-9);
        assert!((gen.expected(15) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_rejects_negative_noise() {
        let gen = SyntheticSeries::new(0.0, 0.0, 0.0, -1.0);
        assert!(gen
            .observations("A", YearMonth::new(2020, 1).unwrap(), 3, 1)
            .is_err());
    }
}
