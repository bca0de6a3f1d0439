//! Seasonal ARIMA estimated by exact Gaussian likelihood

use crate::data::{MonthlyPoint, MonthlySeries, YearMonth};
use crate::error::{ForecastError, Result};
use crate::models::statespace::{FilterOutput, PredictedState, StateSpace};
use crate::models::{ForecastModel, ForecastPoint, ModelDiagnostics, TrainedForecastModel};
use forecast_math::{autocorrelation, difference, normal_quantile, NelderMead};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::debug;

/// Coefficients are searched inside `[-COEFFICIENT_LIMIT, COEFFICIENT_LIMIT]`.
/// Stationarity and invertibility are not imposed; the box only keeps the
/// simplex away from regions where the filter overflows.
pub const COEFFICIENT_LIMIT: f64 = 3.0;

const OPTIMIZER_TOLERANCE: f64 = 1e-8;

/// Orders of a multiplicative seasonal ARIMA model
/// `(p, d, q) x (P, D, Q)_s`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SarimaOrder {
    pub p: usize,
    pub d: usize,
    pub q: usize,
    pub seasonal_p: usize,
    pub seasonal_d: usize,
    pub seasonal_q: usize,
    pub period: usize,
}

impl SarimaOrder {
    /// `(1, 1, 1) x (1, 0, 1)_12`, the structure used for monthly postings
    pub const fn monthly() -> Self {
        Self {
            p: 1,
            d: 1,
            q: 1,
            seasonal_p: 1,
            seasonal_d: 0,
            seasonal_q: 1,
            period: 12,
        }
    }

    /// Number of estimated lag coefficients
    pub fn num_coefficients(&self) -> usize {
        self.p + self.q + self.seasonal_p + self.seasonal_q
    }

    fn validate(&self) -> Result<()> {
        let seasonal = self.seasonal_p + self.seasonal_d + self.seasonal_q;
        if seasonal > 0 && self.period < 2 {
            return Err(ForecastError::InvalidParameter(format!(
                "Seasonal terms need a period of at least 2, got {}",
                self.period
            )));
        }
        if self.num_coefficients() == 0 {
            return Err(ForecastError::InvalidParameter(
                "Model must estimate at least one lag coefficient".to_string(),
            ));
        }
        Ok(())
    }

    fn coefficient_names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.num_coefficients());
        names.extend((1..=self.p).map(|i| format!("phi_{}", i)));
        names.extend((1..=self.q).map(|i| format!("theta_{}", i)));
        names.extend((1..=self.seasonal_p).map(|i| format!("seasonal_phi_{}", i)));
        names.extend((1..=self.seasonal_q).map(|i| format!("seasonal_theta_{}", i)));
        names
    }

    /// Full AR and MA lag polynomials for a coefficient vector laid out as
    /// `[phi.., theta.., seasonal_phi.., seasonal_theta..]`
    fn polynomials(&self, coefficients: &[f64]) -> (Vec<f64>, Vec<f64>) {
        let (phi, rest) = coefficients.split_at(self.p);
        let (theta, rest) = rest.split_at(self.q);
        let (seasonal_phi, seasonal_theta) = rest.split_at(self.seasonal_p);

        let mut ar = lag_polynomial(phi, 1, -1.0);
        ar = multiply(&ar, &lag_polynomial(seasonal_phi, self.period, -1.0));
        for _ in 0..self.d {
            ar = multiply(&ar, &[1.0, -1.0]);
        }
        for _ in 0..self.seasonal_d {
            ar = multiply(&ar, &lag_polynomial(&[1.0], self.period, -1.0));
        }

        let ma = multiply(
            &lag_polynomial(theta, 1, 1.0),
            &lag_polynomial(seasonal_theta, self.period, 1.0),
        );

        (ar, ma)
    }

    fn state_space(&self, coefficients: &[f64]) -> StateSpace {
        let (ar, ma) = self.polynomials(coefficients);
        StateSpace::from_polynomials(&ar, &ma)
    }
}

impl Default for SarimaOrder {
    fn default() -> Self {
        Self::monthly()
    }
}

/// `1 + sign * (c1 B^step + c2 B^(2 step) + ...)`
fn lag_polynomial(coefficients: &[f64], step: usize, sign: f64) -> Vec<f64> {
    let mut poly = vec![0.0; coefficients.len() * step + 1];
    poly[0] = 1.0;
    for (i, c) in coefficients.iter().enumerate() {
        poly[(i + 1) * step] = sign * c;
    }
    poly
}

fn multiply(a: &[f64], b: &[f64]) -> Vec<f64> {
    let mut out = vec![0.0; a.len() + b.len() - 1];
    for (i, x) in a.iter().enumerate() {
        for (j, y) in b.iter().enumerate() {
            out[i + j] += x * y;
        }
    }
    out
}

/// Likelihood of one coefficient vector with `sigma2` concentrated out
#[derive(Debug, Clone)]
struct Evaluation {
    /// `n ln(sigma2) + sum ln(F)`, minimised by the optimizer
    objective: f64,
    sigma2: f64,
    log_likelihood: f64,
    observations: usize,
    output: FilterOutput,
}

/// Filter `grid` and score the observed steps after the first `burn` of them
fn evaluate(space: &StateSpace, grid: &[Option<f64>], burn: usize) -> Option<Evaluation> {
    let output = space.filter(grid)?;

    let mut seen = 0;
    let mut observations = 0;
    let mut weighted_sq = 0.0;
    let mut log_det = 0.0;

    for (t, obs) in grid.iter().enumerate() {
        if let Some(y) = obs {
            if seen >= burn {
                let f = output.variances[t];
                weighted_sq += (y - output.predictions[t]).powi(2) / f;
                log_det += f.ln();
                observations += 1;
            }
            seen += 1;
        }
    }
    if observations == 0 {
        return None;
    }

    let n = observations as f64;
    let sigma2 = (weighted_sq / n).max(f64::MIN_POSITIVE);
    let objective = n * sigma2.ln() + log_det;
    if !objective.is_finite() {
        return None;
    }

    Some(Evaluation {
        objective,
        sigma2,
        log_likelihood: -0.5 * (n * ((2.0 * PI).ln() + 1.0) + objective),
        observations,
        output,
    })
}

/// Deterministic starting point from sample autocorrelations of the
/// differenced values
fn start_values(order: &SarimaOrder, values: &[f64]) -> Vec<f64> {
    let diffs = difference(values);
    let acf = |lag: usize| {
        autocorrelation(&diffs, lag)
            .map(|r| r.clamp(-0.9, 0.9))
            .unwrap_or(0.0)
    };

    let mut start = Vec::with_capacity(order.num_coefficients());
    start.extend((1..=order.p).map(|lag| if lag == 1 { acf(1) } else { 0.0 }));
    start.extend(std::iter::repeat(0.0).take(order.q));
    start.extend(
        (1..=order.seasonal_p).map(|k| if k == 1 { acf(order.period) } else { 0.0 }),
    );
    start.extend(std::iter::repeat(0.0).take(order.seasonal_q));
    start
}

/// Seasonal ARIMA model (untrained)
///
/// Fitted by maximum likelihood through the Kalman filter with an
/// approximate-diffuse start. The series is laid on a contiguous monthly
/// grid and months without data are treated as missing observations. The
/// first predictions, made while the state is still diffuse, are left out
/// of the likelihood: as many as the state has dimensions, but never so
/// many that fewer than `coefficients + 2` observations remain.
#[derive(Debug, Clone)]
pub struct Sarima {
    name: String,
    order: SarimaOrder,
    max_iterations: usize,
}

impl Sarima {
    /// Create a new model with an optimizer iteration budget
    pub fn new(order: SarimaOrder, max_iterations: usize) -> Result<Self> {
        order.validate()?;
        if max_iterations == 0 {
            return Err(ForecastError::InvalidParameter(
                "Optimizer iteration budget must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            name: format!(
                "SARIMA({},{},{})({},{},{})[{}]",
                order.p,
                order.d,
                order.q,
                order.seasonal_p,
                order.seasonal_d,
                order.seasonal_q,
                order.period
            ),
            order,
            max_iterations,
        })
    }

    /// `(1,1,1)(1,0,1)[12]` with the default iteration budget
    pub fn monthly() -> Self {
        Self {
            name: "SARIMA(1,1,1)(1,0,1)[12]".to_string(),
            order: SarimaOrder::monthly(),
            max_iterations: 2000,
        }
    }

    pub fn order(&self) -> SarimaOrder {
        self.order
    }

    /// Smallest series the likelihood is defined for
    pub fn min_observations(&self) -> usize {
        self.order.num_coefficients() + 2
    }
}

impl Default for Sarima {
    fn default() -> Self {
        Self::monthly()
    }
}

impl ForecastModel for Sarima {
    type Trained = TrainedSarima;

    fn train(&self, series: &MonthlySeries) -> Result<TrainedSarima> {
        let needed = self.min_observations();
        let (last_month, values) = match series.last_month() {
            Some(last) if series.len() >= needed => (last, series.values()),
            _ => {
                return Err(ForecastError::InsufficientData {
                    needed,
                    got: series.len(),
                })
            }
        };

        let grid = series.to_grid();
        let k = self.order.num_coefficients();
        let probe = self.order.state_space(&vec![0.0; k]);
        let burn = probe.dim().min(series.len() - needed);

        let objective = |coefficients: &[f64]| {
            evaluate(&self.order.state_space(coefficients), &grid, burn)
                .map(|e| e.objective)
                .unwrap_or(f64::INFINITY)
        };

        let optimizer = NelderMead::new(self.max_iterations, OPTIMIZER_TOLERANCE)?
            .with_initial_step(0.1)
            .with_bounds(vec![(-COEFFICIENT_LIMIT, COEFFICIENT_LIMIT); k]);

        let first = optimizer.minimize(&objective, &start_values(&self.order, &values))?;
        let restart = optimizer.minimize(&objective, &first.point)?;
        let iterations = first.iterations + restart.iterations;
        let best = if restart.value <= first.value {
            restart
        } else {
            first
        };

        if !best.converged {
            return Err(ForecastError::FitFailed(format!(
                "{} did not converge within {} iterations",
                self.name, self.max_iterations
            )));
        }
        if best.point.iter().any(|c| !c.is_finite()) {
            return Err(ForecastError::FitFailed(format!(
                "{} produced non-finite coefficients",
                self.name
            )));
        }

        let space = self.order.state_space(&best.point);
        let evaluation = evaluate(&space, &grid, burn).ok_or_else(|| {
            ForecastError::FitFailed(format!(
                "{} likelihood is not finite at the optimum",
                self.name
            ))
        })?;

        let first_month = series.first_month().unwrap_or(last_month);
        let fitted_points: Vec<MonthlyPoint> = series
            .points()
            .iter()
            .map(|p| {
                let t = first_month.months_until(p.month) as usize;
                MonthlyPoint::new(p.month, evaluation.output.predictions[t])
            })
            .collect();
        let fitted = MonthlySeries::new(series.group(), fitted_points).map_err(|e| {
            ForecastError::FitFailed(format!("{} in-sample predictions: {}", self.name, e))
        })?;

        debug!(
            group = %series.group(),
            model = %self.name,
            iterations,
            sigma2 = evaluation.sigma2,
            log_likelihood = evaluation.log_likelihood,
            "fitted seasonal model"
        );

        Ok(TrainedSarima {
            name: self.name.clone(),
            order: self.order,
            coefficients: best.point,
            sigma2: evaluation.sigma2,
            log_likelihood: evaluation.log_likelihood,
            observations: evaluation.observations,
            iterations,
            space,
            next: evaluation.output.next,
            last_month,
            fitted,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Trained seasonal ARIMA model
#[derive(Debug, Clone)]
pub struct TrainedSarima {
    name: String,
    order: SarimaOrder,
    coefficients: Vec<f64>,
    sigma2: f64,
    log_likelihood: f64,
    observations: usize,
    iterations: usize,
    space: StateSpace,
    /// State predicted for the first month after the history
    next: PredictedState,
    last_month: YearMonth,
    fitted: MonthlySeries,
}

impl TrainedSarima {
    /// Estimated coefficients, `[phi.., theta.., seasonal_phi.., seasonal_theta..]`
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Innovation variance
    pub fn sigma2(&self) -> f64 {
        self.sigma2
    }

    pub fn order(&self) -> SarimaOrder {
        self.order
    }
}

impl TrainedForecastModel for TrainedSarima {
    fn fitted(&self) -> &MonthlySeries {
        &self.fitted
    }

    fn forecast(&self, horizon: usize, confidence_level: f64) -> Result<Vec<ForecastPoint>> {
        let z = normal_quantile(confidence_level)?;

        Ok(self
            .space
            .project(&self.next, horizon)
            .into_iter()
            .enumerate()
            .map(|(h, (mean, variance))| {
                let se = (self.sigma2 * variance).max(0.0).sqrt();
                ForecastPoint {
                    month: self.last_month.add_months(h + 1),
                    mean,
                    lower: mean - z * se,
                    upper: mean + z * se,
                }
            })
            .collect())
    }

    fn diagnostics(&self) -> ModelDiagnostics {
        // Lag coefficients plus the innovation variance
        let k = (self.coefficients.len() + 1) as f64;
        let n = self.observations as f64;

        ModelDiagnostics {
            model: self.name.clone(),
            parameters: self
                .order
                .coefficient_names()
                .into_iter()
                .zip(self.coefficients.iter().copied())
                .collect(),
            sigma2: self.sigma2,
            log_likelihood: self.log_likelihood,
            aic: -2.0 * self.log_likelihood + 2.0 * k,
            bic: -2.0 * self.log_likelihood + k * n.ln(),
            observations: self.observations,
            iterations: self.iterations,
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn monthly_polynomials_expand_seasonal_terms() {
        let order = SarimaOrder::monthly();
        let (ar, ma) = order.polynomials(&[0.5, 0.2, 0.4, 0.3]);

        // (1 - 0.5B)(1 - 0.4B^12)(1 - B)
        assert_eq!(ar.len(), 15);
        assert_abs_diff_eq!(ar[1], -1.5);
        assert_abs_diff_eq!(ar[2], 0.5);
        assert_abs_diff_eq!(ar[12], -0.4);
        assert_abs_diff_eq!(ar[13], 0.4 + 0.2, epsilon = 1e-12);
        assert_abs_diff_eq!(ar[14], -0.2, epsilon = 1e-12);

        // (1 + 0.2B)(1 + 0.3B^12)
        assert_eq!(ma.len(), 14);
        assert_abs_diff_eq!(ma[1], 0.2);
        assert_abs_diff_eq!(ma[12], 0.3);
        assert_abs_diff_eq!(ma[13], 0.06, epsilon = 1e-12);

        assert_eq!(order.state_space(&[0.5, 0.2, 0.4, 0.3]).dim(), 14);
    }

    #[test]
    fn model_name_reflects_order() {
        let model = Sarima::new(SarimaOrder::monthly(), 100).unwrap();
        assert_eq!(model.name(), Sarima::monthly().name());
        assert_eq!(model.min_observations(), 6);
    }

    #[test]
    fn rejects_invalid_orders() {
        let mut order = SarimaOrder::monthly();
        order.period = 1;
        assert!(Sarima::new(order, 100).is_err());

        let empty = SarimaOrder {
            p: 0,
            d: 1,
            q: 0,
            seasonal_p: 0,
            seasonal_d: 0,
            seasonal_q: 0,
            period: 12,
        };
        assert!(Sarima::new(empty, 100).is_err());
        assert!(Sarima::new(SarimaOrder::monthly(), 0).is_err());
    }

    #[test]
    fn coefficient_names_follow_layout() {
        assert_eq!(
            SarimaOrder::monthly().coefficient_names(),
            vec!["phi_1", "theta_1", "seasonal_phi_1", "seasonal_theta_1"]
        );
    }
}
