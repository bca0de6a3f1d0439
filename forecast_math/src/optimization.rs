//! Derivative-free minimisation with the Nelder–Mead simplex method.
//!
//! Used for maximum likelihood estimation where analytic gradients of the
//! Kalman-filter likelihood are not available. Objective values that are
//! not finite are treated as `+inf`, so a region where the objective breaks
//! down is simply never preferred by the simplex.

use crate::{MathError, Result};

const REFLECTION: f64 = 1.0;
const EXPANSION: f64 = 2.0;
const CONTRACTION: f64 = 0.5;
const SHRINK: f64 = 0.5;

/// Outcome of a minimisation run
#[derive(Debug, Clone, PartialEq)]
pub struct Minimum {
    /// Best point found
    pub point: Vec<f64>,
    /// Objective value at `point`
    pub value: f64,
    /// Number of simplex iterations performed
    pub iterations: usize,
    /// Whether the simplex met the tolerance before the iteration budget ran out
    pub converged: bool,
}

/// Nelder–Mead simplex minimiser
#[derive(Debug, Clone)]
pub struct NelderMead {
    max_iterations: usize,
    tolerance: f64,
    initial_step: f64,
    bounds: Option<Vec<(f64, f64)>>,
}

impl NelderMead {
    /// Create a new minimiser with an iteration budget and a relative tolerance
    pub fn new(max_iterations: usize, tolerance: f64) -> Result<Self> {
        if max_iterations == 0 {
            return Err(MathError::InvalidInput(
                "Iteration budget must be at least 1".to_string(),
            ));
        }
        if !(tolerance > 0.0 && tolerance.is_finite()) {
            return Err(MathError::InvalidInput(format!(
                "Tolerance must be a positive finite number, got {}",
                tolerance
            )));
        }

        Ok(Self {
            max_iterations,
            tolerance,
            initial_step: 0.1,
            bounds: None,
        })
    }

    /// Set the size of the initial simplex around the start point
    pub fn with_initial_step(mut self, step: f64) -> Self {
        self.initial_step = step;
        self
    }

    /// Restrict every coordinate to a closed interval
    pub fn with_bounds(mut self, bounds: Vec<(f64, f64)>) -> Self {
        self.bounds = Some(bounds);
        self
    }

    /// Minimise `objective` starting from `start`
    pub fn minimize<F>(&self, objective: F, start: &[f64]) -> Result<Minimum>
    where
        F: Fn(&[f64]) -> f64,
    {
        let n = start.len();
        if n == 0 {
            return Err(MathError::InvalidInput(
                "Cannot minimise over an empty parameter vector".to_string(),
            ));
        }
        if let Some(bounds) = &self.bounds {
            if bounds.len() != n {
                return Err(MathError::InvalidInput(format!(
                    "Expected {} bounds, got {}",
                    n,
                    bounds.len()
                )));
            }
        }

        let eval = |point: &[f64]| {
            let value = objective(point);
            if value.is_finite() {
                value
            } else {
                f64::INFINITY
            }
        };

        let mut simplex: Vec<Vec<f64>> = Vec::with_capacity(n + 1);
        simplex.push(self.clamp(start.to_vec()));
        for i in 0..n {
            let mut vertex = start.to_vec();
            let step = if start[i].abs() > 1e-8 {
                self.initial_step * start[i].abs().max(1.0)
            } else {
                self.initial_step
            };
            vertex[i] += step;
            simplex.push(self.clamp(vertex));
        }
        let mut values: Vec<f64> = simplex.iter().map(|v| eval(v)).collect();

        let mut iterations = 0;
        let mut converged = false;

        while iterations < self.max_iterations {
            iterations += 1;

            let mut order: Vec<usize> = (0..=n).collect();
            order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
            let best = order[0];
            let worst = order[n];
            let second_worst = order[n - 1];

            let spread = values[worst] - values[best];
            if spread.is_finite() && spread <= self.tolerance * (1.0 + values[best].abs()) {
                converged = true;
                break;
            }

            let centroid = centroid(&simplex, worst);
            let diameter = simplex
                .iter()
                .map(|v| distance(v, &centroid))
                .fold(0.0, f64::max);
            if diameter <= self.tolerance {
                converged = true;
                break;
            }

            let reflected = self.clamp(towards(&centroid, &simplex[worst], -REFLECTION));
            let reflected_value = eval(&reflected);

            if reflected_value < values[best] {
                let expanded = self.clamp(towards(&centroid, &reflected, EXPANSION));
                let expanded_value = eval(&expanded);
                if expanded_value < reflected_value {
                    simplex[worst] = expanded;
                    values[worst] = expanded_value;
                } else {
                    simplex[worst] = reflected;
                    values[worst] = reflected_value;
                }
                continue;
            }

            if reflected_value < values[second_worst] {
                simplex[worst] = reflected;
                values[worst] = reflected_value;
                continue;
            }

            // Outside contraction when the reflection improved on the worst vertex,
            // inside contraction otherwise.
            let (contracted, threshold) = if reflected_value < values[worst] {
                (
                    self.clamp(towards(&centroid, &reflected, CONTRACTION)),
                    reflected_value,
                )
            } else {
                (
                    self.clamp(towards(&centroid, &simplex[worst], CONTRACTION)),
                    values[worst],
                )
            };
            let contracted_value = eval(&contracted);
            if contracted_value < threshold {
                simplex[worst] = contracted;
                values[worst] = contracted_value;
                continue;
            }

            let anchor = simplex[best].clone();
            for i in 0..=n {
                if i == best {
                    continue;
                }
                let shrunk: Vec<f64> = anchor
                    .iter()
                    .zip(simplex[i].iter())
                    .map(|(a, x)| a + SHRINK * (x - a))
                    .collect();
                simplex[i] = self.clamp(shrunk);
                values[i] = eval(&simplex[i]);
            }
        }

        let best = (0..=n)
            .min_by(|&a, &b| values[a].total_cmp(&values[b]))
            .unwrap_or(0);

        Ok(Minimum {
            point: simplex[best].clone(),
            value: values[best],
            iterations,
            converged,
        })
    }

    fn clamp(&self, mut point: Vec<f64>) -> Vec<f64> {
        if let Some(bounds) = &self.bounds {
            for (x, &(lo, hi)) in point.iter_mut().zip(bounds.iter()) {
                *x = x.clamp(lo, hi);
            }
        }
        point
    }
}

/// Centroid of every vertex except `exclude`
fn centroid(simplex: &[Vec<f64>], exclude: usize) -> Vec<f64> {
    let n = simplex[0].len();
    let count = (simplex.len() - 1) as f64;
    let mut c = vec![0.0; n];
    for (i, vertex) in simplex.iter().enumerate() {
        if i == exclude {
            continue;
        }
        for (acc, x) in c.iter_mut().zip(vertex.iter()) {
            *acc += x;
        }
    }
    c.iter_mut().for_each(|x| *x /= count);
    c
}

/// `centroid + coef * (point - centroid)`
fn towards(centroid: &[f64], point: &[f64], coef: f64) -> Vec<f64> {
    centroid
        .iter()
        .zip(point.iter())
        .map(|(c, p)| c + coef * (p - c))
        .collect()
}

fn distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}
