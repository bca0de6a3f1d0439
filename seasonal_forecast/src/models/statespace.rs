//! Kalman filtering of ARMA models in Harvey's state-space form
//!
//! An integrated seasonal ARIMA model is handled as an ARMA model whose
//! autoregressive polynomial carries the differencing unit roots:
//!
//! ```text
//! y[t]       = alpha[t][0]
//! alpha[t+1] = T alpha[t] + R eps[t+1],   eps ~ N(0, sigma2)
//! ```
//!
//! `T` has the autoregressive coefficients in its first column and ones on
//! the superdiagonal; `R` holds the moving-average polynomial. The filter
//! runs with `sigma2 = 1` and every variance it reports is relative to
//! `sigma2`, which is concentrated out of the likelihood by the caller.
//! Both matrix products exploit that structure, so a step costs
//! `O(dim^2)` rather than `O(dim^3)`.

/// Prior variance of the approximate-diffuse initial state
pub const DIFFUSE_VARIANCE: f64 = 1e6;

/// A linear Gaussian state-space model in Harvey form
#[derive(Debug, Clone, PartialEq)]
pub struct StateSpace {
    /// First column of the transition matrix
    transition: Vec<f64>,
    /// Selection vector, `[1, b1, b2, ...]`
    selection: Vec<f64>,
}

/// Predicted state mean and covariance for one time step
#[derive(Debug, Clone, PartialEq)]
pub struct PredictedState {
    pub mean: Vec<f64>,
    /// Row-major `dim x dim` covariance
    pub cov: Vec<f64>,
}

/// Output of a filtering pass
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOutput {
    /// One-step-ahead prediction for each grid step
    pub predictions: Vec<f64>,
    /// Relative prediction variance for each grid step
    pub variances: Vec<f64>,
    /// State predicted for the step after the last grid step
    pub next: PredictedState,
}

impl StateSpace {
    /// Build from full lag polynomials
    ///
    /// `ar_poly = [1, c1, c2, ...]` encodes `1 + c1 B + c2 B^2 + ...` on the
    /// left of the model equation and `ma_poly = [1, b1, ...]` the
    /// moving-average side.
    pub fn from_polynomials(ar_poly: &[f64], ma_poly: &[f64]) -> Self {
        let ar_order = ar_poly.len().saturating_sub(1);
        let dim = ar_order.max(ma_poly.len()).max(1);

        let mut transition = vec![0.0; dim];
        for (i, c) in ar_poly.iter().skip(1).enumerate() {
            transition[i] = -c;
        }

        let mut selection = vec![0.0; dim];
        selection[0] = 1.0;
        for (i, b) in ma_poly.iter().enumerate().skip(1) {
            selection[i] = *b;
        }

        Self {
            transition,
            selection,
        }
    }

    /// State dimension
    pub fn dim(&self) -> usize {
        self.transition.len()
    }

    /// Approximate-diffuse initial state
    pub fn diffuse_start(&self) -> PredictedState {
        let m = self.dim();
        let mut cov = vec![0.0; m * m];
        for i in 0..m {
            cov[i * m + i] = DIFFUSE_VARIANCE;
        }
        PredictedState {
            mean: vec![0.0; m],
            cov,
        }
    }

    /// Filter a grid of observations, `None` marking a missing step
    ///
    /// Missing steps are predicted through without an update. Returns
    /// `None` when a prediction variance stops being positive and finite,
    /// which happens for parameter values where the recursion breaks down.
    pub fn filter(&self, observations: &[Option<f64>]) -> Option<FilterOutput> {
        let m = self.dim();
        let mut state = self.diffuse_start();
        let mut scratch = vec![0.0; m * m];
        let mut predictions = Vec::with_capacity(observations.len());
        let mut variances = Vec::with_capacity(observations.len());

        for obs in observations {
            let f = state.cov[0];
            if !(f > 0.0 && f.is_finite()) {
                return None;
            }
            predictions.push(state.mean[0]);
            variances.push(f);

            if let Some(y) = obs {
                let v = y - state.mean[0];
                let gain: Vec<f64> = (0..m).map(|i| state.cov[i * m]).collect();
                for i in 0..m {
                    state.mean[i] += gain[i] * v / f;
                    for j in 0..m {
                        state.cov[i * m + j] -= gain[i] * gain[j] / f;
                    }
                }
            }

            self.advance(&mut state, &mut scratch);
        }

        Some(FilterOutput {
            predictions,
            variances,
            next: state,
        })
    }

    /// Predictions and relative variances for `horizon` steps from `start`
    pub fn project(&self, start: &PredictedState, horizon: usize) -> Vec<(f64, f64)> {
        let mut state = start.clone();
        let mut scratch = vec![0.0; self.dim() * self.dim()];
        let mut path = Vec::with_capacity(horizon);

        for _ in 0..horizon {
            path.push((state.mean[0], state.cov[0]));
            self.advance(&mut state, &mut scratch);
        }
        path
    }

    /// `a <- T a`, `P <- T P T' + R R'`
    fn advance(&self, state: &mut PredictedState, scratch: &mut [f64]) {
        let m = self.dim();
        let t = &self.transition;
        let r = &self.selection;

        let head = state.mean[0];
        for i in 0..m {
            let next = if i + 1 < m { state.mean[i + 1] } else { 0.0 };
            state.mean[i] = t[i] * head + next;
        }

        // scratch = T P
        let p = &state.cov;
        for i in 0..m {
            for j in 0..m {
                let below = if i + 1 < m { p[(i + 1) * m + j] } else { 0.0 };
                scratch[i * m + j] = t[i] * p[j] + below;
            }
        }

        // P = scratch T' + R R'
        let p = &mut state.cov;
        for i in 0..m {
            for j in 0..m {
                let right = if j + 1 < m { scratch[i * m + j + 1] } else { 0.0 };
                p[i * m + j] = scratch[i * m] * t[j] + right + r[i] * r[j];
            }
        }
        for i in 0..m {
            for j in (i + 1)..m {
                let avg = 0.5 * (p[i * m + j] + p[j * m + i]);
                p[i * m + j] = avg;
                p[j * m + i] = avg;
            }
        }
    }
}
