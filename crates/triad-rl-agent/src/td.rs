//! Off-policy semi-gradient TD(0) with linear function approximation

use ndarray::Array2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use triad_rl_core::{check_gamma, check_learning_rate, LinearValueFunction, Result, ValueFunction};
use triad_rl_env::BairdDynamics;

/// One transition and the quantities the update used
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TdStep {
    /// State the transition left
    pub from: usize,
    /// State the transition reached
    pub to: usize,
    /// `gamma * V(to) - V(from)` (rewards are always zero)
    pub td_error: f64,
    /// Importance-sampling ratio of the transition
    pub ratio: f64,
}

/// Semi-gradient TD(0) learner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SemiGradientTd0 {
    alpha: f64,
    gamma: f64,
}

impl SemiGradientTd0 {
    /// Create a learner with step size `alpha` and discount `gamma`
    pub fn new(alpha: f64, gamma: f64) -> Result<Self> {
        check_learning_rate(alpha)?;
        check_gamma(gamma)?;
        Ok(Self { alpha, gamma })
    }

    /// Step size
    #[must_use]
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Discount factor
    #[must_use]
    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    /// Sample one behavior transition, update the weights, and advance the chain.
    ///
    /// `w <- w + alpha * rho * delta * x(s)`; transitions with `rho = 0` leave `w` untouched.
    pub fn step<R: Rng + ?Sized>(
        &self,
        dynamics: &mut BairdDynamics,
        value_fn: &mut LinearValueFunction,
        rng: &mut R,
    ) -> TdStep {
        let from = dynamics.state();
        let to = dynamics.sample_next(rng);
        let td_error = self.gamma * value_fn.value(to) - value_fn.value(from);
        let ratio = BairdDynamics::importance_ratio(to);
        if ratio > 0.0 {
            value_fn.nudge(from, self.alpha * ratio * td_error);
        }
        dynamics.advance(to);
        TdStep {
            from,
            to,
            td_error,
            ratio,
        }
    }

    /// Run `steps` updates and return the weight trajectory, shape `(steps + 1, dim)`.
    ///
    /// Row 0 holds the weights before any update.
    pub fn trace<R: Rng + ?Sized>(
        &self,
        dynamics: &mut BairdDynamics,
        value_fn: &mut LinearValueFunction,
        steps: usize,
        rng: &mut R,
    ) -> Array2<f64> {
        let dim = value_fn.weights().len();
        let mut history = Array2::zeros((steps + 1, dim));
        history.row_mut(0).assign(value_fn.weights());
        for t in 1..=steps {
            self.step(dynamics, value_fn, rng);
            history.row_mut(t).assign(value_fn.weights());
        }
        history
    }
}
