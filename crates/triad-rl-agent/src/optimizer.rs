//! Adam optimizer over a [`ParameterSet`]

use ndarray::Zip;
use serde::{Deserialize, Serialize};

use triad_rl_core::{check_learning_rate, Result};

use crate::policy::ParameterSet;

/// Adam hyperparameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdamConfig {
    /// Step size
    pub learning_rate: f64,
    /// First moment decay
    pub beta1: f64,
    /// Second moment decay
    pub beta2: f64,
    /// Denominator epsilon
    pub epsilon: f64,
}

impl AdamConfig {
    /// Defaults with the given step size
    #[must_use]
    pub fn with_learning_rate(learning_rate: f64) -> Self {
        Self {
            learning_rate,
            ..Self::default()
        }
    }
}

impl Default for AdamConfig {
    fn default() -> Self {
        Self {
            learning_rate: 1e-3,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-8,
        }
    }
}

/// Adam state: first and second moments per tensor and the step count
#[derive(Debug, Clone)]
pub struct Adam {
    config: AdamConfig,
    momentum: ParameterSet,
    velocity: ParameterSet,
    t: i32,
}

impl Adam {
    /// Fresh optimizer for parameters shaped like `params`
    pub fn new(config: AdamConfig, params: &ParameterSet) -> Result<Self> {
        check_learning_rate(config.learning_rate)?;
        Ok(Self {
            config,
            momentum: params.zeros_like(),
            velocity: params.zeros_like(),
            t: 0,
        })
    }

    /// Number of steps taken
    #[must_use]
    pub fn steps(&self) -> i32 {
        self.t
    }

    /// Hyperparameters
    #[must_use]
    pub fn config(&self) -> &AdamConfig {
        &self.config
    }

    /// Apply one bias-corrected Adam step
    pub fn step(&mut self, params: &mut ParameterSet, grads: &ParameterSet) {
        self.t += 1;
        let AdamConfig {
            learning_rate,
            beta1,
            beta2,
            epsilon,
        } = self.config;
        let bias1 = 1.0 - beta1.powi(self.t);
        let bias2 = 1.0 - beta2.powi(self.t);

        let moments = self
            .momentum
            .tensors_mut()
            .into_iter()
            .zip(self.velocity.tensors_mut());
        for ((param, grad), (m, v)) in params
            .tensors_mut()
            .into_iter()
            .zip(grads.tensors())
            .zip(moments)
        {
            Zip::from(param)
                .and(grad)
                .and(m)
                .and(v)
                .for_each(|p, &g, m, v| {
                    *m = beta1 * *m + (1.0 - beta1) * g;
                    *v = beta2 * *v + (1.0 - beta2) * g * g;
                    let m_hat = *m / bias1;
                    let v_hat = *v / bias2;
                    *p -= learning_rate * m_hat / (v_hat.sqrt() + epsilon);
                });
        }
    }
}
