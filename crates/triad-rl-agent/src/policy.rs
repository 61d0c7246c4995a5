//! Policy/value network for the policy-gradient agents
//!
//! A pure ndarray MLP: one ReLU hidden layer feeding a softmax action head
//! and a scalar value head. Gradients are computed by hand in [`PolicyValueNetwork::backward`].

use ndarray::{Array1, Array2, ArrayView1, ArrayViewD, ArrayViewMutD};
use rand::Rng;
use rand_distr::{Distribution, WeightedIndex};
use serde::{Deserialize, Serialize};

use triad_rl_core::{DiscreteAction, RLError, Result, VectorObservation};

use crate::buffer::{StepRecord, TrajectoryBuffer};
use crate::utils::{outer, softmax};

/// Network shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Observation dimension
    pub input_dim: usize,
    /// Hidden layer width
    pub hidden_size: usize,
    /// Number of discrete actions
    pub action_count: usize,
}

impl NetworkConfig {
    /// Validate the shape
    pub fn validate(&self) -> Result<()> {
        if self.input_dim == 0 || self.hidden_size == 0 || self.action_count == 0 {
            return Err(RLError::Configuration(format!(
                "network dimensions must be positive, got {self:?}"
            )));
        }
        Ok(())
    }
}

/// All trainable tensors. Also used as the gradient accumulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSet {
    /// Input to hidden weights, `(input_dim, hidden_size)`
    pub hidden_weights: Array2<f64>,
    /// Hidden bias
    pub hidden_bias: Array1<f64>,
    /// Hidden to logits weights, `(hidden_size, action_count)`
    pub action_weights: Array2<f64>,
    /// Logit bias
    pub action_bias: Array1<f64>,
    /// Hidden to value weights
    pub value_weights: Array1<f64>,
    /// Value bias (length 1)
    pub value_bias: Array1<f64>,
}

impl ParameterSet {
    /// Zero tensors for the given shape
    #[must_use]
    pub fn zeros(config: &NetworkConfig) -> Self {
        Self {
            hidden_weights: Array2::zeros((config.input_dim, config.hidden_size)),
            hidden_bias: Array1::zeros(config.hidden_size),
            action_weights: Array2::zeros((config.hidden_size, config.action_count)),
            action_bias: Array1::zeros(config.action_count),
            value_weights: Array1::zeros(config.hidden_size),
            value_bias: Array1::zeros(1),
        }
    }

    /// Zero tensors with the same shapes as `self`
    #[must_use]
    pub fn zeros_like(&self) -> Self {
        Self {
            hidden_weights: Array2::zeros(self.hidden_weights.raw_dim()),
            hidden_bias: Array1::zeros(self.hidden_bias.raw_dim()),
            action_weights: Array2::zeros(self.action_weights.raw_dim()),
            action_bias: Array1::zeros(self.action_bias.raw_dim()),
            value_weights: Array1::zeros(self.value_weights.raw_dim()),
            value_bias: Array1::zeros(self.value_bias.raw_dim()),
        }
    }

    /// Tensors in a fixed order
    #[must_use]
    pub fn tensors(&self) -> [ArrayViewD<'_, f64>; 6] {
        [
            self.hidden_weights.view().into_dyn(),
            self.hidden_bias.view().into_dyn(),
            self.action_weights.view().into_dyn(),
            self.action_bias.view().into_dyn(),
            self.value_weights.view().into_dyn(),
            self.value_bias.view().into_dyn(),
        ]
    }

    /// Mutable tensors, same order as [`ParameterSet::tensors`]
    pub fn tensors_mut(&mut self) -> [ArrayViewMutD<'_, f64>; 6] {
        [
            self.hidden_weights.view_mut().into_dyn(),
            self.hidden_bias.view_mut().into_dyn(),
            self.action_weights.view_mut().into_dyn(),
            self.action_bias.view_mut().into_dyn(),
            self.value_weights.view_mut().into_dyn(),
            self.value_bias.view_mut().into_dyn(),
        ]
    }

    /// Total number of scalars
    #[must_use]
    pub fn len(&self) -> usize {
        self.tensors().iter().map(|t| t.len()).sum()
    }

    /// Whether there are no parameters
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flattened copy of every scalar
    #[must_use]
    pub fn to_vec(&self) -> Vec<f64> {
        self.tensors()
            .iter()
            .flat_map(|t| t.iter().copied().collect::<Vec<_>>())
            .collect()
    }

    /// Whether every scalar is finite
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.tensors().iter().all(|t| t.iter().all(|v| v.is_finite()))
    }
}

#[allow(clippy::cast_precision_loss)]
fn init_bound(fan_in: usize) -> f64 {
    1.0 / (fan_in as f64).sqrt()
}

fn uniform_matrix<R: Rng + ?Sized>(rng: &mut R, fan_in: usize, shape: (usize, usize)) -> Array2<f64> {
    let bound = init_bound(fan_in);
    Array2::from_shape_fn(shape, |_| rng.gen_range(-bound..bound))
}

fn uniform_vector<R: Rng + ?Sized>(rng: &mut R, fan_in: usize, len: usize) -> Array1<f64> {
    let bound = init_bound(fan_in);
    Array1::from_shape_fn(len, |_| rng.gen_range(-bound..bound))
}

/// Intermediate activations kept for the backward pass
#[derive(Debug, Clone)]
pub struct ForwardPass {
    /// Hidden layer before ReLU
    pub pre_activation: Array1<f64>,
    /// Hidden layer after ReLU
    pub hidden: Array1<f64>,
    /// Action probabilities
    pub probs: Array1<f64>,
    /// Value estimate
    pub value: f64,
}

impl ForwardPass {
    /// log pi(action)
    #[must_use]
    pub fn log_prob(&self, action: usize) -> f64 {
        self.probs[action].ln()
    }
}

/// Shared-trunk policy and value network
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyValueNetwork {
    config: NetworkConfig,
    params: ParameterSet,
}

impl PolicyValueNetwork {
    /// Create a network with uniform `±1/sqrt(fan_in)` initialization
    pub fn new<R: Rng + ?Sized>(config: NetworkConfig, rng: &mut R) -> Result<Self> {
        config.validate()?;
        let (input, hidden, actions) = (config.input_dim, config.hidden_size, config.action_count);
        let params = ParameterSet {
            hidden_weights: uniform_matrix(rng, input, (input, hidden)),
            hidden_bias: uniform_vector(rng, input, hidden),
            action_weights: uniform_matrix(rng, hidden, (hidden, actions)),
            action_bias: uniform_vector(rng, hidden, actions),
            value_weights: uniform_vector(rng, hidden, hidden),
            value_bias: uniform_vector(rng, hidden, 1),
        };
        Ok(Self { config, params })
    }

    /// Network shape
    #[must_use]
    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    /// Current parameters
    #[must_use]
    pub fn parameters(&self) -> &ParameterSet {
        &self.params
    }

    /// Mutable parameters, for the optimizer
    pub fn parameters_mut(&mut self) -> &mut ParameterSet {
        &mut self.params
    }

    /// Forward pass for one observation
    pub fn forward(&self, observation: ArrayView1<'_, f64>) -> Result<ForwardPass> {
        if observation.len() != self.config.input_dim {
            return Err(RLError::DimensionMismatch {
                expected: self.config.input_dim,
                actual: observation.len(),
            });
        }
        let p = &self.params;
        let pre_activation = observation.dot(&p.hidden_weights) + &p.hidden_bias;
        let hidden = pre_activation.mapv(|v| v.max(0.0));
        let logits = hidden.dot(&p.action_weights) + &p.action_bias;
        let probs = softmax(&logits);
        let value = hidden.dot(&p.value_weights) + p.value_bias[0];
        Ok(ForwardPass {
            pre_activation,
            hidden,
            probs,
            value,
        })
    }

    /// Sample an action and record `(log pi(a), V)` for the next update
    pub fn choose_action<R: Rng + ?Sized>(
        &self,
        observation: &VectorObservation,
        buffer: &mut TrajectoryBuffer,
        rng: &mut R,
    ) -> Result<DiscreteAction> {
        let pass = self.forward(observation.view())?;
        let dist = WeightedIndex::new(pass.probs.iter().copied())
            .map_err(|e| RLError::Computation(format!("invalid action distribution: {e}")))?;
        let action = dist.sample(rng);
        buffer.record(StepRecord {
            observation: observation.clone(),
            action: DiscreteAction(action),
            log_prob: pass.log_prob(action),
            value: pass.value,
        });
        Ok(DiscreteAction(action))
    }

    /// Accumulate gradients of `policy_weight * -log pi(action) + critic(value)` into `grads`,
    /// where `value_grad` is the derivative of the critic term with respect to the value output.
    pub fn backward(
        &self,
        pass: &ForwardPass,
        observation: ArrayView1<'_, f64>,
        action: usize,
        policy_weight: f64,
        value_grad: f64,
        grads: &mut ParameterSet,
    ) {
        let p = &self.params;

        // d(-log softmax)/dlogits = probs - onehot
        let mut dlogits = pass.probs.clone();
        dlogits[action] -= 1.0;
        dlogits *= policy_weight;

        grads.action_weights += &outer(pass.hidden.view(), dlogits.view());
        grads.action_bias += &dlogits;
        grads.value_weights.scaled_add(value_grad, &pass.hidden);
        grads.value_bias[0] += value_grad;

        let mut dhidden = p.action_weights.dot(&dlogits);
        dhidden.scaled_add(value_grad, &p.value_weights);
        let relu_mask = pass.pre_activation.mapv(|v| if v > 0.0 { 1.0 } else { 0.0 });
        let dpre = dhidden * relu_mask;

        grads.hidden_weights += &outer(observation, dpre.view());
        grads.hidden_bias += &dpre;
    }
}
