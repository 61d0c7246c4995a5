//! Post-episode policy-gradient updates
//!
//! Both variants share the same pipeline: discounted returns, normalization,
//! per-step loss terms, one backward pass per step, and a single Adam step.
//! They differ only in the per-step terms supplied by a [`PolicyGradientLoss`].

use std::fmt;

use triad_rl_core::{
    check_gamma, normalized_discounted_returns, AgentMode, RLError, Result, UpdateStats,
};

use crate::buffer::TrajectoryBuffer;
use crate::optimizer::{Adam, AdamConfig};
use crate::policy::{ParameterSet, PolicyValueNetwork};
use crate::utils::smooth_l1;

/// Per-step contribution to the episode loss
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LossTerms {
    /// Multiplier of `-log pi(a)`; treated as a constant by the gradient
    pub policy_weight: f64,
    /// Critic loss for this step
    pub critic_loss: f64,
    /// Derivative of `critic_loss` with respect to the value output
    pub critic_grad: f64,
}

/// Loss variant of a policy-gradient agent
pub trait PolicyGradientLoss: Send + Sync + fmt::Debug {
    /// Mode tag of the variant
    fn mode(&self) -> AgentMode;

    /// Terms for one step given the recorded value and the normalized return
    fn terms(&self, value: f64, normalized_return: f64) -> LossTerms;
}

/// Policy term weighted by the normalized return; no critic
#[derive(Debug, Clone, Copy, Default)]
pub struct Reinforce;

impl PolicyGradientLoss for Reinforce {
    fn mode(&self) -> AgentMode {
        AgentMode::Reinforce
    }

    fn terms(&self, _value: f64, normalized_return: f64) -> LossTerms {
        LossTerms {
            policy_weight: normalized_return,
            critic_loss: 0.0,
            critic_grad: 0.0,
        }
    }
}

/// Policy term weighted by the advantage `R - V` (value detached), plus a
/// smooth-L1 critic pulling `V` towards `R`
#[derive(Debug, Clone, Copy, Default)]
pub struct ActorCritic;

impl PolicyGradientLoss for ActorCritic {
    fn mode(&self) -> AgentMode {
        AgentMode::ActorCritic
    }

    fn terms(&self, value: f64, normalized_return: f64) -> LossTerms {
        let (critic_loss, critic_grad) = smooth_l1(value - normalized_return);
        LossTerms {
            policy_weight: normalized_return - value,
            critic_loss,
            critic_grad,
        }
    }
}

/// Loss implementation for a mode
#[must_use]
pub fn loss_for_mode(mode: AgentMode) -> Box<dyn PolicyGradientLoss> {
    match mode {
        AgentMode::Reinforce => Box::new(Reinforce),
        AgentMode::ActorCritic => Box::new(ActorCritic),
    }
}

/// Turns a finished episode into one optimizer step
#[derive(Debug)]
pub struct PolicyGradientUpdater {
    loss: Box<dyn PolicyGradientLoss>,
    optimizer: Adam,
    gamma: f64,
}

impl PolicyGradientUpdater {
    /// Updater for `network` with its own fresh Adam state
    pub fn new(
        mode: AgentMode,
        learning_rate: f64,
        gamma: f64,
        network: &PolicyValueNetwork,
    ) -> Result<Self> {
        check_gamma(gamma)?;
        let optimizer = Adam::new(
            AdamConfig::with_learning_rate(learning_rate),
            network.parameters(),
        )?;
        Ok(Self {
            loss: loss_for_mode(mode),
            optimizer,
            gamma,
        })
    }

    /// Loss variant
    #[must_use]
    pub fn mode(&self) -> AgentMode {
        self.loss.mode()
    }

    /// Optimizer state
    #[must_use]
    pub fn optimizer(&self) -> &Adam {
        &self.optimizer
    }

    /// Gradient of the episode loss without touching the network
    pub fn gradients(
        &self,
        network: &PolicyValueNetwork,
        buffer: &TrajectoryBuffer,
    ) -> Result<(ParameterSet, UpdateStats)> {
        let records = buffer.records();
        if records.len() != buffer.rewards().len() {
            return Err(RLError::DimensionMismatch {
                expected: records.len(),
                actual: buffer.rewards().len(),
            });
        }

        let returns = normalized_discounted_returns(buffer.rewards(), self.gamma);
        let mut grads = network.parameters().zeros_like();
        let mut stats = UpdateStats {
            steps: records.len(),
            ..UpdateStats::default()
        };

        for (record, &ret) in records.iter().zip(&returns) {
            let terms = self.loss.terms(record.value, ret);
            stats.policy_loss += -record.log_prob * terms.policy_weight;
            stats.value_loss += terms.critic_loss;

            let pass = network.forward(record.observation.view())?;
            network.backward(
                &pass,
                record.observation.view(),
                record.action.index(),
                terms.policy_weight,
                terms.critic_grad,
                &mut grads,
            );
        }
        Ok((grads, stats))
    }

    /// Apply one optimizer step for the episode in `buffer`, then clear it.
    ///
    /// The buffer is cleared even when the update fails.
    pub fn update(
        &mut self,
        network: &mut PolicyValueNetwork,
        buffer: &mut TrajectoryBuffer,
    ) -> Result<UpdateStats> {
        let computed = self.gradients(network, buffer);
        buffer.clear();
        let (grads, stats) = computed?;
        self.optimizer.step(network.parameters_mut(), &grads);
        Ok(stats)
    }
}
