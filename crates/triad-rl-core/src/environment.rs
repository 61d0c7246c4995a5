//! Environment contract consumed by the episode runner

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{DiscreteAction, Reward, VectorObservation};

/// Result of a single environment step
#[derive(Debug, Clone)]
pub struct Step {
    /// Observation from the environment
    pub observation: VectorObservation,
    /// Reward signal
    pub reward: Reward,
    /// Whether the episode is done
    pub done: bool,
    /// Whether the episode was truncated (e.g., time limit)
    pub truncated: bool,
}

/// Configuration for environments
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    /// Random seed
    pub seed: Option<u64>,
    /// Maximum episode steps, overriding the environment's own limit
    pub max_steps: Option<usize>,
}

impl EnvironmentConfig {
    /// Configuration with only a seed set
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }
}

/// Episodic environment with vector observations and discrete actions.
///
/// `step` is the only point where a training loop hands control to the
/// environment. Implementations must not be cancelled mid-step.
#[async_trait]
pub trait Environment: Send + Sync {
    /// Length of every observation vector
    fn observation_dim(&self) -> usize;

    /// Number of discrete actions
    fn action_count(&self) -> usize;

    /// Reset the environment and return the initial observation
    async fn reset(&mut self) -> crate::Result<VectorObservation>;

    /// Take a step in the environment
    async fn step(&mut self, action: DiscreteAction) -> crate::Result<Step>;

    /// Close the environment
    async fn close(&mut self) -> crate::Result<()> {
        Ok(())
    }
}
