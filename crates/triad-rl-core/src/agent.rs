//! Agent traits and types

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{check_gamma, check_learning_rate, DiscreteAction, RLError, Reward, VectorObservation};

/// Which policy-gradient loss an agent trains with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AgentMode {
    /// Monte-Carlo policy gradient with no learned baseline
    Reinforce,
    /// Policy gradient with the value head as a learned baseline
    ActorCritic,
}

impl AgentMode {
    /// Short tag used in file names and logs
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Self::Reinforce => "rf",
            Self::ActorCritic => "ac",
        }
    }
}

impl fmt::Display for AgentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reinforce => write!(f, "Reinforce"),
            Self::ActorCritic => write!(f, "Actor-Critic"),
        }
    }
}

/// Configuration for one policy-gradient agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Loss variant
    pub mode: AgentMode,
    /// Learning rate
    pub learning_rate: f64,
    /// Discount factor
    pub gamma: f64,
    /// Width of the shared hidden layer
    pub hidden_size: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            mode: AgentMode::Reinforce,
            learning_rate: 1e-3,
            gamma: 0.9,
            hidden_size: 64,
        }
    }
}

impl AgentConfig {
    /// Reject invalid hyperparameters
    pub fn validate(&self) -> crate::Result<()> {
        check_gamma(self.gamma)?;
        check_learning_rate(self.learning_rate)?;
        if self.hidden_size == 0 {
            return Err(RLError::Configuration("hidden size must be positive".into()));
        }
        Ok(())
    }
}

/// Losses reported by one post-episode update
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateStats {
    /// Sum of the policy terms
    pub policy_loss: f64,
    /// Sum of the critic terms (zero for REINFORCE)
    pub value_loss: f64,
    /// Number of steps the update was built from
    pub steps: usize,
}

impl UpdateStats {
    /// Total loss minimised by the update
    #[must_use]
    pub fn total_loss(&self) -> f64 {
        self.policy_loss + self.value_loss
    }
}

/// Episodic learning agent driven by an episode runner.
///
/// The runner calls [`Agent::act`] once per environment step and
/// [`Agent::observe_reward`] once per reward, then exactly one of
/// [`Agent::finish_episode`] or [`Agent::discard_episode`].
pub trait Agent: Send {
    /// Select an action for the observation, recording it for the update
    fn act(&mut self, observation: &VectorObservation) -> crate::Result<DiscreteAction>;

    /// Record the reward that followed the last action
    fn observe_reward(&mut self, reward: Reward);

    /// Apply the post-episode update and clear the episode's records
    fn finish_episode(&mut self) -> crate::Result<UpdateStats>;

    /// Drop the episode's records without learning from them
    fn discard_episode(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_tags_and_names() {
        assert_eq!(AgentMode::Reinforce.tag(), "rf");
        assert_eq!(AgentMode::ActorCritic.tag(), "ac");
        assert_eq!(AgentMode::ActorCritic.to_string(), "Actor-Critic");
        assert_eq!(
            serde_json::to_string(&AgentMode::ActorCritic).unwrap(),
            "\"actor-critic\""
        );
    }

    #[test]
    fn test_config_validation() {
        assert!(AgentConfig::default().validate().is_ok());

        let bad_gamma = AgentConfig { gamma: 1.5, ..AgentConfig::default() };
        assert!(matches!(bad_gamma.validate(), Err(RLError::Configuration(_))));

        let bad_alpha = AgentConfig { learning_rate: 0.0, ..AgentConfig::default() };
        assert!(bad_alpha.validate().is_err());

        let no_hidden = AgentConfig { hidden_size: 0, ..AgentConfig::default() };
        assert!(no_hidden.validate().is_err());
    }
}
