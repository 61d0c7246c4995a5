//! REINFORCE and actor-critic agents

use rand::rngs::StdRng;
use rand::SeedableRng;

use triad_rl_core::{
    Agent, AgentConfig, AgentMode, DiscreteAction, Result, Reward, UpdateStats, VectorObservation,
};

use crate::buffer::TrajectoryBuffer;
use crate::policy::{NetworkConfig, PolicyValueNetwork};
use crate::update::PolicyGradientUpdater;

/// Episodic policy-gradient agent; the mode selects the loss
#[derive(Debug)]
pub struct PolicyGradientAgent {
    config: AgentConfig,
    network: PolicyValueNetwork,
    updater: PolicyGradientUpdater,
    buffer: TrajectoryBuffer,
    rng: StdRng,
}

impl PolicyGradientAgent {
    /// Create an agent whose initialization and action sampling derive from `seed`
    pub fn new(
        config: AgentConfig,
        observation_dim: usize,
        action_count: usize,
        seed: u64,
    ) -> Result<Self> {
        config.validate()?;
        let mut rng = StdRng::seed_from_u64(seed);
        let network = PolicyValueNetwork::new(
            NetworkConfig {
                input_dim: observation_dim,
                hidden_size: config.hidden_size,
                action_count,
            },
            &mut rng,
        )?;
        let updater =
            PolicyGradientUpdater::new(config.mode, config.learning_rate, config.gamma, &network)?;
        Ok(Self {
            config,
            network,
            updater,
            buffer: TrajectoryBuffer::new(),
            rng,
        })
    }

    /// Agent configuration
    #[must_use]
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Loss variant
    #[must_use]
    pub fn mode(&self) -> AgentMode {
        self.config.mode
    }

    /// Policy/value network
    #[must_use]
    pub fn network(&self) -> &PolicyValueNetwork {
        &self.network
    }

    /// Records of the episode in progress
    #[must_use]
    pub fn buffer(&self) -> &TrajectoryBuffer {
        &self.buffer
    }
}

impl Agent for PolicyGradientAgent {
    fn act(&mut self, observation: &VectorObservation) -> Result<DiscreteAction> {
        self.network
            .choose_action(observation, &mut self.buffer, &mut self.rng)
    }

    fn observe_reward(&mut self, reward: Reward) {
        self.buffer.push_reward(reward);
    }

    fn finish_episode(&mut self) -> Result<UpdateStats> {
        self.updater.update(&mut self.network, &mut self.buffer)
    }

    fn discard_episode(&mut self) {
        self.buffer.clear();
    }
}
