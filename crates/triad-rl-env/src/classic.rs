//! Classic control environments

use async_trait::async_trait;
use rand::{rngs::StdRng, Rng, SeedableRng};

use triad_rl_core::{
    DiscreteAction, DiscreteSpace, Environment, EnvironmentConfig, Result, Reward, Step,
    VectorObservation,
};

/// CartPole environment
pub struct CartPoleEnv {
    /// Current state
    state: CartPoleState,
    /// Configuration
    config: CartPoleConfig,
    /// Step count
    steps: usize,
    rng: StdRng,
}

#[derive(Debug, Clone, Default)]
struct CartPoleState {
    x: f64,          // Cart position
    x_dot: f64,      // Cart velocity
    theta: f64,      // Pole angle
    theta_dot: f64,  // Pole angular velocity
}

/// Physical constants and limits of the cart-pole system
#[derive(Debug, Clone)]
pub struct CartPoleConfig {
    /// Gravitational acceleration
    pub gravity: f64,
    /// Cart mass
    pub mass_cart: f64,
    /// Pole mass
    pub mass_pole: f64,
    /// Half the pole length
    pub length: f64,
    /// Magnitude of the push applied by either action
    pub force_mag: f64,
    /// Integration time step in seconds
    pub tau: f64,
    /// Episode step limit
    pub max_steps: usize,
    /// Cart position beyond which the episode fails
    pub x_threshold: f64,
    /// Pole angle (radians) beyond which the episode fails
    pub theta_threshold: f64,
}

impl Default for CartPoleConfig {
    fn default() -> Self {
        Self {
            gravity: 9.8,
            mass_cart: 1.0,
            mass_pole: 0.1,
            length: 0.5,
            force_mag: 10.0,
            tau: 0.02,
            max_steps: 200,
            x_threshold: 2.4,
            theta_threshold: 12.0_f64.to_radians(),
        }
    }
}

impl CartPoleEnv {
    /// Create a new CartPole environment
    #[must_use]
    pub fn new(config: EnvironmentConfig) -> Self {
        Self::with_physics(config, CartPoleConfig::default())
    }

    /// Create a CartPole environment with explicit physical constants
    #[must_use]
    pub fn with_physics(config: EnvironmentConfig, mut physics: CartPoleConfig) -> Self {
        if let Some(max_steps) = config.max_steps {
            physics.max_steps = max_steps;
        }
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            state: CartPoleState::default(),
            config: physics,
            steps: 0,
            rng,
        }
    }

    fn get_observation(&self) -> VectorObservation {
        VectorObservation::new(vec![
            self.state.x,
            self.state.x_dot,
            self.state.theta,
            self.state.theta_dot,
        ])
    }

    fn has_failed(&self) -> bool {
        self.state.x.abs() > self.config.x_threshold
            || self.state.theta.abs() > self.config.theta_threshold
    }
}

#[async_trait]
impl Environment for CartPoleEnv {
    fn observation_dim(&self) -> usize {
        4
    }

    fn action_count(&self) -> usize {
        2 // 0: push left, 1: push right
    }

    async fn reset(&mut self) -> Result<VectorObservation> {
        let rng = &mut self.rng;
        self.state = CartPoleState {
            x: rng.gen_range(-0.05..0.05),
            x_dot: rng.gen_range(-0.05..0.05),
            theta: rng.gen_range(-0.05..0.05),
            theta_dot: rng.gen_range(-0.05..0.05),
        };
        self.steps = 0;

        Ok(self.get_observation())
    }

    async fn step(&mut self, action: DiscreteAction) -> Result<Step> {
        DiscreteSpace::new(self.action_count()).check(action)?;

        let force = if action.0 == 1 {
            self.config.force_mag
        } else {
            -self.config.force_mag
        };

        let cos_theta = self.state.theta.cos();
        let sin_theta = self.state.theta.sin();

        let total_mass = self.config.mass_cart + self.config.mass_pole;
        let pole_mass_length = self.config.mass_pole * self.config.length;

        let temp = (force + pole_mass_length * self.state.theta_dot.powi(2) * sin_theta) / total_mass;
        let theta_acc = (self.config.gravity * sin_theta - cos_theta * temp)
            / (self.config.length * (4.0 / 3.0 - self.config.mass_pole * cos_theta.powi(2) / total_mass));
        let x_acc = temp - pole_mass_length * theta_acc * cos_theta / total_mass;

        // Explicit Euler
        let dt = self.config.tau;
        self.state.x += dt * self.state.x_dot;
        self.state.x_dot += dt * x_acc;
        self.state.theta += dt * self.state.theta_dot;
        self.state.theta_dot += dt * theta_acc;

        self.steps += 1;

        let failed = self.has_failed();
        let truncated = !failed && self.steps >= self.config.max_steps;

        Ok(Step {
            observation: self.get_observation(),
            reward: Reward(1.0), // Reward of 1 for each step survived
            done: failed || truncated,
            truncated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reset_is_near_upright() {
        let mut env = CartPoleEnv::new(EnvironmentConfig::seeded(1));
        let obs = env.reset().await.unwrap();
        assert_eq!(obs.len(), env.observation_dim());
        assert!(obs.data.iter().all(|v| v.abs() <= 0.05));
    }

    #[tokio::test]
    async fn test_same_seed_same_trajectory() {
        let mut a = CartPoleEnv::new(EnvironmentConfig::seeded(9));
        let mut b = CartPoleEnv::new(EnvironmentConfig::seeded(9));
        assert_eq!(a.reset().await.unwrap(), b.reset().await.unwrap());
        for i in 0..10 {
            let action = DiscreteAction(i % 2);
            let sa = a.step(action).await.unwrap();
            let sb = b.step(action).await.unwrap();
            assert_eq!(sa.observation, sb.observation);
        }
    }

    #[tokio::test]
    async fn test_constant_push_topples_pole() {
        let mut env = CartPoleEnv::new(EnvironmentConfig::seeded(0));
        env.reset().await.unwrap();
        let mut steps = 0;
        loop {
            let step = env.step(DiscreteAction(1)).await.unwrap();
            steps += 1;
            assert_eq!(step.reward, Reward(1.0));
            if step.done {
                assert!(!step.truncated);
                break;
            }
        }
        assert!(steps < 200);
    }

    #[tokio::test]
    async fn test_step_limit_truncates() {
        let config = EnvironmentConfig {
            max_steps: Some(3),
            ..EnvironmentConfig::seeded(4)
        };
        let mut env = CartPoleEnv::new(config);
        env.reset().await.unwrap();
        let mut last = None;
        for i in 0..3 {
            last = Some(env.step(DiscreteAction(i % 2)).await.unwrap());
        }
        let last = last.unwrap();
        assert!(last.done);
        assert!(last.truncated);
    }

    #[tokio::test]
    async fn test_invalid_action_rejected() {
        let mut env = CartPoleEnv::new(EnvironmentConfig::seeded(0));
        env.reset().await.unwrap();
        assert!(env.step(DiscreteAction(2)).await.is_err());
    }
}
