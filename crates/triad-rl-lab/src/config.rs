//! Study configuration

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use triad_rl_core::{check_gamma, check_learning_rate, AgentConfig, AgentMode, RLError, Result};

/// Baird divergence study
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BairdConfig {
    /// TD(0) updates per run
    pub steps: usize,
    /// Independent runs
    pub runs: usize,
    /// Step size
    pub alpha: f64,
    /// Discount factor
    pub gamma: f64,
    /// Seed of the first run; later runs use the following seeds
    pub first_seed: u64,
}

impl Default for BairdConfig {
    fn default() -> Self {
        Self {
            steps: 1000,
            runs: 1,
            alpha: 0.01,
            gamma: 0.99,
            first_seed: 16,
        }
    }
}

impl BairdConfig {
    /// Reject invalid settings before any run starts
    pub fn validate(&self) -> Result<()> {
        check_learning_rate(self.alpha)?;
        check_gamma(self.gamma)?;
        if self.steps == 0 {
            return Err(RLError::Configuration("steps must be positive".into()));
        }
        if self.runs == 0 {
            return Err(RLError::Configuration("runs must be positive".into()));
        }
        Ok(())
    }

    /// Load from a JSON file; missing fields take their defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        load_json(path.as_ref())
    }
}

/// Policy-gradient study over a `(hidden_size, learning_rate)` grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyGradientConfig {
    /// Registered environment name
    pub env: String,
    /// Discount factor
    pub gamma: f64,
    /// Learning-rate axis of the grid
    pub learning_rates: Vec<f64>,
    /// Hidden-size axis of the grid
    pub hidden_sizes: Vec<usize>,
    /// Repetitions per grid point
    pub runs: usize,
    /// Episodes per run
    pub episodes: usize,
    /// Hard cap on steps per episode
    pub max_steps: usize,
    /// Episodes between progress lines
    pub log_interval: usize,
    /// Starting seed; drawn at random when absent
    pub seed: Option<u64>,
}

impl Default for PolicyGradientConfig {
    fn default() -> Self {
        Self {
            env: "CartPole-v0".to_string(),
            gamma: 0.9,
            learning_rates: vec![0.01, 0.001, 0.0001],
            hidden_sizes: vec![32, 64, 128],
            runs: 5,
            episodes: 2000,
            max_steps: 200,
            log_interval: 10,
            seed: None,
        }
    }
}

impl PolicyGradientConfig {
    /// Reject invalid settings before any run starts
    pub fn validate(&self) -> Result<()> {
        check_gamma(self.gamma)?;
        if self.learning_rates.is_empty() || self.hidden_sizes.is_empty() {
            return Err(RLError::Configuration(
                "learning-rate and hidden-size grids must be non-empty".into(),
            ));
        }
        for &alpha in &self.learning_rates {
            check_learning_rate(alpha)?;
        }
        if self.hidden_sizes.contains(&0) {
            return Err(RLError::Configuration("hidden sizes must be positive".into()));
        }
        for (name, value) in [
            ("runs", self.runs),
            ("episodes", self.episodes),
            ("max_steps", self.max_steps),
            ("log_interval", self.log_interval),
        ] {
            if value == 0 {
                return Err(RLError::Configuration(format!("{name} must be positive")));
            }
        }
        Ok(())
    }

    /// Tensor shape `(hidden_sizes, learning_rates, runs, episodes)`
    #[must_use]
    pub fn grid_shape(&self) -> (usize, usize, usize, usize) {
        (
            self.hidden_sizes.len(),
            self.learning_rates.len(),
            self.runs,
            self.episodes,
        )
    }

    /// Agent settings at one grid point
    #[must_use]
    pub fn agent_config(&self, mode: AgentMode, hidden_index: usize, lr_index: usize) -> AgentConfig {
        AgentConfig {
            mode,
            learning_rate: self.learning_rates[lr_index],
            gamma: self.gamma,
            hidden_size: self.hidden_sizes[hidden_index],
        }
    }

    /// Load from a JSON file; missing fields take their defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        load_json(path.as_ref())
    }
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(BairdConfig::default().validate().is_ok());
        let config = PolicyGradientConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.grid_shape(), (3, 3, 5, 2000));
    }

    #[test]
    fn test_invalid_settings() {
        let bad_gamma = BairdConfig {
            gamma: 1.01,
            ..BairdConfig::default()
        };
        assert!(matches!(bad_gamma.validate(), Err(RLError::Configuration(_))));

        let no_runs = PolicyGradientConfig {
            runs: 0,
            ..PolicyGradientConfig::default()
        };
        assert!(no_runs.validate().is_err());

        let empty_grid = PolicyGradientConfig {
            learning_rates: vec![],
            ..PolicyGradientConfig::default()
        };
        assert!(empty_grid.validate().is_err());

        let zero_alpha = PolicyGradientConfig {
            learning_rates: vec![0.01, 0.0],
            ..PolicyGradientConfig::default()
        };
        assert!(zero_alpha.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: PolicyGradientConfig =
            serde_json::from_str(r#"{"runs": 2, "hidden_sizes": [8], "seed": 3}"#).unwrap();
        assert_eq!(config.runs, 2);
        assert_eq!(config.hidden_sizes, vec![8]);
        assert_eq!(config.seed, Some(3));
        assert_eq!(config.episodes, 2000);
        assert_eq!(config.env, "CartPole-v0");
    }

    #[test]
    fn test_agent_config_at_grid_point() {
        let config = PolicyGradientConfig::default();
        let agent = config.agent_config(AgentMode::ActorCritic, 2, 1);
        assert_eq!(agent.hidden_size, 128);
        assert_eq!(agent.learning_rate, 0.001);
        assert_eq!(agent.gamma, 0.9);
    }

    #[test]
    fn test_from_missing_file() {
        let err = BairdConfig::from_json_file("/nonexistent/triad/baird.json").unwrap_err();
        assert!(matches!(err, RLError::Io(_)));
    }
}
