//! Repeats training across seeds and hyperparameter grids
//!
//! The Baird study runs sequentially. Policy-gradient runs are spawned on a
//! [`JoinSet`], each task owning its environment, agent and RNG; results are
//! written into a preallocated tensor by index.

use std::sync::Arc;

use ndarray::{s, Array1, Array3, Array4};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use triad_rl_agent::{EpisodeRunner, PolicyGradientAgent, SemiGradientTd0};
use triad_rl_core::{AgentMode, Environment, EnvironmentConfig, LinearValueFunction, RLError, Result};
use triad_rl_env::{baird_features, baird_initial_weights, BairdDynamics, EnvConstructor, BAIRD_FEATURES};

use crate::config::{BairdConfig, PolicyGradientConfig};
use crate::seed::SeedSequence;

/// Offset mixed into a run seed to seed the agent independently of the environment
const AGENT_SEED_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

/// Run the Baird study. Returns weight snapshots, shape `(runs, steps + 1, 8)`.
pub fn run_baird(config: &BairdConfig, seeds: &mut SeedSequence) -> Result<Array3<f64>> {
    config.validate()?;
    let learner = SemiGradientTd0::new(config.alpha, config.gamma)?;
    let mut weights = Array3::zeros((config.runs, config.steps + 1, BAIRD_FEATURES));

    for run in 0..config.runs {
        let seed = seeds.next_seed();
        let mut rng = StdRng::seed_from_u64(seed);
        let mut dynamics = BairdDynamics::new(&mut rng);
        let mut value_fn = LinearValueFunction::new(baird_features(), baird_initial_weights())?;
        info!(run, seed, start = dynamics.state(), "starting Baird run");

        let history = learner.trace(&mut dynamics, &mut value_fn, config.steps, &mut rng);
        weights.slice_mut(s![run, .., ..]).assign(&history);

        info!(run, final_weights = ?value_fn.weights().to_vec(), "finished Baird run");
    }
    Ok(weights)
}

/// A policy-gradient run that aborted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunFailure {
    /// Index into `hidden_sizes`
    pub hidden_index: usize,
    /// Index into `learning_rates`
    pub lr_index: usize,
    /// Repetition index
    pub run: usize,
    /// Seed the run was given
    pub seed: u64,
    /// Error message
    pub error: String,
}

/// Result of one policy-gradient study
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyGradientStudy {
    /// Loss variant trained
    pub mode: AgentMode,
    /// Steps survived per episode, shape `(hidden_sizes, learning_rates, runs, episodes)`.
    /// Failed runs are NaN.
    pub steps: Array4<f64>,
    /// Aborted runs
    pub failures: Vec<RunFailure>,
}

/// Position of one run in the grid
#[derive(Debug, Clone, Copy)]
struct RunCell {
    hidden_index: usize,
    lr_index: usize,
    run: usize,
    seed: u64,
}

/// Run one policy-gradient study, drawing `runs` seeds from `seeds`.
pub async fn run_policy_gradient(
    config: &PolicyGradientConfig,
    mode: AgentMode,
    factory: EnvConstructor,
    seeds: &mut SeedSequence,
) -> Result<PolicyGradientStudy> {
    config.validate()?;
    let run_seeds = seeds.take_seeds(config.runs);
    run_with_seeds(config, mode, factory, &run_seeds).await
}

/// Run REINFORCE and actor-critic on the same run seeds.
///
/// Returns `(reinforce, actor_critic)`.
pub async fn run_comparison(
    config: &PolicyGradientConfig,
    factory: EnvConstructor,
    seeds: &mut SeedSequence,
) -> Result<(PolicyGradientStudy, PolicyGradientStudy)> {
    config.validate()?;
    let run_seeds = seeds.take_seeds(config.runs);
    let reinforce = run_with_seeds(config, AgentMode::Reinforce, factory.clone(), &run_seeds).await?;
    let actor_critic = run_with_seeds(config, AgentMode::ActorCritic, factory, &run_seeds).await?;
    Ok((reinforce, actor_critic))
}

async fn run_with_seeds(
    config: &PolicyGradientConfig,
    mode: AgentMode,
    factory: EnvConstructor,
    run_seeds: &[u64],
) -> Result<PolicyGradientStudy> {
    let shared = Arc::new(config.clone());
    let mut tasks = JoinSet::new();

    for hidden_index in 0..config.hidden_sizes.len() {
        for lr_index in 0..config.learning_rates.len() {
            for (run, &seed) in run_seeds.iter().enumerate() {
                let cell = RunCell {
                    hidden_index,
                    lr_index,
                    run,
                    seed,
                };
                let config = Arc::clone(&shared);
                let factory = Arc::clone(&factory);
                tasks.spawn(async move {
                    let outcome = train_run(cell, &config, mode, &factory).await;
                    (cell, outcome)
                });
            }
        }
    }

    let mut steps = Array4::zeros(config.grid_shape());
    let mut failures = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        let (cell, outcome) =
            joined.map_err(|e| RLError::Computation(format!("training task failed: {e}")))?;
        let mut slot = steps.slice_mut(s![cell.hidden_index, cell.lr_index, cell.run, ..]);
        match outcome {
            Ok(lengths) => slot.assign(&lengths),
            Err(err) => {
                warn!(
                    mode = %mode,
                    hidden_size = config.hidden_sizes[cell.hidden_index],
                    learning_rate = config.learning_rates[cell.lr_index],
                    run = cell.run,
                    seed = cell.seed,
                    error = %err,
                    "run aborted"
                );
                slot.fill(f64::NAN);
                failures.push(RunFailure {
                    hidden_index: cell.hidden_index,
                    lr_index: cell.lr_index,
                    run: cell.run,
                    seed: cell.seed,
                    error: err.to_string(),
                });
            }
        }
    }
    failures.sort_by_key(|f| (f.hidden_index, f.lr_index, f.run));

    Ok(PolicyGradientStudy {
        mode,
        steps,
        failures,
    })
}

async fn train_run(
    cell: RunCell,
    config: &PolicyGradientConfig,
    mode: AgentMode,
    factory: &EnvConstructor,
) -> Result<Array1<f64>> {
    let agent_config = config.agent_config(mode, cell.hidden_index, cell.lr_index);
    info!(
        mode = %mode,
        hidden_size = agent_config.hidden_size,
        learning_rate = agent_config.learning_rate,
        run = cell.run,
        seed = cell.seed,
        "starting run"
    );

    let mut env = factory(EnvironmentConfig::seeded(cell.seed))?;
    let mut agent = PolicyGradientAgent::new(
        agent_config,
        env.observation_dim(),
        env.action_count(),
        cell.seed ^ AGENT_SEED_SALT,
    )?;
    let runner = EpisodeRunner::new(config.max_steps)?;

    let mut lengths = Array1::zeros(config.episodes);
    for episode in 0..config.episodes {
        let outcome = runner.run(env.as_mut(), &mut agent).await?;
        #[allow(clippy::cast_precision_loss)]
        let survived = outcome.steps as f64;
        lengths[episode] = survived;

        if episode % config.log_interval == 0 {
            let window = lengths.slice(s![episode.saturating_sub(config.log_interval - 1)..=episode]);
            debug!(
                episode,
                last = survived,
                average = window.mean().unwrap_or(survived),
                "episode"
            );
        }
    }
    env.close().await?;

    info!(
        mode = %mode,
        run = cell.run,
        mean_steps = lengths.mean().unwrap_or(0.0),
        "finished run"
    );
    Ok(lengths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use triad_rl_core::{DiscreteAction, Reward, Step, VectorObservation};
    use triad_rl_env::env_constructor;

    fn small_config(seed: u64) -> PolicyGradientConfig {
        PolicyGradientConfig {
            env: "CartPole-v0".into(),
            gamma: 0.9,
            learning_rates: vec![0.01, 0.001],
            hidden_sizes: vec![8],
            runs: 2,
            episodes: 5,
            max_steps: 50,
            log_interval: 2,
            seed: Some(seed),
        }
    }

    #[test]
    fn test_baird_shape_and_first_row() {
        let config = BairdConfig {
            steps: 100,
            runs: 3,
            ..BairdConfig::default()
        };
        let weights = run_baird(&config, &mut SeedSequence::new(16)).unwrap();
        assert_eq!(weights.dim(), (3, 101, 8));
        for run in 0..3 {
            assert_eq!(weights.slice(s![run, 0, ..]), baird_initial_weights());
        }
    }

    #[test]
    fn test_baird_is_deterministic_with_prefix_property() {
        let short = BairdConfig {
            steps: 200,
            runs: 2,
            ..BairdConfig::default()
        };
        let long = BairdConfig { runs: 4, ..short.clone() };

        let a = run_baird(&short, &mut SeedSequence::new(16)).unwrap();
        let b = run_baird(&short, &mut SeedSequence::new(16)).unwrap();
        let c = run_baird(&long, &mut SeedSequence::new(16)).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, c.slice(s![0..2, .., ..]));
    }

    #[test]
    fn test_repeated_baird_studies_continue_seed_stream() {
        let single = BairdConfig {
            steps: 150,
            runs: 1,
            ..BairdConfig::default()
        };
        let pair = BairdConfig { runs: 2, ..single.clone() };
        let triple = BairdConfig { runs: 3, ..single.clone() };

        let mut seeds = SeedSequence::new(16);
        let first = run_baird(&single, &mut seeds).unwrap();
        let second = run_baird(&pair, &mut seeds).unwrap();
        assert_eq!(seeds.peek(), 19);

        let all = run_baird(&triple, &mut SeedSequence::new(16)).unwrap();
        assert_eq!(first, all.slice(s![0..1, .., ..]));
        assert_eq!(second, all.slice(s![1..3, .., ..]));
    }

    #[test]
    fn test_baird_rejects_invalid_config() {
        let config = BairdConfig {
            runs: 0,
            ..BairdConfig::default()
        };
        let mut seeds = SeedSequence::new(0);
        assert!(run_baird(&config, &mut seeds).is_err());
        assert_eq!(seeds.peek(), 0);
    }

    #[tokio::test]
    async fn test_policy_gradient_shape_and_bounds() {
        let config = small_config(7);
        let factory = env_constructor(&config.env).unwrap();
        let mut seeds = SeedSequence::new(7);
        let study = run_policy_gradient(&config, AgentMode::ActorCritic, factory, &mut seeds)
            .await
            .unwrap();

        assert_eq!(study.steps.dim(), (1, 2, 2, 5));
        assert!(study.failures.is_empty());
        assert!(study.steps.iter().all(|&s| (1.0..=50.0).contains(&s)));
        assert_eq!(seeds.peek(), 9);
    }

    #[tokio::test]
    async fn test_policy_gradient_is_deterministic() {
        let config = small_config(3);
        let factory = env_constructor(&config.env).unwrap();
        let a = run_policy_gradient(&config, AgentMode::Reinforce, factory.clone(), &mut SeedSequence::new(3))
            .await
            .unwrap();
        let b = run_policy_gradient(&config, AgentMode::Reinforce, factory, &mut SeedSequence::new(3))
            .await
            .unwrap();
        assert_eq!(a.steps, b.steps);
    }

    #[tokio::test]
    async fn test_policy_gradient_prefix_property() {
        let short = small_config(11);
        let long = PolicyGradientConfig { runs: 3, ..short.clone() };
        let factory = env_constructor(&short.env).unwrap();

        let a = run_policy_gradient(&short, AgentMode::Reinforce, factory.clone(), &mut SeedSequence::new(11))
            .await
            .unwrap();
        let b = run_policy_gradient(&long, AgentMode::Reinforce, factory, &mut SeedSequence::new(11))
            .await
            .unwrap();
        assert_eq!(a.steps, b.steps.slice(s![.., .., 0..2, ..]));
    }

    #[tokio::test]
    async fn test_comparison_shares_seeds() {
        let config = small_config(5);
        let factory = env_constructor(&config.env).unwrap();
        let mut seeds = SeedSequence::new(5);
        let (rf, ac) = run_comparison(&config, factory, &mut seeds).await.unwrap();
        assert_eq!(rf.mode, AgentMode::Reinforce);
        assert_eq!(ac.mode, AgentMode::ActorCritic);
        assert_eq!(rf.steps.dim(), ac.steps.dim());
        assert_eq!(seeds.peek(), 7);
    }

    /// Fails on its first step when seeded with `poisoned_seed`
    struct FlakyEnv {
        seed: Option<u64>,
        poisoned_seed: u64,
        t: usize,
    }

    #[async_trait]
    impl Environment for FlakyEnv {
        fn observation_dim(&self) -> usize {
            2
        }

        fn action_count(&self) -> usize {
            2
        }

        async fn reset(&mut self) -> Result<VectorObservation> {
            self.t = 0;
            Ok(VectorObservation::new(vec![0.0, 0.0]))
        }

        async fn step(&mut self, _action: DiscreteAction) -> Result<Step> {
            if self.seed == Some(self.poisoned_seed) {
                return Err(RLError::Environment("sensor unplugged".into()));
            }
            self.t += 1;
            Ok(Step {
                observation: VectorObservation::new(vec![0.1, -0.1]),
                reward: Reward(1.0),
                done: self.t == 3,
                truncated: false,
            })
        }
    }

    #[tokio::test]
    async fn test_failed_run_is_isolated() {
        let config = small_config(20);
        let factory: EnvConstructor = Arc::new(|env_config: EnvironmentConfig| {
            Ok(Box::new(FlakyEnv {
                seed: env_config.seed,
                poisoned_seed: 21,
                t: 0,
            }) as Box<dyn Environment>)
        });
        let study = run_policy_gradient(&config, AgentMode::Reinforce, factory, &mut SeedSequence::new(20))
            .await
            .unwrap();

        // run 1 (seed 21) fails in both learning-rate cells
        assert_eq!(study.failures.len(), 2);
        assert!(study.failures.iter().all(|f| f.run == 1 && f.seed == 21));
        for lr_index in 0..2 {
            assert!(study.steps.slice(s![0, lr_index, 1, ..]).iter().all(|s| s.is_nan()));
            assert!(study.steps.slice(s![0, lr_index, 0, ..]).iter().all(|&s| s == 3.0));
        }
    }
}
