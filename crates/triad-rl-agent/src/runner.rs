//! Drives one agent through one episode of one environment

use tracing::trace;

use triad_rl_core::{Agent, Environment, RLError, Result, UpdateStats};

/// Summary of a completed episode
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeOutcome {
    /// Steps survived
    pub steps: usize,
    /// Undiscounted return
    pub total_reward: f64,
    /// Whether the episode ended on the step cap or an environment time limit
    pub truncated: bool,
    /// Statistics of the post-episode update
    pub update: UpdateStats,
}

/// Episode loop: reset, act and step until `done` or the step cap, then update once.
///
/// If the environment or the agent fails mid-episode the partial trajectory
/// is discarded and no update happens.
#[derive(Debug, Clone, Copy)]
pub struct EpisodeRunner {
    max_steps: usize,
}

impl EpisodeRunner {
    /// Runner with a hard ceiling of `max_steps` steps per episode
    pub fn new(max_steps: usize) -> Result<Self> {
        if max_steps == 0 {
            return Err(RLError::Configuration("max_steps must be positive".into()));
        }
        Ok(Self { max_steps })
    }

    /// Step cap
    #[must_use]
    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    /// Run one episode and apply the agent's update
    pub async fn run<E, A>(&self, env: &mut E, agent: &mut A) -> Result<EpisodeOutcome>
    where
        E: Environment + ?Sized,
        A: Agent + ?Sized,
    {
        let mut observation = match env.reset().await {
            Ok(observation) => observation,
            Err(err) => return Err(abandon(agent, as_environment_error(err))),
        };

        let mut steps = 0;
        let mut total_reward = 0.0;
        let truncated = loop {
            let action = match agent.act(&observation) {
                Ok(action) => action,
                Err(err) => return Err(abandon(agent, err)),
            };
            let step = match env.step(action).await {
                Ok(step) => step,
                Err(err) => return Err(abandon(agent, as_environment_error(err))),
            };

            agent.observe_reward(step.reward);
            total_reward += step.reward.value();
            steps += 1;

            if step.done {
                break step.truncated;
            }
            if steps >= self.max_steps {
                break true;
            }
            observation = step.observation;
        };

        let update = agent.finish_episode()?;
        metrics::increment_counter!("triad_episodes_total");
        metrics::increment_counter!("triad_optimizer_steps_total");
        trace!(steps, total_reward, truncated, "episode finished");

        Ok(EpisodeOutcome {
            steps,
            total_reward,
            truncated,
            update,
        })
    }
}

fn abandon<A: Agent + ?Sized>(agent: &mut A, err: RLError) -> RLError {
    agent.discard_episode();
    err
}

fn as_environment_error(err: RLError) -> RLError {
    match err {
        RLError::Environment(_) => err,
        other => RLError::Environment(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use triad_rl_core::{DiscreteAction, Reward, Step, VectorObservation};

    /// Ends after `done_at` steps, or fails at step `fail_at`
    struct ScriptedEnv {
        t: usize,
        done_at: Option<usize>,
        fail_at: Option<usize>,
    }

    impl ScriptedEnv {
        fn new(done_at: Option<usize>, fail_at: Option<usize>) -> Self {
            Self {
                t: 0,
                done_at,
                fail_at,
            }
        }
    }

    #[async_trait]
    impl Environment for ScriptedEnv {
        fn observation_dim(&self) -> usize {
            1
        }

        fn action_count(&self) -> usize {
            2
        }

        async fn reset(&mut self) -> Result<VectorObservation> {
            self.t = 0;
            Ok(VectorObservation::new(vec![0.0]))
        }

        async fn step(&mut self, _action: DiscreteAction) -> Result<Step> {
            self.t += 1;
            if Some(self.t) == self.fail_at {
                return Err(RLError::Environment("simulator crashed".into()));
            }
            Ok(Step {
                observation: VectorObservation::new(vec![0.0]),
                reward: Reward(1.0),
                done: Some(self.t) == self.done_at,
                truncated: false,
            })
        }
    }

    #[derive(Default)]
    struct CountingAgent {
        pending: usize,
        updates: usize,
        discards: usize,
    }

    impl Agent for CountingAgent {
        fn act(&mut self, _observation: &VectorObservation) -> Result<DiscreteAction> {
            self.pending += 1;
            Ok(DiscreteAction(0))
        }

        fn observe_reward(&mut self, _reward: Reward) {}

        fn finish_episode(&mut self) -> Result<UpdateStats> {
            self.updates += 1;
            let steps = std::mem::take(&mut self.pending);
            Ok(UpdateStats {
                steps,
                ..UpdateStats::default()
            })
        }

        fn discard_episode(&mut self) {
            self.discards += 1;
            self.pending = 0;
        }
    }

    #[tokio::test]
    async fn test_episode_ends_when_environment_is_done() {
        let runner = EpisodeRunner::new(200).unwrap();
        let mut env = ScriptedEnv::new(Some(17), None);
        let mut agent = CountingAgent::default();

        let outcome = runner.run(&mut env, &mut agent).await.unwrap();
        assert_eq!(outcome.steps, 17);
        assert_eq!(outcome.total_reward, 17.0);
        assert!(!outcome.truncated);
        assert_eq!(outcome.update.steps, 17);
        assert_eq!(agent.updates, 1);
    }

    #[tokio::test]
    async fn test_step_cap_is_hard_ceiling() {
        let runner = EpisodeRunner::new(25).unwrap();
        let mut env = ScriptedEnv::new(None, None);
        let mut agent = CountingAgent::default();

        let outcome = runner.run(&mut env, &mut agent).await.unwrap();
        assert_eq!(outcome.steps, 25);
        assert!(outcome.truncated);
        assert_eq!(agent.updates, 1);
    }

    #[tokio::test]
    async fn test_environment_failure_skips_update() {
        let runner = EpisodeRunner::new(200).unwrap();
        let mut env = ScriptedEnv::new(Some(50), Some(4));
        let mut agent = CountingAgent::default();

        let err = runner.run(&mut env, &mut agent).await.unwrap_err();
        assert!(matches!(err, RLError::Environment(_)));
        assert_eq!(agent.updates, 0);
        assert_eq!(agent.discards, 1);
        assert_eq!(agent.pending, 0);
    }

    #[test]
    fn test_zero_step_cap_rejected() {
        assert!(EpisodeRunner::new(0).is_err());
    }
}
