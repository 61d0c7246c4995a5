//! Per-episode trajectory buffer for policy-gradient agents

use triad_rl_core::{DiscreteAction, Reward, VectorObservation};

/// One action decision recorded during an episode
#[derive(Debug, Clone, PartialEq)]
pub struct StepRecord {
    /// Observation the action was chosen from
    pub observation: VectorObservation,
    /// Sampled action
    pub action: DiscreteAction,
    /// log pi(action | observation) at sampling time
    pub log_prob: f64,
    /// Value estimate at sampling time
    pub value: f64,
}

/// Append-only record of one episode: action decisions and the rewards that followed.
///
/// Owned by a single agent and cleared as a whole after every update.
#[derive(Debug, Clone, Default)]
pub struct TrajectoryBuffer {
    records: Vec<StepRecord>,
    rewards: Vec<f64>,
}

impl TrajectoryBuffer {
    /// Create an empty buffer
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an action decision
    pub fn record(&mut self, record: StepRecord) {
        self.records.push(record);
    }

    /// Record the reward following the last decision
    pub fn push_reward(&mut self, reward: Reward) {
        self.rewards.push(reward.value());
    }

    /// Recorded decisions, in order
    #[must_use]
    pub fn records(&self) -> &[StepRecord] {
        &self.records
    }

    /// Recorded rewards, in order
    #[must_use]
    pub fn rewards(&self) -> &[f64] {
        &self.rewards
    }

    /// Number of recorded decisions
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether both sequences are empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty() && self.rewards.is_empty()
    }

    /// Sum of recorded rewards
    #[must_use]
    pub fn total_reward(&self) -> f64 {
        self.rewards.iter().sum()
    }

    /// Clear decisions and rewards together
    pub fn clear(&mut self) {
        self.records.clear();
        self.rewards.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(action: usize) -> StepRecord {
        StepRecord {
            observation: VectorObservation::new(vec![0.0, 1.0]),
            action: DiscreteAction(action),
            log_prob: -0.69,
            value: 0.1,
        }
    }

    #[test]
    fn test_clear_empties_both_sequences() {
        let mut buffer = TrajectoryBuffer::new();
        for i in 0..4 {
            buffer.record(record(i % 2));
            buffer.push_reward(Reward(1.0));
        }
        assert_eq!(buffer.len(), 4);
        assert_eq!(buffer.total_reward(), 4.0);

        buffer.clear();
        assert!(buffer.is_empty());
        assert!(buffer.records().is_empty());
        assert!(buffer.rewards().is_empty());
    }
}
