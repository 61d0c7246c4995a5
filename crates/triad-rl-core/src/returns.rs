//! Discounted returns and return normalization

use statrs::statistics::Statistics;

/// Smallest positive `f32` increment, added to the standard deviation so a
/// constant return sequence normalizes to zeros instead of NaN.
pub const NORMALIZATION_EPSILON: f64 = f32::EPSILON as f64;

/// Compute discounted returns, `R_t = r_t + gamma * R_{t+1}`, in chronological order.
#[must_use]
pub fn discounted_returns(rewards: &[f64], gamma: f64) -> Vec<f64> {
    let mut returns = vec![0.0; rewards.len()];
    let mut running_return = 0.0;

    for i in (0..rewards.len()).rev() {
        running_return = rewards[i] + gamma * running_return;
        returns[i] = running_return;
    }

    returns
}

/// Standardize returns to zero mean and unit (sample) standard deviation.
///
/// A single return has no spread and normalizes to zero.
#[must_use]
pub fn normalize_returns(returns: &[f64]) -> Vec<f64> {
    if returns.is_empty() {
        return Vec::new();
    }

    let mean = returns.iter().mean();
    let std = if returns.len() >= 2 {
        returns.iter().std_dev()
    } else {
        0.0
    };

    returns
        .iter()
        .map(|r| (r - mean) / (std + NORMALIZATION_EPSILON))
        .collect()
}

/// Discounted then normalized returns, the learning signal of one episode.
#[must_use]
pub fn normalized_discounted_returns(rewards: &[f64], gamma: f64) -> Vec<f64> {
    normalize_returns(&discounted_returns(rewards, gamma))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_discounted_returns_backward() {
        let returns = discounted_returns(&[1.0, 1.0, 1.0], 0.5);
        assert_eq!(returns, vec![1.75, 1.5, 1.0]);
    }

    #[test]
    fn test_undiscounted_returns_are_suffix_sums() {
        let returns = discounted_returns(&[1.0, 2.0, 3.0], 1.0);
        assert_eq!(returns, vec![6.0, 5.0, 3.0]);
    }

    #[test]
    fn test_empty_rewards() {
        assert!(discounted_returns(&[], 0.9).is_empty());
        assert!(normalize_returns(&[]).is_empty());
        assert!(normalized_discounted_returns(&[], 0.9).is_empty());
    }

    #[test]
    fn test_single_step_episode_normalizes_to_zero() {
        let normalized = normalized_discounted_returns(&[1.0], 0.9);
        assert_eq!(normalized.len(), 1);
        assert_relative_eq!(normalized[0], 0.0);
    }

    #[test]
    fn test_normalization_uses_sample_std() {
        let normalized = normalize_returns(&[1.0, 2.0, 3.0]);
        assert_relative_eq!(normalized[0], -1.0, epsilon = 1e-6);
        assert_relative_eq!(normalized[1], 0.0);
        assert_relative_eq!(normalized[2], 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_constant_returns_normalize_to_zero() {
        let normalized = normalize_returns(&[2.5, 2.5, 2.5, 2.5]);
        assert!(normalized.iter().all(|r| r.abs() < 1e-12));
    }

    proptest! {
        #[test]
        fn prop_returns_keep_length(
            rewards in prop::collection::vec(-10.0f64..10.0, 0..64),
            gamma in 0.0f64..=1.0,
        ) {
            prop_assert_eq!(discounted_returns(&rewards, gamma).len(), rewards.len());
        }

        #[test]
        fn prop_normalized_returns_are_standardized(
            base in prop::collection::vec(-50.0f64..50.0, 2..64),
        ) {
            // Spread the sequence so its standard deviation is at least one.
            let mut returns = base;
            returns[0] = -100.0;
            returns[1] = 100.0;

            let normalized = normalize_returns(&returns);
            let mean = normalized.iter().mean();
            let std = normalized.iter().std_dev();

            prop_assert!(mean.abs() < NORMALIZATION_EPSILON);
            prop_assert!((std - 1.0).abs() < NORMALIZATION_EPSILON);
        }
    }
}
