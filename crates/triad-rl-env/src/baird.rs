//! Baird's seven-state counterexample
//!
//! Six "upper" states and one "lower" state. The behavior policy jumps to
//! any of the seven states uniformly at random; the target policy always
//! goes to the lower state. Off-policy semi-gradient TD(0) with the linear
//! features below diverges on this chain.

use ndarray::{array, Array1};
use rand::Rng;

use triad_rl_core::FeatureTable;

/// Number of states in the chain
pub const BAIRD_STATES: usize = 7;

/// Feature dimension
pub const BAIRD_FEATURES: usize = 8;

/// The lower state, the only target of the target policy
pub const BAIRD_TERMINAL_STATE: usize = 6;

/// pi(a|s) / b(a|s) for the target action: 1 / (1/7)
pub const BAIRD_TARGET_RATIO: f64 = 7.0;

/// Feature table: upper state `i` is `2·e_i + e_8`, the lower state is `e_7 + 2·e_8`.
#[must_use]
pub fn baird_features() -> FeatureTable {
    FeatureTable::new(array![
        [2.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0],
        [0.0, 2.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0],
        [0.0, 0.0, 2.0, 0.0, 0.0, 0.0, 0.0, 1.0],
        [0.0, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0, 1.0],
        [0.0, 0.0, 0.0, 0.0, 2.0, 0.0, 0.0, 1.0],
        [0.0, 0.0, 0.0, 0.0, 0.0, 2.0, 0.0, 1.0],
        [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 2.0],
    ])
}

/// Standard initial weights `[1, 1, 1, 1, 1, 1, 10, 1]`
#[must_use]
pub fn baird_initial_weights() -> Array1<f64> {
    array![1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 10.0, 1.0]
}

/// Transition model of the chain under the uniform behavior policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BairdDynamics {
    state: usize,
}

impl BairdDynamics {
    /// Start in a uniformly random state
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            state: rng.gen_range(0..BAIRD_STATES),
        }
    }

    /// Start in a given state
    ///
    /// # Panics
    ///
    /// Panics if `state` is not one of the seven chain states.
    #[must_use]
    pub fn starting_at(state: usize) -> Self {
        assert!(state < BAIRD_STATES, "Baird state out of range: {state}");
        Self { state }
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> usize {
        self.state
    }

    /// Draw the behavior policy's next state, independent of the current one
    pub fn sample_next<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        rng.gen_range(0..BAIRD_STATES)
    }

    /// Importance ratio of the transition into `next`
    #[must_use]
    pub fn importance_ratio(next: usize) -> f64 {
        if next == BAIRD_TERMINAL_STATE {
            BAIRD_TARGET_RATIO
        } else {
            0.0
        }
    }

    /// Move to `next`
    pub fn advance(&mut self, next: usize) {
        self.state = next;
    }
}
