//! Action representations and action spaces

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Discrete action, an index into the policy's output distribution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiscreteAction(pub usize);

impl DiscreteAction {
    /// Index of the action
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl From<usize> for DiscreteAction {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

/// Discrete action space with `n` actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscreteSpace {
    /// Number of discrete actions
    pub n: usize,
}

impl DiscreteSpace {
    /// Create a new discrete action space
    #[must_use]
    pub fn new(n: usize) -> Self {
        Self { n }
    }

    /// Sample an action uniformly at random
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> DiscreteAction {
        DiscreteAction(rng.gen_range(0..self.n))
    }

    /// Check if an action is valid within this space
    #[must_use]
    pub fn contains(&self, action: DiscreteAction) -> bool {
        action.0 < self.n
    }

    /// Validate an action, returning an error for out-of-range indices
    pub fn check(&self, action: DiscreteAction) -> crate::Result<()> {
        if self.contains(action) {
            Ok(())
        } else {
            Err(crate::RLError::InvalidAction(format!(
                "action {} outside space of {} actions",
                action.0, self.n
            )))
        }
    }
}
