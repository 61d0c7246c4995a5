//! Deterministic per-run seed assignment

use serde::{Deserialize, Serialize};

/// Monotone seed counter owned by whoever dispatches runs.
///
/// Seeds are consecutive from the starting value, so a study with `n` runs
/// sees a prefix of the seeds a study with `n + k` runs would see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedSequence {
    next: u64,
}

impl SeedSequence {
    /// Sequence starting at `start`
    #[must_use]
    pub fn new(start: u64) -> Self {
        Self { next: start }
    }

    /// Sequence starting at `start`, or at a random value when `None`
    #[must_use]
    pub fn from_optional(start: Option<u64>) -> Self {
        Self::new(start.unwrap_or_else(rand::random))
    }

    /// Seed the next call to [`SeedSequence::next_seed`] will return
    #[must_use]
    pub fn peek(&self) -> u64 {
        self.next
    }

    /// Hand out the next seed
    pub fn next_seed(&mut self) -> u64 {
        let seed = self.next;
        self.next = self.next.wrapping_add(1);
        seed
    }

    /// Hand out the next `n` seeds
    pub fn take_seeds(&mut self, n: usize) -> Vec<u64> {
        (0..n).map(|_| self.next_seed()).collect()
    }
}
