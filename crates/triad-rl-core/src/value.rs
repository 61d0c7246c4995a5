//! Value functions for RL algorithms

use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};

use crate::{RLError, Result};

/// State value function V(s) over a discrete state index
pub trait ValueFunction {
    /// Estimate the value of a state
    fn value(&self, state: usize) -> f64;
}

/// Immutable table mapping a discrete state index to its feature vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureTable {
    features: Array2<f64>,
}

impl FeatureTable {
    /// Build a table from a `(states, features)` matrix
    #[must_use]
    pub fn new(features: Array2<f64>) -> Self {
        Self { features }
    }

    /// Number of states (rows)
    #[must_use]
    pub fn num_states(&self) -> usize {
        self.features.nrows()
    }

    /// Feature dimension (columns)
    #[must_use]
    pub fn dim(&self) -> usize {
        self.features.ncols()
    }

    /// Feature vector of a state
    ///
    /// # Panics
    ///
    /// Panics if `state` is not a row of the table.
    #[must_use]
    pub fn row(&self, state: usize) -> ArrayView1<'_, f64> {
        self.features.row(state)
    }
}

/// Linear value function `V(s) = x(s) · w` over a fixed feature table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearValueFunction {
    features: FeatureTable,
    weights: Array1<f64>,
}

impl LinearValueFunction {
    /// Create a linear value function with the given initial weights
    pub fn new(features: FeatureTable, weights: Array1<f64>) -> Result<Self> {
        if weights.len() != features.dim() {
            return Err(RLError::DimensionMismatch {
                expected: features.dim(),
                actual: weights.len(),
            });
        }
        Ok(Self { features, weights })
    }

    /// Current weight vector
    #[must_use]
    pub fn weights(&self) -> &Array1<f64> {
        &self.weights
    }

    /// Move the weights along the feature vector of `state`:
    /// `w <- w + step * x(state)`
    pub fn nudge(&mut self, state: usize, step: f64) {
        self.weights.scaled_add(step, &self.features.row(state));
    }
}

impl ValueFunction for LinearValueFunction {
    fn value(&self, state: usize) -> f64 {
        self.features.row(state).dot(&self.weights)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn table() -> FeatureTable {
        FeatureTable::new(array![[1.0, 0.0, 1.0], [0.0, 2.0, 1.0]])
    }

    #[test]
    fn test_value_is_dot_product() {
        let v = LinearValueFunction::new(table(), array![1.0, 2.0, 3.0]).unwrap();
        assert_relative_eq!(v.value(0), 4.0);
        assert_relative_eq!(v.value(1), 7.0);
    }

    #[test]
    fn test_nudge_moves_along_features() {
        let mut v = LinearValueFunction::new(table(), array![0.0, 0.0, 0.0]).unwrap();
        v.nudge(1, 0.5);
        assert_eq!(v.weights(), &array![0.0, 1.0, 0.5]);
    }

    #[test]
    fn test_weight_dimension_checked() {
        let err = LinearValueFunction::new(table(), array![1.0]).unwrap_err();
        assert!(matches!(
            err,
            RLError::DimensionMismatch { expected: 3, actual: 1 }
        ));
    }
}
