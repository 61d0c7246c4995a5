//! Mean and spread across repeated runs

use ndarray::{Array, Axis, Dimension, RemoveAxis};
use serde::{Deserialize, Serialize};

use triad_rl_core::{RLError, Result};

/// Element-wise mean and population standard deviation over one axis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary<D: Dimension> {
    /// Mean across runs
    pub mean: Array<f64, D>,
    /// Population standard deviation across runs
    pub std: Array<f64, D>,
}

/// Aggregate over `axis`. Failed runs stored as NaN propagate into their cells.
pub fn aggregate_axis<D>(data: &Array<f64, D>, axis: Axis) -> Result<RunSummary<D::Smaller>>
where
    D: Dimension + RemoveAxis,
{
    if axis.index() >= data.ndim() {
        return Err(RLError::Computation(format!(
            "axis {} out of range for a {}-d tensor",
            axis.index(),
            data.ndim()
        )));
    }
    let mean = data
        .mean_axis(axis)
        .ok_or_else(|| RLError::Computation("cannot aggregate zero runs".into()))?;
    let std = data.std_axis(axis, 0.0);
    Ok(RunSummary { mean, std })
}

/// Aggregate over the leading (run) axis
pub fn aggregate_runs<D>(data: &Array<f64, D>) -> Result<RunSummary<D::Smaller>>
where
    D: Dimension + RemoveAxis,
{
    aggregate_axis(data, Axis(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{array, Array3, Array4};

    #[test]
    fn test_mean_and_population_std() {
        let data = array![[1.0, 10.0], [3.0, 10.0]];
        let summary = aggregate_runs(&data).unwrap();
        assert_eq!(summary.mean, array![2.0, 10.0]);
        assert_relative_eq!(summary.std[0], 1.0);
        assert_relative_eq!(summary.std[1], 0.0);
    }

    #[test]
    fn test_run_axis_of_policy_gradient_tensor() {
        let mut data = Array4::<f64>::zeros((2, 3, 4, 5));
        for run in 0..4 {
            #[allow(clippy::cast_precision_loss)]
            data.index_axis_mut(Axis(2), run).fill(run as f64);
        }
        let summary = aggregate_axis(&data, Axis(2)).unwrap();
        assert_eq!(summary.mean.dim(), (2, 3, 5));
        assert!(summary.mean.iter().all(|&m| (m - 1.5).abs() < 1e-12));
    }

    #[test]
    fn test_zero_runs_is_an_error() {
        let data = Array3::<f64>::zeros((0, 11, 8));
        assert!(matches!(aggregate_runs(&data), Err(RLError::Computation(_))));
    }

    #[test]
    fn test_axis_out_of_range() {
        let data = array![[1.0, 2.0]];
        assert!(aggregate_axis(&data, Axis(2)).is_err());
    }
}
