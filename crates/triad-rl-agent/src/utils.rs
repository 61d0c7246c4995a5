//! Numerical helpers shared by the policy network and the losses

use ndarray::{Array1, Array2, ArrayView1, Axis};

/// Numerically stable softmax
#[must_use]
pub fn softmax(logits: &Array1<f64>) -> Array1<f64> {
    // subtract max for numerical stability
    let max_logit = logits.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b));
    let exp_logits = logits.mapv(|x| (x - max_logit).exp());
    let sum_exp = exp_logits.sum();
    exp_logits / sum_exp
}

/// Smooth L1 (Huber, beta = 1) loss of a residual and its derivative
#[must_use]
pub fn smooth_l1(residual: f64) -> (f64, f64) {
    if residual.abs() < 1.0 {
        (0.5 * residual * residual, residual)
    } else {
        (residual.abs() - 0.5, residual.signum())
    }
}

/// Outer product `a ⊗ b`, shape `(a.len(), b.len())`
#[must_use]
pub fn outer(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> Array2<f64> {
    a.insert_axis(Axis(1)).dot(&b.insert_axis(Axis(0)))
}
