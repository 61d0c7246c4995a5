//! Error types for the RL core library

use std::path::PathBuf;

use thiserror::Error;

/// Core error type for RL operations
#[derive(Error, Debug)]
pub enum RLError {
    /// Invalid experiment or agent configuration, raised before any run starts
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Environment-related errors
    #[error("Environment error: {0}")]
    Environment(String),

    /// Invalid action
    #[error("Invalid action: {0}")]
    InvalidAction(String),

    /// Dimension mismatch
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Computation error
    #[error("Computation error: {0}")]
    Computation(String),

    /// A persisted results bundle could not be found at any searched location
    #[error("Data unavailable: tried {}", display_paths(.tried))]
    DataUnavailable { tried: Vec<PathBuf> },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Binary encoding error
    #[error("Encoding error: {0}")]
    Encoding(#[from] bincode::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Other errors
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type alias for RL operations
pub type Result<T> = std::result::Result<T, RLError>;

/// Check that a discount factor lies in `[0, 1]`.
pub fn check_gamma(gamma: f64) -> Result<()> {
    if (0.0..=1.0).contains(&gamma) {
        Ok(())
    } else {
        Err(RLError::Configuration(format!(
            "discount factor must satisfy 0 <= gamma <= 1, got {gamma}"
        )))
    }
}

/// Check that a learning rate is strictly positive and finite.
pub fn check_learning_rate(alpha: f64) -> Result<()> {
    if alpha > 0.0 && alpha.is_finite() {
        Ok(())
    } else {
        Err(RLError::Configuration(format!(
            "learning rate must be positive, got {alpha}"
        )))
    }
}
