//! Core reinforcement learning traits and types for the triad RL studies
//!
//! This crate provides the foundational abstractions shared by the
//! Baird counterexample study and the policy-gradient study: the
//! environment contract, the agent contract, linear value functions and
//! the discounted-return computation.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod action;
pub mod agent;
pub mod environment;
pub mod error;
pub mod observation;
pub mod returns;
pub mod reward;
pub mod value;

// Re-export core traits and types
pub use action::{DiscreteAction, DiscreteSpace};
pub use agent::{Agent, AgentConfig, AgentMode, UpdateStats};
pub use environment::{Environment, EnvironmentConfig, Step};
pub use error::{check_gamma, check_learning_rate, RLError, Result};
pub use observation::VectorObservation;
pub use returns::{
    discounted_returns, normalize_returns, normalized_discounted_returns, NORMALIZATION_EPSILON,
};
pub use reward::Reward;
pub use value::{FeatureTable, LinearValueFunction, ValueFunction};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Agent, AgentConfig, AgentMode, DiscreteAction, Environment, Result, Reward, Step,
        VectorObservation,
    };
}
