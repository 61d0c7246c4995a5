//! Environments for the triad RL studies
//!
//! This crate provides:
//! - Baird's seven-state counterexample (dynamics and features)
//! - The cart-pole control task used by the policy-gradient study
//! - A name-based registry for building environments per run

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod baird;
pub mod classic;
pub mod registry;

pub use baird::{
    baird_features, baird_initial_weights, BairdDynamics, BAIRD_FEATURES, BAIRD_STATES,
    BAIRD_TARGET_RATIO, BAIRD_TERMINAL_STATE,
};
pub use classic::{CartPoleConfig, CartPoleEnv};
pub use registry::{env_constructor, list_envs, register_env, EnvConstructor, EnvRegistry};

// Re-export core types
pub use triad_rl_core::{Environment, EnvironmentConfig, Step};
