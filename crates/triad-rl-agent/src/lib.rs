//! Learners for the triad RL studies
//!
//! This crate provides:
//! - Off-policy semi-gradient TD(0) for Baird's counterexample
//! - REINFORCE and actor-critic agents over a shared policy/value MLP
//! - Adam, the per-episode trajectory buffer and the episode runner

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod agent;
pub mod buffer;
pub mod optimizer;
pub mod policy;
pub mod runner;
pub mod td;
pub mod update;
pub mod utils;

pub use agent::PolicyGradientAgent;
pub use buffer::{StepRecord, TrajectoryBuffer};
pub use optimizer::{Adam, AdamConfig};
pub use policy::{ForwardPass, NetworkConfig, ParameterSet, PolicyValueNetwork};
pub use runner::{EpisodeOutcome, EpisodeRunner};
pub use td::{SemiGradientTd0, TdStep};
pub use update::{loss_for_mode, ActorCritic, LossTerms, PolicyGradientLoss, PolicyGradientUpdater, Reinforce};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        EpisodeRunner, PolicyGradientAgent, PolicyGradientUpdater, SemiGradientTd0,
        TrajectoryBuffer,
    };
    pub use triad_rl_core::prelude::*;
}
