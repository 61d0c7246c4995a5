//! Experiment harness for the triad RL studies
//!
//! This crate provides:
//! - The Baird divergence study and the policy-gradient grid study
//! - Deterministic seed assignment and cross-run statistics
//! - Study configuration and results persistence

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod orchestrator;
pub mod seed;
pub mod stats;
pub mod store;

pub use config::{BairdConfig, PolicyGradientConfig};
pub use orchestrator::{run_baird, run_comparison, run_policy_gradient, PolicyGradientStudy, RunFailure};
pub use seed::SeedSequence;
pub use stats::{aggregate_axis, aggregate_runs, RunSummary};
pub use store::{BairdResults, PolicyGradientResults, ResultsStore, DEFAULT_DATA_DIR};
