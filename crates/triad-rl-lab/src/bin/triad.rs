// Triad study runner
// Baird divergence and policy-gradient comparisons from the command line

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ndarray::{s, Axis};
use tracing_subscriber::EnvFilter;

use triad_rl_env::{env_constructor, list_envs};
use triad_rl_lab::{
    aggregate_axis, aggregate_runs, run_baird, run_comparison, BairdConfig, BairdResults,
    PolicyGradientConfig, PolicyGradientResults, PolicyGradientStudy, ResultsStore, SeedSequence,
    DEFAULT_DATA_DIR,
};

#[derive(Parser)]
#[command(name = "triad")]
#[command(about = "Baird divergence and policy-gradient studies", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Off-policy semi-gradient TD(0) on Baird's counterexample
    Baird {
        /// TD(0) updates per run
        #[arg(long)]
        steps: Option<usize>,

        /// Number of runs
        #[arg(long)]
        runs: Option<usize>,

        /// Step size
        #[arg(long)]
        alpha: Option<f64>,

        /// Discount factor
        #[arg(long)]
        gamma: Option<f64>,

        /// Seed of the first run
        #[arg(long)]
        seed: Option<u64>,

        #[command(flatten)]
        io: IoArgs,
    },

    /// REINFORCE vs actor-critic over a hidden-size x learning-rate grid
    PolicyGradient {
        /// Registered environment name
        #[arg(short, long)]
        env: Option<String>,

        /// Discount factor
        #[arg(long)]
        gamma: Option<f64>,

        /// Learning rates, comma separated
        #[arg(long, value_delimiter = ',', num_args = 1..)]
        alphas: Option<Vec<f64>>,

        /// Hidden layer sizes, comma separated
        #[arg(long, value_delimiter = ',', num_args = 1..)]
        hidden_sizes: Option<Vec<usize>>,

        /// Runs per grid point
        #[arg(long)]
        runs: Option<usize>,

        /// Episodes per run
        #[arg(long)]
        episodes: Option<usize>,

        /// Hard cap on steps per episode
        #[arg(long)]
        max_steps: Option<usize>,

        /// Episodes between progress lines
        #[arg(long)]
        log_interval: Option<usize>,

        /// Starting seed (random when omitted)
        #[arg(long)]
        seed: Option<u64>,

        #[command(flatten)]
        io: IoArgs,
    },

    /// List registered environments
    Envs,
}

#[derive(clap::Args)]
struct IoArgs {
    /// JSON configuration file; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory for saved results
    #[arg(long, default_value = DEFAULT_DATA_DIR)]
    data_dir: PathBuf,

    /// Summarize a saved results file instead of running
    #[arg(long)]
    load: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Baird {
            steps,
            runs,
            alpha,
            gamma,
            seed,
            io,
        } => {
            let store = ResultsStore::new(&io.data_dir);
            let results = if let Some(name) = &io.load {
                store
                    .load::<BairdResults>(name)
                    .await
                    .with_context(|| format!("loading {}", name.display()))?
            } else {
                let mut config = match &io.config {
                    Some(path) => BairdConfig::from_json_file(path)
                        .with_context(|| format!("reading {}", path.display()))?,
                    None => BairdConfig::default(),
                };
                override_with(&mut config.steps, steps);
                override_with(&mut config.runs, runs);
                override_with(&mut config.alpha, alpha);
                override_with(&mut config.gamma, gamma);
                override_with(&mut config.first_seed, seed);

                let mut seeds = SeedSequence::new(config.first_seed);
                let weights = run_baird(&config, &mut seeds)?;
                let results = BairdResults { weights, config };
                let path = store.save(&results, "baird").await?;
                println!("Saved results to {}", path.display());
                results
            };
            print_baird_summary(&results)?;
        }

        Commands::PolicyGradient {
            env,
            gamma,
            alphas,
            hidden_sizes,
            runs,
            episodes,
            max_steps,
            log_interval,
            seed,
            io,
        } => {
            let store = ResultsStore::new(&io.data_dir);
            let results = if let Some(name) = &io.load {
                store
                    .load::<PolicyGradientResults>(name)
                    .await
                    .with_context(|| format!("loading {}", name.display()))?
            } else {
                let mut config = match &io.config {
                    Some(path) => PolicyGradientConfig::from_json_file(path)
                        .with_context(|| format!("reading {}", path.display()))?,
                    None => PolicyGradientConfig::default(),
                };
                override_with(&mut config.env, env);
                override_with(&mut config.gamma, gamma);
                override_with(&mut config.learning_rates, alphas);
                override_with(&mut config.hidden_sizes, hidden_sizes);
                override_with(&mut config.runs, runs);
                override_with(&mut config.episodes, episodes);
                override_with(&mut config.max_steps, max_steps);
                override_with(&mut config.log_interval, log_interval);
                if seed.is_some() {
                    config.seed = seed;
                }

                let factory = env_constructor(&config.env)?;
                let mut seeds = SeedSequence::from_optional(config.seed);
                println!("First run seed: {}", seeds.peek());
                let (reinforce, actor_critic) = run_comparison(&config, factory, &mut seeds).await?;
                let results = PolicyGradientResults {
                    reinforce,
                    actor_critic,
                    config,
                };
                let path = store.save(&results, "policy_gradient").await?;
                println!("Saved results to {}", path.display());
                results
            };
            print_policy_gradient_summary(&results)?;
        }

        Commands::Envs => {
            for name in list_envs()? {
                println!("{name}");
            }
        }
    }

    Ok(())
}

fn override_with<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

fn print_baird_summary(results: &BairdResults) -> Result<()> {
    results.validate()?;
    let summary = aggregate_runs(&results.weights)?;
    let last = summary.mean.nrows().saturating_sub(1);
    println!(
        "Baird: {} runs, {} steps, alpha {}, gamma {}",
        results.config.runs, results.config.steps, results.config.alpha, results.config.gamma
    );
    for (i, (mean, std)) in summary
        .mean
        .row(last)
        .iter()
        .zip(summary.std.row(last))
        .enumerate()
    {
        println!("  w{}: {mean:>14.4} ± {std:.4}", i + 1);
    }
    Ok(())
}

fn print_policy_gradient_summary(results: &PolicyGradientResults) -> Result<()> {
    results.validate()?;
    for study in [&results.reinforce, &results.actor_critic] {
        print_study(study, &results.config)?;
    }
    Ok(())
}

fn print_study(study: &PolicyGradientStudy, config: &PolicyGradientConfig) -> Result<()> {
    let summary = aggregate_axis(&study.steps, Axis(2))?;
    println!("{} ({} failed runs)", study.mode, study.failures.len());
    for (h, hidden_size) in config.hidden_sizes.iter().enumerate() {
        for (l, learning_rate) in config.learning_rates.iter().enumerate() {
            let mean = summary.mean.slice(s![h, l, ..]);
            let std = summary.std.slice(s![h, l, ..]);
            println!(
                "  hidden {hidden_size:>4}  lr {learning_rate:<8}  final episode {:>7.2} ± {:<7.2}  overall {:>7.2}",
                mean.iter().next_back().copied().unwrap_or(f64::NAN),
                std.iter().next_back().copied().unwrap_or(f64::NAN),
                mean.mean().unwrap_or(f64::NAN),
            );
        }
    }
    for failure in &study.failures {
        println!(
            "  failed: hidden {} lr {} run {} seed {}: {}",
            config.hidden_sizes[failure.hidden_index],
            config.learning_rates[failure.lr_index],
            failure.run,
            failure.seed,
            failure.error
        );
    }
    Ok(())
}
