//! Evolves navigation controllers and replays evolved weights.
//!
//! # Usage
//!
//! ```bash
//! # Evolve with the built-in defaults, writing into runs/latest
//! roamer-trials evolve
//!
//! # Evolve from a config file into a chosen directory
//! roamer-trials evolve --config configs/default.ron --output runs/pareto
//!
//! # Drive a saved controller through 20 fresh scenarios
//! roamer-trials replay --weights runs/latest/best_weights.csv --trials 20
//!
//! # Print the resolved config
//! roamer-trials config --config configs/default.ron
//! ```
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;

use roamer::rng::seeded;
use roamer_nn::weights::load_genome_or_random;
use roamer_trials::config::ExperimentConfig;
use roamer_trials::experiment::Experiment;
use roamer_trials::reports::write_trial_results;

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "roamer-trials")]
#[command(about = "Neuroevolution of navigation controllers in a simulated arena")]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Experiment config in RON; defaults apply when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Overrides the config's seed
    #[arg(long, global = true)]
    seed: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Evolve a fresh population
    Evolve {
        /// Directory for the fitness log, weight tables and snapshot
        #[arg(short, long, default_value = "runs/latest")]
        output: PathBuf,
    },
    /// Run a saved weight table through freshly sampled scenarios
    Replay {
        /// Weight table to load; a missing or mismatched table falls back to random weights
        #[arg(short, long)]
        weights: PathBuf,

        /// Number of scenarios
        #[arg(short, long, default_value_t = 10)]
        trials: usize,

        /// Trial results table; printed to stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the resolved config as RON
    Config,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut config = load_config(args.config.as_deref())?;
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    match args.command {
        Commands::Evolve { output } => evolve(config, &output),
        Commands::Replay {
            weights,
            trials,
            output,
        } => replay(config, &weights, trials, output.as_deref()),
        Commands::Config => {
            println!("{}", config.to_ron()?);
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<ExperimentConfig> {
    match path {
        Some(path) => ExperimentConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(ExperimentConfig::default()),
    }
}

fn evolve(config: ExperimentConfig, output: &Path) -> Result<()> {
    let experiment = Experiment::new(config).context("invalid experiment")?;
    let summary = experiment
        .evolve(output)
        .with_context(|| format!("evolution into {} failed", output.display()))?;
    match &summary.champion {
        Some(champion) => info!(
            "{} generations evolved, champion fitness {:.4}, results in {}",
            summary.generations,
            champion.fitness(),
            output.display()
        ),
        None => info!("no generation was evaluated"),
    }
    Ok(())
}

fn replay(config: ExperimentConfig, weights: &Path, trials: usize, output: Option<&Path>) -> Result<()> {
    let experiment = Experiment::new(config).context("invalid experiment")?;
    let config = experiment.config();
    let mut rng = seeded(config.seed);
    let genome = load_genome_or_random(weights, experiment.genetic_config(), config.delimiter, &mut rng);

    let results = experiment.replay(&genome, trials).context("replay failed")?;
    let reached = results.iter().filter(|r| r.goal_reached).count();
    info!("{} of {} trials reached their goal", reached, results.len());

    match output {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
            write_trial_results(BufWriter::new(file), &results, &config.fitness, config.delimiter)?;
        }
        None => write_trial_results(io::stdout().lock(), &results, &config.fitness, config.delimiter)?,
    }
    Ok(())
}
