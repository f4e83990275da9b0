//! Generational neuroevolution of fixed-length controller genomes.
//!
//! A [`Population`] holds genomes of identical length, the flattened
//! parameters of a controller whose topology never changes. Each
//! generation, every genome drives one simulated trial; the trials report
//! a [`TrialResult`] each into a [`GenerationResults`] barrier, and once
//! every result is in the population is evaluated and evolved.
//!
//! Two selection schemes are supported:
//! - ranked selection with elitism, where the best genomes are cycled as
//!   parents and bred by uniform crossover and bounded mutation;
//! - Pareto selection, where the genomes whose trials are not dominated on
//!   distance, time and collisions survive and breed the remainder.
//!
//! A layered feedforward network that consumes these genomes is supplied
//! by the `roamer-nn` crate.
//!
//! # Example usage
//! ```
//! use roamer::{FitnessConfig, GenerationResults, GeneticConfig, Population, PopulationConfig, TrialResult};
//!
//! let genetic_config = GeneticConfig {
//!     genome_length: 4,
//!     ..GeneticConfig::default()
//! };
//! let population_config = PopulationConfig {
//!     max_generations: 5,
//!     ..PopulationConfig::default()
//! };
//! let fitness = FitnessConfig::default();
//!
//! let mut population = Population::new(population_config, genetic_config);
//! while !population.is_finished() {
//!     let mut results = GenerationResults::new(population.genomes().len());
//!     for (agent_id, genome) in population.genomes().iter().enumerate() {
//!         // Pretend smaller genes bring the agent closer to its goal.
//!         let remaining = genome.genes().iter().map(|g| g.abs()).sum::<f32>();
//!         results
//!             .submit(TrialResult {
//!                 agent_id,
//!                 goal_reached: false,
//!                 time_elapsed: 10.0,
//!                 distance_traveled: 1.0,
//!                 collisions: 0,
//!                 final_distance_to_goal: remaining,
//!             })
//!             .unwrap();
//!     }
//!     let report = population.evaluate(results, &fitness).unwrap();
//!     println!("generation {}: best {}", report.generation, report.best_fitness);
//!     population.evolve().unwrap();
//! }
//! assert_eq!(population.generation(), 5);
//! assert!(population.champion().is_some());
//! ```
mod genomics;
mod populations;
pub mod rng;
pub mod tables;
mod trials;

pub use genomics::{GeneticConfig, Genome, GenomeError};
pub use populations::*;
pub use trials::{FitnessConfig, GenerationResults, SubmissionError, TrialResult};
