//! # Roamer-NN
//! Fixed-topology feedforward networks for [`roamer`](../roamer/index.html) genomes.
//!
//! A genome is read as the flat parameter vector of a layered, fully
//! connected network described by an [`Architecture`]. For each pair of
//! consecutive layers the vector holds the row-major weight block followed
//! by the biases. Hidden layers use `tanh` or the logistic function; the
//! output layer always uses `tanh`, so outputs lie in [-1, 1].
//!
//! The [`weights`] module persists genomes as delimited weight tables.
//!
//! [`Architecture`]: crate::Architecture
//! [`weights`]: crate::weights
//!
//! # Example usage: evolving a 2-input network towards a target output
//! ```
//! use roamer::{GeneticConfig, Population, PopulationConfig};
//! use roamer_nn::{ActivationScheme, Architecture, FeedforwardNetwork};
//!
//! let architecture = Architecture::new(vec![2, 3, 1], ActivationScheme::Tanh).unwrap();
//! let genetic_config = architecture.genetic_config(&GeneticConfig::default());
//! let population_config = PopulationConfig {
//!     max_generations: 10,
//!     ..PopulationConfig::default()
//! };
//!
//! let mut population = Population::new(population_config, genetic_config);
//! while !population.is_finished() {
//!     population
//!         .evaluate_fitness(|genome| {
//!             let network = FeedforwardNetwork::from_genome(&architecture, genome).unwrap();
//!             let output = network.evaluate(&[0.5, -0.5]).unwrap()[0];
//!             1.0 - (output - 0.3).abs()
//!         })
//!         .unwrap();
//!     population.evolve().unwrap();
//! }
//! assert!(population.champion().unwrap().fitness() > 0.0);
//! ```
mod architecture;
mod errors;
pub mod networks;
pub mod weights;

pub use architecture::{ActivationScheme, ActivationType, Architecture};
pub use errors::NetworkError;
pub use networks::FeedforwardNetwork;
