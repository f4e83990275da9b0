use super::pareto::DistanceObjective;

use serde::{Deserialize, Serialize};

use std::num::NonZeroUsize;

/// How the next generation's parents are chosen.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum SelectionStrategy {
    /// Rank by fitness and cycle the top `parent_count`
    /// genomes round-robin as parents.
    Ranked { parent_count: usize },
    /// Keep the non-dominated genomes over (distance, time, collisions)
    /// and breed the rest of the population from them.
    Pareto { distance: DistanceObjective },
}

impl Default for SelectionStrategy {
    fn default() -> SelectionStrategy {
        SelectionStrategy::Ranked { parent_count: 5 }
    }
}

/// Configuration data for population generation
/// and evolution.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    /// Size of the population.
    pub size: NonZeroUsize,
    /// Top n of the population which is copied
    /// as-is to the next generation under ranked selection.
    pub elitism: usize,
    pub selection: SelectionStrategy,
    /// Evolution stops once this many generations have been evolved.
    pub max_generations: usize,
    /// Evolution stops early once the champion reaches this fitness.
    pub fitness_threshold: Option<f32>,
    /// Seed of the population's random number generator.
    pub seed: u64,
}

impl PopulationConfig {
    /// Returns a "zero-valued" default configuration.
    /// All values are 0, empty, or in the case of
    /// `NonZeroUsize`s, 1.
    ///
    /// # Note
    /// This value is not suitable for use in most experiments.
    /// It is meant as a way to abbreviate configuration
    /// instantiation, or to fill in unused values.
    ///
    /// # Examples
    /// ```
    /// use roamer::PopulationConfig;
    /// use std::num::NonZeroUsize;
    ///
    /// let config = PopulationConfig {
    ///     size: NonZeroUsize::new(20).unwrap(),
    ///     elitism: 1,
    ///     ..PopulationConfig::zero()
    /// };
    /// assert_eq!(config.max_generations, 0);
    /// ```
    pub const fn zero() -> PopulationConfig {
        PopulationConfig {
            size: NonZeroUsize::MIN,
            elitism: 0,
            selection: SelectionStrategy::Ranked { parent_count: 0 },
            max_generations: 0,
            fitness_threshold: None,
            seed: 0,
        }
    }
}

impl Default for PopulationConfig {
    fn default() -> PopulationConfig {
        PopulationConfig {
            size: NonZeroUsize::new(20).unwrap_or(NonZeroUsize::MIN),
            elitism: 1,
            selection: SelectionStrategy::default(),
            max_generations: 15,
            fitness_threshold: None,
            seed: 0,
        }
    }
}
