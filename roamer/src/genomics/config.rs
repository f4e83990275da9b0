use serde::{Deserialize, Serialize};

/// Configuration data for genome generation
/// and genetic operators.
///
/// # Note
/// All quantities expressing probabilities
/// should be in the range [0.0, 1.0].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneticConfig {
    /// Number of genes in every genome.
    pub genome_length: usize,
    /// Smallest value a gene may take.
    pub gene_min: f32,
    /// Largest value a gene may take.
    pub gene_max: f32,
    /// Per-gene chance of a mutation in each child.
    pub mutation_rate: f32,
    /// Magnitude bound of the uniform mutation perturbation.
    pub mutation_power: f32,
    /// Chance that a child is the product of crossover
    /// with a second parent instead of a plain copy.
    pub crossover_rate: f32,
    /// Per-gene chance of taking the second parent's gene
    /// during crossover.
    pub gene_swap_chance: f32,
}

impl GeneticConfig {
    /// Returns a "zero-valued" default configuration.
    ///
    /// # Note
    /// This value is not suitable for use in most experiments.
    /// It is meant as a way to abbreviate configuration
    /// instantiation, or to fill in unused values.
    ///
    /// # Examples
    /// ```
    /// use roamer::GeneticConfig;
    ///
    /// let config = GeneticConfig {
    ///     genome_length: 11,
    ///     gene_min: -1.0,
    ///     gene_max: 1.0,
    ///     ..GeneticConfig::zero()
    /// };
    /// assert_eq!(config.mutation_rate, 0.0);
    /// ```
    pub const fn zero() -> GeneticConfig {
        GeneticConfig {
            genome_length: 0,
            gene_min: 0.0,
            gene_max: 0.0,
            mutation_rate: 0.0,
            mutation_power: 0.0,
            crossover_rate: 0.0,
            gene_swap_chance: 0.0,
        }
    }

    /// Clamps a gene value to the configured range.
    /// Inverted ranges leave the value untouched.
    pub fn bound(&self, gene: f32) -> f32 {
        if self.gene_min <= self.gene_max {
            gene.clamp(self.gene_min, self.gene_max)
        } else {
            gene
        }
    }

    pub fn in_range(&self, gene: f32) -> bool {
        gene >= self.gene_min && gene <= self.gene_max
    }
}

impl Default for GeneticConfig {
    fn default() -> GeneticConfig {
        GeneticConfig {
            genome_length: 0,
            gene_min: -1.0,
            gene_max: 1.0,
            mutation_rate: 0.01,
            mutation_power: 0.1,
            crossover_rate: 0.7,
            gene_swap_chance: 0.5,
        }
    }
}
