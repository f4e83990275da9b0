//! Fixed-length real-valued genomes.
//!
//! A genome is the flat parameter vector of a controller, plus the
//! fitness it scored the last time it was evaluated. Every genome in a
//! population has the same length.
mod config;
mod errors;

pub use config::GeneticConfig;
pub use errors::GenomeError;

use crate::rng::Bernoulli;

use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Genome {
    genes: Vec<f32>,
    fitness: f32,
}

impl Genome {
    /// Generates a genome with every gene drawn
    /// uniformly from the configured range.
    ///
    /// # Examples
    /// ```
    /// use roamer::{rng, GeneticConfig, Genome};
    ///
    /// let config = GeneticConfig {
    ///     genome_length: 11,
    ///     ..GeneticConfig::default()
    /// };
    /// let genome = Genome::new(&config, &mut rng::seeded(3));
    ///
    /// assert_eq!(genome.len(), 11);
    /// assert!(genome.genes().iter().all(|g| (-1.0..=1.0).contains(g)));
    /// ```
    pub fn new<R: Rng + ?Sized>(config: &GeneticConfig, rng: &mut R) -> Genome {
        Genome {
            genes: (0..config.genome_length)
                .map(|_| sample_gene(config, rng))
                .collect(),
            fitness: 0.0,
        }
    }

    /// Wraps an existing gene vector, such as one loaded from disk.
    ///
    /// Fails if the length differs from the configured genome
    /// length or a gene is not finite. Out-of-range genes are accepted
    /// as they are.
    pub fn from_genes(genes: Vec<f32>, config: &GeneticConfig) -> Result<Genome, GenomeError> {
        if genes.len() != config.genome_length {
            return Err(GenomeError::LengthMismatch {
                expected: config.genome_length,
                found: genes.len(),
            });
        }
        if let Some((index, &value)) = genes.iter().enumerate().find(|(_, g)| !g.is_finite()) {
            return Err(GenomeError::NonFiniteGene { index, value });
        }
        Ok(Genome {
            genes,
            fitness: 0.0,
        })
    }

    pub fn genes(&self) -> &[f32] {
        &self.genes
    }

    pub fn into_genes(self) -> Vec<f32> {
        self.genes
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    pub fn fitness(&self) -> f32 {
        self.fitness
    }

    pub fn set_fitness(&mut self, fitness: f32) {
        self.fitness = fitness;
    }

    /// Checks whether the genome could have been produced
    /// under `config`: right length, every gene finite and in range.
    pub fn conforms_to(&self, config: &GeneticConfig) -> bool {
        self.genes.len() == config.genome_length
            && self.genes.iter().all(|&g| g.is_finite() && config.in_range(g))
    }

    /// Uniform crossover: each gene is taken from `other` with
    /// probability `gene_swap_chance`, and from `self` otherwise.
    /// The child starts with zero fitness.
    pub fn mate_with<R: Rng + ?Sized>(
        &self,
        other: &Genome,
        config: &GeneticConfig,
        rng: &mut R,
    ) -> Genome {
        Genome {
            genes: self
                .genes
                .iter()
                .zip(&other.genes)
                .map(|(&mine, &theirs)| {
                    if rng.gen_chance(config.gene_swap_chance) {
                        theirs
                    } else {
                        mine
                    }
                })
                .collect(),
            fitness: 0.0,
        }
    }

    /// Perturbs each gene with probability `mutation_rate` by a uniform
    /// offset in `[-mutation_power, mutation_power]`, then clamps it
    /// back into the gene range.
    pub fn mutate<R: Rng + ?Sized>(&mut self, config: &GeneticConfig, rng: &mut R) {
        let power = config.mutation_power.abs();
        for gene in self.genes.iter_mut() {
            if rng.gen_chance(config.mutation_rate) {
                let offset = if power > 0.0 {
                    rng.gen_range(-power..=power)
                } else {
                    0.0
                };
                *gene = config.bound(*gene + offset);
            }
        }
    }
}

fn sample_gene<R: Rng + ?Sized>(config: &GeneticConfig, rng: &mut R) -> f32 {
    if config.gene_min < config.gene_max {
        rng.gen_range(config.gene_min..=config.gene_max)
    } else {
        config.gene_min
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::seeded;

    fn config() -> GeneticConfig {
        GeneticConfig {
            genome_length: 32,
            ..GeneticConfig::default()
        }
    }

    #[test]
    fn new_genomes_conform() {
        let mut rng = seeded(1);
        for _ in 0..20 {
            let genome = Genome::new(&config(), &mut rng);
            assert!(genome.conforms_to(&config()));
            assert_eq!(genome.fitness(), 0.0);
        }
    }

    #[test]
    fn from_genes_checks_length_and_finiteness() {
        let config = GeneticConfig {
            genome_length: 3,
            ..GeneticConfig::default()
        };
        assert_eq!(
            Genome::from_genes(vec![0.0; 2], &config),
            Err(GenomeError::LengthMismatch {
                expected: 3,
                found: 2
            })
        );
        assert!(matches!(
            Genome::from_genes(vec![0.0, f32::INFINITY, 0.0], &config),
            Err(GenomeError::NonFiniteGene { index: 1, .. })
        ));
        assert!(Genome::from_genes(vec![0.1, 0.2, 0.3], &config).is_ok());
    }

    #[test]
    fn mating_only_mixes_parent_genes() {
        let config = config();
        let mut rng = seeded(2);
        let a = Genome::from_genes(vec![0.25; 32], &config).unwrap();
        let b = Genome::from_genes(vec![-0.75; 32], &config).unwrap();
        let child = a.mate_with(&b, &config, &mut rng);
        assert!(child.genes().iter().all(|&g| g == 0.25 || g == -0.75));
        assert!(child.genes().contains(&0.25));
        assert!(child.genes().contains(&-0.75));
    }

    #[test]
    fn swap_chance_extremes() {
        let config = GeneticConfig {
            gene_swap_chance: 1.0,
            ..config()
        };
        let mut rng = seeded(3);
        let a = Genome::from_genes(vec![0.5; 32], &config).unwrap();
        let b = Genome::from_genes(vec![-0.5; 32], &config).unwrap();
        assert_eq!(a.mate_with(&b, &config, &mut rng).genes(), b.genes());
    }

    #[test]
    fn mutation_is_bounded_and_clamped() {
        let config = GeneticConfig {
            mutation_rate: 1.0,
            mutation_power: 0.1,
            ..config()
        };
        let mut rng = seeded(4);
        let mut genome = Genome::from_genes(vec![0.98; 32], &config).unwrap();
        let before = genome.clone();
        genome.mutate(&config, &mut rng);
        for (old, new) in before.genes().iter().zip(genome.genes()) {
            assert!((new - old).abs() <= 0.1 + 1e-6);
            assert!(*new <= 1.0);
        }
        assert_ne!(before, genome);
    }

    #[test]
    fn zero_mutation_rate_is_identity() {
        let config = config();
        let mut rng = seeded(5);
        let mut genome = Genome::new(&GeneticConfig {
            mutation_rate: 0.0,
            ..config.clone()
        }, &mut rng);
        let before = genome.clone();
        genome.mutate(&GeneticConfig { mutation_rate: 0.0, ..config }, &mut rng);
        assert_eq!(before, genome);
    }

    #[test]
    fn serde_roundtrip() {
        let genome = Genome::new(&config(), &mut seeded(6));
        let json = serde_json::to_string(&genome).unwrap();
        assert_eq!(serde_json::from_str::<Genome>(&json).unwrap(), genome);
    }
}
