use crate::genomics::{GeneticConfig, Genome};
use crate::rng::Bernoulli;

use rand::seq::SliceRandom;
use rand::Rng;

use std::cmp::Ordering;

/// Ranks `genomes` by fitness and returns a population-sized list
/// of parents cycling the best `parent_count` round-robin. The fittest
/// genome is always first.
///
/// `parent_count` is clamped to `[1, genomes.len()]`. Ties keep their
/// original order.
///
/// # Examples
/// ```
/// use roamer::{select_parents, GeneticConfig, Genome};
///
/// let config = GeneticConfig { genome_length: 1, ..GeneticConfig::default() };
/// let genomes: Vec<Genome> = [0.1, 0.9, 0.5, 0.3]
///     .iter()
///     .map(|&f| {
///         let mut g = Genome::from_genes(vec![f], &config).unwrap();
///         g.set_fitness(f);
///         g
///     })
///     .collect();
///
/// let parents = select_parents(&genomes, 2);
/// let fitness: Vec<f32> = parents.iter().map(Genome::fitness).collect();
/// assert_eq!(fitness, vec![0.9, 0.5, 0.9, 0.5]);
/// ```
pub fn select_parents(genomes: &[Genome], parent_count: usize) -> Vec<Genome> {
    let mut ranked: Vec<&Genome> = genomes.iter().collect();
    ranked.sort_by(|a, b| compare_fitness(b, a));
    let parent_count = parent_count.clamp(1, ranked.len().max(1));
    ranked
        .iter()
        .take(parent_count)
        .cycle()
        .take(genomes.len())
        .map(|g| (*g).clone())
        .collect()
}

/// Total order on fitness in which NaN ranks below everything.
pub(crate) fn compare_fitness(a: &Genome, b: &Genome) -> Ordering {
    let key = |g: &Genome| {
        if g.fitness().is_nan() {
            f32::NEG_INFINITY
        } else {
            g.fitness()
        }
    };
    key(a).total_cmp(&key(b))
}

/// Auxiliary type for offspring generation.
/// Turns a list of parents into the next generation according
/// to the genetic config.
pub struct OffspringFactory<'a, R: Rng + ?Sized> {
    genetic_config: &'a GeneticConfig,
    rng: &'a mut R,
}

impl<'a, R: Rng + ?Sized> OffspringFactory<'a, R> {
    pub fn new(genetic_config: &'a GeneticConfig, rng: &'a mut R) -> OffspringFactory<'a, R> {
        OffspringFactory {
            genetic_config,
            rng,
        }
    }

    /// Produces one child per parent slot.
    ///
    /// The first `elitism` slots are copied unchanged. Every other
    /// slot starts as a copy of its parent, is crossed with a random
    /// mate from `parents` with probability `crossover_rate`, and is
    /// then mutated.
    pub fn crossover_and_mutate(&mut self, parents: Vec<Genome>, elitism: usize) -> Vec<Genome> {
        let mut offspring = Vec::with_capacity(parents.len());
        for (slot, parent) in parents.iter().enumerate() {
            if slot < elitism {
                offspring.push(parent.clone());
                continue;
            }
            let mut child = if self.rng.gen_chance(self.genetic_config.crossover_rate) {
                match parents.choose(self.rng) {
                    Some(mate) => parent.mate_with(mate, self.genetic_config, self.rng),
                    None => parent.clone(),
                }
            } else {
                parent.clone()
            };
            child.set_fitness(0.0);
            child.mutate(self.genetic_config, self.rng);
            offspring.push(child);
        }
        offspring
    }

    /// Uniform crossover of two parents followed by mutation.
    pub fn breed(&mut self, first: &Genome, second: &Genome) -> Genome {
        let mut child = first.mate_with(second, self.genetic_config, self.rng);
        child.mutate(self.genetic_config, self.rng);
        child
    }

    /// Breeds a child from two parents drawn at random from `pool`.
    pub fn breed_from(&mut self, pool: &[&Genome]) -> Option<Genome> {
        let first = *pool.choose(self.rng)?;
        let second = *pool.choose(self.rng)?;
        Some(self.breed(first, second))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::seeded;

    fn config() -> GeneticConfig {
        GeneticConfig {
            genome_length: 4,
            ..GeneticConfig::default()
        }
    }

    fn scored(fitness: &[f32]) -> Vec<Genome> {
        fitness
            .iter()
            .enumerate()
            .map(|(i, &f)| {
                let mut g = Genome::from_genes(vec![i as f32 / 10.0; 4], &config()).unwrap();
                g.set_fitness(f);
                g
            })
            .collect()
    }

    #[test]
    fn parents_cycle_top_k() {
        let genomes = scored(&[3.0, 7.0, 1.0, 5.0, 2.0, 6.0]);
        let parents = select_parents(&genomes, 3);
        let fitness: Vec<f32> = parents.iter().map(Genome::fitness).collect();
        assert_eq!(fitness, vec![7.0, 6.0, 5.0, 7.0, 6.0, 5.0]);
    }

    #[test]
    fn parent_count_is_clamped() {
        let genomes = scored(&[1.0, 2.0, 3.0]);
        let none = select_parents(&genomes, 0);
        assert!(none.iter().all(|g| g.fitness() == 3.0));
        let all = select_parents(&genomes, 10);
        let fitness: Vec<f32> = all.iter().map(Genome::fitness).collect();
        assert_eq!(fitness, vec![3.0, 2.0, 1.0]);
    }

    #[test]
    fn nan_fitness_sorts_last() {
        let genomes = scored(&[f32::NAN, 1.0, 2.0]);
        let parents = select_parents(&genomes, 1);
        assert_eq!(parents[0].fitness(), 2.0);
    }

    #[test]
    fn elite_slots_are_untouched() {
        let config = GeneticConfig {
            mutation_rate: 1.0,
            crossover_rate: 1.0,
            ..config()
        };
        let mut rng = seeded(11);
        let parents = select_parents(&scored(&[1.0, 4.0, 2.0, 3.0]), 2);
        let offspring = OffspringFactory::new(&config, &mut rng).crossover_and_mutate(parents.clone(), 1);

        assert_eq!(offspring.len(), parents.len());
        assert_eq!(offspring[0], parents[0]);
        for child in &offspring[1..] {
            assert_eq!(child.fitness(), 0.0);
            assert!(child.conforms_to(&config));
        }
    }

    #[test]
    fn no_operators_means_plain_copies() {
        let config = GeneticConfig {
            mutation_rate: 0.0,
            crossover_rate: 0.0,
            ..config()
        };
        let mut rng = seeded(12);
        let parents = select_parents(&scored(&[1.0, 4.0, 2.0]), 3);
        let offspring = OffspringFactory::new(&config, &mut rng).crossover_and_mutate(parents.clone(), 0);
        for (child, parent) in offspring.iter().zip(&parents) {
            assert_eq!(child.genes(), parent.genes());
        }
    }
}
