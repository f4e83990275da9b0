//! A Population is an ordered, fixed-size collection of genomes,
//! evolved one generation at a time from trial results or from an
//! arbitrary genome evaluation function.
mod config;
mod errors;
pub mod logging;
mod offspring_factory;
mod pareto;

pub use config::{PopulationConfig, SelectionStrategy};
pub use errors::EvolutionError;
pub use offspring_factory::{select_parents, OffspringFactory};
pub use pareto::{dominates, non_dominated, DistanceObjective};

use crate::genomics::{GeneticConfig, Genome};
use crate::rng::{seeded, SeededRng};
use crate::trials::{FitnessConfig, GenerationResults, TrialResult};
use logging::Stats;
use offspring_factory::compare_fitness;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

/// Summary of an evaluated generation.
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationReport {
    pub generation: usize,
    pub fitness: Stats,
    /// Index of the generation's best genome.
    pub best_index: usize,
    pub best_fitness: f32,
    /// Best fitness seen across all generations so far.
    pub champion_fitness: f32,
    pub goals_reached: usize,
}

/// A population of genomes.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Population {
    genomes: Vec<Genome>,
    generation: usize,
    champion: Option<Genome>,
    evaluated: bool,
    results: Option<Vec<TrialResult>>,
    population_config: PopulationConfig,
    genetic_config: GeneticConfig,
    rng: SeededRng,
}

impl Population {
    /// Creates a new population of random genomes, seeding the
    /// random number generator from the population config.
    ///
    /// # Examples
    /// ```
    /// use roamer::{GeneticConfig, Population, PopulationConfig};
    ///
    /// let genetic_config = GeneticConfig {
    ///     genome_length: 11,
    ///     ..GeneticConfig::default()
    /// };
    /// let population = Population::new(PopulationConfig::default(), genetic_config);
    ///
    /// assert_eq!(population.genomes().len(), 20);
    /// assert!(population.genomes().iter().all(|g| g.len() == 11));
    /// ```
    pub fn new(population_config: PopulationConfig, genetic_config: GeneticConfig) -> Population {
        let mut rng = seeded(population_config.seed);
        let genomes = (0..population_config.size.get())
            .map(|_| Genome::new(&genetic_config, &mut rng))
            .collect();
        Population {
            genomes,
            generation: 0,
            champion: None,
            evaluated: false,
            results: None,
            population_config,
            genetic_config,
            rng,
        }
    }

    /// Creates a new population whose first members are the passed
    /// genomes, filling the remaining space with random genomes.
    ///
    /// Returns `None` if there are more seed genomes than the
    /// configured population size, or any of them does not conform
    /// to the genetic config, as established by [`Genome::conforms_to`].
    ///
    /// [`Genome::conforms_to`]: crate::Genome::conforms_to
    ///
    /// # Examples
    /// ```
    /// use roamer::{GeneticConfig, Genome, Population, PopulationConfig};
    ///
    /// let genetic_config = GeneticConfig {
    ///     genome_length: 3,
    ///     ..GeneticConfig::default()
    /// };
    /// let seed = Genome::from_genes(vec![0.1, 0.2, 0.3], &genetic_config).unwrap();
    /// let population = Population::new_seeded(
    ///     vec![seed.clone()],
    ///     PopulationConfig::default(),
    ///     genetic_config,
    /// )
    /// .unwrap();
    ///
    /// assert_eq!(population.genomes()[0], seed);
    /// assert_eq!(population.genomes().len(), 20);
    /// ```
    pub fn new_seeded(
        seeds: Vec<Genome>,
        population_config: PopulationConfig,
        genetic_config: GeneticConfig,
    ) -> Option<Population> {
        if seeds.len() > population_config.size.get()
            || !seeds.iter().all(|g| g.conforms_to(&genetic_config))
        {
            return None;
        }
        let mut population = Population::new(population_config, genetic_config);
        for (slot, seed) in population.genomes.iter_mut().zip(seeds) {
            *slot = seed;
            slot.set_fitness(0.0);
        }
        Some(population)
    }

    pub fn genomes(&self) -> &[Genome] {
        &self.genomes
    }

    /// Best genome seen across every evaluated generation.
    pub fn champion(&self) -> Option<&Genome> {
        self.champion.as_ref()
    }

    /// Results the current generation was evaluated from, if any.
    pub fn results(&self) -> Option<&[TrialResult]> {
        self.results.as_deref()
    }

    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn population_config(&self) -> &PopulationConfig {
        &self.population_config
    }

    pub fn genetic_config(&self) -> &GeneticConfig {
        &self.genetic_config
    }

    /// Scores the current generation from a complete set of trial results.
    pub fn evaluate(
        &mut self,
        results: GenerationResults,
        fitness_config: &FitnessConfig,
    ) -> Result<GenerationReport, EvolutionError> {
        if results.len() != self.genomes.len() {
            return Err(EvolutionError::ResultCountMismatch {
                expected: self.genomes.len(),
                found: results.len(),
            });
        }
        let results = results.into_results()?;
        for (genome, result) in self.genomes.iter_mut().zip(&results) {
            genome.set_fitness(finite_or_worst(fitness_config.score(result)));
        }
        self.results = Some(results);
        self.finish_evaluation()
    }

    /// Evaluates the fitness of each genome in the
    /// population using the passed evaluator.
    ///
    /// Pareto selection cannot follow this kind of evaluation,
    /// since no trial objectives are available.
    ///
    /// # Examples
    /// ```
    /// use roamer::{GeneticConfig, Population, PopulationConfig};
    ///
    /// let genetic_config = GeneticConfig { genome_length: 4, ..GeneticConfig::default() };
    /// let mut population = Population::new(PopulationConfig::default(), genetic_config);
    ///
    /// // Genomes closer to the origin score higher.
    /// let report = population
    ///     .evaluate_fitness(|g| -g.genes().iter().map(|x| x * x).sum::<f32>())
    ///     .unwrap();
    /// assert!(report.best_fitness <= 0.0);
    /// ```
    pub fn evaluate_fitness<E>(&mut self, mut evaluator: E) -> Result<GenerationReport, EvolutionError>
    where
        E: FnMut(&Genome) -> f32,
    {
        for genome in self.genomes.iter_mut() {
            let fitness = evaluator(genome);
            genome.set_fitness(finite_or_worst(fitness));
        }
        self.results = None;
        self.finish_evaluation()
    }

    fn finish_evaluation(&mut self) -> Result<GenerationReport, EvolutionError> {
        self.evaluated = true;
        let (best_index, best) = self
            .genomes
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| compare_fitness(a, b))
            .ok_or(EvolutionError::ResultCountMismatch {
                expected: self.population_config.size.get(),
                found: 0,
            })?;

        let improved = self
            .champion
            .as_ref()
            .map_or(true, |c| best.fitness() > c.fitness());
        if improved {
            debug!(
                "new champion in generation {} with fitness {}",
                self.generation,
                best.fitness()
            );
            self.champion = Some(best.clone());
        }

        let fitness = Stats::from_values(self.genomes.iter().map(Genome::fitness)).ok_or(
            EvolutionError::ResultCountMismatch {
                expected: self.population_config.size.get(),
                found: 0,
            },
        )?;
        let report = GenerationReport {
            generation: self.generation,
            fitness,
            best_index,
            best_fitness: best.fitness(),
            champion_fitness: self.champion.as_ref().map_or(best.fitness(), Genome::fitness),
            goals_reached: self
                .results
                .as_ref()
                .map_or(0, |r| r.iter().filter(|r| r.goal_reached).count()),
        };
        info!(
            "generation {}: best {:.4}, mean {:.4}, champion {:.4}, goals {}",
            report.generation,
            report.best_fitness,
            report.fitness.mean,
            report.champion_fitness,
            report.goals_reached
        );
        Ok(report)
    }

    /// Replaces the current generation with its offspring.
    ///
    /// Ranked selection copies the first `elitism` parents unchanged and
    /// breeds the rest; Pareto selection keeps the non-dominated front
    /// and breeds the rest from it. If the front is empty the current
    /// genomes are carried over unchanged.
    pub fn evolve(&mut self) -> Result<(), EvolutionError> {
        if !self.evaluated {
            return Err(EvolutionError::Unevaluated(self.generation));
        }

        let mut next = match self.population_config.selection {
            SelectionStrategy::Ranked { parent_count } => {
                let parents = select_parents(&self.genomes, parent_count);
                OffspringFactory::new(&self.genetic_config, &mut self.rng)
                    .crossover_and_mutate(parents, self.population_config.elitism)
            }
            SelectionStrategy::Pareto { distance } => {
                let results = self
                    .results
                    .as_deref()
                    .ok_or(EvolutionError::MissingObjectives(self.generation))?;
                match pareto::next_generation(
                    &self.genomes,
                    results,
                    distance,
                    &self.genetic_config,
                    &mut self.rng,
                ) {
                    Some(next) => next,
                    None => {
                        warn!(
                            "no non-dominated genomes in generation {}, keeping population",
                            self.generation
                        );
                        self.genomes.clone()
                    }
                }
            }
        };
        for genome in next.iter_mut() {
            genome.set_fitness(0.0);
        }

        self.genomes = next;
        self.generation += 1;
        self.evaluated = false;
        self.results = None;
        Ok(())
    }

    /// Whether the generation budget is spent or the
    /// champion has reached the configured fitness threshold.
    pub fn is_finished(&self) -> bool {
        let threshold_reached = match (self.population_config.fitness_threshold, &self.champion) {
            (Some(threshold), Some(champion)) => champion.fitness() >= threshold,
            _ => false,
        };
        self.generation >= self.population_config.max_generations || threshold_reached
    }

    /// Returns the population to its initial state with freshly
    /// generated genomes. The random number generator is not reseeded.
    pub fn reset(&mut self) {
        let genetic_config = &self.genetic_config;
        let rng = &mut self.rng;
        self.genomes = (0..self.population_config.size.get())
            .map(|_| Genome::new(genetic_config, rng))
            .collect();
        self.generation = 0;
        self.champion = None;
        self.evaluated = false;
        self.results = None;
    }
}

fn finite_or_worst(fitness: f32) -> f32 {
    if fitness.is_finite() {
        fitness
    } else {
        f32::MIN
    }
}
