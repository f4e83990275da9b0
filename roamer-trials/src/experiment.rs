//! Generation-by-generation evolution of navigation controllers.
//!
//! Every generation shares one sampled [`Scenario`]. Each genome drives
//! its own agent and body in parallel; the results are gathered in a
//! [`GenerationResults`] barrier before the population is evaluated and
//! evolved.
use crate::agent::Agent;
use crate::config::ExperimentConfig;
use crate::controller::FeedforwardController;
use crate::errors::ExperimentError;
use crate::trial::Trial;
use crate::world::{Scenario, SimulatedBody, World};

use log::{debug, info};
use rayon::prelude::*;
use roamer::logging::{EvolutionLogger, ReportingLevel};
use roamer::rng::{derive_seed, seeded};
use roamer::tables::FitnessLog;
use roamer::{GenerationResults, GeneticConfig, Genome, Population, PopulationConfig, TrialResult};
use roamer_nn::weights::save_genome;
use roamer_nn::Architecture;

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

pub const FITNESS_LOG: &str = "fitness_log.csv";
pub const FINAL_WEIGHTS: &str = "best_weights_final_generation.csv";
pub const CHAMPION_WEIGHTS: &str = "best_weights.csv";
pub const POPULATION_SNAPSHOT: &str = "population.ron";

const SCENARIO_STREAM: u64 = 0;
const TRIAL_STREAM: u64 = 1;
const REPLAY_STREAM: u64 = 2;

pub fn checkpoint_name(generation: usize) -> String {
    format!("best_weights_gen_{}.csv", generation)
}

/// What an evolution run produced.
#[derive(Clone, Debug)]
pub struct EvolutionSummary {
    pub generations: usize,
    pub champion: Option<Genome>,
    pub logger: EvolutionLogger,
}

#[derive(Clone, Debug)]
pub struct Experiment {
    config: ExperimentConfig,
    world: World,
    architecture: Architecture,
    genetic_config: GeneticConfig,
}

impl Experiment {
    pub fn new(config: ExperimentConfig) -> Result<Experiment, ExperimentError> {
        config.validate()?;
        let architecture = config.architecture()?;
        let genetic_config = architecture.genetic_config(&config.genetic);
        info!(
            "controller layers {:?}, {} parameters",
            architecture.layer_sizes(),
            genetic_config.genome_length
        );
        Ok(Experiment {
            world: World::new(config.world.clone()),
            config,
            architecture,
            genetic_config,
        })
    }

    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn architecture(&self) -> &Architecture {
        &self.architecture
    }

    pub fn genetic_config(&self) -> &GeneticConfig {
        &self.genetic_config
    }

    /// A fresh population seeded from the experiment seed.
    pub fn population(&self) -> Population {
        Population::new(self.population_config(), self.genetic_config.clone())
    }

    /// A fresh population whose first members are `seeds`.
    pub fn population_seeded(&self, seeds: Vec<Genome>) -> Option<Population> {
        Population::new_seeded(seeds, self.population_config(), self.genetic_config.clone())
    }

    fn population_config(&self) -> PopulationConfig {
        PopulationConfig {
            seed: self.config.seed,
            ..self.config.population.clone()
        }
    }

    /// Samples the scenario of a numbered random stream.
    fn scenario(&self, stream: u64, index: u64) -> Result<Scenario, ExperimentError> {
        let mut rng = seeded(derive_seed(derive_seed(self.config.seed, stream), index));
        self.world
            .sample_scenario(&self.config.spawn, &mut rng)
            .ok_or(ExperimentError::NoScenario(self.config.spawn.max_attempts))
    }

    /// Runs one genome through one scenario to completion.
    pub fn run_trial(
        &self,
        agent_id: usize,
        genome: &Genome,
        scenario: &Scenario,
        seed: u64,
    ) -> Result<TrialResult, ExperimentError> {
        let controller = FeedforwardController::from_genome(&self.architecture, genome)?;
        let agent = Agent::new(
            agent_id,
            scenario.start,
            scenario.goal,
            controller,
            &self.config.agent,
            self.config.body.limits,
        )
        .map_err(|source| ExperimentError::Agent { agent_id, source })?;
        let body = SimulatedBody::new(
            &self.world,
            scenario.start,
            self.config.body,
            self.config.lidar,
            seed,
        );
        Trial::new(agent, body, self.config.trial)
            .run()
            .map_err(|source| ExperimentError::Agent { agent_id, source })
    }

    /// Runs every genome of the current generation in parallel and
    /// collects exactly one result per genome.
    pub fn run_generation(&self, population: &Population) -> Result<GenerationResults, ExperimentError> {
        let generation = population.generation() as u64;
        let scenario = self.scenario(SCENARIO_STREAM, generation)?;
        debug!(
            "generation {}: start ({:.2}, {:.2}), goal ({:.2}, {:.2})",
            generation, scenario.start.x, scenario.start.y, scenario.goal.x, scenario.goal.y
        );
        let trial_seed = derive_seed(derive_seed(self.config.seed, TRIAL_STREAM), generation);

        let outcomes: Vec<Result<TrialResult, ExperimentError>> = population
            .genomes()
            .par_iter()
            .enumerate()
            .map(|(agent_id, genome)| {
                self.run_trial(agent_id, genome, &scenario, derive_seed(trial_seed, agent_id as u64))
            })
            .collect();

        let mut results = GenerationResults::new(population.genomes().len());
        for outcome in outcomes {
            results.submit(outcome?)?;
        }
        Ok(results)
    }

    /// Evolves a fresh population until it is finished, writing the
    /// fitness log, periodic and final weight tables and a population
    /// snapshot into `output`.
    pub fn evolve(&self, output: &Path) -> Result<EvolutionSummary, ExperimentError> {
        let population = self.population();
        self.evolve_population(population, output)
    }

    pub fn evolve_population(
        &self,
        mut population: Population,
        output: &Path,
    ) -> Result<EvolutionSummary, ExperimentError> {
        fs::create_dir_all(output)?;
        let delimiter = self.config.delimiter;
        let log_file = BufWriter::new(File::create(output.join(FITNESS_LOG))?);
        let mut fitness_log = FitnessLog::new(log_file, delimiter)?;
        let mut logger = EvolutionLogger::new(ReportingLevel::PopulationChampion);
        let mut last_best = None;

        while !population.is_finished() {
            let results = self.run_generation(&population)?;
            let report = population.evaluate(results, &self.config.fitness)?;
            fitness_log.append(report.generation, population.genomes().iter().map(Genome::fitness))?;
            logger.log(
                &population,
                &|genome, result| {
                    [
                        genome.fitness(),
                        result.map_or(0.0, |r| r.distance_traveled),
                        result.map_or(0.0, |r| r.collisions as f32),
                    ]
                },
                ["fitness", "distance", "collisions"],
            );
            if let Some(log) = logger.last() {
                debug!("{}", log);
            }

            let best = population.genomes()[report.best_index].clone();
            let interval = self.config.checkpoint_interval;
            if interval > 0 && report.generation % interval == 0 {
                let path = output.join(checkpoint_name(report.generation));
                save_genome(&path, &best, delimiter)?;
                info!("checkpointed generation {} to {}", report.generation, path.display());
            }
            last_best = Some(best);
            population.evolve()?;
        }

        if let Some(best) = &last_best {
            save_genome(output.join(FINAL_WEIGHTS), best, delimiter)?;
        }
        if let Some(champion) = population.champion() {
            save_genome(output.join(CHAMPION_WEIGHTS), champion, delimiter)?;
            info!(
                "finished after {} generations, champion fitness {:.4}",
                population.generation(),
                champion.fitness()
            );
        }
        let snapshot = ron::ser::to_string(&population).map_err(|e| ExperimentError::Snapshot(e.to_string()))?;
        fs::write(output.join(POPULATION_SNAPSHOT), snapshot)?;

        Ok(EvolutionSummary {
            generations: population.generation(),
            champion: population.champion().cloned(),
            logger,
        })
    }

    /// Drives `genome` through `trials` independently sampled scenarios.
    pub fn replay(&self, genome: &Genome, trials: usize) -> Result<Vec<TrialResult>, ExperimentError> {
        let seed = derive_seed(self.config.seed, REPLAY_STREAM);
        (0..trials)
            .into_par_iter()
            .map(|trial| {
                let scenario = self.scenario(REPLAY_STREAM, trial as u64)?;
                self.run_trial(trial, genome, &scenario, derive_seed(seed, trial as u64))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ConfigError;
    use crate::trial::TrialConfig;
    use roamer::tables::Delimiter;
    use roamer_nn::weights::load_genome;
    use std::io::{BufRead, BufReader};
    use std::num::NonZeroUsize;

    fn config() -> ExperimentConfig {
        ExperimentConfig {
            seed: 11,
            population: PopulationConfig {
                size: NonZeroUsize::new(4).unwrap(),
                max_generations: 3,
                ..PopulationConfig::default()
            },
            hidden_layers: vec![4],
            trial: TrialConfig {
                max_time: 1.0,
                dt: 0.05,
                ..TrialConfig::default()
            },
            checkpoint_interval: 2,
            delimiter: Delimiter::Semicolon,
            ..ExperimentConfig::default()
        }
    }

    #[test]
    fn invalid_configs_are_refused() {
        let mut config = config();
        config.lidar.ray_count = 3;
        assert!(matches!(
            Experiment::new(config),
            Err(ExperimentError::Config(ConfigError::Invalid(_)))
        ));
    }

    #[test]
    fn generations_collect_one_result_per_genome() {
        let experiment = Experiment::new(config()).unwrap();
        let population = experiment.population();
        let results = experiment.run_generation(&population).unwrap();
        assert!(results.is_complete());
        let results = results.into_results().unwrap();
        assert_eq!(
            results.iter().map(|r| r.agent_id).collect::<Vec<_>>(),
            vec![0, 1, 2, 3]
        );
        assert!(results.iter().all(|r| r.time_elapsed <= 1.0 + 1e-4));
    }

    #[test]
    fn generations_are_reproducible() {
        let experiment = Experiment::new(config()).unwrap();
        let population = experiment.population();
        let a = experiment.run_generation(&population).unwrap().into_results().unwrap();
        let b = experiment.run_generation(&population).unwrap().into_results().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn evolution_writes_logs_and_weights() {
        let dir = tempfile::tempdir().unwrap();
        let experiment = Experiment::new(config()).unwrap();
        let summary = experiment.evolve(dir.path()).unwrap();
        assert_eq!(summary.generations, 3);
        assert_eq!(summary.logger.iter().count(), 3);

        let log = BufReader::new(File::open(dir.path().join(FITNESS_LOG)).unwrap());
        let lines: Vec<String> = log.lines().map(|l| l.unwrap()).collect();
        assert_eq!(lines[0], "Generation;Fitness");
        assert_eq!(lines.len(), 1 + 3 * 4);
        assert!(lines[1].starts_with("0;"));
        assert!(lines[12].starts_with("2;"));

        for name in [checkpoint_name(0), checkpoint_name(2), FINAL_WEIGHTS.to_string()] {
            let genome = load_genome(dir.path().join(&name), experiment.genetic_config(), Delimiter::Semicolon)
                .unwrap();
            assert_eq!(genome.len(), experiment.architecture().parameter_count());
        }
        assert!(!dir.path().join(checkpoint_name(1)).exists());

        let champion = load_genome(
            dir.path().join(CHAMPION_WEIGHTS),
            experiment.genetic_config(),
            Delimiter::Semicolon,
        )
        .unwrap();
        assert_eq!(Some(champion.genes()), summary.champion.as_ref().map(Genome::genes));

        let snapshot = fs::read_to_string(dir.path().join(POPULATION_SNAPSHOT)).unwrap();
        let restored: Population = ron::de::from_str(&snapshot).unwrap();
        assert_eq!(restored.generation(), 3);
    }

    #[test]
    fn replay_runs_independent_scenarios() {
        let experiment = Experiment::new(config()).unwrap();
        let genome = experiment.population().genomes()[0].clone();
        let results = experiment.replay(&genome, 3).unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(
            results.iter().map(|r| r.agent_id).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
    }
}
