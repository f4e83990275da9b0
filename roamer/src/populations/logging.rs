use super::Population;

use crate::genomics::Genome;
use crate::trials::TrialResult;

use std::fmt;

/// How many genomes each [`Log`] keeps.
#[derive(Clone, Copy, Debug)]
pub enum ReportingLevel {
    /// Every genome of the generation.
    AllGenomes,
    /// The best genome seen so far.
    PopulationChampion,
    /// Statistics only.
    NoGenomes,
}

/// Statistics of one evaluated generation.
#[derive(Clone, Debug)]
pub struct Log {
    pub generation_number: usize,
    pub generation_sample: GenerationMemberRecord,
    pub goals_reached: usize,
    pub genome_stats: Vec<(String, Stats)>,
}

impl fmt::Display for Log {
    /// One line per log: the generation, its goal count,
    /// then each named statistic.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "generation {}: {} goals reached",
            self.generation_number, self.goals_reached
        )?;
        for (name, stats) in &self.genome_stats {
            write!(
                f,
                "; {} max {:.4} min {:.4} mean {:.4} median {:.4}",
                name, stats.maximum, stats.minimum, stats.mean, stats.median
            )?;
        }
        Ok(())
    }
}

/// Summary statistics of a sample.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stats {
    pub maximum: f32,
    pub minimum: f32,
    pub mean: f32,
    pub median: f32,
}

impl Stats {
    /// Returns statistics about the numbers in a sequence,
    /// or `None` if it is empty.
    ///
    /// # Examples
    /// ```
    /// use roamer::logging::Stats;
    ///
    /// let stats = Stats::from_values([-2.0, -1.0, 0.5, 1.0, 1.5]).unwrap();
    /// assert_eq!(stats.maximum, 1.5);
    /// assert_eq!(stats.minimum, -2.0);
    /// assert_eq!(stats.mean, 0.0);
    /// assert_eq!(stats.median, 0.5);
    ///
    /// assert!(Stats::from_values(std::iter::empty()).is_none());
    /// ```
    pub fn from_values(data: impl IntoIterator<Item = f32>) -> Option<Stats> {
        let mut data: Vec<f32> = data.into_iter().collect();
        if data.is_empty() {
            return None;
        }
        data.sort_by(f32::total_cmp);
        let mid = data.len() / 2;
        let median = if data.len() % 2 == 0 {
            (data[mid - 1] + data[mid]) / 2.0
        } else {
            data[mid]
        };
        Some(Stats {
            maximum: data[data.len() - 1],
            minimum: data[0],
            mean: data.iter().sum::<f32>() / data.len() as f32,
            median,
        })
    }
}

/// The genomes a [`Log`] keeps, as chosen by its [`ReportingLevel`].
#[derive(Clone, Debug)]
pub enum GenerationMemberRecord {
    /// Every genome, in population order.
    Genomes(Vec<Genome>),
    /// Only the best genome seen so far.
    PopulationChampion(Genome),
    /// Empty.
    None,
}

/// Per-generation logs of a population's evolution.
#[derive(Clone, Debug)]
pub struct EvolutionLogger {
    reporting_level: ReportingLevel,
    logs: Vec<Log>,
}

impl EvolutionLogger {
    pub fn new(reporting_level: ReportingLevel) -> EvolutionLogger {
        EvolutionLogger {
            reporting_level,
            logs: vec![],
        }
    }

    /// Store a snapshot of an evaluated population.
    ///
    /// The `genome_stat_extractor` provides a way of
    /// obtaining arbitrary statistics on the population,
    /// where each statistic is named by `stat_names`. It receives
    /// each genome with its trial result, when there is one.
    ///
    /// # Examples
    /// ```
    /// use roamer::{GeneticConfig, Population, PopulationConfig};
    /// use roamer::logging::{EvolutionLogger, ReportingLevel};
    ///
    /// let genetic_config = GeneticConfig { genome_length: 2, ..GeneticConfig::default() };
    /// let mut population = Population::new(PopulationConfig::default(), genetic_config);
    /// population.evaluate_fitness(|g| g.genes()[0]);
    ///
    /// let mut logger = EvolutionLogger::new(ReportingLevel::NoGenomes);
    /// logger.log(&population, &|g, _| [g.fitness()], ["fitness"]);
    /// assert_eq!(logger.iter().count(), 1);
    /// ```
    pub fn log<GSE, const N: usize>(
        &mut self,
        population: &Population,
        genome_stat_extractor: &GSE,
        stat_names: [&str; N],
    ) where
        GSE: Fn(&Genome, Option<&TrialResult>) -> [f32; N],
    {
        let results = population.results();
        let rows: Vec<[f32; N]> = population
            .genomes()
            .iter()
            .enumerate()
            .map(|(i, g)| genome_stat_extractor(g, results.and_then(|r| r.get(i))))
            .collect();
        let genome_stats = stat_names
            .iter()
            .map(|name| name.to_string())
            .zip(columns(&rows))
            .filter_map(|(name, data)| Stats::from_values(data).map(|stats| (name, stats)))
            .collect();

        self.logs.push(Log {
            generation_number: population.generation(),
            generation_sample: match self.reporting_level {
                ReportingLevel::AllGenomes => {
                    GenerationMemberRecord::Genomes(population.genomes().to_vec())
                }
                ReportingLevel::PopulationChampion => match population.champion() {
                    Some(champion) => GenerationMemberRecord::PopulationChampion(champion.clone()),
                    None => GenerationMemberRecord::None,
                },
                ReportingLevel::NoGenomes => GenerationMemberRecord::None,
            },
            goals_reached: results
                .map(|r| r.iter().filter(|r| r.goal_reached).count())
                .unwrap_or(0),
            genome_stats,
        })
    }

    /// Logs in generation order.
    pub fn iter(&self) -> impl Iterator<Item = &Log> {
        self.logs.iter()
    }

    pub fn last(&self) -> Option<&Log> {
        self.logs.last()
    }
}

fn columns<const N: usize>(rows: &[[f32; N]]) -> Vec<Vec<f32>> {
    (0..N)
        .map(|column| rows.iter().map(|row| row[column]).collect())
        .collect()
}
