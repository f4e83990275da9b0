use crate::agent::AgentConfig;
use crate::errors::ConfigError;
use crate::trial::TrialConfig;
use crate::world::{BodyConfig, LidarConfig, SpawnConfig, WorldConfig};

use roamer::tables::Delimiter;
use roamer::{FitnessConfig, GeneticConfig, PopulationConfig};
use roamer_nn::{ActivationScheme, Architecture, NetworkError};
use serde::{Deserialize, Serialize};

use std::fs;
use std::path::Path;

/// Everything an evolution run or a replay needs, loadable from RON.
///
/// Every field is optional in the file; missing fields take their
/// defaults.
///
/// # Examples
/// ```
/// use roamer_trials::config::ExperimentConfig;
///
/// let config = ExperimentConfig::from_ron("(seed: 7, hidden_layers: [8])").unwrap();
/// assert_eq!(config.seed, 7);
/// assert_eq!(config.architecture().unwrap().layer_sizes(), &[16, 8, 2]);
/// assert_eq!(config.checkpoint_interval, 50);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    /// Seeds the population, the scenarios and every trial.
    pub seed: u64,
    pub population: PopulationConfig,
    /// The genome length is always taken from the architecture.
    pub genetic: GeneticConfig,
    pub fitness: FitnessConfig,
    /// Sizes of the layers between the features and the two outputs.
    pub hidden_layers: Vec<usize>,
    pub activation: ActivationScheme,
    pub agent: AgentConfig,
    pub trial: TrialConfig,
    pub world: WorldConfig,
    pub body: BodyConfig,
    pub lidar: LidarConfig,
    pub spawn: SpawnConfig,
    /// Generations between best-of-generation weight checkpoints;
    /// zero disables them.
    pub checkpoint_interval: usize,
    pub delimiter: Delimiter,
}

impl Default for ExperimentConfig {
    fn default() -> ExperimentConfig {
        ExperimentConfig {
            seed: 0,
            population: PopulationConfig::default(),
            genetic: GeneticConfig::default(),
            fitness: FitnessConfig::default(),
            hidden_layers: vec![16, 8],
            activation: ActivationScheme::default(),
            agent: AgentConfig::default(),
            trial: TrialConfig::default(),
            world: WorldConfig::default(),
            body: BodyConfig::default(),
            lidar: LidarConfig::default(),
            spawn: SpawnConfig::default(),
            checkpoint_interval: 50,
            delimiter: Delimiter::default(),
        }
    }
}

impl ExperimentConfig {
    pub fn from_ron(source: &str) -> Result<ExperimentConfig, ConfigError> {
        let config: ExperimentConfig =
            ron::de::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<ExperimentConfig, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        ExperimentConfig::from_ron(&source)
    }

    pub fn to_ron(&self) -> Result<String, ConfigError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::new())
            .map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Checks the settings that would otherwise stall or skew trials.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = |value: f32| value.is_finite() && value > 0.0;
        if !positive(self.trial.dt) {
            return Err(ConfigError::Invalid(format!(
                "tick length must be positive, found {}",
                self.trial.dt
            )));
        }
        if !positive(self.trial.max_time) {
            return Err(ConfigError::Invalid(format!(
                "trial time limit must be positive, found {}",
                self.trial.max_time
            )));
        }
        if !positive(self.world.half_extent) {
            return Err(ConfigError::Invalid(format!(
                "arena half extent must be positive, found {}",
                self.world.half_extent
            )));
        }
        if self.agent.features.ray_count != self.lidar.ray_count {
            return Err(ConfigError::Invalid(format!(
                "features expect {} lidar rays, the lidar casts {}",
                self.agent.features.ray_count, self.lidar.ray_count
            )));
        }
        if self.spawn.max_attempts == 0 {
            return Err(ConfigError::Invalid("spawn sampling needs at least one attempt".into()));
        }
        Ok(())
    }

    /// Feature vector in, hidden layers, forward and turn out.
    pub fn architecture(&self) -> Result<Architecture, NetworkError> {
        let mut layers = Vec::with_capacity(self.hidden_layers.len() + 2);
        layers.push(self.agent.features.feature_count());
        layers.extend(&self.hidden_layers);
        layers.push(2);
        Architecture::new(layers, self.activation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roamer::SelectionStrategy;

    #[test]
    fn ron_roundtrip() {
        let config = ExperimentConfig {
            seed: 99,
            hidden_layers: vec![4],
            ..ExperimentConfig::default()
        };
        let text = config.to_ron().unwrap();
        assert_eq!(ExperimentConfig::from_ron(&text).unwrap(), config);
    }

    #[test]
    fn nested_sections_override_defaults() {
        let config = ExperimentConfig::from_ron(
            "(population: (selection: Pareto(distance: MinimizeRemaining), max_generations: 3), \
             trial: (max_time: 4.0), delimiter: Comma)",
        )
        .unwrap();
        assert_eq!(config.population.max_generations, 3);
        assert!(matches!(config.population.selection, SelectionStrategy::Pareto { .. }));
        assert_eq!(config.population.size.get(), 20);
        assert_eq!(config.trial.max_time, 4.0);
        assert_eq!(config.trial.dt, 0.02);
        assert_eq!(config.delimiter, Delimiter::Comma);
    }

    #[test]
    fn shipped_config_parses() {
        let config = ExperimentConfig::from_ron(include_str!("../configs/default.ron")).unwrap();
        assert_eq!(config.seed, 2024);
        assert_eq!(config.population.max_generations, 300);
        assert_eq!(config.world, WorldConfig::default());
        assert_eq!(config.agent, AgentConfig::default());
        assert_eq!(
            config.architecture().unwrap(),
            ExperimentConfig::default().architecture().unwrap()
        );
    }

    #[test]
    fn missing_files_are_reported() {
        assert!(matches!(
            ExperimentConfig::load("no/such/config.ron"),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn malformed_files_are_reported() {
        assert!(matches!(
            ExperimentConfig::from_ron("(seed: \"seven\")"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn mismatched_ray_counts_are_invalid() {
        let config = ExperimentConfig {
            lidar: LidarConfig {
                ray_count: 8,
                ..LidarConfig::default()
            },
            ..ExperimentConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn stalling_trials_are_invalid() {
        let config = ExperimentConfig {
            trial: TrialConfig {
                dt: 0.0,
                ..TrialConfig::default()
            },
            ..ExperimentConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn default_architecture_matches_the_feature_vector() {
        let architecture = ExperimentConfig::default().architecture().unwrap();
        assert_eq!(architecture.layer_sizes(), &[16, 16, 8, 2]);
        assert_eq!(architecture.parameter_count(), 16 * 16 + 16 + 16 * 8 + 8 + 8 * 2 + 2);
    }
}
