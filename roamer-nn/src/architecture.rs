use crate::errors::NetworkError;

use roamer::GeneticConfig;
use serde::{Deserialize, Serialize};

/// Activation function of a layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivationType {
    // tanh(x)
    Tanh,
    // 1 / (1 + exp(-x))
    Sigmoid,
}

impl ActivationType {
    pub fn apply(self, x: f32) -> f32 {
        match self {
            ActivationType::Tanh => x.tanh(),
            ActivationType::Sigmoid => {
                if x >= 0.0 {
                    1.0 / (1.0 + (-x).exp())
                } else {
                    let e = x.exp();
                    e / (1.0 + e)
                }
            }
        }
    }
}

/// Assignment of activation functions to layers.
/// The output layer is always `tanh`, so outputs lie in [-1, 1].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivationScheme {
    /// `tanh` on every layer.
    #[default]
    Tanh,
    /// Logistic hidden layers, `tanh` output layer.
    SigmoidHidden,
}

impl ActivationScheme {
    pub fn hidden(self) -> ActivationType {
        match self {
            ActivationScheme::Tanh => ActivationType::Tanh,
            ActivationScheme::SigmoidHidden => ActivationType::Sigmoid,
        }
    }

    pub fn output(self) -> ActivationType {
        ActivationType::Tanh
    }
}

/// Layer sizes `[L0, L1, .., Ln]` and activation scheme of a network.
///
/// Parameters are laid out layer by layer: for each layer `l`, an
/// `L[l+1]×L[l]` row-major weight block followed by `L[l+1]` biases.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Architecture {
    layer_sizes: Vec<usize>,
    #[serde(default)]
    activation: ActivationScheme,
}

impl Architecture {
    /// # Examples
    /// ```
    /// use roamer_nn::{ActivationScheme, Architecture};
    ///
    /// let architecture = Architecture::new(vec![3, 2, 1], ActivationScheme::Tanh).unwrap();
    /// assert_eq!(architecture.parameter_count(), 11);
    ///
    /// assert!(Architecture::new(vec![3], ActivationScheme::Tanh).is_err());
    /// assert!(Architecture::new(vec![3, 0, 1], ActivationScheme::Tanh).is_err());
    /// ```
    pub fn new(
        layer_sizes: Vec<usize>,
        activation: ActivationScheme,
    ) -> Result<Architecture, NetworkError> {
        let architecture = Architecture {
            layer_sizes,
            activation,
        };
        architecture.validate()?;
        Ok(architecture)
    }

    /// Checks the layer layout; deserialized architectures
    /// are validated when a network is built from them.
    pub fn validate(&self) -> Result<(), NetworkError> {
        if self.layer_sizes.len() < 2 {
            return Err(NetworkError::TooFewLayers(self.layer_sizes.len()));
        }
        match self.layer_sizes.iter().position(|&n| n == 0) {
            Some(layer) => Err(NetworkError::EmptyLayer(layer)),
            None => Ok(()),
        }
    }

    pub fn layer_sizes(&self) -> &[usize] {
        &self.layer_sizes
    }

    pub fn activation(&self) -> ActivationScheme {
        self.activation
    }

    pub fn input_count(&self) -> usize {
        self.layer_sizes.first().copied().unwrap_or(0)
    }

    pub fn output_count(&self) -> usize {
        self.layer_sizes.last().copied().unwrap_or(0)
    }

    /// `Σ L[l]·L[l+1] + L[l+1]` over all layer pairs.
    pub fn parameter_count(&self) -> usize {
        self.layer_sizes
            .windows(2)
            .map(|pair| pair[0] * pair[1] + pair[1])
            .sum()
    }

    /// A genetic config whose genomes fit this architecture.
    pub fn genetic_config(&self, base: &GeneticConfig) -> GeneticConfig {
        GeneticConfig {
            genome_length: self.parameter_count(),
            ..base.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn sigmoid_is_stable_at_extremes() {
        assert_relative_eq!(ActivationType::Sigmoid.apply(0.0), 0.5);
        assert_eq!(ActivationType::Sigmoid.apply(-1000.0), 0.0);
        assert_eq!(ActivationType::Sigmoid.apply(1000.0), 1.0);
        assert!(!ActivationType::Sigmoid.apply(-100.0).is_nan());
    }

    #[test]
    fn parameter_count_of_controller_layout() {
        let architecture = Architecture::new(vec![16, 16, 8, 2], ActivationScheme::Tanh).unwrap();
        assert_eq!(architecture.parameter_count(), 16 * 16 + 16 + 16 * 8 + 8 + 8 * 2 + 2);
        assert_eq!(architecture.input_count(), 16);
        assert_eq!(architecture.output_count(), 2);
    }

    #[test]
    fn genetic_config_takes_parameter_count() {
        let architecture = Architecture::new(vec![3, 2, 1], ActivationScheme::Tanh).unwrap();
        let config = architecture.genetic_config(&GeneticConfig::default());
        assert_eq!(config.genome_length, 11);
        assert_eq!(config.mutation_rate, GeneticConfig::default().mutation_rate);
    }

    #[test]
    fn deserialized_layout_is_validated() {
        let architecture: Architecture =
            serde_json::from_str(r#"{"layer_sizes":[4]}"#).unwrap();
        assert_eq!(architecture.activation(), ActivationScheme::Tanh);
        assert_eq!(architecture.validate(), Err(NetworkError::TooFewLayers(1)));
    }
}
