use crate::architecture::Architecture;
use crate::errors::NetworkError;

use roamer::Genome;
use serde::{Deserialize, Serialize};

/// A fully-connected layered network with fixed topology.
///
/// Evaluation is a pure function of the inputs: the network
/// keeps no state between calls.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeedforwardNetwork {
    architecture: Architecture,
    parameters: Vec<f32>,
}

impl FeedforwardNetwork {
    /// Builds a network from a flat parameter vector.
    ///
    /// # Examples
    /// ```
    /// use roamer_nn::{ActivationScheme, Architecture, FeedforwardNetwork, NetworkError};
    ///
    /// let architecture = Architecture::new(vec![2, 1], ActivationScheme::Tanh).unwrap();
    /// let network = FeedforwardNetwork::new(architecture.clone(), vec![0.5, -0.5, 0.0]).unwrap();
    /// let output = network.evaluate(&[1.0, 1.0]).unwrap();
    /// assert_eq!(output, vec![0.0]);
    ///
    /// assert_eq!(
    ///     FeedforwardNetwork::new(architecture, vec![0.0; 2]),
    ///     Err(NetworkError::ParameterCount { expected: 3, found: 2 })
    /// );
    /// ```
    pub fn new(
        architecture: Architecture,
        parameters: Vec<f32>,
    ) -> Result<FeedforwardNetwork, NetworkError> {
        architecture.validate()?;
        let expected = architecture.parameter_count();
        if parameters.len() != expected {
            return Err(NetworkError::ParameterCount {
                expected,
                found: parameters.len(),
            });
        }
        if let Some(index) = parameters.iter().position(|p| !p.is_finite()) {
            return Err(NetworkError::NonFiniteParameter { index });
        }
        Ok(FeedforwardNetwork {
            architecture,
            parameters,
        })
    }

    /// Builds a network from a copy of the genome's genes.
    pub fn from_genome(
        architecture: &Architecture,
        genome: &Genome,
    ) -> Result<FeedforwardNetwork, NetworkError> {
        FeedforwardNetwork::new(architecture.clone(), genome.genes().to_vec())
    }

    pub fn architecture(&self) -> &Architecture {
        &self.architecture
    }

    pub fn parameters(&self) -> &[f32] {
        &self.parameters
    }

    /// Propagates `inputs` through every layer.
    /// Outputs lie in [-1, 1].
    pub fn evaluate(&self, inputs: &[f32]) -> Result<Vec<f32>, NetworkError> {
        let expected = self.architecture.input_count();
        if inputs.len() != expected {
            return Err(NetworkError::InputLength {
                expected,
                found: inputs.len(),
            });
        }
        if let Some(index) = inputs.iter().position(|x| !x.is_finite()) {
            return Err(NetworkError::NonFiniteInput { index });
        }

        let scheme = self.architecture.activation();
        let layers = self.architecture.layer_sizes().len() - 1;
        let mut activations = inputs.to_vec();
        let mut offset = 0;
        for (layer, pair) in self.architecture.layer_sizes().windows(2).enumerate() {
            let (fan_in, fan_out) = (pair[0], pair[1]);
            let weights = &self.parameters[offset..offset + fan_in * fan_out];
            offset += fan_in * fan_out;
            let biases = &self.parameters[offset..offset + fan_out];
            offset += fan_out;

            let activation = if layer + 1 == layers {
                scheme.output()
            } else {
                scheme.hidden()
            };
            activations = weights
                .chunks_exact(fan_in)
                .zip(biases)
                .map(|(row, bias)| {
                    let sum: f32 = row.iter().zip(&activations).map(|(w, x)| w * x).sum();
                    activation.apply(sum + bias)
                })
                .collect();
        }
        Ok(activations)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::architecture::ActivationScheme;
    use approx::assert_relative_eq;
    use roamer::{rng, GeneticConfig};

    fn sigmoid(x: f32) -> f32 {
        1.0 / (1.0 + (-x).exp())
    }

    // W1 = [[0.5, -0.2, 0.1], [0.3, 0.8, -0.5]], b1 = [0.1, -0.1]
    // W2 = [[1.0, -1.0]], b2 = [0.2]
    fn params_3_2_1() -> Vec<f32> {
        vec![0.5, -0.2, 0.1, 0.3, 0.8, -0.5, 0.1, -0.1, 1.0, -1.0, 0.2]
    }

    fn network(scheme: ActivationScheme) -> FeedforwardNetwork {
        let architecture = Architecture::new(vec![3, 2, 1], scheme).unwrap();
        FeedforwardNetwork::new(architecture, params_3_2_1()).unwrap()
    }

    #[test]
    fn hand_computed_tanh() {
        let output = network(ActivationScheme::Tanh)
            .evaluate(&[1.0, 0.5, -1.0])
            .unwrap();
        let h0 = (0.5 * 1.0 - 0.2 * 0.5 + 0.1 * -1.0 + 0.1f32).tanh();
        let h1 = (0.3 * 1.0 + 0.8 * 0.5 - 0.5 * -1.0 - 0.1f32).tanh();
        let expected = (h0 - h1 + 0.2).tanh();
        assert_eq!(output.len(), 1);
        assert_relative_eq!(output[0], expected, epsilon = 1e-6);
    }

    #[test]
    fn hand_computed_sigmoid_hidden() {
        let output = network(ActivationScheme::SigmoidHidden)
            .evaluate(&[1.0, 0.5, -1.0])
            .unwrap();
        let h0 = sigmoid(0.5 * 1.0 - 0.2 * 0.5 + 0.1 * -1.0 + 0.1);
        let h1 = sigmoid(0.3 * 1.0 + 0.8 * 0.5 - 0.5 * -1.0 - 0.1);
        let expected = (h0 - h1 + 0.2).tanh();
        assert_relative_eq!(output[0], expected, epsilon = 1e-6);
    }

    #[test]
    fn outputs_are_bounded() {
        let architecture = Architecture::new(vec![5, 8, 2], ActivationScheme::Tanh).unwrap();
        let config = architecture.genetic_config(&GeneticConfig {
            gene_min: -50.0,
            gene_max: 50.0,
            ..GeneticConfig::default()
        });
        let mut rng = rng::seeded(8);
        for _ in 0..50 {
            let genome = Genome::new(&config, &mut rng);
            let network = FeedforwardNetwork::from_genome(&architecture, &genome).unwrap();
            let output = network.evaluate(&[100.0, -100.0, 3.0, 0.0, 1.0]).unwrap();
            assert!(output.iter().all(|o| (-1.0..=1.0).contains(o)));
        }
    }

    #[test]
    fn evaluation_is_deterministic() {
        let network = network(ActivationScheme::Tanh);
        let inputs = [0.3, -0.7, 0.9];
        assert_eq!(network.evaluate(&inputs), network.evaluate(&inputs));
    }

    #[test]
    fn rejects_wrong_input_length() {
        assert_eq!(
            network(ActivationScheme::Tanh).evaluate(&[1.0, 2.0]),
            Err(NetworkError::InputLength {
                expected: 3,
                found: 2
            })
        );
    }

    #[test]
    fn rejects_non_finite_values() {
        assert_eq!(
            network(ActivationScheme::Tanh).evaluate(&[1.0, f32::NAN, 0.0]),
            Err(NetworkError::NonFiniteInput { index: 1 })
        );
        let architecture = Architecture::new(vec![1, 1], ActivationScheme::Tanh).unwrap();
        assert_eq!(
            FeedforwardNetwork::new(architecture, vec![f32::INFINITY, 0.0]),
            Err(NetworkError::NonFiniteParameter { index: 0 })
        );
    }
}
