use crate::errors::ControllerError;

use roamer::Genome;
use roamer_nn::{Architecture, FeedforwardNetwork};
use roamer_perception::Control;
use serde::{Deserialize, Serialize};

/// Normalized motor outputs, each in [-1, 1].
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MotorCommand {
    pub forward: f32,
    /// Positive turns are counter-clockwise.
    pub turn: f32,
}

impl MotorCommand {
    pub fn new(forward: f32, turn: f32) -> MotorCommand {
        MotorCommand { forward, turn }
    }

    /// The velocities this command asks of a body with the given limits.
    ///
    /// # Examples
    /// ```
    /// use roamer_trials::controller::{MotionLimits, MotorCommand};
    ///
    /// let limits = MotionLimits { max_speed: 5.0, max_turn_rate: 2.0 };
    /// let control = MotorCommand::new(0.5, -1.0).to_control(&limits);
    /// assert_eq!((control.linear, control.angular), (2.5, -2.0));
    /// ```
    pub fn to_control(&self, limits: &MotionLimits) -> Control {
        Control::new(
            self.forward.clamp(-1.0, 1.0) * limits.max_speed,
            self.turn.clamp(-1.0, 1.0) * limits.max_turn_rate,
        )
    }
}

/// Full-scale speeds of a body.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionLimits {
    /// World units per second.
    pub max_speed: f32,
    /// Radians per second.
    pub max_turn_rate: f32,
}

impl Default for MotionLimits {
    fn default() -> MotionLimits {
        MotionLimits {
            max_speed: 5.0,
            max_turn_rate: 200f32.to_radians(),
        }
    }
}

/// Maps feature vectors to motor commands through a feedforward network
/// with exactly two outputs, remembering the last command it issued.
#[derive(Clone, Debug)]
pub struct FeedforwardController {
    network: FeedforwardNetwork,
    previous: MotorCommand,
}

impl FeedforwardController {
    pub fn new(network: FeedforwardNetwork) -> Result<FeedforwardController, ControllerError> {
        let outputs = network.architecture().output_count();
        if outputs != 2 {
            return Err(ControllerError::OutputCount(outputs));
        }
        Ok(FeedforwardController {
            network,
            previous: MotorCommand::default(),
        })
    }

    pub fn from_genome(
        architecture: &Architecture,
        genome: &Genome,
    ) -> Result<FeedforwardController, ControllerError> {
        FeedforwardController::new(FeedforwardNetwork::from_genome(architecture, genome)?)
    }

    pub fn input_count(&self) -> usize {
        self.network.architecture().input_count()
    }

    pub fn network(&self) -> &FeedforwardNetwork {
        &self.network
    }

    /// The command issued by the last successful [`act`](Self::act).
    pub fn previous(&self) -> MotorCommand {
        self.previous
    }

    pub fn act(&mut self, features: &[f32]) -> Result<MotorCommand, ControllerError> {
        let outputs = self.network.evaluate(features)?;
        let command = MotorCommand::new(outputs[0], outputs[1]);
        self.previous = command;
        Ok(command)
    }

    pub fn reset(&mut self) {
        self.previous = MotorCommand::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roamer_nn::{ActivationScheme, NetworkError};

    fn architecture(layers: Vec<usize>) -> Architecture {
        Architecture::new(layers, ActivationScheme::Tanh).unwrap()
    }

    #[test]
    fn needs_two_outputs() {
        let architecture = architecture(vec![3, 1]);
        let network = FeedforwardNetwork::new(architecture, vec![0.0; 4]).unwrap();
        assert_eq!(
            FeedforwardController::new(network).unwrap_err(),
            ControllerError::OutputCount(1)
        );
    }

    #[test]
    fn act_remembers_the_command() {
        // forward = tanh(x0), turn = tanh(-x1)
        let architecture = architecture(vec![2, 2]);
        let network = FeedforwardNetwork::new(architecture, vec![1.0, 0.0, 0.0, -1.0, 0.0, 0.0]).unwrap();
        let mut controller = FeedforwardController::new(network).unwrap();
        assert_eq!(controller.previous(), MotorCommand::default());

        let command = controller.act(&[0.5, 0.25]).unwrap();
        assert_eq!(command, MotorCommand::new(0.5f32.tanh(), (-0.25f32).tanh()));
        assert_eq!(controller.previous(), command);

        controller.reset();
        assert_eq!(controller.previous(), MotorCommand::default());
    }

    #[test]
    fn failed_act_keeps_previous_command() {
        let architecture = architecture(vec![2, 2]);
        let network = FeedforwardNetwork::new(architecture, vec![0.5; 6]).unwrap();
        let mut controller = FeedforwardController::new(network).unwrap();
        let command = controller.act(&[1.0, 1.0]).unwrap();
        assert_eq!(
            controller.act(&[1.0]),
            Err(ControllerError::Network(NetworkError::InputLength {
                expected: 2,
                found: 1
            }))
        );
        assert_eq!(controller.previous(), command);
    }

    #[test]
    fn controls_scale_with_limits() {
        let limits = MotionLimits::default();
        let control = MotorCommand::new(2.0, -0.5).to_control(&limits);
        assert_eq!(control.linear, 5.0);
        assert!((control.angular + 100f32.to_radians()).abs() < 1e-6);
    }
}
