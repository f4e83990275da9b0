//! Extended Kalman filter over the agent pose.
//!
//! The motion model is `x' = x + B(θ)·u` with `A = I`, where
//! `u = (v, ω)` and
//!
//! ```text
//! B(θ) = | Δt·cos θ   0  |
//!        | Δt·sin θ   0  |
//!        |    0       Δt |
//! ```
//!
//! Observations are full poses (`C = I`) produced by landmark
//! triangulation.
use crate::geometry::{wrap_angle, Control, Pose};

use log::debug;
use nalgebra::{Matrix3, Matrix3x2, Vector2, Vector3};
use serde::{Deserialize, Serialize};

/// Noise and initialisation parameters for a [`PoseEstimator`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    /// Diagonal of the process noise covariance R, added on every prediction.
    pub process_noise: [f32; 3],
    /// Diagonal of the observation noise covariance Q.
    pub observation_noise: [f32; 3],
    /// Diagonal of the covariance the filter starts with.
    pub initial_covariance: [f32; 3],
    /// Corrections are skipped when `|det(P + Q)|` falls below this.
    pub singularity_threshold: f32,
}

impl EstimatorConfig {
    /// Returns a "zero-valued" configuration.
    ///
    /// # Note
    /// A filter built from this never trusts or distrusts anything,
    /// and every correction is rejected as singular. It is meant
    /// for abbreviating struct-update syntax.
    pub const fn zero() -> EstimatorConfig {
        EstimatorConfig {
            process_noise: [0.0; 3],
            observation_noise: [0.0; 3],
            initial_covariance: [0.0; 3],
            singularity_threshold: 0.0,
        }
    }
}

impl Default for EstimatorConfig {
    fn default() -> EstimatorConfig {
        EstimatorConfig {
            process_noise: [0.1; 3],
            observation_noise: [0.1; 3],
            initial_covariance: [1.0; 3],
            singularity_threshold: 1e-12,
        }
    }
}

/// Outcome of [`PoseEstimator::predict`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Prediction {
    /// The motion model was applied.
    Applied,
    /// The control was exactly zero; nothing changed.
    Idle,
    /// The control or time step was not usable; nothing changed.
    Rejected,
}

/// Outcome of [`PoseEstimator::correct`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Correction {
    Applied,
    /// The innovation covariance could not be inverted.
    Singular,
    /// The observation was not finite.
    Rejected,
}

/// Pose estimate and its covariance.
#[derive(Clone, Debug)]
pub struct PoseEstimator {
    pose: Pose,
    covariance: Matrix3<f32>,
    process_noise: Matrix3<f32>,
    observation_noise: Matrix3<f32>,
    singularity_threshold: f32,
}

impl PoseEstimator {
    pub fn new(initial_pose: Pose, config: &EstimatorConfig) -> PoseEstimator {
        PoseEstimator {
            pose: Pose::new(initial_pose.x, initial_pose.y, initial_pose.heading),
            covariance: diagonal(config.initial_covariance),
            process_noise: diagonal(config.process_noise),
            observation_noise: diagonal(config.observation_noise),
            singularity_threshold: config.singularity_threshold,
        }
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn covariance(&self) -> &Matrix3<f32> {
        &self.covariance
    }

    /// Control matrix B(θ) for a time step of `dt` seconds.
    pub fn control_matrix(heading: f32, dt: f32) -> Matrix3x2<f32> {
        Matrix3x2::new(
            dt * heading.cos(), 0.0,
            dt * heading.sin(), 0.0,
            0.0, dt,
        )
    }

    /// Advances the estimate by `dt` seconds of `control`.
    ///
    /// # Examples
    /// ```
    /// use roamer_perception::estimator::{EstimatorConfig, PoseEstimator, Prediction};
    /// use roamer_perception::{Control, Pose};
    ///
    /// let mut estimator = PoseEstimator::new(Pose::default(), &EstimatorConfig::default());
    /// assert_eq!(estimator.predict(Control::default(), 0.1), Prediction::Idle);
    /// assert_eq!(estimator.predict(Control::new(f32::NAN, 0.0), 0.1), Prediction::Rejected);
    /// assert_eq!(estimator.pose(), Pose::default());
    /// ```
    pub fn predict(&mut self, control: Control, dt: f32) -> Prediction {
        if !control.is_finite() || !dt.is_finite() || dt <= 0.0 {
            debug!("rejecting prediction: control {:?}, dt {}", control, dt);
            return Prediction::Rejected;
        }
        if control.is_zero() {
            return Prediction::Idle;
        }

        let b = Self::control_matrix(self.pose.heading, dt);
        let state = self.pose.to_vector() + b * Vector2::new(control.linear, control.angular);
        let covariance = symmetrize(&(self.covariance + self.process_noise));
        if !is_finite(&state) || !covariance.iter().all(|v| v.is_finite()) {
            debug!("rejecting prediction: non-finite state");
            return Prediction::Rejected;
        }

        self.pose = Pose::from_vector(&state);
        self.covariance = covariance;
        Prediction::Applied
    }

    /// Fuses a full pose observation into the estimate.
    pub fn correct(&mut self, observation: &Pose) -> Correction {
        if !observation.is_finite() {
            debug!("rejecting non-finite observation {:?}", observation);
            return Correction::Rejected;
        }

        let innovation_covariance = self.covariance + self.observation_noise;
        if innovation_covariance.determinant().abs() < self.singularity_threshold {
            debug!("skipping correction: innovation covariance is singular");
            return Correction::Singular;
        }
        let inverse = match innovation_covariance.try_inverse() {
            Some(inverse) => inverse,
            None => {
                debug!("skipping correction: innovation covariance is not invertible");
                return Correction::Singular;
            }
        };

        let gain = self.covariance * inverse;
        let mut innovation = observation.to_vector() - self.pose.to_vector();
        innovation.z = wrap_angle(innovation.z);

        let state = self.pose.to_vector() + gain * innovation;
        let covariance = symmetrize(&((Matrix3::identity() - gain) * self.covariance));
        if !is_finite(&state) || !covariance.iter().all(|v| v.is_finite()) {
            return Correction::Rejected;
        }

        self.pose = Pose::from_vector(&state);
        self.covariance = covariance;
        Correction::Applied
    }
}

fn diagonal(values: [f32; 3]) -> Matrix3<f32> {
    Matrix3::from_diagonal(&Vector3::new(values[0], values[1], values[2]))
}

fn symmetrize(m: &Matrix3<f32>) -> Matrix3<f32> {
    (m + m.transpose()) * 0.5
}

fn is_finite(v: &Vector3<f32>) -> bool {
    v.iter().all(|x| x.is_finite())
}
