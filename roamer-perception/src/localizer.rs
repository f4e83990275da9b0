use crate::estimator::{Correction, PoseEstimator, Prediction};
use crate::geometry::{Control, Pose};
use crate::triangulation::{triangulate, Anchor, LandmarkMeasurement, Triangulation, TriangulationConfig};

use log::debug;

/// What happened during one [`Localizer::step`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocalizationStep {
    pub prediction: Prediction,
    /// `None` when no observation was available this tick.
    pub correction: Option<Correction>,
    pub triangulation: Triangulation,
}

/// Runs the pose estimator once per tick: predict from odometry,
/// then correct from landmarks when a full observation exists.
#[derive(Clone, Debug)]
pub struct Localizer {
    estimator: PoseEstimator,
    triangulation: TriangulationConfig,
}

impl Localizer {
    pub fn new(estimator: PoseEstimator, triangulation: TriangulationConfig) -> Localizer {
        Localizer {
            estimator,
            triangulation,
        }
    }

    pub fn pose(&self) -> Pose {
        self.estimator.pose()
    }

    pub fn estimator(&self) -> &PoseEstimator {
        &self.estimator
    }

    /// Advances the estimate by one tick.
    ///
    /// With fewer than three anchors, or when no anchor triple is
    /// solvable, only the prediction is applied.
    pub fn step(
        &mut self,
        control: Control,
        dt: f32,
        anchors: &[Anchor],
        measurements: &[LandmarkMeasurement],
    ) -> LocalizationStep {
        let prediction = self.estimator.predict(control, dt);
        let triangulation = triangulate(anchors, measurements, &self.triangulation);
        let correction = triangulation.observation().map(|observation| {
            let outcome = self.estimator.correct(&observation);
            debug!("landmark correction from {} triples: {:?}", triangulation.solved_subsets, outcome);
            outcome
        });
        LocalizationStep {
            prediction,
            correction,
            triangulation,
        }
    }
}
