use crate::controller::{FeedforwardController, MotionLimits, MotorCommand};
use crate::errors::AgentError;
use crate::features::{build_features, FeatureConfig, FeatureInputs};
use crate::interfaces::{LandmarkSource, MotionActuator, RangeSensor};

use log::debug;
use roamer_perception::estimator::{EstimatorConfig, PoseEstimator};
use roamer_perception::grid::{GridConfig, OccupancyGrid, ScanUpdate};
use roamer_perception::triangulation::TriangulationConfig;
use roamer_perception::{LocalizationStep, Localizer, Pose, Scan, WorldPoint};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub estimator: EstimatorConfig,
    pub triangulation: TriangulationConfig,
    /// Occupancy mapping is disabled when `None`.
    pub grid: Option<GridConfig>,
    /// Sampling step along each beam when fusing a scan.
    pub grid_step: f32,
    pub features: FeatureConfig,
}

impl Default for AgentConfig {
    fn default() -> AgentConfig {
        AgentConfig {
            estimator: EstimatorConfig::default(),
            triangulation: TriangulationConfig::default(),
            grid: Some(GridConfig::default()),
            grid_step: 0.25,
            features: FeatureConfig::default(),
        }
    }
}

/// What one [`Agent::step`] did.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickReport {
    pub localization: LocalizationStep,
    /// `None` when mapping is off or the scan was unusable.
    pub scan_update: Option<ScanUpdate>,
    /// The fresh scan was non-finite and the last valid one was used.
    pub reused_scan: bool,
    pub command: MotorCommand,
}

/// A navigating agent: pose estimate, map and controller.
#[derive(Clone, Debug)]
pub struct Agent {
    id: usize,
    goal: WorldPoint,
    localizer: Localizer,
    grid: Option<OccupancyGrid>,
    grid_step: f32,
    controller: FeedforwardController,
    features: FeatureConfig,
    limits: MotionLimits,
    last_scan: Option<Scan>,
}

impl Agent {
    /// Creates an agent that believes it starts at `start`.
    ///
    /// Fails if the controller's input layer does not match
    /// the configured feature count, or the grid config is invalid.
    pub fn new(
        id: usize,
        start: Pose,
        goal: WorldPoint,
        controller: FeedforwardController,
        config: &AgentConfig,
        limits: MotionLimits,
    ) -> Result<Agent, AgentError> {
        let found = config.features.feature_count();
        if controller.input_count() != found {
            return Err(AgentError::FeatureCount {
                expected: controller.input_count(),
                found,
            });
        }
        let grid = config.grid.clone().map(OccupancyGrid::new).transpose()?;
        Ok(Agent {
            id,
            goal,
            localizer: Localizer::new(
                PoseEstimator::new(start, &config.estimator),
                config.triangulation,
            ),
            grid,
            grid_step: config.grid_step,
            controller,
            features: config.features.clone(),
            limits,
            last_scan: None,
        })
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn goal(&self) -> WorldPoint {
        self.goal
    }

    /// The current pose estimate.
    pub fn pose(&self) -> Pose {
        self.localizer.pose()
    }

    pub fn localizer(&self) -> &Localizer {
        &self.localizer
    }

    pub fn grid(&self) -> Option<&OccupancyGrid> {
        self.grid.as_ref()
    }

    pub fn controller(&self) -> &FeedforwardController {
        &self.controller
    }

    /// The last finite scan received.
    pub fn last_scan(&self) -> Option<&Scan> {
        self.last_scan.as_ref()
    }

    /// Runs one control tick of length `dt`:
    /// 1. predicts the pose from the command issued on the previous tick
    ///    and corrects it from the landmarks in sight;
    /// 2. fuses a fresh scan into the map, reusing the last valid scan
    ///    for the features when the fresh one is not finite;
    /// 3. evaluates the controller and sends its command to the body.
    pub fn step<B>(&mut self, dt: f32, body: &mut B) -> Result<TickReport, AgentError>
    where
        B: MotionActuator + RangeSensor + LandmarkSource,
    {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(AgentError::InvalidTick(dt));
        }

        let control = self.controller.previous().to_control(&self.limits);
        let sightings = body.sightings();
        let localization = self
            .localizer
            .step(control, dt, &sightings.anchors, &sightings.measurements);

        let scan = body.scan();
        let reused_scan = !scan.is_finite();
        if reused_scan {
            debug!("agent {}: non-finite scan, reusing the last valid one", self.id);
        } else {
            self.last_scan = Some(scan);
        }

        let estimate = self.localizer.pose();
        let scan_update = match (&mut self.grid, &self.last_scan) {
            (Some(grid), Some(scan)) if !reused_scan => {
                Some(grid.update(scan, estimate.position(), self.grid_step)?)
            }
            _ => None,
        };

        let features = build_features(
            &self.features,
            &FeatureInputs {
                estimate,
                goal: self.goal,
                previous: self.controller.previous(),
                scan: self.last_scan.as_ref(),
                grid: self.grid.as_ref(),
            },
        );
        let command = self.controller.act(&features)?;
        body.drive(command.forward);
        body.rotate(command.turn);

        Ok(TickReport {
            localization,
            scan_update,
            reused_scan,
            command,
        })
    }
}
