//! The controller's view of the world.
//!
//! Features are laid out as
//!
//! | slot                 | value                                        |
//! |----------------------|----------------------------------------------|
//! | 0                    | estimated distance to goal / arena diagonal  |
//! | 1                    | goal bearing relative to heading / π         |
//! | 2, 3                 | previous forward and turn commands           |
//! | 4 ..                 | lidar ranges / max range, one per ray        |
//! | then, with `state`   | goal x, goal y, estimate x, estimate y (each / arena size), heading / π |
//! | then, with a window  | occupancy probabilities around the estimate  |
use crate::controller::MotorCommand;

use nalgebra::Vector2;
use roamer_perception::grid::OccupancyGrid;
use roamer_perception::{Pose, Scan, WorldPoint};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// A square patch of the occupancy grid centred on the pose estimate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalMapConfig {
    /// Samples per side.
    pub size: usize,
    /// Grid cells between samples.
    pub stride: usize,
}

impl Default for LocalMapConfig {
    fn default() -> LocalMapConfig {
        LocalMapConfig { size: 5, stride: 1 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    pub ray_count: usize,
    /// Arena extent used to normalize positions and distances.
    pub world_size: [f32; 2],
    /// Append goal and pose estimate coordinates.
    pub state: bool,
    pub local_map: Option<LocalMapConfig>,
}

impl Default for FeatureConfig {
    fn default() -> FeatureConfig {
        FeatureConfig {
            ray_count: 12,
            world_size: [30.0, 30.0],
            state: false,
            local_map: None,
        }
    }
}

impl FeatureConfig {
    /// Length of every vector built with this config.
    ///
    /// # Examples
    /// ```
    /// use roamer_trials::features::{FeatureConfig, LocalMapConfig};
    ///
    /// assert_eq!(FeatureConfig::default().feature_count(), 16);
    /// let mapping = FeatureConfig {
    ///     state: true,
    ///     local_map: Some(LocalMapConfig { size: 5, stride: 1 }),
    ///     ..FeatureConfig::default()
    /// };
    /// assert_eq!(mapping.feature_count(), 16 + 5 + 25);
    /// ```
    pub fn feature_count(&self) -> usize {
        4 + self.ray_count
            + if self.state { 5 } else { 0 }
            + self.local_map.map_or(0, |m| m.size * m.size)
    }
}

/// Everything a feature vector is built from.
#[derive(Clone, Copy, Debug)]
pub struct FeatureInputs<'a> {
    pub estimate: Pose,
    pub goal: WorldPoint,
    pub previous: MotorCommand,
    pub scan: Option<&'a Scan>,
    pub grid: Option<&'a OccupancyGrid>,
}

/// Builds a vector of exactly [`FeatureConfig::feature_count`] values.
///
/// Scans with fewer rays than configured are padded with full range
/// readings, extra rays are dropped. Without a grid the local window
/// reports an unknown (0.5) probability everywhere.
pub fn build_features(config: &FeatureConfig, inputs: &FeatureInputs<'_>) -> Vec<f32> {
    let mut features = Vec::with_capacity(config.feature_count());
    let size = Vector2::from(config.world_size);
    let diagonal = size.norm();

    let distance = inputs.estimate.distance_to(inputs.goal);
    features.push(if diagonal > 0.0 { distance / diagonal } else { 0.0 });
    features.push(inputs.estimate.bearing_to(inputs.goal) / PI);
    features.push(inputs.previous.forward);
    features.push(inputs.previous.turn);

    let ranges = inputs
        .scan
        .into_iter()
        .flat_map(|scan| scan.normalized_ranges())
        .chain(std::iter::repeat(1.0))
        .take(config.ray_count);
    features.extend(ranges);

    if config.state {
        let scale = |value: f32, extent: f32| if extent > 0.0 { value / extent } else { 0.0 };
        features.push(scale(inputs.goal.x, size.x));
        features.push(scale(inputs.goal.y, size.y));
        features.push(scale(inputs.estimate.x, size.x));
        features.push(scale(inputs.estimate.y, size.y));
        features.push(inputs.estimate.heading / PI);
    }

    if let Some(window) = config.local_map {
        match inputs.grid {
            Some(grid) => features.extend(grid.local_window(
                inputs.estimate.position(),
                window.size,
                window.stride,
            )),
            None => features.extend(std::iter::repeat(0.5).take(window.size * window.size)),
        }
    }
    features
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Point2;
    use roamer_perception::grid::GridConfig;
    use roamer_perception::RangeReading;

    fn scan(distances: &[f32]) -> Scan {
        let origin = Point2::origin();
        Scan::new(
            10.0,
            distances
                .iter()
                .map(|&d| RangeReading::hit(origin, Vector2::x(), d))
                .collect(),
        )
    }

    fn inputs<'a>(scan: Option<&'a Scan>, grid: Option<&'a OccupancyGrid>) -> FeatureInputs<'a> {
        FeatureInputs {
            estimate: Pose::new(0.0, 0.0, 0.0),
            goal: Point2::new(0.0, 15.0),
            previous: MotorCommand::new(0.25, -0.5),
            scan,
            grid,
        }
    }

    #[test]
    fn leading_features_follow_goal_and_previous_command() {
        let config = FeatureConfig {
            ray_count: 2,
            world_size: [30.0, 40.0],
            ..FeatureConfig::default()
        };
        let scan = scan(&[5.0, 10.0]);
        let features = build_features(&config, &inputs(Some(&scan), None));
        assert_eq!(features.len(), config.feature_count());
        assert_relative_eq!(features[0], 15.0 / 50.0);
        // Goal due north of an east-facing agent.
        assert_relative_eq!(features[1], 0.5);
        assert_eq!(&features[2..], &[0.25, -0.5, 0.5, 1.0]);
    }

    #[test]
    fn scans_are_padded_and_truncated() {
        let config = FeatureConfig {
            ray_count: 3,
            ..FeatureConfig::default()
        };
        let short = scan(&[2.0]);
        assert_eq!(&build_features(&config, &inputs(Some(&short), None))[4..], &[0.2, 1.0, 1.0]);
        let long = scan(&[2.0, 4.0, 6.0, 8.0]);
        assert_eq!(&build_features(&config, &inputs(Some(&long), None))[4..], &[0.2, 0.4, 0.6]);
        assert_eq!(&build_features(&config, &inputs(None, None))[4..], &[1.0, 1.0, 1.0]);
    }

    #[test]
    fn state_features_are_normalized() {
        let config = FeatureConfig {
            ray_count: 0,
            world_size: [30.0, 30.0],
            state: true,
            local_map: None,
        };
        let mut inputs = inputs(None, None);
        inputs.estimate = Pose::new(3.0, -6.0, PI / 2.0);
        let features = build_features(&config, &inputs);
        assert_eq!(features.len(), 9);
        assert_relative_eq!(features[4], 0.0);
        assert_relative_eq!(features[5], 0.5);
        assert_relative_eq!(features[6], 0.1);
        assert_relative_eq!(features[7], -0.2);
        assert_relative_eq!(features[8], 0.5);
    }

    #[test]
    fn local_window_without_grid_is_unknown() {
        let config = FeatureConfig {
            ray_count: 0,
            local_map: Some(LocalMapConfig { size: 3, stride: 2 }),
            ..FeatureConfig::default()
        };
        let features = build_features(&config, &inputs(None, None));
        assert_eq!(features.len(), 4 + 9);
        assert!(features[4..].iter().all(|&p| p == 0.5));

        let grid = OccupancyGrid::new(GridConfig::default()).unwrap();
        let features = build_features(&config, &inputs(None, Some(&grid)));
        assert_eq!(features.len(), 4 + 9);
        assert!(features[4..].iter().all(|&p| p == 0.5));
    }
}
