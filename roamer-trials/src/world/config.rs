use crate::controller::MotionLimits;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CircleObstacle {
    pub center: [f32; 2],
    pub radius: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub position: [f32; 2],
    pub signature: u32,
}

/// A square arena centred on the origin.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// The arena spans [-half_extent, half_extent] on both axes.
    pub half_extent: f32,
    pub obstacles: Vec<CircleObstacle>,
    pub landmarks: Vec<Landmark>,
    /// Landmarks farther than this are never sighted.
    pub detection_radius: f32,
}

impl WorldConfig {
    /// An empty arena with no landmarks.
    pub fn zero() -> WorldConfig {
        WorldConfig {
            half_extent: 0.0,
            obstacles: vec![],
            landmarks: vec![],
            detection_radius: 0.0,
        }
    }
}

impl Default for WorldConfig {
    fn default() -> WorldConfig {
        let obstacle = |x, y, radius| CircleObstacle {
            center: [x, y],
            radius,
        };
        let mut landmarks = Vec::with_capacity(9);
        for (row, y) in [-8.0, 0.0, 8.0].into_iter().enumerate() {
            for (column, x) in [-8.0, 0.0, 8.0].into_iter().enumerate() {
                landmarks.push(Landmark {
                    position: [x, y],
                    signature: (row * 3 + column) as u32,
                });
            }
        }
        WorldConfig {
            half_extent: 15.0,
            obstacles: vec![
                obstacle(4.0, 4.0, 1.2),
                obstacle(-4.0, -3.0, 1.0),
                obstacle(3.0, -5.0, 1.5),
                obstacle(-5.0, 5.0, 0.8),
            ],
            landmarks,
            detection_radius: 10.0,
        }
    }
}

/// An evenly spaced 360° range finder.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LidarConfig {
    pub ray_count: usize,
    pub max_range: f32,
}

impl Default for LidarConfig {
    fn default() -> LidarConfig {
        LidarConfig {
            ray_count: 12,
            max_range: 10.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyConfig {
    pub limits: MotionLimits,
    /// Standard deviation of the multiplicative speed noise.
    pub speed_noise: f32,
    /// Standard deviation of the multiplicative turn-rate noise.
    pub turn_noise: f32,
    /// The body cannot move to where a disc of this radius is blocked.
    pub radius: f32,
}

impl BodyConfig {
    /// A noiseless point body with no motion limits.
    pub fn zero() -> BodyConfig {
        BodyConfig {
            limits: MotionLimits {
                max_speed: 0.0,
                max_turn_rate: 0.0,
            },
            speed_noise: 0.0,
            turn_noise: 0.0,
            radius: 0.0,
        }
    }
}

impl Default for BodyConfig {
    fn default() -> BodyConfig {
        BodyConfig {
            limits: MotionLimits::default(),
            speed_noise: 0.1,
            turn_noise: 0.1,
            radius: 0.5,
        }
    }
}

/// Constraints on where trials may start and end.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    /// Spawn and goal are drawn uniformly from a disc of this radius.
    pub radius: f32,
    /// Minimum spawn/goal separation, as a fraction of `radius`.
    pub min_separation: f32,
    pub spawn_clearance: f32,
    pub goal_clearance: f32,
    pub max_attempts: usize,
}

impl Default for SpawnConfig {
    fn default() -> SpawnConfig {
        SpawnConfig {
            radius: 10.0,
            min_separation: 1.0 / 3.0,
            spawn_clearance: 1.2,
            goal_clearance: 0.6,
            max_attempts: 100,
        }
    }
}
