use super::{BodyConfig, LidarConfig, World};
use crate::interfaces::{LandmarkSource, MotionActuator, ObstacleQuery, RangeSensor, Sightings};

use log::warn;
use nalgebra::{Point2, Vector2};
use rand::Rng;
use rand_distr::{Distribution, Normal};
use roamer::rng::{seeded, SeededRng};
use roamer_perception::triangulation::{Anchor, LandmarkMeasurement};
use roamer_perception::{wrap_angle, Pose, RangeReading, Scan};
use std::f32::consts::PI;

/// A unicycle moving through a [`World`], with multiplicative Gaussian
/// noise on its commanded speed and turn rate.
#[derive(Clone, Debug)]
pub struct SimulatedBody<'w> {
    world: &'w World,
    config: BodyConfig,
    lidar: LidarConfig,
    pose: Pose,
    forward: f32,
    turn: f32,
    speed_noise: Option<Normal<f32>>,
    turn_noise: Option<Normal<f32>>,
    rng: SeededRng,
}

impl<'w> SimulatedBody<'w> {
    pub fn new(
        world: &'w World,
        pose: Pose,
        config: BodyConfig,
        lidar: LidarConfig,
        seed: u64,
    ) -> SimulatedBody<'w> {
        SimulatedBody {
            world,
            config,
            lidar,
            pose,
            forward: 0.0,
            turn: 0.0,
            speed_noise: noise(config.speed_noise),
            turn_noise: noise(config.turn_noise),
            rng: seeded(seed),
        }
    }

    /// The true pose.
    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn world(&self) -> &'w World {
        self.world
    }

    /// Integrates the current commands over `dt` and returns the distance
    /// actually covered. Translation into a blocked position is refused,
    /// turning still applies.
    pub fn advance(&mut self, dt: f32) -> f32 {
        let limits = self.config.limits;
        let speed = if self.forward == 0.0 {
            0.0
        } else {
            self.forward * limits.max_speed * (1.0 + sample(&self.speed_noise, &mut self.rng))
        };
        let turn_rate = if self.turn == 0.0 {
            0.0
        } else {
            self.turn * limits.max_turn_rate * (1.0 + sample(&self.turn_noise, &mut self.rng))
        };

        let step = self.pose.forward() * (speed * dt);
        let target = self.pose.position() + step;
        let travelled = if !self.world.is_blocked(target, self.config.radius) {
            self.pose.x = target.x;
            self.pose.y = target.y;
            step.norm()
        } else {
            0.0
        };
        self.pose.heading = wrap_angle(self.pose.heading + turn_rate * dt);
        travelled
    }
}

impl MotionActuator for SimulatedBody<'_> {
    fn drive(&mut self, forward: f32) {
        if forward.is_nan() {
            return;
        }
        self.forward = forward.clamp(-1.0, 1.0);
    }

    fn rotate(&mut self, turn: f32) {
        if turn.is_nan() {
            return;
        }
        self.turn = turn.clamp(-1.0, 1.0);
    }
}

impl RangeSensor for SimulatedBody<'_> {
    /// Ray `i` points at `heading - π + i·2π/n`, so the middle ray
    /// looks straight ahead.
    fn scan(&self) -> Scan {
        let origin = self.pose.position();
        let max_range = self.lidar.max_range;
        let spacing = 2.0 * PI / self.lidar.ray_count.max(1) as f32;
        let readings = (0..self.lidar.ray_count)
            .map(|i| {
                let angle = self.pose.heading - PI + i as f32 * spacing;
                let direction = Vector2::new(angle.cos(), angle.sin());
                match self.world.raycast(origin, direction, max_range) {
                    Some(distance) => RangeReading::hit(origin, direction, distance),
                    None => RangeReading::miss(origin, direction, max_range),
                }
            })
            .collect();
        Scan::new(max_range, readings)
    }
}

impl LandmarkSource for SimulatedBody<'_> {
    /// Every landmark within the detection radius and in line of sight,
    /// with exact ranges and heading-relative bearings.
    fn sightings(&self) -> Sightings {
        let origin = self.pose.position();
        let radius = self.world.config().detection_radius;
        let mut sightings = Sightings::default();
        for landmark in self.world.landmarks() {
            let position = Point2::from(landmark.position);
            let offset = position - origin;
            let range = offset.norm();
            if range > radius || !self.world.line_of_sight(origin, position) {
                continue;
            }
            sightings.anchors.push(Anchor {
                position,
                range,
                signature: landmark.signature,
            });
            sightings.measurements.push(LandmarkMeasurement {
                range,
                bearing: wrap_angle(offset.y.atan2(offset.x) - self.pose.heading),
                signature: landmark.signature,
            });
        }
        sightings
    }
}

fn noise(std_dev: f32) -> Option<Normal<f32>> {
    if std_dev == 0.0 {
        return None;
    }
    match Normal::new(0.0, std_dev) {
        Ok(normal) => Some(normal),
        Err(e) => {
            warn!("ignoring motion noise {}: {}", std_dev, e);
            None
        }
    }
}

fn sample<R: Rng + ?Sized>(distribution: &Option<Normal<f32>>, rng: &mut R) -> f32 {
    distribution.as_ref().map_or(0.0, |d| d.sample(rng))
}
