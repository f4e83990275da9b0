//! A kinematic stand-in for a physics engine: circular obstacles in a
//! walled square arena, point landmarks, and a noisy unicycle body.
mod body;
mod config;

pub use body::SimulatedBody;
pub use config::{BodyConfig, CircleObstacle, Landmark, LidarConfig, SpawnConfig, WorldConfig};

use crate::interfaces::ObstacleQuery;

use log::debug;
use nalgebra::{Point2, Vector2};
use rand::Rng;
use roamer_perception::{Pose, WorldPoint};
use std::f32::consts::PI;

/// Where a trial starts and what it drives towards.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Scenario {
    pub start: Pose,
    pub goal: WorldPoint,
}

/// The static environment shared by every trial of a generation.
#[derive(Clone, Debug)]
pub struct World {
    config: WorldConfig,
}

impl World {
    pub fn new(config: WorldConfig) -> World {
        World { config }
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Extent of the arena along x and y.
    pub fn size(&self) -> Vector2<f32> {
        Vector2::repeat(2.0 * self.config.half_extent)
    }

    pub fn landmarks(&self) -> &[Landmark] {
        &self.config.landmarks
    }

    /// Whether the straight segment between `from` and `to` is clear of
    /// obstacles and walls.
    pub fn line_of_sight(&self, from: WorldPoint, to: WorldPoint) -> bool {
        let offset = to - from;
        let distance = offset.norm();
        if distance <= f32::EPSILON {
            return true;
        }
        match self.raycast(from, offset / distance, distance) {
            Some(hit) => hit >= distance - 1e-3,
            None => true,
        }
    }

    /// Draws a shared start pose and goal for one generation.
    ///
    /// Both points are drawn uniformly from the spawn disc and must be far
    /// enough apart, with the start and the goal clear of obstacles by
    /// their respective clearances. The start heading is uniform.
    /// Returns `None` if no valid pair was found within the attempt limit.
    pub fn sample_scenario<R: Rng + ?Sized>(
        &self,
        spawn: &SpawnConfig,
        rng: &mut R,
    ) -> Option<Scenario> {
        let min_separation = spawn.min_separation * spawn.radius;
        for attempt in 0..spawn.max_attempts {
            let start = sample_disc(spawn.radius, rng);
            let goal = sample_disc(spawn.radius, rng);
            if (goal - start).norm() >= min_separation
                && !self.is_blocked(start, spawn.spawn_clearance)
                && !self.is_blocked(goal, spawn.goal_clearance)
            {
                debug!("scenario found after {} attempts", attempt + 1);
                let heading = rng.gen_range(-PI..PI);
                return Some(Scenario {
                    start: Pose::new(start.x, start.y, heading),
                    goal,
                });
            }
        }
        None
    }
}

impl ObstacleQuery for World {
    fn is_blocked(&self, point: WorldPoint, radius: f32) -> bool {
        let h = self.config.half_extent;
        if point.x - radius < -h || point.x + radius > h || point.y - radius < -h || point.y + radius > h {
            return true;
        }
        self.config.obstacles.iter().any(|obstacle| {
            (point - Point2::from(obstacle.center)).norm() < radius + obstacle.radius
        })
    }

    fn raycast(&self, origin: WorldPoint, direction: Vector2<f32>, max_range: f32) -> Option<f32> {
        let walls = wall_distance(origin, direction, self.config.half_extent);
        self.config
            .obstacles
            .iter()
            .filter_map(|obstacle| circle_distance(origin, direction, obstacle))
            .chain(walls)
            .filter(|&t| t <= max_range)
            .min_by(f32::total_cmp)
    }
}

fn sample_disc<R: Rng + ?Sized>(radius: f32, rng: &mut R) -> WorldPoint {
    let r = radius * rng.gen::<f32>().sqrt();
    let angle = rng.gen_range(-PI..PI);
    Point2::new(r * angle.cos(), r * angle.sin())
}

/// Distance to a circle along a unit ray; zero when starting inside it.
fn circle_distance(origin: WorldPoint, direction: Vector2<f32>, obstacle: &CircleObstacle) -> Option<f32> {
    let m = origin - Point2::from(obstacle.center);
    let b = m.dot(&direction);
    let c = m.norm_squared() - obstacle.radius * obstacle.radius;
    if c <= 0.0 {
        return Some(0.0);
    }
    if b > 0.0 {
        return None;
    }
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }
    Some(-b - discriminant.sqrt())
}

/// Distance to the arena boundary along a unit ray.
fn wall_distance(origin: WorldPoint, direction: Vector2<f32>, half_extent: f32) -> Option<f32> {
    let axis = |position: f32, component: f32| {
        if component > 0.0 {
            Some((half_extent - position) / component)
        } else if component < 0.0 {
            Some((-half_extent - position) / component)
        } else {
            None
        }
    };
    [axis(origin.x, direction.x), axis(origin.y, direction.y)]
        .into_iter()
        .flatten()
        .map(|t| t.max(0.0))
        .min_by(f32::total_cmp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use roamer::rng;

    fn arena(obstacles: Vec<CircleObstacle>) -> World {
        World::new(WorldConfig {
            half_extent: 10.0,
            obstacles,
            landmarks: vec![],
            detection_radius: 10.0,
        })
    }

    fn obstacle(x: f32, y: f32, radius: f32) -> CircleObstacle {
        CircleObstacle {
            center: [x, y],
            radius,
        }
    }

    #[test]
    fn rays_reach_the_walls_along_each_axis() {
        let world = arena(vec![]);
        let origin = Point2::new(2.0, -3.0);
        assert_relative_eq!(world.raycast(origin, Vector2::x(), 50.0).unwrap(), 8.0);
        assert_relative_eq!(world.raycast(origin, -Vector2::x(), 50.0).unwrap(), 12.0);
        assert_relative_eq!(world.raycast(origin, Vector2::y(), 50.0).unwrap(), 13.0);
        assert_relative_eq!(world.raycast(origin, -Vector2::y(), 50.0).unwrap(), 7.0);
        assert_eq!(world.raycast(origin, Vector2::x(), 5.0), None);
    }

    #[test]
    fn rays_stop_at_the_nearest_obstacle() {
        let world = arena(vec![obstacle(5.0, 0.0, 1.0), obstacle(3.0, 0.0, 0.5)]);
        let hit = world.raycast(Point2::origin(), Vector2::x(), 20.0).unwrap();
        assert_relative_eq!(hit, 2.5, epsilon = 1e-5);
        assert_eq!(world.raycast(Point2::origin(), Vector2::y(), 5.0), None);
    }

    #[test]
    fn rays_from_inside_an_obstacle_hit_immediately() {
        let world = arena(vec![obstacle(0.0, 0.0, 1.0)]);
        assert_eq!(world.raycast(Point2::new(0.2, 0.0), Vector2::x(), 5.0), Some(0.0));
    }

    #[test]
    fn blocking_accounts_for_radius() {
        let world = arena(vec![obstacle(0.0, 0.0, 1.0)]);
        assert!(world.is_blocked(Point2::new(1.5, 0.0), 0.6));
        assert!(!world.is_blocked(Point2::new(1.5, 0.0), 0.4));
        assert!(world.is_blocked(Point2::new(9.7, 0.0), 0.5));
        assert!(!world.is_blocked(Point2::new(9.0, 5.0), 0.5));
    }

    #[test]
    fn obstacles_occlude_line_of_sight() {
        let world = arena(vec![obstacle(0.0, 0.0, 1.0)]);
        assert!(!world.line_of_sight(Point2::new(-5.0, 0.0), Point2::new(5.0, 0.0)));
        assert!(world.line_of_sight(Point2::new(-5.0, 3.0), Point2::new(5.0, 3.0)));
    }

    #[test]
    fn scenarios_respect_spacing_and_clearance() {
        let world = World::new(WorldConfig::default());
        let spawn = SpawnConfig::default();
        let mut rng = rng::seeded(3);
        for _ in 0..50 {
            let scenario = world.sample_scenario(&spawn, &mut rng).unwrap();
            let start = scenario.start.position();
            assert!((scenario.goal - start).norm() >= spawn.radius / 3.0);
            assert!(start.coords.norm() <= spawn.radius);
            assert!(!world.is_blocked(start, spawn.spawn_clearance));
            assert!(!world.is_blocked(scenario.goal, spawn.goal_clearance));
        }
    }

    #[test]
    fn impossible_scenarios_give_up() {
        let world = arena(vec![obstacle(0.0, 0.0, 9.0)]);
        let spawn = SpawnConfig {
            radius: 5.0,
            ..SpawnConfig::default()
        };
        assert_eq!(world.sample_scenario(&spawn, &mut rng::seeded(0)), None);
    }
}
