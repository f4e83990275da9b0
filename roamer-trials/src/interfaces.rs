//! The seams between an agent and whatever embodies it.
//!
//! An [`Agent`](crate::agent::Agent) only ever talks to its body through
//! these traits, so the same agent can drive the kinematic simulator in
//! [`world`](crate::world) or any other implementation.
use nalgebra::Vector2;
use roamer_perception::triangulation::{Anchor, LandmarkMeasurement};
use roamer_perception::{Scan, WorldPoint};

/// Accepts normalized motor commands.
pub trait MotionActuator {
    /// Sets the forward drive. Values are clamped to [-1, 1].
    fn drive(&mut self, forward: f32);

    /// Sets the turn rate, positive counter-clockwise.
    /// Values are clamped to [-1, 1].
    fn rotate(&mut self, turn: f32);
}

/// Produces a full range sweep around the body.
pub trait RangeSensor {
    fn scan(&self) -> Scan;
}

/// Landmarks currently visible to the body.
///
/// `anchors[i]` and `measurements[i]` always describe the same landmark.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Sightings {
    pub anchors: Vec<Anchor>,
    pub measurements: Vec<LandmarkMeasurement>,
}

impl Sightings {
    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }
}

pub trait LandmarkSource {
    fn sightings(&self) -> Sightings;
}

/// Read-only geometric queries against the environment.
pub trait ObstacleQuery {
    /// Whether a disc of `radius` around `point` overlaps an obstacle or
    /// leaves the arena.
    fn is_blocked(&self, point: WorldPoint, radius: f32) -> bool;

    /// Distance along the unit `direction` to the first obstacle,
    /// or `None` if nothing is hit within `max_range`.
    fn raycast(&self, origin: WorldPoint, direction: Vector2<f32>, max_range: f32) -> Option<f32>;
}
