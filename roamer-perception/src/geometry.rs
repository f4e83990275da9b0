use nalgebra::{Point2, Vector2, Vector3};
use serde::{Deserialize, Serialize};

use std::f32::consts::{PI, TAU};

/// A point in the world frame (x east, y north).
pub type WorldPoint = Point2<f32>;

/// Wraps an angle in radians to the interval (-π, π].
///
/// Non-finite angles are returned unchanged.
///
/// # Examples
/// ```
/// use roamer_perception::wrap_angle;
/// use std::f32::consts::PI;
///
/// assert!((wrap_angle(2.5 * PI) - PI / 2.0).abs() < 1e-5);
/// assert!((wrap_angle(-PI) - PI).abs() < 1e-6);
/// assert!((wrap_angle(-PI / 2.0) + PI / 2.0).abs() < 1e-6);
/// ```
pub fn wrap_angle(angle: f32) -> f32 {
    if !angle.is_finite() {
        return angle;
    }
    let mut wrapped = angle % TAU;
    if wrapped <= -PI {
        wrapped += TAU;
    } else if wrapped > PI {
        wrapped -= TAU;
    }
    wrapped
}

/// Planar pose of the agent.
///
/// `heading` is measured counter-clockwise from the +x (east) axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub x: f32,
    pub y: f32,
    pub heading: f32,
}

impl Pose {
    /// Creates a pose, wrapping the heading to (-π, π].
    pub fn new(x: f32, y: f32, heading: f32) -> Pose {
        Pose {
            x,
            y,
            heading: wrap_angle(heading),
        }
    }

    pub fn position(&self) -> WorldPoint {
        Point2::new(self.x, self.y)
    }

    /// Unit vector pointing along the heading.
    pub fn forward(&self) -> Vector2<f32> {
        Vector2::new(self.heading.cos(), self.heading.sin())
    }

    /// Bearing of `target` relative to the heading, wrapped to (-π, π].
    /// Positive bearings lie to the left of the agent.
    pub fn bearing_to(&self, target: WorldPoint) -> f32 {
        let global = (target.y - self.y).atan2(target.x - self.x);
        wrap_angle(global - self.heading)
    }

    pub fn distance_to(&self, target: WorldPoint) -> f32 {
        (target - self.position()).norm()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.heading.is_finite()
    }

    pub(crate) fn to_vector(self) -> Vector3<f32> {
        Vector3::new(self.x, self.y, self.heading)
    }

    pub(crate) fn from_vector(state: &Vector3<f32>) -> Pose {
        Pose::new(state.x, state.y, state.z)
    }
}

/// Odometry control input: forward speed and turn rate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Control {
    /// Forward speed in world units per second.
    pub linear: f32,
    /// Counter-clockwise turn rate in radians per second.
    pub angular: f32,
}

impl Control {
    pub fn new(linear: f32, angular: f32) -> Control {
        Control { linear, angular }
    }

    pub fn is_zero(&self) -> bool {
        self.linear == 0.0 && self.angular == 0.0
    }

    pub fn is_finite(&self) -> bool {
        self.linear.is_finite() && self.angular.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn wrap_angle_range() {
        for i in -40..=40 {
            let angle = i as f32 * 0.37;
            let wrapped = wrap_angle(angle);
            assert!(wrapped > -PI - 1e-6 && wrapped <= PI + 1e-6);
            assert_relative_eq!(wrapped.sin(), angle.sin(), epsilon = 1e-4);
            assert_relative_eq!(wrapped.cos(), angle.cos(), epsilon = 1e-4);
        }
    }

    #[test]
    fn heading_zero_faces_east() {
        let pose = Pose::new(0.0, 0.0, 0.0);
        assert_relative_eq!(pose.forward().x, 1.0);
        assert_relative_eq!(pose.forward().y, 0.0);
    }

    #[test]
    fn positive_bearing_is_left() {
        let pose = Pose::new(0.0, 0.0, 0.0);
        // North of an east-facing agent lies to its left.
        assert_relative_eq!(pose.bearing_to(Point2::new(0.0, 5.0)), PI / 2.0, epsilon = 1e-6);
        assert_relative_eq!(pose.bearing_to(Point2::new(0.0, -5.0)), -PI / 2.0, epsilon = 1e-6);
    }

    #[test]
    fn control_zero_and_finite() {
        assert!(Control::default().is_zero());
        assert!(!Control::new(0.0, 0.1).is_zero());
        assert!(!Control::new(f32::NAN, 0.0).is_finite());
    }
}
