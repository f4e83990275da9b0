//! # Roamer perception
//! State estimation and mapping for a planar wheeled agent.
//!
//! The crate provides the pieces an agent needs to know where it is and
//! what surrounds it:
//! - [`PoseEstimator`]: an extended Kalman filter over `(x, y, heading)`
//!   with identity motion and observation Jacobians.
//! - [`triangulate`]: multilateration of the agent position from ranged
//!   landmark anchors, plus a circular-mean heading estimate.
//! - [`Localizer`]: the per-tick combination of both, correcting the filter
//!   only when a full observation is available.
//! - [`OccupancyGrid`]: a log-odds occupancy map fused from range scans.
//!
//! All components share one frame: `x` grows east, `y` grows north, and
//! headings are radians counter-clockwise from the +x axis, wrapped to
//! (-π, π]. Grid columns follow `x` and rows follow `y`.
//!
//! [`PoseEstimator`]: crate::estimator::PoseEstimator
//! [`triangulate`]: crate::triangulation::triangulate
//! [`Localizer`]: crate::Localizer
//! [`OccupancyGrid`]: crate::grid::OccupancyGrid
//!
//! # Example
//! ```
//! use roamer_perception::estimator::{EstimatorConfig, PoseEstimator, Prediction};
//! use roamer_perception::{Control, Pose};
//!
//! let mut estimator = PoseEstimator::new(Pose::default(), &EstimatorConfig::default());
//! let outcome = estimator.predict(Control::new(1.0, 0.0), 0.5);
//!
//! assert_eq!(outcome, Prediction::Applied);
//! assert!((estimator.pose().x - 0.5).abs() < 1e-6);
//! assert!(estimator.pose().y.abs() < 1e-6);
//! ```
pub mod estimator;
mod geometry;
pub mod grid;
mod localizer;
mod sensors;
pub mod triangulation;

pub use geometry::{wrap_angle, Control, Pose, WorldPoint};
pub use localizer::{LocalizationStep, Localizer};
pub use sensors::{RangeReading, Scan};
