//! Landmark multilateration.
//!
//! Position is recovered from the range circles of three or more
//! anchors. Subtracting the first anchor's circle equation from the
//! other two linearises a triple into a 2×2 system, which is solved by
//! Cramer's rule. With more than three anchors every triple is solved
//! and the valid estimates are averaged. Heading is then recovered from
//! the bearings the agent measured to the same anchors.
use crate::geometry::{wrap_angle, Pose, WorldPoint};

use log::debug;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// A landmark with a known world position, paired with
/// the range at which the agent currently sees it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    pub position: WorldPoint,
    pub range: f32,
    pub signature: u32,
}

/// What the agent measured about a landmark.
/// The bearing is relative to the agent's heading.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LandmarkMeasurement {
    pub range: f32,
    pub bearing: f32,
    pub signature: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriangulationConfig {
    /// Triples whose linear system has a determinant smaller than this
    /// are considered collinear and skipped.
    pub singularity_threshold: f64,
}

impl Default for TriangulationConfig {
    fn default() -> TriangulationConfig {
        TriangulationConfig {
            singularity_threshold: 1e-6,
        }
    }
}

/// Result of a triangulation attempt.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Triangulation {
    /// Averaged position estimate, if any triple was solvable.
    pub position: Option<WorldPoint>,
    /// Circular-mean heading estimate, if a position and
    /// at least two anchor/measurement pairs exist.
    pub heading: Option<f32>,
    /// Number of anchor triples that produced a position.
    pub solved_subsets: usize,
}

impl Triangulation {
    /// The full pose observation, if both position and heading exist.
    pub fn observation(&self) -> Option<Pose> {
        match (self.position, self.heading) {
            (Some(p), Some(heading)) => Some(Pose::new(p.x, p.y, heading)),
            _ => None,
        }
    }
}

/// Triangulates the agent's pose from anchors and the matching
/// measurements. `anchors[i]` and `measurements[i]` must describe the
/// same landmark.
///
/// # Examples
/// ```
/// use nalgebra::Point2;
/// use roamer_perception::triangulation::{triangulate, Anchor, TriangulationConfig};
///
/// let anchor = |x: f32, y: f32, range: f32| Anchor {
///     position: Point2::new(x, y),
///     range,
///     signature: 0,
/// };
/// let anchors = [
///     anchor(0.0, 0.0, 5.0),
///     anchor(10.0, 0.0, 65f32.sqrt()),
///     anchor(0.0, 10.0, 45f32.sqrt()),
/// ];
///
/// let result = triangulate(&anchors, &[], &TriangulationConfig::default());
/// let position = result.position.unwrap();
/// assert!((position.x - 3.0).abs() < 1e-3);
/// assert!((position.y - 4.0).abs() < 1e-3);
/// // No bearings were supplied.
/// assert!(result.heading.is_none());
/// ```
pub fn triangulate(
    anchors: &[Anchor],
    measurements: &[LandmarkMeasurement],
    config: &TriangulationConfig,
) -> Triangulation {
    let (position, solved_subsets) = match multilaterate(anchors, config) {
        Some((position, solved)) => (Some(position), solved),
        None => (None, 0),
    };
    let heading = position.and_then(|p| estimate_heading(p, anchors, measurements));
    Triangulation {
        position,
        heading,
        solved_subsets,
    }
}

/// Averages the positions solved from every anchor triple.
///
/// Returns the estimate together with the number of triples that
/// contributed, or `None` with fewer than three anchors or when every
/// triple is singular.
pub fn multilaterate(
    anchors: &[Anchor],
    config: &TriangulationConfig,
) -> Option<(WorldPoint, usize)> {
    if anchors.len() < 3 {
        return None;
    }

    let (mut sum_x, mut sum_y, mut solved) = (0.0f64, 0.0f64, 0usize);
    for i in 0..anchors.len() {
        for j in i + 1..anchors.len() {
            for k in j + 1..anchors.len() {
                match solve_triple(
                    [&anchors[i], &anchors[j], &anchors[k]],
                    config.singularity_threshold,
                ) {
                    Some((x, y)) => {
                        sum_x += x;
                        sum_y += y;
                        solved += 1;
                    }
                    None => debug!("skipping singular anchor triple ({}, {}, {})", i, j, k),
                }
            }
        }
    }

    if solved == 0 {
        return None;
    }
    let n = solved as f64;
    Some((Point2::new((sum_x / n) as f32, (sum_y / n) as f32), solved))
}

fn solve_triple(triple: [&Anchor; 3], threshold: f64) -> Option<(f64, f64)> {
    let [first, second, third] = triple;
    let (x1, y1, r1) = components(first)?;
    let row = |anchor: &Anchor| -> Option<(f64, f64, f64)> {
        let (xi, yi, ri) = components(anchor)?;
        Some((
            2.0 * (xi - x1),
            2.0 * (yi - y1),
            xi * xi - x1 * x1 + yi * yi - y1 * y1 + r1 * r1 - ri * ri,
        ))
    };
    let (a1, b1, c1) = row(second)?;
    let (a2, b2, c2) = row(third)?;

    let det = a1 * b2 - a2 * b1;
    if det.abs() < threshold {
        return None;
    }
    let x = (c1 * b2 - c2 * b1) / det;
    let y = (a1 * c2 - a2 * c1) / det;
    (x.is_finite() && y.is_finite()).then(|| (x, y))
}

fn components(anchor: &Anchor) -> Option<(f64, f64, f64)> {
    let (x, y, r) = (
        anchor.position.x as f64,
        anchor.position.y as f64,
        anchor.range as f64,
    );
    (x.is_finite() && y.is_finite() && r.is_finite()).then(|| (x, y, r))
}

/// Circular mean of `global bearing - measured bearing` over all
/// anchor/measurement pairs. Pairs with mismatched signatures or
/// non-finite bearings are ignored; at least two usable pairs are needed.
pub fn estimate_heading(
    position: WorldPoint,
    anchors: &[Anchor],
    measurements: &[LandmarkMeasurement],
) -> Option<f32> {
    let (mut sum_sin, mut sum_cos, mut used) = (0.0f32, 0.0f32, 0usize);
    for (anchor, measurement) in anchors.iter().zip(measurements) {
        if anchor.signature != measurement.signature || !measurement.bearing.is_finite() {
            continue;
        }
        let global = (anchor.position.y - position.y).atan2(anchor.position.x - position.x);
        let candidate = wrap_angle(global - measurement.bearing);
        sum_sin += candidate.sin();
        sum_cos += candidate.cos();
        used += 1;
    }

    if used < 2 || (sum_sin.abs() < f32::EPSILON && sum_cos.abs() < f32::EPSILON) {
        return None;
    }
    Some(wrap_angle(sum_sin.atan2(sum_cos)))
}
