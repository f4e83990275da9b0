use crate::geometry::WorldPoint;

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// A single range-finder beam.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RangeReading {
    /// World-frame unit direction of the beam.
    pub direction: Vector2<f32>,
    /// Whether the beam struck something before its maximum range.
    pub hit: bool,
    /// Distance to the hit, or the sensor's max range on a miss.
    pub distance: f32,
    /// World position of the beam end.
    pub hit_point: WorldPoint,
}

impl RangeReading {
    /// A beam from `origin` that struck an obstacle at `distance`.
    pub fn hit(origin: WorldPoint, direction: Vector2<f32>, distance: f32) -> RangeReading {
        RangeReading {
            direction,
            hit: true,
            distance,
            hit_point: origin + direction * distance,
        }
    }

    /// A beam from `origin` that reached `max_range` without a hit.
    pub fn miss(origin: WorldPoint, direction: Vector2<f32>, max_range: f32) -> RangeReading {
        RangeReading {
            direction,
            hit: false,
            distance: max_range,
            hit_point: origin + direction * max_range,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.direction.iter().all(|v| v.is_finite())
            && self.distance.is_finite()
            && self.hit_point.iter().all(|v| v.is_finite())
    }
}

/// An ordered sweep of range readings.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Scan {
    pub max_range: f32,
    pub readings: Vec<RangeReading>,
}

impl Scan {
    pub fn new(max_range: f32, readings: Vec<RangeReading>) -> Scan {
        Scan {
            max_range,
            readings,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.max_range.is_finite() && self.readings.iter().all(RangeReading::is_finite)
    }

    /// Beam distances divided by the max range, clamped to [0, 1].
    pub fn normalized_ranges(&self) -> impl Iterator<Item = f32> + '_ {
        let max_range = self.max_range;
        self.readings.iter().map(move |r| {
            if max_range > 0.0 {
                (r.distance / max_range).clamp(0.0, 1.0)
            } else {
                0.0
            }
        })
    }
}
