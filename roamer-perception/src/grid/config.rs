use serde::{Deserialize, Serialize};

/// Saturation limits for a cell's log-odds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogOddsBounds {
    pub min: f32,
    pub max: f32,
}

/// Layout and sensor model of an [`OccupancyGrid`].
///
/// [`OccupancyGrid`]: crate::grid::OccupancyGrid
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// South-west corner of the mapped area.
    pub min: [f32; 2],
    /// North-east corner of the mapped area.
    pub max: [f32; 2],
    /// Side length of a square cell, in world units.
    pub resolution: f32,
    /// Log-odds every cell starts with.
    pub prior_log_odds: f32,
    /// Log-odds of a cell a beam passed through.
    pub free_log_odds: f32,
    /// Log-odds of a cell a beam ended in.
    pub occupied_log_odds: f32,
    /// Optional saturation. Cells accumulate without bound when `None`.
    pub clamp: Option<LogOddsBounds>,
}

impl Default for GridConfig {
    fn default() -> GridConfig {
        GridConfig {
            min: [-25.0, -25.0],
            max: [25.0, 25.0],
            resolution: 0.5,
            prior_log_odds: 0.0,
            free_log_odds: -0.5,
            occupied_log_odds: 0.5,
            clamp: None,
        }
    }
}
