//! Log-odds occupancy grid.
//!
//! Each cell stores the log-odds `L` that it is occupied; the
//! probability is recovered as `1 - 1 / (1 + e^L)`. Range scans are
//! fused by walking every beam from the sensor origin: cells the beam
//! passed through become more likely free, and the cell the beam ended
//! in (on a hit) becomes more likely occupied.
mod config;
mod errors;

pub use config::{GridConfig, LogOddsBounds};
pub use errors::GridError;

use crate::geometry::WorldPoint;
use crate::sensors::Scan;

use ahash::AHashSet;
use log::debug;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Column (x) and row (y) of a grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellIndex {
    pub column: usize,
    pub row: usize,
}

impl CellIndex {
    pub fn new(column: usize, row: usize) -> CellIndex {
        CellIndex { column, row }
    }
}

/// Per-scan update statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScanUpdate {
    /// Cells that received a free update.
    pub free_cells: usize,
    /// Cells that received an occupied update.
    pub occupied_cells: usize,
    /// Beam samples that fell outside the grid.
    pub rejected: usize,
    /// Beams ignored because they were not finite.
    pub skipped_beams: usize,
}

/// Converts log-odds to an occupancy probability.
pub fn log_odds_to_probability(log_odds: f32) -> f32 {
    1.0 - 1.0 / (1.0 + log_odds.exp())
}

/// A row-major log-odds map over an axis-aligned world rectangle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OccupancyGrid {
    config: GridConfig,
    width: usize,
    height: usize,
    cells: Vec<f32>,
}

impl OccupancyGrid {
    /// Creates a grid with every cell at the prior.
    ///
    /// Partial cells at the north and east edges are included.
    ///
    /// # Examples
    /// ```
    /// use roamer_perception::grid::{GridConfig, OccupancyGrid};
    ///
    /// let grid = OccupancyGrid::new(GridConfig {
    ///     min: [0.0, 0.0],
    ///     max: [10.0, 4.0],
    ///     resolution: 0.5,
    ///     ..GridConfig::default()
    /// })
    /// .unwrap();
    /// assert_eq!((grid.width(), grid.height()), (20, 8));
    /// ```
    pub fn new(config: GridConfig) -> Result<OccupancyGrid, GridError> {
        if !config.resolution.is_finite() || config.resolution <= 0.0 {
            return Err(GridError::InvalidResolution(config.resolution));
        }
        let span = |axis: usize| (config.max[axis] - config.min[axis]) / config.resolution;
        let (columns, rows) = (span(0), span(1));
        if !(columns.is_finite() && rows.is_finite() && columns > 0.0 && rows > 0.0) {
            return Err(GridError::EmptyBounds {
                min: config.min,
                max: config.max,
            });
        }
        let (width, height) = (columns.ceil() as usize, rows.ceil() as usize);
        Ok(OccupancyGrid {
            cells: vec![config.prior_log_odds; width * height],
            config,
            width,
            height,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Raw log-odds, row-major from the south-west corner.
    pub fn cells(&self) -> &[f32] {
        &self.cells
    }

    /// Cell containing `point`, or `None` outside the grid.
    pub fn world_to_grid(&self, point: WorldPoint) -> Option<CellIndex> {
        let (column, row) = self.signed_cell(point)?;
        if column < 0 || row < 0 || column >= self.width as i64 || row >= self.height as i64 {
            return None;
        }
        Some(CellIndex::new(column as usize, row as usize))
    }

    /// World position of the centre of `cell`, or `None` outside the grid.
    pub fn grid_to_world(&self, cell: CellIndex) -> Option<WorldPoint> {
        self.in_bounds(cell)?;
        let resolution = self.config.resolution;
        Some(Point2::new(
            self.config.min[0] + (cell.column as f32 + 0.5) * resolution,
            self.config.min[1] + (cell.row as f32 + 0.5) * resolution,
        ))
    }

    pub fn log_odds(&self, cell: CellIndex) -> Option<f32> {
        self.in_bounds(cell).map(|i| self.cells[i])
    }

    pub fn probability_occupied(&self, cell: CellIndex) -> Option<f32> {
        self.log_odds(cell).map(log_odds_to_probability)
    }

    pub fn probability_at(&self, point: WorldPoint) -> Option<f32> {
        self.world_to_grid(point)
            .and_then(|cell| self.probability_occupied(cell))
    }

    /// Fuses a scan taken from `origin`.
    ///
    /// Each beam is sampled every `step_size` world units, stopping short
    /// of its measured distance (or the sensor max range on a miss).
    /// Within one scan a cell is updated at most once, and a cell some
    /// beam ended in is updated as occupied even if another beam passed
    /// through it.
    pub fn update(
        &mut self,
        scan: &Scan,
        origin: WorldPoint,
        step_size: f32,
    ) -> Result<ScanUpdate, GridError> {
        if !step_size.is_finite() || step_size <= 0.0 {
            return Err(GridError::InvalidStepSize(step_size));
        }
        let mut stats = ScanUpdate::default();
        if !(origin.x.is_finite() && origin.y.is_finite()) {
            stats.skipped_beams = scan.readings.len();
            return Ok(stats);
        }

        let mut occupied = Vec::new();
        let mut occupied_seen = AHashSet::new();
        let mut free = Vec::new();
        let mut free_seen = AHashSet::new();

        for reading in &scan.readings {
            let distance = if reading.hit {
                reading.distance
            } else {
                scan.max_range
            };
            if !reading.is_finite() || !distance.is_finite() || distance < 0.0 {
                stats.skipped_beams += 1;
                continue;
            }

            if reading.hit {
                match self.world_to_grid(reading.hit_point) {
                    Some(cell) => {
                        if occupied_seen.insert(cell) {
                            occupied.push(cell);
                        }
                    }
                    None => stats.rejected += 1,
                }
            }

            let steps = (distance / step_size).ceil() as usize;
            for i in 1..steps {
                let sample = origin + reading.direction * (i as f32 * step_size);
                match self.world_to_grid(sample) {
                    Some(cell) => {
                        if free_seen.insert(cell) {
                            free.push(cell);
                        }
                    }
                    None => stats.rejected += 1,
                }
            }
        }

        let free_delta = self.config.free_log_odds - self.config.prior_log_odds;
        let occupied_delta = self.config.occupied_log_odds - self.config.prior_log_odds;
        for cell in free.into_iter().filter(|c| !occupied_seen.contains(c)) {
            self.apply(cell, free_delta);
            stats.free_cells += 1;
        }
        for cell in occupied {
            self.apply(cell, occupied_delta);
            stats.occupied_cells += 1;
        }

        if stats.rejected > 0 {
            debug!("{} beam samples fell outside the grid", stats.rejected);
        }
        Ok(stats)
    }

    /// Occupancy probabilities of a `size`×`size` window centred on
    /// `center`, sampling every `stride` cells. Rows run south to north,
    /// columns west to east. Samples outside the grid report the prior.
    pub fn local_window(&self, center: WorldPoint, size: usize, stride: usize) -> Vec<f32> {
        let prior = log_odds_to_probability(self.config.prior_log_odds);
        let (center_column, center_row) = match self.signed_cell(center) {
            Some(cell) => cell,
            None => return vec![prior; size * size],
        };
        let stride = stride.max(1) as i64;
        let half = (size / 2) as i64;

        let mut window = Vec::with_capacity(size * size);
        for dy in 0..size as i64 {
            for dx in 0..size as i64 {
                let column = center_column + (dx - half) * stride;
                let row = center_row + (dy - half) * stride;
                let probability = if column >= 0 && row >= 0 {
                    self.probability_occupied(CellIndex::new(column as usize, row as usize))
                } else {
                    None
                };
                window.push(probability.unwrap_or(prior));
            }
        }
        window
    }

    fn signed_cell(&self, point: WorldPoint) -> Option<(i64, i64)> {
        if !(point.x.is_finite() && point.y.is_finite()) {
            return None;
        }
        let resolution = self.config.resolution;
        Some((
            ((point.x - self.config.min[0]) / resolution).floor() as i64,
            ((point.y - self.config.min[1]) / resolution).floor() as i64,
        ))
    }

    fn in_bounds(&self, cell: CellIndex) -> Option<usize> {
        (cell.column < self.width && cell.row < self.height)
            .then(|| cell.row * self.width + cell.column)
    }

    fn apply(&mut self, cell: CellIndex, delta: f32) {
        if let Some(i) = self.in_bounds(cell) {
            let mut value = self.cells[i] + delta;
            if let Some(bounds) = self.config.clamp {
                value = value.clamp(bounds.min, bounds.max);
            }
            self.cells[i] = value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensors::RangeReading;
    use approx::assert_relative_eq;
    use nalgebra::Vector2;

    fn unit_grid() -> OccupancyGrid {
        OccupancyGrid::new(GridConfig {
            min: [0.0, 0.0],
            max: [10.0, 10.0],
            resolution: 1.0,
            ..GridConfig::default()
        })
        .unwrap()
    }

    fn diagonal_scan() -> Scan {
        Scan::new(
            5.0,
            vec![RangeReading {
                direction: Vector2::new(1.0, 1.0).normalize(),
                hit: true,
                distance: 8f32.sqrt(),
                hit_point: Point2::new(2.0, 2.0),
            }],
        )
    }

    #[test]
    fn rejects_bad_layouts() {
        let bad_resolution = GridConfig {
            resolution: 0.0,
            ..GridConfig::default()
        };
        assert_eq!(
            OccupancyGrid::new(bad_resolution),
            Err(GridError::InvalidResolution(0.0))
        );
        let inverted = GridConfig {
            min: [1.0, 1.0],
            max: [0.0, 5.0],
            ..GridConfig::default()
        };
        assert!(matches!(
            OccupancyGrid::new(inverted),
            Err(GridError::EmptyBounds { .. })
        ));
    }

    #[test]
    fn diagonal_beam_marks_free_then_occupied() {
        let mut grid = unit_grid();
        let stats = grid.update(&diagonal_scan(), Point2::new(0.0, 0.0), 1.0).unwrap();

        assert_eq!(stats.free_cells, 2);
        assert_eq!(stats.occupied_cells, 1);
        assert_eq!(grid.log_odds(CellIndex::new(0, 0)), Some(-0.5));
        assert_eq!(grid.log_odds(CellIndex::new(1, 1)), Some(-0.5));
        assert_eq!(grid.log_odds(CellIndex::new(2, 2)), Some(0.5));
        let touched = grid.cells().iter().filter(|&&l| l != 0.0).count();
        assert_eq!(touched, 3);
    }

    #[test]
    fn fusion_is_deterministic_and_additive() {
        let mut once = unit_grid();
        let mut again = unit_grid();
        once.update(&diagonal_scan(), Point2::new(0.0, 0.0), 1.0).unwrap();
        again.update(&diagonal_scan(), Point2::new(0.0, 0.0), 1.0).unwrap();
        assert_eq!(once, again);

        again.update(&diagonal_scan(), Point2::new(0.0, 0.0), 1.0).unwrap();
        assert_eq!(again.log_odds(CellIndex::new(1, 1)), Some(-1.0));
        assert_eq!(again.log_odds(CellIndex::new(2, 2)), Some(1.0));
    }

    #[test]
    fn east_beam_walks_columns() {
        let mut grid = unit_grid();
        let origin = Point2::new(0.5, 0.5);
        let scan = Scan::new(
            5.0,
            vec![RangeReading::hit(origin, Vector2::new(1.0, 0.0), 3.0)],
        );
        grid.update(&scan, origin, 1.0).unwrap();

        assert_eq!(grid.log_odds(CellIndex::new(1, 0)), Some(-0.5));
        assert_eq!(grid.log_odds(CellIndex::new(2, 0)), Some(-0.5));
        assert_eq!(grid.log_odds(CellIndex::new(3, 0)), Some(0.5));
        // An axis swap would have written into row 1..3 of column 0.
        assert_eq!(grid.log_odds(CellIndex::new(0, 3)), Some(0.0));
    }

    #[test]
    fn occupied_wins_within_a_scan() {
        let mut grid = unit_grid();
        let origin = Point2::new(0.5, 0.5);
        let scan = Scan::new(
            5.0,
            vec![
                // Passes through (2, 0) on the way to (4, 0).
                RangeReading::hit(origin, Vector2::new(1.0, 0.0), 4.0),
                // Ends in (2, 0).
                RangeReading::hit(origin, Vector2::new(1.0, 0.0), 2.0),
            ],
        );
        let stats = grid.update(&scan, origin, 1.0).unwrap();

        assert_eq!(grid.log_odds(CellIndex::new(2, 0)), Some(0.5));
        assert_eq!(grid.log_odds(CellIndex::new(1, 0)), Some(-0.5));
        assert_eq!(grid.log_odds(CellIndex::new(3, 0)), Some(-0.5));
        assert_eq!(grid.log_odds(CellIndex::new(4, 0)), Some(0.5));
        assert_eq!(stats.occupied_cells, 2);
        assert_eq!(stats.free_cells, 2);
    }

    #[test]
    fn misses_walk_to_max_range_without_occupying() {
        let mut grid = unit_grid();
        let origin = Point2::new(0.5, 0.5);
        let scan = Scan::new(
            4.0,
            vec![RangeReading::miss(origin, Vector2::new(0.0, 1.0), 4.0)],
        );
        let stats = grid.update(&scan, origin, 1.0).unwrap();
        assert_eq!(stats.occupied_cells, 0);
        assert_eq!(stats.free_cells, 3);
        assert_eq!(grid.log_odds(CellIndex::new(0, 3)), Some(-0.5));
        assert_eq!(grid.log_odds(CellIndex::new(0, 4)), Some(0.0));
    }

    #[test]
    fn out_of_bounds_samples_are_rejected() {
        let mut grid = unit_grid();
        let origin = Point2::new(0.5, 0.5);
        let scan = Scan::new(
            5.0,
            vec![RangeReading::hit(origin, Vector2::new(-1.0, 0.0), 3.0)],
        );
        let stats = grid.update(&scan, origin, 1.0).unwrap();
        // Two free samples and the hit all lie west of the grid.
        assert_eq!(stats.rejected, 3);
        assert!(grid.cells().iter().all(|&l| l == 0.0));
    }

    #[test]
    fn non_finite_beams_are_skipped() {
        let mut grid = unit_grid();
        let origin = Point2::new(0.5, 0.5);
        let mut reading = RangeReading::hit(origin, Vector2::new(1.0, 0.0), 2.0);
        reading.distance = f32::NAN;
        let stats = grid.update(&Scan::new(5.0, vec![reading]), origin, 1.0).unwrap();
        assert_eq!(stats.skipped_beams, 1);
        assert!(grid.cells().iter().all(|&l| l == 0.0));
        assert!(grid.update(&Scan::default(), origin, 0.0).is_err());
    }

    #[test]
    fn clamp_saturates_log_odds() {
        let mut grid = OccupancyGrid::new(GridConfig {
            min: [0.0, 0.0],
            max: [10.0, 10.0],
            resolution: 1.0,
            clamp: Some(LogOddsBounds { min: -1.0, max: 1.0 }),
            ..GridConfig::default()
        })
        .unwrap();
        for _ in 0..5 {
            grid.update(&diagonal_scan(), Point2::new(0.0, 0.0), 1.0).unwrap();
        }
        assert_eq!(grid.log_odds(CellIndex::new(2, 2)), Some(1.0));
        assert_eq!(grid.log_odds(CellIndex::new(1, 1)), Some(-1.0));
    }

    #[test]
    fn probability_tracks_log_odds() {
        let mut grid = unit_grid();
        let cell = CellIndex::new(2, 2);
        assert_relative_eq!(grid.probability_occupied(cell).unwrap(), 0.5);

        let mut previous = 0.5;
        for _ in 0..10 {
            grid.update(&diagonal_scan(), Point2::new(0.0, 0.0), 1.0).unwrap();
            let p = grid.probability_occupied(cell).unwrap();
            assert!(p > previous && p < 1.0);
            previous = p;
        }
        assert!(grid.probability_occupied(CellIndex::new(1, 1)).unwrap() < 0.5);
    }

    #[test]
    fn world_grid_round_trip() {
        let grid = OccupancyGrid::new(GridConfig {
            min: [-3.0, 2.0],
            max: [4.0, 7.5],
            resolution: 0.25,
            ..GridConfig::default()
        })
        .unwrap();
        for row in 0..grid.height() {
            for column in 0..grid.width() {
                let cell = CellIndex::new(column, row);
                let centre = grid.grid_to_world(cell).unwrap();
                assert_eq!(grid.world_to_grid(centre), Some(cell));
            }
        }
        assert_eq!(grid.world_to_grid(Point2::new(-3.1, 3.0)), None);
        assert_eq!(grid.world_to_grid(Point2::new(0.0, 7.6)), None);
        assert_eq!(grid.grid_to_world(CellIndex::new(grid.width(), 0)), None);
    }

    #[test]
    fn columns_follow_x_rows_follow_y() {
        let grid = unit_grid();
        assert_eq!(
            grid.world_to_grid(Point2::new(7.5, 1.5)),
            Some(CellIndex::new(7, 1))
        );
    }

    #[test]
    fn local_window_is_centered_and_padded() {
        let mut grid = unit_grid();
        grid.update(&diagonal_scan(), Point2::new(0.0, 0.0), 1.0).unwrap();

        let window = grid.local_window(Point2::new(2.5, 2.5), 3, 1);
        assert_eq!(window.len(), 9);
        // Centre of the window is the occupied cell.
        assert!(window[4] > 0.5);
        // South-west corner is the free cell (1, 1).
        assert!(window[0] < 0.5);

        let padded = grid.local_window(Point2::new(0.5, 0.5), 3, 2);
        assert_relative_eq!(padded[0], 0.5);
    }
}
