//! Layer 1: Distance field construction
//!
//! Every free cell learns the position of its nearest solid cell ("seed")
//! through a nearest-seed flood, and the Euclidean distance to it.

pub mod flood;

use crate::grid::OccupancyGrid;
use flood::{RowOrder, UNSEEDED};

/// Pass schedule for the nearest-seed flood.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FloodSchedule {
    /// Exactly two stride-1 serpentine sweeps in opposite directions.
    ///
    /// Cheap and exact for a single seed, but only a local relaxation: with
    /// several sparse seeds on a large grid a cell may settle on a seed that
    /// is not its true nearest.
    #[default]
    TwoSweep,
    /// Log-stride passes (largest power of two below the grid extent down to 2)
    /// followed by the two stride-1 sweeps.
    JumpFlood,
}

/// Counters describing one flood run.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FloodStats {
    pub passes: usize,
    /// Number of per-cell merge operations performed.
    pub merges: usize,
    /// Candidate samples examined per cell (9 per merge).
    pub samples_per_cell: f32,
}

/// Per-cell coordinates of the nearest seed found by the flood.
///
/// Cells that never saw a seed hold [`flood::UNSEEDED`] on both axes.
#[derive(Debug, Clone, PartialEq)]
pub struct NearestSeedField {
    width: usize,
    height: usize,
    xs: Vec<f32>,
    ys: Vec<f32>,
}

impl NearestSeedField {
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn xs(&self) -> &[f32] {
        &self.xs
    }

    pub fn ys(&self) -> &[f32] {
        &self.ys
    }

    /// Nearest seed of `(x, y)`, or `None` if the cell is unseeded.
    pub fn seed(&self, x: usize, y: usize) -> Option<(f32, f32)> {
        let idx = y * self.width + x;
        let (sx, sy) = (self.xs[idx], self.ys[idx]);
        if sx.is_finite() && sy.is_finite() {
            Some((sx, sy))
        } else {
            None
        }
    }

    /// Whether any cell carries a seed.
    pub fn has_seeds(&self) -> bool {
        self.xs.iter().any(|x| x.is_finite())
    }
}

/// Per-cell Euclidean distance to the nearest seed, plus unit normals.
///
/// Distance is exactly `0.0` on solid cells and `f32::INFINITY` on unseeded
/// cells (a grid without solids).
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceField {
    width: usize,
    height: usize,
    distances: Vec<f32>,
    normal_x: Vec<f32>,
    normal_y: Vec<f32>,
}

impl DistanceField {
    /// Derive distances and normals from resolved seed positions.
    pub fn from_seeds(seeds: &NearestSeedField) -> Self {
        let (width, height) = (seeds.width, seeds.height);
        let len = width * height;
        let mut distances = vec![UNSEEDED; len];
        let mut normal_x = vec![0.0f32; len];
        let mut normal_y = vec![0.0f32; len];

        for y in 0..height {
            for x in 0..width {
                let idx = y * width + x;
                let dx = seeds.xs[idx] - x as f32;
                let dy = seeds.ys[idx] - y as f32;
                let dist = (dx * dx + dy * dy).sqrt();
                distances[idx] = dist;

                // Only defined where the cell is off its seed
                if dist != 0.0 && dist.is_finite() {
                    normal_x[idx] = dx / dist;
                    normal_y[idx] = dy / dist;
                }
            }
        }

        Self {
            width,
            height,
            distances,
            normal_x,
            normal_y,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.distances[y * self.width + x]
    }

    #[inline]
    pub fn at(&self, idx: usize) -> f32 {
        self.distances[idx]
    }

    pub fn values(&self) -> &[f32] {
        &self.distances
    }

    /// A cell is solid exactly when it is its own seed.
    #[inline]
    pub fn is_solid_at(&self, idx: usize) -> bool {
        self.distances[idx] == 0.0
    }

    /// Whether the field carries any distance information at all.
    pub fn is_defined(&self) -> bool {
        self.distances.iter().any(|d| d.is_finite())
    }

    /// Unit vector from `(x, y)` toward its nearest seed, for free cells
    /// with a finite nonzero distance.
    pub fn normal(&self, x: usize, y: usize) -> Option<(f32, f32)> {
        let idx = y * self.width + x;
        let d = self.distances[idx];
        if d != 0.0 && d.is_finite() {
            Some((self.normal_x[idx], self.normal_y[idx]))
        } else {
            None
        }
    }
}

/// Builds [`NearestSeedField`] and [`DistanceField`] from an occupancy grid.
#[derive(Debug, Clone, Default)]
pub struct DistanceFieldBuilder {
    pub schedule: FloodSchedule,
}

impl DistanceFieldBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_schedule(schedule: FloodSchedule) -> Self {
        Self { schedule }
    }

    /// Build the seed and distance fields.
    pub fn build(&self, grid: &OccupancyGrid) -> (NearestSeedField, DistanceField) {
        let (seeds, field, _) = self.build_with_stats(grid);
        (seeds, field)
    }

    /// Build the seed and distance fields and report flood counters.
    ///
    /// A grid without solid cells is not an error: every cell stays
    /// unseeded and every distance is infinite.
    pub fn build_with_stats(&self, grid: &OccupancyGrid) -> (NearestSeedField, DistanceField, FloodStats) {
        let (width, height) = (grid.width(), grid.height());
        let len = width * height;
        let mut xs = vec![UNSEEDED; len];
        let mut ys = vec![UNSEEDED; len];
        flood::seed_from_solids(grid.cells(), width, &mut xs, &mut ys);

        let solid_count = grid.solid_count();
        let mut stats = FloodStats::default();

        if solid_count == 0 {
            log::warn!("{}x{} grid has no solid cells; distance field is undefined", width, height);
        } else {
            let mut strides = match self.schedule {
                FloodSchedule::TwoSweep => Vec::new(),
                FloodSchedule::JumpFlood => flood::jump_strides(width, height),
            };
            strides.extend([1, 1]);

            let mut order = RowOrder::BottomUp;
            for stride in strides {
                log::trace!("flood pass {} stride {} {:?}", stats.passes, stride, order);
                stats.merges += flood::serpentine_pass(&mut xs, &mut ys, width, height, stride, order);
                stats.passes += 1;
                order = order.flipped();
            }
        }

        stats.samples_per_cell = if len > 0 {
            (stats.merges as f32 / len as f32) * 9.0
        } else {
            0.0
        };

        log::debug!(
            "{}x{}. {} solids. {} merges. {:.2} samples per cell",
            width,
            height,
            solid_count,
            stats.merges,
            stats.samples_per_cell
        );

        let seeds = NearestSeedField { width, height, xs, ys };
        let field = DistanceField::from_seeds(&seeds);
        (seeds, field, stats)
    }
}

/// Build fields with the default two-sweep schedule.
pub fn build_distance_field(grid: &OccupancyGrid) -> (NearestSeedField, DistanceField) {
    DistanceFieldBuilder::new().build(grid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solid_cells_are_own_seed() {
        let grid = OccupancyGrid::from_ascii(
            "
            #....
            ..#..
            ....#
            ",
        )
        .unwrap();
        let (seeds, field) = build_distance_field(&grid);

        for y in 0..grid.height() {
            for x in 0..grid.width() {
                if grid.is_solid(x, y) {
                    assert_eq!(field.get(x, y), 0.0);
                    assert_eq!(seeds.seed(x, y), Some((x as f32, y as f32)));
                    assert!(field.normal(x, y).is_none());
                }
            }
        }
    }

    #[test]
    fn test_single_seed_exact() {
        let mut grid = OccupancyGrid::new(9, 7).unwrap();
        grid.set(6, 2, true);
        let (seeds, field) = build_distance_field(&grid);
        assert!(seeds.xs().iter().all(|&x| x == 6.0));
        assert!(seeds.ys().iter().all(|&y| y == 2.0));

        for y in 0..7 {
            for x in 0..9 {
                assert_eq!(seeds.seed(x, y), Some((6.0, 2.0)), "cell ({}, {})", x, y);
                let dx = 6.0 - x as f32;
                let dy = 2.0 - y as f32;
                assert_eq!(field.get(x, y), (dx * dx + dy * dy).sqrt());
            }
        }
    }

    #[test]
    fn test_empty_grid_is_undefined() {
        let grid = OccupancyGrid::new(6, 4).unwrap();
        let (seeds, field, stats) = DistanceFieldBuilder::new().build_with_stats(&grid);

        assert!(!seeds.has_seeds());
        assert!(!field.is_defined());
        assert!(field.values().iter().all(|d| *d == f32::INFINITY));
        assert!(field.normal(2, 2).is_none());
        assert_eq!(stats.passes, 0);
    }

    #[test]
    fn test_normals_point_at_seed() {
        let mut grid = OccupancyGrid::new(5, 5).unwrap();
        grid.set(2, 2, true);
        let (_, field) = build_distance_field(&grid);

        assert_eq!(field.normal(0, 2), Some((1.0, 0.0)));
        assert_eq!(field.normal(2, 4), Some((0.0, -1.0)));
        let (nx, ny) = field.normal(4, 4).unwrap();
        assert!((nx + std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-6);
        assert!((ny + std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-6);
    }

    #[test]
    fn test_two_sweep_stats() {
        let mut grid = OccupancyGrid::new(10, 4).unwrap();
        grid.set(0, 0, true);
        let (_, _, stats) = DistanceFieldBuilder::new().build_with_stats(&grid);

        assert_eq!(stats.passes, 2);
        assert_eq!(stats.merges, 80);
        assert!((stats.samples_per_cell - 18.0).abs() < 1e-6);
    }

    #[test]
    fn test_resolved_distances_bound_exact() {
        // Sparse seeds on a wide grid
        let mut grid = OccupancyGrid::new(64, 48).unwrap();
        for &(x, y) in &[(3, 40), (60, 2), (31, 24), (10, 5), (50, 45)] {
            grid.set(x, y, true);
        }

        let (_, two_sweep) = DistanceFieldBuilder::with_schedule(FloodSchedule::TwoSweep).build(&grid);
        let (_, jump, stats) = DistanceFieldBuilder::with_schedule(FloodSchedule::JumpFlood).build_with_stats(&grid);
        assert_eq!(stats.passes, flood::jump_strides(64, 48).len() + 2);

        for idx in 0..grid.len() {
            // Resolved seeds are real solid cells, never closer than the true nearest
            let x = (idx % 64) as f32;
            let y = (idx / 64) as f32;
            let exact = [(3.0, 40.0), (60.0, 2.0), (31.0, 24.0), (10.0, 5.0), (50.0, 45.0)]
                .iter()
                .map(|&(sx, sy): &(f32, f32)| ((sx - x) * (sx - x) + (sy - y) * (sy - y)).sqrt())
                .fold(f32::INFINITY, f32::min);
            assert!(two_sweep.at(idx) >= exact - 1e-4);
            assert!(jump.at(idx) >= exact - 1e-4);
        }
    }
}
