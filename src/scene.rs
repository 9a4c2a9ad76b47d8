//! Frame context: owns the occupancy grid and every derived buffer, and
//! rebuilds only what the last edits invalidated.
//!
//! Geometry edits invalidate the distance field and the light field; moving
//! the light or changing the config invalidates only the light field.

use rand::Rng;

use crate::blur::blur_light_field;
use crate::distance::{DistanceField, DistanceFieldBuilder, FloodSchedule, FloodStats, NearestSeedField};
use crate::grid::{GridError, OccupancyGrid};
use crate::light::{LightConfig, LightField, render_light_field};

/// Which stages a call to [`ShadowScene::rebuild`] ran.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RebuildOutcome {
    pub distance_rebuilt: bool,
    pub light_rendered: bool,
}

/// Grid, light, config and the fields derived from them.
#[derive(Debug, Clone)]
pub struct ShadowScene {
    grid: OccupancyGrid,
    config: LightConfig,
    builder: DistanceFieldBuilder,
    light: (isize, isize),
    seeds: NearestSeedField,
    distance: DistanceField,
    light_field: LightField,
    flood_stats: FloodStats,
    geometry_dirty: bool,
    lighting_dirty: bool,
}

impl ShadowScene {
    /// Create a scene and build its distance field. The light field is
    /// rendered on the first [`rebuild`](Self::rebuild).
    pub fn new(grid: OccupancyGrid, config: LightConfig, light: (isize, isize)) -> Self {
        let builder = DistanceFieldBuilder::new();
        let (seeds, distance, flood_stats) = builder.build_with_stats(&grid);
        let light_field = LightField::zeroed(grid.width(), grid.height());
        Self {
            grid,
            config,
            builder,
            light,
            seeds,
            distance,
            light_field,
            flood_stats,
            geometry_dirty: false,
            lighting_dirty: true,
        }
    }

    pub fn grid(&self) -> &OccupancyGrid {
        &self.grid
    }

    pub fn config(&self) -> &LightConfig {
        &self.config
    }

    pub fn light(&self) -> (isize, isize) {
        self.light
    }

    pub fn seeds(&self) -> &NearestSeedField {
        &self.seeds
    }

    pub fn distance_field(&self) -> &DistanceField {
        &self.distance
    }

    pub fn light_field(&self) -> &LightField {
        &self.light_field
    }

    pub fn flood_stats(&self) -> FloodStats {
        self.flood_stats
    }

    pub fn is_dirty(&self) -> bool {
        self.geometry_dirty || self.lighting_dirty
    }

    /// Mutable access to the grid. Always marks the geometry dirty.
    pub fn grid_mut(&mut self) -> &mut OccupancyGrid {
        self.mark_geometry_dirty();
        &mut self.grid
    }

    /// Set one cell. Returns `false` if `(x, y)` is outside the grid.
    pub fn set_solid(&mut self, x: usize, y: usize, solid: bool) -> bool {
        if x >= self.grid.width() || y >= self.grid.height() {
            return false;
        }
        if self.grid.is_solid(x, y) != solid {
            self.grid.set(x, y, solid);
            self.mark_geometry_dirty();
        }
        true
    }

    /// Swap in a whole new grid of the same dimensions.
    pub fn replace_grid(&mut self, grid: OccupancyGrid) -> Result<(), GridError> {
        let expected = (self.grid.width(), self.grid.height());
        let actual = (grid.width(), grid.height());
        if expected != actual {
            return Err(GridError::DimensionMismatch { expected, actual });
        }
        self.grid = grid;
        self.mark_geometry_dirty();
        Ok(())
    }

    pub fn set_light(&mut self, x: isize, y: isize) {
        if self.light != (x, y) {
            self.light = (x, y);
            self.lighting_dirty = true;
        }
    }

    pub fn set_config(&mut self, config: LightConfig) {
        if self.config != config {
            self.config = config;
            self.lighting_dirty = true;
        }
    }

    pub fn set_schedule(&mut self, schedule: FloodSchedule) {
        if self.builder.schedule != schedule {
            self.builder.schedule = schedule;
            self.mark_geometry_dirty();
        }
    }

    /// Force a full re-render on the next rebuild, e.g. to draw fresh jitter.
    pub fn invalidate_lighting(&mut self) {
        self.lighting_dirty = true;
    }

    fn mark_geometry_dirty(&mut self) {
        self.geometry_dirty = true;
        self.lighting_dirty = true;
    }

    /// Bring the distance and light fields up to date with the latest edits.
    pub fn rebuild<R: Rng + ?Sized>(&mut self, rng: &mut R) -> RebuildOutcome {
        let mut outcome = RebuildOutcome::default();

        if self.geometry_dirty {
            let (seeds, distance, stats) = self.builder.build_with_stats(&self.grid);
            self.seeds = seeds;
            self.distance = distance;
            self.flood_stats = stats;
            self.geometry_dirty = false;
            outcome.distance_rebuilt = true;
        }

        if self.lighting_dirty {
            let mut light_field = render_light_field(&self.distance, self.light, &self.config, rng);
            if self.config.blur {
                blur_light_field(&mut light_field);
            }
            self.light_field = light_field;
            self.lighting_dirty = false;
            outcome.light_rendered = true;
        }

        outcome
    }
}
