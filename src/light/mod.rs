//! Layer 2: Light field rendering
//!
//! Computes, for a single point light, how much light reaches every free
//! cell. Cells inside the light's own clearance radius get plain radial
//! falloff; everything else is sphere-marched toward the light using the
//! distance field as the step size, accumulating a soft-shadow visibility
//! term along the way.

pub mod march;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use rayon::prelude::*;

use crate::distance::DistanceField;
use march::LightSource;

/// Tuning for a light render.
#[derive(Debug, Clone, PartialEq)]
pub struct LightConfig {
    /// Falloff radius; cells further away receive no light.
    pub light_radius: f32,
    /// Blend denominator for `surface_check`.
    pub edge_distance: f32,
    /// Maximum sphere-march iterations per cell.
    pub march_step_limit: usize,
    /// Widen occluder apertures in proportion to obstacle proximity.
    pub use_cone: bool,
    /// Dither each ray's starting offset.
    pub jitter_start: bool,
    /// Dither each march step length.
    pub jitter_step: bool,
    /// Smooth the occlusion transition near edges.
    pub surface_check: bool,
    /// Run the blur pass after rendering.
    pub blur: bool,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            light_radius: 1000.0,
            edge_distance: 25.0,
            march_step_limit: 25,
            use_cone: false,
            jitter_start: false,
            jitter_step: false,
            surface_check: false,
            blur: false,
        }
    }
}

impl LightConfig {
    /// Same settings with both jitter flags cleared.
    pub fn deterministic(&self) -> Self {
        Self {
            jitter_start: false,
            jitter_step: false,
            ..self.clone()
        }
    }

    #[inline]
    pub fn is_jittered(&self) -> bool {
        self.jitter_start || self.jitter_step
    }
}

/// Per-cell light intensity for one light position.
#[derive(Debug, Clone, PartialEq)]
pub struct LightField {
    width: usize,
    height: usize,
    values: Vec<f32>,
}

impl LightField {
    /// An unlit field.
    pub fn zeroed(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            values: vec![0.0; width * height],
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
        self.values[y * self.width + x]
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut [f32] {
        &mut self.values
    }
}

/// Radial falloff: `(1 - clamp01(dist / radius))^2`.
#[inline]
pub fn falloff(dist: f32, radius: f32) -> f32 {
    let fade = 1.0 - (dist / radius).clamp(0.0, 1.0);
    fade * fade
}

/// Clamp a light position into the grid, keeping it off the top and left border.
pub fn clamp_light_position(light: (isize, isize), width: usize, height: usize) -> (usize, usize) {
    let x = light.0.max(1).min(width as isize - 1).max(0);
    let y = light.1.max(1).min(height as isize - 1).max(0);
    (x as usize, y as usize)
}

/// Render the light field for a light at `light`.
///
/// A light inside a solid cell lights nothing. `rng` supplies the jitter
/// and is left untouched when both jitter flags are off, so a
/// non-jittered render is fully deterministic.
pub fn render_light_field<R: Rng + ?Sized>(
    field: &DistanceField,
    light: (isize, isize),
    config: &LightConfig,
    rng: &mut R,
) -> LightField {
    let (width, height) = (field.width(), field.height());
    let mut out = LightField::zeroed(width, height);

    let (lx, ly) = clamp_light_position(light, width, height);
    let light_idx = ly * width + lx;
    if field.is_solid_at(light_idx) {
        log::debug!("light at ({}, {}) is inside a solid cell", lx, ly);
        return out;
    }

    let source = LightSource {
        x: lx,
        y: ly,
        clearance: field.at(light_idx),
    };

    // One generator per row, seeded in row order, so jittered output does
    // not depend on how rayon schedules the rows.
    let row_seeds: Vec<u64> = if config.is_jittered() {
        (0..height).map(|_| rng.random::<u64>()).collect()
    } else {
        Vec::new()
    };

    out.values
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(sy, row)| {
            let mut row_rng = row_seeds.get(sy).map(|&seed| Pcg32::seed_from_u64(seed));
            for (sx, cell) in row.iter_mut().enumerate() {
                *cell = march::shade_cell(field, &source, config, sx, sy, row_rng.as_mut());
            }
        });

    out
}

/// Converts a float grid to a formatted string for debugging
pub fn field_to_string(values: &[f32], width: usize) -> String {
    let mut result = String::new();
    if width == 0 {
        return result;
    }

    for row in values.chunks(width) {
        for v in row {
            if v.is_finite() {
                result.push_str(&format!("{:5.2} ", v));
            } else {
                result.push_str("  inf ");
            }
        }
        result.push('\n');
    }
    result
}
