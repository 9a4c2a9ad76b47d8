//! Per-cell visibility: radial falloff near the light, sphere marching beyond.

use rand::Rng;
use rand_pcg::Pcg32;

use super::{LightConfig, falloff};
use crate::distance::DistanceField;

/// Aperture scale applied to the cone when `use_cone` is enabled.
pub const CONE_SCALE: f32 = 0.63299;

/// Light source resolved against a distance field.
#[derive(Debug, Clone, Copy)]
pub struct LightSource {
    pub x: usize,
    pub y: usize,
    /// Clearance around the light: distance from the light cell to the nearest solid.
    pub clearance: f32,
}

/// Intensity at `(sx, sy)`.
///
/// `jitter` is only consulted when `jitter_start` or `jitter_step` is set.
pub fn shade_cell(
    field: &DistanceField,
    light: &LightSource,
    config: &LightConfig,
    sx: usize,
    sy: usize,
    mut jitter: Option<&mut Pcg32>,
) -> f32 {
    let width = field.width();
    let height = field.height();
    let idx = sy * width + sx;

    if field.is_solid_at(idx) {
        return 0.0;
    }

    let dx = light.x as f32 - sx as f32;
    let dy = light.y as f32 - sy as f32;
    let total_dist = (dx * dx + dy * dy).sqrt();

    if total_dist > config.light_radius {
        return 0.0;
    }
    if total_dist == 0.0 {
        return 1.0;
    }
    // Nothing solid can sit closer to the light than its own clearance
    if total_dist < light.clearance {
        return falloff(total_dist, config.light_radius);
    }

    let dx = dx / total_dist;
    let dy = dy / total_dist;

    let mut progress = field.at(idx);
    if config.jitter_start {
        if let Some(rng) = jitter.as_deref_mut() {
            progress *= rng.random::<f32>();
        }
    }

    let mut light_left = 1.0f32;

    for _ in 0..config.march_step_limit {
        if progress >= total_dist {
            return light_left * falloff(total_dist, config.light_radius);
        }

        // Truncating cast: samples lie on the segment toward the light,
        // the min() only guards float rounding at the far edge.
        let nx = ((dx * progress + sx as f32) as usize).min(width - 1);
        let ny = ((dy * progress + sy as f32) as usize).min(height - 1);
        let n_idx = ny * width + nx;

        if field.is_solid_at(n_idx) {
            return 0.0;
        }
        let step_dist = field.at(n_idx);

        let mut cone = step_dist;
        if config.use_cone {
            cone *= step_dist * CONE_SCALE;
        }

        if config.surface_check {
            let edge = config.edge_distance;
            let bv = light.clearance.min(edge) / 3.0;
            let bu = edge - bv;
            light_left = (bu * light_left + bv * light_left.min(cone / progress)) / edge;
        } else {
            light_left = light_left.min(cone / progress);
        }

        let mut step_scale = 1.0f32;
        if config.jitter_step {
            if let Some(rng) = jitter.as_deref_mut() {
                step_scale = rng.random::<f32>();
            }
        }
        progress += step_dist * step_scale;
    }

    // Step budget ran out before reaching the light
    0.0
}
