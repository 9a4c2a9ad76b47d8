//! Layer 3: Light field smoothing
//!
//! Two incremental passes, rows then columns. Each pass keeps a running sum
//! while walking one line, writes half of it one cell behind the cursor and
//! subtracts the cell it just wrote, so only immediately adjacent samples
//! ever mix. The last cell of every line is left as is.

use rayon::prelude::*;

use crate::light::LightField;

/// Smooth `len` samples of `values` starting at `start`, `step` apart.
#[inline]
fn smooth_line(values: &mut [f32], start: usize, step: usize, len: usize) {
    if len == 0 {
        return;
    }

    let mut idx = start;
    let mut v = values[idx] + values[idx];
    idx += step;
    for _ in 1..len.saturating_sub(1) {
        v += values[idx];
        values[idx - step] = v / 2.0;
        idx += step;
        v -= values[idx - 2 * step];
    }
}

/// Blur a light field in place: row pass, then column pass.
///
/// The running sum overshoots at the leading edge of every line, so the
/// result is clamped back into `[0, 1]`.
pub fn blur_light_field(field: &mut LightField) {
    let (width, height) = (field.width(), field.height());
    if width == 0 || height == 0 {
        return;
    }
    let values = field.values_mut();

    values
        .par_chunks_mut(width)
        .for_each(|row| smooth_line(row, 0, 1, width));

    for x in 0..width {
        smooth_line(values, x, width, height);
    }

    values.par_iter_mut().for_each(|v| *v = v.clamp(0.0, 1.0));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_from(width: usize, height: usize, values: &[f32]) -> LightField {
        let mut field = LightField::zeroed(width, height);
        field.values_mut().copy_from_slice(values);
        field
    }

    #[test]
    fn test_dark_stays_dark() {
        let mut field = LightField::zeroed(7, 5);
        blur_light_field(&mut field);
        assert!(field.values().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_single_row() {
        let mut field = field_from(4, 1, &[0.0, 1.0, 0.0, 0.0]);
        blur_light_field(&mut field);
        assert_eq!(field.values(), &[0.5, 0.25, 0.0, 0.0]);
    }

    #[test]
    fn test_single_column() {
        let mut field = field_from(1, 4, &[0.0, 1.0, 0.0, 0.0]);
        blur_light_field(&mut field);
        assert_eq!(field.values(), &[0.5, 0.25, 0.0, 0.0]);
    }

    #[test]
    fn test_impulse_spreads_to_neighbours() {
        #[rustfmt::skip]
        let mut field = field_from(3, 3, &[
            0.0, 0.0, 0.0,
            0.0, 1.0, 0.0,
            0.0, 0.0, 0.0,
        ]);
        blur_light_field(&mut field);

        #[rustfmt::skip]
        let expected = [
            0.25, 0.5, 0.0,
            0.5,  1.0, 0.0,
            0.0,  0.0, 0.0,
        ];
        assert_eq!(field.values(), &expected);
    }

    #[test]
    fn test_uniform_field_stays_in_range() {
        let mut field = field_from(8, 6, &[1.0; 48]);
        blur_light_field(&mut field);

        assert!(field.values().iter().all(|&v| (0.0..=1.0).contains(&v)));
        assert_eq!(field.get(0, 0), 1.0);
        assert_eq!(field.get(3, 2), 1.0);
    }

    #[test]
    fn test_tiny_fields_untouched() {
        let mut field = field_from(2, 2, &[0.1, 0.2, 0.3, 0.4]);
        blur_light_field(&mut field);
        assert_eq!(field.values(), &[0.1, 0.2, 0.3, 0.4]);

        let mut field = field_from(1, 1, &[0.7]);
        blur_light_field(&mut field);
        assert_eq!(field.values(), &[0.7]);
    }
}
