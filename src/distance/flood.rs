//! Serpentine nearest-seed flood kernels.
//!
//! Each pass walks the whole grid once, rows in one vertical direction and
//! alternating horizontal direction row by row. At every cell the seed is
//! replaced by whichever of the 9 candidates (self plus 8 neighbours at the
//! pass stride) records a seed closest to the cell. Updates are written in
//! place, so a seed can travel across a whole row within a single pass.

/// Sentinel coordinate for cells that have not yet seen a seed.
pub const UNSEEDED: f32 = f32::INFINITY;

/// Vertical direction of a serpentine pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOrder {
    TopDown,
    BottomUp,
}

impl RowOrder {
    #[inline]
    pub fn flipped(self) -> Self {
        match self {
            RowOrder::TopDown => RowOrder::BottomUp,
            RowOrder::BottomUp => RowOrder::TopDown,
        }
    }
}

// ============================================================================
// Seeding
// ============================================================================

/// Every solid cell becomes a seed pointing at itself, every free cell is unseeded.
pub fn seed_from_solids(solid: &[bool], width: usize, xs: &mut [f32], ys: &mut [f32]) {
    for (idx, &is_solid) in solid.iter().enumerate() {
        if is_solid {
            xs[idx] = (idx % width) as f32;
            ys[idx] = (idx / width) as f32;
        } else {
            xs[idx] = UNSEEDED;
            ys[idx] = UNSEEDED;
        }
    }
}

// ============================================================================
// Merge helper
// ============================================================================

#[inline]
fn sqr_dist_to_seed(xs: &[f32], ys: &[f32], sample: usize, x: f32, y: f32) -> f32 {
    let dx = x - xs[sample];
    let dy = y - ys[sample];
    dx * dx + dy * dy
}

/// Pick the candidate whose seed is closest to `(x, y)`.
///
/// The cell's own assignment is the starting best; neighbours must be
/// strictly closer to replace it, and earlier neighbours win ties.
#[inline]
fn merge_samples(xs: &[f32], ys: &[f32], x: f32, y: f32, current: usize, samples: &[usize; 8]) -> usize {
    let mut best = current;
    let mut best_dist = sqr_dist_to_seed(xs, ys, current, x, y);
    for &sample in samples {
        let d = sqr_dist_to_seed(xs, ys, sample, x, y);
        if d < best_dist {
            best_dist = d;
            best = sample;
        }
    }
    best
}

/// The 8 neighbours at `stride`, as linear indices clamped to `[0, len)`.
///
/// Clamping is on the linear index, so horizontal neighbours past a row edge
/// land on the adjacent row. Those are still real seeds, only further away.
#[inline]
fn neighbour_indices(x: usize, y: usize, width: usize, stride: usize, len: usize) -> [usize; 8] {
    let w = width as isize;
    let s = stride as isize;
    let limit = len as isize - 1;
    let r1 = (y as isize - s) * w + x as isize;
    let r2 = y as isize * w + x as isize;
    let r3 = (y as isize + s) * w + x as isize;
    let clamp = |i: isize| i.clamp(0, limit) as usize;
    [
        clamp(r1 - s),
        clamp(r1),
        clamp(r1 + s),
        clamp(r2 - s),
        clamp(r2 + s),
        clamp(r3 - s),
        clamp(r3),
        clamp(r3 + s),
    ]
}

// ============================================================================
// Pass
// ============================================================================

/// Run one serpentine pass at `stride`. The first row visited is scanned
/// right to left. Returns the number of cells merged.
pub fn serpentine_pass(
    xs: &mut [f32],
    ys: &mut [f32],
    width: usize,
    height: usize,
    stride: usize,
    order: RowOrder,
) -> usize {
    let len = width * height;
    let stride = stride.max(1);
    let mut merges = 0;
    let mut right_to_left = true;

    for row in 0..height {
        let y = match order {
            RowOrder::TopDown => row,
            RowOrder::BottomUp => height - 1 - row,
        };

        for col in 0..width {
            let x = if right_to_left { width - 1 - col } else { col };
            let idx = y * width + x;
            let samples = neighbour_indices(x, y, width, stride, len);
            let next = merge_samples(xs, ys, x as f32, y as f32, idx, &samples);
            if next != idx {
                xs[idx] = xs[next];
                ys[idx] = ys[next];
            }
            merges += 1;
        }

        right_to_left = !right_to_left;
    }

    merges
}

/// Strides for a log-stride schedule: largest power of two below
/// `max(width, height)`, halving down to 2. The caller finishes with
/// stride-1 sweeps.
pub fn jump_strides(width: usize, height: usize) -> Vec<usize> {
    let extent = width.max(height);
    let mut strides = Vec::new();
    if extent <= 2 {
        return strides;
    }
    let mut stride = extent.next_power_of_two() / 2;
    while stride >= 2 {
        strides.push(stride);
        stride /= 2;
    }
    strides
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neighbour_indices_clamped() {
        // Top-left corner of a 4x3 grid: everything above clamps to 0
        let n = neighbour_indices(0, 0, 4, 1, 12);
        assert_eq!(n, [0, 0, 0, 0, 1, 3, 4, 5]);

        // Bottom-right corner: everything below clamps to the last index
        let n = neighbour_indices(3, 2, 4, 1, 12);
        assert_eq!(n, [6, 7, 8, 10, 11, 11, 11, 11]);
    }

    #[test]
    fn test_merge_prefers_self_on_tie() {
        // Cell 1 and cell 0 both point at (0, 0); cell 1 must keep its own sample
        let xs = vec![0.0, 0.0, UNSEEDED];
        let ys = vec![0.0, 0.0, UNSEEDED];
        let samples = [0, 0, 0, 0, 2, 2, 2, 2];
        assert_eq!(merge_samples(&xs, &ys, 1.0, 0.0, 1, &samples), 1);
    }

    #[test]
    fn test_single_pass_spans_row() {
        // 5x1 grid, seed at the right end. Row is scanned right to left,
        // so the seed reaches the left end in one pass.
        let solid = [false, false, false, false, true];
        let mut xs = vec![0.0; 5];
        let mut ys = vec![0.0; 5];
        seed_from_solids(&solid, 5, &mut xs, &mut ys);
        let merges = serpentine_pass(&mut xs, &mut ys, 5, 1, 1, RowOrder::TopDown);

        assert_eq!(merges, 5);
        assert!(xs.iter().all(|&x| x == 4.0));
        assert!(ys.iter().all(|&y| y == 0.0));
    }

    #[test]
    fn test_jump_strides() {
        assert!(jump_strides(2, 1).is_empty());
        assert_eq!(jump_strides(5, 3), vec![4, 2]);
        assert_eq!(jump_strides(8, 8), vec![4, 2]);
        assert_eq!(jump_strides(9, 2), vec![8, 4, 2]);
        assert_eq!(jump_strides(100, 40), vec![64, 32, 16, 8, 4, 2]);
    }
}
