//! Occupancy grid: the binary solid/free map the field builders consume.

use thiserror::Error;

/// Errors raised while constructing an [`OccupancyGrid`].
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum GridError {
    #[error("grid must have at least one cell, got {width}x{height}")]
    ZeroSized { width: usize, height: usize },
    #[error("expected {expected} cells, got {actual}")]
    CellCountMismatch { expected: usize, actual: usize },
    #[error("row {row} has {actual} cells, expected {expected}")]
    RaggedRows {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[error("unknown cell character {ch:?} at row {row}, column {column}")]
    UnknownCell { ch: char, row: usize, column: usize },
    #[error("grid is {actual:?}, expected {expected:?}")]
    DimensionMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },
}

/// Boolean grid of solid (obstacle) and free cells.
///
/// Storage is flat and row-major: `index = y * width + x`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccupancyGrid {
    width: usize,
    height: usize,
    cells: Vec<bool>,
}

impl OccupancyGrid {
    /// Create a grid with every cell free.
    pub fn new(width: usize, height: usize) -> Result<Self, GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::ZeroSized { width, height });
        }
        Ok(Self {
            width,
            height,
            cells: vec![false; width * height],
        })
    }

    /// Wrap an existing row-major cell buffer.
    pub fn from_cells(width: usize, height: usize, cells: Vec<bool>) -> Result<Self, GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::ZeroSized { width, height });
        }
        if cells.len() != width * height {
            return Err(GridError::CellCountMismatch {
                expected: width * height,
                actual: cells.len(),
            });
        }
        Ok(Self { width, height, cells })
    }

    /// Parse a text map where `#` is solid and `.` is free.
    ///
    /// Blank lines and surrounding whitespace are ignored, so maps can be
    /// written as indented raw string literals.
    pub fn from_ascii(map: &str) -> Result<Self, GridError> {
        let rows: Vec<&str> = map
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        let height = rows.len();
        let width = rows.first().map(|r| r.chars().count()).unwrap_or(0);
        let mut grid = Self::new(width, height)?;

        for (y, row) in rows.iter().enumerate() {
            let actual = row.chars().count();
            if actual != width {
                return Err(GridError::RaggedRows {
                    row: y,
                    expected: width,
                    actual,
                });
            }
            for (x, ch) in row.chars().enumerate() {
                let solid = match ch {
                    '#' => true,
                    '.' => false,
                    _ => return Err(GridError::UnknownCell { ch, row: y, column: x }),
                };
                grid.cells[y * width + x] = solid;
            }
        }

        Ok(grid)
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
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    /// Whether the cell at `(x, y)` is solid. Out-of-range cells are free.
    #[inline]
    pub fn is_solid(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.cells[self.index(x, y)]
    }

    #[inline]
    pub fn is_solid_at(&self, idx: usize) -> bool {
        self.cells[idx]
    }

    /// Mark a cell solid or free. Returns `false` if `(x, y)` is outside the grid.
    pub fn set(&mut self, x: usize, y: usize, solid: bool) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let idx = self.index(x, y);
        self.cells[idx] = solid;
        true
    }

    /// Mark every cell free.
    pub fn clear(&mut self) {
        self.cells.fill(false);
    }

    pub fn solid_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    pub fn cells(&self) -> &[bool] {
        &self.cells
    }
}
