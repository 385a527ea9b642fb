//! Coarse grid types

use std::ops::Index;

use crate::frame_pipeline::frame::{GRID_COLS, GRID_ROWS};

/// Fixed 64x48 grid indexed by `(col, row)`.
///
/// Cells are stored row by row so a grid row is a contiguous slice, which is
/// also the order snapshots are written in.
#[derive(Debug, Clone, PartialEq)]
pub struct CoarseGrid<T> {
    cells: Vec<T>,
}

/// Distances in meters, one per source block
pub type DepthGrid = CoarseGrid<f32>;
/// Packed 32-bit colour samples, one per source block
pub type ColorGrid = CoarseGrid<i32>;

impl<T: Copy + Default> CoarseGrid<T> {
    pub fn new() -> Self {
        Self {
            cells: vec![T::default(); GRID_COLS * GRID_ROWS],
        }
    }

    pub fn filled(value: T) -> Self {
        Self {
            cells: vec![value; GRID_COLS * GRID_ROWS],
        }
    }

    pub fn get(&self, col: usize, row: usize) -> Option<T> {
        if col >= GRID_COLS || row >= GRID_ROWS {
            return None;
        }
        Some(self.cells[row * GRID_COLS + col])
    }

    pub(crate) fn set(&mut self, col: usize, row: usize, value: T) {
        self.cells[row * GRID_COLS + col] = value;
    }

    /// Grid rows top to bottom, each `GRID_COLS` cells left to right.
    pub fn rows(&self) -> impl Iterator<Item = &[T]> {
        self.cells.chunks_exact(GRID_COLS)
    }

    pub fn cells(&self) -> &[T] {
        &self.cells
    }
}

impl<T: Copy + Default> Default for CoarseGrid<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<(usize, usize)> for CoarseGrid<T> {
    type Output = T;

    fn index(&self, (col, row): (usize, usize)) -> &T {
        assert!(col < GRID_COLS && row < GRID_ROWS, "grid cell ({col}, {row}) out of range");
        &self.cells[row * GRID_COLS + col]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_are_contiguous_columns() {
        let mut grid = DepthGrid::new();
        grid.set(3, 1, 2.5);
        let rows: Vec<&[f32]> = grid.rows().collect();
        assert_eq!(rows.len(), GRID_ROWS);
        assert_eq!(rows[1].len(), GRID_COLS);
        assert_eq!(rows[1][3], 2.5);
        assert_eq!(grid[(3, 1)], 2.5);
    }

    #[test]
    fn test_get_out_of_range() {
        let grid = ColorGrid::new();
        assert_eq!(grid.get(GRID_COLS, 0), None);
        assert_eq!(grid.get(0, GRID_ROWS), None);
        assert_eq!(grid.get(GRID_COLS - 1, GRID_ROWS - 1), Some(0));
    }
}
