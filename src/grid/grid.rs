//! Grid: the fixed-size 2-D array of cell colors mutated by the drive loop.
//!
//! Cells are stored in row-major order in one contiguous `Vec`.

use super::color::Rgb;
use crate::error::GridError;

/// A fixed-size grid of colored cells.
///
/// Access is in row-major order: `index = row * width + column`.
/// Every in-range cell always holds a color (black until first written);
/// the grid is never resized after construction.
#[derive(Clone, PartialEq, Eq)]
pub struct Grid {
    /// Contiguous cell storage (row-major order).
    cells: Vec<Rgb>,
    /// Width in cells (columns).
    width: u16,
    /// Height in cells (rows).
    height: u16,
}

impl Grid {
    /// Create a new grid with every cell black.
    ///
    /// # Panics
    /// Panics if width or height is 0.
    pub fn new(width: u16, height: u16) -> Self {
        assert!(width > 0 && height > 0, "Grid dimensions must be non-zero");
        let size = (width as usize) * (height as usize);
        Self {
            cells: vec![Rgb::BLACK; size],
            width,
            height,
        }
    }

    /// Get the grid width.
    #[inline]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Get the grid height.
    #[inline]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Get the total number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Check whether `(column, row)` addresses a cell.
    #[inline]
    pub const fn contains(&self, column: u16, row: u16) -> bool {
        column < self.width && row < self.height
    }

    /// Convert (column, row) coordinates to a linear index.
    ///
    /// Returns `None` if coordinates are out of bounds.
    #[inline]
    pub fn index_of(&self, column: u16, row: u16) -> Option<usize> {
        if self.contains(column, row) {
            Some((row as usize) * (self.width as usize) + (column as usize))
        } else {
            None
        }
    }

    const fn out_of_range(&self, column: u16, row: u16) -> GridError {
        GridError::OutOfRange {
            column,
            row,
            width: self.width,
            height: self.height,
        }
    }

    /// Get the color of a cell.
    pub fn get(&self, column: u16, row: u16) -> Result<Rgb, GridError> {
        self.index_of(column, row)
            .map(|idx| self.cells[idx])
            .ok_or_else(|| self.out_of_range(column, row))
    }

    /// Replace the color of a cell.
    ///
    /// This is the only mutator. The write is visible to the next `get`.
    pub fn set(&mut self, column: u16, row: u16, color: Rgb) -> Result<(), GridError> {
        let idx = self
            .index_of(column, row)
            .ok_or_else(|| self.out_of_range(column, row))?;
        self.cells[idx] = color;
        Ok(())
    }

    /// Get the underlying cell slice.
    #[inline]
    pub fn cells(&self) -> &[Rgb] {
        &self.cells
    }

    /// Iterate over `(column, row, color)` for every cell, row by row.
    pub fn iter(&self) -> impl Iterator<Item = (u16, u16, Rgb)> + '_ {
        let width = self.width as usize;
        self.cells.iter().enumerate().map(move |(idx, color)| {
            #[allow(clippy::cast_possible_truncation)]
            let (column, row) = ((idx % width) as u16, (idx / width) as u16);
            (column, row, *color)
        })
    }
}

impl std::fmt::Debug for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let lit = self.cells.iter().filter(|c| **c != Rgb::BLACK).count();
        f.debug_struct("Grid")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("lit_cells", &lit)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_new() {
        let grid = Grid::new(40, 30);
        assert_eq!(grid.width(), 40);
        assert_eq!(grid.height(), 30);
        assert_eq!(grid.len(), 40 * 30);
        assert!(grid.cells().iter().all(|c| *c == Rgb::BLACK));
    }

    #[test]
    #[should_panic]
    fn test_grid_zero_height() {
        Grid::new(40, 0);
    }

    #[test]
    fn test_grid_get_set() {
        let mut grid = Grid::new(40, 30);
        grid.set(5, 10, Rgb::new(255, 0, 255)).unwrap();
        assert_eq!(grid.get(5, 10), Ok(Rgb::new(255, 0, 255)));
        assert_eq!(grid.get(10, 5), Ok(Rgb::BLACK));
    }

    #[test]
    fn test_grid_bounds() {
        let mut grid = Grid::new(40, 30);
        assert!(grid.get(39, 29).is_ok());
        assert_eq!(
            grid.get(40, 29),
            Err(GridError::OutOfRange { column: 40, row: 29, width: 40, height: 30 })
        );
        assert!(grid.get(39, 30).is_err());

        let before = grid.clone();
        assert!(grid.set(40, 0, Rgb::WHITE).is_err());
        assert!(grid.set(0, 30, Rgb::WHITE).is_err());
        assert_eq!(grid, before);
    }

    #[test]
    fn test_grid_index_row_major() {
        let grid = Grid::new(40, 30);
        assert_eq!(grid.index_of(5, 10), Some(10 * 40 + 5));
        assert_eq!(grid.index_of(40, 0), None);
    }

    #[test]
    fn test_grid_last_write_wins() {
        let mut grid = Grid::new(4, 4);
        grid.set(1, 1, Rgb::WHITE).unwrap();
        grid.set(1, 1, Rgb::new(0, 255, 0)).unwrap();
        assert_eq!(grid.get(1, 1), Ok(Rgb::new(0, 255, 0)));
    }

    #[test]
    fn test_grid_iter_coords() {
        let mut grid = Grid::new(3, 2);
        grid.set(2, 1, Rgb::WHITE).unwrap();
        let cells: Vec<_> = grid.iter().collect();
        assert_eq!(cells.len(), 6);
        assert_eq!(cells[0], (0, 0, Rgb::BLACK));
        assert_eq!(cells[5], (2, 1, Rgb::WHITE));
    }
}
