use rand::Rng;
use thiserror::Error;

use super::{Cell, RuleTable};

/// Grid construction failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("invalid grid dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
}

/// Grid manages the 2D cellular automaton grid.
///
/// Cells are stored row-major, one byte per cell. Every coordinate is
/// interpreted toroidally: rows wrap modulo `height` and columns modulo
/// `width`, negative values included, so there are no edges and no
/// out-of-bounds accesses.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Create a new grid with all cells initially dead
    pub fn new(width: usize, height: usize) -> Result<Self, GridError> {
        let len = width
            .checked_mul(height)
            .filter(|&len| len > 0 && len <= isize::MAX as usize)
            .ok_or(GridError::InvalidDimensions { width, height })?;

        Ok(Self {
            width,
            height,
            cells: vec![Cell::Dead; len],
        })
    }

    pub const fn width(&self) -> usize {
        self.width
    }

    pub const fn height(&self) -> usize {
        self.height
    }

    /// Get grid dimensions as (width, height)
    pub const fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Number of cells, always `width * height`
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always false; a grid has at least one cell
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Reduce a signed row to `0..height`
    #[inline]
    pub fn wrap_row(&self, row: isize) -> usize {
        wrap(row, self.height)
    }

    /// Reduce a signed column to `0..width`
    #[inline]
    pub fn wrap_col(&self, col: isize) -> usize {
        wrap(col, self.width)
    }

    /// Convert in-range 2D coordinates to 1D index
    #[inline]
    const fn get_index(&self, row: usize, col: usize) -> usize {
        row * self.width + col
    }

    /// Get cell at (row, col), wrapping both coordinates
    pub fn get(&self, row: isize, col: isize) -> Cell {
        self.cells[self.get_index(self.wrap_row(row), self.wrap_col(col))]
    }

    /// Set cell at (row, col), wrapping both coordinates
    pub fn set(&mut self, row: isize, col: isize, cell: Cell) {
        let idx = self.get_index(self.wrap_row(row), self.wrap_col(col));
        self.cells[idx] = cell;
    }

    /// Set cell at already-reduced coordinates
    #[inline]
    pub(crate) fn set_wrapped(&mut self, row: usize, col: usize, cell: Cell) {
        debug_assert!(row < self.height && col < self.width);
        let idx = self.get_index(row, col);
        self.cells[idx] = cell;
    }

    /// Raw byte view of the cell storage: row-major, Dead=0, Alive=1.
    pub fn raw_view(&self) -> &[u8] {
        // SAFETY: Cell is #[repr(u8)] with discriminants 0 and 1, so every
        // Cell is a valid u8 and the slices have identical size and alignment.
        unsafe { std::slice::from_raw_parts(self.cells.as_ptr().cast::<u8>(), self.cells.len()) }
    }

    /// Cells in row-major order
    pub fn as_slice(&self) -> &[Cell] {
        &self.cells
    }

    /// Count live neighbors using toroidal wrapping.
    /// On grids narrower or shorter than 3 cells, neighbor offsets can land
    /// on the same cell (or the cell itself) and are counted every time.
    pub fn live_neighbors(&self, row: isize, col: isize) -> u8 {
        let row = self.wrap_row(row);
        let col = self.wrap_col(col);
        let rows = self.neighbor_rows(row);
        let cols = self.neighbor_cols(col);
        self.count_at(rows, cols)
    }

    #[inline]
    fn neighbor_rows(&self, row: usize) -> [usize; 3] {
        let h = self.height;
        [(row + h - 1) % h, row, (row + 1) % h]
    }

    #[inline]
    fn neighbor_cols(&self, col: usize) -> [usize; 3] {
        let w = self.width;
        [(col + w - 1) % w, col, (col + 1) % w]
    }

    #[inline]
    fn count_at(&self, [up, mid, down]: [usize; 3], [left, centre, right]: [usize; 3]) -> u8 {
        let row_sum = |r: usize| {
            let base = r * self.width;
            self.cells[base + left].as_byte()
                + self.cells[base + centre].as_byte()
                + self.cells[base + right].as_byte()
        };
        let mid_base = mid * self.width;
        row_sum(up)
            + row_sum(down)
            + self.cells[mid_base + left].as_byte()
            + self.cells[mid_base + right].as_byte()
    }

    /// Compute one row of the next generation into `out` (length `width`)
    /// reading only the current cells.
    fn next_row_into(&self, row: usize, table: &RuleTable, out: &mut [Cell]) {
        let rows = self.neighbor_rows(row);
        let base = row * self.width;
        for (col, next) in out.iter_mut().enumerate() {
            let neighbors = self.count_at(rows, self.neighbor_cols(col));
            *next = table.next(self.cells[base + col], neighbors);
        }
    }

    /// Write the next generation into `next` without touching the current one.
    pub(crate) fn next_generation_into(&self, table: &RuleTable, next: &mut [Cell]) {
        debug_assert_eq!(next.len(), self.cells.len());
        for (row, out) in next.chunks_exact_mut(self.width).enumerate() {
            self.next_row_into(row, table, out);
        }
    }

    /// Parallel variant of `next_generation_into`, rows split across rayon
    #[cfg(feature = "parallel")]
    pub(crate) fn next_generation_into_parallel(&self, table: &RuleTable, next: &mut [Cell]) {
        use rayon::prelude::*;

        debug_assert_eq!(next.len(), self.cells.len());
        next.par_chunks_exact_mut(self.width)
            .enumerate()
            .for_each(|(row, out)| self.next_row_into(row, table, out));
    }

    /// Replace every cell with `next` in place; the storage is not reallocated.
    pub(crate) fn commit(&mut self, next: &[Cell]) {
        self.cells.copy_from_slice(next);
    }

    /// Count total alive cells
    pub fn population(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_alive()).count()
    }

    /// Clear all cells to dead state
    pub fn clear(&mut self) {
        self.cells.fill(Cell::Dead);
    }

    /// Randomize grid; each cell is alive with probability `density`
    /// (clamped to 0.0..=1.0).
    pub fn randomize<R: Rng>(&mut self, rng: &mut R, density: f64) {
        let density = if density.is_nan() { 0.0 } else { density.clamp(0.0, 1.0) };
        self.cells
            .iter_mut()
            .for_each(|cell| *cell = Cell::from(rng.random_bool(density)));
    }

    /// Iterate over all cells with their (row, col) positions
    pub fn iter_cells(&self) -> impl Iterator<Item = (usize, usize, Cell)> + '_ {
        let width = self.width;
        self.cells
            .iter()
            .enumerate()
            .map(move |(idx, &cell)| (idx / width, idx % width, cell))
    }
}

#[inline]
fn wrap(value: isize, modulus: usize) -> usize {
    // modulus <= isize::MAX is guaranteed by Grid::new
    value.rem_euclid(modulus as isize) as usize
}
