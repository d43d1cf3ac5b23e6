//! Text view of a grid: one glyph per cell, one line per row.

use std::fmt;

use crate::domain::{Cell, Grid};

/// Glyphs used by the text view
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Glyphs {
    pub alive: char,
    pub dead: char,
}

impl Glyphs {
    pub const fn new(alive: char, dead: char) -> Self {
        Self { alive, dead }
    }

    /// `#` for alive, `.` for dead
    pub const fn ascii() -> Self {
        Self::new('#', '.')
    }

    #[inline]
    pub const fn glyph(&self, cell: Cell) -> char {
        match cell {
            Cell::Alive => self.alive,
            Cell::Dead => self.dead,
        }
    }
}

impl Default for Glyphs {
    fn default() -> Self {
        Self::new('◼', '◻')
    }
}

/// Write `height` lines of `width` glyphs separated by `\n`, with no
/// trailing newline.
pub fn write_text<W: fmt::Write>(out: &mut W, grid: &Grid, glyphs: &Glyphs) -> fmt::Result {
    for (row, cells) in grid.as_slice().chunks_exact(grid.width()).enumerate() {
        if row > 0 {
            out.write_char('\n')?;
        }
        for &cell in cells {
            out.write_char(glyphs.glyph(cell))?;
        }
    }
    Ok(())
}

/// Render the grid to a fresh string
pub fn render_text(grid: &Grid, glyphs: &Glyphs) -> String {
    let (width, height) = grid.dimensions();
    let glyph_len = glyphs.alive.len_utf8().max(glyphs.dead.len_utf8());
    let capacity = width
        .saturating_mul(height)
        .saturating_mul(glyph_len)
        .saturating_add(height - 1);
    let mut text = String::with_capacity(capacity);
    for (row, cells) in grid.as_slice().chunks_exact(width).enumerate() {
        if row > 0 {
            text.push('\n');
        }
        text.extend(cells.iter().map(|&cell| glyphs.glyph(cell)));
    }
    text
}

/// Adapter so a grid can be formatted with `{}` using given glyphs
pub struct TextView<'a> {
    grid: &'a Grid,
    glyphs: Glyphs,
}

impl<'a> TextView<'a> {
    pub fn new(grid: &'a Grid, glyphs: Glyphs) -> Self {
        Self { grid, glyphs }
    }
}

impl fmt::Display for TextView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_text(f, self.grid, &self.glyphs)
    }
}
