use std::fmt;

use rand::Rng;
use tracing::{Level, debug, trace};

use crate::domain::{Cell, Grid, Pattern, Rule, RuleTable, decode, default_rule};
use crate::error::Result;
use crate::rendering::{self, Glyphs};

/// Engine owns the grid and advances it one generation at a time.
///
/// It has no notion of time: a driver decides when to call [`Engine::step`]
/// and when to read [`Engine::cells`] or [`Engine::render`]. Pausing is just
/// not calling `step`.
pub struct Engine {
    grid: Grid,
    /// Next generation is computed here, then copied back into `grid`
    scratch: Vec<Cell>,
    rule: Box<dyn Rule>,
    table: RuleTable,
}

impl Engine {
    /// Create an all-dead engine running Conway's rules
    pub fn new(width: usize, height: usize) -> Result<Self> {
        Self::with_boxed_rule(width, height, default_rule())
    }

    /// Create an all-dead engine running the given rule
    pub fn with_rule(width: usize, height: usize, rule: impl Rule + 'static) -> Result<Self> {
        Self::with_boxed_rule(width, height, Box::new(rule))
    }

    pub fn with_boxed_rule(width: usize, height: usize, rule: Box<dyn Rule>) -> Result<Self> {
        let grid = Grid::new(width, height)?;
        let table = RuleTable::build(rule.as_ref());
        debug!(width, height, rule = rule.name(), "engine created");

        Ok(Self {
            scratch: vec![Cell::Dead; grid.len()],
            grid,
            rule,
            table,
        })
    }

    pub fn width(&self) -> usize {
        self.grid.width()
    }

    pub fn height(&self) -> usize {
        self.grid.height()
    }

    /// Grid dimensions as (width, height)
    pub fn dimensions(&self) -> (usize, usize) {
        self.grid.dimensions()
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn rule_name(&self) -> &str {
        self.rule.name()
    }

    pub fn get(&self, row: isize, col: isize) -> Cell {
        self.grid.get(row, col)
    }

    pub fn set(&mut self, row: isize, col: isize, cell: Cell) {
        self.grid.set(row, col, cell);
    }

    /// Stamp `pattern` with its top-left corner at (`row_anchor`, `col_anchor`).
    ///
    /// Stamps wrap around the grid edges and are applied in order, so a later
    /// stamp wins where two land on the same cell. Cells the pattern does not
    /// cover keep their current state.
    pub fn seed(&mut self, pattern: &Pattern, row_anchor: isize, col_anchor: isize) {
        let (width, height) = self.grid.dimensions();
        let base_row = self.grid.wrap_row(row_anchor);
        let base_col = self.grid.wrap_col(col_anchor);

        for run in pattern.runs() {
            let row = (base_row + run.row % height) % height;
            let start = (base_col + run.col % width) % width;
            // A run at least as wide as the grid covers its whole row with one state
            for i in 0..run.len.min(width) {
                self.grid.set_wrapped(row, (start + i) % width, run.state);
            }
        }

        debug!(
            stamps = pattern.len(),
            alive = pattern.alive_count(),
            row_anchor,
            col_anchor,
            "pattern seeded"
        );
    }

    /// Decode `text` and seed it. The grid is untouched if decoding fails.
    pub fn seed_rle(&mut self, text: &str, row_anchor: isize, col_anchor: isize) -> Result<()> {
        let pattern = decode(text).inspect_err(|err| debug!(%err, "rejected pattern"))?;
        self.seed(&pattern, row_anchor, col_anchor);
        Ok(())
    }

    /// Advance one generation. Every cell's next state is computed from the
    /// current generation only; the result replaces the grid in place.
    pub fn step(&mut self) {
        self.grid.next_generation_into(&self.table, &mut self.scratch);
        self.grid.commit(&self.scratch);
        if tracing::enabled!(Level::TRACE) {
            trace!(population = self.grid.population(), "generation advanced");
        }
    }

    /// Same result as [`Engine::step`], rows computed in parallel
    #[cfg(feature = "parallel")]
    pub fn step_parallel(&mut self) {
        self.grid.next_generation_into_parallel(&self.table, &mut self.scratch);
        self.grid.commit(&self.scratch);
        if tracing::enabled!(Level::TRACE) {
            trace!(population = self.grid.population(), "generation advanced (parallel)");
        }
    }

    /// Advance `generations` generations
    pub fn advance(&mut self, generations: usize) {
        for _ in 0..generations {
            self.step();
        }
    }

    /// Raw view: `width * height` bytes, row-major, Dead=0 / Alive=1.
    /// Borrowed from the engine, so it cannot outlive the next mutation.
    pub fn cells(&self) -> &[u8] {
        self.grid.raw_view()
    }

    /// Text view with the default glyphs
    pub fn render(&self) -> String {
        self.render_with(&Glyphs::default())
    }

    pub fn render_with(&self, glyphs: &Glyphs) -> String {
        rendering::render_text(&self.grid, glyphs)
    }

    /// Count total alive cells
    pub fn population(&self) -> usize {
        self.grid.population()
    }

    pub fn clear(&mut self) {
        self.grid.clear();
    }

    /// Fill the grid randomly, each cell alive with probability `density`
    pub fn randomize<R: Rng>(&mut self, rng: &mut R, density: f64) {
        self.grid.randomize(rng, density);
    }

    /// Replace the grid with an all-dead one of the new size.
    /// On invalid dimensions the current grid is kept.
    pub fn resize(&mut self, width: usize, height: usize) -> Result<()> {
        let grid = Grid::new(width, height)?;
        self.scratch = vec![Cell::Dead; grid.len()];
        self.grid = grid;
        debug!(width, height, "engine resized");
        Ok(())
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("width", &self.grid.width())
            .field("height", &self.grid.height())
            .field("rule", &self.rule.name())
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        rendering::write_text(f, &self.grid, &Glyphs::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{GridError, HighLifeRule, LifeLikeRule, MalformedReason, presets};
    use crate::error::Error;

    fn alive_cells(engine: &Engine) -> Vec<(usize, usize)> {
        engine
            .grid()
            .iter_cells()
            .filter(|(_, _, cell)| cell.is_alive())
            .map(|(row, col, _)| (row, col))
            .collect()
    }

    #[test]
    fn test_new_engine_is_dead() {
        let engine = Engine::new(8, 5).unwrap();
        assert_eq!(engine.dimensions(), (8, 5));
        assert_eq!(engine.cells().len(), 40);
        assert!(engine.cells().iter().all(|&b| b == 0));
        assert_eq!(engine.rule_name(), "Conway");
    }

    #[test]
    fn test_invalid_dimensions() {
        let err = Engine::new(0, 10).unwrap_err();
        assert_eq!(err, Error::Grid(GridError::InvalidDimensions { width: 0, height: 10 }));
    }

    #[test]
    fn test_seed_at_anchor() {
        let mut engine = Engine::new(10, 10).unwrap();
        engine.seed_rle("bo$2bo$3o!", 2, 3).unwrap();
        assert_eq!(alive_cells(&engine), vec![(2, 4), (3, 5), (4, 3), (4, 4), (4, 5)]);
    }

    #[test]
    fn test_seed_wraps_around_edges() {
        let mut engine = Engine::new(5, 5).unwrap();
        engine.seed_rle("2o$2o!", 4, -1).unwrap();
        assert_eq!(alive_cells(&engine), vec![(0, 0), (0, 4), (4, 0), (4, 4)]);
    }

    #[test]
    fn test_seed_is_overlay() {
        let mut engine = Engine::new(6, 6).unwrap();
        engine.set(5, 5, Cell::Alive);
        engine.set(0, 1, Cell::Alive);

        // Dead run at (0,1) clears that cell; (5,5) is outside the pattern
        engine.seed_rle("o2bo!", 0, 0).unwrap();
        assert_eq!(alive_cells(&engine), vec![(0, 0), (0, 3), (5, 5)]);
    }

    #[test]
    fn test_later_stamps_win() {
        let mut engine = Engine::new(3, 1).unwrap();
        // The dead run after 3o wraps onto col 0 and overwrites it
        engine.seed_rle("3ob!", 0, 0).unwrap();
        assert_eq!(engine.cells(), &[0, 1, 1]);
    }

    #[test]
    fn test_long_runs_are_clamped() {
        let mut engine = Engine::new(4, 2).unwrap();
        engine.seed_rle("1000000000o$o!", 0, 1).unwrap();
        assert_eq!(engine.cells(), &[1, 1, 1, 1, 0, 1, 0, 0]);
    }

    #[test]
    fn test_failed_seed_leaves_grid_untouched() {
        let mut engine = Engine::new(5, 5).unwrap();
        engine.set(2, 2, Cell::Alive);
        let before = engine.cells().to_vec();

        let err = engine.seed_rle("3o$2x!", 0, 0).unwrap_err();
        assert!(matches!(
            err,
            Error::Decode(ref e) if e.reason() == &MalformedReason::UnknownTag('x')
        ));
        assert_eq!(engine.cells(), before.as_slice());
    }

    #[test]
    fn test_isolated_cell_dies() {
        let mut engine = Engine::new(3, 3).unwrap();
        engine.set(1, 1, Cell::Alive);
        engine.step();
        assert_eq!(engine.population(), 0);
    }

    #[test]
    fn test_single_cell_grid() {
        // The lone cell sees itself 8 times and dies of overpopulation
        let mut engine = Engine::new(1, 1).unwrap();
        engine.set(0, 0, Cell::Alive);
        engine.step();
        assert_eq!(engine.cells(), &[0]);

        engine.step();
        assert_eq!(engine.cells(), &[0]);
    }

    #[test]
    fn test_blinker_oscillates() {
        let mut engine = Engine::new(5, 5).unwrap();
        engine.seed(&presets::BLINKER.pattern().unwrap(), 2, 1);
        let start = engine.cells().to_vec();

        engine.step();
        assert_eq!(alive_cells(&engine), vec![(1, 2), (2, 2), (3, 2)]);
        engine.step();
        assert_eq!(engine.cells(), start.as_slice());
    }

    #[test]
    fn test_glider_translates() {
        let mut engine = Engine::new(12, 12).unwrap();
        engine.seed_rle("bo$2bo$3o!", 0, 0).unwrap();
        let start = alive_cells(&engine);

        engine.advance(4);
        let moved: Vec<_> = start.iter().map(|&(r, c)| (r + 1, c + 1)).collect();
        assert_eq!(alive_cells(&engine), moved);
    }

    #[test]
    fn test_glider_wraps_on_small_torus() {
        // A glider returns to its start after 4 * size generations
        let mut engine = Engine::new(6, 6).unwrap();
        engine.seed_rle("bo$2bo$3o!", 0, 0).unwrap();
        let start = engine.cells().to_vec();

        engine.advance(24);
        assert_eq!(engine.cells(), start.as_slice());
    }

    #[test]
    fn test_raw_view_address_is_stable() {
        let mut engine = Engine::new(16, 16).unwrap();
        engine.seed_rle("3o!", 4, 4).unwrap();
        let before = engine.cells().as_ptr();
        engine.step();
        engine.set(0, 0, Cell::Alive);
        assert_eq!(engine.cells().as_ptr(), before);
    }

    #[test]
    fn test_render_matches_grid() {
        let mut engine = Engine::new(4, 2).unwrap();
        engine.seed_rle("bo$3bo!", 0, 0).unwrap();
        assert_eq!(engine.render_with(&Glyphs::ascii()), ".#..\n...#");
        assert_eq!(engine.render(), engine.to_string());
    }

    #[test]
    fn test_custom_rule() {
        // HighLife: a dead cell with 6 neighbors is born
        let mut engine = Engine::with_rule(7, 7, HighLifeRule).unwrap();
        engine.seed_rle("3o$b$3o!", 2, 2).unwrap();
        engine.step();
        assert_eq!(engine.get(3, 3), Cell::Alive);

        let mut conway = Engine::new(7, 7).unwrap();
        conway.seed_rle("3o$b$3o!", 2, 2).unwrap();
        conway.step();
        assert_eq!(conway.get(3, 3), Cell::Dead);
    }

    #[test]
    fn test_parsed_rule() {
        let seeds: LifeLikeRule = "B2/S".parse().unwrap();
        let mut engine = Engine::with_rule(6, 6, seeds).unwrap();
        engine.seed_rle("2o!", 2, 2).unwrap();
        engine.step();
        assert_eq!(engine.rule_name(), "B2/S");
        assert_eq!(alive_cells(&engine), vec![(1, 2), (1, 3), (3, 2), (3, 3)]);
    }

    #[test]
    fn test_resize() {
        let mut engine = Engine::new(4, 4).unwrap();
        engine.seed_rle("2o$2o!", 0, 0).unwrap();

        assert!(engine.resize(0, 3).is_err());
        assert_eq!(engine.population(), 4);

        engine.resize(6, 3).unwrap();
        assert_eq!(engine.dimensions(), (6, 3));
        assert_eq!(engine.cells(), &[0; 18]);
        engine.step();
        assert_eq!(engine.population(), 0);
    }

    #[test]
    fn test_clear() {
        let mut engine = Engine::new(4, 4).unwrap();
        engine.seed_rle("4o!", 1, 0).unwrap();
        engine.clear();
        assert_eq!(engine.population(), 0);
    }

    #[test]
    #[tracing_test::traced_test]
    fn test_step_traces_population() {
        let mut engine = Engine::new(6, 6).unwrap();
        engine.seed_rle("3o!", 2, 1).unwrap();
        engine.step();

        assert!(logs_contain("generation advanced"));
        assert!(logs_contain("population=3"));
    }
}
