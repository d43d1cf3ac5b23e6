use super::Cell;

/// One decoded instruction: write `state` at (`row`, `col`) relative to the
/// seeding anchor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Stamp {
    pub row: usize,
    pub col: usize,
    pub state: Cell,
}

/// A horizontal run of identical stamps starting at (`row`, `col`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Run {
    pub row: usize,
    pub col: usize,
    pub len: usize,
    pub state: Cell,
}

impl Run {
    /// Expand the run into its stamps, left to right
    pub fn stamps(self) -> impl Iterator<Item = Stamp> {
        (0..self.len).map(move |i| Stamp {
            row: self.row,
            col: self.col + i,
            state: self.state,
        })
    }
}

/// Decoded pattern: ordered runs of Dead and Alive stamps relative to a
/// top-left anchor. Cells not covered by any run are left untouched when
/// the pattern is seeded.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Pattern {
    runs: Vec<Run>,
    width: usize,
    height: usize,
}

impl Pattern {
    /// Pattern with no stamps
    pub fn empty() -> Self {
        Self::default()
    }

    /// Append a run; the bounding box grows to contain it.
    /// Zero-length runs are dropped.
    pub(crate) fn push_run(&mut self, run: Run) {
        if run.len == 0 {
            return;
        }
        self.width = self.width.max(run.col.saturating_add(run.len));
        self.height = self.height.max(run.row.saturating_add(1));
        self.runs.push(run);
    }

    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    /// Every stamp in application order
    pub fn stamps(&self) -> impl Iterator<Item = Stamp> + '_ {
        self.runs.iter().flat_map(|run| run.stamps())
    }

    /// Columns spanned by the runs
    pub fn width(&self) -> usize {
        self.width
    }

    /// Rows spanned by the runs
    pub fn height(&self) -> usize {
        self.height
    }

    /// Total number of stamps (saturating)
    pub fn len(&self) -> usize {
        self.runs.iter().fold(0usize, |acc, run| acc.saturating_add(run.len))
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Number of Alive stamps (saturating)
    pub fn alive_count(&self) -> usize {
        self.runs
            .iter()
            .filter(|run| run.state.is_alive())
            .fold(0usize, |acc, run| acc.saturating_add(run.len))
    }
}

/// Classic Game of Life patterns library, stored as RLE
pub mod presets {
    use crate::domain::rle::{DecodeError, decode};

    use super::Pattern;

    /// A named pattern that can be decoded and seeded
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Preset {
        pub name: &'static str,
        pub description: &'static str,
        pub rle: &'static str,
    }

    impl Preset {
        pub fn pattern(&self) -> Result<Pattern, DecodeError> {
            decode(self.rle)
        }
    }

    /// Glider - simplest spaceship, moves diagonally
    pub const GLIDER: Preset = Preset {
        name: "Glider",
        description: "Moves diagonally (period 4)",
        rle: "bo$2bo$3o!",
    };

    /// Blinker - period 2 oscillator
    pub const BLINKER: Preset = Preset {
        name: "Blinker",
        description: "Oscillator (period 2)",
        rle: "3o!",
    };

    pub const TOAD: Preset = Preset {
        name: "Toad",
        description: "Oscillator (period 2)",
        rle: "b3o$3o!",
    };

    pub const BEACON: Preset = Preset {
        name: "Beacon",
        description: "Oscillator (period 2)",
        rle: "2o$o$3bo$2b2o!",
    };

    pub const PULSAR: Preset = Preset {
        name: "Pulsar",
        description: "Oscillator (period 3)",
        rle: "2b3o3b3o2$o4bobo4bo$o4bobo4bo$o4bobo4bo$2b3o3b3o2$2b3o3b3o$\
              o4bobo4bo$o4bobo4bo$o4bobo4bo2$2b3o3b3o!",
    };

    /// Lightweight Spaceship (LWSS)
    pub const LWSS: Preset = Preset {
        name: "LWSS",
        description: "Lightweight Spaceship (period 4)",
        rle: "bo2bo$o$o3bo$4o!",
    };

    /// Gosper Glider Gun - produces gliders indefinitely
    pub const GLIDER_GUN: Preset = Preset {
        name: "Gosper Glider Gun",
        description: "Produces gliders (period 30)",
        rle: "24bo$22bobo$12b2o6b2o12b2o$11bo3bo4b2o12b2o$2o8bo5bo3b2o$\
              2o8bo3bob2o4bobo$10bo5bo7bo$11bo3bo$12b2o!",
    };

    /// R-pentomino - classic methuselah (stabilizes after 1103 generations)
    pub const R_PENTOMINO: Preset = Preset {
        name: "R-pentomino",
        description: "Methuselah - stabilizes at gen 1103",
        rle: "b2o$2o$bo!",
    };

    pub const ACORN: Preset = Preset {
        name: "Acorn",
        description: "Methuselah - stabilizes at gen 5206",
        rle: "bo$3bo$2o2b3o!",
    };

    /// Block - simple still life
    pub const BLOCK: Preset = Preset {
        name: "Block",
        description: "Still life",
        rle: "2o$2o!",
    };

    /// Get all available patterns
    pub fn all_presets() -> Vec<Preset> {
        vec![
            GLIDER,
            BLINKER,
            TOAD,
            BEACON,
            PULSAR,
            LWSS,
            GLIDER_GUN,
            R_PENTOMINO,
            ACORN,
            BLOCK,
        ]
    }

    /// Look a preset up by name, ignoring ASCII case
    pub fn find(name: &str) -> Option<Preset> {
        all_presets()
            .into_iter()
            .find(|preset| preset.name.eq_ignore_ascii_case(name))
    }
}
