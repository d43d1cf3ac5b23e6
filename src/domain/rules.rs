use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use super::Cell;

/// Trait for two-state, eight-neighbor transition rules.
/// Conway's Life is the default; other life-like rules plug in here.
pub trait Rule: Send + Sync {
    /// Name of the rule
    fn name(&self) -> &str;

    /// Short description
    fn description(&self) -> &str;

    /// Apply rule to compute next cell state
    fn evolve(&self, current: Cell, neighbors: u8) -> Cell;
}

/// Conway's Game of Life (B3/S23)
/// The classic cellular automaton rules
#[derive(Clone, Copy, Debug, Default)]
pub struct ConwayRule;

impl Rule for ConwayRule {
    fn name(&self) -> &str {
        "Conway"
    }

    fn description(&self) -> &str {
        "B3/S23 - Classic"
    }

    fn evolve(&self, current: Cell, neighbors: u8) -> Cell {
        current.evolve(neighbors)
    }
}

/// HighLife (B36/S23)
/// Like Conway's Life but cells with 6 neighbors are born
#[derive(Clone, Copy, Debug, Default)]
pub struct HighLifeRule;

impl Rule for HighLifeRule {
    fn name(&self) -> &str {
        "HighLife"
    }

    fn description(&self) -> &str {
        "B36/S23 - Replicators"
    }

    fn evolve(&self, current: Cell, neighbors: u8) -> Cell {
        match (current, neighbors) {
            (Cell::Alive, 2 | 3) => Cell::Alive,
            (Cell::Dead, 3 | 6) => Cell::Alive,
            _ => Cell::Dead,
        }
    }
}

/// Seeds (B2/S)
/// Every live cell dies each generation
#[derive(Clone, Copy, Debug, Default)]
pub struct SeedsRule;

impl Rule for SeedsRule {
    fn name(&self) -> &str {
        "Seeds"
    }

    fn description(&self) -> &str {
        "B2/S - Exploding"
    }

    fn evolve(&self, current: Cell, neighbors: u8) -> Cell {
        match (current, neighbors) {
            (Cell::Dead, 2) => Cell::Alive,
            _ => Cell::Dead,
        }
    }
}

/// Day & Night (B3678/S34678)
/// Symmetric rule - inverse of a pattern follows same rules
#[derive(Clone, Copy, Debug, Default)]
pub struct DayAndNightRule;

impl Rule for DayAndNightRule {
    fn name(&self) -> &str {
        "Day&Night"
    }

    fn description(&self) -> &str {
        "B3678/S34678"
    }

    fn evolve(&self, current: Cell, neighbors: u8) -> Cell {
        match (current, neighbors) {
            (Cell::Alive, 3 | 4 | 6 | 7 | 8) => Cell::Alive,
            (Cell::Dead, 3 | 6 | 7 | 8) => Cell::Alive,
            _ => Cell::Dead,
        }
    }
}

/// Bitmask over neighbor counts 0..=8; bit `n` set means count `n` matches.
pub type NeighborMask = u16;

/// Any life-like rule given in B/S notation, e.g. `B3/S23`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LifeLikeRule {
    birth: NeighborMask,
    survival: NeighborMask,
    rulestring: String,
}

impl LifeLikeRule {
    pub fn new(birth: NeighborMask, survival: NeighborMask) -> Self {
        let birth = birth & 0x1ff;
        let survival = survival & 0x1ff;
        Self {
            birth,
            survival,
            rulestring: format!("B{}/S{}", mask_digits(birth), mask_digits(survival)),
        }
    }

    pub fn birth(&self) -> NeighborMask {
        self.birth
    }

    pub fn survival(&self) -> NeighborMask {
        self.survival
    }
}

impl Default for LifeLikeRule {
    fn default() -> Self {
        // B3/S23
        Self::new(0b0_0000_1000, 0b0_0000_1100)
    }
}

fn mask_digits(mask: NeighborMask) -> String {
    (0..=8u8)
        .filter(|n| mask & (1 << n) != 0)
        .map(|n| char::from(b'0' + n))
        .collect()
}

impl Rule for LifeLikeRule {
    fn name(&self) -> &str {
        &self.rulestring
    }

    fn description(&self) -> &str {
        "Life-like rule"
    }

    fn evolve(&self, current: Cell, neighbors: u8) -> Cell {
        let mask = match current {
            Cell::Alive => self.survival,
            Cell::Dead => self.birth,
        };
        Cell::from(neighbors <= 8 && mask & (1 << neighbors) != 0)
    }
}

impl fmt::Display for LifeLikeRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.rulestring)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleParseError {
    #[error("empty rulestring")]
    Empty,
    #[error("invalid neighbor count {0:?} in rulestring")]
    InvalidDigit(char),
    #[error("unrecognized rulestring {0:?}")]
    Unrecognized(String),
}

fn parse_mask(digits: &str) -> Result<NeighborMask, RuleParseError> {
    digits.chars().try_fold(0, |mask, ch| match ch.to_digit(10) {
        Some(n) if n <= 8 => Ok(mask | (1 << n)),
        _ => Err(RuleParseError::InvalidDigit(ch)),
    })
}

impl FromStr for LifeLikeRule {
    type Err = RuleParseError;

    /// Accepts `B3/S23`, `b3s23` and the older survival-first `23/3` form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(RuleParseError::Empty);
        }
        let upper = s.to_ascii_uppercase();

        if let Some(rest) = upper.strip_prefix('B') {
            let Some(split) = rest.find('S') else {
                return Err(RuleParseError::Unrecognized(s.to_owned()));
            };
            let birth = rest[..split].trim_end_matches('/');
            let survival = &rest[split + 1..];
            return Ok(Self::new(parse_mask(birth)?, parse_mask(survival)?));
        }

        match upper.split_once('/') {
            Some((survival, birth)) => Ok(Self::new(parse_mask(birth)?, parse_mask(survival)?)),
            None => Err(RuleParseError::Unrecognized(s.to_owned())),
        }
    }
}

/// Precomputed next-state table for a rule.
/// Index format: (is_alive * 9) + neighbor_count
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RuleTable([Cell; 18]);

impl RuleTable {
    pub fn build(rule: &dyn Rule) -> Self {
        let mut table = [Cell::Dead; 18];
        for neighbors in 0u8..=8 {
            table[neighbors as usize] = rule.evolve(Cell::Dead, neighbors);
            table[9 + neighbors as usize] = rule.evolve(Cell::Alive, neighbors);
        }
        Self(table)
    }

    #[inline]
    pub fn next(&self, current: Cell, neighbors: u8) -> Cell {
        debug_assert!(neighbors <= 8);
        self.0[current.as_byte() as usize * 9 + neighbors as usize]
    }
}

/// Get all available rules
pub fn all_rules() -> Vec<(&'static str, Box<dyn Rule>)> {
    vec![
        ("Conway", Box::new(ConwayRule) as Box<dyn Rule>),
        ("HighLife", Box::new(HighLifeRule)),
        ("Seeds", Box::new(SeedsRule)),
        ("Day&Night", Box::new(DayAndNightRule)),
    ]
}

/// Get default rule (Conway's Life)
pub fn default_rule() -> Box<dyn Rule> {
    Box::new(ConwayRule)
}
