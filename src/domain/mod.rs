mod cell;
mod grid;
mod rules;
mod patterns;
pub mod rle;

pub use cell::Cell;
pub use grid::{Grid, GridError};
pub use rules::{
    ConwayRule, DayAndNightRule, HighLifeRule, LifeLikeRule, NeighborMask, Rule, RuleParseError,
    RuleTable, SeedsRule, all_rules, default_rule,
};
pub use patterns::{Pattern, Run, Stamp, presets};
pub use rle::{DecodeError, MalformedReason, RleDocument, decode, parse_document};
