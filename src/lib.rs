// Domain layer - cells, grid, rules and pattern decoding
pub mod domain;

// Application layer - the engine an external driver steps
pub mod application;

// Export views - text rendering
pub mod rendering;

mod error;

// Re-exports for convenience
pub use domain::{
    Cell, DecodeError, Grid, GridError, MalformedReason, Pattern, Rule, Stamp, decode, presets,
};
pub use application::Engine;
pub use rendering::Glyphs;
pub use error::{Error, Result};
