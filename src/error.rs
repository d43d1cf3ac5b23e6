use thiserror::Error;

use crate::domain::{DecodeError, GridError};

/// Errors surfaced by the engine's fallible operations: construction,
/// resizing and decoding. Stepping, seeding and the export views are total.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
