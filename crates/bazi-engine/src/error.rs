//! Error types for bazi-engine operations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BaziError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Location resolution failed: {0}")]
    Location(#[from] LocationError),

    #[error("Table lookup gap: {0}")]
    TableLookupGap(String),

    #[error("Solar term search failed: {0}")]
    SolarTermSearch(String),
}

/// Failures reported by a [`LocationResolver`](crate::location::LocationResolver).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LocationError {
    #[error("location not found: '{0}'")]
    NotFound(String),

    #[error("current location unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, BaziError>;
