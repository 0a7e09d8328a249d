//! Material catalog errors.

use thiserror::Error;

/// Result type for material operations.
pub type MaterialResult<T> = Result<T, MaterialError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MaterialError {
    /// Lookup of a key that is not in the catalog.
    #[error("Unknown material: {name}")]
    UnknownMaterial { name: String },

    /// Composition entry with a negative or non-finite fraction.
    #[error("Non-physical mass fraction for {element}: {value}")]
    NonPhysicalFraction { element: String, value: f64 },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },
}
