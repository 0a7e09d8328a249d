//! Error types for simulation operations.

use thiserror::Error;

/// Errors raised by the simulation engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    /// Invalid construction parameters. No engine is created.
    #[error("Configuration error: {what}")]
    Configuration { what: String },

    /// Operation not allowed in the engine's current run phase.
    #[error("Invalid state: {what}")]
    InvalidState { what: String },

    /// Unknown zone or material name under the rejecting admission policy.
    #[error("Unknown {kind}: {name}")]
    UnknownName { kind: &'static str, name: String },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },
}

pub type SimResult<T> = Result<T, SimError>;

impl From<eaf_core::CoreError> for SimError {
    fn from(e: eaf_core::CoreError) -> Self {
        SimError::Configuration {
            what: e.to_string(),
        }
    }
}
