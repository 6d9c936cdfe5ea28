//! Error taxonomy shared by containers, modules, and the merge engine.

use thiserror::Error;

/// Errors raised by container construction, container arithmetic, and module
/// entry points.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Malformed construction arguments (no channels, channels too short or of
    /// unequal length, non-string labels, invalid rate).
    #[error("validation failed: {0}")]
    Validation(String),

    /// Operands disagree on channel count, length, or rate/resolution.
    #[error("incompatible operands: {0}")]
    Incompatible(String),

    /// A zero-valued sample on the divisor side of a division.
    #[error("division by zero")]
    DivisionByZero,

    /// An operation referenced an unknown input or endpoint.
    #[error("unknown reference: {0}")]
    Reference(String),

    /// Output was requested while the inputs conflict.
    #[error("conflicting inputs: {0}")]
    Conflict(String),
}

impl Error {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    /// Create an incompatibility error.
    pub fn incompatible(msg: impl Into<String>) -> Self {
        Error::Incompatible(msg.into())
    }

    /// Create a reference error.
    pub fn reference(msg: impl Into<String>) -> Self {
        Error::Reference(msg.into())
    }

    /// Create a conflict error.
    pub fn conflict(msg: impl Into<String>) -> Self {
        Error::Conflict(msg.into())
    }
}

/// Result alias used throughout the rheo crates.
pub type Result<T, E = Error> = std::result::Result<T, E>;
