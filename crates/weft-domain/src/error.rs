//! Domain-level validation errors

use thiserror::Error;

/// Errors raised when a relationship is malformed.
///
/// Validation happens before a relationship reaches the store; a store
/// implementation never has to defend against these states.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A relationship must connect two distinct files
    #[error("Self-relationship not allowed: {0}")]
    SelfRelationship(String),

    /// Source or target path is empty
    #[error("Empty {0} path")]
    EmptyPath(&'static str),

    /// Strength or confidence outside [0, 1]
    #[error("{field} must be in [0, 1], got {value}")]
    StrengthOutOfRange {
        /// Which field was rejected
        field: &'static str,
        /// The rejected value
        value: f64,
    },

    /// Strength or confidence is NaN or infinite
    #[error("{0} must be a finite number")]
    NonFiniteStrength(&'static str),

    /// Metadata keys must be non-empty
    #[error("Metadata keys must be non-empty")]
    EmptyMetadataKey,

    /// Relationship type string could not be parsed
    #[error("Unknown relationship type: {0}")]
    UnknownType(String),
}
