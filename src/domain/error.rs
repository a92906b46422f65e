//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent input rows that cannot be placed in the hierarchy.
/// Only raised when strict depth validation is enabled.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("malformed row {row}: {reason}")]
    MalformedRow { row: usize, reason: String },

    #[error("row {row} jumps to depth {depth} after depth {previous}")]
    DepthJump {
        row: usize,
        depth: usize,
        previous: usize,
    },
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
