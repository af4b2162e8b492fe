//! Error types for the IR crate.

use thiserror::Error;

/// Errors raised while constructing a module.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IrError {
    /// Malformed construction request.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Builder used out of sequence, e.g. appending after a terminator.
    #[error("Invalid builder state: {0}")]
    InvalidState(String),
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;
