//! Error types for fieldscope.

use thiserror::Error;

/// The main error type for fieldscope operations.
#[derive(Error, Debug)]
pub enum FieldscopeError {
    /// A grid was constructed with a zero dimension or no components.
    #[error("invalid grid dimensions: nx={nx}, ny={ny}, components={components} (all must be >= 1)")]
    InvalidDimensions {
        nx: usize,
        ny: usize,
        components: usize,
    },

    /// A row, column or component index is outside its valid range.
    #[error("{what} index {index} out of range (length {len})")]
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },

    /// Data size mismatch on a bulk operation.
    #[error("data size mismatch: expected {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// A precondition on an argument was violated.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The operation is not supported in the current configuration.
    #[error("illegal state: {0}")]
    IllegalState(String),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FieldscopeError {
    /// Shorthand for an [`FieldscopeError::IndexOutOfRange`] error.
    #[must_use]
    pub fn index(what: &'static str, index: usize, len: usize) -> Self {
        Self::IndexOutOfRange { what, index, len }
    }
}

/// A specialized Result type for fieldscope operations.
pub type Result<T> = std::result::Result<T, FieldscopeError>;
