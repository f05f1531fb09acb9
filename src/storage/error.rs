//! Error types for store operations

use std::fmt;

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors reported by the event and metric stores
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The requested event does not exist (in history or in the pinned subset)
    NotFound(String),

    /// A query parameter could not be interpreted (e.g. an unknown log type)
    InvalidArgument(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotFound(msg) => write!(f, "not found: {}", msg),
            StoreError::InvalidArgument(msg) => write!(f, "invalid argument: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}
