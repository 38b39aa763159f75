//! Error types for dyson-indexmap

use thiserror::Error;

/// Result type for index-map operations
pub type Result<T> = std::result::Result<T, IndexMapError>;

/// Errors that can occur while building or querying an [`IndexMap`](crate::IndexMap)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IndexMapError {
    /// Malformed construction parameter or unknown selector string
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// Coordinate has the wrong number of lattice dimensions
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

impl IndexMapError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}
