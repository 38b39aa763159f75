//! Error types for dyson-calculator

use dyson_indexmap::IndexMapError;
use thiserror::Error;

/// Result type for parameter handling
pub type Result<T> = std::result::Result<T, ParameterError>;

/// Errors in run parameters
#[derive(Error, Debug)]
pub enum ParameterError {
    /// Beta outside `[InitialBeta, FinalBeta]`
    #[error("Beta should be between Initial and Final Beta, got {beta} not in [{initial}, {final_beta}]")]
    BetaOutOfRange {
        beta: f64,
        initial: f64,
        final_beta: f64,
    },

    /// Expansion order too large
    #[error("Order can not be bigger than {max}, got {order}")]
    OrderTooLarge { order: usize, max: usize },

    /// Parameters that do not describe a valid index map
    #[error(transparent)]
    IndexMap(#[from] IndexMapError),
}
