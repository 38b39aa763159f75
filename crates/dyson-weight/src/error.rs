//! Error types for dyson-weight

use std::fmt;

use dyson_indexmap::IndexMapError;
use thiserror::Error;

use crate::types::{ComponentKind, Layout};

/// Result type for weight operations
pub type Result<T> = std::result::Result<T, WeightError>;

/// One block that could not be inverted.
#[derive(Debug, Clone, PartialEq)]
pub struct SingularBlock {
    /// Component holding the block
    pub component: ComponentKind,
    /// Spin-block index for one-spin weights; `None` when the whole
    /// spin-sublattice matrix was inverted
    pub spin: Option<usize>,
    /// Flattened (site, tau) coordinate of the block
    pub coordinate: usize,
}

impl fmt::Display for SingularBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.spin {
            Some(s) => write!(f, "{}[{},:,:,{}]", self.component, s, self.coordinate),
            None => write!(f, "{}[:,:,{}]", self.component, self.coordinate),
        }
    }
}

fn join_blocks(blocks: &[SingularBlock]) -> String {
    blocks
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors that can occur while building, transforming or inverting a weight
#[derive(Error, Debug)]
pub enum WeightError {
    /// Malformed construction parameter
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// Error from the index map
    #[error(transparent)]
    IndexMap(#[from] IndexMapError),

    /// Declared and observed shapes disagree
    #[error("Shape {expected:?} is expected instead of shape {actual:?} for {component} (mismatch at axis {axis})")]
    ShapeMismatch {
        component: String,
        axis: usize,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// Reshape requested from the wrong layout
    #[error("{component} is in {actual} layout, expected {expected}")]
    LayoutMismatch {
        component: String,
        expected: Layout,
        actual: Layout,
    },

    /// Operation needs a component the weight does not have
    #[error("{name} has no {kind} component")]
    MissingComponent { name: String, kind: ComponentKind },

    /// At least one block submitted to inversion is not invertible
    #[error("Fail to inverse {} block(s) of {name}: {}", .blocks.len(), join_blocks(.blocks))]
    SingularMatrix {
        name: String,
        blocks: Vec<SingularBlock>,
    },

    /// None of the weight's components is present in the archive
    #[error("{name} not found in {path}!")]
    QuantityNotFound { name: String, path: String },

    /// Archive could not be read or written
    #[error("Archive I/O failed for {path}: {message}")]
    Io { path: String, message: String },
}

impl WeightError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Build a [`WeightError::ShapeMismatch`] pointing at the first differing axis.
    pub(crate) fn shape_mismatch(component: String, expected: &[usize], actual: &[usize]) -> Self {
        let axis = expected
            .iter()
            .zip(actual.iter())
            .position(|(e, a)| e != a)
            .unwrap_or_else(|| expected.len().min(actual.len()));
        Self::ShapeMismatch {
            component,
            axis,
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        }
    }
}
