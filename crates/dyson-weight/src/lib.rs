//! Weight tensors for Dyson-equation calculations.
//!
//! A [`Weight`] holds a propagator or interaction over spin, sublattice,
//! lattice sites and imaginary time as up to two dense complex components
//! (`SmoothT` with a tau axis, `DeltaT` without). On top of the storage it
//! provides:
//!
//! - Fourier transforms over space and/or time, with the phase correction
//!   that antisymmetric (fermionic) weights need ([`Weight::fourier_transform`],
//!   [`Weight::change_symmetry`])
//! - conversion to and from the split-swapped layout in which the leading
//!   axes form a spin-sublattice matrix ([`Weight::to_split_swapped`],
//!   [`Weight::to_merged`])
//! - block inversion that only ever mixes spin-conserving entries
//!   ([`Weight::inverse`])
//! - persistence to named-array archives ([`Weight::save`], [`Weight::load`])
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use dyson_indexmap::{IndexMap, SpinFlavor};
//! use dyson_weight::{Direction, Domains, TauSymmetry, Weight};
//!
//! let map = Arc::new(IndexMap::new(1.0, &[4], 1, 8).unwrap());
//! let mut g = Weight::builder("G", map)
//!     .flavor(SpinFlavor::OneSpin)
//!     .symmetry(TauSymmetry::AntiSymmetric)
//!     .with_smooth_t()
//!     .build()
//!     .unwrap();
//! g.fourier_transform(Direction::Forward, Domains::SPACE | Domains::TIME).unwrap();
//! g.fourier_transform(Direction::Backward, Domains::ALL).unwrap();
//! ```

mod error;
mod fourier;
mod inverse;
mod linalg;
mod reshape;
mod storage;
mod types;
mod weight;

pub use error::{Result, SingularBlock, WeightError};
pub use linalg::{invert, SingularPivot};
pub use storage::DenseStorage;
pub use types::{ComponentKind, Direction, Domain, Domains, Layout, TauSymmetry};
pub use weight::{Weight, WeightBuilder};

pub use dyson_archive::SaveMode;
