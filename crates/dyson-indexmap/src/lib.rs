//! Index algebra for finite-temperature lattice propagators.
//!
//! Every weight array in the Dyson workspace is laid out as
//! `[SpinBlock, SublatticeBlock, Volume, Tau]` (the `Tau` axis is absent for
//! instantaneous components). [`IndexMap`] owns the run parameters that give
//! these axes their meaning and turns physical labels into flat indices:
//!
//! - imaginary time ↔ time bin ([`IndexMap::tau_bin_index`],
//!   [`IndexMap::bin_center_time`])
//! - sublattice pairs ([`IndexMap::sublattice_pair_index`])
//! - lattice displacements ([`IndexMap::coordinate_index`])
//! - spin pairs and quads ([`IndexMap::spin_pair_index`],
//!   [`IndexMap::spin_quad_index`])
//! - spin-conserving subsets ([`IndexMap::conserved_spin_tuples`],
//!   [`IndexMap::conserved_spin_indices`])
//!
//! # Example
//!
//! ```
//! use dyson_indexmap::{IndexMap, SpinFlavor, SpinTuple};
//!
//! let map = IndexMap::new(1.0, &[8, 8], 2, 64).unwrap();
//! for tuple in map.conserved_spin_tuples(SpinFlavor::TwoSpin) {
//!     assert!(map.is_spin_conserved(tuple));
//! }
//! assert_eq!(map.conserved_spin_indices(SpinFlavor::OneSpin), vec![0, 3]);
//! ```

mod error;
mod index_map;
mod spin;

pub use error::{IndexMapError, Result};
pub use index_map::{Axis, IndexMap};
pub use spin::{Spin, SpinFlavor, SpinPair, SpinQuad, SpinTuple, SPIN, SPIN2, SPIN3, SPIN4};
