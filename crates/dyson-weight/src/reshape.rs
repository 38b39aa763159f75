//! Conversion between merged and split-swapped layouts.
//!
//! Merged:         `[NSpin^2, NSub^2, rest...]`
//! Split:          `[NSpin, NSpin, NSub, NSub, rest...]`
//! Split-swapped:  `[NSpin, NSub, NSpin, NSub, rest...]` stored as
//!                 `[NSpin*NSub, NSpin*NSub, rest...]`
//!
//! In split-swapped layout the leading two axes are the row and column of
//! the spin-sublattice matrix at every `(site, tau)` coordinate.

use dyson_indexmap::Axis;

use crate::error::Result;
use crate::storage::DenseStorage;
use crate::types::Layout;
use crate::weight::Weight;

/// Swap axes 1 and 2 of a rank-4 leading block, keeping the trailing axes.
fn swap_inner_axes(
    storage: DenseStorage,
    view: [usize; 4],
    rest: &[usize],
    out: [usize; 2],
) -> DenseStorage {
    let mut view_dims = view.to_vec();
    view_dims.extend_from_slice(rest);
    let mut perm = vec![0, 2, 1, 3];
    perm.extend(4..4 + rest.len());
    let mut out_dims = out.to_vec();
    out_dims.extend_from_slice(rest);

    storage.reshape(&view_dims).permute(&perm).reshape(&out_dims)
}

impl Weight {
    fn transit(&mut self, from: Layout, to: Layout) -> Result<()> {
        let kinds = self.present_kinds();
        for &kind in &kinds {
            self.check_layout(kind, from)?;
            self.check_shape(kind)?;
        }

        let nspin = self.flavor.nspin();
        let nsub = self.map.n_sublattice();
        for kind in kinds {
            let rest = self.declared_dims(kind, Layout::Merged)[Axis::Volume.position()..].to_vec();
            if let Some(component) = self.component_mut(kind) {
                let storage = std::mem::replace(&mut component.storage, DenseStorage::empty());
                component.storage = match to {
                    Layout::SplitSwapped => swap_inner_axes(
                        storage,
                        [nspin, nspin, nsub, nsub],
                        &rest,
                        [nspin * nsub, nspin * nsub],
                    ),
                    Layout::Merged => swap_inner_axes(
                        storage,
                        [nspin, nsub, nspin, nsub],
                        &rest,
                        [nspin * nspin, nsub * nsub],
                    ),
                };
                component.layout = to;
            }
        }
        Ok(())
    }

    /// Rearrange every component from merged into split-swapped layout.
    pub fn to_split_swapped(&mut self) -> Result<()> {
        self.transit(Layout::Merged, Layout::SplitSwapped)
    }

    /// Exact inverse of [`to_split_swapped`](Self::to_split_swapped).
    pub fn to_merged(&mut self) -> Result<()> {
        self.transit(Layout::SplitSwapped, Layout::Merged)
    }
}
