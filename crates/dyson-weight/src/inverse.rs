//! Matrix inversion of spin-conserving blocks.

use dyson_indexmap::{Axis, SpinFlavor};
use faer::Mat;
use num_complex::Complex64;
use tracing::error;

use crate::error::{Result, SingularBlock, WeightError};
use crate::linalg::{invert, SingularPivot};
use crate::types::{ComponentKind, Layout};
use crate::weight::Weight;

/// Invert the `n x n` matrices stored at `(base + r * n + c) * rest + j`
/// for every coordinate `j < rest`.
///
/// Returns the coordinates whose matrix is singular; those are left untouched.
fn invert_blocks(
    data: &mut [Complex64],
    base: usize,
    n: usize,
    rest: usize,
    describe: impl Fn(usize) -> String,
) -> Vec<usize> {
    let at = |r: usize, c: usize, j: usize| (base + r * n + c) * rest + j;
    let mut failed = Vec::new();
    for j in 0..rest {
        let matrix = Mat::from_fn(n, n, |r, c| data[at(r, c, j)]);
        match invert(matrix.as_ref()) {
            Ok(inverse) => {
                for r in 0..n {
                    for c in 0..n {
                        data[at(r, c, j)] = inverse[(r, c)];
                    }
                }
            }
            Err(SingularPivot(step)) => {
                error!(
                    "Fail to inverse matrix {} (no pivot at step {}):\n{:?}",
                    describe(j),
                    step,
                    matrix
                );
                failed.push(j);
            }
        }
    }
    failed
}

/// `(site, tau)` of a flattened coordinate, as text.
fn describe_coordinate(kind: ComponentKind, ntau: usize, j: usize) -> String {
    if kind.has_tau() {
        format!("site {}, tau {}", j / ntau, j % ntau)
    } else {
        format!("site {j}")
    }
}

impl Weight {
    /// Number of `(site, tau)` coordinates of a component.
    fn coordinate_count(&self, kind: ComponentKind) -> usize {
        self.declared_dims(kind, Layout::Merged)[Axis::Volume.position()..]
            .iter()
            .product()
    }

    /// Invert the weight block by block.
    ///
    /// One-spin weights invert the `NSub x NSub` sublattice matrix of each
    /// conserved spin pair at every `(site, tau)`; other spin blocks are left
    /// untouched. Two-spin weights invert the full `(NSpin*NSub)^2`
    /// spin-sublattice matrix at every `(site, tau)` through the split-swapped
    /// layout.
    ///
    /// Every block is attempted. Singular blocks are logged, left as they
    /// were and reported together in [`WeightError::SingularMatrix`]; the
    /// weight is back in merged layout either way.
    pub fn inverse(&mut self) -> Result<()> {
        let kinds = self.present_kinds();
        for &kind in &kinds {
            self.check_merged(kind)?;
        }

        let nsub = self.map.n_sublattice();
        let ntau = self.map.max_tau_bin();
        let mut failures = Vec::new();
        match self.flavor {
            SpinFlavor::OneSpin => {
                let spins = self.map.conserved_spin_indices(SpinFlavor::OneSpin);
                for kind in kinds {
                    let rest = self.coordinate_count(kind);
                    let key = self.key(kind);
                    let Some(storage) = self.storage_mut(kind) else {
                        continue;
                    };
                    for &s in &spins {
                        let failed = invert_blocks(
                            storage.as_mut_slice(),
                            s * nsub * nsub,
                            nsub,
                            rest,
                            |j| format!("{key}[{s}] at {}", describe_coordinate(kind, ntau, j)),
                        );
                        failures.extend(failed.into_iter().map(|coordinate| SingularBlock {
                            component: kind,
                            spin: Some(s),
                            coordinate,
                        }));
                    }
                }
            }
            SpinFlavor::TwoSpin => {
                let n = self.flavor.nspin() * nsub;
                self.to_split_swapped()?;
                for kind in kinds {
                    let rest = self.coordinate_count(kind);
                    let key = self.key(kind);
                    let Some(storage) = self.storage_mut(kind) else {
                        continue;
                    };
                    let failed = invert_blocks(
                        storage.as_mut_slice(),
                        0,
                        n,
                        rest,
                        |j| format!("{key} at {}", describe_coordinate(kind, ntau, j)),
                    );
                    failures.extend(failed.into_iter().map(|coordinate| SingularBlock {
                        component: kind,
                        spin: None,
                        coordinate,
                    }));
                }
                self.to_merged()?;
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(WeightError::SingularMatrix {
                name: self.name.clone(),
                blocks: failures,
            })
        }
    }
}
