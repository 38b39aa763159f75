//! Index map implementation

use crate::error::{IndexMapError, Result};
use crate::spin::{Spin, SpinFlavor, SpinPair, SpinQuad, SpinTuple, SPIN, SPIN2, SPIN3};

/// Position of each axis in a weight array.
///
/// `DeltaT` components stop after [`Axis::Volume`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    SpinBlock = 0,
    SublatticeBlock = 1,
    Volume = 2,
    Tau = 3,
}

impl Axis {
    /// Axes in storage order.
    pub const ALL: [Axis; 4] = [
        Axis::SpinBlock,
        Axis::SublatticeBlock,
        Axis::Volume,
        Axis::Tau,
    ];

    /// Position of the axis in the array shape.
    pub fn position(self) -> usize {
        self as usize
    }
}

const CONSERVED_PAIRS: [SpinPair; 2] = [
    SpinPair::new(Spin::Down, Spin::Down),
    SpinPair::new(Spin::Up, Spin::Up),
];

const CONSERVED_QUADS: [SpinQuad; 6] = [
    SpinQuad::new(
        SpinPair::new(Spin::Down, Spin::Down),
        SpinPair::new(Spin::Down, Spin::Down),
    ),
    SpinQuad::new(
        SpinPair::new(Spin::Up, Spin::Up),
        SpinPair::new(Spin::Up, Spin::Up),
    ),
    SpinQuad::new(
        SpinPair::new(Spin::Up, Spin::Up),
        SpinPair::new(Spin::Down, Spin::Down),
    ),
    SpinQuad::new(
        SpinPair::new(Spin::Down, Spin::Down),
        SpinPair::new(Spin::Up, Spin::Up),
    ),
    SpinQuad::new(
        SpinPair::new(Spin::Up, Spin::Down),
        SpinPair::new(Spin::Down, Spin::Up),
    ),
    SpinQuad::new(
        SpinPair::new(Spin::Down, Spin::Up),
        SpinPair::new(Spin::Up, Spin::Down),
    ),
];

/// Index algebra of one run: imaginary-time binning, sublattice and spin
/// pair encoding, lattice displacement encoding.
///
/// An `IndexMap` is immutable once built and is shared (usually behind an
/// `Arc`) by every weight of the run.
///
/// # Example
/// ```
/// use dyson_indexmap::{IndexMap, Spin, SpinPair};
///
/// let map = IndexMap::new(1.0, &[8, 8], 2, 64).unwrap();
/// assert_eq!(map.volume(), 64);
/// assert_eq!(map.tau_bin_index(0.0, 0.5), 32);
/// assert_eq!(map.spin_pair_index(SpinPair::new(Spin::Up, Spin::Up)), 3);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct IndexMap {
    beta: f64,
    max_tau_bin: usize,
    d_beta: f64,
    d_beta_inverse: f64,
    lattice: Vec<usize>,
    n_sublattice: usize,
    volume: usize,
}

impl IndexMap {
    /// Create an index map.
    ///
    /// # Arguments
    /// * `beta` - inverse temperature, length of the imaginary-time circle
    /// * `lattice` - extent of every lattice dimension, first dimension outermost
    /// * `n_sublattice` - number of sublattices in the unit cell
    /// * `max_tau_bin` - number of imaginary-time bins
    pub fn new(
        beta: f64,
        lattice: &[usize],
        n_sublattice: usize,
        max_tau_bin: usize,
    ) -> Result<Self> {
        if !(beta.is_finite() && beta > 0.0) {
            return Err(IndexMapError::invalid(format!(
                "Beta must be a positive number, got {beta}"
            )));
        }
        if max_tau_bin == 0 {
            return Err(IndexMapError::invalid("MaxTauBin must be positive"));
        }
        if lattice.is_empty() {
            return Err(IndexMapError::invalid(
                "At least one lattice dimension must be specified",
            ));
        }
        if let Some(dim) = lattice.iter().position(|&l| l == 0) {
            return Err(IndexMapError::invalid(format!(
                "Lattice extent of dimension {dim} must be positive"
            )));
        }
        if n_sublattice == 0 {
            return Err(IndexMapError::invalid("NSublattice must be positive"));
        }

        let d_beta = beta / max_tau_bin as f64;
        Ok(Self {
            beta,
            max_tau_bin,
            d_beta,
            d_beta_inverse: 1.0 / d_beta,
            lattice: lattice.to_vec(),
            n_sublattice,
            volume: lattice.iter().product(),
        })
    }

    /// Inverse temperature
    pub fn beta(&self) -> f64 {
        self.beta
    }

    /// Width of one imaginary-time bin
    pub fn d_beta(&self) -> f64 {
        self.d_beta
    }

    /// Number of imaginary-time bins
    pub fn max_tau_bin(&self) -> usize {
        self.max_tau_bin
    }

    /// Lattice extents
    pub fn lattice(&self) -> &[usize] {
        &self.lattice
    }

    /// Number of sublattices
    pub fn n_sublattice(&self) -> usize {
        self.n_sublattice
    }

    /// Number of lattice sites (product of the extents)
    pub fn volume(&self) -> usize {
        self.volume
    }

    /// Extent of `axis` in a weight of the given flavor.
    pub fn axis_len(&self, flavor: SpinFlavor, axis: Axis) -> usize {
        match axis {
            Axis::SpinBlock => flavor.spin_block_len(),
            Axis::SublatticeBlock => self.n_sublattice * self.n_sublattice,
            Axis::Volume => self.volume,
            Axis::Tau => self.max_tau_bin,
        }
    }

    /// Shape of a weight of the given flavor.
    ///
    /// `[NSpin^2, NSublattice^2, Volume]`, followed by `MaxTauBin` when
    /// `with_tau` is set.
    pub fn weight_dims(&self, flavor: SpinFlavor, with_tau: bool) -> Vec<usize> {
        let rank = if with_tau {
            Axis::ALL.len()
        } else {
            Axis::Tau.position()
        };
        Axis::ALL[..rank]
            .iter()
            .map(|&axis| self.axis_len(flavor, axis))
            .collect()
    }

    // ========================================================================
    // Imaginary time
    // ========================================================================

    /// Bin of the time difference `t_out - t_in` on the imaginary-time circle.
    ///
    /// Negative differences wrap around by one period, so the result is
    /// always in `[0, max_tau_bin)`.
    pub fn tau_bin_index(&self, t_in: f64, t_out: f64) -> usize {
        let tau = t_out - t_in;
        let bin = (tau * self.d_beta_inverse).floor() as i64;
        bin.rem_euclid(self.max_tau_bin as i64) as usize
    }

    /// Representative time of a bin: its midpoint `(bin + 0.5) * d_beta`.
    pub fn bin_center_time(&self, bin: usize) -> f64 {
        (bin as f64 + 0.5) * self.d_beta
    }

    // ========================================================================
    // Sublattice and lattice
    // ========================================================================

    /// Flattened (incoming, outgoing) sublattice index.
    ///
    /// # Panics
    /// Panics if either sublattice is not smaller than `n_sublattice`.
    pub fn sublattice_pair_index(&self, sub_in: usize, sub_out: usize) -> usize {
        assert!(
            sub_in < self.n_sublattice && sub_out < self.n_sublattice,
            "sublattice ({sub_in}, {sub_out}) out of range [0, {})",
            self.n_sublattice
        );
        sub_in * self.n_sublattice + sub_out
    }

    /// Row-major index of the displacement `to - from` on the periodic lattice.
    pub fn coordinate_index(&self, from: &[i64], to: &[i64]) -> Result<usize> {
        let ndims = self.lattice.len();
        for coord in [from, to] {
            if coord.len() != ndims {
                return Err(IndexMapError::DimensionMismatch {
                    expected: ndims,
                    actual: coord.len(),
                });
            }
        }

        let index = self
            .lattice
            .iter()
            .zip(from.iter().zip(to.iter()))
            .fold(0usize, |acc, (&l, (&f, &t))| {
                acc * l + (t - f).rem_euclid(l as i64) as usize
            });
        Ok(index)
    }

    // ========================================================================
    // Spin
    // ========================================================================

    /// Index of a one-particle spin pair: `in * 2 + out`.
    pub fn spin_pair_index(&self, pair: SpinPair) -> usize {
        pair.incoming.index() * SPIN + pair.outgoing.index()
    }

    /// Index of a two-particle spin quad, base-2 digits most significant first.
    pub fn spin_quad_index(&self, quad: SpinQuad) -> usize {
        quad.incoming.incoming.index() * SPIN3
            + quad.incoming.outgoing.index() * SPIN2
            + quad.outgoing.incoming.index() * SPIN
            + quad.outgoing.outgoing.index()
    }

    /// Index of a spin tuple of either flavor.
    pub fn spin_index(&self, tuple: SpinTuple) -> usize {
        match tuple {
            SpinTuple::Pair(pair) => self.spin_pair_index(pair),
            SpinTuple::Quad(quad) => self.spin_quad_index(quad),
        }
    }

    /// Whether the tuple conserves spin.
    ///
    /// A pair conserves spin if `in == out`; a quad if the spin flowing in
    /// through both legs equals the spin flowing out.
    pub fn is_spin_conserved(&self, tuple: SpinTuple) -> bool {
        match tuple {
            SpinTuple::Pair(p) => p.incoming == p.outgoing,
            SpinTuple::Quad(q) => {
                q.incoming.incoming.index() + q.outgoing.incoming.index()
                    == q.incoming.outgoing.index() + q.outgoing.outgoing.index()
            }
        }
    }

    /// Spin-conserving tuples of a flavor, in canonical order.
    ///
    /// The order and count (2 for one-spin, 6 for two-spin) are fixed; the
    /// inversion subsystem visits blocks in exactly this order.
    pub fn conserved_spin_tuples(&self, flavor: SpinFlavor) -> Vec<SpinTuple> {
        match flavor {
            SpinFlavor::OneSpin => CONSERVED_PAIRS.iter().copied().map(SpinTuple::Pair).collect(),
            SpinFlavor::TwoSpin => CONSERVED_QUADS.iter().copied().map(SpinTuple::Quad).collect(),
        }
    }

    /// [`conserved_spin_tuples`](Self::conserved_spin_tuples) mapped through
    /// the pair / quad index.
    pub fn conserved_spin_indices(&self, flavor: SpinFlavor) -> Vec<usize> {
        self.conserved_spin_tuples(flavor)
            .into_iter()
            .map(|t| self.spin_index(t))
            .collect()
    }
}
