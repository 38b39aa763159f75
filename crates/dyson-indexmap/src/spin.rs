//! Spin labels, spin tuples and spin flavors.

use std::fmt;
use std::str::FromStr;

use crate::error::{IndexMapError, Result};

/// Number of spin states of a single leg.
pub const SPIN: usize = 2;
/// `SPIN^2`, the extent of a spin-pair index.
pub const SPIN2: usize = SPIN * SPIN;
/// `SPIN^3`, the weight of the most significant digit of a spin-quad index.
pub const SPIN3: usize = SPIN2 * SPIN;
/// `SPIN^4`, the extent of a spin-quad index.
pub const SPIN4: usize = SPIN2 * SPIN2;

/// Spin of a single propagator leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Spin {
    Down = 0,
    Up = 1,
}

impl Spin {
    /// Both spin values in index order.
    pub const ALL: [Spin; 2] = [Spin::Down, Spin::Up];

    /// Integer code of the spin (0 for down, 1 for up).
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Spin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Spin::Down => write!(f, "DOWN"),
            Spin::Up => write!(f, "UP"),
        }
    }
}

/// Ordered (incoming, outgoing) spin pair of a one-particle quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpinPair {
    pub incoming: Spin,
    pub outgoing: Spin,
}

impl SpinPair {
    pub const fn new(incoming: Spin, outgoing: Spin) -> Self {
        Self { incoming, outgoing }
    }
}

impl fmt::Display for SpinPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.incoming, self.outgoing)
    }
}

/// Two spin pairs of a two-particle (vertex-like) quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpinQuad {
    pub incoming: SpinPair,
    pub outgoing: SpinPair,
}

impl SpinQuad {
    pub const fn new(incoming: SpinPair, outgoing: SpinPair) -> Self {
        Self { incoming, outgoing }
    }
}

impl fmt::Display for SpinQuad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.incoming, self.outgoing)
    }
}

/// A spin-index combination of either flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpinTuple {
    Pair(SpinPair),
    Quad(SpinQuad),
}

impl SpinTuple {
    /// Flavor this tuple belongs to.
    pub fn flavor(&self) -> SpinFlavor {
        match self {
            SpinTuple::Pair(_) => SpinFlavor::OneSpin,
            SpinTuple::Quad(_) => SpinFlavor::TwoSpin,
        }
    }
}

impl From<SpinPair> for SpinTuple {
    fn from(pair: SpinPair) -> Self {
        SpinTuple::Pair(pair)
    }
}

impl From<SpinQuad> for SpinTuple {
    fn from(quad: SpinQuad) -> Self {
        SpinTuple::Quad(quad)
    }
}

/// Number of spin flavors carried by a quantity.
///
/// One-particle quantities (`G`, `Sigma`) carry one spin pair, two-particle
/// quantities (`W`, `Polar`) carry two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpinFlavor {
    /// `NSpin = 2`
    OneSpin,
    /// `NSpin = 4`
    TwoSpin,
}

impl SpinFlavor {
    /// Number of spin combinations along one side of the spin block.
    pub fn nspin(self) -> usize {
        match self {
            SpinFlavor::OneSpin => SPIN,
            SpinFlavor::TwoSpin => SPIN2,
        }
    }

    /// Extent of the flattened spin-block axis (`NSpin^2`).
    pub fn spin_block_len(self) -> usize {
        match self {
            SpinFlavor::OneSpin => SPIN2,
            SpinFlavor::TwoSpin => SPIN4,
        }
    }
}

impl FromStr for SpinFlavor {
    type Err = IndexMapError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "OneSpin" => Ok(SpinFlavor::OneSpin),
            "TwoSpin" | "TwoSpins" => Ok(SpinFlavor::TwoSpin),
            other => Err(IndexMapError::invalid(format!(
                "Only accept OneSpin or TwoSpins, not {other}"
            ))),
        }
    }
}

impl fmt::Display for SpinFlavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpinFlavor::OneSpin => write!(f, "OneSpin"),
            SpinFlavor::TwoSpin => write!(f, "TwoSpins"),
        }
    }
}
