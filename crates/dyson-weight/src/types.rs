//! Small enums shared by weights and their transforms.

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;

use crate::error::WeightError;

/// Behavior of a weight under `tau -> tau + beta`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TauSymmetry {
    /// Periodic in imaginary time (bosonic)
    Symmetric,
    /// Antiperiodic in imaginary time (fermionic)
    AntiSymmetric,
}

impl TauSymmetry {
    pub fn is_symmetric(self) -> bool {
        self == TauSymmetry::Symmetric
    }
}

impl FromStr for TauSymmetry {
    type Err = WeightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Symmetric" => Ok(TauSymmetry::Symmetric),
            "AntiSymmetric" => Ok(TauSymmetry::AntiSymmetric),
            other => Err(WeightError::invalid(format!(
                "Only accept Symmetric or AntiSymmetric, not {other}"
            ))),
        }
    }
}

impl fmt::Display for TauSymmetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TauSymmetry::Symmetric => write!(f, "Symmetric"),
            TauSymmetry::AntiSymmetric => write!(f, "AntiSymmetric"),
        }
    }
}

/// The two parts of a weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ComponentKind {
    /// Time-dependent part with a trailing tau axis
    SmoothT,
    /// Equal-time (delta function in tau) part
    DeltaT,
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 2] = [ComponentKind::SmoothT, ComponentKind::DeltaT];

    /// Whether the component carries the tau axis.
    pub fn has_tau(self) -> bool {
        self == ComponentKind::SmoothT
    }

    /// Archive key suffix.
    pub fn as_str(self) -> &'static str {
        match self {
            ComponentKind::SmoothT => "SmoothT",
            ComponentKind::DeltaT => "DeltaT",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Axis arrangement of a component's leading block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    /// `[NSpin^2, NSub^2, ...]`
    #[default]
    Merged,
    /// `[NSpin*NSub, NSpin*NSub, ...]` with (spin, sublattice) pairs as
    /// row and column indices
    SplitSwapped,
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layout::Merged => write!(f, "merged"),
            Layout::SplitSwapped => write!(f, "split-swapped"),
        }
    }
}

/// Direction of a Fourier transform or phase correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    /// `+1` forward, `-1` backward.
    pub fn sign(self) -> f64 {
        match self {
            Direction::Forward => 1.0,
            Direction::Backward => -1.0,
        }
    }
}

/// A domain a Fourier transform can act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Domain {
    /// Lattice sites <-> momenta
    Space,
    /// Tau bins <-> frequencies
    Time,
}

bitflags! {
    /// Set of domains a Fourier transform acts on.
    ///
    /// ```
    /// use dyson_weight::{Domain, Domains};
    ///
    /// let both = Domains::SPACE | Domains::TIME;
    /// assert_eq!(both, Domains::ALL);
    /// assert!(both.contains(Domain::Time.into()));
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Domains: u8 {
        const SPACE = 1 << 0;
        const TIME  = 1 << 1;
        const ALL   = Self::SPACE.bits() | Self::TIME.bits();
    }
}

impl From<Domain> for Domains {
    fn from(domain: Domain) -> Self {
        match domain {
            Domain::Space => Domains::SPACE,
            Domain::Time => Domains::TIME,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tau_symmetry_from_str() {
        assert_eq!("Symmetric".parse::<TauSymmetry>().unwrap(), TauSymmetry::Symmetric);
        assert_eq!(
            "AntiSymmetric".parse::<TauSymmetry>().unwrap(),
            TauSymmetry::AntiSymmetric
        );
        let err = "Periodic".parse::<TauSymmetry>().unwrap_err();
        assert!(matches!(err, WeightError::InvalidArgument { .. }));
        assert!(err.to_string().contains("Periodic"));
    }

    #[test]
    fn test_domains_set() {
        assert!(Domains::empty().is_empty());
        assert!(Domains::SPACE.contains(Domain::Space.into()));
        assert!(!Domains::SPACE.contains(Domain::Time.into()));
        let collected: Domains = [Domain::Time, Domain::Space]
            .into_iter()
            .map(Domains::from)
            .collect();
        assert_eq!(collected, Domains::ALL);
        assert_eq!(Domains::all(), Domains::ALL);
        assert_eq!(Domains::from(Domain::Time), Domains::TIME);
    }

    #[test]
    fn test_component_kind() {
        assert!(ComponentKind::SmoothT.has_tau());
        assert!(!ComponentKind::DeltaT.has_tau());
        assert_eq!(ComponentKind::DeltaT.to_string(), "DeltaT");
        assert_eq!(Direction::Backward.sign(), -1.0);
        assert_eq!(Layout::default(), Layout::Merged);
    }
}
