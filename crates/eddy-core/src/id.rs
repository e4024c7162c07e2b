//! Axis, side, and domain-face identifiers.

use crate::index::IntVect;
use std::fmt;

/// Number of spatial dimensions.
pub const SPACEDIM: usize = 3;

/// A coordinate axis of the mesh.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Axis {
    /// First axis (`i` index).
    X,
    /// Second axis (`j` index).
    Y,
    /// Third axis (`k` index).
    Z,
}

impl Axis {
    /// All axes in index order.
    pub const ALL: [Axis; SPACEDIM] = [Axis::X, Axis::Y, Axis::Z];

    /// Position of this axis in an `[_; 3]` array.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Axis for an array position, or `None` if `i >= 3`.
    pub fn from_index(i: usize) -> Option<Self> {
        Self::ALL.get(i).copied()
    }

    /// Unit offset along this axis.
    pub fn unit(self) -> IntVect {
        let mut v = [0; SPACEDIM];
        v[self.index()] = 1;
        v
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X => write!(f, "x"),
            Self::Y => write!(f, "y"),
            Self::Z => write!(f, "z"),
        }
    }
}

/// Low or high end of an axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Side {
    /// The low end.
    Lo,
    /// The high end.
    Hi,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lo => write!(f, "lo"),
            Self::Hi => write!(f, "hi"),
        }
    }
}

/// One of the six faces of the problem domain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DomainFace {
    /// Axis normal to the face.
    pub axis: Axis,
    /// Which end of the axis.
    pub side: Side,
}

impl DomainFace {
    /// The six faces in `x-lo, x-hi, y-lo, y-hi, z-lo, z-hi` order.
    pub const ALL: [DomainFace; 6] = [
        DomainFace::new(Axis::X, Side::Lo),
        DomainFace::new(Axis::X, Side::Hi),
        DomainFace::new(Axis::Y, Side::Lo),
        DomainFace::new(Axis::Y, Side::Hi),
        DomainFace::new(Axis::Z, Side::Lo),
        DomainFace::new(Axis::Z, Side::Hi),
    ];

    /// Create a face identifier.
    pub const fn new(axis: Axis, side: Side) -> Self {
        Self { axis, side }
    }
}

impl fmt::Display for DomainFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.axis, self.side)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_roundtrips_through_index() {
        for axis in Axis::ALL {
            assert_eq!(Axis::from_index(axis.index()), Some(axis));
        }
        assert_eq!(Axis::from_index(3), None);
    }

    #[test]
    fn unit_vectors() {
        assert_eq!(Axis::X.unit(), [1, 0, 0]);
        assert_eq!(Axis::Y.unit(), [0, 1, 0]);
        assert_eq!(Axis::Z.unit(), [0, 0, 1]);
    }

    #[test]
    fn face_display() {
        assert_eq!(DomainFace::new(Axis::Y, Side::Hi).to_string(), "y-hi");
        assert_eq!(DomainFace::ALL[0].to_string(), "x-lo");
        assert_eq!(DomainFace::ALL[5].to_string(), "z-hi");
    }
}
