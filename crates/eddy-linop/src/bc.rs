//! Boundary-condition types understood by the linear operator.

use eddy_core::{Axis, DomainFace, Side, SPACEDIM};
use std::fmt;

/// How the operator treats one face of the problem domain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LinOpBcType {
    /// Values wrap around to the opposite face.
    Periodic,
    /// The unknown is prescribed on the face; the value comes from the
    /// level's boundary-condition data.
    Dirichlet,
    /// Zero normal gradient.
    Neumann,
}

impl fmt::Display for LinOpBcType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Periodic => write!(f, "periodic"),
            Self::Dirichlet => write!(f, "dirichlet"),
            Self::Neumann => write!(f, "neumann"),
        }
    }
}

/// Operator boundary types for the low and high face of every axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DomainBc {
    /// Low-face types, indexed by axis.
    pub lo: [LinOpBcType; SPACEDIM],
    /// High-face types, indexed by axis.
    pub hi: [LinOpBcType; SPACEDIM],
}

impl DomainBc {
    /// Create from explicit low and high arrays.
    pub fn new(lo: [LinOpBcType; SPACEDIM], hi: [LinOpBcType; SPACEDIM]) -> Self {
        Self { lo, hi }
    }

    /// Every face periodic.
    pub fn periodic() -> Self {
        Self::uniform(LinOpBcType::Periodic)
    }

    /// Every face of one type.
    pub fn uniform(ty: LinOpBcType) -> Self {
        Self {
            lo: [ty; SPACEDIM],
            hi: [ty; SPACEDIM],
        }
    }

    /// Type on one domain face.
    pub fn face(&self, face: DomainFace) -> LinOpBcType {
        match face.side {
            Side::Lo => self.lo[face.axis.index()],
            Side::Hi => self.hi[face.axis.index()],
        }
    }

    /// Returns `true` if an axis is periodic on both faces exactly when
    /// the geometry says it is.
    pub fn matches_periodicity(&self, periodic: [bool; SPACEDIM]) -> bool {
        Axis::ALL.iter().all(|&a| {
            let d = a.index();
            let lo = self.lo[d] == LinOpBcType::Periodic;
            let hi = self.hi[d] == LinOpBcType::Periodic;
            lo == periodic[d] && hi == periodic[d]
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn face_lookup() {
        let bc = DomainBc::new(
            [LinOpBcType::Periodic, LinOpBcType::Dirichlet, LinOpBcType::Neumann],
            [LinOpBcType::Periodic, LinOpBcType::Neumann, LinOpBcType::Dirichlet],
        );
        assert_eq!(bc.face(DomainFace::new(Axis::Y, Side::Lo)), LinOpBcType::Dirichlet);
        assert_eq!(bc.face(DomainFace::new(Axis::Z, Side::Hi)), LinOpBcType::Dirichlet);
        assert!(bc.matches_periodicity([true, false, false]));
        assert!(!bc.matches_periodicity([true, true, false]));
    }
}
