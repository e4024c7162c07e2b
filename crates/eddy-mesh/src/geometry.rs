//! Physical geometry of one mesh level.

use crate::error::MeshError;
use eddy_core::{Axis, IndexBox, IntVect, Periodicity, SPACEDIM};
use std::cmp::Ordering;

/// Index-space domain, physical extents, and periodicity of a level.
#[derive(Clone, Debug, PartialEq)]
pub struct Geometry {
    domain: IndexBox,
    prob_lo: [f64; SPACEDIM],
    prob_hi: [f64; SPACEDIM],
    periodic: [bool; SPACEDIM],
}

impl Geometry {
    /// Create a geometry for a cell-centred `domain` spanning
    /// `prob_lo..prob_hi`.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::EmptyDomain`] if `domain` has no cells and
    /// [`MeshError::InvalidExtents`] if `prob_hi <= prob_lo` on any axis.
    pub fn new(
        domain: IndexBox,
        prob_lo: [f64; SPACEDIM],
        prob_hi: [f64; SPACEDIM],
        periodic: [bool; SPACEDIM],
    ) -> Result<Self, MeshError> {
        if domain.is_empty() {
            return Err(MeshError::EmptyDomain);
        }
        for axis in Axis::ALL {
            let d = axis.index();
            if prob_hi[d].partial_cmp(&prob_lo[d]) != Some(Ordering::Greater) {
                return Err(MeshError::InvalidExtents { axis });
            }
        }
        Ok(Self {
            domain,
            prob_lo,
            prob_hi,
            periodic,
        })
    }

    /// The domain's cells.
    pub fn domain(&self) -> &IndexBox {
        &self.domain
    }

    /// Low physical corner.
    pub fn prob_lo(&self) -> [f64; SPACEDIM] {
        self.prob_lo
    }

    /// High physical corner.
    pub fn prob_hi(&self) -> [f64; SPACEDIM] {
        self.prob_hi
    }

    /// Periodic flags per axis.
    pub fn periodic(&self) -> [bool; SPACEDIM] {
        self.periodic
    }

    /// Returns `true` if `axis` is periodic.
    pub fn is_periodic(&self, axis: Axis) -> bool {
        self.periodic[axis.index()]
    }

    /// Cell widths.
    pub fn cell_size(&self) -> [f64; SPACEDIM] {
        let mut dx = [0.0; SPACEDIM];
        for axis in Axis::ALL {
            let d = axis.index();
            dx[d] = (self.prob_hi[d] - self.prob_lo[d]) / self.domain.length(axis) as f64;
        }
        dx
    }

    /// Periodic shifts for ghost exchange on this level.
    pub fn periodicity(&self) -> Periodicity {
        Periodicity::new(&self.domain, self.periodic)
    }

    /// Physical position of the low corner of `cell`.
    pub fn cell_lo(&self, cell: &IntVect) -> [f64; SPACEDIM] {
        let dx = self.cell_size();
        let lo = self.domain.lo();
        std::array::from_fn(|d| self.prob_lo[d] + (cell[d] - lo[d]) as f64 * dx[d])
    }

    /// Physical position of the centre of `cell`.
    pub fn cell_center(&self, cell: &IntVect) -> [f64; SPACEDIM] {
        let dx = self.cell_size();
        let lo = self.cell_lo(cell);
        std::array::from_fn(|d| lo[d] + 0.5 * dx[d])
    }

    /// Same physical extents with `ratio` times as many cells per axis.
    pub fn refine(&self, ratio: i32) -> Self {
        Self {
            domain: self.domain.refine(ratio),
            ..self.clone()
        }
    }
}
