//! Embedded-boundary geometry: cut-cell classification and normals.

use crate::geometry::Geometry;
use eddy_core::{IndexBox, IntVect, SPACEDIM};
use smallvec::SmallVec;
use std::fmt;

/// Classification of a cell, or of a whole region of cells, against an
/// embedded obstacle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FabType {
    /// Entirely inside the obstacle.
    Covered,
    /// Entirely in the fluid.
    Regular,
    /// Cut by the boundary, or (for a region) a mix of kinds.
    Cut,
}

impl fmt::Display for FabType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Covered => write!(f, "covered"),
            Self::Regular => write!(f, "regular"),
            Self::Cut => write!(f, "cut"),
        }
    }
}

/// Per-level embedded-boundary geometry.
///
/// # Contract
///
/// - `fab_type(region)` is `Covered` only if every cell of `region` is
///   covered, `Regular` only if every cell is regular, and `Cut`
///   otherwise.
/// - `boundary_normal(cell)` is a unit vector pointing out of the fluid
///   for cut cells and the zero vector for every other cell.
///
/// The default `fab_type` folds `cell_type` over the region; backends
/// with a cheaper test may override it.
pub trait EbFactory: Send + Sync + 'static {
    /// Classification of a single cell.
    fn cell_type(&self, cell: &IntVect) -> FabType;

    /// Boundary normal at `cell`.
    fn boundary_normal(&self, cell: &IntVect) -> [f64; SPACEDIM];

    /// Classification of every cell of `region` taken together.
    fn fab_type(&self, region: &IndexBox) -> FabType {
        let mut seen_covered = false;
        let mut seen_regular = false;
        for p in region.iter() {
            match self.cell_type(&p) {
                FabType::Cut => return FabType::Cut,
                FabType::Covered => seen_covered = true,
                FabType::Regular => seen_regular = true,
            }
            if seen_covered && seen_regular {
                return FabType::Cut;
            }
        }
        if seen_covered {
            FabType::Covered
        } else {
            FabType::Regular
        }
    }
}

/// A level with no embedded boundary: every cell is regular.
#[derive(Clone, Copy, Debug, Default)]
pub struct RegularFactory;

impl EbFactory for RegularFactory {
    fn cell_type(&self, _cell: &IntVect) -> FabType {
        FabType::Regular
    }

    fn boundary_normal(&self, _cell: &IntVect) -> [f64; SPACEDIM] {
        [0.0; SPACEDIM]
    }

    fn fab_type(&self, _region: &IndexBox) -> FabType {
        FabType::Regular
    }
}

/// A solid cylinder aligned with the z axis.
///
/// Cells are classified by testing their four xy corners against the
/// circle: all inside is covered, some inside is cut. With no corner
/// inside, the point of the cell nearest the axis decides between cut
/// and regular, so an arc that dips through one face or a body smaller
/// than a cell is still seen. The boundary normal of a cut cell points from the cell centre
/// towards the cylinder axis.
#[derive(Clone, Debug)]
pub struct CylinderFactory {
    geom: Geometry,
    center: [f64; 2],
    radius: f64,
}

impl CylinderFactory {
    /// Cylinder of `radius` around the line `(center[0], center[1], z)` on
    /// the level described by `geom`.
    pub fn new(geom: Geometry, center: [f64; 2], radius: f64) -> Self {
        Self {
            geom,
            center,
            radius,
        }
    }

    /// The cylinder axis position.
    pub fn center(&self) -> [f64; 2] {
        self.center
    }

    /// The cylinder radius.
    pub fn radius(&self) -> f64 {
        self.radius
    }

    fn inside(&self, x: f64, y: f64) -> bool {
        let dx = x - self.center[0];
        let dy = y - self.center[1];
        dx * dx + dy * dy < self.radius * self.radius
    }

    fn corners(&self, cell: &IntVect) -> SmallVec<[(f64, f64); 4]> {
        let lo = self.geom.cell_lo(cell);
        let h = self.geom.cell_size();
        let mut out = SmallVec::new();
        for oy in [0.0, h[1]] {
            for ox in [0.0, h[0]] {
                out.push((lo[0] + ox, lo[1] + oy));
            }
        }
        out
    }

    /// Point of the cell's xy footprint closest to the axis.
    fn nearest(&self, cell: &IntVect) -> (f64, f64) {
        let lo = self.geom.cell_lo(cell);
        let h = self.geom.cell_size();
        (
            self.center[0].clamp(lo[0], lo[0] + h[0]),
            self.center[1].clamp(lo[1], lo[1] + h[1]),
        )
    }
}

impl EbFactory for CylinderFactory {
    fn cell_type(&self, cell: &IntVect) -> FabType {
        let inside = self
            .corners(cell)
            .iter()
            .filter(|&&(x, y)| self.inside(x, y))
            .count();
        match inside {
            0 => {
                let (x, y) = self.nearest(cell);
                if self.inside(x, y) {
                    FabType::Cut
                } else {
                    FabType::Regular
                }
            }
            4 => FabType::Covered,
            _ => FabType::Cut,
        }
    }

    fn boundary_normal(&self, cell: &IntVect) -> [f64; SPACEDIM] {
        if self.cell_type(cell) != FabType::Cut {
            return [0.0; SPACEDIM];
        }
        let c = self.geom.cell_center(cell);
        let dx = c[0] - self.center[0];
        let dy = c[1] - self.center[1];
        let r = dx.hypot(dy);
        if r == 0.0 {
            return [0.0; SPACEDIM];
        }
        [-dx / r, -dy / r, 0.0]
    }
}
