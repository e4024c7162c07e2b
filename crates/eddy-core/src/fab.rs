//! Dense multi-component storage over a single index box.

use crate::id::Axis;
use crate::index::{IndexBox, IntVect};

/// A dense array of `f64` values with `ncomp` components per point of an
/// [`IndexBox`].
///
/// Storage is component-major, then Fortran order (`i` fastest) within a
/// component, so each component is a contiguous slice. The box usually
/// includes ghost points; callers index with absolute level coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct Fab {
    region: IndexBox,
    ncomp: usize,
    data: Vec<f64>,
}

impl Fab {
    /// Allocate a zero-filled array over `region`.
    pub fn new(region: IndexBox, ncomp: usize) -> Self {
        Self {
            region,
            ncomp,
            data: vec![0.0; region.num_points() * ncomp],
        }
    }

    /// The full region covered by this array (valid plus ghost points).
    pub fn region(&self) -> &IndexBox {
        &self.region
    }

    /// Number of components per point.
    pub fn ncomp(&self) -> usize {
        self.ncomp
    }

    #[inline]
    fn offset(&self, p: &IntVect, comp: usize) -> usize {
        debug_assert!(
            self.region.contains(p),
            "point {p:?} outside fab region {}",
            self.region
        );
        debug_assert!(comp < self.ncomp, "component {comp} >= {}", self.ncomp);
        let lo = self.region.lo();
        let nx = self.region.length(Axis::X);
        let ny = self.region.length(Axis::Y);
        let nz = self.region.length(Axis::Z);
        let i = (p[0] - lo[0]) as usize;
        let j = (p[1] - lo[1]) as usize;
        let k = (p[2] - lo[2]) as usize;
        ((comp * nz + k) * ny + j) * nx + i
    }

    /// Value of component `comp` at `p`.
    #[inline]
    pub fn get(&self, p: &IntVect, comp: usize) -> f64 {
        self.data[self.offset(p, comp)]
    }

    /// Overwrite component `comp` at `p`.
    #[inline]
    pub fn set(&mut self, p: &IntVect, comp: usize, value: f64) {
        let o = self.offset(p, comp);
        self.data[o] = value;
    }

    /// Set components `comp..comp + ncomp` to `value` on the part of
    /// `region` that this array covers.
    pub fn set_val(&mut self, value: f64, region: &IndexBox, comp: usize, ncomp: usize) {
        let Some(isect) = self.region.intersect(region) else {
            return;
        };
        for n in comp..comp + ncomp {
            for p in isect.iter() {
                self.set(&p, n, value);
            }
        }
    }

    /// Set every value, ghost points included.
    pub fn fill(&mut self, value: f64) {
        self.data.fill(value);
    }

    /// Contiguous values of one component over the whole region.
    pub fn component(&self, comp: usize) -> &[f64] {
        let n = self.region.num_points();
        &self.data[comp * n..(comp + 1) * n]
    }

    /// All values, component-major.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }
}
