//! Integer index vectors and cell- or face-centred index boxes.

use crate::id::{Axis, SPACEDIM};
use std::fmt;

/// A point in the integer index space of one mesh level.
pub type IntVect = [i32; SPACEDIM];

/// Where the points of an [`IndexBox`] sit relative to mesh cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Centering {
    /// Points are cell centres.
    Cell,
    /// Points are the faces normal to the given axis. Face `i` along the
    /// axis separates cell `i - 1` from cell `i`.
    Face(Axis),
}

/// An axis-aligned, inclusive box of index points.
///
/// A box is empty when `hi < lo` along any axis. Cell-centred boxes
/// describe mesh cells; [`surrounding_nodes`](Self::surrounding_nodes)
/// converts one into the face-centred box of faces bounding those cells.
///
/// # Examples
///
/// ```
/// use eddy_core::{Axis, Centering, IndexBox};
///
/// let cells = IndexBox::new([0, 0, 0], [7, 3, 3]);
/// assert_eq!(cells.num_points(), 8 * 4 * 4);
///
/// let x_faces = cells.surrounding_nodes(Axis::X);
/// assert_eq!(x_faces.centering(), Centering::Face(Axis::X));
/// assert_eq!(x_faces.length(Axis::X), 9);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct IndexBox {
    lo: IntVect,
    hi: IntVect,
    centering: Centering,
}

impl IndexBox {
    /// Create a cell-centred box from inclusive corners.
    pub fn new(lo: IntVect, hi: IntVect) -> Self {
        Self::with_centering(lo, hi, Centering::Cell)
    }

    /// Create a box with an explicit centering.
    pub fn with_centering(lo: IntVect, hi: IntVect, centering: Centering) -> Self {
        Self { lo, hi, centering }
    }

    /// Low corner (inclusive).
    pub fn lo(&self) -> IntVect {
        self.lo
    }

    /// High corner (inclusive).
    pub fn hi(&self) -> IntVect {
        self.hi
    }

    /// Centering of the box's points.
    pub fn centering(&self) -> Centering {
        self.centering
    }

    /// Returns `true` if the box contains no points.
    pub fn is_empty(&self) -> bool {
        (0..SPACEDIM).any(|d| self.hi[d] < self.lo[d])
    }

    /// Number of points along `axis`.
    pub fn length(&self, axis: Axis) -> usize {
        let d = axis.index();
        if self.hi[d] < self.lo[d] {
            0
        } else {
            (self.hi[d] - self.lo[d] + 1) as usize
        }
    }

    /// Total number of points in the box.
    pub fn num_points(&self) -> usize {
        Axis::ALL.iter().map(|&a| self.length(a)).product()
    }

    /// Grow (or shrink, for negative `n`) the box by `n` points on every side.
    pub fn grow(&self, n: i32) -> Self {
        let mut out = *self;
        for d in 0..SPACEDIM {
            out.lo[d] -= n;
            out.hi[d] += n;
        }
        out
    }

    /// Grow the box by `n` points on both sides of one axis.
    pub fn grow_axis(&self, axis: Axis, n: i32) -> Self {
        let mut out = *self;
        out.lo[axis.index()] -= n;
        out.hi[axis.index()] += n;
        out
    }

    /// Translate the box by `offset`.
    pub fn shift(&self, offset: IntVect) -> Self {
        let mut out = *self;
        for d in 0..SPACEDIM {
            out.lo[d] += offset[d];
            out.hi[d] += offset[d];
        }
        out
    }

    /// The face-centred box of all faces normal to `axis` that bound the
    /// cells of this (cell-centred) box.
    pub fn surrounding_nodes(&self, axis: Axis) -> Self {
        debug_assert_eq!(
            self.centering,
            Centering::Cell,
            "surrounding_nodes expects a cell-centred box"
        );
        let mut hi = self.hi;
        hi[axis.index()] += 1;
        Self::with_centering(self.lo, hi, Centering::Face(axis))
    }

    /// The cell-centred box of cells enclosed by a face-centred box.
    /// Cell-centred boxes are returned unchanged.
    pub fn enclosed_cells(&self) -> Self {
        match self.centering {
            Centering::Cell => *self,
            Centering::Face(axis) => {
                let mut hi = self.hi;
                hi[axis.index()] -= 1;
                Self::new(self.lo, hi)
            }
        }
    }

    /// Intersection with another box of the same centering, or `None` if
    /// they do not overlap.
    pub fn intersect(&self, other: &IndexBox) -> Option<IndexBox> {
        debug_assert_eq!(self.centering, other.centering);
        let mut out = *self;
        for d in 0..SPACEDIM {
            out.lo[d] = self.lo[d].max(other.lo[d]);
            out.hi[d] = self.hi[d].min(other.hi[d]);
        }
        if out.is_empty() {
            None
        } else {
            Some(out)
        }
    }

    /// Returns `true` if `p` lies inside the box.
    pub fn contains(&self, p: &IntVect) -> bool {
        (0..SPACEDIM).all(|d| p[d] >= self.lo[d] && p[d] <= self.hi[d])
    }

    /// Returns `true` if `other` lies entirely inside this box.
    pub fn contains_box(&self, other: &IndexBox) -> bool {
        other.is_empty() || (self.contains(&other.lo) && self.contains(&other.hi))
    }

    /// Refine a cell-centred box by an integer ratio.
    pub fn refine(&self, ratio: i32) -> Self {
        let mut out = *self;
        for d in 0..SPACEDIM {
            out.lo[d] = self.lo[d] * ratio;
            out.hi[d] = (self.hi[d] + 1) * ratio - 1;
        }
        out
    }

    /// Coarsen a cell-centred box by an integer ratio (floor division).
    pub fn coarsen(&self, ratio: i32) -> Self {
        let mut out = *self;
        for d in 0..SPACEDIM {
            out.lo[d] = self.lo[d].div_euclid(ratio);
            out.hi[d] = self.hi[d].div_euclid(ratio);
        }
        out
    }

    /// Iterate over the points of the box with `i` varying fastest.
    pub fn iter(&self) -> BoxIter {
        BoxIter {
            lo: self.lo,
            hi: self.hi,
            cur: self.lo,
            done: self.is_empty(),
        }
    }
}

impl fmt::Display for IndexBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(({},{},{}) ({},{},{}))",
            self.lo[0], self.lo[1], self.lo[2], self.hi[0], self.hi[1], self.hi[2]
        )?;
        if let Centering::Face(axis) = self.centering {
            write!(f, " {axis}-faces")?;
        }
        Ok(())
    }
}

impl IntoIterator for &IndexBox {
    type Item = IntVect;
    type IntoIter = BoxIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the points of an [`IndexBox`] in Fortran order.
#[derive(Clone, Debug)]
pub struct BoxIter {
    lo: IntVect,
    hi: IntVect,
    cur: IntVect,
    done: bool,
}

impl Iterator for BoxIter {
    type Item = IntVect;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let out = self.cur;
        let mut d = 0;
        loop {
            if d == SPACEDIM {
                self.done = true;
                break;
            }
            if self.cur[d] < self.hi[d] {
                self.cur[d] += 1;
                break;
            }
            self.cur[d] = self.lo[d];
            d += 1;
        }
        Some(out)
    }
}
