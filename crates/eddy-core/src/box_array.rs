//! Box decompositions of a mesh level and their owner mapping.

use crate::id::{Axis, SPACEDIM};
use crate::index::{Centering, IndexBox, IntVect};

/// The set of disjoint boxes that tile (part of) one mesh level.
///
/// Each box is a sub-block: the unit of storage and of parallel work.
/// All boxes in an array share one centering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoxArray {
    boxes: Vec<IndexBox>,
}

impl BoxArray {
    /// Wrap an explicit list of boxes.
    pub fn new(boxes: Vec<IndexBox>) -> Self {
        debug_assert!(
            boxes.windows(2).all(|w| w[0].centering() == w[1].centering()),
            "all boxes in a BoxArray must share a centering"
        );
        Self { boxes }
    }

    /// Chop `domain` into boxes no longer than `max_grid_size` along any
    /// axis. Pieces along an axis differ in length by at most one.
    pub fn chop(domain: &IndexBox, max_grid_size: usize) -> Self {
        let max = max_grid_size.max(1);
        let mut cuts: [Vec<(i32, i32)>; SPACEDIM] = Default::default();
        for axis in Axis::ALL {
            let d = axis.index();
            let len = domain.length(axis);
            let pieces = len.div_ceil(max).max(1);
            let base = len / pieces;
            let extra = len % pieces;
            let mut lo = domain.lo()[d];
            for p in 0..pieces {
                let n = base + usize::from(p < extra);
                cuts[d].push((lo, lo + n as i32 - 1));
                lo += n as i32;
            }
        }
        let mut boxes = Vec::new();
        for &(klo, khi) in &cuts[2] {
            for &(jlo, jhi) in &cuts[1] {
                for &(ilo, ihi) in &cuts[0] {
                    boxes.push(IndexBox::with_centering(
                        [ilo, jlo, klo],
                        [ihi, jhi, khi],
                        domain.centering(),
                    ));
                }
            }
        }
        Self { boxes }
    }

    /// Number of boxes.
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    /// Returns `true` if there are no boxes.
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// The `i`-th box. Panics if out of range.
    pub fn get(&self, i: usize) -> &IndexBox {
        &self.boxes[i]
    }

    /// Iterate over the boxes in order.
    pub fn iter(&self) -> std::slice::Iter<'_, IndexBox> {
        self.boxes.iter()
    }

    /// Centering shared by the boxes (cell-centred if empty).
    pub fn centering(&self) -> Centering {
        self.boxes
            .first()
            .map(IndexBox::centering)
            .unwrap_or(Centering::Cell)
    }

    /// The face-centred array of faces normal to `axis` bounding each box.
    pub fn surrounding_nodes(&self, axis: Axis) -> Self {
        Self {
            boxes: self.boxes.iter().map(|b| b.surrounding_nodes(axis)).collect(),
        }
    }

    /// Refine every (cell-centred) box by `ratio`.
    pub fn refine(&self, ratio: i32) -> Self {
        Self {
            boxes: self.boxes.iter().map(|b| b.refine(ratio)).collect(),
        }
    }

    /// Total number of points across all boxes.
    pub fn num_points(&self) -> usize {
        self.boxes.iter().map(IndexBox::num_points).sum()
    }

    /// Returns `true` if any box contains `p`.
    pub fn contains(&self, p: &IntVect) -> bool {
        self.boxes.iter().any(|b| b.contains(p))
    }

    /// Smallest box enclosing every box in the array, or `None` if empty.
    pub fn minimal_box(&self) -> Option<IndexBox> {
        let first = self.boxes.first()?;
        let mut lo = first.lo();
        let mut hi = first.hi();
        for b in &self.boxes[1..] {
            for d in 0..SPACEDIM {
                lo[d] = lo[d].min(b.lo()[d]);
                hi[d] = hi[d].max(b.hi()[d]);
            }
        }
        Some(IndexBox::with_centering(lo, hi, first.centering()))
    }
}

impl<'a> IntoIterator for &'a BoxArray {
    type Item = &'a IndexBox;
    type IntoIter = std::slice::Iter<'a, IndexBox>;

    fn into_iter(self) -> Self::IntoIter {
        self.boxes.iter()
    }
}

/// Owning process rank of each box in a [`BoxArray`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DistributionMapping {
    owners: Vec<usize>,
}

impl DistributionMapping {
    /// Every box owned by rank 0.
    pub fn local(nboxes: usize) -> Self {
        Self {
            owners: vec![0; nboxes],
        }
    }

    /// Boxes dealt to `nranks` ranks in turn.
    pub fn round_robin(nboxes: usize, nranks: usize) -> Self {
        let nranks = nranks.max(1);
        Self {
            owners: (0..nboxes).map(|i| i % nranks).collect(),
        }
    }

    /// Rank owning box `i`.
    pub fn owner(&self, i: usize) -> usize {
        self.owners[i]
    }

    /// Number of boxes mapped.
    pub fn len(&self) -> usize {
        self.owners.len()
    }

    /// Returns `true` if no boxes are mapped.
    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn chop_exact_multiple() {
        let domain = IndexBox::new([0, 0, 0], [15, 15, 7]);
        let ba = BoxArray::chop(&domain, 8);
        assert_eq!(ba.len(), 4);
        assert!(ba.iter().all(|b| b.num_points() == 8 * 8 * 8));
        assert_eq!(ba.minimal_box(), Some(domain));
    }

    #[test]
    fn chop_uneven_lengths_differ_by_one() {
        let domain = IndexBox::new([0, 0, 0], [9, 0, 0]);
        let ba = BoxArray::chop(&domain, 4);
        let lens: Vec<usize> = ba.iter().map(|b| b.length(Axis::X)).collect();
        assert_eq!(lens, vec![4, 3, 3]);
    }

    #[test]
    fn round_robin_owners() {
        let dm = DistributionMapping::round_robin(5, 2);
        let owners: Vec<usize> = (0..5).map(|i| dm.owner(i)).collect();
        assert_eq!(owners, vec![0, 1, 0, 1, 0]);
    }

    proptest! {
        #[test]
        fn chop_tiles_domain_exactly(
            nx in 1i32..20, ny in 1i32..20, nz in 1i32..6, max in 1usize..9,
        ) {
            let domain = IndexBox::new([0, 0, 0], [nx - 1, ny - 1, nz - 1]);
            let ba = BoxArray::chop(&domain, max);
            prop_assert_eq!(ba.num_points(), domain.num_points());
            for b in &ba {
                prop_assert!(domain.contains_box(b));
                for axis in Axis::ALL {
                    prop_assert!(b.length(axis) <= max);
                }
            }
            for (i, a) in ba.iter().enumerate() {
                for b in ba.iter().skip(i + 1) {
                    prop_assert!(a.intersect(b).is_none());
                }
            }
        }
    }
}
