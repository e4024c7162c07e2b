//! Box-decomposed, multi-component fields with a ghost halo.
//!
//! A [`LevelField`] is the per-level storage unit: one [`Fab`] per box of
//! a [`BoxArray`], each grown by `n_grow` ghost points on every side.
//! Box loops run on the rayon pool; each task writes exactly one box.

use crate::box_array::{BoxArray, DistributionMapping};
use crate::fab::Fab;
use crate::index::{IndexBox, IntVect};
use crate::periodicity::Periodicity;
use rayon::prelude::*;

/// A distributed multi-component field over one mesh level.
///
/// Valid points are those inside a box of the array; ghost points are
/// the `n_grow` halo around each box. Ghost values are only meaningful
/// after [`fill_boundary`](Self::fill_boundary) or an explicit write.
///
/// # Examples
///
/// ```
/// use eddy_core::{BoxArray, DistributionMapping, IndexBox, LevelField};
///
/// let ba = BoxArray::chop(&IndexBox::new([0, 0, 0], [7, 7, 7]), 4);
/// let dm = DistributionMapping::local(ba.len());
/// let mut f = LevelField::new(ba, dm, 3, 1);
/// f.set_val(2.5, 1, 1, 0);
/// assert_eq!(f.max(1), 2.5);
/// assert_eq!(f.max(0), 0.0);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct LevelField {
    boxes: BoxArray,
    dmap: DistributionMapping,
    ncomp: usize,
    n_grow: usize,
    fabs: Vec<Fab>,
}

impl LevelField {
    /// Allocate a zero-filled field.
    pub fn new(boxes: BoxArray, dmap: DistributionMapping, ncomp: usize, n_grow: usize) -> Self {
        debug_assert_eq!(boxes.len(), dmap.len(), "box array / distribution map mismatch");
        let fabs = boxes
            .iter()
            .map(|b| Fab::new(b.grow(n_grow as i32), ncomp))
            .collect();
        Self {
            boxes,
            dmap,
            ncomp,
            n_grow,
            fabs,
        }
    }

    /// The valid boxes.
    pub fn boxes(&self) -> &BoxArray {
        &self.boxes
    }

    /// Owner of each box.
    pub fn distribution_map(&self) -> &DistributionMapping {
        &self.dmap
    }

    /// Components per point.
    pub fn ncomp(&self) -> usize {
        self.ncomp
    }

    /// Ghost width.
    pub fn n_grow(&self) -> usize {
        self.n_grow
    }

    /// Number of boxes.
    pub fn num_boxes(&self) -> usize {
        self.fabs.len()
    }

    /// Storage for box `i`, ghost points included.
    pub fn fab(&self, i: usize) -> &Fab {
        &self.fabs[i]
    }

    /// Mutable storage for box `i`.
    pub fn fab_mut(&mut self, i: usize) -> &mut Fab {
        &mut self.fabs[i]
    }

    /// Valid box `i`.
    pub fn valid_box(&self, i: usize) -> &IndexBox {
        self.boxes.get(i)
    }

    /// Run `f(box_index, valid_box, fab)` on every box in parallel.
    pub fn par_for_each_box_mut<F>(&mut self, f: F)
    where
        F: Fn(usize, &IndexBox, &mut Fab) + Sync + Send,
    {
        let boxes = &self.boxes;
        self.fabs
            .par_iter_mut()
            .enumerate()
            .for_each(|(i, fab)| f(i, boxes.get(i), fab));
    }

    /// Set components `comp..comp + ncomp` to `value` on valid points
    /// grown by `n_grow`.
    pub fn set_val(&mut self, value: f64, comp: usize, ncomp: usize, n_grow: usize) {
        let g = n_grow.min(self.n_grow) as i32;
        self.par_for_each_box_mut(|_, vbox, fab| {
            fab.set_val(value, &vbox.grow(g), comp, ncomp);
        });
    }

    /// Set every component everywhere, ghost points included.
    pub fn fill(&mut self, value: f64) {
        self.fabs.par_iter_mut().for_each(|fab| fab.fill(value));
    }

    /// Copy `ncomp` components from `src` (starting at `src_comp`) into
    /// this field (starting at `dst_comp`) on valid points grown by
    /// `n_grow`. Both fields must share a box array.
    pub fn copy_from(
        &mut self,
        src: &LevelField,
        src_comp: usize,
        dst_comp: usize,
        ncomp: usize,
        n_grow: usize,
    ) {
        self.combine_from(src, src_comp, dst_comp, ncomp, n_grow, |_, s| s);
    }

    /// Multiply `ncomp` components of this field (from `dst_comp`) by
    /// those of `src` (from `src_comp`) on valid points grown by `n_grow`.
    pub fn multiply_from(
        &mut self,
        src: &LevelField,
        src_comp: usize,
        dst_comp: usize,
        ncomp: usize,
        n_grow: usize,
    ) {
        self.combine_from(src, src_comp, dst_comp, ncomp, n_grow, |d, s| d * s);
    }

    /// `self += a * x` on every component, valid points grown by `n_grow`.
    pub fn saxpy(&mut self, a: f64, x: &LevelField, n_grow: usize) {
        let ncomp = self.ncomp.min(x.ncomp);
        self.combine_from(x, 0, 0, ncomp, n_grow, move |d, s| d + a * s);
    }

    /// Multiply every component by `s` on valid points grown by `n_grow`.
    pub fn scale(&mut self, s: f64, n_grow: usize) {
        let g = n_grow.min(self.n_grow) as i32;
        let ncomp = self.ncomp;
        self.par_for_each_box_mut(|_, vbox, fab| {
            for n in 0..ncomp {
                for p in vbox.grow(g).iter() {
                    fab.set(&p, n, s * fab.get(&p, n));
                }
            }
        });
    }

    fn combine_from<F>(
        &mut self,
        src: &LevelField,
        src_comp: usize,
        dst_comp: usize,
        ncomp: usize,
        n_grow: usize,
        op: F,
    ) where
        F: Fn(f64, f64) -> f64 + Sync + Send,
    {
        debug_assert_eq!(self.boxes, src.boxes, "fields must share a box array");
        debug_assert!(
            n_grow <= self.n_grow && n_grow <= src.n_grow,
            "ghost width {n_grow} exceeds field halo"
        );
        debug_assert!(src_comp + ncomp <= src.ncomp && dst_comp + ncomp <= self.ncomp);
        let g = n_grow as i32;
        self.par_for_each_box_mut(|i, vbox, fab| {
            let sfab = &src.fabs[i];
            let region = vbox.grow(g);
            for n in 0..ncomp {
                for p in region.iter() {
                    let v = op(fab.get(&p, dst_comp + n), sfab.get(&p, src_comp + n));
                    fab.set(&p, dst_comp + n, v);
                }
            }
        });
    }

    /// Sum over valid points and all components of `self * other`.
    ///
    /// Per-box partial sums are added in box order, so the result does
    /// not depend on thread scheduling.
    pub fn dot(&self, other: &LevelField) -> f64 {
        debug_assert_eq!(self.boxes, other.boxes, "fields must share a box array");
        let ncomp = self.ncomp.min(other.ncomp);
        let partials: Vec<f64> = self
            .fabs
            .par_iter()
            .zip(other.fabs.par_iter())
            .enumerate()
            .map(|(i, (a, b))| {
                let vbox = self.boxes.get(i);
                (0..ncomp)
                    .map(|n| vbox.iter().map(|p| a.get(&p, n) * b.get(&p, n)).sum::<f64>())
                    .sum::<f64>()
            })
            .collect();
        partials.iter().sum()
    }

    fn reduce_valid<F>(&self, comp: usize, init: f64, f: F) -> f64
    where
        F: Fn(f64, f64) -> f64 + Sync + Send + Copy,
    {
        self.fabs
            .par_iter()
            .enumerate()
            .map(|(i, fab)| {
                self.boxes
                    .get(i)
                    .iter()
                    .fold(init, |acc, p| f(acc, fab.get(&p, comp)))
            })
            .reduce(|| init, f)
    }

    /// Largest absolute value of `comp` over valid points (0 if empty).
    /// A NaN anywhere makes the result NaN.
    pub fn norm_inf(&self, comp: usize) -> f64 {
        self.reduce_valid(comp, 0.0, |a, v| {
            if a.is_nan() || v.is_nan() {
                f64::NAN
            } else {
                a.max(v.abs())
            }
        })
    }

    /// Largest absolute value over valid points and all components.
    pub fn norm_inf_all(&self) -> f64 {
        (0..self.ncomp)
            .map(|n| self.norm_inf(n))
            .fold(0.0, |a, v| if a.is_nan() || v.is_nan() { f64::NAN } else { a.max(v) })
    }

    /// Smallest value of `comp` over valid points.
    pub fn min(&self, comp: usize) -> f64 {
        self.reduce_valid(comp, f64::INFINITY, f64::min)
    }

    /// Largest value of `comp` over valid points.
    pub fn max(&self, comp: usize) -> f64 {
        self.reduce_valid(comp, f64::NEG_INFINITY, f64::max)
    }

    /// Value at `p` read from the first box whose valid region holds it.
    pub fn value_at(&self, p: &IntVect, comp: usize) -> Option<f64> {
        self.boxes
            .iter()
            .position(|b| b.contains(p))
            .map(|i| self.fabs[i].get(p, comp))
    }

    /// Fill ghost points from the valid points of other boxes, including
    /// periodic images. Ghost points with no source keep their values.
    ///
    /// Runs in two phases: a parallel gather that only reads, then a
    /// parallel scatter where each task writes its own box.
    pub fn fill_boundary(&mut self, period: &Periodicity) {
        if self.n_grow == 0 {
            return;
        }
        let shifts = period.shifts();
        let g = self.n_grow as i32;
        let boxes = &self.boxes;
        let fabs = &self.fabs;
        let ncomp = self.ncomp;

        let incoming: Vec<Vec<(IntVect, Vec<f64>)>> = (0..fabs.len())
            .into_par_iter()
            .map(|i| {
                let dst_valid = boxes.get(i);
                let dst_grown = dst_valid.grow(g);
                let mut out = Vec::new();
                for shift in &shifts {
                    let back = [-shift[0], -shift[1], -shift[2]];
                    for (j, src_valid) in boxes.iter().enumerate() {
                        if j == i && *shift == [0, 0, 0] {
                            continue;
                        }
                        let Some(isect) = dst_grown.intersect(&src_valid.shift(*shift)) else {
                            continue;
                        };
                        for p in isect.iter() {
                            if dst_valid.contains(&p) {
                                continue;
                            }
                            let q = [p[0] + back[0], p[1] + back[1], p[2] + back[2]];
                            let vals = (0..ncomp).map(|n| fabs[j].get(&q, n)).collect();
                            out.push((p, vals));
                        }
                    }
                }
                out
            })
            .collect();

        self.fabs
            .par_iter_mut()
            .zip(incoming.into_par_iter())
            .for_each(|(fab, writes)| {
                for (p, vals) in writes {
                    for (n, v) in vals.into_iter().enumerate() {
                        fab.set(&p, n, v);
                    }
                }
            });
    }
}
