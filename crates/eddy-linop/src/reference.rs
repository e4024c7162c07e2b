//! A cell-centred finite-volume implementation of [`ViscousOperator`].
//!
//! Seven-point variable-coefficient stencil, one component at a time.
//! Domain faces are handled per [`DomainBc`]: periodic faces through
//! ghost exchange, Dirichlet faces through the ghost value taken as the
//! value on the face, Neumann faces as zero flux. Covered cells of an
//! embedded obstacle reduce to `alpha * a * phi` and contribute no flux
//! to their fluid neighbours.

use crate::bc::{DomainBc, LinOpBcType};
use crate::operator::{LpInfo, ViscousOperator};
use eddy_core::{
    Axis, BoxArray, DistributionMapping, Fab, IndexBox, IntVect, LevelField, Side, SPACEDIM,
};
use eddy_mesh::{EbFactory, FabType, Geometry, MeshHierarchy};
use std::sync::Arc;

struct LevelData {
    geom: Geometry,
    a: LevelField,
    b: [LevelField; 3],
    eb_eta: LevelField,
    bc_data: Option<LevelField>,
    /// 1.0 on covered cells, 0.0 elsewhere; one ghost layer.
    covered: Option<LevelField>,
}

/// How one face of a cell enters the stencil.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FaceKind {
    /// Two-point difference with the neighbour (or its ghost).
    Interior,
    /// Zero flux: Neumann wall or covered neighbour.
    NoFlux,
    /// Dirichlet wall, linear through the face value.
    Dirichlet2,
    /// Dirichlet wall, quadratic through the face value and two cells.
    /// Needs the domain, not the box, to be two cells deep.
    Dirichlet3,
}

impl FaceKind {
    /// Coefficient of `phi[p]` in the outward derivative, times `h`.
    fn self_weight(self) -> f64 {
        match self {
            Self::Interior => -1.0,
            Self::NoFlux => 0.0,
            Self::Dirichlet2 => -2.0,
            Self::Dirichlet3 => -3.0,
        }
    }
}

/// Reference operator for small and medium problems.
///
/// Start from [`ReferenceOperator::new`] and hand it to the diffusion
/// core, which calls [`define`](ViscousOperator::define).
pub struct ReferenceOperator {
    levels: Vec<LevelData>,
    bc: DomainBc,
    alpha: f64,
    beta: f64,
    max_order: usize,
    info: LpInfo,
}

impl Default for ReferenceOperator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ReferenceOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReferenceOperator")
            .field("num_levels", &self.levels.len())
            .field("bc", &self.bc)
            .field("alpha", &self.alpha)
            .field("beta", &self.beta)
            .field("max_order", &self.max_order)
            .finish()
    }
}

impl ReferenceOperator {
    /// An operator not yet bound to a hierarchy.
    pub fn new() -> Self {
        Self {
            levels: Vec::new(),
            bc: DomainBc::periodic(),
            alpha: 0.0,
            beta: 1.0,
            max_order: 2,
            info: LpInfo::default(),
        }
    }

    /// Current `(alpha, beta)`.
    pub fn scalars(&self) -> (f64, f64) {
        (self.alpha, self.beta)
    }

    /// Boundary-gradient order in use.
    pub fn max_order(&self) -> usize {
        self.max_order
    }

    /// Domain boundary types in use.
    pub fn domain_bc(&self) -> &DomainBc {
        &self.bc
    }

    /// Options given at definition.
    pub fn info(&self) -> LpInfo {
        self.info
    }

    /// Embedded-boundary viscosity last set on `level`.
    pub fn eb_shear_viscosity(&self, level: usize) -> &LevelField {
        &self.levels[level].eb_eta
    }

    /// Returns `true` if `level` has any covered cells.
    pub fn has_covered_cells(&self, level: usize) -> bool {
        self.levels[level].covered.is_some()
    }

    fn is_covered(lev: &LevelData, box_index: usize, p: &IntVect) -> bool {
        lev.covered
            .as_ref()
            .is_some_and(|m| m.fab(box_index).get(p, 0) > 0.5)
    }

    fn classify(
        &self,
        lev: &LevelData,
        box_index: usize,
        p: &IntVect,
        axis: Axis,
        side: Side,
    ) -> FaceKind {
        let d = axis.index();
        let mut q = *p;
        q[d] += step(side);
        if Self::is_covered(lev, box_index, &q) {
            return FaceKind::NoFlux;
        }
        let domain = lev.geom.domain();
        let at_wall = !lev.geom.is_periodic(axis)
            && match side {
                Side::Lo => p[d] == domain.lo()[d],
                Side::Hi => p[d] == domain.hi()[d],
            };
        if !at_wall {
            return FaceKind::Interior;
        }
        let ty = match side {
            Side::Lo => self.bc.lo[d],
            Side::Hi => self.bc.hi[d],
        };
        match ty {
            LinOpBcType::Periodic => FaceKind::Interior,
            LinOpBcType::Neumann => FaceKind::NoFlux,
            LinOpBcType::Dirichlet if self.max_order >= 3 && domain.length(axis) >= 2 => {
                FaceKind::Dirichlet3
            }
            LinOpBcType::Dirichlet => FaceKind::Dirichlet2,
        }
    }

    fn face_coeff(lev: &LevelData, box_index: usize, p: &IntVect, axis: Axis, side: Side) -> f64 {
        let mut f = *p;
        if side == Side::Hi {
            f[axis.index()] += 1;
        }
        lev.b[axis.index()].fab(box_index).get(&f, 0)
    }
}

fn step(side: Side) -> i32 {
    match side {
        Side::Lo => -1,
        Side::Hi => 1,
    }
}

/// Outward normal derivative of `phi` through one face of `p`, times `h`.
fn outward_derivative(
    kind: FaceKind,
    fab: &Fab,
    p: &IntVect,
    comp: usize,
    axis: Axis,
    side: Side,
) -> f64 {
    let d = axis.index();
    let phi_p = fab.get(p, comp);
    let mut q = *p;
    q[d] += step(side);
    match kind {
        FaceKind::Interior => fab.get(&q, comp) - phi_p,
        FaceKind::NoFlux => 0.0,
        FaceKind::Dirichlet2 => 2.0 * (fab.get(&q, comp) - phi_p),
        FaceKind::Dirichlet3 => {
            let mut inner = *p;
            inner[d] -= step(side);
            (8.0 * fab.get(&q, comp) - 9.0 * phi_p + fab.get(&inner, comp)) / 3.0
        }
    }
}

fn covered_mask(
    ba: &BoxArray,
    dm: &DistributionMapping,
    factory: &dyn EbFactory,
) -> Option<LevelField> {
    if ba
        .iter()
        .all(|b| factory.fab_type(&b.grow(1)) == FabType::Regular)
    {
        return None;
    }
    let mut mask = LevelField::new(ba.clone(), dm.clone(), 1, 1);
    mask.par_for_each_box_mut(|_, vbox, fab| {
        let grown = vbox.grow(1);
        if factory.fab_type(&grown) == FabType::Regular {
            return;
        }
        for p in grown.iter() {
            if factory.cell_type(&p) == FabType::Covered {
                fab.set(&p, 0, 1.0);
            }
        }
    });
    Some(mask)
}

impl ViscousOperator for ReferenceOperator {
    fn define(
        &mut self,
        hierarchy: Arc<dyn MeshHierarchy>,
        eb_factories: &[Arc<dyn EbFactory>],
        info: LpInfo,
    ) {
        self.info = info;
        self.levels = (0..hierarchy.num_active_levels())
            .map(|l| {
                let ba = hierarchy.box_array(l);
                let dm = hierarchy.distribution_map(l);
                LevelData {
                    geom: hierarchy.geom(l).clone(),
                    a: LevelField::new(ba.clone(), dm.clone(), 1, 0),
                    b: Axis::ALL
                        .map(|axis| LevelField::new(ba.surrounding_nodes(axis), dm.clone(), 1, 0)),
                    eb_eta: LevelField::new(ba.clone(), dm.clone(), 1, 0),
                    bc_data: None,
                    covered: eb_factories
                        .get(l)
                        .and_then(|f| covered_mask(ba, dm, f.as_ref())),
                }
            })
            .collect();
    }

    fn set_max_order(&mut self, order: usize) {
        self.max_order = order;
    }

    fn set_domain_bc(&mut self, bc: &DomainBc) {
        self.bc = *bc;
    }

    fn set_scalars(&mut self, alpha: f64, beta: f64) {
        self.alpha = alpha;
        self.beta = beta;
    }

    fn set_a_coeffs(&mut self, level: usize, a: &LevelField) {
        self.levels[level].a.copy_from(a, 0, 0, 1, 0);
    }

    fn set_shear_viscosity(&mut self, level: usize, b: &[LevelField; 3]) {
        let lev = &mut self.levels[level];
        for d in 0..SPACEDIM {
            lev.b[d].copy_from(&b[d], 0, 0, 1, 0);
        }
    }

    fn set_eb_shear_viscosity(&mut self, level: usize, eta: &LevelField) {
        self.levels[level].eb_eta.copy_from(eta, 0, 0, 1, 0);
    }

    fn set_level_bc(&mut self, level: usize, bc_data: &LevelField) {
        self.levels[level].bc_data = Some(bc_data.clone());
    }

    fn num_levels(&self) -> usize {
        self.levels.len()
    }

    fn fill_ghosts(&self, level: usize, phi: &mut LevelField, homogeneous: bool) {
        let lev = &self.levels[level];
        let period = lev.geom.periodicity();
        phi.fill_boundary(&period);

        let shifts = period.shifts();
        let boxes = phi.boxes().clone();
        let ng = phi.n_grow() as i32;
        let ncomp = phi.ncomp();
        let bc = if homogeneous {
            None
        } else {
            lev.bc_data.as_ref()
        };
        debug_assert!(bc.is_none_or(|f| f.boxes() == phi.boxes()));

        // Ghost points with no same-level source take boundary data.
        phi.par_for_each_box_mut(|i, vbox, fab| {
            let grown = vbox.grow(ng);
            let sourced: Vec<IndexBox> = shifts
                .iter()
                .flat_map(|s| boxes.iter().filter_map(|b| grown.intersect(&b.shift(*s))))
                .collect();
            for p in grown.iter() {
                if sourced.iter().any(|c| c.contains(&p)) {
                    continue;
                }
                for n in 0..ncomp {
                    let v = match bc {
                        Some(f) if n < f.ncomp() && f.fab(i).region().contains(&p) => {
                            f.fab(i).get(&p, n)
                        }
                        _ => 0.0,
                    };
                    fab.set(&p, n, v);
                }
            }
        });
    }

    fn apply(&self, level: usize, phi: &mut LevelField, out: &mut LevelField, homogeneous: bool) {
        self.fill_ghosts(level, phi, homogeneous);
        let lev = &self.levels[level];
        let phi: &LevelField = phi;
        let ncomp = out.ncomp().min(phi.ncomp());
        let (alpha, beta) = (self.alpha, self.beta);
        let dx = lev.geom.cell_size();

        out.par_for_each_box_mut(|i, vbox, ofab| {
            let pfab = phi.fab(i);
            let afab = lev.a.fab(i);
            for p in vbox.iter() {
                let covered = Self::is_covered(lev, i, &p);
                let mut kinds = [[FaceKind::NoFlux; 2]; SPACEDIM];
                if !covered {
                    for axis in Axis::ALL {
                        kinds[axis.index()] =
                            [Side::Lo, Side::Hi].map(|s| self.classify(lev, i, &p, axis, s));
                    }
                }
                for n in 0..ncomp {
                    let mass = alpha * afab.get(&p, 0) * pfab.get(&p, n);
                    let mut div = 0.0;
                    for axis in Axis::ALL {
                        let d = axis.index();
                        for (k, side) in [Side::Lo, Side::Hi].into_iter().enumerate() {
                            let kind = kinds[d][k];
                            if kind == FaceKind::NoFlux {
                                continue;
                            }
                            let b = Self::face_coeff(lev, i, &p, axis, side);
                            div += b * outward_derivative(kind, pfab, &p, n, axis, side)
                                / (dx[d] * dx[d]);
                        }
                    }
                    ofab.set(&p, n, mass - beta * div);
                }
            }
        });
    }

    fn diagonal(&self, level: usize, out: &mut LevelField) {
        let lev = &self.levels[level];
        let (alpha, beta) = (self.alpha, self.beta);
        let dx = lev.geom.cell_size();
        out.par_for_each_box_mut(|i, vbox, ofab| {
            let afab = lev.a.fab(i);
            for p in vbox.iter() {
                let mut diag = alpha * afab.get(&p, 0);
                if !Self::is_covered(lev, i, &p) {
                    for axis in Axis::ALL {
                        let d = axis.index();
                        for side in [Side::Lo, Side::Hi] {
                            let kind = self.classify(lev, i, &p, axis, side);
                            let b = Self::face_coeff(lev, i, &p, axis, side);
                            diag -= beta * b * kind.self_weight() / (dx[d] * dx[d]);
                        }
                    }
                }
                ofab.set(&p, 0, diag);
            }
        });
    }
}
