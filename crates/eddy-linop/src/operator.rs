//! The [`ViscousOperator`] trait and its setup parameters.

use crate::bc::DomainBc;
use eddy_core::LevelField;
use eddy_mesh::{EbFactory, MeshHierarchy};
use std::sync::Arc;

/// Options fixed when an operator is defined on a hierarchy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LpInfo {
    /// How many times the operator may coarsen a level internally.
    pub max_coarsening_level: usize,
}

impl Default for LpInfo {
    fn default() -> Self {
        Self {
            max_coarsening_level: 30,
        }
    }
}

impl LpInfo {
    /// Set the coarsening cap.
    pub fn with_max_coarsening_level(mut self, n: usize) -> Self {
        self.max_coarsening_level = n;
        self
    }
}

/// A variable-coefficient viscous operator over a mesh hierarchy:
///
/// ```text
/// L(phi) = alpha * a * phi - beta * div(b * grad(phi))
/// ```
///
/// with `a` cell-centred, `b` on faces (one field per axis), and an
/// embedded-boundary viscosity for cut cells. The diffusion core drives
/// the setup half of this trait; solvers use the numerical half.
///
/// # Contract
///
/// - `define` is called once, before any other method, and binds the
///   operator to levels `0..=hierarchy.finest_level()`.
/// - Per-level setters may be called any number of times; each call
///   replaces the previous data for that level.
/// - `set_level_bc` supplies a field whose ghost cells hold the Dirichlet
///   values on domain faces and at coarse/fine boundaries.
/// - `apply` and `diagonal` are pure functions of the stored
///   coefficients and their field arguments.
///
/// # Object safety
///
/// This trait is object-safe; solvers take `&dyn ViscousOperator`.
pub trait ViscousOperator: Send {
    /// Bind to a hierarchy and its per-level embedded-boundary factories.
    fn define(
        &mut self,
        hierarchy: Arc<dyn MeshHierarchy>,
        eb_factories: &[Arc<dyn EbFactory>],
        info: LpInfo,
    );

    /// Maximum polynomial order used for boundary gradients.
    fn set_max_order(&mut self, order: usize);

    /// Boundary types on the six domain faces.
    fn set_domain_bc(&mut self, bc: &DomainBc);

    /// The scalars `alpha` and `beta`.
    fn set_scalars(&mut self, alpha: f64, beta: f64);

    /// Cell-centred `a` coefficient of `level` (component 0 of `a`).
    fn set_a_coeffs(&mut self, level: usize, a: &LevelField);

    /// Face-centred `b` coefficients of `level`, one field per axis.
    fn set_shear_viscosity(&mut self, level: usize, b: &[LevelField; 3]);

    /// Cell-centred viscosity applied on the embedded boundary of `level`.
    fn set_eb_shear_viscosity(&mut self, level: usize, eta: &LevelField);

    /// Boundary-condition source for `level`.
    fn set_level_bc(&mut self, level: usize, bc_data: &LevelField);

    /// Number of levels the operator was defined on.
    fn num_levels(&self) -> usize;

    /// Fill the ghost cells of `phi` on `level`: from neighbouring boxes
    /// and periodic images, then from boundary data (or zero when
    /// `homogeneous`) elsewhere.
    fn fill_ghosts(&self, level: usize, phi: &mut LevelField, homogeneous: bool);

    /// `out = L(phi)` on valid cells of `level`. Fills the ghost cells of
    /// `phi` first.
    fn apply(&self, level: usize, phi: &mut LevelField, out: &mut LevelField, homogeneous: bool);

    /// Diagonal of `L` on `level`, written to component 0 of `out`.
    fn diagonal(&self, level: usize, out: &mut LevelField);
}
