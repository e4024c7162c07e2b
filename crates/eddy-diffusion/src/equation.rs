//! The implicit diffusion solve across all levels of a hierarchy.

use crate::boundary::{translate_domain_bc, BoundaryTags};
use crate::coefficients::assemble_coefficients;
use crate::config::DiffusionConfig;
use crate::eb_velocity::fill_eb_velocity;
use crate::system::{assemble_rhs, assemble_solution};
use eddy_core::{Axis, DiffusionError, LevelField, LevelVec, SolveError, SPACEDIM};
use eddy_linop::{
    BiCgStabSolver, DomainBc, LinOpBcType, LpInfo, MultigridSolver, ReferenceOperator,
    SolveReport, ViscousOperator,
};
use eddy_mesh::{EbFactory, MeshHierarchy};
use std::fmt;
use std::sync::Arc;

/// Boundary-gradient order handed to the operator.
const MAX_ORDER: usize = 3;

/// Everything [`DiffusionEquation`] needs from the driver at construction.
pub struct DiffusionSetup {
    /// The mesh hierarchy, shared with the driver.
    pub hierarchy: Arc<dyn MeshHierarchy>,
    /// One embedded-boundary factory per level, `0..=max_level`.
    pub eb_factories: Vec<Arc<dyn EbFactory>>,
    /// Physical boundary tags of the level-0 domain faces.
    pub bc_tags: BoundaryTags,
    /// Ghost width of the caller's fields and of the face coefficients.
    pub nghost: usize,
    /// Surface speed of the rotating obstacle.
    pub cyl_speed: f64,
}

/// Implicit viscous diffusion of a three-component velocity field.
///
/// Each [`solve`](Self::solve) takes the provisional velocity `vel`, the
/// density `ro`, and the viscosity `eta` on every active level and
/// replaces `vel` with the solution of
///
/// ```text
/// ro * u - dt * div(eta_f * grad(u)) = ro * vel
/// ```
///
/// where `eta_f` is `eta` averaged to cell faces. The operator `O` and the
/// solver prototype `S` are pluggable; [`DiffusionEquation::new`] uses the
/// reference backend.
///
/// Boundary types are fixed at construction from the level-0 tags. Every
/// per-level field is allocated once for `0..=max_level` and overwritten
/// in place by each solve.
pub struct DiffusionEquation<O = ReferenceOperator, S = BiCgStabSolver>
where
    O: ViscousOperator,
    S: MultigridSolver,
{
    hierarchy: Arc<dyn MeshHierarchy>,
    eb_factories: LevelVec<Arc<dyn EbFactory>>,
    config: DiffusionConfig,
    nghost: usize,
    cyl_speed: f64,
    bc: DomainBc,
    b: LevelVec<[LevelField; SPACEDIM]>,
    phi: LevelVec<LevelField>,
    rhs: LevelVec<LevelField>,
    vel_eb: LevelVec<LevelField>,
    operator: O,
    solver: S,
}

impl DiffusionEquation {
    /// Construct with [`ReferenceOperator`] and [`BiCgStabSolver`].
    ///
    /// # Errors
    ///
    /// See [`with_backend`](Self::with_backend).
    pub fn new(setup: DiffusionSetup, config: DiffusionConfig) -> Result<Self, DiffusionError> {
        Self::with_backend(setup, config, ReferenceOperator::new(), BiCgStabSolver::new())
    }
}

impl<O, S> DiffusionEquation<O, S>
where
    O: ViscousOperator,
    S: MultigridSolver,
{
    /// Construct with a caller-supplied operator and solver prototype.
    ///
    /// Translates the boundary tags, allocates per-level storage, fills
    /// the embedded-boundary velocity, and defines the operator on the
    /// hierarchy.
    ///
    /// # Errors
    ///
    /// - [`DiffusionError::Config`] if `config` fails validation.
    /// - [`DiffusionError::Mesh`] if there are fewer factories than levels
    ///   or `nghost` is zero.
    /// - [`DiffusionError::Boundary`] if a domain face carries an invalid
    ///   tag.
    pub fn with_backend(
        setup: DiffusionSetup,
        config: DiffusionConfig,
        mut operator: O,
        solver: S,
    ) -> Result<Self, DiffusionError> {
        let DiffusionSetup {
            hierarchy,
            eb_factories,
            bc_tags,
            nghost,
            cyl_speed,
        } = setup;
        if config.verbose > 0 {
            log::info!("constructing diffusion equation");
        }
        config.validate()?;

        let num_levels = hierarchy.max_level() + 1;
        if eb_factories.len() < num_levels {
            return Err(DiffusionError::Mesh {
                reason: format!(
                    "{} embedded-boundary factories for {num_levels} levels",
                    eb_factories.len()
                ),
            });
        }
        if nghost == 0 {
            return Err(DiffusionError::Mesh {
                reason: "ghost width must be at least 1".to_string(),
            });
        }

        let bc = translate_domain_bc(hierarchy.geom(0), &bc_tags, nghost)?;
        debug_assert!(bc.matches_periodicity(hierarchy.geom(0).periodic()));

        let h = hierarchy.as_ref();
        let cell_field = |lev: usize, ncomp: usize, n_grow: usize| {
            LevelField::new(
                h.box_array(lev).clone(),
                h.distribution_map(lev).clone(),
                ncomp,
                n_grow,
            )
        };
        let b = LevelVec::from_fn(num_levels, |lev| {
            Axis::ALL.map(|axis| {
                LevelField::new(
                    h.box_array(lev).surrounding_nodes(axis),
                    h.distribution_map(lev).clone(),
                    1,
                    nghost,
                )
            })
        });
        let phi = LevelVec::from_fn(num_levels, |lev| cell_field(lev, SPACEDIM, 1));
        let rhs = LevelVec::from_fn(num_levels, |lev| cell_field(lev, SPACEDIM, 0));
        let mut vel_eb = LevelVec::from_fn(num_levels, |lev| cell_field(lev, SPACEDIM, nghost));
        for (lev, vel) in vel_eb.iter_mut().enumerate() {
            fill_eb_velocity(vel, eb_factories[lev].as_ref(), cyl_speed);
        }

        let info = LpInfo::default().with_max_coarsening_level(config.mg_max_coarsening_level);
        operator.define(hierarchy.clone(), &eb_factories, info);
        operator.set_max_order(MAX_ORDER);
        operator.set_domain_bc(&bc);

        Ok(Self {
            hierarchy,
            eb_factories: eb_factories.into(),
            config,
            nghost,
            cyl_speed,
            bc,
            b,
            phi,
            rhs,
            vel_eb,
            operator,
            solver,
        })
    }

    /// Diffuse `vel` implicitly over a step of `dt`.
    ///
    /// `vel` needs at least one ghost layer; `ro` and `eta` are read on
    /// valid cells and one ghost layer and left unchanged. On success the
    /// valid cells and first ghost layer of every active level of `vel`
    /// hold the solution.
    ///
    /// # Errors
    ///
    /// [`DiffusionError::Solve`] if fewer fields than active levels are
    /// supplied or the solver fails. `vel` is untouched in both cases.
    pub fn solve(
        &mut self,
        vel: &mut [LevelField],
        ro: &[LevelField],
        eta: &[LevelField],
        dt: f64,
    ) -> Result<SolveReport, DiffusionError> {
        let nlev = self.hierarchy.num_active_levels();
        let got = vel.len().min(ro.len()).min(eta.len());
        if got < nlev {
            return Err(SolveError::LevelCountMismatch {
                expected: nlev,
                got,
            }
            .into());
        }

        self.operator.set_scalars(1.0, dt);
        for lev in 0..nlev {
            debug_assert!(vel[lev].ncomp() >= SPACEDIM && vel[lev].n_grow() >= 1);
            debug_assert!(eta[lev].n_grow() >= 1);
            assemble_coefficients(
                &mut self.operator,
                lev,
                self.hierarchy.geom(lev),
                &mut self.b[lev],
                &ro[lev],
                &eta[lev],
            );
        }

        if self.config.verbose > 0 {
            log::info!("diffusing velocity components all together");
        }

        for lev in 0..nlev {
            assemble_rhs(&mut self.rhs[lev], &vel[lev], &ro[lev]);
            assemble_solution(
                &mut self.operator,
                lev,
                self.hierarchy.geom(lev),
                &mut self.phi[lev],
                &vel[lev],
            );
        }

        let mut solver = self.solver.clone();
        solver.configure(&self.config.solver_settings());
        let report = solver.solve(
            &self.operator,
            &mut self.phi.as_mut_slice()[..nlev],
            &self.rhs.as_slice()[..nlev],
            self.config.mg_rtol,
            self.config.mg_atol,
        )?;

        for lev in 0..nlev {
            self.phi[lev].fill_boundary(&self.hierarchy.geom(lev).periodicity());
            vel[lev].copy_from(&self.phi[lev], 0, 0, SPACEDIM, 1);
        }

        if self.config.verbose > 0 {
            log::info!(
                "diffusion done: {} iterations, residual {:e}",
                report.iterations,
                report.final_residual
            );
        }
        Ok(report)
    }

    /// Rebuild internal storage for a changed hierarchy.
    ///
    /// # Errors
    ///
    /// Always [`DiffusionError::Unsupported`]: regridding is not handled
    /// and the existing state is left as it was.
    pub fn update_internals(
        &mut self,
        hierarchy: Arc<dyn MeshHierarchy>,
        eb_factories: Vec<Arc<dyn EbFactory>>,
    ) -> Result<(), DiffusionError> {
        log::error!(
            "update_internals called for a hierarchy with {} level(s) and {} factories; \
             changing meshes are not supported",
            hierarchy.max_level() + 1,
            eb_factories.len()
        );
        Err(DiffusionError::Unsupported {
            operation: "update_internals",
        })
    }

    /// Low-face operator types, indexed by axis.
    pub fn bc_lo(&self) -> [LinOpBcType; SPACEDIM] {
        self.bc.lo
    }

    /// High-face operator types, indexed by axis.
    pub fn bc_hi(&self) -> [LinOpBcType; SPACEDIM] {
        self.bc.hi
    }

    /// Operator types of all six domain faces.
    pub fn domain_bc(&self) -> &DomainBc {
        &self.bc
    }

    /// Embedded-boundary wall velocity of `level`.
    pub fn eb_velocity(&self, level: usize) -> &LevelField {
        &self.vel_eb[level]
    }

    /// Face diffusivity of `level` from the last solve.
    pub fn face_coefficients(&self, level: usize) -> &[LevelField; SPACEDIM] {
        &self.b[level]
    }

    /// Right-hand side of `level` from the last solve.
    pub fn rhs(&self, level: usize) -> &LevelField {
        &self.rhs[level]
    }

    /// Solution of `level` from the last solve.
    pub fn solution(&self, level: usize) -> &LevelField {
        &self.phi[level]
    }

    /// Effective configuration.
    pub fn config(&self) -> &DiffusionConfig {
        &self.config
    }

    /// The configured operator.
    pub fn operator(&self) -> &O {
        &self.operator
    }

    /// The hierarchy the equation was built on.
    pub fn hierarchy(&self) -> &Arc<dyn MeshHierarchy> {
        &self.hierarchy
    }

    /// Embedded-boundary factory of `level`.
    pub fn eb_factory(&self, level: usize) -> &Arc<dyn EbFactory> {
        &self.eb_factories[level]
    }

    /// Ghost width given at construction.
    pub fn nghost(&self) -> usize {
        self.nghost
    }

    /// Obstacle surface speed given at construction.
    pub fn cyl_speed(&self) -> f64 {
        self.cyl_speed
    }

    /// Number of levels storage is allocated for.
    pub fn num_levels(&self) -> usize {
        self.phi.num_levels()
    }
}

impl<O, S> fmt::Debug for DiffusionEquation<O, S>
where
    O: ViscousOperator,
    S: MultigridSolver,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiffusionEquation")
            .field("num_levels", &self.num_levels())
            .field("nghost", &self.nghost)
            .field("cyl_speed", &self.cyl_speed)
            .field("bc", &self.bc)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::PhysicalBc;
    use eddy_core::IndexBox;
    use eddy_mesh::{Geometry, RegularFactory, StaticHierarchy};
    use eddy_test_utils::{Call, RecordingOperator, RecordingSolver};

    fn setup(periodic: [bool; 3]) -> DiffusionSetup {
        let geom = Geometry::new(
            IndexBox::new([0, 0, 0], [7, 7, 3]),
            [0.0; 3],
            [1.0, 1.0, 0.5],
            periodic,
        )
        .unwrap();
        let domain = *geom.domain();
        DiffusionSetup {
            hierarchy: Arc::new(StaticHierarchy::uniform(geom, 4).unwrap()),
            eb_factories: vec![Arc::new(RegularFactory)],
            bc_tags: BoundaryTags::uniform(&domain, 2, PhysicalBc::NoSlipWall),
            nghost: 2,
            cyl_speed: 0.0,
        }
    }

    fn fields(
        eq: &DiffusionEquation<RecordingOperator, RecordingSolver>,
        v: f64,
    ) -> Vec<LevelField> {
        let h = eq.hierarchy();
        let mut f = LevelField::new(h.box_array(0).clone(), h.distribution_map(0).clone(), 3, 2);
        f.fill(v);
        vec![f]
    }

    #[test]
    fn construction_configures_operator_once() {
        let op = RecordingOperator::new();
        let log = op.log();
        let eq = DiffusionEquation::with_backend(
            setup([false, true, true]),
            DiffusionConfig {
                mg_max_coarsening_level: 7,
                ..DiffusionConfig::default()
            },
            op,
            RecordingSolver::new(),
        )
        .unwrap();
        let calls = log.calls();
        assert_eq!(
            calls,
            vec![
                Call::Define {
                    num_factories: 1,
                    max_coarsening_level: 7
                },
                Call::SetMaxOrder(3),
                Call::SetDomainBc(*eq.domain_bc()),
            ]
        );
        assert_eq!(eq.bc_lo()[0], LinOpBcType::Dirichlet);
        assert_eq!(eq.bc_hi()[1], LinOpBcType::Periodic);
    }

    #[test]
    fn solve_drives_operator_in_level_order() {
        let op = RecordingOperator::new();
        let log = op.log();
        let solver = RecordingSolver::new();
        let seen = solver.seen();
        let config = DiffusionConfig {
            mg_rtol: 1e-9,
            mg_atol: 1e-12,
            mg_max_iter: 7,
            ..DiffusionConfig::default()
        };
        let mut eq =
            DiffusionEquation::with_backend(setup([true; 3]), config, op, solver).unwrap();
        log.clear();

        let mut vel = fields(&eq, 1.0);
        let ro = fields(&eq, 2.0);
        let eta = fields(&eq, 0.5);
        eq.solve(&mut vel, &ro, &eta, 0.1).unwrap();

        assert_eq!(
            log.calls(),
            vec![
                Call::SetScalars(1.0, 0.1),
                Call::SetACoeffs(0),
                Call::SetShearViscosity(0),
                Call::SetEbShearViscosity(0),
                Call::SetLevelBc(0),
            ]
        );
        let s = seen.last().unwrap();
        assert_eq!((s.rtol, s.atol), (1e-9, 1e-12));
        assert_eq!(s.settings.max_iter, 7);
        assert!(s.settings.final_fill_bc);
        assert_eq!(s.levels, 1);
    }

    #[test]
    fn short_field_slices_are_rejected() {
        let mut eq = DiffusionEquation::with_backend(
            setup([true; 3]),
            DiffusionConfig::default(),
            RecordingOperator::new(),
            RecordingSolver::new(),
        )
        .unwrap();
        let err = eq.solve(&mut [], &[], &[], 0.1).unwrap_err();
        assert_eq!(
            err,
            DiffusionError::Solve(SolveError::LevelCountMismatch { expected: 1, got: 0 })
        );
    }

    #[test]
    fn missing_factories_are_rejected() {
        let mut s = setup([true; 3]);
        s.eb_factories.clear();
        let err = DiffusionEquation::new(s, DiffusionConfig::default()).unwrap_err();
        assert!(matches!(err, DiffusionError::Mesh { .. }));
    }

    #[test]
    fn zero_ghost_width_is_rejected() {
        let mut s = setup([true; 3]);
        s.nghost = 0;
        assert!(matches!(
            DiffusionEquation::new(s, DiffusionConfig::default()),
            Err(DiffusionError::Mesh { .. })
        ));
    }
}
