use std::f64::consts::PI;
use std::sync::Arc;

use eddy_core::{Axis, DiffusionError, DomainFace, IndexBox, LevelField, Side, SolveError};
use eddy_diffusion::{
    BoundaryTags, DiffusionConfig, DiffusionEquation, DiffusionSetup, ParamTable, PhysicalBc,
};
use eddy_linop::{BottomSolver, LinOpBcType, ReferenceOperator, ViscousOperator};
use eddy_mesh::{CylinderFactory, EbFactory, FabType, Geometry, MeshHierarchy, StaticHierarchy};
use eddy_test_utils::fixtures::{
    filled_levels, levels_from_fn, regular_factories, uniform_hierarchy,
};
use eddy_test_utils::{RecordingOperator, RecordingSolver};

const NGHOST: usize = 2;

fn setup_for(h: Arc<dyn MeshHierarchy>, kind: PhysicalBc) -> DiffusionSetup {
    let domain = *h.geom(0).domain();
    DiffusionSetup {
        eb_factories: regular_factories(h.as_ref()),
        bc_tags: BoundaryTags::uniform(&domain, NGHOST, kind),
        hierarchy: h,
        nghost: NGHOST,
        cyl_speed: 0.0,
    }
}

/// Equation with no-slip walls on every non-periodic face.
fn wall_equation(h: &Arc<dyn MeshHierarchy>, config: DiffusionConfig) -> DiffusionEquation {
    DiffusionEquation::new(setup_for(h.clone(), PhysicalBc::NoSlipWall), config).unwrap()
}

fn periodic_box() -> Arc<dyn MeshHierarchy> {
    uniform_hierarchy([8, 8, 4], [1.0, 1.0, 0.5], [true; 3], 4)
}

fn x_channel() -> Arc<dyn MeshHierarchy> {
    uniform_hierarchy([16, 8, 4], [2.0, 1.0, 0.5], [false, true, true], 8)
}

fn assert_valid_eq(a: &LevelField, b: &LevelField, tol: f64) {
    let mut d = a.clone();
    d.saxpy(-1.0, b, 0);
    let err = d.norm_inf_all();
    assert!(err <= tol, "max difference {err:e} > {tol:e}");
}

#[test]
fn uniform_periodic_state_is_steady() {
    let h = periodic_box();
    let mut eq = wall_equation(&h, DiffusionConfig::default());
    let mut vel = levels_from_fn(h.as_ref(), 3, NGHOST, |_, _, n| (n + 1) as f64);
    let ro = filled_levels(h.as_ref(), 1, NGHOST, 2.0);
    let eta = filled_levels(h.as_ref(), 1, NGHOST, 0.5);

    eq.solve(&mut vel, &ro, &eta, 0.1).unwrap();

    let rhs = eq.rhs(0);
    for n in 0..3 {
        let want = 2.0 * (n + 1) as f64;
        assert_eq!((rhs.min(n), rhs.max(n)), (want, want));
        let got = &vel[0];
        assert!((got.min(n) - (n + 1) as f64).abs() < 1e-12);
        assert!((got.max(n) - (n + 1) as f64).abs() < 1e-12);
    }
    for face in eq.face_coefficients(0) {
        assert_eq!((face.min(0), face.max(0)), (0.5, 0.5));
    }
}

#[test]
fn zero_step_is_identity() {
    let h = x_channel();
    let mut eq = wall_equation(&h, DiffusionConfig::default());
    let original = levels_from_fn(h.as_ref(), 3, NGHOST, |_, p, n| {
        (p[0] * p[0]) as f64 * 0.1 - (p[1] + 2 * p[2]) as f64 + n as f64
    });
    let mut vel = original.clone();
    let ro = filled_levels(h.as_ref(), 1, NGHOST, 1.0);
    let eta = filled_levels(h.as_ref(), 1, NGHOST, 0.0);

    eq.solve(&mut vel, &ro, &eta, 0.0).unwrap();
    assert_valid_eq(&vel[0], &original[0], 0.0);
}

#[test]
fn periodic_mode_decays_by_discrete_symbol() {
    let n_cells = 16;
    let h = uniform_hierarchy([n_cells, 4, 4], [1.0, 0.25, 0.25], [true; 3], 8);
    let mut eq = wall_equation(&h, DiffusionConfig::default());
    let k = 2.0 * PI / n_cells as f64;
    let mode = |p: &[i32; 3], n: usize| (n + 1) as f64 * (k * p[0] as f64).cos();
    let mut vel = levels_from_fn(h.as_ref(), 3, NGHOST, |_, p, n| mode(p, n));
    let ro = filled_levels(h.as_ref(), 1, NGHOST, 1.0);
    let eta = filled_levels(h.as_ref(), 1, NGHOST, 0.1);
    let dt = 0.05;

    eq.solve(&mut vel, &ro, &eta, dt).unwrap();

    let dx = 1.0 / n_cells as f64;
    let factor = 1.0 / (1.0 + dt * 0.1 * (2.0 - 2.0 * k.cos()) / (dx * dx));
    let expected = levels_from_fn(h.as_ref(), 3, NGHOST, |_, p, n| factor * mode(p, n));
    assert_valid_eq(&vel[0], &expected[0], 1e-9);
}

#[test]
fn repeated_solves_agree_bitwise() {
    let h = x_channel();
    let mut eq = wall_equation(&h, DiffusionConfig::default());
    let input = levels_from_fn(h.as_ref(), 3, NGHOST, |_, p, n| {
        ((p[0] as f64 * 0.4).sin() + 0.3 * (p[1] as f64).cos()) * (n + 1) as f64
    });
    let ro = levels_from_fn(h.as_ref(), 1, NGHOST, |_, p, _| 1.0 + 0.05 * p[0] as f64);
    let eta = levels_from_fn(h.as_ref(), 1, NGHOST, |_, p, _| 0.01 + 0.002 * p[1] as f64);
    let (lo, hi) = (eq.bc_lo(), eq.bc_hi());

    let mut first = input.clone();
    let r1 = eq.solve(&mut first, &ro, &eta, 0.05).unwrap();
    let mut second = input.clone();
    let r2 = eq.solve(&mut second, &ro, &eta, 0.05).unwrap();

    assert_eq!(r1, r2);
    for b in 0..first[0].num_boxes() {
        assert_eq!(first[0].fab(b).as_slice(), second[0].fab(b).as_slice());
    }
    assert!(r1.final_residual <= (r1.initial_residual * 1e-11).max(1e-14));
    assert_eq!((eq.bc_lo(), eq.bc_hi()), (lo, hi));
    assert_eq!(lo, [LinOpBcType::Dirichlet, LinOpBcType::Periodic, LinOpBcType::Periodic]);
}

#[test]
fn boundary_types_follow_tags() {
    let h = x_channel();
    let domain = *h.geom(0).domain();
    let mut s = setup_for(h, PhysicalBc::PressureOutflow);
    s.bc_tags = BoundaryTags::from_face_kinds(
        &domain,
        NGHOST,
        [
            PhysicalBc::MassInflow,
            PhysicalBc::PressureOutflow,
            PhysicalBc::Undefined,
            PhysicalBc::Undefined,
            PhysicalBc::Undefined,
            PhysicalBc::Undefined,
        ],
    );
    let eq = DiffusionEquation::new(s, DiffusionConfig::default()).unwrap();
    assert_eq!(eq.bc_lo()[0], LinOpBcType::Dirichlet);
    assert_eq!(eq.bc_hi()[0], LinOpBcType::Neumann);
    assert_eq!(eq.operator().domain_bc(), eq.domain_bc());
    assert_eq!(eq.operator().max_order(), 3);
}

#[test]
fn invalid_tag_fails_construction() {
    let h = x_channel();
    let s = setup_for(h, PhysicalBc::Undefined);
    let err = DiffusionEquation::new(s, DiffusionConfig::default()).unwrap_err();
    assert_eq!(
        err,
        DiffusionError::Boundary(eddy_core::BoundaryError::InvalidTag {
            face: DomainFace::new(Axis::X, Side::Lo),
            tag: PhysicalBc::Undefined.tag(),
        })
    );
}

#[test]
fn update_internals_is_unsupported() {
    let h = periodic_box();
    let mut eq = wall_equation(&h, DiffusionConfig::default());
    let before = *eq.domain_bc();
    let err = eq
        .update_internals(h.clone(), regular_factories(h.as_ref()))
        .unwrap_err();
    assert_eq!(
        err,
        DiffusionError::Unsupported {
            operation: "update_internals"
        }
    );
    assert_eq!(*eq.domain_bc(), before);

    // The equation is still usable.
    let mut vel = filled_levels(h.as_ref(), 3, NGHOST, 1.0);
    let one = filled_levels(h.as_ref(), 1, NGHOST, 1.0);
    assert!(eq.solve(&mut vel, &one, &one, 0.1).is_ok());
}

#[test]
fn solver_failure_is_surfaced_and_state_kept() {
    let h = periodic_box();
    let failure = SolveError::NotConverged {
        iterations: 3,
        residual: 1.0,
        target: 1e-3,
    };
    let mut eq = DiffusionEquation::with_backend(
        setup_for(h.clone(), PhysicalBc::NoSlipWall),
        DiffusionConfig::default(),
        RecordingOperator::new(),
        RecordingSolver::failing(failure.clone()),
    )
    .unwrap();
    let mut vel = filled_levels(h.as_ref(), 3, NGHOST, 4.0);
    let one = filled_levels(h.as_ref(), 1, NGHOST, 1.0);
    let err = eq.solve(&mut vel, &one, &one, 0.1).unwrap_err();
    assert_eq!(err, DiffusionError::Solve(failure));
    assert_eq!(vel[0].min(0), 4.0);
    assert_eq!(vel[0].max(2), 4.0);
}

#[test]
fn iteration_caps_reach_the_reference_solver() {
    let h = x_channel();
    let config = DiffusionConfig {
        mg_max_iter: 1,
        mg_cg_maxiter: 1,
        mg_atol: 0.0,
        ..DiffusionConfig::default()
    };
    let mut eq = wall_equation(&h, config);
    let mut vel = levels_from_fn(h.as_ref(), 3, NGHOST, |_, p, _| {
        (p[0] as f64 * 0.7).sin() + p[1] as f64
    });
    let ro = filled_levels(h.as_ref(), 1, NGHOST, 1.0);
    let eta = filled_levels(h.as_ref(), 1, NGHOST, 1.0);
    let err = eq.solve(&mut vel, &ro, &eta, 1.0).unwrap_err();
    assert!(
        matches!(err, DiffusionError::Solve(SolveError::NotConverged { iterations: 1, .. })),
        "{err}"
    );
}

#[test]
fn bottom_solver_options_agree_with_default() {
    let h = x_channel();
    let input = levels_from_fn(h.as_ref(), 3, NGHOST, |_, p, n| {
        (p[0] as f64 * 0.3).sin() * (1.0 + 0.2 * p[1] as f64) + n as f64
    });
    let ro = filled_levels(h.as_ref(), 1, NGHOST, 1.0);
    // Weak diffusion keeps Jacobi sweeps contracting quickly.
    let eta = filled_levels(h.as_ref(), 1, NGHOST, 0.01);
    let dt = 0.1;

    let mut want = input.clone();
    wall_equation(&h, DiffusionConfig::default())
        .solve(&mut want, &ro, &eta, dt)
        .unwrap();

    for (name, kind) in [("hypre", BottomSolver::Hypre), ("smoother", BottomSolver::Smoother)] {
        let text = format!("diffusion.bottom_solver_type = {name}\n");
        let config = DiffusionConfig::from_params(&ParamTable::parse(&text).unwrap()).unwrap();
        assert_eq!(config.bottom_solver, kind);

        let mut got = input.clone();
        let report = wall_equation(&h, config)
            .solve(&mut got, &ro, &eta, dt)
            .unwrap();
        assert!(report.final_residual <= (report.initial_residual * 1e-11).max(1e-14));
        assert_valid_eq(&got[0], &want[0], 1e-8);
    }
}

#[test]
fn coarsening_limit_reaches_the_operator() {
    let h = x_channel();
    let params = ParamTable::parse("diffusion.mg_max_coarsening_level = 5\n").unwrap();
    let config = DiffusionConfig::from_params(&params).unwrap();
    let eq = wall_equation(&h, config);
    assert_eq!(eq.operator().info().max_coarsening_level, 5);

    let eq = wall_equation(&h, DiffusionConfig::default());
    assert_eq!(eq.operator().info().max_coarsening_level, 100);
}

#[test]
fn refined_hierarchy_keeps_uniform_state() {
    let geom = Geometry::new(
        IndexBox::new([0, 0, 0], [7, 7, 3]),
        [0.0; 3],
        [1.0, 1.0, 0.5],
        [true; 3],
    )
    .unwrap();
    let h: Arc<dyn MeshHierarchy> = Arc::new(
        StaticHierarchy::builder(geom)
            .max_grid_size(4)
            .refine_region(IndexBox::new([4, 4, 0], [11, 11, 7]))
            .max_level(2)
            .build()
            .unwrap(),
    );
    let mut eq = wall_equation(&h, DiffusionConfig::default());
    // Storage covers max_level; the solve covers active levels only.
    assert_eq!(eq.num_levels(), 3);
    assert_eq!(eq.operator().num_levels(), 2);

    let mut vel = levels_from_fn(h.as_ref(), 3, NGHOST, |_, _, n| 1.5 - n as f64);
    let ro = filled_levels(h.as_ref(), 1, NGHOST, 3.0);
    let eta = filled_levels(h.as_ref(), 1, NGHOST, 0.2);
    let report = eq.solve(&mut vel, &ro, &eta, 0.5).unwrap();
    assert_eq!(report.levels, 2);
    for level in &vel {
        for n in 0..3 {
            let want = 1.5 - n as f64;
            assert!((level.min(n) - want).abs() < 1e-12 && (level.max(n) - want).abs() < 1e-12);
        }
    }
}

fn cylinder_setup(speed: f64) -> (Arc<dyn MeshHierarchy>, DiffusionSetup, CylinderFactory) {
    let geom = Geometry::new(
        IndexBox::new([0, 0, 0], [15, 15, 1]),
        [0.0; 3],
        [1.0, 1.0, 0.125],
        [true; 3],
    )
    .unwrap();
    // The axis passes through the centre of row 8.
    let factory = CylinderFactory::new(geom.clone(), [8.5 / 16.0, 8.5 / 16.0], 0.25);
    let h: Arc<dyn MeshHierarchy> = Arc::new(StaticHierarchy::uniform(geom.clone(), 8).unwrap());
    let setup = DiffusionSetup {
        hierarchy: h.clone(),
        eb_factories: vec![Arc::new(factory.clone()) as Arc<dyn EbFactory>],
        bc_tags: BoundaryTags::uniform(geom.domain(), NGHOST, PhysicalBc::NoSlipWall),
        nghost: NGHOST,
        cyl_speed: speed,
    };
    (h, setup, factory)
}

#[test]
fn cylinder_wall_velocity_is_tangential() {
    let speed = 0.75;
    let (_, setup, factory) = cylinder_setup(speed);
    let eq = DiffusionEquation::new(setup, DiffusionConfig::default()).unwrap();
    let v = eq.eb_velocity(0);

    // West side of the body: the normal points along +x.
    let west = [4, 8, 0];
    assert_eq!(factory.cell_type(&west), FabType::Cut);
    let n = factory.boundary_normal(&west);
    assert!((n[0] - 1.0).abs() < 1e-12 && n[1].abs() < 1e-12);
    let got = [0, 1, 2].map(|c| v.value_at(&west, c).unwrap());
    assert!(got[0].abs() < 1e-12);
    assert!((got[1] - speed).abs() < 1e-12);
    assert_eq!(got[2], 0.0);

    // Boxes away from the body hold zero.
    for (i, vbox) in v.boxes().iter().enumerate() {
        if factory.fab_type(vbox) == FabType::Regular {
            assert!(v.fab(i).as_slice().iter().all(|&x| x == 0.0));
        }
    }
}

#[test]
fn covered_cells_do_not_disturb_a_uniform_state() {
    let (h, setup, _) = cylinder_setup(1.0);
    let mut eq: DiffusionEquation<ReferenceOperator, _> =
        DiffusionEquation::new(setup, DiffusionConfig::default()).unwrap();
    assert!(eq.operator().has_covered_cells(0));

    let mut vel = levels_from_fn(h.as_ref(), 3, NGHOST, |_, _, n| 2.0 * n as f64 - 1.0);
    let ro = filled_levels(h.as_ref(), 1, NGHOST, 1.2);
    let eta = filled_levels(h.as_ref(), 1, NGHOST, 0.3);
    eq.solve(&mut vel, &ro, &eta, 0.2).unwrap();
    for n in 0..3 {
        let want = 2.0 * n as f64 - 1.0;
        assert!((vel[0].min(n) - want).abs() < 1e-12);
        assert!((vel[0].max(n) - want).abs() < 1e-12);
    }
}
