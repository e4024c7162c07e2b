//! Eddy: implicit viscous diffusion on block-structured AMR hierarchies
//! with embedded boundaries.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Eddy sub-crates. For most users, adding `eddy` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use eddy::prelude::*;
//! use std::sync::Arc;
//!
//! // A 16x8x4 channel, walls in x, periodic in y and z.
//! let geom = Geometry::new(
//!     IndexBox::new([0, 0, 0], [15, 7, 3]),
//!     [0.0; 3],
//!     [2.0, 1.0, 0.5],
//!     [false, true, true],
//! )
//! .unwrap();
//! let hierarchy: Arc<dyn MeshHierarchy> =
//!     Arc::new(StaticHierarchy::uniform(geom.clone(), 8).unwrap());
//! let nghost = 2;
//! let setup = DiffusionSetup {
//!     hierarchy: hierarchy.clone(),
//!     eb_factories: vec![Arc::new(RegularFactory) as Arc<dyn EbFactory>],
//!     bc_tags: BoundaryTags::uniform(geom.domain(), nghost, PhysicalBc::NoSlipWall),
//!     nghost,
//!     cyl_speed: 0.0,
//! };
//! let mut eq = DiffusionEquation::new(setup, DiffusionConfig::default()).unwrap();
//!
//! let field = |ncomp: usize, value: f64| {
//!     let mut f = LevelField::new(
//!         hierarchy.box_array(0).clone(),
//!         hierarchy.distribution_map(0).clone(),
//!         ncomp,
//!         nghost,
//!     );
//!     f.fill(value);
//!     f
//! };
//! let mut vel = vec![field(3, 0.0)];
//! let ro = vec![field(1, 1.0)];
//! let eta = vec![field(1, 1e-3)];
//!
//! let report = eq.solve(&mut vel, &ro, &eta, 0.01).unwrap();
//! assert_eq!(report.levels, 1);
//! assert_eq!(vel[0].max(0), 0.0);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `eddy-core` | Index boxes, box arrays, fields, errors |
//! | [`mesh`] | `eddy-mesh` | Geometry, hierarchies, embedded-boundary factories |
//! | [`linop`] | `eddy-linop` | Operator and solver traits, reference backend |
//! | [`diffusion`] | `eddy-diffusion` | Boundary translation, assembly, the diffusion solve |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core data types (`eddy-core`).
///
/// Index-space boxes, [`types::BoxArray`] decompositions, multi-component
/// [`types::LevelField`]s, and the error enums shared by every crate.
pub use eddy_core as types;

/// Geometry and mesh hierarchies (`eddy-mesh`).
///
/// The [`mesh::MeshHierarchy`] and [`mesh::EbFactory`] traits with the
/// static and cylinder implementations.
pub use eddy_mesh as mesh;

/// Linear operator and solver interfaces (`eddy-linop`).
///
/// [`linop::ViscousOperator`] and [`linop::MultigridSolver`] are the
/// backend extension points; [`linop::ReferenceOperator`] and
/// [`linop::BiCgStabSolver`] are the bundled backend.
pub use eddy_linop as linop;

/// The diffusion solve (`eddy-diffusion`).
///
/// [`diffusion::DiffusionEquation`] owns the per-level storage and runs
/// one implicit step per [`diffusion::DiffusionEquation::solve`] call.
pub use eddy_diffusion as diffusion;

/// Common imports for typical Eddy usage.
///
/// ```rust
/// use eddy::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use eddy_core::{Axis, DomainFace, IndexBox, IntVect, LevelField, Side};

    // Errors
    pub use eddy_core::{BoundaryError, ConfigError, DiffusionError, SolveError};

    // Mesh
    pub use eddy_mesh::{
        CylinderFactory, EbFactory, FabType, Geometry, MeshHierarchy, RegularFactory,
        StaticHierarchy,
    };

    // Operator and solver
    pub use eddy_linop::{
        BiCgStabSolver, BottomSolver, DomainBc, LinOpBcType, MultigridSolver, ReferenceOperator,
        SolveReport, ViscousOperator,
    };

    // Diffusion
    pub use eddy_diffusion::{
        BoundaryTags, DiffusionConfig, DiffusionEquation, DiffusionSetup, ParamTable, PhysicalBc,
    };
}
