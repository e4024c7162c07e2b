//! Benchmark profiles for the Eddy diffusion solver.
//!
//! Each profile builds a hierarchy, a [`DiffusionSetup`], and the three
//! per-level input fields of one solve:
//!
//! - [`channel_profile`]: a single-level 64x32x8 wall-bounded channel
//! - [`refined_profile`]: the same channel with a refined patch at level 1
//! - [`cylinder_profile`]: a periodic box around a rotating cylinder
//!
//! Viscosity is drawn per cell from a seeded ChaCha8 generator, so a given
//! seed always produces the same case.

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::sync::Arc;

use eddy_core::{IndexBox, LevelField};
use eddy_diffusion::{BoundaryTags, DiffusionSetup, PhysicalBc};
use eddy_mesh::{
    CylinderFactory, EbFactory, Geometry, MeshHierarchy, RegularFactory, StaticHierarchy,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Ghost width used by every profile.
pub const NGHOST: usize = 2;

/// One ready-to-run diffusion case.
pub struct BenchCase {
    /// The mesh.
    pub hierarchy: Arc<dyn MeshHierarchy>,
    /// Construction input for the diffusion solve.
    pub setup: DiffusionSetup,
    /// Velocity, three components, one field per active level.
    pub vel: Vec<LevelField>,
    /// Density.
    pub ro: Vec<LevelField>,
    /// Viscosity.
    pub eta: Vec<LevelField>,
}

/// Time step used by the examples.
pub const DT: f64 = 1e-3;

/// Single-level channel, no-slip walls in x, periodic in y and z.
pub fn channel_profile(seed: u64) -> BenchCase {
    let geom = channel_geometry();
    let hierarchy: Arc<dyn MeshHierarchy> = Arc::new(
        StaticHierarchy::uniform(geom.clone(), 16).expect("channel profile hierarchy"),
    );
    build_case(hierarchy, &geom, regular(1), 0.0, seed)
}

/// The channel plus a refined patch over its middle third.
pub fn refined_profile(seed: u64) -> BenchCase {
    let geom = channel_geometry();
    let hierarchy: Arc<dyn MeshHierarchy> = Arc::new(
        StaticHierarchy::builder(geom.clone())
            .max_grid_size(16)
            .refine_region(IndexBox::new([40, 16, 0], [87, 47, 15]))
            .build()
            .expect("refined profile hierarchy"),
    );
    build_case(hierarchy, &geom, regular(2), 0.0, seed)
}

/// Periodic 32x32x4 box around a cylinder of radius 0.2 turning with
/// surface speed `speed`.
pub fn cylinder_profile(seed: u64, speed: f64) -> BenchCase {
    let geom = Geometry::new(
        IndexBox::new([0, 0, 0], [31, 31, 3]),
        [0.0; 3],
        [1.0, 1.0, 0.125],
        [true; 3],
    )
    .expect("cylinder profile geometry");
    let hierarchy: Arc<dyn MeshHierarchy> = Arc::new(
        StaticHierarchy::uniform(geom.clone(), 16).expect("cylinder profile hierarchy"),
    );
    let factory = CylinderFactory::new(geom.clone(), [0.5, 0.5], 0.2);
    build_case(
        hierarchy,
        &geom,
        vec![Arc::new(factory) as Arc<dyn EbFactory>],
        speed,
        seed,
    )
}

/// Viscosity in `[lo, hi)` at every point of every active level,
/// ghosts included.
pub fn random_viscosity(h: &dyn MeshHierarchy, lo: f64, hi: f64, seed: u64) -> Vec<LevelField> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..h.num_active_levels())
        .map(|lev| {
            let mut eta = level_field(h, lev, 1, 1.0);
            for i in 0..eta.num_boxes() {
                let region = *eta.fab(i).region();
                let fab = eta.fab_mut(i);
                for p in region.iter() {
                    fab.set(&p, 0, rng.random_range(lo..hi));
                }
            }
            eta
        })
        .collect()
}

/// Field on `level` with `ncomp` components and [`NGHOST`] ghosts, all
/// set to `value`.
pub fn level_field(h: &dyn MeshHierarchy, level: usize, ncomp: usize, value: f64) -> LevelField {
    let mut f = LevelField::new(
        h.box_array(level).clone(),
        h.distribution_map(level).clone(),
        ncomp,
        NGHOST,
    );
    f.fill(value);
    f
}

fn channel_geometry() -> Geometry {
    Geometry::new(
        IndexBox::new([0, 0, 0], [63, 31, 7]),
        [0.0; 3],
        [2.0, 1.0, 0.25],
        [false, true, true],
    )
    .expect("channel profile geometry")
}

fn regular(levels: usize) -> Vec<Arc<dyn EbFactory>> {
    (0..levels)
        .map(|_| Arc::new(RegularFactory) as Arc<dyn EbFactory>)
        .collect()
}

fn build_case(
    hierarchy: Arc<dyn MeshHierarchy>,
    geom: &Geometry,
    eb_factories: Vec<Arc<dyn EbFactory>>,
    cyl_speed: f64,
    seed: u64,
) -> BenchCase {
    let h = hierarchy.as_ref();
    let nlev = h.num_active_levels();
    let mut vel: Vec<LevelField> = (0..nlev).map(|lev| level_field(h, lev, 3, 0.0)).collect();
    // Shear flow along y, varying in x.
    for (lev, field) in vel.iter_mut().enumerate() {
        let g = h.geom(lev).clone();
        field.par_for_each_box_mut(|_, vbox, fab| {
            for p in vbox.grow(NGHOST as i32).iter() {
                let x = g.cell_center(&p)[0];
                fab.set(&p, 1, (std::f64::consts::PI * x).sin());
            }
        });
    }
    let ro = (0..nlev).map(|lev| level_field(h, lev, 1, 1.0)).collect();
    let eta = random_viscosity(h, 0.5e-2, 1.5e-2, seed);
    let setup = DiffusionSetup {
        hierarchy: hierarchy.clone(),
        eb_factories,
        bc_tags: BoundaryTags::uniform(geom.domain(), NGHOST, PhysicalBc::NoSlipWall),
        nghost: NGHOST,
        cyl_speed,
    };
    BenchCase {
        hierarchy,
        setup,
        vel,
        ro,
        eta,
    }
}
