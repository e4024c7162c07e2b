//! Reusable mesh and field fixtures.
//!
//! - [`uniform_hierarchy`]: one level over a box of cells.
//! - [`regular_factories`]: an obstacle-free factory for every level.
//! - [`filled_levels`] / [`levels_from_fn`]: per-level fields for solves.

use std::sync::Arc;

use eddy_core::{IndexBox, IntVect, LevelField};
use eddy_mesh::{EbFactory, Geometry, MeshHierarchy, RegularFactory, StaticHierarchy};

/// Single-level hierarchy over cells `0..cells` spanning `0..prob_hi`.
pub fn uniform_hierarchy(
    cells: [i32; 3],
    prob_hi: [f64; 3],
    periodic: [bool; 3],
    max_grid_size: usize,
) -> Arc<dyn MeshHierarchy> {
    let domain = IndexBox::new([0, 0, 0], [cells[0] - 1, cells[1] - 1, cells[2] - 1]);
    let geom = Geometry::new(domain, [0.0; 3], prob_hi, periodic).expect("fixture geometry");
    Arc::new(StaticHierarchy::uniform(geom, max_grid_size).expect("fixture hierarchy"))
}

/// A [`RegularFactory`] for each of `0..=max_level`.
pub fn regular_factories(h: &dyn MeshHierarchy) -> Vec<Arc<dyn EbFactory>> {
    (0..=h.max_level())
        .map(|_| Arc::new(RegularFactory) as Arc<dyn EbFactory>)
        .collect()
}

/// Zero-initialised cell field on `level`.
pub fn cell_field(h: &dyn MeshHierarchy, level: usize, ncomp: usize, n_grow: usize) -> LevelField {
    LevelField::new(
        h.box_array(level).clone(),
        h.distribution_map(level).clone(),
        ncomp,
        n_grow,
    )
}

/// One field per active level with every point, ghosts included, set to
/// `value`.
pub fn filled_levels(
    h: &dyn MeshHierarchy,
    ncomp: usize,
    n_grow: usize,
    value: f64,
) -> Vec<LevelField> {
    (0..h.num_active_levels())
        .map(|lev| {
            let mut f = cell_field(h, lev, ncomp, n_grow);
            f.fill(value);
            f
        })
        .collect()
}

/// One field per active level with `f(level, cell, comp)` at every point,
/// ghosts included.
pub fn levels_from_fn<F>(
    h: &dyn MeshHierarchy,
    ncomp: usize,
    n_grow: usize,
    f: F,
) -> Vec<LevelField>
where
    F: Fn(usize, &IntVect, usize) -> f64 + Sync + Send,
{
    (0..h.num_active_levels())
        .map(|lev| {
            let mut field = cell_field(h, lev, ncomp, n_grow);
            let g = n_grow as i32;
            field.par_for_each_box_mut(|_, vbox, fab| {
                for p in vbox.grow(g).iter() {
                    for n in 0..ncomp {
                        fab.set(&p, n, f(lev, &p, n));
                    }
                }
            });
            field
        })
        .collect()
}
