//! Prescribed velocity on the embedded boundary of a rotating obstacle.

use eddy_core::{LevelField, SPACEDIM};
use eddy_mesh::{EbFactory, FabType};

/// Wall velocity of a z-aligned body spinning at surface `speed`, at a
/// point whose boundary normal is `normal`.
///
/// With `theta = atan2(-ny, -nx)` the velocity is
/// `(speed * sin(theta), -speed * cos(theta), 0)`, tangent to the
/// surface in the xy plane.
pub fn rotating_wall_velocity(normal: [f64; SPACEDIM], speed: f64) -> [f64; SPACEDIM] {
    let theta = (-normal[1]).atan2(-normal[0]);
    [speed * theta.sin(), -speed * theta.cos(), 0.0]
}

/// Fill the three components of `vel` with the wall velocity of every
/// box that holds embedded-boundary cells.
///
/// Boxes the factory classifies as all-covered or all-regular are set to
/// zero, ghost points included. In the remaining boxes every valid cell
/// gets [`rotating_wall_velocity`] of its boundary normal; cells of such
/// a box that are not cut carry a zero normal and go through the same
/// formula.
pub fn fill_eb_velocity(vel: &mut LevelField, factory: &dyn EbFactory, speed: f64) {
    debug_assert!(vel.ncomp() >= SPACEDIM);
    let ng = vel.n_grow() as i32;
    vel.par_for_each_box_mut(|_, vbox, fab| {
        match factory.fab_type(vbox) {
            FabType::Covered | FabType::Regular => {
                fab.set_val(0.0, &vbox.grow(ng), 0, SPACEDIM);
            }
            FabType::Cut => {
                for p in vbox.iter() {
                    let v = rotating_wall_velocity(factory.boundary_normal(&p), speed);
                    for (n, vn) in v.into_iter().enumerate() {
                        fab.set(&p, n, vn);
                    }
                }
            }
        }
    });
}
