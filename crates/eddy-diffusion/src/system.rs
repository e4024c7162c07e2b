//! Right-hand side and boundary data of one level's linear system.

use eddy_core::{LevelField, SPACEDIM};
use eddy_linop::ViscousOperator;
use eddy_mesh::Geometry;

/// `rhs = vel * ro` component by component: momentum from velocity.
///
/// Copies the valid cells of `vel`, then multiplies by `ro` over the
/// valid cells grown by `rhs`'s own ghost width.
pub fn assemble_rhs(rhs: &mut LevelField, vel: &LevelField, ro: &LevelField) {
    debug_assert!(vel.ncomp() >= SPACEDIM && rhs.ncomp() >= SPACEDIM);
    rhs.copy_from(vel, 0, 0, SPACEDIM, 0);
    let ng = rhs.n_grow();
    for n in 0..SPACEDIM {
        rhs.multiply_from(ro, 0, n, 1, ng);
    }
}

/// Load `vel`, one ghost layer included, into `phi` as the initial guess,
/// exchange its ghost cells, and register it with the operator as the
/// boundary-value source of `level`.
pub fn assemble_solution<O>(
    op: &mut O,
    level: usize,
    geom: &Geometry,
    phi: &mut LevelField,
    vel: &LevelField,
) where
    O: ViscousOperator + ?Sized,
{
    debug_assert!(vel.n_grow() >= 1 && phi.n_grow() >= 1);
    phi.copy_from(vel, 0, 0, SPACEDIM, 1);
    phi.fill_boundary(&geom.periodicity());
    op.set_level_bc(level, phi);
}

#[cfg(test)]
mod tests {
    use super::*;
    use eddy_core::{BoxArray, DistributionMapping, IndexBox};
    use eddy_linop::{LpInfo, ReferenceOperator};
    use eddy_mesh::{MeshHierarchy, StaticHierarchy};
    use std::sync::Arc;

    fn layout() -> (Geometry, BoxArray, DistributionMapping) {
        let geom = Geometry::new(
            IndexBox::new([0, 0, 0], [5, 5, 1]),
            [0.0; 3],
            [1.0; 3],
            [true, true, true],
        )
        .unwrap();
        let ba = BoxArray::chop(geom.domain(), 3);
        let dm = DistributionMapping::local(ba.len());
        (geom, ba, dm)
    }

    #[test]
    fn rhs_is_momentum() {
        let (_, ba, dm) = layout();
        let mut vel = LevelField::new(ba.clone(), dm.clone(), 3, 2);
        for n in 0..3 {
            vel.set_val((n + 1) as f64, n, 1, 2);
        }
        let mut ro = LevelField::new(ba.clone(), dm.clone(), 1, 2);
        ro.par_for_each_box_mut(|_, vbox, fab| {
            for p in vbox.grow(2).iter() {
                fab.set(&p, 0, 1.0 + p[0] as f64);
            }
        });
        let mut rhs = LevelField::new(ba, dm, 3, 0);
        assemble_rhs(&mut rhs, &vel, &ro);
        for n in 0..3 {
            assert_eq!(rhs.value_at(&[4, 1, 0], n), Some(5.0 * (n + 1) as f64));
        }
    }

    #[test]
    fn solution_takes_halo_from_neighbours() {
        let (geom, ba, dm) = layout();
        let hierarchy: Arc<dyn MeshHierarchy> =
            Arc::new(StaticHierarchy::uniform(geom.clone(), 3).unwrap());
        let mut op = ReferenceOperator::new();
        op.define(hierarchy, &[], LpInfo::default());

        let mut vel = LevelField::new(ba.clone(), dm.clone(), 3, 1);
        // The caller's halo is stale; the exchange must replace it.
        vel.fill(-7.0);
        vel.par_for_each_box_mut(|_, vbox, fab| {
            for p in vbox.iter() {
                fab.set(&p, 0, p[0] as f64);
            }
        });
        let mut phi = LevelField::new(ba, dm, 3, 1);
        assemble_solution(&mut op, 0, &geom, &mut phi, &vel);
        // Box 0 holds x in 0..=2: x = 3 is a neighbour ghost, x = -1 a
        // periodic image of x = 5.
        assert_eq!(phi.fab(0).get(&[3, 0, 0], 0), 3.0);
        assert_eq!(phi.fab(0).get(&[-1, 0, 0], 0), 5.0);
        assert_eq!(phi.fab(0).get(&[-1, 0, 0], 1), -7.0);

        // The registered data supplies the same ghosts to the operator.
        let mut copy = LevelField::new(phi.boxes().clone(), phi.distribution_map().clone(), 3, 1);
        copy.copy_from(&phi, 0, 0, 3, 0);
        op.fill_ghosts(0, &mut copy, false);
        assert_eq!(copy.fab(0).get(&[3, 0, 0], 0), 3.0);
    }
}
