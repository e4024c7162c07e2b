//! Per-level operator coefficients from the physical state.

use eddy_core::{Axis, LevelField, SPACEDIM};
use eddy_linop::ViscousOperator;
use eddy_mesh::Geometry;
use rayon::prelude::*;

/// Average component 0 of the cell-centred `cc` onto the faces of each
/// axis: `face[d](p) = (cc(p - e_d) + cc(p)) / 2` on valid face points.
///
/// `cc` needs at least one ghost layer holding current values, since
/// faces on box edges read one cell outside the box.
pub fn average_cellcenter_to_face(faces: &mut [LevelField; SPACEDIM], cc: &LevelField) {
    debug_assert!(cc.n_grow() >= 1, "face averaging reads one ghost layer");
    faces.par_iter_mut().enumerate().for_each(|(d, face)| {
        let axis = Axis::ALL[d];
        debug_assert_eq!(face.boxes(), &cc.boxes().surrounding_nodes(axis));
        let e = axis.unit();
        face.par_for_each_box_mut(|i, vbox, fab| {
            let src = cc.fab(i);
            for p in vbox.iter() {
                let lo = [p[0] - e[0], p[1] - e[1], p[2] - e[2]];
                fab.set(&p, 0, 0.5 * (src.get(&lo, 0) + src.get(&p, 0)));
            }
        });
    });
}

/// Rebuild the face diffusivity of one level and push it, with the mass
/// and embedded-boundary coefficients, into the operator.
///
/// `faces` receives the face average of `eta` and has its ghost points
/// refreshed across box and periodic boundaries. `ro` becomes the `a`
/// coefficient and `eta` the embedded-boundary viscosity.
pub fn assemble_coefficients<O>(
    op: &mut O,
    level: usize,
    geom: &Geometry,
    faces: &mut [LevelField; SPACEDIM],
    ro: &LevelField,
    eta: &LevelField,
) where
    O: ViscousOperator + ?Sized,
{
    average_cellcenter_to_face(faces, eta);
    let period = geom.periodicity();
    for face in faces.iter_mut() {
        face.fill_boundary(&period);
    }
    op.set_a_coeffs(level, ro);
    op.set_shear_viscosity(level, faces);
    op.set_eb_shear_viscosity(level, eta);
}

#[cfg(test)]
mod tests {
    use super::*;
    use eddy_core::{BoxArray, DistributionMapping, IndexBox};
    use proptest::prelude::*;

    fn layout() -> (Geometry, BoxArray, DistributionMapping) {
        let geom = Geometry::new(
            IndexBox::new([0, 0, 0], [7, 5, 3]),
            [0.0; 3],
            [1.0; 3],
            [true, false, true],
        )
        .unwrap();
        let ba = BoxArray::chop(geom.domain(), 4);
        let dm = DistributionMapping::local(ba.len());
        (geom, ba, dm)
    }

    fn faces_for(ba: &BoxArray, dm: &DistributionMapping, n_grow: usize) -> [LevelField; 3] {
        Axis::ALL.map(|a| LevelField::new(ba.surrounding_nodes(a), dm.clone(), 1, n_grow))
    }

    #[test]
    fn uniform_diffusivity_gives_uniform_faces() {
        let (geom, ba, dm) = layout();
        let mut eta = LevelField::new(ba.clone(), dm.clone(), 1, 2);
        eta.fill(0.5);
        let mut faces = faces_for(&ba, &dm, 2);
        average_cellcenter_to_face(&mut faces, &eta);
        for face in faces.iter_mut() {
            face.fill_boundary(&geom.periodicity());
            assert_eq!(face.min(0), 0.5);
            assert_eq!(face.max(0), 0.5);
        }
    }

    #[test]
    fn linear_profile_averages_to_face_position() {
        let (_, ba, dm) = layout();
        let mut eta = LevelField::new(ba.clone(), dm.clone(), 1, 1);
        eta.par_for_each_box_mut(|_, vbox, fab| {
            for p in vbox.grow(1).iter() {
                fab.set(&p, 0, p[1] as f64);
            }
        });
        let mut faces = faces_for(&ba, &dm, 0);
        average_cellcenter_to_face(&mut faces, &eta);
        // y faces sit half a cell below the cell of the same index.
        for j in 0..=6 {
            let v = faces[1].value_at(&[3, j, 1], 0).unwrap();
            assert_eq!(v, j as f64 - 0.5);
        }
        assert_eq!(faces[0].value_at(&[5, 2, 0], 0), Some(2.0));
    }

    #[test]
    fn periodic_faces_agree_across_the_seam() {
        let (geom, ba, dm) = layout();
        let mut eta = LevelField::new(ba.clone(), dm.clone(), 1, 1);
        eta.par_for_each_box_mut(|_, vbox, fab| {
            for p in vbox.iter() {
                fab.set(&p, 0, 1.0 + p[0] as f64);
            }
        });
        eta.fill_boundary(&geom.periodicity());
        let mut faces = faces_for(&ba, &dm, 1);
        average_cellcenter_to_face(&mut faces, &eta);
        let lo = faces[0].value_at(&[0, 2, 2], 0).unwrap();
        let hi = faces[0].value_at(&[8, 2, 2], 0).unwrap();
        assert_eq!(lo, hi);
        assert_eq!(lo, 0.5 * (8.0 + 1.0));
    }

    proptest! {
        #[test]
        fn averaging_is_linear(a in -10.0f64..10.0, s in -3.0f64..3.0, c in -5.0f64..5.0) {
            let (_, ba, dm) = layout();
            let mut eta = LevelField::new(ba.clone(), dm.clone(), 1, 1);
            eta.par_for_each_box_mut(|_, vbox, fab| {
                for p in vbox.grow(1).iter() {
                    fab.set(&p, 0, a + s * (p[0] + 2 * p[1] - p[2]) as f64);
                }
            });
            let mut base = faces_for(&ba, &dm, 0);
            average_cellcenter_to_face(&mut base, &eta);

            let mut shifted = eta.clone();
            shifted.par_for_each_box_mut(|_, vbox, fab| {
                for p in vbox.grow(1).iter() {
                    fab.set(&p, 0, fab.get(&p, 0) + c);
                }
            });
            let mut out = faces_for(&ba, &dm, 0);
            average_cellcenter_to_face(&mut out, &shifted);
            for d in 0..3 {
                out[d].saxpy(-1.0, &base[d], 0);
                prop_assert!((out[d].min(0) - c).abs() < 1e-9);
                prop_assert!((out[d].max(0) - c).abs() < 1e-9);
            }
        }
    }
}
