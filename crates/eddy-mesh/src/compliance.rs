//! MeshHierarchy compliance test helpers.
//!
//! These functions verify that a hierarchy satisfies the invariants
//! required by the trait contract.

use crate::hierarchy::MeshHierarchy;

/// Assert `finest_level <= max_level`.
pub fn assert_level_bounds(h: &dyn MeshHierarchy) {
    assert!(
        h.finest_level() <= h.max_level(),
        "finest_level {} > max_level {}",
        h.finest_level(),
        h.max_level()
    );
}

/// Assert each level's box array and distribution map agree in length.
pub fn assert_dmap_matches_grids(h: &dyn MeshHierarchy) {
    for l in 0..=h.max_level() {
        assert_eq!(
            h.box_array(l).len(),
            h.distribution_map(l).len(),
            "level {l}: box array and distribution map lengths differ"
        );
    }
}

/// Assert all boxes lie inside their level's domain and do not overlap.
pub fn assert_boxes_disjoint_in_domain(h: &dyn MeshHierarchy) {
    for l in 0..=h.max_level() {
        let domain = h.geom(l).domain();
        let ba = h.box_array(l);
        for (i, a) in ba.iter().enumerate() {
            assert!(domain.contains_box(a), "level {l}: box {a} outside domain {domain}");
            for b in ba.iter().skip(i + 1) {
                assert!(a.intersect(b).is_none(), "level {l}: boxes {a} and {b} overlap");
            }
        }
    }
}

/// Assert level 0 covers its whole domain.
pub fn assert_level0_covers_domain(h: &dyn MeshHierarchy) {
    let domain = h.geom(0).domain();
    assert_eq!(
        h.box_array(0).num_points(),
        domain.num_points(),
        "level 0 does not tile its domain"
    );
}

/// Assert active levels carry boxes and each doubles the coarser domain.
pub fn assert_refinement_ratio(h: &dyn MeshHierarchy) {
    for l in 1..=h.max_level() {
        let coarse = h.geom(l - 1).domain().refine(2);
        assert_eq!(h.geom(l).domain(), &coarse, "level {l} is not a ratio-2 refinement");
    }
    for l in 0..=h.finest_level() {
        assert!(!h.box_array(l).is_empty(), "active level {l} has no boxes");
    }
}

/// Run every compliance check.
pub fn run_full_compliance(h: &dyn MeshHierarchy) {
    assert_level_bounds(h);
    assert_dmap_matches_grids(h);
    assert_boxes_disjoint_in_domain(h);
    assert_level0_covers_domain(h);
    assert_refinement_ratio(h);
}
