use eddy_core::IndexBox;
use eddy_mesh::{CylinderFactory, EbFactory, FabType, Geometry, MeshHierarchy, StaticHierarchy};
use std::sync::Arc;

fn channel() -> Geometry {
    Geometry::new(
        IndexBox::new([0, 0, 0], [31, 15, 3]),
        [0.0; 3],
        [2.0, 1.0, 0.25],
        [true, false, true],
    )
    .unwrap()
}

#[test]
fn per_level_factories_agree_on_geometry() {
    let h = StaticHierarchy::builder(channel())
        .max_grid_size(8)
        .refine_region(IndexBox::new([16, 8, 0], [47, 23, 7]))
        .build()
        .unwrap();
    let factories: Vec<Arc<dyn EbFactory>> = (0..=h.max_level())
        .map(|l| {
            Arc::new(CylinderFactory::new(h.geom(l).clone(), [1.0, 0.5], 0.2)) as Arc<dyn EbFactory>
        })
        .collect();

    // Every level sees the same obstacle: some box on each is cut.
    for (l, f) in factories.iter().enumerate() {
        let kinds: Vec<FabType> = h.box_array(l).iter().map(|b| f.fab_type(b)).collect();
        assert!(kinds.contains(&FabType::Cut), "level {l} has no cut box");
    }

    // A corner box of level 0 is far from the cylinder.
    let corner = h.box_array(0).get(0);
    assert_eq!(factories[0].fab_type(corner), FabType::Regular);
}

#[test]
fn hierarchy_is_object_safe() {
    let h: Arc<dyn MeshHierarchy> = Arc::new(StaticHierarchy::uniform(channel(), 16).unwrap());
    assert_eq!(h.num_active_levels(), 1);
    assert_eq!(h.box_array(0).len(), 2);
    assert!(h.geom(0).is_periodic(eddy_core::Axis::X));
}
