//! Criterion micro-benchmarks for the per-level assembly kernels.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use eddy_bench::{channel_profile, cylinder_profile, level_field};
use eddy_core::{Axis, LevelField};
use eddy_diffusion::{average_cellcenter_to_face, fill_eb_velocity};
use eddy_mesh::MeshHierarchy;

/// Benchmark: average a cell-centred viscosity to the three face families.
fn bench_average_to_faces(c: &mut Criterion) {
    let case = channel_profile(42);
    let h = case.hierarchy.as_ref();
    let mut faces = Axis::ALL.map(|a| {
        LevelField::new(
            h.box_array(0).surrounding_nodes(a),
            h.distribution_map(0).clone(),
            1,
            0,
        )
    });

    c.bench_function("average_cellcenter_to_face_16k", |b| {
        b.iter(|| {
            average_cellcenter_to_face(&mut faces, &case.eta[0]);
            black_box(&faces);
        });
    });
}

/// Benchmark: halo exchange of a three-component field, periodic in y and z.
fn bench_fill_boundary(c: &mut Criterion) {
    let case = channel_profile(42);
    let period = case.hierarchy.geom(0).periodicity();
    let mut vel = case.vel[0].clone();

    c.bench_function("fill_boundary_3comp_16k", |b| {
        b.iter(|| {
            vel.fill_boundary(&period);
            black_box(&vel);
        });
    });
}

/// Benchmark: wall velocity on the cut boxes around a cylinder.
fn bench_fill_eb_velocity(c: &mut Criterion) {
    let case = cylinder_profile(42, 1.0);
    let h = case.hierarchy.as_ref();
    let factory = case.setup.eb_factories[0].clone();
    let mut vel = level_field(h, 0, 3, 0.0);

    c.bench_function("fill_eb_velocity_cylinder", |b| {
        b.iter(|| {
            fill_eb_velocity(&mut vel, factory.as_ref(), 1.0);
            black_box(&vel);
        });
    });
}

criterion_group!(
    benches,
    bench_average_to_faces,
    bench_fill_boundary,
    bench_fill_eb_velocity
);
criterion_main!(benches);
