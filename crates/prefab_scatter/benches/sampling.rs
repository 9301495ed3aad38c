mod common;

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::{UVec3, Vec3};
use prefab_scatter::sampling::{
    BendAxis, CurvedLineSampling, DensitySampling, GridSampling, ShapeConfig, ShapeSampling,
};

const DENSITIES: [f32; 4] = [0.25, 0.5, 1.0, 2.0];
const LINE_LENGTHS: [u32; 4] = [16, 64, 256, 1024];

fn bench_shape_group(c: &mut Criterion, group_name: &str, shapes: &[(String, ShapeConfig)]) {
    let mut group = c.benchmark_group(group_name);

    for (param, shape) in shapes {
        let mut rng_est = common::bench_rng(0xA11CE);
        let expected = shape.generate(&mut rng_est, usize::MAX).len();
        group.throughput(common::placements_throughput(expected));

        let mut rng = common::bench_rng(0xC0FFEE);
        group.bench_with_input(BenchmarkId::from_parameter(param), shape, |b, shape| {
            b.iter(|| {
                let pts = shape.generate(&mut rng, usize::MAX);
                black_box(pts.len());
            });
        });
    }

    group.finish();
}

fn sampling_density_benches(c: &mut Criterion) {
    let size = Vec3::new(64.0, 0.0, 64.0);
    let boxes: Vec<(String, ShapeConfig)> = DENSITIES
        .iter()
        .map(|&d| (format!("{d:.2}"), DensitySampling::new_box(size, d, 0.1).into()))
        .collect();
    bench_shape_group(c, "sampling/box", &boxes);

    let spheres: Vec<(String, ShapeConfig)> = DENSITIES
        .iter()
        .map(|&d| {
            let shape = DensitySampling::new_sphere(Vec3::splat(32.0), d, 0.1);
            (format!("{d:.2}"), shape.into())
        })
        .collect();
    bench_shape_group(c, "sampling/sphere", &spheres);
}

fn sampling_curved_line_benches(c: &mut Criterion) {
    let lines: Vec<(String, ShapeConfig)> = LINE_LENGTHS
        .iter()
        .map(|&len| {
            let grid = GridSampling::new(UVec3::new(1, 1, len), Vec3::ONE);
            let shape = CurvedLineSampling::new(grid, 5.0, BendAxis::Z);
            (len.to_string(), shape.into())
        })
        .collect();
    bench_shape_group(c, "sampling/curved_line", &lines);
}

criterion_group! {
    name = benches;
    config = common::default_criterion();
    targets = sampling_density_benches, sampling_curved_line_benches
}
criterion_main!(benches);
