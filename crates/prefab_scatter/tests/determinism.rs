use std::panic::{catch_unwind, AssertUnwindSafe};

use glam::{UVec3, Vec3};
use prefab_scatter::prelude::*;
use rand::RngCore;

fn shapes() -> Vec<ShapeConfig> {
    vec![
        GridSampling::new(UVec3::new(4, 2, 4), Vec3::ONE).into(),
        RingSampling::new(16, 5.0, 10.0).into(),
        DensitySampling::new_box(Vec3::new(12.0, 2.0, 12.0), 0.8, 0.1).into(),
        DensitySampling::new_sphere(Vec3::splat(10.0), 1.0, 0.0).into(),
        CurvedLineSampling::new(
            GridSampling::new(UVec3::new(1, 1, 20), Vec3::ONE),
            12.0,
            BendAxis::Z,
        )
        .into(),
    ]
}

fn jittered(shape: ShapeConfig, seed: u64) -> ScatterConfig {
    ScatterConfig::new(shape)
        .with_items([ItemSpec::new("a", 1.0), ItemSpec::new("b", 2.0)])
        .with_offsets(
            OffsetRanges::default()
                .with_position(OffsetRange::uniform(-0.25, 0.25).with_mode(OffsetMode::PerAxis))
                .with_rotation(OffsetRange::new(Vec3::ZERO, Vec3::new(10.0, 360.0, 10.0)))
                .with_scale(OffsetRange::uniform(0.0, 0.5)),
        )
        .with_seed(seed)
}

#[test]
fn every_shape_is_deterministic_per_seed() {
    let field = HeightfieldTerrain::from_fn(Vec3::splat(-20.0), 1.0, 41, 41, |x, z| {
        (x * 0.2).sin() + (z * 0.1).cos()
    });
    let terrain: Option<&dyn TerrainSurface> = Some(&field);
    for shape in shapes() {
        let config = jittered(shape, 1234).with_conformance(TerrainConformance::new(1.0, 0.5));
        let pose = OwnerPose::from_position(Vec3::new(1.0, 0.0, -2.0));
        let a = compute_placements(&config, pose, terrain);
        let b = compute_placements(&config, pose, terrain);
        assert_eq!(a, b, "shape {}", config.shape.name());
        assert_eq!(a, preview_placements(&config, pose, terrain));
    }
}

#[test]
fn sphere_points_stay_inside() {
    let size = Vec3::new(8.0, 4.0, 8.0);
    let config = ScatterConfig::new(DensitySampling::new_sphere(size, 2.0, 0.0))
        .with_item(ItemSpec::new("a", 1.0))
        .with_seed(5);
    let set = compute_placements(&config, OwnerPose::IDENTITY, None);
    assert!(!set.is_empty());
    for p in set.placements() {
        let n = p.position / size;
        assert!(n.length_squared() < 0.25, "{:?}", p.position);
    }
}

#[test]
fn count_limit_truncates_twenty_thousand_to_ten_thousand() {
    let config = ScatterConfig::new(GridSampling::new(UVec3::new(100, 2, 100), Vec3::ONE))
        .with_item(ItemSpec::new("a", 1.0))
        .with_seed(2);
    let mut sink = VecSink::new();
    let set = compute_placements_with_events(&config, OwnerPose::IDENTITY, None, &mut sink);
    assert_eq!(set.len(), DEFAULT_COUNT_LIMIT);
    assert_eq!(set.raw_sample_count, 20_000);
    assert!(sink
        .as_slice()
        .contains(&ScatterEvent::SamplesGenerated {
            raw: 20_000,
            kept: 10_000
        }));
}

#[test]
fn ambient_generator_is_unaffected_by_scoped_evaluation() {
    let mut ambient = AmbientRng::new(42);
    let mut untouched = AmbientRng::new(42);
    assert_eq!(ambient.next_u32(), untouched.next_u32());

    for shape in shapes() {
        let config = jittered(shape, 77);
        compute_placements_scoped(&config, OwnerPose::IDENTITY, None, &mut ambient, &mut ());
    }
    assert_eq!(ambient.next_u64(), untouched.next_u64());
}

#[test]
fn ambient_generator_is_restored_after_a_panicking_sink() {
    let mut ambient = AmbientRng::new(9);
    let mut untouched = AmbientRng::new(9);
    let config = jittered(GridSampling::default().into(), 3);

    let result = catch_unwind(AssertUnwindSafe(|| {
        let mut sink = FnSink::new(|event| {
            if let ScatterEvent::SamplesGenerated { .. } = event {
                panic!("sink failure");
            }
        });
        compute_placements_scoped(&config, OwnerPose::IDENTITY, None, &mut ambient, &mut sink);
    }));
    assert!(result.is_err());
    assert_eq!(ambient.next_u64(), untouched.next_u64());
}

#[test]
fn zero_weight_palette_places_nothing() {
    let config = ScatterConfig::new(RingSampling::new(8, 1.0, 0.0))
        .with_items([ItemSpec::new("a", 0.0), ItemSpec::new("b", 0.0)])
        .with_seed(1);
    let set = compute_placements(&config, OwnerPose::IDENTITY, None);
    assert_eq!(set.len(), 8);
    assert_eq!(set.live_count(), 0);
}

#[test]
fn oversized_shapes_stop_at_the_count_limit() {
    let huge: Vec<ShapeConfig> = vec![
        GridSampling::new(UVec3::splat(3_000_000), Vec3::ONE).into(),
        RingSampling::new(usize::MAX, 50.0, 0.0).into(),
        DensitySampling::new_box(Vec3::splat(1e7), 1.0, 0.0).into(),
        DensitySampling::new_sphere(Vec3::splat(1e7), 1.0, 0.0).into(),
    ];
    for shape in huge {
        let name = shape.name();
        let config = ScatterConfig::new(shape)
            .with_item(ItemSpec::new("a", 1.0))
            .with_seed(4)
            .with_count_limit(500);
        let set = compute_placements(&config, OwnerPose::IDENTITY, None);
        assert!(set.len() <= 500, "{name}");
        if name != "sphere" {
            assert_eq!(set.len(), 500, "{name}");
            assert!(set.truncated, "{name}");
            assert!(set.raw_sample_count > 500, "{name}");
        }
    }
}

#[test]
fn preview_matches_live_for_a_capped_box() {
    let shape = DensitySampling::new_box(Vec3::new(40.0, 0.0, 40.0), 2.0, 0.1);
    let config = ScatterConfig::new(shape)
        .with_item(ItemSpec::new("a", 1.0))
        .with_seed(21)
        .with_count_limit(300);
    let live = compute_placements(&config, OwnerPose::IDENTITY, None);
    let preview = preview_placements(&config, OwnerPose::IDENTITY, None);
    assert_eq!(live, preview);
    assert_eq!(live.len(), 300);
    assert!(live.truncated);
    assert_eq!(live.raw_sample_count, 301);
}
