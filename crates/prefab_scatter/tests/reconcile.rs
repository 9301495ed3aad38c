use glam::{Quat, UVec3, Vec3};
use prefab_scatter::prelude::*;

fn forest(seed: u64) -> ScatterConfig {
    ScatterConfig::new(DensitySampling::new_box(Vec3::new(20.0, 0.0, 20.0), 0.5, 0.2))
        .with_items([
            ItemSpec::new("pine", 3.0),
            ItemSpec::new("birch", 1.0),
            ItemSpec::gap(1.0),
        ])
        .with_offsets(
            OffsetRanges::default()
                .with_rotation(OffsetRange::new(Vec3::ZERO, Vec3::new(0.0, 360.0, 0.0)))
                .with_scale(OffsetRange::uniform(-0.2, 0.3)),
        )
        .with_seed(seed)
}

fn live_positions(scene: &MemoryScene, root: NodeId) -> Vec<Vec3> {
    scene
        .children(root)
        .into_iter()
        .filter_map(|c| scene.transform(c))
        .map(|p| p.position)
        .collect()
}

#[test]
fn live_children_match_non_empty_slots() {
    let mut scene = MemoryScene::new();
    let owner = scene.spawn_object();
    let mut scatterer = Scatterer::new(forest(7), 1);
    let outcome = scatterer.evaluate(&mut scene, owner, OwnerPose::IDENTITY, None, &mut ());

    let expected = scatterer
        .recorded_variants()
        .iter()
        .filter(|v| v.is_some())
        .count();
    let root = scatterer.instance_root().expect("root created");
    assert_eq!(scene.children(root).len(), expected);
    assert_eq!(outcome.created, expected);
    assert_eq!(scene.instance_roots(owner), vec![root]);
}

#[test]
fn rotating_owner_only_repositions() {
    let mut scene = MemoryScene::new();
    let owner = scene.spawn_object();
    let mut scatterer = Scatterer::new(forest(7), 1);
    scatterer.evaluate(&mut scene, owner, OwnerPose::IDENTITY, None, &mut ());
    let root = scatterer.instance_root().unwrap();
    let before = live_positions(&scene, root);
    scene.reset_counters();

    let mut sink = VecSink::new();
    for step in 1..=4 {
        let pose = OwnerPose::new(Vec3::ZERO, Quat::from_rotation_y(step as f32 * 0.3));
        let outcome = scatterer
            .evaluate_if_dirty(&mut scene, owner, pose, None, &mut sink)
            .expect("pose change marks dirty");
        assert_eq!(outcome.mode, ReconcileMode::RepositionOnly);
    }

    assert_eq!(scene.created, 0);
    assert_eq!(scene.destroyed, 0);
    assert_eq!(scene.repositioned, before.len() * 4);
    assert_eq!(sink.count(ScatterEventKind::RebuildStarted), 0);
    assert_eq!(scatterer.instance_root(), Some(root));
    assert_ne!(live_positions(&scene, root), before);
}

#[test]
fn reseeding_rebuilds_with_full_churn() {
    let mut scene = MemoryScene::new();
    let owner = scene.spawn_object();
    let mut scatterer = Scatterer::new(forest(7), 1);
    let first = scatterer.evaluate(&mut scene, owner, OwnerPose::IDENTITY, None, &mut ());
    scene.reset_counters();

    scatterer.config_mut().seed = 8;
    let outcome = scatterer
        .evaluate_if_dirty(&mut scene, owner, OwnerPose::IDENTITY, None, &mut ())
        .unwrap();
    assert_eq!(outcome.mode, ReconcileMode::Rebuild);
    assert!(matches!(
        outcome.rebuild_reason,
        Some(RebuildReason::VariantChanged { .. } | RebuildReason::SlotCountChanged { .. })
    ));
    assert_eq!(scene.destroyed, first.created);
    assert_eq!(scene.created, outcome.created);
    assert_eq!(scene.roots_destroyed, 1);
}

#[test]
fn two_scatterers_never_touch_each_other() {
    let mut scene = MemoryScene::new();
    let a_owner = scene.spawn_object();
    let b_owner = scene.spawn_object();
    let mut a = Scatterer::new(forest(0), a_owner.0 as u64);
    let mut b = Scatterer::new(forest(0), b_owner.0 as u64);
    assert_ne!(a.config().seed, b.config().seed);

    a.evaluate(&mut scene, a_owner, OwnerPose::IDENTITY, None, &mut ());
    b.evaluate(&mut scene, b_owner, OwnerPose::IDENTITY, None, &mut ());
    let b_root = b.instance_root().unwrap();
    let b_children = scene.children(b_root);

    a.config_mut().seed = 99;
    a.evaluate(&mut scene, a_owner, OwnerPose::IDENTITY, None, &mut ());
    a.disable(&mut scene, a_owner);

    assert!(scene.exists(b_root));
    assert_eq!(scene.children(b_root), b_children);
    assert!(scene.instance_roots(a_owner).is_empty());
}

#[test]
fn deferred_destroy_keeps_counts_consistent() {
    let mut scene = MemoryScene::new();
    let owner = scene.spawn_object();
    let mut scatterer = Scatterer::new(forest(3), 1);
    scatterer.set_destroy_mode(DestroyMode::Deferred);

    for seed in 3..6 {
        scatterer.config_mut().seed = seed;
        scatterer.evaluate(&mut scene, owner, OwnerPose::IDENTITY, None, &mut ());
    }
    assert_eq!(scene.pending_destroy_count(), 2);
    assert_eq!(scene.instance_roots(owner).len(), 1);
    scene.flush();

    let root = scatterer.instance_root().unwrap();
    let live = scatterer
        .recorded_variants()
        .iter()
        .filter(|v| v.is_some())
        .count();
    assert_eq!(scene.children(root).len(), live);
}

#[test]
fn grid_shape_snapshot_through_scene() {
    let config = ScatterConfig::new(GridSampling::new(UVec3::new(2, 1, 2), Vec3::splat(3.0)))
        .with_item(ItemSpec::new("post", 1.0))
        .with_seed(1);
    let mut scene = MemoryScene::new();
    let owner = scene.spawn_object();
    let mut scatterer = Scatterer::new(config, 1);
    scatterer.evaluate(
        &mut scene,
        owner,
        OwnerPose::from_position(Vec3::new(0.0, 1.0, 0.0)),
        None,
        &mut (),
    );
    let root = scatterer.instance_root().unwrap();
    assert_eq!(
        live_positions(&scene, root),
        vec![
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 3.0),
            Vec3::new(3.0, 1.0, 0.0),
            Vec3::new(3.0, 1.0, 3.0),
        ]
    );
}
