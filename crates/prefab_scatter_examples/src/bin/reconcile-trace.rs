use glam::{Quat, Vec3};
use prefab_scatter::prelude::*;
use prefab_scatter_examples::init_tracing;

fn step(
    label: &str,
    scatterer: &mut Scatterer<NodeId>,
    scene: &mut MemoryScene,
    owner: NodeId,
    pose: OwnerPose,
    sink: &mut VecSink,
) {
    match scatterer.evaluate_if_dirty(scene, owner, pose, None, sink) {
        Some(outcome) => println!(
            "{label:<18} {:?} reason={:?} created={} destroyed={} repositioned={} issues={}",
            outcome.mode,
            outcome.rebuild_reason,
            outcome.created,
            outcome.destroyed,
            outcome.repositioned,
            outcome.issues.len()
        ),
        None => println!("{label:<18} clean, nothing to do"),
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = ScatterConfig::new(RingSampling::new(12, 8.0, 0.0))
        .with_items([ItemSpec::new("lamp", 2.0), ItemSpec::new("bench", 1.0)])
        .with_offsets(
            OffsetRanges::default()
                .with_rotation(OffsetRange::new(Vec3::ZERO, Vec3::new(0.0, 30.0, 0.0))),
        );
    config.validate()?;

    // "crate" is unavailable, so evaluations that pick it report an issue.
    let mut scene = MemoryScene::new().with_variants(["lamp", "bench"]);
    let owner = scene.spawn_object();
    let mut scatterer = Scatterer::new(config, u64::from(owner.0));
    let mut sink = VecSink::new();

    println!("seed resolved to {:#x}", scatterer.config().seed);
    step("initial", &mut scatterer, &mut scene, owner, OwnerPose::IDENTITY, &mut sink);
    step("idle", &mut scatterer, &mut scene, owner, OwnerPose::IDENTITY, &mut sink);

    let turned = OwnerPose::new(Vec3::new(2.0, 0.0, 0.0), Quat::from_rotation_y(0.8));
    step("moved", &mut scatterer, &mut scene, owner, turned, &mut sink);

    scatterer.config_mut().offsets.scale = OffsetRange::uniform(0.0, 0.5);
    step("scale jitter", &mut scatterer, &mut scene, owner, turned, &mut sink);

    scatterer.config_mut().items.push(ItemSpec::new("crate", 1.0));
    step("palette change", &mut scatterer, &mut scene, owner, turned, &mut sink);

    scatterer.config_mut().seed += 1;
    step("reseed", &mut scatterer, &mut scene, owner, turned, &mut sink);

    let removed = scatterer.disable(&mut scene, owner);
    println!("{:<18} removed {removed} roots", "disabled");

    println!(
        "events: {} rebuilds, {} warnings, {} consistency errors",
        sink.count(ScatterEventKind::RebuildStarted),
        sink.count(ScatterEventKind::Warning),
        sink.count(ScatterEventKind::ConsistencyError)
    );
    println!(
        "scene totals: created={} destroyed={} transforms={}",
        scene.created, scene.destroyed, scene.repositioned
    );
    Ok(())
}
