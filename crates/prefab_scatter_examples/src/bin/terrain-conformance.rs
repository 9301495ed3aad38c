use glam::{Quat, UVec3, Vec2, Vec3};
use prefab_scatter::prelude::*;
use prefab_scatter_examples::{init_tracing, render_placements_to_png, RenderConfig, VariantStyle};

fn main() -> anyhow::Result<()> {
    init_tracing();

    let field = HeightfieldTerrain::from_fn(Vec3::new(-30.0, 0.0, -30.0), 0.5, 121, 121, |x, z| {
        2.0 * (x * 0.15).sin() + 1.5 * (z * 0.1).cos()
    });
    let terrain: Option<&dyn TerrainSurface> = Some(&field);

    let render = RenderConfig::new((600, 600), Vec2::new(40.0, 40.0)).with_style(
        "post",
        VariantStyle::Circle {
            color: [90, 60, 30],
            radius: 4,
        },
    );

    for (label, height, rotation) in [("none", 0.0, 0.0), ("half", 0.5, 0.5), ("full", 1.0, 1.0)] {
        let grid = GridSampling::new(UVec3::new(10, 1, 10), Vec3::splat(3.5));
        let config = ScatterConfig::new(grid)
            .with_item(ItemSpec::new("post", 1.0))
            .with_conformance(TerrainConformance::new(height, rotation))
            .with_seed(3);

        let pose = OwnerPose::from_position(Vec3::new(-16.0, 0.0, -16.0));
        let set = compute_placements(&config, pose, terrain);

        let (lo, hi) = set.placements().fold((f32::MAX, f32::MIN), |(lo, hi), p| {
            (lo.min(p.position.y), hi.max(p.position.y))
        });
        let max_tilt = set
            .placements()
            .map(|p| p.rotation.angle_between(Quat::IDENTITY).to_degrees())
            .fold(0.0f32, f32::max);
        println!("conformance {label:<5} heights {lo:>6.2}..{hi:>6.2}  max tilt {max_tilt:>5.1}");

        render_placements_to_png(&set, &render, &format!("terrain-{label}.png"))?;
    }

    Ok(())
}
