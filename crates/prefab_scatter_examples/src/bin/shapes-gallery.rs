use glam::{UVec3, Vec2, Vec3};
use prefab_scatter::prelude::*;
use prefab_scatter_examples::{init_tracing, render_placements_to_png, RenderConfig, VariantStyle};

fn main() -> anyhow::Result<()> {
    init_tracing();

    let shapes: Vec<(&str, ShapeConfig)> = vec![
        (
            "grid",
            GridSampling::new(UVec3::new(12, 1, 12), Vec3::splat(3.0)).into(),
        ),
        ("ring", RingSampling::new(36, 15.0, 0.0).into()),
        (
            "box",
            DensitySampling::new_box(Vec3::new(36.0, 0.0, 36.0), 0.4, 0.25).into(),
        ),
        (
            "sphere",
            DensitySampling::new_sphere(Vec3::new(36.0, 0.0, 36.0), 0.4, 0.25).into(),
        ),
        (
            "curved-line",
            CurvedLineSampling::new(
                GridSampling::new(UVec3::new(3, 1, 30), Vec3::new(1.5, 1.0, 1.0)),
                6.0,
                BendAxis::Z,
            )
            .into(),
        ),
    ];

    let render = RenderConfig::new((800, 800), Vec2::new(50.0, 50.0))
        .with_gaps(true)
        .with_style(
            "pine",
            VariantStyle::Circle {
                color: [40, 120, 60],
                radius: 6,
            },
        )
        .with_style(
            "rock",
            VariantStyle::Square {
                color: [120, 110, 100],
                half: 3,
            },
        );

    for (name, shape) in shapes {
        let config = ScatterConfig::new(shape)
            .with_items([
                ItemSpec::new("pine", 3.0),
                ItemSpec::new("rock", 1.0),
                ItemSpec::gap(0.5),
            ])
            .with_offsets(
                OffsetRanges::default()
                    .with_position(OffsetRange::uniform(-0.3, 0.3))
                    .with_scale(OffsetRange::uniform(-0.3, 0.3)),
            )
            .with_seed(42);

        let set = compute_placements(&config, OwnerPose::IDENTITY, None);
        render_placements_to_png(&set, &render, &format!("shapes-{name}.png"))?;
    }

    Ok(())
}
