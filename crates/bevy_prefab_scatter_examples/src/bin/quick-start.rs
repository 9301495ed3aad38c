use bevy::prelude::*;
use bevy_prefab_scatter::prelude::*;

/// Spins the scatter owner; instances follow by repositioning only.
#[derive(Component)]
struct Spin(f32);

fn main() {
    App::new()
        .add_plugins(DefaultPlugins)
        .add_plugins(PrefabScatterPlugin)
        .add_systems(Startup, setup)
        .add_systems(Update, (spin_owner, reseed_on_space, log_messages))
        .add_observer(log_reconciled)
        .run();
}

/// Registers the prefab variants and spawns the scene.
fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let pine_mesh = meshes.add(Cone {
        radius: 0.6,
        height: 2.0,
    });
    let pine_material = materials.add(Color::srgb(0.12, 0.45, 0.2));
    let rock_mesh = meshes.add(Sphere::new(0.45));
    let rock_material = materials.add(Color::srgb(0.5, 0.48, 0.45));

    // Instances need a visible parent for visibility propagation.
    let registry = PrefabRegistry::default()
        .register("pine", move |entity| {
            entity.insert((
                Mesh3d(pine_mesh.clone()),
                MeshMaterial3d(pine_material.clone()),
            ));
        })
        .register("rock", move |entity| {
            entity.insert((
                Mesh3d(rock_mesh.clone()),
                MeshMaterial3d(rock_material.clone()),
            ));
        })
        .with_root_factory(|root| {
            root.insert(Visibility::default());
        });
    commands.insert_resource(registry);

    let config = ScatterConfig::new(DensitySampling::new_box(
        Vec3::new(30.0, 0.0, 30.0),
        0.35,
        0.3,
    ))
    .with_items([
        ItemSpec::new("pine", 3.0),
        ItemSpec::new("rock", 1.0),
        ItemSpec::gap(1.0),
    ])
    .with_offsets(
        OffsetRanges::default()
            .with_position(OffsetRange::uniform(-0.4, 0.4))
            .with_rotation(OffsetRange::new(Vec3::ZERO, Vec3::new(0.0, 360.0, 0.0)))
            .with_scale(OffsetRange::uniform(-0.3, 0.4)),
    );

    // Seed 0 resolves from the entity on first evaluation.
    commands.spawn((
        Name::new("Forest"),
        PrefabScatter::new(config),
        Spin(0.1),
        Transform::default(),
    ));

    commands.spawn((
        Mesh3d(meshes.add(Plane3d::default().mesh().size(40.0, 40.0))),
        MeshMaterial3d(materials.add(Color::srgb(0.35, 0.3, 0.22))),
    ));
    commands.spawn((
        DirectionalLight {
            illuminance: 8_000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(10.0, 20.0, 5.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(0.0, 28.0, 36.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}

fn spin_owner(time: Res<Time>, mut owners: Query<(&Spin, &mut Transform)>) {
    for (spin, mut transform) in owners.iter_mut() {
        transform.rotate_y(spin.0 * time.delta_secs());
    }
}

/// Changing the seed changes the variant layout, which rebuilds.
fn reseed_on_space(keys: Res<ButtonInput<KeyCode>>, mut scatters: Query<&mut PrefabScatter>) {
    if !keys.just_pressed(KeyCode::Space) {
        return;
    }
    for mut scatter in scatters.iter_mut() {
        scatter.config.seed = scatter.config.seed.wrapping_add(1);
    }
}

fn log_reconciled(reconciled: On<ScatterReconciled>) {
    let outcome = &reconciled.outcome;
    if outcome.mode == ReconcileMode::Rebuild {
        info!(
            "Scatter {} rebuilt ({:?}): created={} destroyed={}",
            reconciled.entity, outcome.rebuild_reason, outcome.created, outcome.destroyed
        );
    }
}

fn log_messages(mut messages: MessageReader<ScatterMessage>) {
    for message in messages.read() {
        if let ScatterEvent::Warning { context, message: text } = &message.event {
            warn!("Scatter {} warning in {}: {}", message.owner, context, text);
        }
    }
}
