//! Bevy plugin for prefab_scatter: a scatter component, a prefab registry, and the systems that
//! keep instance entities reconciled with their owners.
#![forbid(unsafe_code)]

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

#[cfg(feature = "ron")]
pub use assets::{
    PrefabScatterAsset, PrefabScatterAssetLoader, PrefabScatterAssetPlugin, PrefabScatterSource,
};
use bevy::prelude::*;
pub use events::{ChannelSink, ScatterBus, ScatterBusConfig, ScatterEventFilter, ScatterMessage};
use prefab_scatter::prelude::*;
pub use scene::WorldScene;

#[cfg(feature = "ron")]
mod assets;
mod events;
mod scene;

/// Convenient re-exports for common types. Import with `use bevy_prefab_scatter::prelude::*;`.
pub mod prelude {
    pub use prefab_scatter::prelude::*;

    #[cfg(feature = "ron")]
    pub use crate::assets::{
        PrefabScatterAsset, PrefabScatterAssetLoader, PrefabScatterAssetPlugin,
        PrefabScatterSource,
    };
    pub use crate::events::{
        ChannelSink, ScatterBus, ScatterBusConfig, ScatterEventFilter, ScatterMessage,
    };
    pub use crate::scene::WorldScene;
    pub use crate::{
        PrefabFactory, PrefabRegistry, PrefabScatter, PrefabScatterPlugin, ScatterExecution,
        ScatterInstance, ScatterInstanceRoot, ScatterInstances, ScatterReconciled,
        ScatterTerrain,
    };
}

/// Bevy plugin registering resources, message types, and systems.
pub struct PrefabScatterPlugin;

/// Scatters prefab instances around the entity it is attached to.
///
/// Editing `config` or moving the entity schedules one evaluation in the next `Update`.
/// A `0` seed is replaced with one derived from the entity on first evaluation.
#[derive(Component, Debug, Clone)]
#[require(Transform)]
pub struct PrefabScatter {
    pub config: ScatterConfig,
    /// Disabled scatters keep no instances.
    pub enabled: bool,
}

impl PrefabScatter {
    pub fn new(config: ScatterConfig) -> Self {
        Self {
            config,
            enabled: true,
        }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

impl Default for PrefabScatter {
    fn default() -> Self {
        Self::new(ScatterConfig::default())
    }
}

/// Marks the container entity holding an owner's instances.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScatterInstanceRoot {
    pub owner: Entity,
}

/// Marks an instance entity and the variant it was built from.
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct ScatterInstance {
    pub variant: VariantId,
}

/// Builds one prefab variant onto a freshly spawned entity.
pub type PrefabFactory = Arc<dyn Fn(&mut EntityWorldMut) + Send + Sync>;

/// Variant id to factory mapping. Ids without a factory are reported as unknown variants.
#[derive(Resource, Default, Clone)]
pub struct PrefabRegistry {
    factories: HashMap<VariantId, PrefabFactory>,
    /// Runs on every new instance root.
    root: Option<PrefabFactory>,
}

impl PrefabRegistry {
    pub fn register<F>(mut self, variant: impl Into<VariantId>, factory: F) -> Self
    where
        F: Fn(&mut EntityWorldMut) + Send + Sync + 'static,
    {
        self.insert(variant, factory);
        self
    }

    pub fn insert<F>(&mut self, variant: impl Into<VariantId>, factory: F)
    where
        F: Fn(&mut EntityWorldMut) + Send + Sync + 'static,
    {
        self.factories.insert(variant.into(), Arc::new(factory));
    }

    pub fn with_root_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn(&mut EntityWorldMut) + Send + Sync + 'static,
    {
        self.root = Some(Arc::new(factory));
        self
    }

    pub fn get(&self, variant: &str) -> Option<&PrefabFactory> {
        self.factories.get(variant)
    }

    pub fn contains(&self, variant: &str) -> bool {
        self.factories.contains_key(variant)
    }
}

/// Optional terrain shared by every scatter.
#[derive(Resource, Default, Clone)]
pub struct ScatterTerrain(pub Option<Arc<dyn TerrainSurface>>);

impl ScatterTerrain {
    pub fn new(terrain: impl TerrainSurface + 'static) -> Self {
        Self(Some(Arc::new(terrain)))
    }
}

/// Execution settings applied to every scatter.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct ScatterExecution {
    pub destroy_mode: DestroyMode,
}

/// Per-owner scatter state, keyed by the owner entity.
#[derive(Resource, Default)]
pub struct ScatterInstances(pub HashMap<Entity, Scatterer<Entity>>);

impl ScatterInstances {
    pub fn get(&self, owner: Entity) -> Option<&Scatterer<Entity>> {
        self.0.get(&owner)
    }
}

/// [`EntityEvent`] triggered on the owner after every evaluation.
#[non_exhaustive]
#[derive(EntityEvent, Clone, Debug)]
pub struct ScatterReconciled {
    /// Owner entity.
    pub entity: Entity,
    /// What the evaluation did to the live instances.
    pub outcome: ReconcileOutcome,
}

impl Plugin for PrefabScatterPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<ScatterMessage>()
            .init_resource::<ScatterBusConfig>()
            .init_resource::<ScatterBus>()
            .init_resource::<PrefabRegistry>()
            .init_resource::<ScatterTerrain>()
            .init_resource::<ScatterExecution>()
            .init_resource::<ScatterInstances>()
            .add_systems(
                Update,
                (
                    cleanup_orphaned_roots,
                    evaluate_prefab_scatters,
                    drain_scatter_messages,
                )
                    .chain(),
            );
    }
}

fn owner_pose(transform: &GlobalTransform) -> OwnerPose {
    let (_, rotation, translation) = transform.to_scale_rotation_translation();
    OwnerPose::new(translation, rotation)
}

fn evaluate_prefab_scatters(world: &mut World) {
    let mut query = world.query::<(Entity, &PrefabScatter, &GlobalTransform)>();
    let owners: Vec<(Entity, bool, OwnerPose)> = query
        .iter(world)
        .map(|(entity, scatter, transform)| (entity, scatter.enabled, owner_pose(transform)))
        .collect();
    if owners.is_empty() {
        return;
    }

    let terrain = world.resource::<ScatterTerrain>().0.clone();
    let destroy_mode = world.resource::<ScatterExecution>().destroy_mode;
    let tx = world.resource::<ScatterBus>().sender().clone();
    let filter = world.resource::<ScatterBusConfig>().filter.clone();

    let mut reconciled = Vec::new();
    world.resource_scope(|world, registry: Mut<PrefabRegistry>| {
        world.resource_scope(|world, mut instances: Mut<ScatterInstances>| {
            for (owner, enabled, pose) in owners {
                let Some(component) = world.get::<PrefabScatter>(owner) else {
                    continue;
                };
                let scatterer = match instances.0.entry(owner) {
                    Entry::Occupied(slot) => {
                        let scatterer = slot.into_mut();
                        if scatterer.config() != &component.config {
                            let config = component.config.sanitized();
                            if scatterer.config() != &config {
                                scatterer.set_config(config);
                            }
                        }
                        scatterer
                    }
                    Entry::Vacant(slot) => {
                        if let Err(err) = component.config.validate() {
                            warn!("PrefabScatter config for {:?} is invalid: {}.", owner, err);
                        }
                        let config = component.config.sanitized();
                        slot.insert(Scatterer::new(config, owner.to_bits()))
                    }
                };
                scatterer.set_destroy_mode(destroy_mode);

                // Persist the resolved seed so the component keeps matching its state.
                let resolved = scatterer.config().seed;
                if let Some(mut component) = world.get_mut::<PrefabScatter>(owner) {
                    if component.config.seed != resolved {
                        component.bypass_change_detection().config.seed = resolved;
                    }
                }

                let mut scene = WorldScene::new(world, &registry);
                if !enabled {
                    if scatterer.instance_root().is_some() {
                        let removed = scatterer.disable(&mut scene, owner);
                        debug!("Disabled scatter on {:?}, removed {} roots.", owner, removed);
                    }
                    continue;
                }

                let mut sink = ChannelSink {
                    owner,
                    tx: tx.clone(),
                    filter: filter.clone(),
                };
                let outcome = scatterer.evaluate_if_dirty(
                    &mut scene,
                    owner,
                    pose,
                    terrain.as_deref(),
                    &mut sink,
                );
                if let Some(outcome) = outcome {
                    reconciled.push(ScatterReconciled {
                        entity: owner,
                        outcome,
                    });
                }
            }
        });
    });

    for event in reconciled {
        world.trigger(event);
    }
}

/// Removes state and instance roots whose owner lost its [`PrefabScatter`] or was despawned.
fn cleanup_orphaned_roots(world: &mut World) {
    world.resource_scope(|world, mut instances: Mut<ScatterInstances>| {
        instances
            .0
            .retain(|owner, _| world.get::<PrefabScatter>(*owner).is_some());

        let mut roots = world.query::<(Entity, &ScatterInstanceRoot)>();
        let orphans: Vec<Entity> = roots
            .iter(world)
            .filter(|(entity, root)| {
                instances
                    .get(root.owner)
                    .is_none_or(|scatterer| scatterer.instance_root() != Some(*entity))
            })
            .map(|(entity, _)| entity)
            .collect();

        if !orphans.is_empty() {
            debug!("Despawning {} orphaned scatter roots.", orphans.len());
        }
        for orphan in orphans {
            world.despawn(orphan);
        }
    });
}

fn drain_scatter_messages(bus: Res<ScatterBus>, mut messages: ResMut<Messages<ScatterMessage>>) {
    while let Ok(message) = bus.receiver().try_recv() {
        messages.write(message);
    }
}
