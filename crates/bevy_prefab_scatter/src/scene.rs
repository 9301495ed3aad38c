use std::collections::HashSet;

use bevy::prelude::*;
use prefab_scatter::prelude::{DestroyMode, Placement, SceneGraph};

use crate::{PrefabRegistry, ScatterInstance, ScatterInstanceRoot};

/// [`SceneGraph`] over a Bevy [`World`].
///
/// Instance roots are top-level entities tagged with [`ScatterInstanceRoot`]; instances are
/// their children. Placements are world-space, so roots keep an identity transform.
/// Deferred destroys hide entities immediately and despawn them when the scene is dropped.
pub struct WorldScene<'w> {
    world: &'w mut World,
    registry: &'w PrefabRegistry,
    pending: HashSet<Entity>,
    deferred: Vec<Entity>,
}

impl<'w> WorldScene<'w> {
    pub fn new(world: &'w mut World, registry: &'w PrefabRegistry) -> Self {
        Self {
            world,
            registry,
            pending: HashSet::new(),
            deferred: Vec::new(),
        }
    }

    /// Despawns everything destroyed in deferred mode so far.
    pub fn flush(&mut self) {
        for entity in self.deferred.drain(..) {
            if self.world.get_entity(entity).is_ok() {
                self.world.despawn(entity);
            }
        }
        self.pending.clear();
    }

    fn mark_pending(&mut self, entity: Entity) {
        let mut stack = vec![entity];
        while let Some(next) = stack.pop() {
            if self.pending.insert(next) {
                if let Some(children) = self.world.get::<Children>(next) {
                    stack.extend(children.to_vec());
                }
            }
        }
    }
}

impl Drop for WorldScene<'_> {
    fn drop(&mut self) {
        self.flush();
    }
}

impl SceneGraph for WorldScene<'_> {
    type Handle = Entity;

    fn exists(&self, handle: Entity) -> bool {
        !self.pending.contains(&handle) && self.world.get_entity(handle).is_ok()
    }

    fn create_root(&mut self, owner: Entity) -> Entity {
        let mut root = self.world.spawn((
            Name::new("Scatter Instances"),
            ScatterInstanceRoot { owner },
            Transform::IDENTITY,
        ));
        if let Some(factory) = &self.registry.root {
            factory(&mut root);
        }
        root.id()
    }

    fn instantiate(&mut self, variant: &str, parent: Entity) -> Option<Entity> {
        let factory = self.registry.get(variant)?;
        let mut instance = self.world.spawn((
            Name::new(variant.to_owned()),
            ScatterInstance {
                variant: variant.to_owned(),
            },
            ChildOf(parent),
            Transform::IDENTITY,
        ));
        factory(&mut instance);
        Some(instance.id())
    }

    fn destroy(&mut self, handle: Entity, mode: DestroyMode) {
        if !self.exists(handle) {
            return;
        }
        match mode {
            DestroyMode::Immediate => {
                self.world.despawn(handle);
            }
            DestroyMode::Deferred => {
                self.mark_pending(handle);
                self.deferred.push(handle);
            }
        }
    }

    fn children(&self, container: Entity) -> Vec<Entity> {
        let Some(children) = self.world.get::<Children>(container) else {
            return Vec::new();
        };
        children
            .to_vec()
            .into_iter()
            .filter(|child| !self.pending.contains(child))
            .collect()
    }

    fn set_transform(&mut self, handle: Entity, placement: &Placement) {
        if let Some(mut transform) = self.world.get_mut::<Transform>(handle) {
            *transform = Transform {
                translation: placement.position,
                rotation: placement.rotation,
                scale: placement.scale,
            };
        }
    }

    fn instance_roots(&mut self, owner: Entity) -> Vec<Entity> {
        let mut query = self.world.query::<(Entity, &ScatterInstanceRoot)>();
        let pending = &self.pending;
        let mut roots: Vec<Entity> = query
            .iter(self.world)
            .filter(|(entity, root)| root.owner == owner && !pending.contains(entity))
            .map(|(entity, _)| entity)
            .collect();
        roots.sort();
        roots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Component)]
    struct Decorated;

    fn registry() -> PrefabRegistry {
        PrefabRegistry::default()
            .register("tree", |_| {})
            .with_root_factory(|root| {
                root.insert(Decorated);
            })
    }

    #[test]
    fn instantiates_known_variants_under_the_root() {
        let mut world = World::new();
        let owner = world.spawn_empty().id();
        let registry = registry();
        let mut scene = WorldScene::new(&mut world, &registry);

        let root = scene.create_root(owner);
        let tree = scene.instantiate("tree", root).unwrap();
        assert!(scene.instantiate("missing", root).is_none());
        scene.set_transform(
            tree,
            &Placement::new(Vec3::new(1.0, 2.0, 3.0), Quat::IDENTITY, Vec3::ONE),
        );

        assert_eq!(scene.children(root), vec![tree]);
        assert_eq!(scene.instance_roots(owner), vec![root]);
        drop(scene);

        assert!(world.get::<Decorated>(root).is_some());
        let transform = world.get::<Transform>(tree).unwrap();
        assert_eq!(transform.translation, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(world.get::<ScatterInstance>(tree).unwrap().variant, "tree");
    }

    #[test]
    fn deferred_destroy_hides_then_despawns() {
        let mut world = World::new();
        let owner = world.spawn_empty().id();
        let registry = registry();
        let (root, tree) = {
            let mut scene = WorldScene::new(&mut world, &registry);
            let root = scene.create_root(owner);
            let tree = scene.instantiate("tree", root).unwrap();

            scene.destroy(root, DestroyMode::Deferred);
            assert!(!scene.exists(root));
            assert!(!scene.exists(tree));
            assert!(scene.instance_roots(owner).is_empty());
            (root, tree)
        };
        assert!(world.get_entity(root).is_err());
        assert!(world.get_entity(tree).is_err());
    }
}
