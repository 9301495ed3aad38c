//! In-memory [`SceneGraph`] with call counters.
use std::collections::{HashMap, HashSet};

use crate::reconcile::{DestroyMode, SceneGraph};
use crate::scatter::VariantId;
use crate::transform::Placement;

/// Handle into a [`MemoryScene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// A plain object, typically a scatter owner.
    Object,
    /// Container for the instances of one owner.
    InstanceRoot { owner: NodeId },
    Instance { variant: VariantId },
}

#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub transform: Placement,
    pending_destroy: bool,
}

/// Scene graph kept in a hash map.
///
/// By default every variant id can be instantiated; [`MemoryScene::with_variants`] restricts
/// the set so unavailable variants can be exercised.
#[derive(Debug, Default)]
pub struct MemoryScene {
    nodes: HashMap<NodeId, Node>,
    next_id: u32,
    variants: Option<HashSet<VariantId>>,
    deferred: Vec<NodeId>,
    /// Instances created.
    pub created: usize,
    /// Instances destroyed, including those removed with their root.
    pub destroyed: usize,
    /// Transforms assigned, including the initial one after instantiation.
    pub repositioned: usize,
    pub roots_created: usize,
    pub roots_destroyed: usize,
}

impl MemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts instantiation to `variants`.
    pub fn with_variants<I, V>(mut self, variants: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<VariantId>,
    {
        self.variants = Some(variants.into_iter().map(Into::into).collect());
        self
    }

    /// Adds a plain object, e.g. the owner of a scatter.
    pub fn spawn_object(&mut self) -> NodeId {
        self.insert(NodeKind::Object, None)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id).filter(|n| !n.pending_destroy)
    }

    /// Variant of a live instance.
    pub fn variant(&self, id: NodeId) -> Option<&str> {
        match &self.node(id)?.kind {
            NodeKind::Instance { variant } => Some(variant),
            _ => None,
        }
    }

    pub fn transform(&self, id: NodeId) -> Option<Placement> {
        self.node(id).map(|n| n.transform)
    }

    /// Number of nodes still stored, including those pending deferred destruction.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn pending_destroy_count(&self) -> usize {
        self.deferred.len()
    }

    /// Removes nodes queued by [`DestroyMode::Deferred`].
    pub fn flush(&mut self) {
        for id in std::mem::take(&mut self.deferred) {
            self.remove_subtree(id);
        }
    }

    /// Resets all call counters to zero.
    pub fn reset_counters(&mut self) {
        self.created = 0;
        self.destroyed = 0;
        self.repositioned = 0;
        self.roots_created = 0;
        self.roots_destroyed = 0;
    }

    fn insert(&mut self, kind: NodeKind, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(
            id,
            Node {
                kind,
                parent,
                children: Vec::new(),
                transform: Placement::default(),
                pending_destroy: false,
            },
        );
        if let Some(parent) = parent.and_then(|p| self.nodes.get_mut(&p)) {
            parent.children.push(id);
        }
        id
    }

    fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(node) = self.nodes.get(&next) {
                out.push(next);
                stack.extend(node.children.iter().copied());
            }
        }
        out
    }

    fn remove_subtree(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes.get(&id).and_then(|n| n.parent) {
            if let Some(parent) = self.nodes.get_mut(&parent) {
                parent.children.retain(|c| *c != id);
            }
        }
        for node in self.subtree(id) {
            self.nodes.remove(&node);
        }
    }

    fn count_destroyed(&mut self, ids: &[NodeId]) {
        for id in ids {
            match self.nodes.get(id).map(|n| &n.kind) {
                Some(NodeKind::Instance { .. }) => self.destroyed += 1,
                Some(NodeKind::InstanceRoot { .. }) => self.roots_destroyed += 1,
                _ => {}
            }
        }
    }
}

impl SceneGraph for MemoryScene {
    type Handle = NodeId;

    fn exists(&self, handle: NodeId) -> bool {
        self.node(handle).is_some()
    }

    fn create_root(&mut self, owner: NodeId) -> NodeId {
        self.roots_created += 1;
        self.insert(NodeKind::InstanceRoot { owner }, None)
    }

    fn instantiate(&mut self, variant: &str, parent: NodeId) -> Option<NodeId> {
        if !self.exists(parent) {
            return None;
        }
        if let Some(known) = &self.variants {
            if !known.contains(variant) {
                return None;
            }
        }
        self.created += 1;
        Some(self.insert(
            NodeKind::Instance {
                variant: variant.to_owned(),
            },
            Some(parent),
        ))
    }

    fn destroy(&mut self, handle: NodeId, mode: DestroyMode) {
        if !self.exists(handle) {
            return;
        }
        let subtree = self.subtree(handle);
        self.count_destroyed(&subtree);
        match mode {
            DestroyMode::Immediate => self.remove_subtree(handle),
            DestroyMode::Deferred => {
                for id in &subtree {
                    if let Some(node) = self.nodes.get_mut(id) {
                        node.pending_destroy = true;
                    }
                }
                self.deferred.push(handle);
            }
        }
    }

    fn children(&self, container: NodeId) -> Vec<NodeId> {
        self.node(container)
            .map(|n| {
                n.children
                    .iter()
                    .copied()
                    .filter(|c| self.exists(*c))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn set_transform(&mut self, handle: NodeId, placement: &Placement) {
        if let Some(node) = self.nodes.get_mut(&handle) {
            if !node.pending_destroy {
                node.transform = *placement;
                self.repositioned += 1;
            }
        }
    }

    fn instance_roots(&mut self, owner: NodeId) -> Vec<NodeId> {
        let mut roots: Vec<NodeId> = self
            .nodes
            .iter()
            .filter(|(_, n)| !n.pending_destroy && n.kind == NodeKind::InstanceRoot { owner })
            .map(|(id, _)| *id)
            .collect();
        roots.sort();
        roots
    }
}
