//! Lifecycle owner tying a configuration to its live instances.
//!
//! A [`Scatterer`] is what a host attaches to an object. Configuration edits and pose changes
//! only set a dirty flag; [`Scatterer::evaluate_if_dirty`] runs at most one evaluation for any
//! number of triggers since the last one.
use tracing::debug;

use crate::reconcile::{
    DestroyMode, InstanceReconciler, ReconcileOutcome, SceneGraph, SceneHandle,
};
use crate::scatter::config::ScatterConfig;
use crate::scatter::events::EventSink;
use crate::scatter::placement::{compute_placements_with_events, preview_placements, PlacementSet};
use crate::scatter::VariantId;
use crate::transform::{OwnerPose, TerrainSurface};

#[derive(Debug, Clone)]
pub struct Scatterer<H> {
    config: ScatterConfig,
    identity: u64,
    dirty: bool,
    last_pose: Option<OwnerPose>,
    reconciler: InstanceReconciler<H>,
}

impl<H: SceneHandle> Scatterer<H> {
    /// Creates a dirty scatterer. A `0` seed is resolved from `identity` here, once.
    pub fn new(mut config: ScatterConfig, identity: u64) -> Self {
        config.resolve_seed(identity);
        Self {
            config,
            identity,
            dirty: true,
            last_pose: None,
            reconciler: InstanceReconciler::default(),
        }
    }

    pub fn identity(&self) -> u64 {
        self.identity
    }

    pub fn config(&self) -> &ScatterConfig {
        &self.config
    }

    /// Mutable access to the configuration; marks the scatterer dirty.
    pub fn config_mut(&mut self) -> &mut ScatterConfig {
        self.dirty = true;
        &mut self.config
    }

    /// Replaces the configuration, resolving a `0` seed against the identity.
    pub fn set_config(&mut self, mut config: ScatterConfig) {
        config.resolve_seed(self.identity);
        self.config = config;
        self.dirty = true;
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Records the owner pose, marking the scatterer dirty when it moved.
    pub fn observe_pose(&mut self, pose: OwnerPose) {
        if self.last_pose != Some(pose) {
            self.last_pose = Some(pose);
            self.dirty = true;
        }
    }

    /// Evaluates only if something changed since the last evaluation.
    pub fn evaluate_if_dirty<S>(
        &mut self,
        scene: &mut S,
        owner: H,
        pose: OwnerPose,
        terrain: Option<&dyn TerrainSurface>,
        sink: &mut dyn EventSink,
    ) -> Option<ReconcileOutcome>
    where
        S: SceneGraph<Handle = H>,
    {
        self.observe_pose(pose);
        if !self.dirty {
            return None;
        }
        Some(self.evaluate(scene, owner, pose, terrain, sink))
    }

    /// Computes placements and reconciles the live instances unconditionally.
    pub fn evaluate<S>(
        &mut self,
        scene: &mut S,
        owner: H,
        pose: OwnerPose,
        terrain: Option<&dyn TerrainSurface>,
        sink: &mut dyn EventSink,
    ) -> ReconcileOutcome
    where
        S: SceneGraph<Handle = H>,
    {
        self.dirty = false;
        self.last_pose = Some(pose);
        self.config.resolve_seed(self.identity);

        let set = compute_placements_with_events(&self.config, pose, terrain, sink);
        let outcome = self.reconciler.reconcile(scene, owner, &set, sink);
        debug!(
            "Scatter {:#x}: {:?}, created {}, destroyed {}, repositioned {}.",
            self.identity, outcome.mode, outcome.created, outcome.destroyed, outcome.repositioned
        );
        outcome
    }

    /// Placements the next evaluation at `pose` would produce. Touches no scene state.
    pub fn preview(&self, pose: OwnerPose, terrain: Option<&dyn TerrainSurface>) -> PlacementSet {
        preview_placements(&self.config, pose, terrain)
    }

    pub fn instance_root(&self) -> Option<H> {
        self.reconciler.root()
    }

    pub fn recorded_variants(&self) -> &[Option<VariantId>] {
        self.reconciler.recorded()
    }

    pub fn set_destroy_mode(&mut self, mode: DestroyMode) {
        self.reconciler.set_destroy_mode(mode);
    }

    /// Destroys all live instances. The next evaluation rebuilds from scratch.
    pub fn disable<S>(&mut self, scene: &mut S, owner: H) -> usize
    where
        S: SceneGraph<Handle = H>,
    {
        self.dirty = true;
        self.reconciler.clear(scene, owner)
    }
}
