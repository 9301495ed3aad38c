//! Rebuild-or-reposition decision and execution.
use tracing::{debug, error, warn};

use crate::error::Error;
use crate::reconcile::{DestroyMode, RebuildReason, ReconcileOutcome, SceneGraph, SceneHandle};
use crate::scatter::events::{EventSink, ScatterEvent, ScatterEventKind};
use crate::scatter::placement::PlacementSet;
use crate::scatter::VariantId;

/// Live-instance state of one scatterer.
///
/// `recorded` holds one entry per slot of the last applied [`PlacementSet`]; the root holds
/// exactly one child per `Some` entry, in slot order.
#[derive(Debug, Clone)]
pub struct InstanceReconciler<H> {
    root: Option<H>,
    recorded: Vec<Option<VariantId>>,
    destroy_mode: DestroyMode,
}

impl<H> Default for InstanceReconciler<H> {
    fn default() -> Self {
        Self {
            root: None,
            recorded: Vec::new(),
            destroy_mode: DestroyMode::default(),
        }
    }
}

impl<H: SceneHandle> InstanceReconciler<H> {
    pub fn new(destroy_mode: DestroyMode) -> Self {
        Self {
            destroy_mode,
            ..Default::default()
        }
    }

    pub fn root(&self) -> Option<H> {
        self.root
    }

    pub fn recorded(&self) -> &[Option<VariantId>] {
        &self.recorded
    }

    pub fn destroy_mode(&self) -> DestroyMode {
        self.destroy_mode
    }

    pub fn set_destroy_mode(&mut self, mode: DestroyMode) {
        self.destroy_mode = mode;
    }

    /// Brings the instances under the root in line with `set`.
    pub fn reconcile<S>(
        &mut self,
        scene: &mut S,
        owner: H,
        set: &PlacementSet,
        sink: &mut dyn EventSink,
    ) -> ReconcileOutcome
    where
        S: SceneGraph<Handle = H>,
    {
        let mut outcome = match self.rebuild_reason(scene, set, sink) {
            Some(reason) => {
                debug!("Rebuilding scatter instances: {:?}.", reason);
                if sink.wants(ScatterEventKind::RebuildStarted) {
                    sink.send(ScatterEvent::RebuildStarted { reason });
                }
                let mut outcome = ReconcileOutcome::rebuild(reason);
                if let RebuildReason::ChildCountMismatch { expected, actual } = reason {
                    outcome
                        .issues
                        .push(Error::ChildCountMismatch { expected, actual });
                }
                self.rebuild(scene, owner, set, &mut outcome, sink);
                outcome
            }
            None => {
                let mut outcome = ReconcileOutcome::reposition();
                self.reposition(scene, set, &mut outcome, sink);
                outcome
            }
        };

        let referenced: Vec<H> = self.root.into_iter().collect();
        outcome.orphans_swept = sweep_orphan_roots(scene, owner, &referenced, self.destroy_mode);
        if outcome.orphans_swept > 0 && sink.wants(ScatterEventKind::OrphanRootsSwept) {
            sink.send(ScatterEvent::OrphanRootsSwept {
                count: outcome.orphans_swept,
            });
        }

        if sink.wants(ScatterEventKind::ReconcileFinished) {
            sink.send(ScatterEvent::ReconcileFinished {
                outcome: outcome.clone(),
            });
        }
        outcome
    }

    /// Destroys the root and every orphaned root of `owner`, forgetting the record.
    /// Returns the number of roots destroyed.
    pub fn clear<S>(&mut self, scene: &mut S, owner: H) -> usize
    where
        S: SceneGraph<Handle = H>,
    {
        let mut destroyed = 0;
        if let Some(root) = self.root.take() {
            if scene.exists(root) {
                scene.destroy(root, self.destroy_mode);
                destroyed += 1;
            }
        }
        self.recorded.clear();
        destroyed + sweep_orphan_roots(scene, owner, &[], self.destroy_mode)
    }

    fn rebuild_reason<S>(
        &self,
        scene: &S,
        set: &PlacementSet,
        sink: &mut dyn EventSink,
    ) -> Option<RebuildReason>
    where
        S: SceneGraph<Handle = H>,
    {
        if set.len() != self.recorded.len() {
            return Some(RebuildReason::SlotCountChanged {
                previous: self.recorded.len(),
                current: set.len(),
            });
        }
        if let Some(index) = set
            .slots
            .iter()
            .zip(&self.recorded)
            .position(|(slot, recorded)| slot.variant != *recorded)
        {
            return Some(RebuildReason::VariantChanged { index });
        }

        let expected = self.recorded.iter().filter(|v| v.is_some()).count();
        let root = match self.root {
            Some(root) if scene.exists(root) => root,
            Some(_) => return Some(RebuildReason::RootMissing),
            None if expected > 0 => return Some(RebuildReason::RootMissing),
            None => return None,
        };

        let actual = scene.children(root).len();
        if actual != expected {
            report_mismatch(expected, actual, sink);
            return Some(RebuildReason::ChildCountMismatch { expected, actual });
        }
        None
    }

    fn rebuild<S>(
        &mut self,
        scene: &mut S,
        owner: H,
        set: &PlacementSet,
        outcome: &mut ReconcileOutcome,
        sink: &mut dyn EventSink,
    ) where
        S: SceneGraph<Handle = H>,
    {
        if let Some(root) = self.root.take() {
            if scene.exists(root) {
                outcome.destroyed = scene.children(root).len();
                scene.destroy(root, self.destroy_mode);
            }
        }

        self.recorded.clear();
        self.recorded.reserve(set.len());
        for slot in &set.slots {
            let Some(variant) = &slot.variant else {
                self.recorded.push(None);
                continue;
            };
            let root = *self.root.get_or_insert_with(|| scene.create_root(owner));
            match scene.instantiate(variant, root) {
                Some(instance) => {
                    scene.set_transform(instance, &slot.placement);
                    outcome.created += 1;
                    self.recorded.push(Some(variant.clone()));
                }
                None => {
                    warn!("Prefab variant '{}' could not be instantiated.", variant);
                    if sink.wants(ScatterEventKind::Warning) {
                        sink.send(ScatterEvent::warning(
                            format!("variant:{variant}"),
                            "Variant could not be instantiated; slot left empty",
                        ));
                    }
                    outcome.issues.push(Error::UnknownVariant {
                        id: variant.clone(),
                    });
                    self.recorded.push(None);
                }
            }
        }
    }

    fn reposition<S>(
        &self,
        scene: &mut S,
        set: &PlacementSet,
        outcome: &mut ReconcileOutcome,
        sink: &mut dyn EventSink,
    ) where
        S: SceneGraph<Handle = H>,
    {
        let Some(root) = self.root else {
            return;
        };
        let children = scene.children(root);
        let expected = set.live_count();
        if children.len() != expected {
            report_mismatch(expected, children.len(), sink);
            outcome.issues.push(Error::ChildCountMismatch {
                expected,
                actual: children.len(),
            });
        }

        let live_slots = set.slots.iter().filter(|s| s.variant.is_some());
        for (slot, &child) in live_slots.zip(&children) {
            scene.set_transform(child, &slot.placement);
            outcome.repositioned += 1;
        }
    }
}

fn report_mismatch(expected: usize, actual: usize, sink: &mut dyn EventSink) {
    error!(
        "Scatter instance root holds {} children but {} were recorded.",
        actual, expected
    );
    if sink.wants(ScatterEventKind::ConsistencyError) {
        sink.send(ScatterEvent::ConsistencyError { expected, actual });
    }
}

/// Destroys instance roots of `owner` that are not in `referenced`. Returns how many.
pub fn sweep_orphan_roots<S>(
    scene: &mut S,
    owner: S::Handle,
    referenced: &[S::Handle],
    mode: DestroyMode,
) -> usize
where
    S: SceneGraph,
{
    let orphans: Vec<S::Handle> = scene
        .instance_roots(owner)
        .into_iter()
        .filter(|root| !referenced.contains(root))
        .collect();
    for &root in &orphans {
        scene.destroy(root, mode);
    }
    if !orphans.is_empty() {
        debug!("Swept {} orphaned instance roots.", orphans.len());
    }
    orphans.len()
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::reconcile::{MemoryScene, NodeId, ReconcileMode};
    use crate::scatter::events::VecSink;
    use crate::scatter::placement::PlacementSlot;
    use crate::transform::Placement;

    fn set_of(variants: &[Option<&str>], x: f32) -> PlacementSet {
        PlacementSet {
            slots: variants
                .iter()
                .enumerate()
                .map(|(i, v)| PlacementSlot {
                    placement: Placement {
                        position: Vec3::new(x + i as f32, 0.0, 0.0),
                        ..Default::default()
                    },
                    item: v.map(|_| 0),
                    variant: v.map(str::to_owned),
                })
                .collect(),
            raw_sample_count: variants.len(),
            truncated: false,
        }
    }

    fn setup() -> (MemoryScene, NodeId, InstanceReconciler<NodeId>) {
        let mut scene = MemoryScene::new();
        let owner = scene.spawn_object();
        (scene, owner, InstanceReconciler::default())
    }

    #[test]
    fn first_pass_builds_non_empty_slots() {
        let (mut scene, owner, mut rec) = setup();
        let set = set_of(&[Some("a"), None, Some("b")], 0.0);
        let outcome = rec.reconcile(&mut scene, owner, &set, &mut ());
        assert_eq!(outcome.mode, ReconcileMode::Rebuild);
        assert_eq!(outcome.created, 2);
        let root = rec.root().unwrap();
        let children = scene.children(root);
        assert_eq!(children.len(), 2);
        assert_eq!(scene.variant(children[1]), Some("b"));
        assert_eq!(
            scene.transform(children[1]).unwrap().position,
            Vec3::new(2.0, 0.0, 0.0)
        );
        assert_eq!(rec.recorded().len(), 3);
    }

    #[test]
    fn transform_only_change_repositions_in_place() {
        let (mut scene, owner, mut rec) = setup();
        let placed = set_of(&[Some("a"), None, Some("a")], 0.0);
        rec.reconcile(&mut scene, owner, &placed, &mut ());
        scene.reset_counters();

        let moved = set_of(&[Some("a"), None, Some("a")], 5.0);
        let outcome = rec.reconcile(&mut scene, owner, &moved, &mut ());
        assert_eq!(outcome.mode, ReconcileMode::RepositionOnly);
        assert_eq!(outcome.repositioned, 2);
        assert!(!outcome.churned());
        assert_eq!((scene.created, scene.destroyed), (0, 0));
        let children = scene.children(rec.root().unwrap());
        assert_eq!(
            scene.transform(children[1]).unwrap().position,
            Vec3::new(7.0, 0.0, 0.0)
        );
    }

    #[test]
    fn variant_change_rebuilds() {
        let (mut scene, owner, mut rec) = setup();
        let placed = set_of(&[Some("a"), Some("b")], 0.0);
        rec.reconcile(&mut scene, owner, &placed, &mut ());
        scene.reset_counters();

        let changed = set_of(&[Some("a"), Some("c")], 0.0);
        let outcome = rec.reconcile(&mut scene, owner, &changed, &mut ());
        assert_eq!(
            outcome.rebuild_reason,
            Some(RebuildReason::VariantChanged { index: 1 })
        );
        assert_eq!((scene.created, scene.destroyed), (2, 2));
        assert_eq!(outcome.destroyed, 2);
    }

    #[test]
    fn slot_count_change_rebuilds() {
        let (mut scene, owner, mut rec) = setup();
        rec.reconcile(&mut scene, owner, &set_of(&[Some("a")], 0.0), &mut ());
        let grown = set_of(&[Some("a"), Some("a")], 0.0);
        let outcome = rec.reconcile(&mut scene, owner, &grown, &mut ());
        assert_eq!(
            outcome.rebuild_reason,
            Some(RebuildReason::SlotCountChanged {
                previous: 1,
                current: 2
            })
        );
    }

    #[test]
    fn externally_destroyed_root_rebuilds() {
        let (mut scene, owner, mut rec) = setup();
        let set = set_of(&[Some("a")], 0.0);
        rec.reconcile(&mut scene, owner, &set, &mut ());
        scene.destroy(rec.root().unwrap(), DestroyMode::Immediate);

        let outcome = rec.reconcile(&mut scene, owner, &set, &mut ());
        assert_eq!(outcome.rebuild_reason, Some(RebuildReason::RootMissing));
        assert_eq!(outcome.created, 1);
        assert!(scene.exists(rec.root().unwrap()));
    }

    #[test]
    fn missing_child_reports_consistency_error_and_rebuilds() {
        let (mut scene, owner, mut rec) = setup();
        let set = set_of(&[Some("a"), Some("a"), Some("a")], 0.0);
        rec.reconcile(&mut scene, owner, &set, &mut ());
        let root = rec.root().unwrap();
        let victim = scene.children(root)[1];
        scene.destroy(victim, DestroyMode::Immediate);

        let mut sink = VecSink::new();
        let outcome = rec.reconcile(&mut scene, owner, &set, &mut sink);
        assert_eq!(outcome.mismatch(), Some((3, 2)));
        assert_eq!(sink.count(ScatterEventKind::ConsistencyError), 1);
        assert_eq!(scene.children(rec.root().unwrap()).len(), 3);
    }

    #[test]
    fn all_gap_slots_create_nothing_and_stay_stable() {
        let (mut scene, owner, mut rec) = setup();
        let set = set_of(&[None, None], 0.0);
        let first = rec.reconcile(&mut scene, owner, &set, &mut ());
        assert_eq!(first.created, 0);
        assert!(rec.root().is_none());
        let second = rec.reconcile(&mut scene, owner, &set, &mut ());
        assert_eq!(second.mode, ReconcileMode::RepositionOnly);
    }

    #[test]
    fn empty_set_tears_down_previous_instances() {
        let (mut scene, owner, mut rec) = setup();
        let placed = set_of(&[Some("a"), Some("b")], 0.0);
        rec.reconcile(&mut scene, owner, &placed, &mut ());
        let outcome = rec.reconcile(&mut scene, owner, &PlacementSet::default(), &mut ());
        assert_eq!(outcome.destroyed, 2);
        assert!(rec.root().is_none());
        assert!(scene.instance_roots(owner).is_empty());
    }

    #[test]
    fn unavailable_variant_records_gap() {
        let mut scene = MemoryScene::new().with_variants(["a"]);
        let owner = scene.spawn_object();
        let mut rec = InstanceReconciler::default();
        let mut sink = VecSink::new();
        let set = set_of(&[Some("a"), Some("zzz")], 0.0);
        let outcome = rec.reconcile(&mut scene, owner, &set, &mut sink);
        assert_eq!(outcome.created, 1);
        assert_eq!(rec.recorded(), &[Some("a".to_owned()), None]);
        assert_eq!(
            outcome.issues,
            vec![Error::UnknownVariant { id: "zzz".into() }]
        );
        assert_eq!(sink.count(ScatterEventKind::Warning), 1);
    }

    #[test]
    fn orphan_roots_are_swept() {
        let (mut scene, owner, mut rec) = setup();
        let stray = scene.create_root(owner);
        let other_owner = scene.spawn_object();
        let foreign = scene.create_root(other_owner);

        let mut sink = VecSink::new();
        let set = set_of(&[Some("a")], 0.0);
        let outcome = rec.reconcile(&mut scene, owner, &set, &mut sink);
        assert_eq!(outcome.orphans_swept, 1);
        assert!(!scene.exists(stray));
        assert!(scene.exists(foreign));
        assert_eq!(scene.instance_roots(owner), vec![rec.root().unwrap()]);
        assert_eq!(sink.count(ScatterEventKind::OrphanRootsSwept), 1);
    }

    #[test]
    fn deferred_mode_hides_old_root_until_flush() {
        let (mut scene, owner, _) = setup();
        let mut rec = InstanceReconciler::new(DestroyMode::Deferred);
        rec.reconcile(&mut scene, owner, &set_of(&[Some("a")], 0.0), &mut ());
        let old_root = rec.root().unwrap();
        rec.reconcile(&mut scene, owner, &set_of(&[Some("b")], 0.0), &mut ());
        assert!(!scene.exists(old_root));
        assert_eq!(scene.pending_destroy_count(), 1);
        scene.flush();
        assert_eq!(scene.pending_destroy_count(), 0);
        assert_eq!(scene.children(rec.root().unwrap()).len(), 1);
    }

    #[test]
    fn clear_destroys_everything() {
        let (mut scene, owner, mut rec) = setup();
        rec.reconcile(&mut scene, owner, &set_of(&[Some("a")], 0.0), &mut ());
        scene.create_root(owner);
        assert_eq!(rec.clear(&mut scene, owner), 2);
        assert!(rec.recorded().is_empty());
        assert!(scene.instance_roots(owner).is_empty());
    }

    #[test]
    fn finished_event_carries_outcome() {
        let (mut scene, owner, mut rec) = setup();
        let mut sink = VecSink::new();
        let set = set_of(&[Some("a")], 0.0);
        let outcome = rec.reconcile(&mut scene, owner, &set, &mut sink);
        assert!(sink
            .as_slice()
            .iter()
            .any(|e| *e == ScatterEvent::ReconcileFinished { outcome: outcome.clone() }));
        assert_eq!(sink.count(ScatterEventKind::RebuildStarted), 1);
    }
}
