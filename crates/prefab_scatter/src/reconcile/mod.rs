//! Reconciliation of live instances against a freshly computed [`PlacementSet`].
//!
//! The host scene is reached only through the [`SceneGraph`] trait. [`InstanceReconciler`]
//! compares the new variant sequence with the one it recorded on the previous pass and either
//! moves the existing instances in place or tears them down and rebuilds them.
//! [`MemoryScene`] is an in-memory scene for tests, demos and headless hosts.
//!
//! [`PlacementSet`]: crate::scatter::placement::PlacementSet
use std::fmt::Debug;

use crate::error::Error;
use crate::transform::Placement;

pub mod memory;
pub mod reconciler;

pub use memory::{MemoryScene, NodeId};
pub use reconciler::{sweep_orphan_roots, InstanceReconciler};

/// Requirements for handles into a host scene.
pub trait SceneHandle: Copy + Eq + Debug + Send + Sync + 'static {}

impl<T: Copy + Eq + Debug + Send + Sync + 'static> SceneHandle for T {}

/// How destroyed objects leave the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DestroyMode {
    /// Removed before `destroy` returns.
    #[default]
    Immediate,
    /// Hidden from queries now, removed when the host flushes its queue.
    Deferred,
}

/// Host scene operations used by the reconciler.
///
/// Instance roots carry a back-reference to their owner so that [`Self::instance_roots`] can
/// find roots the reconciler has lost track of.
pub trait SceneGraph {
    type Handle: SceneHandle;

    /// Whether `handle` refers to a live object (not destroyed or pending destruction).
    fn exists(&self, handle: Self::Handle) -> bool;

    /// Creates an empty instance root owned by `owner`.
    fn create_root(&mut self, owner: Self::Handle) -> Self::Handle;

    /// Creates an instance of `variant` under `parent`, `None` if the variant is unavailable.
    fn instantiate(&mut self, variant: &str, parent: Self::Handle) -> Option<Self::Handle>;

    /// Destroys `handle` and its descendants. Destroying a dead handle is a no-op.
    fn destroy(&mut self, handle: Self::Handle, mode: DestroyMode);

    /// Live children of `container` in creation order.
    fn children(&self, container: Self::Handle) -> Vec<Self::Handle>;

    /// Assigns a world-space transform.
    fn set_transform(&mut self, handle: Self::Handle, placement: &Placement);

    /// Live instance roots whose back-reference points at `owner`.
    fn instance_roots(&mut self, owner: Self::Handle) -> Vec<Self::Handle>;
}

/// What a reconcile pass did to the live instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReconcileMode {
    /// Existing instances were destroyed and recreated.
    #[default]
    Rebuild,
    /// Existing instances only received new transforms.
    RepositionOnly,
}

/// Why a pass rebuilt instead of repositioning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebuildReason {
    /// The number of slots changed.
    SlotCountChanged { previous: usize, current: usize },
    /// The variant at `index` differs from the recorded one.
    VariantChanged { index: usize },
    /// The recorded instance root is gone.
    RootMissing,
    /// The root holds a different number of children than recorded.
    ChildCountMismatch { expected: usize, actual: usize },
}

/// Summary of a reconcile pass.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReconcileOutcome {
    pub mode: ReconcileMode,
    pub rebuild_reason: Option<RebuildReason>,
    /// Instances created.
    pub created: usize,
    /// Instances torn down with the previous root.
    pub destroyed: usize,
    /// Instances that received a new transform in place.
    pub repositioned: usize,
    /// Orphaned instance roots destroyed after the pass.
    pub orphans_swept: usize,
    /// Consistency and availability problems met along the way.
    pub issues: Vec<Error>,
}

impl ReconcileOutcome {
    fn rebuild(reason: RebuildReason) -> Self {
        Self {
            mode: ReconcileMode::Rebuild,
            rebuild_reason: Some(reason),
            ..Default::default()
        }
    }

    fn reposition() -> Self {
        Self {
            mode: ReconcileMode::RepositionOnly,
            ..Default::default()
        }
    }

    /// First child-count mismatch reported in this pass.
    pub fn mismatch(&self) -> Option<(usize, usize)> {
        self.issues.iter().find_map(|e| match e {
            Error::ChildCountMismatch { expected, actual } => Some((*expected, *actual)),
            _ => None,
        })
    }

    /// Whether instances were created or destroyed.
    pub fn churned(&self) -> bool {
        self.created > 0 || self.destroyed > 0
    }
}
