#![forbid(unsafe_code)]
//! prefab_scatter: Deterministic prefab scattering over shapes and paths with
//! churn-free reconciliation of live instances.
//!
//! Modules:
//! - sampling: local-space sample generation (grid, ring, box, sphere, curved line)
//! - transform: world transform resolution with offset jitter and terrain conformance
//! - scatter: configuration, weighted selection, placement computation, events, lifecycle owner
//! - reconcile: scene-graph collaborator trait, in-memory scene, instance reconciler
//! - rng: seed resolution and scoped save/restore of a shared generator
//!
//! For examples and docs, see README and docs.rs.
pub mod error;
pub mod reconcile;
pub mod rng;
pub mod sampling;
pub mod scatter;
pub mod transform;

/// Convenient re-exports for common types. Import with `use prefab_scatter::prelude::*;`.
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::reconcile::{
        sweep_orphan_roots, DestroyMode, InstanceReconciler, MemoryScene, NodeId, RebuildReason,
        ReconcileMode, ReconcileOutcome, SceneGraph, SceneHandle,
    };
    pub use crate::rng::{resolve_seed, seed_for_identity, AmbientRng, RngScope};
    pub use crate::sampling::{
        BendAxis, BoxRegion, CurvedLineSampling, DensitySampling, GridSampling, LocalSample,
        Region, RingSampling, ShapeConfig, ShapeSampling, SphereRegion,
    };
    pub use crate::scatter::config::{ScatterConfig, DEFAULT_COUNT_LIMIT};
    pub use crate::scatter::events::{EventSink, FnSink, ScatterEvent, ScatterEventKind, VecSink};
    pub use crate::scatter::placement::{
        compute_placements, compute_placements_scoped, compute_placements_with_events,
        preview_placements, PlacementSet, PlacementSlot,
    };
    pub use crate::scatter::scatterer::Scatterer;
    pub use crate::scatter::selection::WeightedSelector;
    pub use crate::scatter::{ItemSpec, VariantId};
    pub use crate::transform::{
        euler_degrees, HeightfieldTerrain, OffsetMode, OffsetRange, OffsetRanges, OwnerPose,
        Placement, TerrainConformance, TerrainSurface, TransformResolver,
    };
}
