//! Event types and sinks for observing scatter evaluations.
//!
//! [`ScatterEvent`]s are emitted by [`crate::scatter::placement::compute_placements_with_events`]
//! and by [`crate::reconcile::InstanceReconciler::reconcile`]. Every event that reports a
//! problem is also logged through `tracing`, so a `()` sink loses nothing but structure.
use crate::reconcile::{RebuildReason, ReconcileOutcome};

/// Describes events emitted while computing placements and reconciling instances.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
pub enum ScatterEvent {
    /// Emitted when placement computation starts.
    EvaluationStarted {
        /// Effective seed, never `0`.
        seed: u64,
        /// Name of the shape variant.
        shape: &'static str,
    },

    /// Emitted once the shape produced its samples.
    SamplesGenerated {
        /// Samples the shape produced.
        raw: usize,
        /// Samples kept after the count limit.
        kept: usize,
    },

    /// Emitted before existing instances are torn down and rebuilt.
    RebuildStarted {
        /// Why the reconciler decided to rebuild.
        reason: RebuildReason,
    },

    /// Emitted when a reconcile pass finishes.
    ReconcileFinished {
        /// Summary of what the pass did.
        outcome: ReconcileOutcome,
    },

    /// The instance root does not hold the number of children the record expects.
    ConsistencyError {
        /// Non-empty slots in the record.
        expected: usize,
        /// Children actually found under the root.
        actual: usize,
    },

    /// Instance roots owned by the scatterer but no longer referenced were destroyed.
    OrphanRootsSwept {
        /// Number of roots destroyed.
        count: usize,
    },

    /// Non-fatal warning.
    Warning {
        /// Context string (e.g. variant id, shape name).
        context: String,
        /// Human-readable message.
        message: String,
    },
}

/// Discriminant of a [`ScatterEvent`], used to filter before an event is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScatterEventKind {
    EvaluationStarted,
    SamplesGenerated,
    RebuildStarted,
    ReconcileFinished,
    ConsistencyError,
    OrphanRootsSwept,
    Warning,
}

impl ScatterEvent {
    pub fn kind(&self) -> ScatterEventKind {
        match self {
            ScatterEvent::EvaluationStarted { .. } => ScatterEventKind::EvaluationStarted,
            ScatterEvent::SamplesGenerated { .. } => ScatterEventKind::SamplesGenerated,
            ScatterEvent::RebuildStarted { .. } => ScatterEventKind::RebuildStarted,
            ScatterEvent::ReconcileFinished { .. } => ScatterEventKind::ReconcileFinished,
            ScatterEvent::ConsistencyError { .. } => ScatterEventKind::ConsistencyError,
            ScatterEvent::OrphanRootsSwept { .. } => ScatterEventKind::OrphanRootsSwept,
            ScatterEvent::Warning { .. } => ScatterEventKind::Warning,
        }
    }

    pub fn warning(context: impl Into<String>, message: impl Into<String>) -> Self {
        ScatterEvent::Warning {
            context: context.into(),
            message: message.into(),
        }
    }
}

/// A generic event sink that accepts [`ScatterEvent`]s.
pub trait EventSink {
    fn send(&mut self, event: ScatterEvent);

    /// Whether events of `kind` should be built at all. Defaults to `true`.
    #[inline]
    fn wants(&self, _kind: ScatterEventKind) -> bool {
        true
    }
}

/// A no-op event sink.
impl EventSink for () {
    #[inline]
    fn send(&mut self, _event: ScatterEvent) {}

    #[inline]
    fn wants(&self, _kind: ScatterEventKind) -> bool {
        false
    }
}

/// An event sink that forwards to a user-provided closure.
pub struct FnSink<F>
where
    F: FnMut(ScatterEvent),
{
    f: F,
}

impl<F> FnSink<F>
where
    F: FnMut(ScatterEvent),
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> EventSink for FnSink<F>
where
    F: FnMut(ScatterEvent),
{
    #[inline]
    fn send(&mut self, event: ScatterEvent) {
        (self.f)(event);
    }
}

/// An event sink that collects all events in a `Vec`.
#[derive(Default)]
pub struct VecSink {
    events: Vec<ScatterEvent>,
}

impl VecSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            events: Vec::with_capacity(cap),
        }
    }

    pub fn into_inner(self) -> Vec<ScatterEvent> {
        self.events
    }

    pub fn as_slice(&self) -> &[ScatterEvent] {
        &self.events
    }

    /// Number of collected events of `kind`.
    pub fn count(&self, kind: ScatterEventKind) -> usize {
        self.events.iter().filter(|e| e.kind() == kind).count()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl EventSink for VecSink {
    #[inline]
    fn send(&mut self, event: ScatterEvent) {
        self.events.push(event);
    }
}
