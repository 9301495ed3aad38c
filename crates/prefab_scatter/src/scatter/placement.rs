//! Placement computation: samples, world transforms and variant selection for one evaluation.
//!
//! Every entry point consumes randomness in the same order, so a preview and a live
//! evaluation of the same configuration always agree:
//!
//! 1. shape samples (all of them, before truncation),
//! 2. one transform per kept sample (position, rotation, scale offsets),
//! 3. one selector draw per kept sample.
use glam::Vec3;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tracing::{debug, warn};

use crate::rng::{seed_for_identity, AmbientRng};
use crate::sampling::{truncate_samples, ShapeSampling};
use crate::scatter::config::ScatterConfig;
use crate::scatter::events::{EventSink, ScatterEvent, ScatterEventKind};
use crate::scatter::selection::WeightedSelector;
use crate::scatter::VariantId;
use crate::transform::{OwnerPose, Placement, TerrainSurface, TransformResolver};

/// One computed slot. `variant` is `None` for gaps and when no item could be chosen.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementSlot {
    pub placement: Placement,
    /// Index into [`ScatterConfig::items`] of the chosen entry.
    pub item: Option<usize>,
    pub variant: Option<VariantId>,
}

/// Ordered result of one evaluation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlacementSet {
    pub slots: Vec<PlacementSlot>,
    /// Samples the shape would produce without the count limit. Density shapes only know
    /// what they generated, so when truncated this is one past the limit.
    pub raw_sample_count: usize,
    pub truncated: bool,
}

impl PlacementSet {
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn placements(&self) -> impl Iterator<Item = &Placement> + '_ {
        self.slots.iter().map(|s| &s.placement)
    }

    /// Variant sequence in slot order, including gaps.
    pub fn variants(&self) -> Vec<Option<VariantId>> {
        self.slots.iter().map(|s| s.variant.clone()).collect()
    }

    /// Number of slots that will hold an instance.
    pub fn live_count(&self) -> usize {
        self.slots.iter().filter(|s| s.variant.is_some()).count()
    }

    pub fn positions(&self) -> Vec<Vec3> {
        self.slots.iter().map(|s| s.placement.position).collect()
    }
}

/// Computes placements with a generator seeded from `config.seed`.
pub fn compute_placements(
    config: &ScatterConfig,
    pose: OwnerPose,
    terrain: Option<&dyn TerrainSurface>,
) -> PlacementSet {
    compute_placements_with_events(config, pose, terrain, &mut ())
}

/// Like [`compute_placements`], emitting events into `sink`.
pub fn compute_placements_with_events(
    config: &ScatterConfig,
    pose: OwnerPose,
    terrain: Option<&dyn TerrainSurface>,
    sink: &mut dyn EventSink,
) -> PlacementSet {
    let seed = effective_seed(config, sink);
    let mut rng = StdRng::seed_from_u64(seed);
    compute_with_rng(config, seed, pose, terrain, &mut rng, sink)
}

/// Draws from `ambient` reseeded with `config.seed`; the ambient state is restored afterwards.
pub fn compute_placements_scoped(
    config: &ScatterConfig,
    pose: OwnerPose,
    terrain: Option<&dyn TerrainSurface>,
    ambient: &mut AmbientRng,
    sink: &mut dyn EventSink,
) -> PlacementSet {
    let seed = effective_seed(config, sink);
    let mut scope = ambient.scope(seed);
    compute_with_rng(config, seed, pose, terrain, &mut scope, sink)
}

/// Side-effect free re-derivation for overlays and gizmos.
pub fn preview_placements(
    config: &ScatterConfig,
    pose: OwnerPose,
    terrain: Option<&dyn TerrainSurface>,
) -> PlacementSet {
    compute_placements(config, pose, terrain)
}

fn effective_seed(config: &ScatterConfig, sink: &mut dyn EventSink) -> u64 {
    if config.seed != 0 {
        return config.seed;
    }
    warn!("Scatter evaluated with unresolved seed 0; deriving a fallback seed.");
    if sink.wants(ScatterEventKind::Warning) {
        sink.send(ScatterEvent::warning(
            "seed",
            "Seed 0 was not resolved against an owner identity",
        ));
    }
    seed_for_identity(0)
}

fn compute_with_rng(
    config: &ScatterConfig,
    seed: u64,
    pose: OwnerPose,
    terrain: Option<&dyn TerrainSurface>,
    rng: &mut dyn RngCore,
    sink: &mut dyn EventSink,
) -> PlacementSet {
    if sink.wants(ScatterEventKind::EvaluationStarted) {
        sink.send(ScatterEvent::EvaluationStarted {
            seed,
            shape: config.shape.name(),
        });
    }

    let selector = WeightedSelector::from_items(&config.items);
    if !selector.has_choice() {
        debug!("Scatter palette has no positive weight; all slots stay empty.");
    }

    // One sample past the limit tells a capped shape apart from one that fits exactly.
    let limit = config.count_limit;
    let mut samples = config.shape.generate(rng, limit.saturating_add(1));
    let generated = truncate_samples(&mut samples, limit);
    let truncated = generated > samples.len();
    let raw = config.shape.sample_count_hint().unwrap_or(generated);
    if truncated {
        warn!(
            "Shape '{}' produced {} samples; keeping the first {}.",
            config.shape.name(),
            raw,
            samples.len()
        );
    }
    if sink.wants(ScatterEventKind::SamplesGenerated) {
        sink.send(ScatterEvent::SamplesGenerated {
            raw,
            kept: samples.len(),
        });
    }

    let resolver = TransformResolver::new(pose, &config.offsets)
        .with_terrain(config.conformance, terrain);
    let placements: Vec<Placement> = samples
        .into_iter()
        .map(|sample| resolver.resolve(sample, rng))
        .collect();

    let slots = placements
        .into_iter()
        .map(|placement| {
            let item = selector.choose(rng);
            let variant = item.and_then(|i| config.items.get(i)?.variant.clone());
            PlacementSlot {
                placement,
                item,
                variant,
            }
        })
        .collect();

    PlacementSet {
        slots,
        raw_sample_count: raw,
        truncated,
    }
}
