//! Sampling strategies for generating local-space candidate points for a shape.
//!
//! This module defines the [`ShapeSampling`] trait, the concrete strategies used by the
//! placement pipeline and the [`ShapeConfig`] enum that selects one of them.
use glam::{Quat, Vec3};
use rand::RngCore;

pub mod curved_line;
pub mod density;
pub mod grid;
pub mod ring;

pub use curved_line::{BendAxis, CurvedLineSampling};
pub use density::{BoxRegion, DensitySampling, Region, SphereRegion};
pub use grid::GridSampling;
pub use ring::RingSampling;

/// One local-space sample: a position plus the point-local rotation hint emitted by the shape.
///
/// Shapes without orientation (grid, box, sphere) report [`Quat::IDENTITY`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalSample {
    pub position: Vec3,
    pub rotation: Quat,
}

impl LocalSample {
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
        }
    }
}

/// Trait for shape sampling.
pub trait ShapeSampling: Send + Sync {
    /// Generates at most `limit` samples, stopping as soon as the limit is reached.
    fn generate(&self, rng: &mut dyn RngCore, limit: usize) -> Vec<LocalSample>;

    /// Unlimited sample count when it is known without generating. Saturates at `usize::MAX`.
    fn sample_count_hint(&self) -> Option<usize> {
        None
    }
}

/// Shape selection for a scatter configuration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ShapeConfig {
    Grid(GridSampling),
    Ring(RingSampling),
    Box(DensitySampling<BoxRegion>),
    Sphere(DensitySampling<SphereRegion>),
    CurvedLine(CurvedLineSampling),
}

impl ShapeConfig {
    /// Short, stable name used in logs and events.
    pub fn name(&self) -> &'static str {
        match self {
            ShapeConfig::Grid(_) => "grid",
            ShapeConfig::Ring(_) => "ring",
            ShapeConfig::Box(_) => "box",
            ShapeConfig::Sphere(_) => "sphere",
            ShapeConfig::CurvedLine(_) => "curved_line",
        }
    }

    pub fn sampler(&self) -> &dyn ShapeSampling {
        match self {
            ShapeConfig::Grid(s) => s,
            ShapeConfig::Ring(s) => s,
            ShapeConfig::Box(s) => s,
            ShapeConfig::Sphere(s) => s,
            ShapeConfig::CurvedLine(s) => s,
        }
    }
}

impl Default for ShapeConfig {
    fn default() -> Self {
        ShapeConfig::Grid(GridSampling::default())
    }
}

impl ShapeSampling for ShapeConfig {
    fn generate(&self, rng: &mut dyn RngCore, limit: usize) -> Vec<LocalSample> {
        self.sampler().generate(rng, limit)
    }

    fn sample_count_hint(&self) -> Option<usize> {
        self.sampler().sample_count_hint()
    }
}

impl From<GridSampling> for ShapeConfig {
    fn from(value: GridSampling) -> Self {
        ShapeConfig::Grid(value)
    }
}

impl From<RingSampling> for ShapeConfig {
    fn from(value: RingSampling) -> Self {
        ShapeConfig::Ring(value)
    }
}

impl From<DensitySampling<BoxRegion>> for ShapeConfig {
    fn from(value: DensitySampling<BoxRegion>) -> Self {
        ShapeConfig::Box(value)
    }
}

impl From<DensitySampling<SphereRegion>> for ShapeConfig {
    fn from(value: DensitySampling<SphereRegion>) -> Self {
        ShapeConfig::Sphere(value)
    }
}

impl From<CurvedLineSampling> for ShapeConfig {
    fn from(value: CurvedLineSampling) -> Self {
        ShapeConfig::CurvedLine(value)
    }
}

/// Keeps the first `limit` samples, in generation order. Returns the raw count.
pub fn truncate_samples(samples: &mut Vec<LocalSample>, limit: usize) -> usize {
    let raw = samples.len();
    samples.truncate(limit);
    raw
}

/// Generate a random float in the range [0, 1).
#[inline]
pub(crate) fn rand01(rng: &mut dyn RngCore) -> f32 {
    // 24 significant bits so the result stays strictly below 1.0 after rounding.
    ((rng.next_u32() >> 8) as f32) / ((1u32 << 24) as f32)
}

/// Generate a random float in the range [-0.5, 0.5).
#[inline]
pub(crate) fn rand_centered(rng: &mut dyn RngCore) -> f32 {
    rand01(rng) - 0.5
}
