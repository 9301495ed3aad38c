//! World transform resolution for local samples.
//!
//! [`TransformResolver`] maps a [`LocalSample`] through the owner's world pose, applies the
//! randomized [`OffsetRanges`] and optionally conforms height and tilt to a
//! [`TerrainSurface`]. Random draws per placement happen in a fixed order: position offset,
//! rotation offset, scale offset.
use glam::{EulerRot, Quat, Vec3};
use rand::RngCore;

use crate::sampling::{rand01, LocalSample};

pub mod terrain;

pub use terrain::{HeightfieldTerrain, TerrainSurface};

/// Final world-space transform for one instance slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Placement {
    pub fn new(position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            position,
            rotation,
            scale,
        }
    }
}

impl Default for Placement {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Quat::IDENTITY, Vec3::ONE)
    }
}

/// World pose of the object that owns a scatter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OwnerPose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl OwnerPose {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    /// Accepts glam or `mint` vectors/quaternions.
    pub fn new(position: impl Into<Vec3>, rotation: impl Into<Quat>) -> Self {
        Self {
            position: position.into(),
            rotation: rotation.into(),
        }
    }

    pub fn from_position(position: impl Into<Vec3>) -> Self {
        Self::new(position, Quat::IDENTITY)
    }
}

impl Default for OwnerPose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// How an [`OffsetRange`] draws its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OffsetMode {
    /// One scalar interpolates all axes between `min` and `max`, so the axes move together
    /// (uniform scale jitter, offsets along the min-max diagonal).
    #[default]
    Linked,
    /// Every axis is drawn independently, covering the whole min-max box.
    PerAxis,
}

/// Per-axis range for a randomized offset. A fixed value when `min == max`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OffsetRange {
    pub min: Vec3,
    pub max: Vec3,
    #[cfg_attr(feature = "serde", serde(default))]
    pub mode: OffsetMode,
}

impl OffsetRange {
    pub const ZERO: Self = Self {
        min: Vec3::ZERO,
        max: Vec3::ZERO,
        mode: OffsetMode::Linked,
    };

    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            min,
            max,
            mode: OffsetMode::Linked,
        }
    }

    pub fn fixed(value: Vec3) -> Self {
        Self::new(value, value)
    }

    /// Same bound on every axis: `[min, max]` splatted.
    pub fn uniform(min: f32, max: f32) -> Self {
        Self::new(Vec3::splat(min), Vec3::splat(max))
    }

    pub fn with_mode(mut self, mode: OffsetMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn is_fixed(&self) -> bool {
        self.min == self.max
    }

    /// Draws one offset. Always consumes the same number of draws for a given mode, so
    /// narrowing a range to a fixed value does not shift the rest of the random sequence.
    pub fn sample(&self, rng: &mut dyn RngCore) -> Vec3 {
        match self.mode {
            OffsetMode::Linked => self.min.lerp(self.max, rand01(rng)),
            OffsetMode::PerAxis => {
                let t = Vec3::new(rand01(rng), rand01(rng), rand01(rng));
                self.min + (self.max - self.min) * t
            }
        }
    }
}

/// Offset ranges applied to every placement.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct OffsetRanges {
    /// Local-space position offset, rotated by the owner rotation.
    pub position: OffsetRange,
    /// Euler angles in degrees.
    pub rotation: OffsetRange,
    /// Added to a base scale of one.
    pub scale: OffsetRange,
}

impl OffsetRanges {
    pub fn with_position(mut self, range: OffsetRange) -> Self {
        self.position = range;
        self
    }

    pub fn with_rotation(mut self, range: OffsetRange) -> Self {
        self.rotation = range;
        self
    }

    pub fn with_scale(mut self, range: OffsetRange) -> Self {
        self.scale = range;
        self
    }
}

/// Blend weights in `[0, 1]` pulling placements onto a terrain surface.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TerrainConformance {
    pub height: f32,
    pub rotation: f32,
}

impl TerrainConformance {
    pub fn new(height: f32, rotation: f32) -> Self {
        Self {
            height: clamp01(height),
            rotation: clamp01(rotation),
        }
    }

    pub fn is_enabled(&self) -> bool {
        clamp01(self.height) > 0.0 || clamp01(self.rotation) > 0.0
    }
}

/// Resolves local samples into world placements for one evaluation.
pub struct TransformResolver<'a> {
    pub pose: OwnerPose,
    pub offsets: &'a OffsetRanges,
    pub conformance: TerrainConformance,
    pub terrain: Option<&'a dyn TerrainSurface>,
}

impl<'a> TransformResolver<'a> {
    pub fn new(pose: OwnerPose, offsets: &'a OffsetRanges) -> Self {
        Self {
            pose,
            offsets,
            conformance: TerrainConformance::default(),
            terrain: None,
        }
    }

    pub fn with_terrain(
        mut self,
        conformance: TerrainConformance,
        terrain: Option<&'a dyn TerrainSurface>,
    ) -> Self {
        self.conformance = conformance;
        self.terrain = terrain;
        self
    }

    pub fn resolve(&self, sample: LocalSample, rng: &mut dyn RngCore) -> Placement {
        let owner_rot = self.pose.rotation;

        let position_offset = self.offsets.position.sample(rng);
        let mut position =
            self.pose.position + owner_rot * sample.position + owner_rot * position_offset;

        let height_factor = clamp01(self.conformance.height);
        if height_factor > 0.0 {
            if let Some(height) = self.terrain.and_then(|t| t.height_at(position.into())) {
                let target = height + position_offset.y;
                position.y += (target - position.y) * height_factor;
            }
        }

        let euler = self.offsets.rotation.sample(rng);
        let mut rotation = euler_degrees(euler) * owner_rot * sample.rotation;

        let tilt_factor = clamp01(self.conformance.rotation);
        if tilt_factor > 0.0 {
            if let Some(normal) = self.terrain.and_then(|t| t.normal_at(position.into())) {
                let normal = Vec3::from(normal).normalize_or_zero();
                if normal != Vec3::ZERO {
                    let tilt = Quat::from_rotation_arc(Vec3::Y, normal);
                    rotation = Quat::IDENTITY.slerp(tilt, tilt_factor) * rotation;
                }
            }
        }

        let scale = Vec3::ONE + self.offsets.scale.sample(rng);

        Placement {
            position,
            rotation,
            scale,
        }
    }
}

/// Rotation for Euler angles in degrees, applied about Z, then X, then Y.
pub fn euler_degrees(degrees: Vec3) -> Quat {
    Quat::from_euler(
        EulerRot::YXZ,
        degrees.y.to_radians(),
        degrees.x.to_radians(),
        degrees.z.to_radians(),
    )
}

#[inline]
fn clamp01(v: f32) -> f32 {
    if v.is_finite() {
        v.clamp(0.0, 1.0)
    } else {
        0.0
    }
}
