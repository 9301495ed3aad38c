//! Curved-line sampling: a grid whose line axis is bent into a circular arc.
use glam::{Quat, Vec3};
use rand::RngCore;

use crate::sampling::{GridSampling, LocalSample, ShapeSampling};

/// Largest bend in degrees per local unit, in either direction.
pub const MAX_ANGLE_PER_UNIT: f32 = 45.0;

/// Grid axis that runs along the arc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BendAxis {
    X,
    Y,
    #[default]
    Z,
}

impl BendAxis {
    fn index(self) -> usize {
        match self {
            BendAxis::X => 0,
            BendAxis::Y => 1,
            BendAxis::Z => 2,
        }
    }

    /// Axis the arc curves towards, with the sign that keeps the bend direction consistent.
    fn lateral(self) -> (usize, f32) {
        match self {
            BendAxis::X => (2, -1.0),
            BendAxis::Y | BendAxis::Z => (0, 1.0),
        }
    }

    /// Axis the per-point tangent rotation turns about.
    fn rotation_axis(self) -> Vec3 {
        match self {
            BendAxis::Y => Vec3::NEG_Z,
            BendAxis::X | BendAxis::Z => Vec3::Y,
        }
    }
}

/// Wraps a [`GridSampling`] and remaps its line axis onto an arc of radius
/// `1 / angle_per_unit` (in radians).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CurvedLineSampling {
    pub grid: GridSampling,
    /// Bend in degrees per unit of distance along `axis`, clamped to ±[`MAX_ANGLE_PER_UNIT`].
    pub angle_per_unit: f32,
    pub axis: BendAxis,
}

impl CurvedLineSampling {
    pub fn new(grid: GridSampling, angle_per_unit: f32, axis: BendAxis) -> Self {
        Self {
            grid,
            angle_per_unit: clamp_angle(angle_per_unit),
            axis,
        }
    }

    /// Remaps one straight-grid sample onto the arc.
    pub fn bend(&self, sample: LocalSample) -> LocalSample {
        let angle = clamp_angle(self.angle_per_unit).to_radians();
        if angle == 0.0 {
            return sample;
        }

        let along = self.axis.index();
        let (lateral, sign) = self.axis.lateral();
        let mut p = sample.position.to_array();
        if p[along] == 0.0 {
            return sample;
        }

        let radius = 1.0 / angle;
        let theta = angle * p[along];
        let (sin, cos) = theta.sin_cos();
        let bent_lateral = (1.0 - cos) * radius * sign + cos * p[lateral];
        let bent_along = sin * radius - sin * p[lateral] * sign;
        p[lateral] = bent_lateral;
        p[along] = bent_along;

        LocalSample::new(
            Vec3::from_array(p),
            Quat::from_axis_angle(self.axis.rotation_axis(), theta) * sample.rotation,
        )
    }
}

impl Default for CurvedLineSampling {
    fn default() -> Self {
        Self::new(
            GridSampling::new(glam::UVec3::new(1, 1, 5), Vec3::ONE),
            0.0,
            BendAxis::Z,
        )
    }
}

impl ShapeSampling for CurvedLineSampling {
    fn generate(&self, rng: &mut dyn RngCore, limit: usize) -> Vec<LocalSample> {
        let straight = self.grid.generate(rng, limit);
        if clamp_angle(self.angle_per_unit) == 0.0 {
            return straight;
        }
        straight.into_iter().map(|s| self.bend(s)).collect()
    }

    fn sample_count_hint(&self) -> Option<usize> {
        self.grid.sample_count_hint()
    }
}

#[inline]
fn clamp_angle(angle: f32) -> f32 {
    if angle.is_finite() {
        angle.clamp(-MAX_ANGLE_PER_UNIT, MAX_ANGLE_PER_UNIT)
    } else {
        0.0
    }
}
