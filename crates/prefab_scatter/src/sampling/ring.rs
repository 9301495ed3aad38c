//! Ring sampling strategy.
use std::f32::consts::TAU;

use glam::{Quat, Vec3};
use rand::RngCore;

use crate::sampling::{LocalSample, ShapeSampling};

/// Points evenly spaced on a horizontal circle, each facing along its angular position.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RingSampling {
    /// Number of points on the ring.
    pub count: usize,
    /// Ring radius in local units.
    pub radius: f32,
    /// Angle of the first point in degrees, measured from +Z towards +X.
    pub angle_degrees: f32,
}

impl RingSampling {
    pub fn new(count: usize, radius: f32, angle_degrees: f32) -> Self {
        Self {
            count,
            radius,
            angle_degrees,
        }
    }
}

impl Default for RingSampling {
    fn default() -> Self {
        Self::new(8, 1.0, 0.0)
    }
}

impl ShapeSampling for RingSampling {
    fn generate(&self, _rng: &mut dyn RngCore, limit: usize) -> Vec<LocalSample> {
        if self.count == 0 {
            return Vec::new();
        }

        let start = self.angle_degrees.to_radians();
        let step = TAU / self.count as f32;

        (0..self.count.min(limit))
            .map(|i| {
                let angle = start + i as f32 * step;
                let position = Vec3::new(angle.sin() * self.radius, 0.0, angle.cos() * self.radius);
                LocalSample::new(position, Quat::from_rotation_y(angle))
            })
            .collect()
    }

    fn sample_count_hint(&self) -> Option<usize> {
        Some(self.count)
    }
}
