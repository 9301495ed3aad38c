//! Regular grid sampling strategy.
use glam::{UVec3, Vec3};
use rand::RngCore;

use crate::sampling::{LocalSample, ShapeSampling};

/// Regular 3D grid of points starting at the local origin.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridSampling {
    /// Point count per axis. Zero counts are treated as one.
    pub count: UVec3,
    /// Distance between neighbouring points per axis.
    pub spacing: Vec3,
}

impl GridSampling {
    pub fn new(count: UVec3, spacing: Vec3) -> Self {
        Self {
            count: count.max(UVec3::ONE),
            spacing,
        }
    }

    /// Point count per axis after clamping to at least one.
    pub fn effective_count(&self) -> UVec3 {
        self.count.max(UVec3::ONE)
    }

    /// Total number of points the grid produces, saturating at `usize::MAX`.
    pub fn point_count(&self) -> usize {
        let c = self.effective_count();
        (c.x as usize)
            .saturating_mul(c.y as usize)
            .saturating_mul(c.z as usize)
    }
}

impl Default for GridSampling {
    fn default() -> Self {
        Self::new(UVec3::new(10, 1, 10), Vec3::ONE)
    }
}

impl ShapeSampling for GridSampling {
    fn generate(&self, _rng: &mut dyn RngCore, limit: usize) -> Vec<LocalSample> {
        let count = self.effective_count();
        let mut points = Vec::with_capacity(self.point_count().min(limit));

        'outer: for x in 0..count.x {
            for y in 0..count.y {
                for z in 0..count.z {
                    if points.len() == limit {
                        break 'outer;
                    }
                    let index = Vec3::new(x as f32, y as f32, z as f32);
                    points.push(LocalSample::at(index * self.spacing));
                }
            }
        }

        points
    }

    fn sample_count_hint(&self) -> Option<usize> {
        Some(self.point_count())
    }
}
