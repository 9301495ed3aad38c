//! Density-based region sampling (box and sphere).
//!
//! The local bounds of a [`Region`] are divided into cubic cells of edge `1 / density`,
//! centered on the local origin. Each cell proposes one jittered point; the region's
//! [`Region::weight`] decides whether it is kept. This approximates `density` points per unit
//! of covered length/area/volume with per-cell jitter; it is not a blue-noise process.
//!
//! Generation stops once `limit` points are accepted or after
//! `limit * CELLS_PER_SAMPLE_BUDGET` visited cells, whichever comes first.
use glam::Vec3;
use rand::RngCore;

use crate::sampling::{rand_centered, LocalSample, ShapeSampling};

/// Smallest density used when computing the cell size.
pub const MIN_DENSITY: f32 = 0.001;

/// Cells visited per requested sample before generation gives up on a sparse region.
pub const CELLS_PER_SAMPLE_BUDGET: usize = 16;

/// A bounded region with a containment weight.
pub trait Region: Send + Sync {
    /// Full extent of the region's bounding box in local units.
    fn bounds(&self) -> Vec3;
    /// Acceptance weight for a local point; points with weight `<= 0` are rejected.
    fn weight(&self, local: Vec3) -> f32;
}

/// Axis-aligned box centered on the local origin. Accepts every point.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoxRegion {
    pub size: Vec3,
}

impl BoxRegion {
    pub fn new(size: Vec3) -> Self {
        Self { size }
    }
}

impl Default for BoxRegion {
    fn default() -> Self {
        Self::new(Vec3::new(10.0, 0.0, 10.0))
    }
}

impl Region for BoxRegion {
    fn bounds(&self) -> Vec3 {
        self.size
    }

    fn weight(&self, _local: Vec3) -> f32 {
        1.0
    }
}

/// Ellipsoid inscribed in a box of `size`. Axes with zero size are ignored by the test,
/// so `(10, 0, 10)` is a flat disc.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SphereRegion {
    pub size: Vec3,
}

impl SphereRegion {
    pub fn new(size: Vec3) -> Self {
        Self { size }
    }

    /// Position scaled into the unit box, zero on degenerate axes.
    pub fn normalized(&self, local: Vec3) -> Vec3 {
        let axis = |p: f32, s: f32| if s == 0.0 { 0.0 } else { p / s };
        Vec3::new(
            axis(local.x, self.size.x),
            axis(local.y, self.size.y),
            axis(local.z, self.size.z),
        )
    }
}

impl Default for SphereRegion {
    fn default() -> Self {
        Self::new(Vec3::new(10.0, 0.0, 10.0))
    }
}

impl Region for SphereRegion {
    fn bounds(&self) -> Vec3 {
        self.size
    }

    fn weight(&self, local: Vec3) -> f32 {
        if self.normalized(local).length_squared() < 0.25 {
            1.0
        } else {
            0.0
        }
    }
}

/// Jittered per-cell sampling of a [`Region`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DensitySampling<R> {
    pub region: R,
    /// Points per unit along each covered axis. Values below [`MIN_DENSITY`] are raised to it.
    pub density: f32,
    /// Margin kept free inside each cell; reduces the jitter span.
    pub spacing: f32,
}

impl<R: Region> DensitySampling<R> {
    pub fn new(region: R, density: f32, spacing: f32) -> Self {
        Self {
            region,
            density: sanitize(density),
            spacing: sanitize(spacing),
        }
    }

    /// Edge length of one cell.
    pub fn cell_size(&self) -> f32 {
        1.0 / sanitize(self.density).max(MIN_DENSITY)
    }

    /// Number of cells along each axis; always at least one.
    pub fn cell_counts(&self) -> [usize; 3] {
        let bounds = self.region.bounds();
        let cell = self.cell_size();
        // Float to int casts saturate, so unbounded extents cap at `usize::MAX`.
        let axis = |b: f32| ((b / cell).floor().max(1.0)) as usize;
        [axis(bounds.x), axis(bounds.y), axis(bounds.z)]
    }

    /// Total number of cells, saturating at `usize::MAX`.
    pub fn cell_count(&self) -> usize {
        let [nx, ny, nz] = self.cell_counts();
        nx.saturating_mul(ny).saturating_mul(nz)
    }
}

impl DensitySampling<BoxRegion> {
    pub fn new_box(size: Vec3, density: f32, spacing: f32) -> Self {
        Self::new(BoxRegion::new(size), density, spacing)
    }
}

impl DensitySampling<SphereRegion> {
    pub fn new_sphere(size: Vec3, density: f32, spacing: f32) -> Self {
        Self::new(SphereRegion::new(size), density, spacing)
    }
}

impl<R: Region + Default> Default for DensitySampling<R> {
    fn default() -> Self {
        Self::new(R::default(), 0.5, 0.5)
    }
}

impl<R: Region> ShapeSampling for DensitySampling<R> {
    fn generate(&self, rng: &mut dyn RngCore, limit: usize) -> Vec<LocalSample> {
        let bounds = self.region.bounds();
        let cell = self.cell_size();
        let inner = (cell - sanitize(self.spacing)).max(0.0);
        let [nx, ny, nz] = self.cell_counts();

        let start = Vec3::new(
            -cell * (nx - 1) as f32 * 0.5,
            -cell * (ny - 1) as f32 * 0.5,
            -cell * (nz - 1) as f32 * 0.5,
        );
        // Axes thinner than one cell only jitter in proportion to their extent.
        let coverage = (bounds / cell).clamp(Vec3::ZERO, Vec3::ONE);

        let mut budget = limit.saturating_mul(CELLS_PER_SAMPLE_BUDGET);
        let mut points = Vec::with_capacity(self.cell_count().min(limit));
        'outer: for ix in 0..nx {
            for iy in 0..ny {
                for iz in 0..nz {
                    if points.len() == limit || budget == 0 {
                        break 'outer;
                    }
                    budget -= 1;
                    let center = start + Vec3::new(ix as f32, iy as f32, iz as f32) * cell;
                    let jitter = Vec3::new(
                        rand_centered(rng),
                        rand_centered(rng),
                        rand_centered(rng),
                    );
                    let position = center + jitter * inner * coverage;
                    if self.region.weight(position) <= 0.0 {
                        continue;
                    }
                    points.push(LocalSample::at(position));
                }
            }
        }

        points
    }
}

#[inline]
fn sanitize(v: f32) -> f32 {
    if v.is_finite() {
        v.max(0.0)
    } else {
        0.0
    }
}
