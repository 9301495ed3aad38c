//! Terrain surfaces used for height and tilt conformance.
//!
//! Implement [`TerrainSurface`] for your engine's terrain. Positions are world-space; the
//! implementation maps them into its own terrain-local space and returns `None` where it has
//! no data, in which case conformance is skipped for that placement.
use glam::Vec3;
use mint::Vector3;

/// Trait for terrain height and normal queries at a world position.
pub trait TerrainSurface: Send + Sync {
    /// World-space surface height under the XZ of `world`.
    fn height_at(&self, world: Vector3<f32>) -> Option<f32>;
    /// Unit surface normal under the XZ of `world`.
    fn normal_at(&self, world: Vector3<f32>) -> Option<Vector3<f32>>;
}

/// Regular heightfield over the XZ plane.
///
/// `heights` is row-major with `width` samples per row along +X and `depth` rows along +Z.
/// Sample `(0, 0)` sits at `origin`; heights are relative to `origin.y`.
#[derive(Debug, Clone)]
pub struct HeightfieldTerrain {
    pub origin: Vec3,
    pub cell_size: f32,
    pub width: usize,
    pub depth: usize,
    pub heights: Vec<f32>,
}

impl HeightfieldTerrain {
    pub fn new(
        origin: Vec3,
        cell_size: f32,
        width: usize,
        depth: usize,
        heights: Vec<f32>,
    ) -> Self {
        debug_assert_eq!(heights.len(), width * depth, "heights must be width * depth");
        Self {
            origin,
            cell_size,
            width,
            depth,
            heights,
        }
    }

    /// Builds a heightfield by evaluating `f(x, z)` at every world-space sample position.
    pub fn from_fn(
        origin: Vec3,
        cell_size: f32,
        width: usize,
        depth: usize,
        f: impl Fn(f32, f32) -> f32,
    ) -> Self {
        let mut heights = Vec::with_capacity(width * depth);
        for iz in 0..depth {
            for ix in 0..width {
                let x = origin.x + ix as f32 * cell_size;
                let z = origin.z + iz as f32 * cell_size;
                heights.push(f(x, z));
            }
        }
        Self::new(origin, cell_size, width, depth, heights)
    }

    /// Extent covered by the samples along X and Z.
    pub fn size(&self) -> (f32, f32) {
        (
            self.width.saturating_sub(1) as f32 * self.cell_size,
            self.depth.saturating_sub(1) as f32 * self.cell_size,
        )
    }

    /// Terrain-local sample coordinates for a world position, `None` outside the field.
    pub fn world_to_local(&self, world: Vec3) -> Option<(f32, f32)> {
        if self.width < 2 || self.depth < 2 || self.cell_size <= 0.0 {
            return None;
        }
        let u = (world.x - self.origin.x) / self.cell_size;
        let v = (world.z - self.origin.z) / self.cell_size;
        let max_u = (self.width - 1) as f32;
        let max_v = (self.depth - 1) as f32;
        if !(0.0..=max_u).contains(&u) || !(0.0..=max_v).contains(&v) {
            return None;
        }
        Some((u, v))
    }

    fn get(&self, ix: usize, iz: usize) -> f32 {
        let ix = ix.min(self.width - 1);
        let iz = iz.min(self.depth - 1);
        self.heights.get(iz * self.width + ix).copied().unwrap_or(0.0)
    }

    /// Bilinear height relative to `origin.y` at terrain-local coordinates.
    fn local_height(&self, u: f32, v: f32) -> f32 {
        let max_u = (self.width - 1) as f32;
        let max_v = (self.depth - 1) as f32;
        let u = u.clamp(0.0, max_u);
        let v = v.clamp(0.0, max_v);
        let x0 = u.floor() as usize;
        let z0 = v.floor() as usize;
        let tx = u - x0 as f32;
        let tz = v - z0 as f32;
        let h00 = self.get(x0, z0);
        let h10 = self.get(x0 + 1, z0);
        let h01 = self.get(x0, z0 + 1);
        let h11 = self.get(x0 + 1, z0 + 1);
        let a = h00 + (h10 - h00) * tx;
        let b = h01 + (h11 - h01) * tx;
        a + (b - a) * tz
    }
}

impl TerrainSurface for HeightfieldTerrain {
    fn height_at(&self, world: Vector3<f32>) -> Option<f32> {
        let (u, v) = self.world_to_local(Vec3::from(world))?;
        Some(self.origin.y + self.local_height(u, v))
    }

    fn normal_at(&self, world: Vector3<f32>) -> Option<Vector3<f32>> {
        let (u, v) = self.world_to_local(Vec3::from(world))?;
        let e = 0.5;
        let dhdx = (self.local_height(u + e, v) - self.local_height(u - e, v)) / (2.0 * e);
        let dhdz = (self.local_height(u, v + e) - self.local_height(u, v - e)) / (2.0 * e);
        let normal = Vec3::new(-dhdx, self.cell_size, -dhdz).normalize_or(Vec3::Y);
        Some(normal.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp() -> HeightfieldTerrain {
        // Height rises one unit per unit along +X.
        HeightfieldTerrain::from_fn(Vec3::new(-5.0, 2.0, -5.0), 1.0, 11, 11, |x, _| x + 5.0)
    }

    #[test]
    fn height_is_bilinear_and_offset_by_origin() {
        let t = ramp();
        let h = t.height_at(Vec3::new(0.25, 0.0, 1.0).into()).unwrap();
        assert!((h - (2.0 + 5.25)).abs() < 1e-5);
    }

    #[test]
    fn outside_field_returns_none() {
        let t = ramp();
        assert!(t.height_at(Vec3::new(6.0, 0.0, 0.0).into()).is_none());
        assert!(t.normal_at(Vec3::new(0.0, 0.0, -6.0).into()).is_none());
    }

    #[test]
    fn flat_field_normal_points_up() {
        let t = HeightfieldTerrain::from_fn(Vec3::ZERO, 2.0, 4, 4, |_, _| 3.0);
        let n = Vec3::from(t.normal_at(Vec3::new(3.0, 0.0, 3.0).into()).unwrap());
        assert!((n - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn ramp_normal_tilts_against_slope() {
        let t = ramp();
        let n = Vec3::from(t.normal_at(Vec3::new(0.0, 0.0, 0.0).into()).unwrap());
        let expected = Vec3::new(-1.0, 1.0, 0.0).normalize();
        assert!((n - expected).length() < 1e-4);
    }

    #[test]
    fn size_and_degenerate_fields() {
        let t = ramp();
        assert_eq!(t.size(), (10.0, 10.0));
        let tiny = HeightfieldTerrain::new(Vec3::ZERO, 1.0, 1, 1, vec![0.0]);
        assert!(tiny.height_at(Vec3::ZERO.into()).is_none());
    }
}
