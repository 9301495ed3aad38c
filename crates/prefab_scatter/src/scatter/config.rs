//! Scatter configuration.
use glam::Vec3;

use crate::error::{Error, Result};
use crate::rng::resolve_seed;
use crate::sampling::ShapeConfig;
use crate::scatter::ItemSpec;
use crate::transform::{OffsetRanges, TerrainConformance};

/// Default hard cap on placements per evaluation.
pub const DEFAULT_COUNT_LIMIT: usize = 10_000;

/// Complete configuration of one scatter.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ScatterConfig {
    /// Shape that produces local sample points.
    pub shape: ShapeConfig,
    /// Weighted palette; one entry is drawn per sample point.
    pub items: Vec<ItemSpec>,
    /// Randomized position, rotation and scale offsets.
    pub offsets: OffsetRanges,
    /// Terrain height/tilt blend factors.
    pub conformance: TerrainConformance,
    /// Random seed; `0` means "derive from the owner identity".
    pub seed: u64,
    /// Maximum placements per evaluation. Extra samples are dropped, not reported as errors.
    pub count_limit: usize,
}

impl Default for ScatterConfig {
    fn default() -> Self {
        Self {
            shape: ShapeConfig::default(),
            items: vec![ItemSpec::default()],
            offsets: OffsetRanges::default(),
            conformance: TerrainConformance::default(),
            seed: 0,
            count_limit: DEFAULT_COUNT_LIMIT,
        }
    }
}

impl ScatterConfig {
    /// Creates a configuration for `shape` with an empty palette.
    pub fn new(shape: impl Into<ShapeConfig>) -> Self {
        Self {
            shape: shape.into(),
            items: Vec::new(),
            ..Default::default()
        }
    }

    pub fn with_item(mut self, item: ItemSpec) -> Self {
        self.items.push(item);
        self
    }

    pub fn with_items(mut self, items: impl IntoIterator<Item = ItemSpec>) -> Self {
        self.items.extend(items);
        self
    }

    pub fn with_offsets(mut self, offsets: OffsetRanges) -> Self {
        self.offsets = offsets;
        self
    }

    pub fn with_conformance(mut self, conformance: TerrainConformance) -> Self {
        self.conformance = conformance;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_count_limit(mut self, count_limit: usize) -> Self {
        self.count_limit = count_limit;
        self
    }

    /// Replaces the `0` seed sentinel with a seed derived from `identity`. Idempotent.
    pub fn resolve_seed(&mut self, identity: u64) -> u64 {
        self.seed = resolve_seed(self.seed, identity);
        self.seed
    }

    /// Copy with every `NaN` float replaced by zero.
    ///
    /// `NaN` never compares equal, so hosts that diff configs between frames diff sanitized
    /// copies. Every field the pipeline clamps already treats `NaN` as zero.
    pub fn sanitized(&self) -> Self {
        let mut config = self.clone();
        match &mut config.shape {
            ShapeConfig::Grid(grid) => grid.spacing = zero_nan3(grid.spacing),
            ShapeConfig::Ring(ring) => {
                ring.radius = zero_nan(ring.radius);
                ring.angle_degrees = zero_nan(ring.angle_degrees);
            }
            ShapeConfig::Box(region) => {
                region.region.size = zero_nan3(region.region.size);
                region.density = zero_nan(region.density);
                region.spacing = zero_nan(region.spacing);
            }
            ShapeConfig::Sphere(region) => {
                region.region.size = zero_nan3(region.region.size);
                region.density = zero_nan(region.density);
                region.spacing = zero_nan(region.spacing);
            }
            ShapeConfig::CurvedLine(line) => {
                line.grid.spacing = zero_nan3(line.grid.spacing);
                line.angle_per_unit = zero_nan(line.angle_per_unit);
            }
        }
        for item in &mut config.items {
            item.probability = zero_nan(item.probability);
        }
        let offsets = &mut config.offsets;
        for range in [&mut offsets.position, &mut offsets.rotation, &mut offsets.scale] {
            range.min = zero_nan3(range.min);
            range.max = zero_nan3(range.max);
        }
        config.conformance.height = zero_nan(config.conformance.height);
        config.conformance.rotation = zero_nan(config.conformance.rotation);
        config
    }

    /// Strict check for hosts that want to reject anomalies the pipeline would clamp.
    pub fn validate(&self) -> Result<()> {
        if self.count_limit == 0 {
            return Err(Error::InvalidConfig("count_limit must be > 0".into()));
        }
        if let Some(i) = self
            .items
            .iter()
            .position(|item| !item.probability.is_finite() || item.probability < 0.0)
        {
            return Err(Error::InvalidConfig(format!(
                "item {i} probability must be finite and >= 0"
            )));
        }
        match &self.shape {
            ShapeConfig::Box(s) if s.density.is_nan() || s.density <= 0.0 => {
                return Err(Error::InvalidConfig("box density must be > 0".into()));
            }
            ShapeConfig::Sphere(s) if s.density.is_nan() || s.density <= 0.0 => {
                return Err(Error::InvalidConfig("sphere density must be > 0".into()));
            }
            ShapeConfig::Ring(r) if r.count == 0 => {
                return Err(Error::InvalidConfig("ring count must be > 0".into()));
            }
            ShapeConfig::Grid(g) if g.count.min_element() == 0 => {
                return Err(Error::InvalidConfig("grid counts must be >= 1".into()));
            }
            _ => {}
        }

        Ok(())
    }
}

#[inline]
fn zero_nan(v: f32) -> f32 {
    if v.is_nan() {
        0.0
    } else {
        v
    }
}

#[inline]
fn zero_nan3(v: Vec3) -> Vec3 {
    Vec3::new(zero_nan(v.x), zero_nan(v.y), zero_nan(v.z))
}
