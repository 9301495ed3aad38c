//! Scatter pipeline: configuration, weighted item selection, placement computation and the
//! lifecycle owner that reconciles live instances.
pub mod config;
pub mod events;
pub mod placement;
pub mod scatterer;
pub mod selection;

/// Opaque identifier of a prefab variant, resolved by the host's scene graph.
pub type VariantId = String;

/// A weighted palette entry. A `None` variant deliberately leaves its slot empty.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemSpec {
    pub variant: Option<VariantId>,
    pub probability: f32,
}

impl ItemSpec {
    pub fn new(variant: impl Into<VariantId>, probability: f32) -> Self {
        Self {
            variant: Some(variant.into()),
            probability,
        }
    }

    /// An entry that produces no instance when chosen.
    pub fn gap(probability: f32) -> Self {
        Self {
            variant: None,
            probability,
        }
    }
}

impl Default for ItemSpec {
    fn default() -> Self {
        Self::gap(1.0)
    }
}
