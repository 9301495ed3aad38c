//! Cumulative-weight selection of palette entries.
//!
//! [`WeightedSelector`] draws one index per call, proportionally to the pushed weights. An
//! empty selector or one whose weights sum to zero has no valid choice;
//! [`WeightedSelector::choose`] returns `None` without consuming randomness, which callers
//! treat as "no instance".
use rand::RngCore;

use crate::sampling::rand01;
use crate::scatter::ItemSpec;

#[derive(Debug, Clone, Default)]
pub struct WeightedSelector {
    weights: Vec<f32>,
    total: f32,
}

impl WeightedSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a selector over the probabilities of `items`, in order.
    pub fn from_items(items: &[ItemSpec]) -> Self {
        let mut selector = Self {
            weights: Vec::with_capacity(items.len()),
            total: 0.0,
        };
        for item in items {
            selector.push(item.probability);
        }
        selector
    }

    /// Appends an option. Negative or non-finite weights count as zero.
    pub fn push(&mut self, weight: f32) {
        let weight = if weight.is_finite() { weight.max(0.0) } else { 0.0 };
        self.weights.push(weight);
        self.total += weight;
    }

    pub fn clear(&mut self) {
        self.weights.clear();
        self.total = 0.0;
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn total_weight(&self) -> f32 {
        self.total
    }

    /// Whether [`Self::choose`] can return an index.
    pub fn has_choice(&self) -> bool {
        self.total > 0.0
    }

    /// Chooses an index using a single draw in `[0, total_weight)`.
    ///
    /// Each positive weight owns a half-open interval of the cumulative sum, so a draw on a
    /// boundary picks the later entry and zero weights own nothing.
    pub fn choose(&self, rng: &mut dyn RngCore) -> Option<usize> {
        if !self.has_choice() {
            return None;
        }

        let mut remainder = rand01(rng) * self.total;
        let mut last_positive = None;
        for (i, &w) in self.weights.iter().enumerate() {
            if w <= 0.0 {
                continue;
            }
            if remainder < w {
                return Some(i);
            }
            remainder -= w;
            last_positive = Some(i);
        }

        // Rounding can leave a tiny remainder after the last weight.
        last_positive
    }
}
