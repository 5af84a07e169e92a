//! Combine per-axis scores into a single ordering value.
//!
//! Aggregation is a weighted sum over axes present in both the score set and
//! the weight map. It does not divide by the total weight; the default map
//! sums to `1.0` so combined scores stay within the axis range.
//!
//! When a weighted axis is missing or failed for an item, the remaining
//! weights are re-normalised to the configured total. With every weighted
//! axis present the rescale factor is exactly one, so the plain weighted sum
//! is returned unchanged.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{ScoreSet, WeightError, WeightMap};

/// How the engine derives the combined score for an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum CombineMode {
    /// Compute the combined score from the weight map.
    #[default]
    Weighted,
    /// Use the provider-supplied overall value when present, falling back to
    /// the weight map otherwise.
    ProviderOverall,
}

/// Weighted sum of `scores` under `weights`.
///
/// Axes without a weight are ignored. Missing or failed weighted axes are
/// excluded and the remaining weights rescaled to the configured total. An
/// item with no weighted axis present scores `0.0`.
///
/// # Examples
///
/// ```rust
/// use photorank_core::{Axis, AxisScore, ScoreFragment, ScoreSet, WeightMap, aggregate};
///
/// let scores = ScoreSet::builder()
///     .merge(ScoreFragment::single(Axis::FAVORITE, AxisScore::unit(1.0)))
///     .merge(ScoreFragment::single(Axis::RECENCY, AxisScore::unit(0.0)))
///     .build();
/// let weights = WeightMap::new([(Axis::FAVORITE, 0.5), (Axis::RECENCY, 0.5)]).unwrap();
/// assert_eq!(aggregate(&scores, &weights), 0.5);
/// ```
#[expect(
    clippy::float_arithmetic,
    reason = "aggregation is a weighted sum with a rescale for missing axes"
)]
#[must_use]
pub fn aggregate(scores: &ScoreSet, weights: &WeightMap) -> f64 {
    let mut weighted_sum = 0.0_f64;
    let mut present_weight = 0.0_f64;
    let mut missing = false;
    for (axis, weight) in weights.iter() {
        match scores.get(axis.as_str()) {
            Some(score) if score.is_valid() => {
                weighted_sum += weight * score.value();
                present_weight += weight;
            }
            _ => missing = true,
        }
    }
    if !missing {
        return weighted_sum;
    }
    if present_weight <= 0.0_f64 {
        return 0.0;
    }
    weighted_sum * (weights.total() / present_weight)
}

/// Owns the weight map and combine mode used for a ranking run.
///
/// # Examples
///
/// ```rust
/// use photorank_core::{CombineMode, ScoreAggregator, ScoreSet, ScoreFragment};
///
/// let aggregator = ScoreAggregator::default().with_mode(CombineMode::ProviderOverall);
/// let scores = ScoreSet::builder()
///     .merge(ScoreFragment::new().with_overall(7.5))
///     .build();
/// assert_eq!(aggregator.combined(&scores), 7.5);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScoreAggregator {
    weights: WeightMap,
    mode: CombineMode,
}

impl ScoreAggregator {
    /// Build an aggregator from validated weights.
    #[must_use]
    pub const fn new(weights: WeightMap, mode: CombineMode) -> Self {
        Self { weights, mode }
    }

    /// Default weights with per-key overrides.
    ///
    /// # Errors
    /// Returns [`WeightError`] when the merged weights are invalid.
    pub fn from_overrides(
        overrides: impl IntoIterator<Item = (crate::Axis, f64)>,
        mode: CombineMode,
    ) -> Result<Self, WeightError> {
        Ok(Self::new(WeightMap::with_overrides(overrides)?, mode))
    }

    /// Replace the combine mode while consuming `self`.
    #[must_use]
    pub fn with_mode(mut self, mode: CombineMode) -> Self {
        self.mode = mode;
        self
    }

    /// Configured weights.
    #[must_use]
    pub const fn weights(&self) -> &WeightMap {
        &self.weights
    }

    /// Configured combine mode.
    #[must_use]
    pub const fn mode(&self) -> CombineMode {
        self.mode
    }

    /// Combined score for one item.
    #[must_use]
    pub fn combined(&self, scores: &ScoreSet) -> f64 {
        match (self.mode, scores.overall()) {
            (CombineMode::ProviderOverall, Some(overall)) => overall,
            _ => aggregate(scores, &self.weights),
        }
    }
}
