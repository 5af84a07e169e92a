//! Axis weights used to combine a score set into one value.

use std::collections::BTreeMap;

use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::Axis;

/// Errors raised while validating a [`WeightMap`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WeightError {
    /// A weight was negative.
    #[error("weight for axis `{axis}` must not be negative")]
    Negative {
        /// Offending axis.
        axis: Axis,
    },
    /// A weight was NaN or infinite.
    #[error("weight for axis `{axis}` must be finite")]
    NonFinite {
        /// Offending axis.
        axis: Axis,
    },
    /// Weights summed to zero, so no axis could ever contribute.
    #[error("weights must sum to a positive value")]
    ZeroTotal,
}

/// Non-negative weights keyed by axis.
///
/// Axes without an entry are excluded from aggregation. The default map
/// weights the heuristic vocabulary and sums to `1.0`.
///
/// # Examples
///
/// ```rust
/// use photorank_core::{Axis, WeightMap};
///
/// # fn main() -> Result<(), photorank_core::WeightError> {
/// let weights = WeightMap::default().overridden([(Axis::FAVORITE, 0.4)])?;
/// assert_eq!(weights.get("favorite"), Some(0.4));
/// assert_eq!(weights.get("aesthetic"), Some(0.25));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(
        try_from = "BTreeMap<Axis, f64>",
        into = "BTreeMap<Axis, f64>"
    )
)]
pub struct WeightMap {
    weights: BTreeMap<Axis, f64>,
}

impl WeightMap {
    /// Validate and construct a weight map.
    ///
    /// # Errors
    /// Returns [`WeightError`] when a weight is negative or non-finite, or
    /// when the weights sum to zero.
    pub fn new(weights: impl IntoIterator<Item = (Axis, f64)>) -> Result<Self, WeightError> {
        let map = Self {
            weights: weights.into_iter().collect(),
        };
        map.validate()?;
        Ok(map)
    }

    /// Default weights with caller-supplied entries replacing matching keys.
    ///
    /// # Errors
    /// Returns [`WeightError`] when the merged map is invalid.
    pub fn with_overrides(
        overrides: impl IntoIterator<Item = (Axis, f64)>,
    ) -> Result<Self, WeightError> {
        Self::default().overridden(overrides)
    }

    /// Replace matching keys with `overrides`, keeping all other entries.
    ///
    /// # Errors
    /// Returns [`WeightError`] when the merged map is invalid.
    pub fn overridden(
        mut self,
        overrides: impl IntoIterator<Item = (Axis, f64)>,
    ) -> Result<Self, WeightError> {
        self.weights.extend(overrides);
        self.validate()?;
        Ok(self)
    }

    /// Equal weights over the unconditional LLM rubric axes.
    ///
    /// The conditional axes (activity, achievement, talent) are weighted at
    /// zero because they are legitimately zero for most photos. This is the
    /// map to pair with the LLM scorer.
    #[expect(clippy::float_arithmetic, reason = "equal share of a unit total")]
    #[must_use]
    pub fn llm_defaults() -> Self {
        let unconditional = [
            Axis::TECHNICAL,
            Axis::AESTHETIC,
            Axis::SEMANTIC,
            Axis::NOVELTY,
            Axis::TRENDY_VIBE,
            Axis::METADATA,
        ];
        let conditional = [Axis::ACTIVITY, Axis::ACHIEVEMENT, Axis::TALENT];
        let share = 1.0_f64 / 6.0_f64;
        Self {
            weights: unconditional
                .into_iter()
                .map(|axis| (axis, share))
                .chain(conditional.into_iter().map(|axis| (axis, 0.0_f64)))
                .collect(),
        }
    }

    /// Weight for `axis`, if configured.
    #[must_use]
    pub fn get(&self, axis: &str) -> Option<f64> {
        self.weights.get(axis).copied()
    }

    /// Iterate over weights in axis order.
    pub fn iter(&self) -> impl Iterator<Item = (&Axis, f64)> {
        self.weights.iter().map(|(axis, weight)| (axis, *weight))
    }

    /// Sum of all weights.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.weights.values().sum()
    }

    /// Number of weighted axes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Report whether no axis is weighted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    fn validate(&self) -> Result<(), WeightError> {
        for (axis, weight) in &self.weights {
            if !weight.is_finite() {
                return Err(WeightError::NonFinite { axis: axis.clone() });
            }
            if *weight < 0.0_f64 {
                return Err(WeightError::Negative { axis: axis.clone() });
            }
        }
        if self.total() <= 0.0_f64 {
            return Err(WeightError::ZeroTotal);
        }
        Ok(())
    }
}

impl Default for WeightMap {
    fn default() -> Self {
        Self {
            weights: BTreeMap::from([
                (Axis::AESTHETIC, 0.25_f64),
                (Axis::TECHNICAL, 0.15_f64),
                (Axis::SENTIMENT, 0.15_f64),
                (Axis::NOVELTY, 0.15_f64),
                (Axis::RECENCY, 0.15_f64),
                (Axis::FAVORITE, 0.15_f64),
            ]),
        }
    }
}

impl TryFrom<BTreeMap<Axis, f64>> for WeightMap {
    type Error = WeightError;

    fn try_from(weights: BTreeMap<Axis, f64>) -> Result<Self, Self::Error> {
        Self::new(weights)
    }
}

impl From<WeightMap> for BTreeMap<Axis, f64> {
    fn from(map: WeightMap) -> Self {
        map.weights
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn defaults_sum_to_one() {
        assert!((WeightMap::default().total() - 1.0).abs() < 1e-12);
    }

    #[rstest]
    fn llm_defaults_sum_to_one() {
        let weights = WeightMap::llm_defaults();
        assert!((weights.total() - 1.0).abs() < 1e-12);
        assert_eq!(weights.get("activity"), Some(0.0));
        assert!(
            Axis::LLM_VOCABULARY
                .iter()
                .all(|axis| weights.get(axis.as_str()).is_some())
        );
    }

    #[rstest]
    fn overrides_replace_only_named_keys() {
        let weights =
            WeightMap::with_overrides([(Axis::AESTHETIC, 0.5)]).expect("valid overrides");
        assert_eq!(weights.get("aesthetic"), Some(0.5));
        assert_eq!(weights.get("technical"), Some(0.15));
        assert_eq!(weights.len(), 6);
    }

    #[rstest]
    fn rejects_zero_total() {
        let err = WeightMap::new([(Axis::AESTHETIC, 0.0)]).expect_err("zero total");
        assert_eq!(err, WeightError::ZeroTotal);
    }

    #[rstest]
    fn rejects_empty_map() {
        let err = WeightMap::new(Vec::<(Axis, f64)>::new()).expect_err("empty map");
        assert_eq!(err, WeightError::ZeroTotal);
    }

    #[rstest]
    #[case(-0.1)]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    fn rejects_invalid_weight(#[case] weight: f64) {
        assert!(WeightMap::with_overrides([(Axis::NOVELTY, weight)]).is_err());
    }

    #[cfg(feature = "serde")]
    #[rstest]
    fn deserialisation_validates() {
        let parsed: Result<WeightMap, _> = serde_json::from_str(r#"{"aesthetic": -1.0}"#);
        assert!(parsed.is_err());
        let ok: WeightMap =
            serde_json::from_str(r#"{"aesthetic": 0.6, "favorite": 0.4}"#).expect("valid map");
        assert_eq!(ok.get("favorite"), Some(0.4));
    }
}
