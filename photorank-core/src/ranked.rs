//! Ranked output handed to persistence and API layers.

use std::sync::Arc;

#[cfg(feature = "serde")]
use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::{ScoreSet, ScoreableItem};

/// An item annotated with its scores, combined score and 1-based rank.
///
/// Ranked items are created fresh for every run and never updated in place.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedItem {
    item: Arc<ScoreableItem>,
    scores: ScoreSet,
    combined_score: f64,
    rank: usize,
}

impl RankedItem {
    /// Assemble a ranked item.
    #[must_use]
    pub const fn new(
        item: Arc<ScoreableItem>,
        scores: ScoreSet,
        combined_score: f64,
        rank: usize,
    ) -> Self {
        Self {
            item,
            scores,
            combined_score,
            rank,
        }
    }

    /// The ranked item.
    #[must_use]
    pub fn item(&self) -> &ScoreableItem {
        &self.item
    }

    /// Identifier of the ranked item.
    #[must_use]
    pub fn item_id(&self) -> &str {
        self.item.id()
    }

    /// Per-axis scores, including failed axes.
    #[must_use]
    pub const fn scores(&self) -> &ScoreSet {
        &self.scores
    }

    /// Combined score used for ordering.
    #[must_use]
    pub const fn combined_score(&self) -> f64 {
        self.combined_score
    }

    /// 1-based position after sorting.
    #[must_use]
    pub const fn rank(&self) -> usize {
        self.rank
    }

    /// Flatten into a plain serialisable record.
    #[cfg(feature = "serde")]
    #[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
    #[must_use]
    pub fn to_record(&self) -> RankedRecord {
        RankedRecord {
            item_id: self.item.id().to_owned(),
            axis_scores: self
                .scores
                .valid_axes()
                .map(|(axis, score)| (axis.as_str().to_owned(), score.value()))
                .collect(),
            combined_score: self.combined_score,
            rank: self.rank,
            failed_axes: self
                .scores
                .failed_axes()
                .map(|axis| axis.as_str().to_owned())
                .collect(),
            provider_overall: self.scores.overall(),
        }
    }
}

/// Plain mapping of a [`RankedItem`] for storage layers.
#[cfg(feature = "serde")]
#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedRecord {
    /// Item identifier.
    pub item_id: String,
    /// Valid axis values keyed by axis name.
    pub axis_scores: BTreeMap<String, f64>,
    /// Combined score used for ordering.
    pub combined_score: f64,
    /// 1-based rank.
    pub rank: usize,
    /// Axes whose scorer failed for this item.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failed_axes: Vec<String>,
    /// Overall value reported by the score provider, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_overall: Option<f64>,
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;
    use crate::{Axis, AxisRange, AxisScore, ImageRef, ScoreFragment};
    use rstest::rstest;

    #[rstest]
    fn record_serialises_to_plain_mapping() {
        let item = ScoreableItem::new("p1", ImageRef::None).expect("valid item");
        let scores = ScoreSet::builder()
            .merge(ScoreFragment::single(Axis::FAVORITE, AxisScore::unit(1.0)))
            .mark_failed(Axis::AESTHETIC, AxisRange::UNIT)
            .build();
        let ranked = RankedItem::new(Arc::new(item), scores, 0.75, 1);

        let value = serde_json::to_value(ranked.to_record()).expect("serialise record");

        assert_eq!(
            value,
            serde_json::json!({
                "item_id": "p1",
                "axis_scores": { "favorite": 1.0 },
                "combined_score": 0.75,
                "rank": 1,
                "failed_axes": ["aesthetic"],
            })
        );
    }
}
