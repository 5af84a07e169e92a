//! Results of one ranking run.

use std::fmt;
use std::sync::Arc;

use photorank_core::{RankedItem, RankedRecord, ScoreableItem};
use serde::Serialize;

/// Why an item is missing from the ranked output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OmissionReason {
    /// No usable image data while some registered scorer needs pixels.
    NoImage,
    /// No scorer produced a usable value for the item.
    AllScorersFailed,
    /// Scoring had not finished when the run deadline passed.
    TimedOut,
}

impl OmissionReason {
    /// Stable snake_case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoImage => "no_image",
            Self::AllScorersFailed => "all_scorers_failed",
            Self::TimedOut => "timed_out",
        }
    }
}

impl fmt::Display for OmissionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An input item left out of the ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct OmittedItem {
    item: Arc<ScoreableItem>,
    reason: OmissionReason,
}

impl OmittedItem {
    /// Record `item` as omitted for `reason`.
    #[must_use]
    pub const fn new(item: Arc<ScoreableItem>, reason: OmissionReason) -> Self {
        Self { item, reason }
    }

    /// The omitted item.
    #[must_use]
    pub fn item(&self) -> &ScoreableItem {
        &self.item
    }

    /// Identifier of the omitted item.
    #[must_use]
    pub fn item_id(&self) -> &str {
        self.item.id()
    }

    /// Why the item was omitted.
    #[must_use]
    pub const fn reason(&self) -> OmissionReason {
        self.reason
    }
}

/// Ranked items in descending combined score plus the items left out.
///
/// Omitted items keep their input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankingRun {
    ranked: Vec<RankedItem>,
    omitted: Vec<OmittedItem>,
}

impl RankingRun {
    pub(crate) const fn new(ranked: Vec<RankedItem>, omitted: Vec<OmittedItem>) -> Self {
        Self { ranked, omitted }
    }

    /// Ranked items, best first.
    #[must_use]
    pub fn ranked(&self) -> &[RankedItem] {
        &self.ranked
    }

    /// Items left out of the ranking.
    #[must_use]
    pub fn omitted(&self) -> &[OmittedItem] {
        &self.omitted
    }

    /// Consume the run, keeping only the ranked items.
    #[must_use]
    pub fn into_ranked(self) -> Vec<RankedItem> {
        self.ranked
    }

    /// Serialisable records for every ranked item, best first.
    #[must_use]
    pub fn to_records(&self) -> Vec<RankedRecord> {
        self.ranked.iter().map(RankedItem::to_record).collect()
    }

    /// Identifiers of ranked items, best first.
    pub fn ranked_ids(&self) -> impl Iterator<Item = &str> {
        self.ranked.iter().map(RankedItem::item_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use photorank_core::{ImageRef, ScoreSet};
    use rstest::rstest;

    #[rstest]
    #[case(OmissionReason::NoImage, "no_image")]
    #[case(OmissionReason::AllScorersFailed, "all_scorers_failed")]
    #[case(OmissionReason::TimedOut, "timed_out")]
    fn reasons_serialise_in_snake_case(#[case] reason: OmissionReason, #[case] name: &str) {
        assert_eq!(reason.to_string(), name);
        assert_eq!(
            serde_json::to_value(reason).expect("serialise reason"),
            serde_json::Value::String(name.to_owned())
        );
    }

    #[rstest]
    fn records_follow_ranked_order() {
        let item = |id: &str| Arc::new(ScoreableItem::new(id, ImageRef::None).expect("valid item"));
        let run = RankingRun::new(
            vec![
                RankedItem::new(item("b"), ScoreSet::default(), 0.9, 1),
                RankedItem::new(item("a"), ScoreSet::default(), 0.1, 2),
            ],
            vec![OmittedItem::new(item("c"), OmissionReason::NoImage)],
        );
        let ids: Vec<_> = run.to_records().into_iter().map(|record| record.item_id).collect();
        assert_eq!(ids, ["b", "a"]);
        assert_eq!(run.omitted().first().map(OmittedItem::item_id), Some("c"));
        assert_eq!(run.into_ranked().len(), 2);
    }
}
