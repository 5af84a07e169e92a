//! Deterministic scorers and fixtures used by unit and behaviour tests.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::{
    Axis, AxisScore, ImageRef, ItemMetadata, ScoreFragment, ScoreableItem, Scorer, ScorerError,
    ScoringInput,
};

/// Scorer returning preset unit-range values per item.
///
/// Items without an explicit value receive the default. Items listed as
/// failing return [`ScorerError::Model`].
#[derive(Debug)]
pub struct FixedScorer {
    axis: Axis,
    default: f64,
    values: BTreeMap<String, f64>,
    failing: BTreeSet<String>,
    needs_image: bool,
    calls: AtomicUsize,
}

impl FixedScorer {
    /// Create a scorer emitting `default` on `axis` for every item.
    #[must_use]
    pub fn new(axis: Axis, default: f64) -> Self {
        Self {
            axis,
            default,
            values: BTreeMap::new(),
            failing: BTreeSet::new(),
            needs_image: false,
            calls: AtomicUsize::new(0),
        }
    }

    /// Override the value for one item.
    #[must_use]
    pub fn with_value(mut self, item_id: &str, value: f64) -> Self {
        self.values.insert(item_id.to_owned(), value);
        self
    }

    /// Fail for one item.
    #[must_use]
    pub fn failing_for(mut self, item_id: &str) -> Self {
        self.failing.insert(item_id.to_owned());
        self
    }

    /// Require image data, like a pixel-based scorer.
    #[must_use]
    pub const fn requiring_image(mut self) -> Self {
        self.needs_image = true;
        self
    }

    /// Number of times [`Scorer::score`] ran.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Scorer for FixedScorer {
    fn name(&self) -> &str {
        "fixed"
    }

    fn axes(&self) -> Vec<Axis> {
        vec![self.axis.clone()]
    }

    fn needs_image(&self) -> bool {
        self.needs_image
    }

    async fn score(&self, input: &ScoringInput<'_>) -> Result<ScoreFragment, ScorerError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        let id = input.item().id();
        if self.failing.contains(id) {
            return Err(ScorerError::Model {
                backend: "fixed".to_owned(),
                message: format!("configured to fail for {id}"),
            });
        }
        let value = self.values.get(id).copied().unwrap_or(self.default);
        Ok(ScoreFragment::single(
            self.axis.clone(),
            AxisScore::unit(value),
        ))
    }
}

/// Build an item carrying inline bytes and the given favourite flag.
///
/// # Panics
/// Panics when `id` is blank.
#[expect(clippy::expect_used, reason = "test fixtures should fail fast")]
#[must_use]
pub fn item_with_bytes(id: &str, is_favorite: bool) -> ScoreableItem {
    ScoreableItem::new(id, ImageRef::Bytes(vec![0xFF, 0xD8, 0xFF]))
        .expect("fixture ids are non-empty")
        .with_metadata(ItemMetadata {
            is_favorite,
            ..ItemMetadata::default()
        })
}

/// Build an item with no image reference.
///
/// # Panics
/// Panics when `id` is blank.
#[expect(clippy::expect_used, reason = "test fixtures should fail fast")]
#[must_use]
pub fn item_without_image(id: &str, is_favorite: bool) -> ScoreableItem {
    ScoreableItem::new(id, ImageRef::None)
        .expect("fixture ids are non-empty")
        .with_metadata(ItemMetadata {
            is_favorite,
            ..ItemMetadata::default()
        })
}
