//! Assemble the heuristic scorer suite from whatever backends are present.
//!
//! Backend availability is decided once, when the factory builds the suite.
//! A missing backend yields an [`UnavailableScorer`] so the axis still
//! appears in every score set with a neutral value.

use std::sync::Arc;

use async_trait::async_trait;
use photorank_core::{Axis, AxisScore, ScoreFragment, Scorer, ScorerError, ScoringInput};

use crate::{
    AestheticScorer, Clock, FavoriteScorer, ModelBackends, NoveltyScorer, RecencyScorer,
    SentimentScorer, SystemClock, TechnicalScorer, TrendEmbeddings,
};

/// Stand-in for a scorer whose backend is not installed.
///
/// Always succeeds with a valid `0.0`.
#[derive(Debug, Clone)]
pub struct UnavailableScorer {
    axis: Axis,
    name: String,
}

impl UnavailableScorer {
    /// Stub for `axis`.
    #[must_use]
    pub fn new(axis: Axis) -> Self {
        let name = format!("{axis} (unavailable)");
        Self { axis, name }
    }
}

#[async_trait]
impl Scorer for UnavailableScorer {
    fn name(&self) -> &str {
        &self.name
    }

    fn axes(&self) -> Vec<Axis> {
        vec![self.axis.clone()]
    }

    async fn score(&self, _input: &ScoringInput<'_>) -> Result<ScoreFragment, ScorerError> {
        Ok(ScoreFragment::single(self.axis.clone(), AxisScore::unit(0.0)))
    }
}

/// Builds the six heuristic scorers.
///
/// # Examples
///
/// ```rust
/// use photorank_scorer::ScorerFactory;
///
/// let suite = ScorerFactory::default().heuristic_suite();
/// let names: Vec<_> = suite.iter().map(|scorer| scorer.name().to_owned()).collect();
/// assert_eq!(names.len(), 6);
/// assert!(names.contains(&"aesthetic (unavailable)".to_owned()));
/// ```
#[derive(Clone)]
pub struct ScorerFactory {
    backends: ModelBackends,
    trends: TrendEmbeddings,
    clock: Arc<dyn Clock>,
}

impl Default for ScorerFactory {
    fn default() -> Self {
        Self::new(ModelBackends::default())
    }
}

impl std::fmt::Debug for ScorerFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScorerFactory")
            .field("backends", &self.backends)
            .field("trends", &self.trends.len())
            .finish_non_exhaustive()
    }
}

impl ScorerFactory {
    /// Factory over the given backends, wall-clock time and no trends.
    #[must_use]
    pub fn new(backends: ModelBackends) -> Self {
        Self {
            backends,
            trends: TrendEmbeddings::default(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Use `trends` for novelty scoring.
    #[must_use]
    pub fn with_trends(mut self, trends: TrendEmbeddings) -> Self {
        self.trends = trends;
        self
    }

    /// Use `clock` as the recency reference.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Aesthetic scorer, or a stub when no model is installed.
    #[must_use]
    pub fn aesthetic(&self) -> Arc<dyn Scorer> {
        match &self.backends.aesthetic {
            Some(model) => Arc::new(AestheticScorer::new(Arc::clone(model))),
            None => unavailable(Axis::AESTHETIC),
        }
    }

    /// Sentiment scorer, or a stub when no detector is installed.
    #[must_use]
    pub fn sentiment(&self) -> Arc<dyn Scorer> {
        match &self.backends.emotion {
            Some(detector) => Arc::new(SentimentScorer::new(Arc::clone(detector))),
            None => unavailable(Axis::SENTIMENT),
        }
    }

    /// Novelty scorer, or a stub when no embedder is installed.
    #[must_use]
    pub fn novelty(&self) -> Arc<dyn Scorer> {
        match &self.backends.embedder {
            Some(embedder) => Arc::new(NoveltyScorer::new(
                Arc::clone(embedder),
                self.trends.clone(),
            )),
            None => unavailable(Axis::NOVELTY),
        }
    }

    /// Recency scorer bound to the factory clock.
    #[must_use]
    pub fn recency(&self) -> Arc<dyn Scorer> {
        Arc::new(RecencyScorer::new(Arc::clone(&self.clock)))
    }

    /// All six heuristic scorers in vocabulary order.
    #[must_use]
    pub fn heuristic_suite(&self) -> Vec<Arc<dyn Scorer>> {
        vec![
            self.aesthetic(),
            Arc::new(TechnicalScorer),
            self.sentiment(),
            self.novelty(),
            self.recency(),
            Arc::new(FavoriteScorer),
        ]
    }
}

fn unavailable(axis: Axis) -> Arc<dyn Scorer> {
    log::warn!("no backend installed for the {axis} axis; scoring it as 0.0");
    Arc::new(UnavailableScorer::new(axis))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{AestheticModel, ModelError};
    use image::RgbImage;
    use photorank_core::test_support::item_with_bytes;
    use rstest::rstest;

    struct FlatModel;

    impl AestheticModel for FlatModel {
        fn name(&self) -> &str {
            "flat"
        }

        fn predict(&self, _image: &RgbImage) -> Result<Vec<f64>, ModelError> {
            Ok(vec![0.1; 10])
        }
    }

    #[rstest]
    fn suite_covers_heuristic_vocabulary() {
        let axes: Vec<Axis> = ScorerFactory::default()
            .heuristic_suite()
            .iter()
            .flat_map(|scorer| scorer.axes())
            .collect();
        assert_eq!(axes, Axis::HEURISTIC_VOCABULARY.to_vec());
    }

    #[rstest]
    fn installed_backend_replaces_stub() {
        let factory = ScorerFactory::new(ModelBackends {
            aesthetic: Some(Arc::new(FlatModel)),
            ..ModelBackends::default()
        });
        assert_eq!(factory.aesthetic().name(), "aesthetic");
        assert_eq!(factory.sentiment().name(), "sentiment (unavailable)");
    }

    #[rstest]
    fn unavailable_scorer_emits_valid_zero() {
        let item = item_with_bytes("u", false);
        let fragment = tokio::runtime::Builder::new_current_thread()
            .build()
            .expect("runtime")
            .block_on(UnavailableScorer::new(Axis::NOVELTY).score(&ScoringInput::new(&item, None)))
            .expect("stub never fails");
        let (axis, score) = fragment.axes().first().expect("axis");
        assert_eq!(axis, &Axis::NOVELTY);
        assert!(score.is_valid());
        assert_eq!(score.value(), 0.0);
    }
}
