//! Distance from trending content in embedding space.

use std::sync::Arc;

use async_trait::async_trait;
use photorank_core::{
    Axis, AxisScore, ScoreFragment, Scorer, ScorerError, ScoringInput, normalise,
};

use crate::backend::{ImageEmbedder, TrendEmbeddings};
use crate::blocking::{PixelJob, on_blocking_pool};

/// Scores the `novelty` axis as `1 - normalise(max cosine, -1, 1)` against
/// the configured trend embeddings.
///
/// With no trend embeddings every image is fully novel and the embedder is
/// never called. Zero-norm and mismatched-length vectors are skipped.
#[derive(Clone)]
pub struct NoveltyScorer {
    embedder: Arc<dyn ImageEmbedder>,
    trends: TrendEmbeddings,
}

impl std::fmt::Debug for NoveltyScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoveltyScorer")
            .field("embedder", &self.embedder.name())
            .field("trends", &self.trends.len())
            .finish()
    }
}

impl NoveltyScorer {
    /// Compare embeddings from `embedder` against `trends`.
    #[must_use]
    pub fn new(embedder: Arc<dyn ImageEmbedder>, trends: TrendEmbeddings) -> Self {
        Self { embedder, trends }
    }
}

/// Cosine similarity, or `None` when either vector has zero norm or the
/// lengths differ.
#[expect(clippy::float_arithmetic, reason = "cosine similarity")]
#[must_use]
pub fn cosine_similarity(left: &[f32], right: &[f32]) -> Option<f64> {
    if left.len() != right.len() {
        return None;
    }
    let (dot, left_sq, right_sq) = left.iter().zip(right).fold(
        (0.0_f64, 0.0_f64, 0.0_f64),
        |(dot, left_sq, right_sq), (&l, &r)| {
            let (l, r) = (f64::from(l), f64::from(r));
            (dot + l * r, left_sq + l * l, right_sq + r * r)
        },
    );
    let norm = left_sq.sqrt() * right_sq.sqrt();
    if norm <= 0.0 || !norm.is_finite() {
        return None;
    }
    Some((dot / norm).clamp(-1.0, 1.0))
}

/// Novelty of `embedding` relative to `trends`.
#[expect(clippy::float_arithmetic, reason = "novelty is one minus similarity")]
#[must_use]
pub fn novelty(embedding: &[f32], trends: &TrendEmbeddings) -> f64 {
    trends
        .iter()
        .filter_map(|trend| cosine_similarity(embedding, trend))
        .reduce(f64::max)
        .map_or(1.0, |similarity| 1.0 - normalise(similarity, -1.0, 1.0))
}

#[async_trait]
impl Scorer for NoveltyScorer {
    fn name(&self) -> &str {
        "novelty"
    }

    fn axes(&self) -> Vec<Axis> {
        vec![Axis::NOVELTY]
    }

    async fn score(&self, input: &ScoringInput<'_>) -> Result<ScoreFragment, ScorerError> {
        if self.trends.is_empty() {
            return Ok(ScoreFragment::single(Axis::NOVELTY, AxisScore::unit(1.0)));
        }
        let job = PixelJob::from_input(input)?;
        let embedder = Arc::clone(&self.embedder);
        let embedding = on_blocking_pool(self.embedder.name(), move || {
            let image = job.decoded()?.to_rgb8();
            embedder.embed(&image).map_err(|err| ScorerError::Model {
                backend: embedder.name().to_owned(),
                message: err.message().to_owned(),
            })
        })
        .await?;
        Ok(ScoreFragment::single(
            Axis::NOVELTY,
            AxisScore::unit(novelty(&embedding, &self.trends)),
        ))
    }
}
