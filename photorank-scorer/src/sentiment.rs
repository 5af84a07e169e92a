//! Emotional intensity of the primary face.

use std::sync::Arc;

use async_trait::async_trait;
use photorank_core::{Axis, AxisScore, ScoreFragment, Scorer, ScorerError, ScoringInput};

use crate::backend::EmotionDetector;
use crate::blocking::{PixelJob, on_blocking_pool};

/// Scores the `sentiment` axis as the strongest emotion confidence of the
/// first detected face.
///
/// Images without faces are not an error; they score a valid `0.0`.
#[derive(Clone)]
pub struct SentimentScorer {
    detector: Arc<dyn EmotionDetector>,
}

impl std::fmt::Debug for SentimentScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SentimentScorer")
            .field("detector", &self.detector.name())
            .finish()
    }
}

impl SentimentScorer {
    /// Wrap a detector backend.
    #[must_use]
    pub fn new(detector: Arc<dyn EmotionDetector>) -> Self {
        Self { detector }
    }
}

#[async_trait]
impl Scorer for SentimentScorer {
    fn name(&self) -> &str {
        "sentiment"
    }

    fn axes(&self) -> Vec<Axis> {
        vec![Axis::SENTIMENT]
    }

    async fn score(&self, input: &ScoringInput<'_>) -> Result<ScoreFragment, ScorerError> {
        let job = PixelJob::from_input(input)?;
        let detector = Arc::clone(&self.detector);
        let faces = on_blocking_pool(self.detector.name(), move || {
            let image = job.decoded()?.to_rgb8();
            detector.detect(&image).map_err(|err| ScorerError::Model {
                backend: detector.name().to_owned(),
                message: err.message().to_owned(),
            })
        })
        .await?;
        let value = faces
            .first()
            .and_then(crate::backend::FaceEmotions::strongest)
            .unwrap_or(0.0);
        Ok(ScoreFragment::single(Axis::SENTIMENT, AxisScore::unit(value)))
    }
}
