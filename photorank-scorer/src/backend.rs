//! Model backends consumed by the model-backed scorers.
//!
//! Inference runtimes are host concerns. The scorers in this crate only need
//! a probability distribution, per-face emotion confidences, or an
//! embedding vector, so each backend is a small synchronous trait the host
//! implements over whatever runtime it ships.

use std::collections::BTreeMap;
use std::sync::Arc;

use image::RgbImage;
use thiserror::Error;

/// Failure reported by a model backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ModelError {
    message: String,
}

impl ModelError {
    /// Wrap a backend failure description.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Failure description.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Predicts a quality distribution over the ratings `1..=10`.
pub trait AestheticModel: Send + Sync {
    /// Backend name used in logs and errors.
    fn name(&self) -> &str;

    /// Probability for each rating bucket, lowest rating first.
    ///
    /// # Errors
    /// Returns [`ModelError`] when inference fails.
    fn predict(&self, image: &RgbImage) -> Result<Vec<f64>, ModelError>;
}

/// Emotion confidences for one detected face.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FaceEmotions {
    /// Confidence in `[0, 1]` per emotion label.
    pub emotions: BTreeMap<String, f64>,
}

impl FaceEmotions {
    /// Highest confidence across all labels, if any label was reported.
    #[must_use]
    pub fn strongest(&self) -> Option<f64> {
        self.emotions
            .values()
            .copied()
            .filter(|value| value.is_finite())
            .reduce(f64::max)
    }
}

/// Detects faces and classifies their emotions.
pub trait EmotionDetector: Send + Sync {
    /// Backend name used in logs and errors.
    fn name(&self) -> &str;

    /// Faces found in the image, primary face first.
    ///
    /// # Errors
    /// Returns [`ModelError`] when detection fails.
    fn detect(&self, image: &RgbImage) -> Result<Vec<FaceEmotions>, ModelError>;
}

/// Maps an image to a fixed-length embedding vector.
pub trait ImageEmbedder: Send + Sync {
    /// Backend name used in logs and errors.
    fn name(&self) -> &str;

    /// Embedding for the image.
    ///
    /// # Errors
    /// Returns [`ModelError`] when inference fails.
    fn embed(&self, image: &RgbImage) -> Result<Vec<f32>, ModelError>;
}

/// Reference embeddings describing currently trending content.
///
/// Cheap to clone; vectors are shared.
#[derive(Debug, Clone, Default)]
pub struct TrendEmbeddings {
    vectors: Arc<[Vec<f32>]>,
}

impl TrendEmbeddings {
    /// Wrap a set of trend vectors.
    #[must_use]
    pub fn new(vectors: impl IntoIterator<Item = Vec<f32>>) -> Self {
        Self {
            vectors: vectors.into_iter().collect(),
        }
    }

    /// Whether no trend vectors are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Number of trend vectors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// Iterate over the trend vectors.
    pub fn iter(&self) -> impl Iterator<Item = &[f32]> {
        self.vectors.iter().map(Vec::as_slice)
    }
}

/// Optional model backends handed to [`crate::ScorerFactory`].
#[derive(Clone, Default)]
pub struct ModelBackends {
    /// Aesthetic quality model.
    pub aesthetic: Option<Arc<dyn AestheticModel>>,
    /// Face emotion detector.
    pub emotion: Option<Arc<dyn EmotionDetector>>,
    /// Image embedder used for novelty.
    pub embedder: Option<Arc<dyn ImageEmbedder>>,
}

impl std::fmt::Debug for ModelBackends {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelBackends")
            .field("aesthetic", &self.aesthetic.as_ref().map(|model| model.name().to_owned()))
            .field("emotion", &self.emotion.as_ref().map(|model| model.name().to_owned()))
            .field("embedder", &self.embedder.as_ref().map(|model| model.name().to_owned()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn strongest_ignores_non_finite_confidences() {
        let face = FaceEmotions {
            emotions: BTreeMap::from([
                ("happy".to_owned(), 0.4),
                ("sad".to_owned(), f64::NAN),
                ("surprise".to_owned(), 0.7),
            ]),
        };
        assert_eq!(face.strongest(), Some(0.7));
    }

    #[rstest]
    fn strongest_is_none_without_labels() {
        assert_eq!(FaceEmotions::default().strongest(), None);
    }

    #[rstest]
    fn trend_embeddings_report_length() {
        let trends = TrendEmbeddings::new([vec![1.0, 0.0], vec![0.0, 1.0]]);
        assert_eq!(trends.len(), 2);
        assert!(!trends.is_empty());
        assert!(TrendEmbeddings::default().is_empty());
    }
}
