//! Aesthetic quality from a rating-distribution model.

use std::sync::Arc;

use async_trait::async_trait;
use image::imageops::FilterType;
use photorank_core::{
    Axis, AxisScore, ScoreFragment, Scorer, ScorerError, ScoringInput, normalise,
};

use crate::backend::AestheticModel;
use crate::blocking::{PixelJob, on_blocking_pool};

/// Side length of the square model input.
pub const MODEL_INPUT_SIZE: u32 = 224;
/// Number of rating buckets the model predicts.
pub const RATING_BUCKETS: usize = 10;

/// Scores the `aesthetic` axis from the expected rating of an
/// [`AestheticModel`] distribution.
#[derive(Clone)]
pub struct AestheticScorer {
    model: Arc<dyn AestheticModel>,
}

impl std::fmt::Debug for AestheticScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AestheticScorer")
            .field("model", &self.model.name())
            .finish()
    }
}

impl AestheticScorer {
    /// Wrap a model backend.
    #[must_use]
    pub fn new(model: Arc<dyn AestheticModel>) -> Self {
        Self { model }
    }
}

/// Expected rating of a distribution over `1..=10`, normalised to `[0, 1]`.
///
/// Returns `None` for distributions of the wrong length or with non-finite
/// entries.
///
/// # Examples
///
/// ```rust
/// use photorank_scorer::expected_rating;
///
/// let mut certain_ten = vec![0.0; 10];
/// certain_ten[9] = 1.0;
/// assert_eq!(expected_rating(&certain_ten), Some(1.0));
/// assert_eq!(expected_rating(&[0.5, 0.5]), None);
/// ```
#[expect(clippy::float_arithmetic, reason = "expectation over rating buckets")]
#[must_use]
pub fn expected_rating(distribution: &[f64]) -> Option<f64> {
    if distribution.len() != RATING_BUCKETS || distribution.iter().any(|p| !p.is_finite()) {
        return None;
    }
    let mean = distribution
        .iter()
        .zip(1_u32..)
        .map(|(probability, rating)| probability * f64::from(rating))
        .sum::<f64>();
    Some(normalise(mean, 1.0, 10.0))
}

#[async_trait]
impl Scorer for AestheticScorer {
    fn name(&self) -> &str {
        "aesthetic"
    }

    fn axes(&self) -> Vec<Axis> {
        vec![Axis::AESTHETIC]
    }

    async fn score(&self, input: &ScoringInput<'_>) -> Result<ScoreFragment, ScorerError> {
        let job = PixelJob::from_input(input)?;
        let model = Arc::clone(&self.model);
        let score = on_blocking_pool(self.model.name(), move || {
            let resized = job
                .decoded()?
                .resize_exact(MODEL_INPUT_SIZE, MODEL_INPUT_SIZE, FilterType::CatmullRom)
                .to_rgb8();
            let distribution = model.predict(&resized).map_err(|err| ScorerError::Model {
                backend: model.name().to_owned(),
                message: err.message().to_owned(),
            })?;
            expected_rating(&distribution).ok_or_else(|| ScorerError::Model {
                backend: model.name().to_owned(),
                message: format!(
                    "expected {RATING_BUCKETS} finite probabilities, got {} values",
                    distribution.len()
                ),
            })
        })
        .await?;
        Ok(ScoreFragment::single(Axis::AESTHETIC, AxisScore::unit(score)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::ModelError;
    use image::RgbImage;
    use photorank_core::{ImageData, ImageRef, ScoreableItem};
    use rstest::rstest;
    use std::io::Cursor;
    use std::sync::Mutex;

    struct RecordingModel {
        output: Result<Vec<f64>, ModelError>,
        seen: Mutex<Option<(u32, u32)>>,
    }

    impl AestheticModel for RecordingModel {
        fn name(&self) -> &str {
            "recording"
        }

        fn predict(&self, image: &RgbImage) -> Result<Vec<f64>, ModelError> {
            if let Ok(mut seen) = self.seen.lock() {
                *seen = Some(image.dimensions());
            }
            self.output.clone()
        }
    }

    fn png_bytes() -> Vec<u8> {
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgb8(RgbImage::from_pixel(32, 16, image::Rgb([10, 20, 30])))
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .expect("encode png");
        bytes
    }

    fn run(model: Arc<RecordingModel>) -> Result<ScoreFragment, ScorerError> {
        let item = ScoreableItem::new("a", ImageRef::None).expect("item");
        let image = ImageData::new(png_bytes(), Some("image/png".to_owned()));
        let scorer = AestheticScorer::new(model);
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .expect("runtime");
        runtime.block_on(scorer.score(&ScoringInput::new(&item, Some(&image))))
    }

    #[rstest]
    #[case(vec![1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0], 0.0)]
    #[case(vec![0.1; 10], 0.5)]
    fn expected_rating_normalises_mean(#[case] distribution: Vec<f64>, #[case] expected: f64) {
        let score = expected_rating(&distribution).expect("valid distribution");
        assert!((score - expected).abs() < 1e-9, "got {score}");
    }

    #[rstest]
    fn expected_rating_rejects_non_finite() {
        let mut distribution = vec![0.1; 10];
        distribution[3] = f64::NAN;
        assert_eq!(expected_rating(&distribution), None);
    }

    #[rstest]
    fn model_sees_resized_rgb_input() {
        let model = Arc::new(RecordingModel {
            output: Ok(vec![0.1; 10]),
            seen: Mutex::new(None),
        });
        let fragment = run(Arc::clone(&model)).expect("score");
        assert_eq!(
            *model.seen.lock().expect("lock"),
            Some((MODEL_INPUT_SIZE, MODEL_INPUT_SIZE))
        );
        let (axis, score) = fragment.axes().first().expect("one axis");
        assert_eq!(axis, &Axis::AESTHETIC);
        assert!((score.value() - 0.5).abs() < 1e-9);
    }

    #[rstest]
    fn wrong_length_distribution_is_model_error() {
        let model = Arc::new(RecordingModel {
            output: Ok(vec![0.5, 0.5]),
            seen: Mutex::new(None),
        });
        assert!(matches!(run(model), Err(ScorerError::Model { .. })));
    }

    #[rstest]
    fn backend_failure_is_model_error() {
        let model = Arc::new(RecordingModel {
            output: Err(ModelError::new("out of memory")),
            seen: Mutex::new(None),
        });
        let Err(ScorerError::Model { backend, message }) = run(model) else {
            panic!("expected model error");
        };
        assert_eq!(backend, "recording");
        assert_eq!(message, "out of memory");
    }
}
