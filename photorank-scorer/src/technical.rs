//! Sharpness and exposure heuristics computed from raw pixels.

use async_trait::async_trait;
use image::DynamicImage;
use photorank_core::{
    Axis, AxisScore, ScoreFragment, Scorer, ScorerError, ScoringInput, normalise,
};

use crate::blocking::{PixelJob, on_blocking_pool};

/// Laplacian variance treated as perfectly sharp.
pub const SHARPNESS_CEILING: f64 = 1000.0;
/// Mean luma treated as fully bright.
pub const BRIGHTNESS_CEILING: f64 = 255.0;

/// Scores the `technical` axis from focus and brightness.
///
/// Sharpness is the variance of the 4-neighbour Laplacian over interior
/// pixels of the luma plane; brightness is the mean luma. Both are
/// normalised and averaged with equal weight.
#[derive(Debug, Clone, Copy, Default)]
pub struct TechnicalScorer;

/// Raw measurements behind a technical score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TechnicalMeasurements {
    /// Variance of the Laplacian response.
    pub laplacian_variance: f64,
    /// Mean ITU-R 601 luma in `[0, 255]`.
    pub mean_luma: f64,
}

impl TechnicalMeasurements {
    /// Measure an image.
    #[must_use]
    pub fn of(image: &DynamicImage) -> Self {
        let plane = LumaPlane::from_image(image);
        Self {
            laplacian_variance: plane.laplacian_variance(),
            mean_luma: plane.mean(),
        }
    }

    /// Combined unit-range score.
    #[expect(clippy::float_arithmetic, reason = "score is an unweighted mean")]
    #[must_use]
    pub fn score(&self) -> f64 {
        let sharpness = normalise(self.laplacian_variance, 0.0, SHARPNESS_CEILING);
        let brightness = normalise(self.mean_luma, 0.0, BRIGHTNESS_CEILING);
        (sharpness + brightness) / 2.0
    }
}

struct LumaPlane {
    width: usize,
    height: usize,
    values: Vec<f64>,
}

impl LumaPlane {
    #[expect(clippy::float_arithmetic, reason = "luma is a weighted channel sum")]
    fn from_image(image: &DynamicImage) -> Self {
        let rgb = image.to_rgb8();
        let values = rgb
            .pixels()
            .map(|pixel| {
                let [r, g, b] = pixel.0;
                0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b)
            })
            .collect();
        Self {
            width: usize::try_from(rgb.width()).unwrap_or(0),
            height: usize::try_from(rgb.height()).unwrap_or(0),
            values,
        }
    }

    fn at(&self, x: usize, y: usize) -> f64 {
        self.values
            .get(y * self.width + x)
            .copied()
            .unwrap_or(0.0)
    }

    #[expect(
        clippy::float_arithmetic,
        clippy::cast_precision_loss,
        reason = "mean over pixel count"
    )]
    fn mean(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        self.values.iter().sum::<f64>() / self.values.len() as f64
    }

    #[expect(
        clippy::float_arithmetic,
        clippy::cast_precision_loss,
        reason = "variance of the Laplacian response"
    )]
    fn laplacian_variance(&self) -> f64 {
        if self.width < 3 || self.height < 3 {
            return 0.0;
        }
        let mut sum = 0.0_f64;
        let mut sum_sq = 0.0_f64;
        let mut count = 0_usize;
        for y in 1..self.height - 1 {
            for x in 1..self.width - 1 {
                let response = self.at(x, y - 1)
                    + self.at(x, y + 1)
                    + self.at(x - 1, y)
                    + self.at(x + 1, y)
                    - 4.0 * self.at(x, y);
                sum += response;
                sum_sq += response * response;
                count += 1;
            }
        }
        let n = count as f64;
        let mean = sum / n;
        (sum_sq / n - mean * mean).max(0.0)
    }
}

#[async_trait]
impl Scorer for TechnicalScorer {
    fn name(&self) -> &str {
        "technical"
    }

    fn axes(&self) -> Vec<Axis> {
        vec![Axis::TECHNICAL]
    }

    async fn score(&self, input: &ScoringInput<'_>) -> Result<ScoreFragment, ScorerError> {
        let job = PixelJob::from_input(input)?;
        let measurements =
            on_blocking_pool(self.name(), move || Ok(TechnicalMeasurements::of(job.decoded()?)))
                .await?;
        log::debug!(
            "technical measurements for {}: variance={:.2} luma={:.2}",
            input.item().id(),
            measurements.laplacian_variance,
            measurements.mean_luma
        );
        Ok(ScoreFragment::single(
            Axis::TECHNICAL,
            AxisScore::unit(measurements.score()),
        ))
    }
}
