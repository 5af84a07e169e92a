//! Score items along one or more named axes.
//!
//! The `Scorer` trait is the seam between the ranking engine and every score
//! source: local pixel heuristics, model-backed scorers, metadata-only
//! scorers, and remote LLM calls all implement it.

use async_trait::async_trait;
use thiserror::Error;

use crate::{Axis, AxisRange, ImageData, ImageDecodeError, ScoreFragment, ScoreableItem};

/// Boxed error type carried by provider and model failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Infrastructure failures a scorer may report for one item.
///
/// "Not applicable" content is never an error; scorers return a valid zero
/// for it instead.
#[derive(Debug, Error)]
pub enum ScorerError {
    /// The scorer needs pixels but none were loaded for the item.
    #[error("no image data available for item {item_id}")]
    ImageUnavailable {
        /// Identifier of the affected item.
        item_id: String,
    },
    /// The image bytes could not be decoded.
    #[error("could not decode image for item {item_id}")]
    Decode {
        /// Identifier of the affected item.
        item_id: String,
        /// Decoder failure.
        #[source]
        source: ImageDecodeError,
    },
    /// A local model backend failed or returned unusable output.
    #[error("model backend `{backend}` failed: {message}")]
    Model {
        /// Backend name.
        backend: String,
        /// Failure description.
        message: String,
    },
    /// A remote provider could not be reached or rejected the request.
    #[error("score provider request failed")]
    Provider {
        /// Transport failure.
        #[source]
        source: BoxError,
    },
    /// A remote provider answered with content that could not be parsed.
    #[error("score provider returned a malformed response")]
    MalformedResponse {
        /// Parse failure.
        #[source]
        source: BoxError,
    },
}

/// Everything a scorer may inspect for one item.
#[derive(Debug, Clone, Copy)]
pub struct ScoringInput<'a> {
    item: &'a ScoreableItem,
    image: Option<&'a ImageData>,
}

impl<'a> ScoringInput<'a> {
    /// Bundle an item with its loaded image, if any.
    #[must_use]
    pub const fn new(item: &'a ScoreableItem, image: Option<&'a ImageData>) -> Self {
        Self { item, image }
    }

    /// The item being scored.
    #[must_use]
    pub const fn item(&self) -> &'a ScoreableItem {
        self.item
    }

    /// Loaded image data, when available.
    #[must_use]
    pub const fn image(&self) -> Option<&'a ImageData> {
        self.image
    }

    /// Loaded image data or [`ScorerError::ImageUnavailable`].
    ///
    /// # Errors
    /// Returns [`ScorerError::ImageUnavailable`] when no bytes were loaded.
    pub fn require_image(&self) -> Result<&'a ImageData, ScorerError> {
        self.image
            .filter(|image| !image.is_empty())
            .ok_or_else(|| ScorerError::ImageUnavailable {
                item_id: self.item.id().to_owned(),
            })
    }

    /// Decoded pixels, or the reason they are unavailable.
    ///
    /// # Errors
    /// Returns [`ScorerError::ImageUnavailable`] or [`ScorerError::Decode`].
    pub fn decoded(&self) -> Result<&'a image::DynamicImage, ScorerError> {
        self.require_image()?
            .decode()
            .map_err(|source| ScorerError::Decode {
                item_id: self.item.id().to_owned(),
                source,
            })
    }
}

/// Compute one or more axis scores for an item.
///
/// Implementations must be thread-safe (`Send` + `Sync`) so the engine can
/// score items concurrently. A scorer fails only for infrastructure
/// problems; the engine records every axis it declares as failed for that
/// item and carries on with the remaining scorers.
///
/// # Examples
///
/// ```rust
/// use async_trait::async_trait;
/// use photorank_core::{
///     Axis, AxisScore, ScoreFragment, Scorer, ScorerError, ScoringInput,
/// };
///
/// struct ConstantScorer;
///
/// #[async_trait]
/// impl Scorer for ConstantScorer {
///     fn name(&self) -> &str {
///         "constant"
///     }
///
///     fn axes(&self) -> Vec<Axis> {
///         vec![Axis::AESTHETIC]
///     }
///
///     fn needs_image(&self) -> bool {
///         false
///     }
///
///     async fn score(&self, _input: &ScoringInput<'_>) -> Result<ScoreFragment, ScorerError> {
///         Ok(ScoreFragment::single(Axis::AESTHETIC, AxisScore::unit(0.5)))
///     }
/// }
///
/// assert_eq!(ConstantScorer.axes(), vec![Axis::AESTHETIC]);
/// ```
#[async_trait]
pub trait Scorer: Send + Sync {
    /// Human-readable scorer name used in logs.
    fn name(&self) -> &str;

    /// Axes this scorer may emit.
    fn axes(&self) -> Vec<Axis>;

    /// Range the scorer reports its axes in.
    fn range(&self) -> AxisRange {
        AxisRange::UNIT
    }

    /// Whether the scorer needs image bytes. Metadata-only scorers return
    /// `false` and still run for items without an image.
    fn needs_image(&self) -> bool {
        true
    }

    /// Score one item.
    async fn score(&self, input: &ScoringInput<'_>) -> Result<ScoreFragment, ScorerError>;
}
