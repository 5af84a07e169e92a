//! Local scorers for the Photorank ranking engine.
//!
//! The crate provides three families of [`Scorer`](photorank_core::Scorer)
//! implementations:
//! - **Pixel heuristics**: [`TechnicalScorer`] measures focus and exposure
//!   directly from the decoded image.
//! - **Model-backed scorers**: [`AestheticScorer`], [`SentimentScorer`] and
//!   [`NoveltyScorer`] delegate inference to host-provided backends
//!   ([`AestheticModel`], [`EmotionDetector`], [`ImageEmbedder`]).
//! - **Metadata scorers**: [`RecencyScorer`] and [`FavoriteScorer`] read only
//!   item metadata and never need image bytes.
//!
//! Pixel decoding and backend inference run on tokio's blocking pool, so
//! the scorers must be awaited inside a tokio runtime.
//!
//! [`ScorerFactory`] assembles the full suite, substituting an
//! [`UnavailableScorer`] for any backend the host did not install.
//!
//! # Examples
//!
//! ```rust
//! use photorank_scorer::{FavoriteScorer, Scorer};
//!
//! assert!(!FavoriteScorer.needs_image());
//! ```

#![forbid(unsafe_code)]

mod aesthetic;
mod backend;
mod blocking;
mod factory;
mod favorite;
mod novelty;
mod recency;
mod sentiment;
mod technical;

pub use aesthetic::{AestheticScorer, MODEL_INPUT_SIZE, RATING_BUCKETS, expected_rating};
pub use backend::{
    AestheticModel, EmotionDetector, FaceEmotions, ImageEmbedder, ModelBackends, ModelError,
    TrendEmbeddings,
};
pub use factory::{ScorerFactory, UnavailableScorer};
pub use favorite::FavoriteScorer;
pub use novelty::{NoveltyScorer, cosine_similarity, novelty};
pub use photorank_core::Scorer;
pub use recency::{Clock, DEFAULT_WINDOW_DAYS, FixedClock, RecencyScorer, SystemClock};
pub use sentiment::SentimentScorer;
pub use technical::{
    BRIGHTNESS_CEILING, SHARPNESS_CEILING, TechnicalMeasurements, TechnicalScorer,
};
