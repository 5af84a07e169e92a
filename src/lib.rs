//! Facade crate for the Photorank photo ranking engine.
//!
//! This crate re-exports the core domain types and the ranking engine, and
//! exposes the heuristic and LLM scorer families behind feature flags.
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use photorank::{FavoriteScorer, ItemMetadata, ImageRef, RankingEngine, ScoreableItem};
//!
//! let engine = RankingEngine::builder()
//!     .with_scorer(Arc::new(FavoriteScorer))
//!     .build()?;
//! let favourite = ScoreableItem::new("beach", ImageRef::None)?.with_metadata(ItemMetadata {
//!     is_favorite: true,
//!     ..ItemMetadata::default()
//! });
//! let other = ScoreableItem::new("bus-stop", ImageRef::None)?;
//!
//! let runtime = tokio::runtime::Builder::new_current_thread().build()?;
//! let run = runtime.block_on(engine.rank(vec![other, favourite]));
//! assert_eq!(run.ranked_ids().collect::<Vec<_>>(), ["beach", "bus-stop"]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![forbid(unsafe_code)]

pub use photorank_core::{
    Axis, AxisRange, AxisScore, CombineMode, ImageData, ImageRef, ItemError, ItemMetadata,
    RankedItem, ScoreAggregator, ScoreFragment, ScoreSet, ScoreableItem, Scorer, ScorerError,
    ScoringInput, WeightError, WeightMap, aggregate, normalise,
};

#[cfg(feature = "serde")]
pub use photorank_core::RankedRecord;

pub use photorank_engine::{
    EngineConfigError, HttpImageLoader, HttpImageLoaderConfig, ImageLoadError, ImageLoader,
    OmissionReason, OmittedItem, RankingConfig, RankingEngine, RankingEngineBuilder, RankingRun,
    StaticImageLoader,
};

#[cfg(feature = "heuristic")]
pub use photorank_scorer::{
    AestheticScorer, FavoriteScorer, ModelBackends, NoveltyScorer, RecencyScorer, ScorerFactory,
    SentimentScorer, TechnicalScorer,
};

#[cfg(feature = "llm")]
pub use photorank_llm::{LlmConfigError, LlmScorer, LlmScorerConfig, RetryPolicy};

/// Deterministic scorers and fixtures for downstream tests.
#[cfg(feature = "test-support")]
pub mod test_support {
    pub use photorank_core::test_support::*;
    #[cfg(feature = "llm")]
    pub use photorank_llm::test_support::StubChatTransport;
}
