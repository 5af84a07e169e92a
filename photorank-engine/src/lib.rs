//! Ranking orchestration for Photorank.
//!
//! [`RankingEngine`] loads each item's image through an [`ImageLoader`],
//! runs the configured scorers, combines their output with a
//! [`photorank_core::ScoreAggregator`] and returns a [`RankingRun`] holding
//! the ordered items and any that were left out.
//!
//! Each item is scored on its own task, with the number in flight capped
//! and the run optionally bounded by a deadline, both set through
//! [`RankingConfig`].

#![forbid(unsafe_code)]

mod config;
mod engine;
mod loader;
mod outcome;

pub use config::{DEFAULT_MAX_CONCURRENCY, EngineConfigError, RankingConfig};
pub use engine::{RankingEngine, RankingEngineBuilder};
pub use loader::{
    DEFAULT_USER_AGENT, HttpImageLoader, HttpImageLoaderConfig, ImageLoadError, ImageLoader,
    StaticImageLoader, best_quality_url,
};
pub use outcome::{OmissionReason, OmittedItem, RankingRun};
