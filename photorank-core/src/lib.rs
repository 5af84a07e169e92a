//! Core domain types for the Photorank ranking engine.
//!
//! These models describe the items being ranked, the per-axis scores that
//! scorers produce for them, and the weighting used to combine those scores
//! into a single ordering value. Constructors return `Result` to surface
//! invalid input early; once built, score sets are read-only.
//!
//! The crate also defines the [`Scorer`] capability shared by every score
//! source, whether it inspects pixels locally or asks a remote model.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod aggregate;
mod axis;
mod image_data;
mod item;
mod normalise;
mod ranked;
mod score;
mod scorer;
mod weights;

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;

pub use aggregate::{CombineMode, ScoreAggregator, aggregate};
pub use axis::{Axis, AxisRange};
pub use image_data::{ImageData, ImageDecodeError};
pub use item::{ImageRef, ItemError, ItemMetadata, ScoreableItem};
pub use normalise::{normalise, sanitise_unit};
#[cfg(feature = "serde")]
pub use ranked::RankedRecord;
pub use ranked::RankedItem;
pub use score::{AxisScore, ScoreFragment, ScoreSet, ScoreSetBuilder};
pub use scorer::{BoxError, Scorer, ScorerError, ScoringInput};
pub use weights::{WeightError, WeightMap};
