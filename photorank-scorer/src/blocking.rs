//! Move pixel and model work onto tokio's blocking pool.
//!
//! Decoding, resizing and inference are CPU bound and backends are
//! synchronous, so running them inline would stall the async workers that
//! drive other items and the run deadline.

use image::DynamicImage;
use photorank_core::{ImageData, ScorerError, ScoringInput};

/// Owned copy of what a pixel scorer needs on a blocking thread.
#[derive(Debug, Clone)]
pub(crate) struct PixelJob {
    item_id: String,
    image: ImageData,
}

impl PixelJob {
    /// Capture the item id and a shared handle to its image.
    pub(crate) fn from_input(input: &ScoringInput<'_>) -> Result<Self, ScorerError> {
        Ok(Self {
            item_id: input.item().id().to_owned(),
            image: input.require_image()?.clone(),
        })
    }

    pub(crate) fn item_id(&self) -> &str {
        &self.item_id
    }

    /// Decoded pixels, cached on the shared image.
    pub(crate) fn decoded(&self) -> Result<&DynamicImage, ScorerError> {
        self.image.decode().map_err(|source| ScorerError::Decode {
            item_id: self.item_id.clone(),
            source,
        })
    }
}

/// Run `work` on the blocking pool.
///
/// A panicking or cancelled job surfaces as [`ScorerError::Model`] for
/// `backend`.
pub(crate) async fn on_blocking_pool<T, F>(backend: &str, work: F) -> Result<T, ScorerError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, ScorerError> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|err| ScorerError::Model {
            backend: backend.to_owned(),
            message: format!("blocking task did not complete: {err}"),
        })?
}
