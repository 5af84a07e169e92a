//! Items submitted for ranking and the metadata that travels with them.

use chrono::{DateTime, Utc};
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Where the pixels for an item come from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum ImageRef {
    /// Encoded bytes supplied inline by the media source.
    Bytes(Vec<u8>),
    /// A URL the image loader can fetch.
    Url(String),
    /// No image is associated with the item.
    #[default]
    None,
}

impl ImageRef {
    /// Report whether the reference can possibly yield image data.
    #[must_use]
    pub fn is_present(&self) -> bool {
        match self {
            Self::Bytes(bytes) => !bytes.is_empty(),
            Self::Url(url) => !url.trim().is_empty(),
            Self::None => false,
        }
    }
}

/// Descriptive metadata for a media item.
///
/// Every field is optional on the wire; a missing `is_favorite` key reads as
/// `false`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct ItemMetadata {
    /// Free-text description supplied by the owner.
    pub description: Option<String>,
    /// Original filename.
    pub filename: Option<String>,
    /// Capture time.
    pub creation_time: Option<DateTime<Utc>>,
    /// Whether the owner marked the item as a favourite.
    pub is_favorite: bool,
    /// Pixel width.
    pub width: Option<u32>,
    /// Pixel height.
    pub height: Option<u32>,
    /// Declared mime type, e.g. `image/jpeg`.
    pub mime_type: Option<String>,
}

/// Errors returned by [`ScoreableItem::new`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ItemError {
    /// The identifier was empty or whitespace.
    #[error("item identifier must not be empty")]
    EmptyId,
}

/// A media item the engine can score.
///
/// Items are owned by the media source and only read by the engine.
///
/// # Examples
///
/// ```rust
/// use photorank_core::{ImageRef, ItemMetadata, ScoreableItem};
///
/// # fn main() -> Result<(), photorank_core::ItemError> {
/// let item = ScoreableItem::new("photo-1", ImageRef::Url("https://example.com/a.jpg".into()))?
///     .with_metadata(ItemMetadata {
///         is_favorite: true,
///         ..ItemMetadata::default()
///     });
/// assert_eq!(item.id(), "photo-1");
/// assert!(item.metadata().is_favorite);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScoreableItem {
    id: String,
    image: ImageRef,
    #[cfg_attr(feature = "serde", serde(default))]
    metadata: ItemMetadata,
}

impl ScoreableItem {
    /// Validate and construct an item with empty metadata.
    ///
    /// # Errors
    /// Returns [`ItemError::EmptyId`] when `id` is blank.
    pub fn new(id: impl Into<String>, image: ImageRef) -> Result<Self, ItemError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ItemError::EmptyId);
        }
        Ok(Self {
            id,
            image,
            metadata: ItemMetadata::default(),
        })
    }

    /// Attach metadata while consuming `self`.
    #[must_use]
    pub fn with_metadata(mut self, metadata: ItemMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Item identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Image reference.
    #[must_use]
    pub const fn image(&self) -> &ImageRef {
        &self.image
    }

    /// Descriptive metadata.
    #[must_use]
    pub const fn metadata(&self) -> &ItemMetadata {
        &self.metadata
    }
}
