//! Loaded image bytes with lazily decoded pixels.

use std::fmt;
use std::sync::{Arc, OnceLock};

use image::DynamicImage;
use thiserror::Error;

/// Raised when image bytes cannot be decoded into pixels.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to decode image: {message}")]
pub struct ImageDecodeError {
    /// Decoder message.
    pub message: String,
}

/// Raw image bytes for one item, shared by every scorer of that item.
///
/// Decoding happens at most once, on first use, so pixel-based scorers
/// share the work while scorers that forward raw bytes never pay for it.
/// Clones share the bytes and the decode cache, so a scorer can move a
/// clone onto a blocking thread.
#[derive(Clone)]
pub struct ImageData {
    inner: Arc<Payload>,
}

struct Payload {
    bytes: Vec<u8>,
    mime_type: Option<String>,
    decoded: OnceLock<Result<DynamicImage, ImageDecodeError>>,
}

impl ImageData {
    /// Wrap raw bytes with an optional mime type.
    #[must_use]
    pub fn new(bytes: Vec<u8>, mime_type: Option<String>) -> Self {
        Self {
            inner: Arc::new(Payload {
                bytes,
                mime_type,
                decoded: OnceLock::new(),
            }),
        }
    }

    /// Raw encoded bytes.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.inner.bytes
    }

    /// Declared mime type, when known.
    #[must_use]
    pub fn mime_type(&self) -> Option<&str> {
        self.inner.mime_type.as_deref()
    }

    /// Report whether any bytes are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.bytes.is_empty()
    }

    /// Decode the bytes, caching the outcome for later callers.
    ///
    /// # Errors
    /// Returns [`ImageDecodeError`] when the bytes are not a supported image.
    pub fn decode(&self) -> Result<&DynamicImage, ImageDecodeError> {
        let payload = &*self.inner;
        payload
            .decoded
            .get_or_init(|| {
                image::load_from_memory(&payload.bytes).map_err(|err| ImageDecodeError {
                    message: err.to_string(),
                })
            })
            .as_ref()
            .map_err(Clone::clone)
    }
}

impl fmt::Debug for ImageData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageData")
            .field("len", &self.inner.bytes.len())
            .field("mime_type", &self.inner.mime_type)
            .field("decoded", &self.inner.decoded.get().map(Result::is_ok))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use image::{ImageFormat, Rgb, RgbImage};
    use rstest::rstest;

    use super::*;

    fn png_bytes() -> Vec<u8> {
        let pixels = RgbImage::from_pixel(4, 3, Rgb([10, 20, 30]));
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(pixels)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .expect("encode png fixture");
        bytes
    }

    #[rstest]
    fn decodes_valid_png_once() {
        let data = ImageData::new(png_bytes(), Some("image/png".to_owned()));
        let first = data.decode().expect("decode png");
        assert_eq!((first.width(), first.height()), (4, 3));
        assert!(data.decode().is_ok());
    }

    #[rstest]
    fn corrupt_bytes_report_decode_error() {
        let data = ImageData::new(vec![0, 1, 2, 3], None);
        assert!(data.decode().is_err());
        assert!(data.decode().is_err(), "error is cached, not retried");
    }

    #[rstest]
    fn clones_share_the_decode_cache() {
        let data = ImageData::new(png_bytes(), None);
        let shared = data.clone();
        assert!(shared.decode().is_ok());
        assert!(
            format!("{data:?}").contains("decoded: Some(true)"),
            "decode on a clone is visible through the original"
        );
    }

    #[rstest]
    fn empty_payload_is_reported() {
        assert!(ImageData::new(Vec::new(), None).is_empty());
    }
}
