//! Fetch raw image bytes for items before scoring.
//!
//! The engine loads each item's image once and shares the bytes, and the
//! lazily decoded pixels, with every scorer for that item.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use photorank_core::{ImageData, ImageRef};
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use thiserror::Error;

/// Default user agent for image requests.
pub const DEFAULT_USER_AGENT: &str = "photorank/0.1";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Failure loading an image.
#[derive(Debug, Error)]
pub enum ImageLoadError {
    /// The request did not complete in time.
    #[error("fetching {url} timed out after {timeout_secs}s")]
    Timeout {
        /// Requested URL.
        url: String,
        /// Configured timeout in seconds.
        timeout_secs: u64,
    },
    /// The server answered with a non-success status.
    #[error("fetching {url} returned HTTP {status}")]
    Http {
        /// Requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },
    /// The server could not be reached or the body could not be read.
    #[error("network error fetching {url}: {message}")]
    Network {
        /// Requested URL.
        url: String,
        /// Failure description.
        message: String,
    },
    /// The HTTP client could not be built.
    #[error("failed to build HTTP client")]
    Client {
        /// Client construction failure.
        #[source]
        source: reqwest::Error,
    },
}

/// Resolves an [`ImageRef`] to bytes.
///
/// `Ok(None)` means the item has no image; errors are infrastructure
/// failures. The engine treats both as missing image data.
#[async_trait]
pub trait ImageLoader: Send + Sync {
    /// Load the referenced image.
    ///
    /// # Errors
    /// Returns [`ImageLoadError`] when a remote image cannot be fetched.
    async fn load(&self, image: &ImageRef) -> Result<Option<ImageData>, ImageLoadError>;
}

/// Rewrite a Google Photos base URL to request the original rendition.
///
/// Any existing `=` size suffix is dropped and `=d` appended.
///
/// # Examples
///
/// ```rust
/// use photorank_engine::best_quality_url;
///
/// assert_eq!(
///     best_quality_url("https://lh3.googleusercontent.com/abc=w400-h300"),
///     "https://lh3.googleusercontent.com/abc=d"
/// );
/// assert_eq!(best_quality_url("https://host/xyz"), "https://host/xyz=d");
/// ```
#[must_use]
pub fn best_quality_url(base_url: &str) -> String {
    let base = base_url
        .split_once('=')
        .map_or(base_url, |(base, _)| base);
    format!("{base}=d")
}

/// In-memory loader that never touches the network.
///
/// Inline bytes pass through unchanged. URLs resolve only when registered
/// with [`StaticImageLoader::with_url`].
#[derive(Debug, Clone, Default)]
pub struct StaticImageLoader {
    urls: HashMap<String, (Vec<u8>, Option<String>)>,
}

impl StaticImageLoader {
    /// Serve `bytes` for `url`.
    #[must_use]
    pub fn with_url(
        mut self,
        url: impl Into<String>,
        bytes: Vec<u8>,
        mime_type: Option<String>,
    ) -> Self {
        self.urls.insert(url.into(), (bytes, mime_type));
        self
    }
}

#[async_trait]
impl ImageLoader for StaticImageLoader {
    async fn load(&self, image: &ImageRef) -> Result<Option<ImageData>, ImageLoadError> {
        Ok(match image {
            ImageRef::Bytes(bytes) => inline(bytes),
            ImageRef::Url(url) => self
                .urls
                .get(url)
                .map(|(bytes, mime)| ImageData::new(bytes.clone(), mime.clone())),
            ImageRef::None => None,
        })
    }
}

fn inline(bytes: &[u8]) -> Option<ImageData> {
    (!bytes.is_empty()).then(|| ImageData::new(bytes.to_vec(), None))
}

/// Settings for [`HttpImageLoader`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpImageLoaderConfig {
    /// Per-request timeout.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
    /// Rewrite URLs with [`best_quality_url`] before fetching.
    pub best_quality: bool,
}

impl Default for HttpImageLoaderConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            best_quality: true,
        }
    }
}

impl HttpImageLoaderConfig {
    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Fetch URLs exactly as given.
    #[must_use]
    pub const fn without_best_quality(mut self) -> Self {
        self.best_quality = false;
        self
    }
}

/// Loader fetching URLs over HTTP with `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpImageLoader {
    client: Client,
    config: HttpImageLoaderConfig,
}

impl HttpImageLoader {
    /// Loader with default settings.
    ///
    /// # Errors
    /// Returns [`ImageLoadError::Client`] when the HTTP client fails to
    /// build.
    pub fn new() -> Result<Self, ImageLoadError> {
        Self::with_config(HttpImageLoaderConfig::default())
    }

    /// Loader with explicit settings.
    ///
    /// # Errors
    /// Returns [`ImageLoadError::Client`] when the HTTP client fails to
    /// build.
    pub fn with_config(config: HttpImageLoaderConfig) -> Result<Self, ImageLoadError> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(|source| ImageLoadError::Client { source })?;
        Ok(Self { client, config })
    }

    /// URL actually requested for `url`.
    #[must_use]
    pub fn request_url(&self, url: &str) -> String {
        if self.config.best_quality {
            best_quality_url(url)
        } else {
            url.to_owned()
        }
    }

    fn convert_reqwest_error(&self, error: &reqwest::Error, url: &str) -> ImageLoadError {
        if error.is_timeout() {
            return ImageLoadError::Timeout {
                url: url.to_owned(),
                timeout_secs: self.config.timeout.as_secs(),
            };
        }
        if let Some(status) = error.status() {
            return ImageLoadError::Http {
                url: url.to_owned(),
                status: status.as_u16(),
            };
        }
        ImageLoadError::Network {
            url: url.to_owned(),
            message: error.to_string(),
        }
    }

    async fn fetch(&self, url: &str) -> Result<Option<ImageData>, ImageLoadError> {
        let target = self.request_url(url);
        let response = self
            .client
            .get(&target)
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, &target))?
            .error_for_status()
            .map_err(|err| self.convert_reqwest_error(&err, &target))?;
        let mime_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.split(';').next().unwrap_or(value).trim().to_owned());
        let bytes = response
            .bytes()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, &target))?;
        log::debug!("fetched {} bytes from {target}", bytes.len());
        Ok((!bytes.is_empty()).then(|| ImageData::new(bytes.to_vec(), mime_type)))
    }
}

#[async_trait]
impl ImageLoader for HttpImageLoader {
    async fn load(&self, image: &ImageRef) -> Result<Option<ImageData>, ImageLoadError> {
        match image {
            ImageRef::Bytes(bytes) => Ok(inline(bytes)),
            ImageRef::Url(url) => self.fetch(url).await,
            ImageRef::None => Ok(None),
        }
    }
}
