//! Chat transport: the seam between the scorer and the provider API.
//!
//! [`HttpChatTransport`] posts requests with `reqwest`, spacing calls by a
//! minimum interval so a ranking run does not burst the provider's rate
//! limit.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::wire::{ChatRequest, ChatResponse};
use crate::{LlmConfigError, LlmScorerConfig};

/// Failure talking to the chat provider.
#[derive(Debug, Error)]
pub enum LlmTransportError {
    /// The request did not complete in time.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// Endpoint URL.
        url: String,
        /// Configured timeout in seconds.
        timeout_secs: u64,
    },
    /// The provider could not be reached.
    #[error("network error contacting {url}: {message}")]
    Network {
        /// Endpoint URL.
        url: String,
        /// Failure description.
        message: String,
    },
    /// The provider answered with a non-success status.
    #[error("{url} returned HTTP {status}: {message}")]
    Http {
        /// Endpoint URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Response body or reason.
        message: String,
    },
    /// The response body was not a chat response.
    #[error("could not decode chat response: {message}")]
    Decode {
        /// Decoder failure.
        message: String,
    },
    /// The response carried no text block.
    #[error("chat response contained no text")]
    EmptyReply,
}

impl LlmTransportError {
    /// Whether retrying the same request may succeed.
    ///
    /// Timeouts, network failures, HTTP 429 and 5xx responses are
    /// transient; everything else is not.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Network { .. } => true,
            Self::Http { status, .. } => matches!(*status, 429 | 500..=599),
            Self::Decode { .. } | Self::EmptyReply => false,
        }
    }
}

/// Sends one chat request and returns the reply text.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send `request`.
    ///
    /// # Errors
    /// Returns [`LlmTransportError`] when the provider cannot produce a
    /// reply.
    async fn send(&self, request: &ChatRequest) -> Result<String, LlmTransportError>;
}

/// Enforces a minimum interval between consecutive requests.
#[derive(Debug)]
struct RateLimiter {
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval: Duration) -> Self {
        Self {
            last_request: Mutex::new(None),
            min_interval,
        }
    }

    async fn wait(&self) {
        if self.min_interval.is_zero() {
            return;
        }
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                let pause = self.min_interval.saturating_sub(elapsed);
                log::debug!("rate limiting chat request for {pause:?}");
                tokio::time::sleep(pause).await;
            }
        }
        *last = Some(Instant::now());
    }
}

/// `reqwest`-backed [`ChatTransport`] using bearer authentication.
pub struct HttpChatTransport {
    client: Client,
    endpoint: String,
    api_key: String,
    timeout: Duration,
    limiter: RateLimiter,
}

impl std::fmt::Debug for HttpChatTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpChatTransport")
            .field("client", &self.client)
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("limiter", &self.limiter)
            .finish()
    }
}

impl HttpChatTransport {
    /// Build a transport from validated settings.
    ///
    /// # Errors
    /// Returns [`LlmConfigError`] when the settings are invalid or the HTTP
    /// client cannot be built.
    pub fn new(config: &LlmScorerConfig) -> Result<Self, LlmConfigError> {
        config.validate()?;
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(|source| LlmConfigError::HttpClient { source })?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            timeout: config.timeout,
            limiter: RateLimiter::new(config.min_request_interval),
        })
    }

    fn convert_reqwest_error(&self, error: &reqwest::Error) -> LlmTransportError {
        if error.is_timeout() {
            return LlmTransportError::Timeout {
                url: self.endpoint.clone(),
                timeout_secs: self.timeout.as_secs(),
            };
        }
        if let Some(status) = error.status() {
            return LlmTransportError::Http {
                url: self.endpoint.clone(),
                status: status.as_u16(),
                message: error.to_string(),
            };
        }
        if error.is_decode() {
            return LlmTransportError::Decode {
                message: error.to_string(),
            };
        }
        LlmTransportError::Network {
            url: self.endpoint.clone(),
            message: error.to_string(),
        }
    }
}

#[async_trait]
impl ChatTransport for HttpChatTransport {
    async fn send(&self, request: &ChatRequest) -> Result<String, LlmTransportError> {
        self.limiter.wait().await;
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmTransportError::Http {
                url: self.endpoint.clone(),
                status: status.as_u16(),
                message: body,
            });
        }
        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|err| self.convert_reqwest_error(&err))?;
        chat.text()
            .map(str::to_owned)
            .ok_or(LlmTransportError::EmptyReply)
    }
}
