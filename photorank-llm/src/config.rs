//! Configuration for the LLM scorer and its HTTP transport.

use std::fmt;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Cohere v2 chat endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.cohere.com/v2/chat";
/// Vision-capable model used when none is configured.
pub const DEFAULT_MODEL: &str = "c4ai-aya-vision-8b";
/// Completion budget per request.
pub const DEFAULT_MAX_TOKENS: u32 = 500;
/// Default user agent for provider requests.
pub const DEFAULT_USER_AGENT: &str = "photorank-llm/0.1";
/// Environment variable holding the provider API key.
pub const API_KEY_VAR: &str = "COHERE_API_KEY";
/// Environment variable overriding the model name.
pub const MODEL_VAR: &str = "PHOTORANK_LLM_MODEL";

const DEFAULT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_MIN_INTERVAL_MILLIS: u64 = 250;

/// Invalid LLM scorer configuration.
#[derive(Debug, Error)]
pub enum LlmConfigError {
    /// No API key was provided.
    #[error("missing provider API key; set COHERE_API_KEY")]
    MissingApiKey,
    /// The endpoint URL is blank.
    #[error("provider endpoint must not be empty")]
    EmptyEndpoint,
    /// The model name is blank.
    #[error("model name must not be empty")]
    EmptyModel,
    /// The completion budget is zero.
    #[error("max_tokens must be greater than zero")]
    ZeroMaxTokens,
    /// The retry policy allows no attempts.
    #[error("retry policy must allow at least one attempt")]
    ZeroAttempts,
    /// The HTTP client could not be built.
    #[error("failed to build HTTP client")]
    HttpClient {
        /// Client construction failure.
        #[source]
        source: reqwest::Error,
    },
}

/// Exponential backoff for transient provider failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts per request, including the first.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub initial_backoff: Duration,
    /// Upper bound on any single delay.
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    /// Policy with explicit limits.
    #[must_use]
    pub const fn new(max_attempts: u32, initial_backoff: Duration, max_backoff: Duration) -> Self {
        Self {
            max_attempts,
            initial_backoff,
            max_backoff,
        }
    }

    /// Delay to wait after the given failed attempt (1-based).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::time::Duration;
    /// use photorank_llm::RetryPolicy;
    ///
    /// let policy = RetryPolicy::new(5, Duration::from_millis(100), Duration::from_millis(350));
    /// assert_eq!(policy.backoff(1), Duration::from_millis(100));
    /// assert_eq!(policy.backoff(2), Duration::from_millis(200));
    /// assert_eq!(policy.backoff(3), Duration::from_millis(350));
    /// ```
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2_u32.saturating_pow(attempt.saturating_sub(1));
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

/// Settings for [`crate::LlmScorer`] and [`crate::HttpChatTransport`].
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LlmScorerConfig {
    /// Bearer token for the provider.
    pub api_key: String,
    /// Chat endpoint URL.
    pub endpoint: String,
    /// Model identifier.
    pub model: String,
    /// Completion budget per request.
    pub max_tokens: u32,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Minimum spacing between consecutive requests.
    pub min_request_interval: Duration,
    /// User agent sent with every request.
    pub user_agent: String,
    /// Backoff for transient failures.
    pub retry: RetryPolicy,
}

impl Default for LlmScorerConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            model: DEFAULT_MODEL.to_owned(),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            min_request_interval: Duration::from_millis(DEFAULT_MIN_INTERVAL_MILLIS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            retry: RetryPolicy::default(),
        }
    }
}

impl fmt::Debug for LlmScorerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmScorerConfig")
            .field("api_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("timeout", &self.timeout)
            .field("min_request_interval", &self.min_request_interval)
            .field("user_agent", &self.user_agent)
            .field("retry", &self.retry)
            .finish()
    }
}

impl LlmScorerConfig {
    /// Defaults with the given API key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Read the API key and optional model override from the process
    /// environment.
    ///
    /// # Errors
    /// Returns [`LlmConfigError::MissingApiKey`] when the key is unset or
    /// blank.
    pub fn from_env() -> Result<Self, LlmConfigError> {
        Self::from_env_with(|name| std::env::var(name).ok())
    }

    /// Like [`Self::from_env`] but reading variables through `lookup`.
    ///
    /// # Errors
    /// Returns [`LlmConfigError::MissingApiKey`] when the key is unset or
    /// blank.
    pub fn from_env_with(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, LlmConfigError> {
        let api_key = lookup(API_KEY_VAR)
            .filter(|key| !key.trim().is_empty())
            .ok_or(LlmConfigError::MissingApiKey)?;
        let mut config = Self::new(api_key);
        if let Some(model) = lookup(MODEL_VAR).filter(|model| !model.trim().is_empty()) {
            config.model = model;
        }
        Ok(config)
    }

    /// Set the endpoint URL.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the model identifier.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the per-request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the minimum spacing between requests.
    #[must_use]
    pub const fn with_min_request_interval(mut self, interval: Duration) -> Self {
        self.min_request_interval = interval;
        self
    }

    /// Set the retry policy.
    #[must_use]
    pub const fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Check the configuration can drive requests.
    ///
    /// # Errors
    /// Returns the first [`LlmConfigError`] found.
    pub fn validate(&self) -> Result<(), LlmConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(LlmConfigError::MissingApiKey);
        }
        if self.endpoint.trim().is_empty() {
            return Err(LlmConfigError::EmptyEndpoint);
        }
        if self.model.trim().is_empty() {
            return Err(LlmConfigError::EmptyModel);
        }
        if self.max_tokens == 0 {
            return Err(LlmConfigError::ZeroMaxTokens);
        }
        if self.retry.max_attempts == 0 {
            return Err(LlmConfigError::ZeroAttempts);
        }
        Ok(())
    }
}
