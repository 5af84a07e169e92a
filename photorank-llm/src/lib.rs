//! Multimodal LLM scoring for the Photorank ranking engine.
//!
//! [`LlmScorer`] sends each image, its description and its metadata to a
//! vision-capable chat model in a single request and reads back ratings on
//! `[0, 10]` for every axis of the LLM vocabulary plus an `overall` value.
//!
//! The provider is reached through the [`ChatTransport`] trait.
//! [`HttpChatTransport`] speaks the Cohere v2 chat API over `reqwest`;
//! tests substitute the stub in `test_support`.
//!
//! # Examples
//!
//! ```no_run
//! use photorank_llm::{LlmScorer, LlmScorerConfig};
//!
//! let config = LlmScorerConfig::from_env()?;
//! let scorer = LlmScorer::new(config)?;
//! # let _ = scorer;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod config;
mod parse;
mod prompt;
mod scorer;
mod transport;
mod wire;

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;

pub use config::{
    API_KEY_VAR, DEFAULT_ENDPOINT, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_USER_AGENT,
    LlmConfigError, LlmScorerConfig, MODEL_VAR, RetryPolicy,
};
pub use parse::{
    OVERALL_KEY, ResponseParseError, parse_ratings, rated_fragment, ratings_fragment,
};
pub use prompt::{FALLBACK_MIME, RATING_RUBRIC, STRICT_SUFFIX, build_request, data_uri};
pub use scorer::LlmScorer;
pub use transport::{ChatTransport, HttpChatTransport, LlmTransportError};
pub use wire::{
    ChatMessage, ChatRequest, ChatResponse, ContentPart, ImageUrl, ResponseContent,
    ResponseMessage,
};
