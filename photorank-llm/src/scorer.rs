//! Single-call multimodal scorer.

use std::sync::Arc;

use async_trait::async_trait;
use photorank_core::{Axis, AxisRange, ScoreFragment, Scorer, ScorerError, ScoringInput};

use crate::parse::{parse_ratings, rated_fragment};
use crate::prompt::{build_request, data_uri};
use crate::transport::{ChatTransport, HttpChatTransport, LlmTransportError};
use crate::wire::ChatRequest;
use crate::{LlmConfigError, LlmScorerConfig};

/// Rates an image on every LLM axis with one chat request.
///
/// Transient transport failures are retried with exponential backoff. A
/// reply that cannot be parsed, or that rates none of the requested axes,
/// triggers one re-prompt with stricter instructions before the item is
/// reported as [`ScorerError::MalformedResponse`].
///
/// Ratings are on the `0..=10` scale over [`Axis::LLM_VOCABULARY`]. Pair
/// this scorer with [`WeightMap::llm_defaults()`](photorank_core::WeightMap::llm_defaults)
/// rather than the heuristic default map, which weights only three of
/// these axes.
pub struct LlmScorer {
    config: LlmScorerConfig,
    transport: Arc<dyn ChatTransport>,
    axes: Vec<Axis>,
}

impl std::fmt::Debug for LlmScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmScorer")
            .field("config", &self.config)
            .field("axes", &self.axes)
            .finish_non_exhaustive()
    }
}

impl LlmScorer {
    /// Scorer talking to the configured HTTP endpoint.
    ///
    /// # Errors
    /// Returns [`LlmConfigError`] when the configuration is invalid.
    pub fn new(config: LlmScorerConfig) -> Result<Self, LlmConfigError> {
        let transport = HttpChatTransport::new(&config)?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Scorer over an explicit transport.
    ///
    /// # Errors
    /// Returns [`LlmConfigError`] when the configuration is invalid.
    pub fn with_transport(
        config: LlmScorerConfig,
        transport: Arc<dyn ChatTransport>,
    ) -> Result<Self, LlmConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            transport,
            axes: Axis::LLM_VOCABULARY.to_vec(),
        })
    }

    /// Settings in use.
    #[must_use]
    pub const fn config(&self) -> &LlmScorerConfig {
        &self.config
    }

    async fn send_with_retry(
        &self,
        item_id: &str,
        request: &ChatRequest,
    ) -> Result<String, LlmTransportError> {
        let policy = self.config.retry;
        let mut attempt = 1_u32;
        loop {
            match self.transport.send(request).await {
                Ok(reply) => return Ok(reply),
                Err(err) if err.is_transient() && attempt < policy.max_attempts => {
                    let delay = policy.backoff(attempt);
                    log::warn!(
                        "chat request for {item_id} failed on attempt {attempt}/{}: {err}; retrying in {delay:?}",
                        policy.max_attempts
                    );
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn request_fragment(
        &self,
        item_id: &str,
        request: &ChatRequest,
    ) -> Result<Result<ScoreFragment, crate::ResponseParseError>, ScorerError> {
        let reply = self
            .send_with_retry(item_id, request)
            .await
            .map_err(|err| ScorerError::Provider {
                source: Box::new(err),
            })?;
        Ok(parse_ratings(&reply).and_then(|ratings| rated_fragment(&ratings, &self.axes)))
    }
}

#[async_trait]
impl Scorer for LlmScorer {
    fn name(&self) -> &str {
        "llm"
    }

    fn axes(&self) -> Vec<Axis> {
        self.axes.clone()
    }

    fn range(&self) -> AxisRange {
        AxisRange::DECILE
    }

    async fn score(&self, input: &ScoringInput<'_>) -> Result<ScoreFragment, ScorerError> {
        let item = input.item();
        let image = input.require_image()?;
        let uri = data_uri(image, item.metadata().mime_type.as_deref());

        let request = build_request(&self.config, item, uri.clone(), false);
        match self.request_fragment(item.id(), &request).await? {
            Ok(fragment) => return Ok(fragment),
            Err(err) => log::warn!(
                "unparseable rating reply for {}: {err}; re-prompting",
                item.id()
            ),
        }

        let strict = build_request(&self.config, item, uri, true);
        self.request_fragment(item.id(), &strict)
            .await?
            .map_err(|err| ScorerError::MalformedResponse {
                source: Box::new(err),
            })
    }
}
