//! Stub chat transport for tests.
//!
//! [`StubChatTransport`] replays scripted replies without network access
//! and records every request it receives.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::transport::{ChatTransport, LlmTransportError};
use crate::wire::ChatRequest;

/// Transport answering from a queue of scripted replies.
///
/// Once the queue is exhausted every call fails with
/// [`LlmTransportError::EmptyReply`].
#[derive(Debug, Default)]
pub struct StubChatTransport {
    replies: Mutex<VecDeque<Result<String, LlmTransportError>>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl StubChatTransport {
    /// Replay `replies` in order.
    #[must_use]
    pub fn with_replies(
        replies: impl IntoIterator<Item = Result<String, LlmTransportError>>,
    ) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Answer every request with the same text.
    #[must_use]
    pub fn always(reply: &str, times: usize) -> Self {
        Self::with_replies(std::iter::repeat_with(|| Ok(reply.to_owned())).take(times))
    }

    /// Requests received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of requests received so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait]
impl ChatTransport for StubChatTransport {
    async fn send(&self, request: &ChatRequest) -> Result<String, LlmTransportError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or(Err(LlmTransportError::EmptyReply))
    }
}
