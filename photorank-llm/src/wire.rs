//! Chat API wire types.
//!
//! Requests follow the Cohere v2 chat shape: a system message with the
//! rubric and a user message carrying text and an image URL part.

use serde::{Deserialize, Serialize};

/// One chat completion request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    /// Model identifier.
    pub model: String,
    /// Conversation, system message first.
    pub messages: Vec<ChatMessage>,
    /// Completion budget.
    pub max_tokens: u32,
}

impl ChatRequest {
    /// Text of the system message, if present.
    #[must_use]
    pub fn system_prompt(&self) -> Option<&str> {
        self.messages.iter().find_map(|message| match message {
            ChatMessage::System { content } => Some(content.as_str()),
            ChatMessage::User { .. } => None,
        })
    }

    /// Concatenated text parts of the user message.
    #[must_use]
    pub fn user_text(&self) -> String {
        self.messages
            .iter()
            .filter_map(|message| match message {
                ChatMessage::User { content } => Some(content),
                ChatMessage::System { .. } => None,
            })
            .flatten()
            .filter_map(|part| match part {
                ContentPart::Text { text } => Some(text.as_str()),
                ContentPart::ImageUrl { .. } => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A message in the conversation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum ChatMessage {
    /// Instructions for the model.
    System {
        /// Rubric text.
        content: String,
    },
    /// The item to rate.
    User {
        /// Text and image parts.
        content: Vec<ContentPart>,
    },
}

/// One part of a multimodal user message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    /// Plain text.
    Text {
        /// Text content.
        text: String,
    },
    /// An image by URL or data URI.
    ImageUrl {
        /// Image location.
        image_url: ImageUrl,
    },
}

/// Image location inside a [`ContentPart::ImageUrl`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageUrl {
    /// HTTP URL or `data:` URI.
    pub url: String,
}

/// Chat completion response.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    /// Assistant message.
    pub message: ResponseMessage,
}

/// Assistant message body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseMessage {
    /// Content blocks, text first.
    #[serde(default)]
    pub content: Vec<ResponseContent>,
}

/// One content block of the assistant message.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseContent {
    /// Text of the block, absent for non-text blocks.
    #[serde(default)]
    pub text: Option<String>,
}

impl ChatResponse {
    /// Text of the first content block.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.message
            .content
            .first()
            .and_then(|block| block.text.as_deref())
    }
}
