//! Chat model trait and message types.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// The author of a [`ChatMessage`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions to the model.
    System,
    /// The human asking questions.
    User,
    /// The model's own replies.
    Assistant,
}

/// A single message in a conversation.
///
/// An ordered `Vec<ChatMessage>` forms a session transcript. Assistant
/// messages stored in the transcript hold the clean answer text only —
/// source citations are rendered by the caller and never written back,
/// so the history stays usable for question rewriting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    /// Who authored this message.
    pub role: Role,
    /// The message text.
    pub content: String,
}

impl ChatMessage {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

/// A hosted large-language-model capability.
///
/// Implementations wrap a specific inference API behind a single
/// generate call. Calls block the enclosing operation until the API
/// returns or fails; there is no retry or timeout layer.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Generate a completion for an ordered sequence of messages.
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String>;

    /// The model identifier, for logging.
    fn name(&self) -> &str;
}
