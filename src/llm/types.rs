//! Common types for LLM interactions

use serde::{Deserialize, Serialize};

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// Message as sent upstream. Both providers accept `{role, content}` with
/// plain string content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmMessage {
    pub role: MessageRole,
    pub content: String,
}

impl LlmMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

/// LLM request
#[derive(Debug, Clone)]
pub struct LlmRequest {
    /// Provider model identifier
    pub model: String,
    pub messages: Vec<LlmMessage>,
    pub max_tokens: Option<u32>,
}

impl LlmRequest {
    pub fn has_user_message(&self) -> bool {
        self.messages.iter().any(|m| m.role == MessageRole::User)
    }
}

/// Outcome of a proxy completion that reached the proxy and got JSON back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProxyReply {
    /// Content of the first choice
    Answer(String),
    /// No choices; the proxy's `error.message` (or a stand-in)
    ProviderError(String),
}

impl ProxyReply {
    pub fn into_text(self) -> String {
        match self {
            ProxyReply::Answer(text) | ProxyReply::ProviderError(text) => text,
        }
    }
}
