//! Conversation data model

use crate::llm::{ChatModel, LlmMessage, MessageRole};
use serde::{Deserialize, Serialize};

/// One entry of the message log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
    /// Displayed but never sent upstream
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_initial_greeting: Option<bool>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
            is_initial_greeting: None,
        }
    }

    /// Empty assistant message filled in while the answer arrives
    pub fn placeholder() -> Self {
        Self {
            role: MessageRole::Assistant,
            content: String::new(),
            is_initial_greeting: Some(false),
        }
    }

    #[cfg(test)]
    pub fn greeting(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
            is_initial_greeting: Some(true),
        }
    }

    pub fn is_greeting(&self) -> bool {
        self.is_initial_greeting.unwrap_or(false)
    }

    fn is_sendable(&self) -> bool {
        !self.content.trim().is_empty() && !self.is_greeting()
    }
}

/// Conversation state shared between user actions and the fetcher
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conversation {
    pub messages: Vec<Message>,
    pub is_streaming: bool,
    pub selected_model: String,
    pub error_message: String,
    /// Bumped whenever a new exchange starts or the log is cleared, so a
    /// fetcher can tell whether the placeholder it was filling still exists
    #[serde(skip)]
    exchange: u64,
}

impl Default for Conversation {
    fn default() -> Self {
        Self {
            messages: Vec::new(),
            is_streaming: false,
            selected_model: ChatModel::default().display_name().to_string(),
            error_message: String::new(),
            exchange: 0,
        }
    }
}

impl Conversation {
    /// Back to an empty log. The model selection is kept.
    pub fn reset(&mut self) {
        self.messages.clear();
        self.is_streaming = false;
        self.error_message.clear();
        self.exchange += 1;
    }

    /// Append a user message and its placeholder, and mark a fetch in flight.
    pub fn begin_exchange(&mut self, prompt: &str) {
        self.messages.push(Message::user(prompt));
        self.messages.push(Message::placeholder());
        self.is_streaming = true;
        self.error_message.clear();
        self.exchange += 1;
    }

    pub fn exchange(&self) -> u64 {
        self.exchange
    }

    pub fn is_current(&self, exchange: u64) -> bool {
        self.exchange == exchange
    }

    /// Index of the placeholder being filled, if the log still ends in one
    pub fn placeholder_index(&self) -> Option<usize> {
        match self.messages.last() {
            Some(m) if m.role == MessageRole::Assistant => Some(self.messages.len() - 1),
            _ => None,
        }
    }

    /// Messages to send upstream.
    ///
    /// Everything before the trailing placeholder, minus blank and greeting
    /// messages. The user message of the current exchange sits right before
    /// the placeholder, so it is included here exactly once when sendable.
    pub fn outbound_messages(&self) -> Vec<LlmMessage> {
        let history = match self.placeholder_index() {
            Some(index) => &self.messages[..index],
            None => &self.messages[..],
        };

        history
            .iter()
            .filter(|m| m.is_sendable())
            .map(|m| LlmMessage {
                role: m.role,
                content: m.content.clone(),
            })
            .collect()
    }
}
