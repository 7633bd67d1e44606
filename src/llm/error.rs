//! LLM error types

use thiserror::Error;

/// LLM error with classification
#[derive(Debug, Error)]
#[error("{message}")]
pub struct LlmError {
    pub kind: LlmErrorKind,
    pub message: String,
}

impl LlmError {
    pub fn new(kind: LlmErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Network, message)
    }

    pub fn http(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Http, message)
    }

    pub fn api(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Api, message)
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::InvalidResponse, message)
    }

    /// Whether the failure originated with the provider (as opposed to our own
    /// handling of what it sent back)
    pub fn is_provider_error(&self) -> bool {
        self.kind.is_provider_error()
    }
}

/// Error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmErrorKind {
    /// Connection failures, timeouts, interrupted bodies
    Network,
    /// Non-2xx status from the provider
    Http,
    /// Error reported by the provider inside an otherwise successful exchange
    Api,
    /// Body we could not make sense of
    InvalidResponse,
}

impl LlmErrorKind {
    pub fn is_provider_error(self) -> bool {
        matches!(self, Self::Network | Self::Http | Self::Api)
    }
}
