//! LLM provider abstraction
//!
//! Two upstream shapes sit behind one interface: Anthropic's streaming
//! Messages API (direct mode) and OpenRouter's single-shot JSON proxy.

mod anthropic;
mod config;
mod error;
mod models;
mod openrouter;
mod stream;
mod types;

#[cfg(test)]
mod proptests;

pub use anthropic::{AnthropicService, DEFAULT_MAX_TOKENS};
pub use config::{Credentials, DirectConfig, LlmConfig, ProxyConfig};
pub use error::LlmError;
pub use models::{resolve_model_id, ChatModel};
pub use openrouter::OpenRouterService;
pub use types::*;

use async_trait::async_trait;
use std::sync::Arc;

/// Incrementally delivered completion text
#[async_trait]
pub trait TextStream: Send {
    /// Next text fragment, `None` once the response is complete
    async fn next_text(&mut self) -> Option<Result<String, LlmError>>;

    /// Provider's assembled answer for everything received so far
    fn final_text(&self) -> String;
}

/// Common interface for the two upstreams
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Open a streaming completion against the primary provider
    async fn stream(
        &self,
        config: &DirectConfig,
        request: &LlmRequest,
    ) -> Result<Box<dyn TextStream>, LlmError>;

    /// Send one non-streaming completion through the proxy
    async fn complete_via_proxy(
        &self,
        config: &ProxyConfig,
        request: &LlmRequest,
    ) -> Result<ProxyReply, LlmError>;
}

/// Production service backed by a shared HTTP client
#[derive(Clone, Default)]
pub struct HttpCompletionService {
    client: reqwest::Client,
}

impl HttpCompletionService {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CompletionService for HttpCompletionService {
    async fn stream(
        &self,
        config: &DirectConfig,
        request: &LlmRequest,
    ) -> Result<Box<dyn TextStream>, LlmError> {
        let service = AnthropicService::new(self.client.clone(), config);
        let stream = service.stream(request).await?;
        Ok(Box::new(stream))
    }

    async fn complete_via_proxy(
        &self,
        config: &ProxyConfig,
        request: &LlmRequest,
    ) -> Result<ProxyReply, LlmError> {
        OpenRouterService::new(self.client.clone(), config)
            .complete(request)
            .await
    }
}

/// Logging wrapper for completion services
pub struct LoggingService {
    inner: Arc<dyn CompletionService>,
}

impl LoggingService {
    pub fn new(inner: Arc<dyn CompletionService>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl CompletionService for LoggingService {
    async fn stream(
        &self,
        config: &DirectConfig,
        request: &LlmRequest,
    ) -> Result<Box<dyn TextStream>, LlmError> {
        let start = std::time::Instant::now();
        let result = self.inner.stream(config, request).await;
        let duration = start.elapsed();

        match &result {
            Ok(_) => {
                tracing::info!(
                    model = %request.model,
                    messages = request.messages.len(),
                    duration_ms = %duration.as_millis(),
                    "LLM stream opened"
                );
            }
            Err(e) => {
                tracing::error!(
                    model = %request.model,
                    duration_ms = %duration.as_millis(),
                    error = %e.message,
                    "LLM stream failed to open"
                );
            }
        }

        result
    }

    async fn complete_via_proxy(
        &self,
        config: &ProxyConfig,
        request: &LlmRequest,
    ) -> Result<ProxyReply, LlmError> {
        let start = std::time::Instant::now();
        let result = self.inner.complete_via_proxy(config, request).await;
        let duration = start.elapsed();

        match &result {
            Ok(ProxyReply::Answer(text)) => {
                tracing::info!(
                    model = %request.model,
                    duration_ms = %duration.as_millis(),
                    chars = text.chars().count(),
                    "Proxy request completed"
                );
            }
            Ok(ProxyReply::ProviderError(message)) => {
                tracing::warn!(
                    model = %request.model,
                    duration_ms = %duration.as_millis(),
                    error = %message,
                    "Proxy returned no choices"
                );
            }
            Err(e) => {
                tracing::error!(
                    model = %request.model,
                    duration_ms = %duration.as_millis(),
                    error = %e.message,
                    "Proxy request failed"
                );
            }
        }

        result
    }
}
