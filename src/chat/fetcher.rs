//! Response fetcher
//!
//! Fills the placeholder of one exchange. Every write happens in its own short
//! critical section, and only while the exchange is still the current one.

use super::ConversationStore;
use crate::llm::{
    resolve_model_id, Credentials, DirectConfig, LlmError, LlmRequest, ProxyConfig,
    DEFAULT_MAX_TOKENS,
};

pub const MISSING_KEY_REPLY: &str = "ANTHROPIC_API_KEY not set. Please configure your API key.";
pub const MISSING_KEY_ERROR: &str = "API key not configured.";
pub const EMPTY_REQUEST_REPLY: &str = "Cannot send an empty request to the AI.";
pub const EMPTY_REQUEST_ERROR: &str = "Empty request.";

/// Background task answering the latest prompt
pub struct ResponseFetcher {
    store: ConversationStore,
    exchange: u64,
}

impl ResponseFetcher {
    pub fn new(store: ConversationStore, exchange: u64) -> Self {
        Self { store, exchange }
    }

    pub async fn run(self) {
        let Some(credentials) = self.store.credentials().load().credentials() else {
            tracing::warn!(exchange = self.exchange, "No API key configured");
            self.finish_with_error(
                MISSING_KEY_REPLY.to_string(),
                MISSING_KEY_ERROR.to_string(),
            );
            return;
        };

        let request = {
            let conv = self.store.lock();
            if !conv.is_current(self.exchange) {
                return;
            }
            LlmRequest {
                model: resolve_model_id(&conv.selected_model).to_string(),
                messages: conv.outbound_messages(),
                max_tokens: Some(DEFAULT_MAX_TOKENS),
            }
        };

        if !request.has_user_message() {
            tracing::warn!(exchange = self.exchange, "Nothing to send");
            self.finish_with_error(
                EMPTY_REQUEST_REPLY.to_string(),
                EMPTY_REQUEST_ERROR.to_string(),
            );
            return;
        }

        tracing::info!(
            exchange = self.exchange,
            mode = credentials.mode(),
            model = %request.model,
            messages = request.messages.len(),
            "Fetching response"
        );

        match &credentials {
            Credentials::Proxy(config) => self.fetch_via_proxy(config, &request).await,
            Credentials::Direct(config) => self.stream_direct(config, &request).await,
        }

        self.finish();
    }

    /// One request, one write.
    async fn fetch_via_proxy(&self, config: &ProxyConfig, request: &LlmRequest) {
        match self.store.llm().complete_via_proxy(config, request).await {
            Ok(reply) => {
                let mut conv = self.store.lock();
                if conv.is_current(self.exchange) {
                    conv.set_placeholder(reply.into_text());
                }
            }
            Err(e) => {
                tracing::warn!(
                    exchange = self.exchange,
                    kind = ?e.kind,
                    error = %e,
                    "Proxy fetch failed"
                );
                let mut conv = self.store.lock();
                if conv.is_current(self.exchange) {
                    conv.record_error(e.message.clone(), e.message);
                }
            }
        }
    }

    /// Append fragments as they arrive, then settle on the provider's final text.
    async fn stream_direct(&self, config: &DirectConfig, request: &LlmRequest) {
        let mut stream = match self.store.llm().stream(config, request).await {
            Ok(stream) => stream,
            Err(e) => {
                self.record_direct_error(&e);
                return;
            }
        };

        let mut fragments = 0usize;
        while let Some(item) = stream.next_text().await {
            match item {
                Ok(text) => {
                    let mut conv = self.store.lock();
                    if !conv.is_current(self.exchange) || !conv.is_streaming {
                        tracing::info!(exchange = self.exchange, fragments, "Stream abandoned");
                        return;
                    }
                    conv.append_to_placeholder(&text);
                    fragments += 1;
                }
                Err(e) => {
                    self.record_direct_error(&e);
                    return;
                }
            }
        }

        let final_text = stream.final_text();
        let mut conv = self.store.lock();
        if conv.is_current(self.exchange) && conv.is_streaming {
            conv.set_placeholder(final_text);
        }
        tracing::debug!(exchange = self.exchange, fragments, "Stream complete");
    }

    fn record_direct_error(&self, error: &LlmError) {
        let (reply, message) = if error.is_provider_error() {
            let detail = format!("Anthropic API Error: {}", error.message);
            (format!("Sorry, I encountered an error. {detail}"), detail)
        } else {
            (
                format!("An unexpected error occurred: {}", error.message),
                error.message.clone(),
            )
        };
        tracing::warn!(
            exchange = self.exchange,
            kind = ?error.kind,
            error = %error,
            "Stream failed"
        );

        let mut conv = self.store.lock();
        if conv.is_current(self.exchange) {
            conv.record_error(reply, message);
        }
    }

    fn finish_with_error(&self, reply: String, error: String) {
        let mut conv = self.store.lock();
        if conv.is_current(self.exchange) {
            conv.record_error(reply, error);
            conv.finish_streaming();
        }
    }

    fn finish(&self) {
        let mut conv = self.store.lock();
        if conv.is_current(self.exchange) {
            conv.finish_streaming();
        }
    }
}
