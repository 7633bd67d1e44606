//! OpenRouter integration.
//!
//! OpenRouter exposes an OpenAI-compatible chat completions API, with provider
//! routing via model name prefixes (e.g. "anthropic/claude-3-haiku"). Requests
//! are sent without streaming; the whole answer arrives in one JSON body.

use super::models::proxy_model_id;
use super::types::{LlmMessage, LlmRequest, ProxyReply};
use super::{LlmError, ProxyConfig};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

/// Default limit on a proxy round trip
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// How much of an unparseable body to quote back
const BODY_PREVIEW_CHARS: usize = 200;

/// OpenRouter service
pub struct OpenRouterService {
    client: reqwest::Client,
    config: ProxyConfig,
}

impl OpenRouterService {
    pub fn new(client: reqwest::Client, config: &ProxyConfig) -> Self {
        Self {
            client,
            config: config.clone(),
        }
    }

    /// Translate our internal request to the proxy's body
    fn translate_request(request: &LlmRequest) -> OpenRouterRequest<'_> {
        OpenRouterRequest {
            model: proxy_model_id(&request.model),
            messages: &request.messages,
        }
    }

    /// Interpret a successful response body.
    fn parse_reply(body: &str) -> Result<ProxyReply, LlmError> {
        let value: Value = serde_json::from_str(body).map_err(|_| {
            let preview: String = body.chars().take(BODY_PREVIEW_CHARS).collect();
            LlmError::invalid_response(format!(
                "OpenRouter error: Invalid JSON from OpenRouter: {preview}"
            ))
        })?;

        let first_choice = value
            .get("choices")
            .and_then(Value::as_array)
            .and_then(|choices| choices.first());

        if let Some(choice) = first_choice {
            let content = choice
                .pointer("/message/content")
                .and_then(Value::as_str)
                .unwrap_or_default();
            return Ok(ProxyReply::Answer(content.to_string()));
        }

        let message = value
            .pointer("/error/message")
            .and_then(Value::as_str)
            .unwrap_or("Unknown error");
        Ok(ProxyReply::ProviderError(message.to_string()))
    }

    /// Issue exactly one completion request.
    pub async fn complete(&self, request: &LlmRequest) -> Result<ProxyReply, LlmError> {
        let body = Self::translate_request(request);

        let mut builder = self
            .client
            .post(&self.config.url)
            .timeout(self.config.timeout)
            .header(AUTHORIZATION, format!("Bearer {}", self.config.api_key))
            .header(CONTENT_TYPE, "application/json");
        if let Some(referer) = &self.config.referer {
            builder = builder.header("HTTP-Referer", referer);
        }
        if let Some(title) = &self.config.title {
            builder = builder.header("X-Title", title);
        }

        let response = builder
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::network(format!("OpenRouter network error: {e}")))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| LlmError::network(format!("OpenRouter network error: {e}")))?;

        if !status.is_success() {
            return Err(LlmError::http(format!(
                "OpenRouter HTTP error {}: {}",
                status.as_u16(),
                text
            )));
        }

        Self::parse_reply(&text)
    }
}

#[derive(Debug, Serialize)]
struct OpenRouterRequest<'a> {
    model: String,
    messages: &'a [LlmMessage],
}
