//! Anthropic Claude provider implementation
//!
//! Direct mode talks to the Messages API with `stream: true` and surfaces the
//! text deltas as they arrive.

use super::stream::{SseDecoder, SseFrame};
use super::types::{LlmMessage, LlmRequest};
use super::{DirectConfig, LlmError, TextStream};
use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, VecDeque};

/// Output cap applied when a request does not carry its own
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

const API_VERSION: &str = "2023-06-01";

/// Anthropic service implementation
pub struct AnthropicService {
    client: Client,
    api_key: String,
    base_url: String,
}

impl AnthropicService {
    pub fn new(client: Client, config: &DirectConfig) -> Self {
        Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.url.clone(),
        }
    }

    fn translate_request(request: &LlmRequest) -> AnthropicRequest<'_> {
        AnthropicRequest {
            model: &request.model,
            max_tokens: request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            messages: &request.messages,
            stream: true,
        }
    }

    fn classify_error(status: reqwest::StatusCode, body: &str) -> LlmError {
        // Prefer the provider's own explanation over the raw envelope
        let detail = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|v| {
                v.pointer("/error/message")
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .unwrap_or_else(|| body.to_string());

        match status.as_u16() {
            401 | 403 => LlmError::http(format!("Authentication failed ({status}): {detail}")),
            429 => LlmError::http(format!("Rate limited ({status}): {detail}")),
            _ => LlmError::http(format!("HTTP {status}: {detail}")),
        }
    }

    /// Open a streaming completion.
    pub async fn stream(&self, request: &LlmRequest) -> Result<AnthropicStream, LlmError> {
        let anthropic_request = Self::translate_request(request);

        let response = self
            .client
            .post(&self.base_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .json(&anthropic_request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::network(format!("Request timeout: {e}"))
                } else if e.is_connect() {
                    LlmError::network(format!("Connection failed: {e}"))
                } else {
                    LlmError::network(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("(no body)"));
            return Err(Self::classify_error(status, &body));
        }

        let body = response
            .bytes_stream()
            .map(|chunk| {
                chunk
                    .map(|bytes| bytes.to_vec())
                    .map_err(|e| LlmError::network(format!("Stream interrupted: {e}")))
            })
            .boxed();

        Ok(AnthropicStream::new(body))
    }
}

/// Text deltas of one streaming response.
///
/// Besides handing out fragments in arrival order, the stream keeps a
/// per-content-block snapshot; `final_text` assembles it in block order.
pub struct AnthropicStream {
    body: BoxStream<'static, Result<Vec<u8>, LlmError>>,
    decoder: SseDecoder,
    pending: VecDeque<Result<String, LlmError>>,
    blocks: BTreeMap<u64, String>,
    finished: bool,
}

impl AnthropicStream {
    pub(crate) fn new(body: BoxStream<'static, Result<Vec<u8>, LlmError>>) -> Self {
        Self {
            body,
            decoder: SseDecoder::new(),
            pending: VecDeque::new(),
            blocks: BTreeMap::new(),
            finished: false,
        }
    }

    fn push_text(&mut self, index: u64, text: &str) {
        self.blocks.entry(index).or_default().push_str(text);
        self.pending.push_back(Ok(text.to_string()));
    }

    fn fail(&mut self, error: LlmError) {
        self.pending.push_back(Err(error));
        self.finished = true;
    }

    fn apply_frame(&mut self, frame: &SseFrame) {
        let value: Value = match serde_json::from_str(&frame.data) {
            Ok(value) => value,
            Err(e) => {
                self.fail(LlmError::invalid_response(format!(
                    "Malformed stream event: {e}"
                )));
                return;
            }
        };

        let event_type = value
            .get("type")
            .and_then(Value::as_str)
            .or(frame.event.as_deref())
            .unwrap_or_default();
        let index = value.get("index").and_then(Value::as_u64).unwrap_or(0);

        match event_type {
            "content_block_start" => {
                let text = value
                    .pointer("/content_block/text")
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                if text.is_empty() {
                    self.blocks.entry(index).or_default();
                } else {
                    self.push_text(index, text);
                }
            }
            "content_block_delta" => {
                let is_text =
                    value.pointer("/delta/type").and_then(Value::as_str) == Some("text_delta");
                if let Some(text) = value.pointer("/delta/text").and_then(Value::as_str) {
                    if is_text && !text.is_empty() {
                        self.push_text(index, text);
                    }
                }
            }
            "message_stop" => self.finished = true,
            "error" => {
                let message = value
                    .pointer("/error/message")
                    .and_then(Value::as_str)
                    .unwrap_or("Unknown error");
                self.fail(LlmError::api(message));
            }
            // message_start, message_delta, content_block_stop, ping
            _ => {}
        }
    }
}

#[async_trait]
impl TextStream for AnthropicStream {
    async fn next_text(&mut self) -> Option<Result<String, LlmError>> {
        loop {
            if let Some(item) = self.pending.pop_front() {
                return Some(item);
            }
            if self.finished {
                return None;
            }
            match self.body.next().await {
                Some(Ok(chunk)) => {
                    for frame in self.decoder.push(&chunk) {
                        if self.finished {
                            break;
                        }
                        self.apply_frame(&frame);
                    }
                }
                Some(Err(e)) => self.fail(e),
                None => self.finished = true,
            }
        }
    }

    fn final_text(&self) -> String {
        self.blocks.values().map(String::as_str).collect()
    }
}

// Anthropic API types

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: &'a [LlmMessage],
    stream: bool,
}
