//! Mock implementations for testing
//!
//! These mocks let the store and fetcher run without network or environment.

use super::ConversationStore;
use crate::llm::{
    CompletionService, DirectConfig, LlmConfig, LlmError, LlmRequest, ProxyConfig, ProxyReply,
    TextStream,
};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, oneshot};

// ============================================================================
// Mock text stream
// ============================================================================

pub type FragmentSender = mpsc::UnboundedSender<Result<String, LlmError>>;

/// Stream fed from a channel; the final text defaults to everything received
pub struct MockTextStream {
    rx: mpsc::UnboundedReceiver<Result<String, LlmError>>,
    received: String,
    final_text: Option<String>,
}

#[async_trait]
impl TextStream for MockTextStream {
    async fn next_text(&mut self) -> Option<Result<String, LlmError>> {
        let item = self.rx.recv().await?;
        if let Ok(text) = &item {
            self.received.push_str(text);
        }
        Some(item)
    }

    fn final_text(&self) -> String {
        self.final_text
            .clone()
            .unwrap_or_else(|| self.received.clone())
    }
}

enum QueuedStream {
    Ready(MockTextStream),
    Failed(LlmError),
}

pub type ProxyReplySender = oneshot::Sender<Result<ProxyReply, LlmError>>;

enum QueuedReply {
    Ready(Result<ProxyReply, LlmError>),
    Pending(oneshot::Receiver<Result<ProxyReply, LlmError>>),
}

// ============================================================================
// Mock completion service
// ============================================================================

/// Completion service returning queued streams and proxy replies in order
#[allow(dead_code)]
pub struct MockCompletionService {
    streams: Mutex<VecDeque<QueuedStream>>,
    proxy_replies: Mutex<VecDeque<QueuedReply>>,
    stream_requests: Mutex<Vec<LlmRequest>>,
    proxy_requests: Mutex<Vec<LlmRequest>>,
}

#[allow(dead_code)]
impl MockCompletionService {
    pub fn new() -> Self {
        Self {
            streams: Mutex::new(VecDeque::new()),
            proxy_replies: Mutex::new(VecDeque::new()),
            stream_requests: Mutex::new(Vec::new()),
            proxy_requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a stream that yields `fragments` and then completes
    pub fn queue_stream(&self, fragments: &[&str]) {
        self.push_stream(fragments, None);
    }

    /// Like [`queue_stream`](Self::queue_stream) with a provider-assembled
    /// final text that differs from the concatenated fragments
    pub fn queue_stream_with_final(&self, fragments: &[&str], final_text: &str) {
        self.push_stream(fragments, Some(final_text.to_string()));
    }

    /// Queue a stream the test feeds by hand. Dropping the sender ends it.
    pub fn queue_live_stream(&self) -> FragmentSender {
        let (tx, rx) = mpsc::unbounded_channel();
        self.streams
            .lock()
            .unwrap()
            .push_back(QueuedStream::Ready(MockTextStream {
                rx,
                received: String::new(),
                final_text: None,
            }));
        tx
    }

    /// Queue a failure to open the stream
    pub fn queue_stream_error(&self, error: LlmError) {
        self.streams
            .lock()
            .unwrap()
            .push_back(QueuedStream::Failed(error));
    }

    pub fn queue_proxy_reply(&self, reply: Result<ProxyReply, LlmError>) {
        self.proxy_replies
            .lock()
            .unwrap()
            .push_back(QueuedReply::Ready(reply));
    }

    /// Queue a proxy reply the test releases by hand
    pub fn queue_pending_proxy_reply(&self) -> ProxyReplySender {
        let (tx, rx) = oneshot::channel();
        self.proxy_replies
            .lock()
            .unwrap()
            .push_back(QueuedReply::Pending(rx));
        tx
    }

    pub fn stream_requests(&self) -> Vec<LlmRequest> {
        self.stream_requests.lock().unwrap().clone()
    }

    pub fn proxy_requests(&self) -> Vec<LlmRequest> {
        self.proxy_requests.lock().unwrap().clone()
    }

    fn push_stream(&self, fragments: &[&str], final_text: Option<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        for fragment in fragments {
            tx.send(Ok((*fragment).to_string())).unwrap();
        }
        self.streams
            .lock()
            .unwrap()
            .push_back(QueuedStream::Ready(MockTextStream {
                rx,
                received: String::new(),
                final_text,
            }));
    }
}

impl Default for MockCompletionService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompletionService for MockCompletionService {
    async fn stream(
        &self,
        _config: &DirectConfig,
        request: &LlmRequest,
    ) -> Result<Box<dyn TextStream>, LlmError> {
        self.stream_requests.lock().unwrap().push(request.clone());
        match self.streams.lock().unwrap().pop_front() {
            Some(QueuedStream::Ready(stream)) => Ok(Box::new(stream)),
            Some(QueuedStream::Failed(error)) => Err(error),
            None => Err(LlmError::network("No mock stream queued")),
        }
    }

    async fn complete_via_proxy(
        &self,
        _config: &ProxyConfig,
        request: &LlmRequest,
    ) -> Result<ProxyReply, LlmError> {
        self.proxy_requests.lock().unwrap().push(request.clone());
        let queued = self.proxy_replies.lock().unwrap().pop_front();
        match queued {
            Some(QueuedReply::Ready(reply)) => reply,
            Some(QueuedReply::Pending(rx)) => rx
                .await
                .unwrap_or_else(|_| Err(LlmError::network("Mock proxy reply dropped"))),
            None => Err(LlmError::network("No mock proxy reply queued")),
        }
    }
}

// ============================================================================
// Fixtures
// ============================================================================

/// Only the primary provider key is set
pub fn direct_config() -> LlmConfig {
    LlmConfig {
        anthropic_api_key: Some("sk-ant-test".to_string()),
        ..LlmConfig::default()
    }
}

/// Only the proxy key is set
pub fn proxy_config() -> LlmConfig {
    LlmConfig {
        openrouter_api_key: Some("sk-or-test".to_string()),
        ..LlmConfig::default()
    }
}

pub fn store_with(mock: Arc<MockCompletionService>, config: LlmConfig) -> ConversationStore {
    ConversationStore::new(mock, Arc::new(config))
}
