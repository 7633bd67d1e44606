//! Conversation store
//!
//! Holds the single conversation of this process, serializes every mutation
//! behind one mutex, and broadcasts each change to subscribers (the SSE feed).
//! Sends are validated and recorded synchronously; the answer is fetched by a
//! spawned [`ResponseFetcher`].

mod fetcher;
mod state;
pub mod traits;

#[cfg(test)]
mod proptests;
#[cfg(test)]
pub mod testing;

pub use fetcher::ResponseFetcher;
pub use state::{Conversation, Message};
pub use traits::*;

use crate::llm::CompletionService;
use serde::Serialize;
use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// Shown when a send is attempted with nothing to send
pub const EMPTY_PROMPT_NOTICE: &str = "Please enter a message.";

/// How long a notice stays on screen
pub const NOTICE_DURATION: Duration = Duration::from_millis(3000);

const EVENT_CAPACITY: usize = 256;

/// Page the client should navigate to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    Home,
    Chat,
}

impl View {
    pub fn path(self) -> &'static str {
        match self {
            View::Home => "/",
            View::Chat => "/chat",
        }
    }
}

/// Transient user-facing message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub message: String,
    pub duration_ms: u64,
}

impl Notice {
    pub fn empty_prompt() -> Self {
        Self {
            message: EMPTY_PROMPT_NOTICE.to_string(),
            duration_ms: u64::try_from(NOTICE_DURATION.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

/// Result of a send attempt
#[derive(Debug)]
pub enum SendOutcome {
    /// Messages appended and a fetch spawned. Dropping `fetch` detaches it.
    Started {
        navigate_to: Option<View>,
        fetch: JoinHandle<()>,
    },
    /// Prompt was blank; nothing changed
    EmptyPrompt(Notice),
    /// A fetch is already in flight; nothing changed
    Busy,
}

/// Change notifications, emitted in mutation order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    /// Message log replaced (send or clear)
    Messages { messages: Vec<Message> },
    /// Text appended to the message at `index`
    Delta { index: usize, text: String },
    /// Content of the message at `index` overwritten
    Content { index: usize, content: String },
    StreamingChanged {
        is_streaming: bool,
        error_message: String,
    },
    ModelChanged { selected_model: String },
    Notice(Notice),
}

/// Handle to the shared conversation
#[derive(Clone)]
pub struct ConversationStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    state: Mutex<Conversation>,
    events: broadcast::Sender<ChatEvent>,
    llm: Arc<dyn CompletionService>,
    credentials: Arc<dyn CredentialSource>,
}

impl ConversationStore {
    pub fn new(llm: Arc<dyn CompletionService>, credentials: Arc<dyn CredentialSource>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(StoreInner {
                state: Mutex::new(Conversation::default()),
                events,
                llm,
                credentials,
            }),
        }
    }

    /// Exclusive access to the conversation. Never hold across an await.
    pub fn lock(&self) -> ConversationGuard<'_> {
        ConversationGuard {
            conversation: self
                .inner
                .state
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
            events: &self.inner.events,
        }
    }

    pub fn snapshot(&self) -> Conversation {
        self.lock().clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChatEvent> {
        self.inner.events.subscribe()
    }

    pub(crate) fn llm(&self) -> Arc<dyn CompletionService> {
        self.inner.llm.clone()
    }

    pub(crate) fn credentials(&self) -> Arc<dyn CredentialSource> {
        self.inner.credentials.clone()
    }

    /// Forget the conversation and go back to the landing page.
    pub fn clear_and_return_home(&self) -> View {
        let mut conv = self.lock();
        let was_streaming = conv.is_streaming;
        conv.reset();
        conv.emit(ChatEvent::Messages {
            messages: Vec::new(),
        });
        conv.emit_streaming();
        tracing::info!(was_streaming, "Conversation cleared");
        View::Home
    }

    /// Turn a suggestion chip into a prompt and start a new conversation with it.
    pub fn submit_suggestion(&self, suggestion: &str) -> SendOutcome {
        let prompt = format!("Help me {}", suggestion.to_lowercase());
        self.send_initial_message(&prompt)
    }

    /// Start a new conversation from the landing page.
    pub fn send_initial_message(&self, prompt: &str) -> SendOutcome {
        self.send(prompt, true)
    }

    /// Continue the current conversation.
    pub fn send_message(&self, prompt: &str) -> SendOutcome {
        self.send(prompt, false)
    }

    fn send(&self, prompt: &str, fresh: bool) -> SendOutcome {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            let notice = Notice::empty_prompt();
            let _ = self.inner.events.send(ChatEvent::Notice(notice.clone()));
            return SendOutcome::EmptyPrompt(notice);
        }

        let exchange = {
            let mut conv = self.lock();
            if conv.is_streaming {
                tracing::debug!("Send ignored, response still streaming");
                return SendOutcome::Busy;
            }
            if fresh {
                conv.messages.clear();
            }
            conv.begin_exchange(prompt);
            let messages = conv.messages.clone();
            conv.emit(ChatEvent::Messages { messages });
            conv.emit_streaming();
            conv.exchange()
        };

        tracing::info!(exchange, fresh, chars = prompt.chars().count(), "Prompt accepted");
        let fetch = tokio::spawn(ResponseFetcher::new(self.clone(), exchange).run());

        SendOutcome::Started {
            navigate_to: fresh.then_some(View::Chat),
            fetch,
        }
    }

    /// Stop consuming the current stream. Returns whether a fetch was running.
    ///
    /// Advisory only: the fetcher notices between fragments, and a proxy
    /// request already on the wire still completes.
    pub fn cancel(&self) -> bool {
        let mut conv = self.lock();
        if !conv.is_streaming {
            return false;
        }
        conv.is_streaming = false;
        conv.emit_streaming();
        tracing::info!(exchange = conv.exchange(), "Streaming cancelled");
        true
    }

    pub fn select_model(&self, name: &str) {
        let mut conv = self.lock();
        conv.selected_model = name.to_string();
        conv.emit(ChatEvent::ModelChanged {
            selected_model: name.to_string(),
        });
    }
}

/// Locked conversation; mutations made through it are broadcast before the
/// lock is released.
pub struct ConversationGuard<'a> {
    conversation: MutexGuard<'a, Conversation>,
    events: &'a broadcast::Sender<ChatEvent>,
}

impl ConversationGuard<'_> {
    fn emit(&self, event: ChatEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    fn emit_streaming(&self) {
        self.emit(ChatEvent::StreamingChanged {
            is_streaming: self.conversation.is_streaming,
            error_message: self.conversation.error_message.clone(),
        });
    }

    pub fn append_to_placeholder(&mut self, text: &str) {
        if let Some(index) = self.conversation.placeholder_index() {
            self.conversation.messages[index].content.push_str(text);
            self.emit(ChatEvent::Delta {
                index,
                text: text.to_string(),
            });
        }
    }

    pub fn set_placeholder(&mut self, content: String) {
        if let Some(index) = self.conversation.placeholder_index() {
            self.conversation.messages[index].content.clone_from(&content);
            self.emit(ChatEvent::Content { index, content });
        }
    }

    /// Put an error in place of the answer
    pub fn record_error(&mut self, reply: String, error: String) {
        self.set_placeholder(reply);
        self.conversation.error_message = error;
    }

    pub fn finish_streaming(&mut self) {
        self.conversation.is_streaming = false;
        self.emit_streaming();
    }
}

impl Deref for ConversationGuard<'_> {
    type Target = Conversation;

    fn deref(&self) -> &Conversation {
        &self.conversation
    }
}

impl DerefMut for ConversationGuard<'_> {
    fn deref_mut(&mut self) -> &mut Conversation {
        &mut self.conversation
    }
}
