//! HTTP API for the chat client

mod handlers;
mod sse;
mod types;

pub use handlers::create_router;

use crate::chat::ConversationStore;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: ConversationStore,
}

impl AppState {
    pub fn new(store: ConversationStore) -> Self {
        Self { store }
    }
}
