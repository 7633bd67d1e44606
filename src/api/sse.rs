//! Server-Sent Events feed of conversation changes

use crate::chat::{ChatEvent, Conversation, ConversationStore};
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

/// Snapshot first, then every change as it is broadcast.
///
/// `broadcast_rx` must be subscribed before this is called so nothing falls
/// between the snapshot and the first event. A subscriber that lags behind
/// the channel gets a fresh `init` in place of the events it missed.
pub fn sse_stream(
    store: ConversationStore,
    broadcast_rx: broadcast::Receiver<ChatEvent>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let snapshot = store.snapshot();
    let init = futures::stream::once(async move {
        Ok(to_axum_event("init", init_payload(&snapshot)))
    });

    let broadcasts = BroadcastStream::new(broadcast_rx).map(move |result| match result {
        Ok(event) => {
            let (name, data) = event_payload(event);
            Ok(to_axum_event(name, data))
        }
        Err(BroadcastStreamRecvError::Lagged(missed)) => {
            tracing::debug!(missed, "SSE subscriber lagged, resending snapshot");
            Ok(to_axum_event("init", init_payload(&store.snapshot())))
        }
    });

    Sse::new(init.chain(broadcasts)).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}

fn init_payload(snapshot: &Conversation) -> Value {
    json!({
        "type": "init",
        "conversation": snapshot,
    })
}

/// Event name and JSON body for a change notification
fn event_payload(event: ChatEvent) -> (&'static str, Value) {
    match event {
        ChatEvent::Messages { messages } => (
            "messages",
            json!({
                "type": "messages",
                "messages": messages
            }),
        ),
        ChatEvent::Delta { index, text } => (
            "delta",
            json!({
                "type": "delta",
                "index": index,
                "text": text
            }),
        ),
        ChatEvent::Content { index, content } => (
            "content",
            json!({
                "type": "content",
                "index": index,
                "content": content
            }),
        ),
        ChatEvent::StreamingChanged {
            is_streaming,
            error_message,
        } => (
            "streaming_changed",
            json!({
                "type": "streaming_changed",
                "is_streaming": is_streaming,
                "error_message": error_message
            }),
        ),
        ChatEvent::ModelChanged { selected_model } => (
            "model_changed",
            json!({
                "type": "model_changed",
                "selected_model": selected_model
            }),
        ),
        ChatEvent::Notice(notice) => (
            "notice",
            json!({
                "type": "notice",
                "message": notice.message,
                "duration_ms": notice.duration_ms
            }),
        ),
    }
}

fn to_axum_event(name: &'static str, data: Value) -> Event {
    Event::default().event(name).data(data.to_string())
}
