//! Claude Lite - minimal web chat client
//!
//! One in-memory conversation, answered by Anthropic's streaming API or by
//! OpenRouter, exposed as a JSON + SSE API.

mod api;
mod chat;
mod llm;

use api::{create_router, AppState};
use chat::{ConversationStore, EnvCredentials};
use dotenv::dotenv;
use llm::{HttpCompletionService, LlmConfig, LoggingService};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env is fine
    dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "claude_lite=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    let port: u16 = std::env::var("CLAUDE_LITE_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8000);

    // Keys are re-read on every fetch; this only reports the startup state
    match LlmConfig::from_env().credentials() {
        Some(credentials) => tracing::info!(mode = credentials.mode(), "LLM credentials found"),
        None => tracing::warn!(
            "No LLM API keys configured. Set ANTHROPIC_API_KEY or OPENROUTER_API_KEY."
        ),
    }

    let llm = Arc::new(LoggingService::new(Arc::new(HttpCompletionService::new())));
    let store = ConversationStore::new(llm, Arc::new(EnvCredentials));
    let state = AppState::new(store);

    // Create router
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let compression = CompressionLayer::new()
        .gzip(true)
        .br(true)
        .deflate(true)
        .zstd(true);

    let app = create_router(state)
        .layer(cors)
        .layer(compression)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Claude Lite server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
