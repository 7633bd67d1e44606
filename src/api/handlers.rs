//! HTTP request handlers

use super::sse::sse_stream;
use super::types::{
    CancelResponse, ClearResponse, ConversationResponse, ErrorResponse, ModelInfo,
    ModelsResponse, PromptRequest, SelectModelRequest, SendResponse, SuggestionRequest,
};
use super::AppState;
use crate::llm::ChatModel;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Conversation state
        .route("/api/chat", get(get_conversation))
        .route("/api/chat/stream", get(stream_conversation))
        // User actions
        .route("/api/chat/start", post(start_chat))
        .route("/api/chat/send", post(send_chat))
        .route("/api/chat/suggestion", post(submit_suggestion))
        .route("/api/chat/clear", post(clear_chat))
        .route("/api/chat/cancel", post(cancel_chat))
        // Model selection
        .route("/api/models", get(list_models))
        .route("/api/models/select", post(select_model))
        // Version
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Conversation State
// ============================================================

async fn get_conversation(State(state): State<AppState>) -> Json<ConversationResponse> {
    Json(ConversationResponse {
        conversation: state.store.snapshot(),
    })
}

async fn stream_conversation(State(state): State<AppState>) -> impl IntoResponse {
    // Subscribe before the snapshot is taken so nothing falls between the two
    let rx = state.store.subscribe();
    sse_stream(state.store, rx)
}

// ============================================================
// User Actions
// ============================================================

async fn start_chat(
    State(state): State<AppState>,
    body: Result<Json<PromptRequest>, JsonRejection>,
) -> Result<Json<SendResponse>, AppError> {
    let Json(req) = body?;
    Ok(Json(state.store.send_initial_message(&req.prompt).into()))
}

async fn send_chat(
    State(state): State<AppState>,
    body: Result<Json<PromptRequest>, JsonRejection>,
) -> Result<Json<SendResponse>, AppError> {
    let Json(req) = body?;
    Ok(Json(state.store.send_message(&req.prompt).into()))
}

async fn submit_suggestion(
    State(state): State<AppState>,
    body: Result<Json<SuggestionRequest>, JsonRejection>,
) -> Result<Json<SendResponse>, AppError> {
    let Json(req) = body?;
    Ok(Json(state.store.submit_suggestion(&req.suggestion).into()))
}

async fn clear_chat(State(state): State<AppState>) -> Json<ClearResponse> {
    let view = state.store.clear_and_return_home();
    Json(ClearResponse {
        redirect: view.path().to_string(),
    })
}

async fn cancel_chat(State(state): State<AppState>) -> Json<CancelResponse> {
    Json(CancelResponse {
        cancelled: state.store.cancel(),
    })
}

// ============================================================
// Model Selection
// ============================================================

async fn list_models(State(state): State<AppState>) -> Json<ModelsResponse> {
    Json(ModelsResponse {
        models: ChatModel::ALL.into_iter().map(ModelInfo::from).collect(),
        default: ChatModel::default().display_name().to_string(),
        selected: state.store.snapshot().selected_model,
    })
}

async fn select_model(
    State(state): State<AppState>,
    body: Result<Json<SelectModelRequest>, JsonRejection>,
) -> Result<Json<ModelsResponse>, AppError> {
    let Json(req) = body?;
    state.store.select_model(&req.model);
    Ok(list_models(State(state)).await)
}

// ============================================================
// Version
// ============================================================

async fn get_version() -> &'static str {
    concat!("claude-lite ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

enum AppError {
    BadRequest(String),
    Unprocessable(String),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::UNPROCESSABLE_ENTITY {
            AppError::Unprocessable(rejection.body_text())
        } else {
            AppError::BadRequest(rejection.body_text())
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Unprocessable(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
