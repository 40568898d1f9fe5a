//! HTTP request handlers

use super::assets::{get_index_html, serve_static};
use super::sse::sse_stream;
use super::types::{
    ChatRequest, ChatResponse, ErrorResponse, QuickActionRequest, SessionCreatedResponse,
    SessionSnapshotResponse, SuccessResponse,
};
use super::AppState;
use crate::runtime::{Notification, SessionError, SessionHandle};
use crate::session::Event;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Root serves the chat page
        .route("/", get(serve_page))
        // Static assets (embedded or filesystem fallback)
        .route("/assets/*path", get(serve_static))
        // Session lifecycle
        .route("/api/sessions/new", post(create_session))
        .route("/api/sessions/:id", get(get_session))
        .route("/api/sessions/:id/end", post(end_session))
        // SSE streaming
        .route("/api/sessions/:id/stream", get(stream_session))
        // User actions
        .route("/api/sessions/:id/chat", post(send_chat))
        .route("/api/sessions/:id/quick-action", post(quick_action))
        .route("/api/sessions/:id/reset", post(reset_session))
        // Version
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Chat Page
// ============================================================

/// Serve the embedded chat page
async fn serve_page() -> impl IntoResponse {
    match get_index_html() {
        Some(content) => Html(content).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Html("<h1>404 - chat page missing from build</h1>".to_string()),
        )
            .into_response(),
    }
}

// ============================================================
// Session Lifecycle
// ============================================================

async fn create_session(State(state): State<AppState>) -> Json<SessionCreatedResponse> {
    let handle = state.sessions.create_session().await;
    let transcript = handle.transcript.snapshot().await;

    Json(SessionCreatedResponse {
        session: session_json(&handle),
        transcript: serde_json::to_value(&transcript).unwrap_or(Value::Null),
    })
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionSnapshotResponse>, AppError> {
    let handle = state.sessions.get(&id).await?;
    let transcript = handle.transcript.snapshot().await;

    Ok(Json(SessionSnapshotResponse {
        session: session_json(&handle),
        transcript: serde_json::to_value(&transcript).unwrap_or(Value::Null),
        typing: handle.is_typing(),
    }))
}

async fn end_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    state.sessions.end_session(&id).await?;
    Ok(Json(SuccessResponse { success: true }))
}

// ============================================================
// SSE Streaming
// ============================================================

async fn stream_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let handle = state.sessions.get(&id).await?;
    let broadcast_rx = handle.broadcast_tx.subscribe();

    // Snapshot after subscribing so the init event never misses a turn
    let transcript = handle.transcript.snapshot().await;
    let init_event = Notification::Init {
        session: session_json(&handle),
        transcript: serde_json::to_value(&transcript).unwrap_or(Value::Null),
        typing: handle.is_typing(),
    };

    Ok(sse_stream(init_event, broadcast_rx))
}

// ============================================================
// User Actions
// ============================================================

async fn send_chat(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    state
        .sessions
        .send_event(&id, Event::Submit { text: req.text })
        .await?;

    Ok(Json(ChatResponse { queued: true }))
}

async fn quick_action(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<QuickActionRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    state
        .sessions
        .send_event(
            &id,
            Event::SelectQuickAction {
                action: req.action,
            },
        )
        .await?;

    Ok(Json(ChatResponse { queued: true }))
}

async fn reset_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    state.sessions.send_event(&id, Event::Reset).await?;
    Ok(Json(SuccessResponse { success: true }))
}

// ============================================================
// Version
// ============================================================

async fn get_version() -> &'static str {
    concat!("deskbot ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Helpers
// ============================================================

fn session_json(handle: &SessionHandle) -> Value {
    serde_json::to_value(handle.context.as_ref()).unwrap_or(Value::Null)
}

// ============================================================
// Error Handling
// ============================================================

enum AppError {
    NotFound(String),
    Internal(String),
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::NotFound(_) => AppError::NotFound(err.to_string()),
            SessionError::Closed(_) => AppError::Internal(err.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
