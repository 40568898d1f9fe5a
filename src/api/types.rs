//! API request and response types

use crate::session::QuickAction;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request to send a chat message
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub text: String,
}

/// Request to trigger a quick action.
///
/// The action is named by its canonical phrase, e.g. `"create account"`.
#[derive(Debug, Deserialize)]
pub struct QuickActionRequest {
    pub action: QuickAction,
}

/// Response with a freshly created session and its seeded transcript
#[derive(Debug, Serialize)]
pub struct SessionCreatedResponse {
    pub session: Value,
    pub transcript: Value,
}

/// Response with a session snapshot
#[derive(Debug, Serialize)]
pub struct SessionSnapshotResponse {
    pub session: Value,
    pub transcript: Value,
    pub typing: bool,
}

/// Response for chat and quick-action submissions
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub queued: bool,
}

/// Response for lifecycle actions
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
