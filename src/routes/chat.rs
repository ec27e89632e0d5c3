//! Question endpoint backed by the chat-completion API.
//!
//! The current records are rendered into the system instruction on every
//! request. A failed completion is not an HTTP error: its message becomes the
//! reply text.

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::completion::system_prompt;
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
}

#[instrument(name = "chat::chat", skip(state, payload))]
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    let Json(req) = payload?;

    let system = system_prompt(&state.records.render_for_prompt().await);

    let response = match state.completer.complete(&system, &req.message).await {
        Ok(text) => text,
        Err(e) => {
            tracing::error!(error = %e, "Chat completion failed");
            e.to_string()
        }
    };

    Ok(Json(ChatResponse { response }))
}
