//! Authenticated root endpoint.

use axum::Json;
use serde_json::{json, Value};

/// Confirms the API is up and the caller's key is accepted.
pub async fn index() -> Json<Value> {
    Json(json!({ "message": "API de Información sobre Víctimas activa" }))
}
