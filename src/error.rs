//! HTTP-facing error type.
//!
//! Every failure leaves the service as the JSON envelope
//! `{"success": false, "message": ...}` with a matching status code.

use std::any::Any;

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::records::{RegistrationError, StoreError};
use crate::routes::ApiResponse;

/// Message returned for a missing or wrong shared secret
pub const UNAUTHORIZED_MESSAGE: &str = "API Key inválida o faltante";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{}", UNAUTHORIZED_MESSAGE)]
    Unauthorized,

    /// Request body could not be decoded into the expected shape.
    #[error("{message}")]
    InvalidBody { status: StatusCode, message: String },

    #[error("Error interno: {0}")]
    Store(#[from] StoreError),

    #[error("Error interno: {0}")]
    Internal(String),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidBody {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<RegistrationError> for AppError {
    fn from(err: RegistrationError) -> Self {
        match err {
            RegistrationError::Store(e) => AppError::Store(e),
            conflict => AppError::Internal(format!("unhandled registration conflict: {}", conflict)),
        }
    }
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::InvalidBody { status, .. } => *status,
            AppError::Store(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            AppError::Store(_) | AppError::Internal(_) => {
                tracing::error!("Internal error: {:?}", self);
            }
            AppError::InvalidBody { .. } => {
                tracing::debug!(status = status.as_u16(), error = %self, "Rejected request body");
            }
            AppError::Unauthorized => {
                tracing::warn!("Rejected request without valid API key");
            }
        }

        (status, Json(ApiResponse::failure(self.to_string()))).into_response()
    }
}

/// Response for a handler that panicked.
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };

    AppError::Internal(detail).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_unauthorized_envelope() {
        let response = AppError::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "success": false, "message": "API Key inválida o faltante" })
        );
    }

    #[tokio::test]
    async fn test_internal_envelope() {
        let response = AppError::Internal("boom".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Error interno: boom");
    }

    #[tokio::test]
    async fn test_panic_response_uses_message() {
        let response = panic_response(Box::new("exploded"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await["message"], "Error interno: exploded");
    }
}
