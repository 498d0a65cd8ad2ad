//! Error types for the gateway.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

/// Gateway error taxonomy.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Recipient not registered: {0}")]
    RecipientUnknown(String),

    #[error("Media error: {0}")]
    Media(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            GatewayError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            GatewayError::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            GatewayError::SessionNotFound(_) => (StatusCode::NOT_FOUND, "SESSION_NOT_FOUND"),
            GatewayError::RecipientUnknown(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "RECIPIENT_UNKNOWN")
            }
            GatewayError::Media(_) => (StatusCode::UNPROCESSABLE_ENTITY, "MEDIA_ERROR"),
            GatewayError::Transport(_) => (StatusCode::BAD_GATEWAY, "TRANSPORT_ERROR"),
            GatewayError::RateLimitExceeded => {
                (StatusCode::TOO_MANY_REQUESTS, "RATE_LIMIT_EXCEEDED")
            }
            GatewayError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let body = ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<bridge_client::BridgeError> for GatewayError {
    fn from(e: bridge_client::BridgeError) -> Self {
        GatewayError::Transport(e.to_string())
    }
}

impl From<send_log::LogError> for GatewayError {
    fn from(e: send_log::LogError) -> Self {
        GatewayError::Internal(e.to_string())
    }
}
