//! API request and response types.

use bridge_client::ClientState;
use send_log::SendAttempt;
use serde::{Deserialize, Serialize};

/// Request to send a text message.
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    /// Session to send through; the configured default when absent
    pub session_id: Option<String>,

    /// Raw recipient phone number
    pub phone: Option<String>,

    /// Message body
    pub message: Option<String>,

    /// Shared secret, required when auth is configured
    pub key: Option<String>,
}

/// Request to send a media message. Exactly one of `media_url`,
/// `media_path`, `file_data` carries the payload.
#[derive(Debug, Deserialize)]
pub struct SendMediaRequest {
    pub session_id: Option<String>,
    pub phone: Option<String>,

    /// Remote URL to fetch
    pub media_url: Option<String>,

    /// Local path readable by the gateway process
    pub media_path: Option<String>,

    /// Inline base64 payload
    pub file_data: Option<String>,

    /// Mime type for `file_data`
    pub mime_type: Option<String>,

    /// Filename for `file_data`
    pub file_name: Option<String>,

    pub caption: Option<String>,

    pub key: Option<String>,
}

/// Session status response.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub session_id: String,
    #[serde(flatten)]
    pub state: ClientState,
}

/// Full send-attempt log.
#[derive(Debug, Serialize)]
pub struct AttemptsResponse {
    pub attempts: Vec<SendAttempt>,
    pub total: usize,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub session_count: usize,
    pub bridge_healthy: bool,
}
