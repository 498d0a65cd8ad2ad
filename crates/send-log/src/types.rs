//! Send-attempt record types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of one dispatch call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Success,
    Failure,
}

/// What was sent, without carrying the payload bytes themselves.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PayloadDescriptor {
    /// Plain text message, body recorded verbatim.
    Text { body: String },
    /// Media fetched from a remote URL.
    MediaUrl { url: String },
    /// Media read from a local path.
    MediaPath { path: String },
    /// Inline base64 upload; only metadata is logged.
    MediaInline { file_name: String, mime_type: String },
}

/// One send attempt. Created once per dispatch call, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendAttempt {
    pub session_id: String,
    pub recipient: String,
    pub payload: PayloadDescriptor,
    pub outcome: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl SendAttempt {
    /// Record a successful send with the transport-assigned message id.
    pub fn success(
        session_id: impl Into<String>,
        recipient: impl Into<String>,
        payload: PayloadDescriptor,
        message_id: impl Into<String>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            recipient: recipient.into(),
            payload,
            outcome: Outcome::Success,
            reason: None,
            message_id: Some(message_id.into()),
            timestamp: Utc::now(),
        }
    }

    /// Record a failed send with the failure reason.
    pub fn failure(
        session_id: impl Into<String>,
        recipient: impl Into<String>,
        payload: PayloadDescriptor,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            recipient: recipient.into(),
            payload,
            outcome: Outcome::Failure,
            reason: Some(reason.into()),
            message_id: None,
            timestamp: Utc::now(),
        }
    }
}
