//! Bridge REST API wire types.

use crate::state::ClientState;
use serde::{Deserialize, Serialize};

/// Session status as reported by the bridge.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionStatus {
    pub state: String,
    #[serde(rename = "qrCode")]
    pub qr_code: Option<String>,
}

impl SessionStatus {
    /// Map the bridge's state string onto the client state machine.
    ///
    /// Returns `None` for state strings this client does not know, so the
    /// poll loop can skip them instead of guessing.
    pub fn to_client_state(&self) -> Option<ClientState> {
        let state = match self.state.as_str() {
            "STARTING" => ClientState::Uninitialized,
            "SCAN_QR_CODE" => ClientState::Pairing {
                qr: self.qr_code.clone().unwrap_or_default(),
            },
            "AUTHENTICATED" => ClientState::Authenticated,
            "CONNECTED" => ClientState::Ready,
            "AUTH_FAILURE" => ClientState::Failed,
            "DISCONNECTED" => ClientState::Disconnected,
            _ => return None,
        };
        Some(state)
    }
}

/// Outgoing text message request.
#[derive(Debug, Clone, Serialize)]
pub struct SendTextRequest {
    pub to: String,
    pub body: String,
}

/// Outgoing media message request. `data` is base64-encoded bytes.
#[derive(Debug, Clone, Serialize)]
pub struct SendMediaRequest {
    pub to: String,
    pub data: String,
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    #[serde(rename = "fileName")]
    pub file_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

/// Bridge acknowledgement of an accepted send.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageReceipt {
    #[serde(rename = "messageId")]
    pub message_id: String,
}

/// Recipient lookup response.
#[derive(Debug, Clone, Deserialize)]
pub struct ExistsResponse {
    #[serde(rename = "numberExists")]
    pub number_exists: bool,
}
