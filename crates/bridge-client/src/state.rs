//! Per-session connection state machine.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Connection state of one session's transport client.
///
/// Transitions are driven by the bridge status poll loop and published on
/// the session's watch channel plus the shared event channel. Send
/// operations are only permitted in [`ClientState::Ready`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ClientState {
    /// Connect initiated, nothing heard from the bridge yet.
    Uninitialized,
    /// Bridge produced a pairing code for out-of-band scanning.
    Pairing { qr: String },
    /// Credentials accepted, handshake still in progress.
    Authenticated,
    /// Fully connected, sends permitted.
    Ready,
    /// Credential rejection. Terminal for this connect attempt.
    Failed,
    /// Transport-level drop after being ready. Sends fail fast.
    Disconnected,
}

impl ClientState {
    pub fn is_ready(&self) -> bool {
        matches!(self, ClientState::Ready)
    }

    /// Short name used in logs and status responses.
    pub fn label(&self) -> &'static str {
        match self {
            ClientState::Uninitialized => "uninitialized",
            ClientState::Pairing { .. } => "pairing",
            ClientState::Authenticated => "authenticated",
            ClientState::Ready => "ready",
            ClientState::Failed => "failed",
            ClientState::Disconnected => "disconnected",
        }
    }
}

/// A single state transition, as broadcast to status-surface subscribers.
#[derive(Debug, Clone, Serialize)]
pub struct StateEvent {
    pub session_id: String,
    #[serde(flatten)]
    pub state: ClientState,
    pub at: DateTime<Utc>,
}

impl StateEvent {
    pub fn new(session_id: impl Into<String>, state: ClientState) -> Self {
        Self {
            session_id: session_id.into(),
            state,
            at: Utc::now(),
        }
    }
}
