//! Bridge HTTP client.

use crate::error::BridgeError;
use crate::types::*;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use urlencoding::encode;

/// Messaging bridge REST API client.
///
/// One instance serves every session; the session id is a path segment on
/// each call.
#[derive(Clone)]
pub struct BridgeClient {
    client: Client,
    base_url: String,
}

impl BridgeClient {
    /// Create a new bridge client.
    pub fn new(base_url: impl Into<String>) -> Result<Self, BridgeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Check if the bridge is healthy.
    pub async fn health_check(&self) -> bool {
        self.client
            .get(format!("{}/v1/health", self.base_url))
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    /// Start (or restore) a session's connect and pairing flow.
    #[instrument(skip(self))]
    pub async fn start_session(&self, session_id: &str) -> Result<(), BridgeError> {
        let response = self
            .client
            .post(format!(
                "{}/v1/sessions/{}/start",
                self.base_url,
                encode(session_id)
            ))
            .send()
            .await?;

        if !response.status().is_success() {
            let msg = response.text().await.unwrap_or_default();
            return Err(BridgeError::Api(msg));
        }

        debug!(session_id = %session_id, "Session start requested");
        Ok(())
    }

    /// Fetch the current connection status of a session.
    pub async fn session_status(&self, session_id: &str) -> Result<SessionStatus, BridgeError> {
        let response = self
            .client
            .get(format!(
                "{}/v1/sessions/{}/status",
                self.base_url,
                encode(session_id)
            ))
            .send()
            .await?;

        if !response.status().is_success() {
            let msg = response.text().await.unwrap_or_default();
            return Err(BridgeError::Api(msg));
        }

        Ok(response.json().await?)
    }

    /// Check whether an address belongs to a registered user.
    #[instrument(skip(self))]
    pub async fn is_registered_user(
        &self,
        session_id: &str,
        address: &str,
    ) -> Result<bool, BridgeError> {
        let response = self
            .client
            .get(format!(
                "{}/v1/sessions/{}/exists/{}",
                self.base_url,
                encode(session_id),
                encode(address)
            ))
            .send()
            .await?;

        if !response.status().is_success() {
            let msg = response.text().await.unwrap_or_default();
            return Err(BridgeError::Api(msg));
        }

        let exists: ExistsResponse = response.json().await?;
        Ok(exists.number_exists)
    }

    /// Send a text message.
    #[instrument(skip(self, body))]
    pub async fn send_text(
        &self,
        session_id: &str,
        to: &str,
        body: &str,
    ) -> Result<MessageReceipt, BridgeError> {
        let request = SendTextRequest {
            to: to.to_string(),
            body: body.to_string(),
        };

        let response = self
            .client
            .post(format!(
                "{}/v1/sessions/{}/send",
                self.base_url,
                encode(session_id)
            ))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let msg = response.text().await.unwrap_or_default();
            warn!(session_id = %session_id, "Send failed: {}", msg);
            return Err(BridgeError::SendFailed(msg));
        }

        let receipt: MessageReceipt = response.json().await?;
        debug!(session_id = %session_id, to = %to, message_id = %receipt.message_id, "Sent text");
        Ok(receipt)
    }

    /// Send a media attachment with an optional caption.
    #[instrument(skip(self, request))]
    pub async fn send_media(
        &self,
        session_id: &str,
        request: &SendMediaRequest,
    ) -> Result<MessageReceipt, BridgeError> {
        let response = self
            .client
            .post(format!(
                "{}/v1/sessions/{}/send-media",
                self.base_url,
                encode(session_id)
            ))
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let msg = response.text().await.unwrap_or_default();
            warn!(session_id = %session_id, "Media send failed: {}", msg);
            return Err(BridgeError::SendFailed(msg));
        }

        let receipt: MessageReceipt = response.json().await?;
        debug!(session_id = %session_id, message_id = %receipt.message_id, "Sent media");
        Ok(receipt)
    }
}
