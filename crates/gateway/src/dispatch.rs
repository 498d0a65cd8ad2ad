//! Dispatch orchestration: normalize, resolve session, pre-check, send, log.

use crate::error::GatewayError;
use crate::normalize::PhoneFormatter;
use crate::registry::SessionRegistry;
use base64::{engine::general_purpose::STANDARD, Engine};
use bridge_client::{BridgeClient, SendMediaRequest};
use chrono::{DateTime, Utc};
use send_log::{LogSink, PayloadDescriptor, SendAttempt};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, instrument, warn};

/// Where media bytes come from.
#[derive(Debug, Clone)]
pub enum MediaSource {
    /// Fetched from a remote URL; content type is captured from the response.
    Url(String),
    /// Read from a local path; mime type inferred from the extension.
    Path(PathBuf),
    /// Caller-supplied base64 with explicit mime type and filename.
    Inline {
        data: String,
        mime_type: String,
        file_name: String,
    },
}

/// What the caller asked to send.
#[derive(Debug, Clone)]
pub enum OutboundPayload {
    Text(String),
    Media {
        source: MediaSource,
        caption: Option<String>,
    },
}

impl OutboundPayload {
    fn validate(&self) -> Result<(), GatewayError> {
        match self {
            OutboundPayload::Text(body) if body.trim().is_empty() => {
                Err(GatewayError::Validation("message is required".into()))
            }
            OutboundPayload::Media { source, .. } => match source {
                MediaSource::Url(url) if url.trim().is_empty() => {
                    Err(GatewayError::Validation("media_url is required".into()))
                }
                MediaSource::Path(path) if path.as_os_str().is_empty() => {
                    Err(GatewayError::Validation("media_path is required".into()))
                }
                MediaSource::Inline { data, .. } if data.trim().is_empty() => {
                    Err(GatewayError::Validation("file_data is required".into()))
                }
                _ => Ok(()),
            },
            _ => Ok(()),
        }
    }

    /// Log-record descriptor; never carries media bytes.
    fn descriptor(&self) -> PayloadDescriptor {
        match self {
            OutboundPayload::Text(body) => PayloadDescriptor::Text { body: body.clone() },
            OutboundPayload::Media { source, .. } => match source {
                MediaSource::Url(url) => PayloadDescriptor::MediaUrl { url: url.clone() },
                MediaSource::Path(path) => PayloadDescriptor::MediaPath {
                    path: path.to_string_lossy().into_owned(),
                },
                MediaSource::Inline {
                    file_name,
                    mime_type,
                    ..
                } => PayloadDescriptor::MediaInline {
                    file_name: file_name.clone(),
                    mime_type: mime_type.clone(),
                },
            },
        }
    }
}

/// Payload in transport-native form, ready to send.
enum ResolvedPayload {
    Text(String),
    Media(SendMediaRequest),
}

/// Returned to the caller after a successful dispatch.
#[derive(Debug, Clone, Serialize)]
pub struct SendReceipt {
    pub session_id: String,
    pub recipient: String,
    pub message_id: String,
    pub timestamp: DateTime<Utc>,
}

/// Orchestrates a dispatch call end to end.
pub struct DispatchService {
    registry: Arc<SessionRegistry>,
    formatter: PhoneFormatter,
    bridge: BridgeClient,
    log: Arc<dyn LogSink>,
    fetcher: reqwest::Client,
    verify_recipient_exists: bool,
}

impl DispatchService {
    pub fn new(
        registry: Arc<SessionRegistry>,
        formatter: PhoneFormatter,
        bridge: BridgeClient,
        log: Arc<dyn LogSink>,
        verify_recipient_exists: bool,
    ) -> Result<Self, GatewayError> {
        let fetcher = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| GatewayError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            registry,
            formatter,
            bridge,
            log,
            fetcher,
            verify_recipient_exists,
        })
    }

    /// Dispatch one outbound message.
    ///
    /// Exactly one [`SendAttempt`] is appended for every call that passes
    /// validation, whatever the outcome. A log append failure is reported
    /// via tracing only and never overrides the dispatch result.
    #[instrument(skip(self, payload))]
    pub async fn dispatch(
        &self,
        session_id: &str,
        recipient_raw: &str,
        payload: OutboundPayload,
    ) -> Result<SendReceipt, GatewayError> {
        // Validation failures touch neither the registry nor the log.
        if recipient_raw.trim().is_empty() {
            return Err(GatewayError::Validation("phone is required".into()));
        }
        payload.validate()?;

        let recipient = self.formatter.format(recipient_raw);
        let descriptor = payload.descriptor();
        let session = self.registry.resolve(session_id).await;

        // Read the current state instead of assuming readiness; a session
        // still pairing or already dropped fails fast, it never hangs.
        let state = session.handle.state();
        if !state.is_ready() {
            let reason = format!("session not ready: {}", state.label());
            warn!(recipient = %recipient, "{}", reason);
            self.record(SendAttempt::failure(
                session_id,
                recipient.as_str(),
                descriptor,
                reason.as_str(),
            ))
            .await;
            return Err(GatewayError::Transport(reason));
        }

        if self.verify_recipient_exists {
            match self.bridge.is_registered_user(session_id, &recipient).await {
                Ok(true) => {}
                Ok(false) => {
                    info!(recipient = %recipient, "Recipient not registered, send skipped");
                    self.record(SendAttempt::failure(
                        session_id,
                        recipient.as_str(),
                        descriptor,
                        "number_not_registered",
                    ))
                    .await;
                    return Err(GatewayError::RecipientUnknown(recipient));
                }
                Err(e) => {
                    let reason = e.to_string();
                    self.record(SendAttempt::failure(
                        session_id,
                        recipient.as_str(),
                        descriptor,
                        reason.as_str(),
                    ))
                    .await;
                    return Err(GatewayError::Transport(reason));
                }
            }
        }

        let resolved = match self.resolve_payload(payload, &recipient).await {
            Ok(resolved) => resolved,
            Err(e) => {
                self.record(SendAttempt::failure(
                    session_id,
                    recipient.as_str(),
                    descriptor,
                    e.to_string(),
                ))
                .await;
                return Err(e);
            }
        };

        // At most one in-flight send per session; other sessions proceed
        // in parallel.
        let result = {
            let _guard = session.send_lock.lock().await;
            match &resolved {
                ResolvedPayload::Text(body) => {
                    self.bridge.send_text(session_id, &recipient, body).await
                }
                ResolvedPayload::Media(request) => {
                    self.bridge.send_media(session_id, request).await
                }
            }
        };

        match result {
            Ok(receipt) => {
                let attempt = SendAttempt::success(
                    session_id,
                    recipient.as_str(),
                    descriptor,
                    receipt.message_id.as_str(),
                );
                let timestamp = attempt.timestamp;
                self.record(attempt).await;

                info!(recipient = %recipient, message_id = %receipt.message_id, "Message sent");
                Ok(SendReceipt {
                    session_id: session_id.to_string(),
                    recipient,
                    message_id: receipt.message_id,
                    timestamp,
                })
            }
            Err(e) => {
                let reason = e.to_string();
                self.record(SendAttempt::failure(
                    session_id,
                    recipient.as_str(),
                    descriptor,
                    reason.as_str(),
                ))
                .await;
                Err(GatewayError::Transport(reason))
            }
        }
    }

    /// Resolve a payload into transport-native form.
    async fn resolve_payload(
        &self,
        payload: OutboundPayload,
        recipient: &str,
    ) -> Result<ResolvedPayload, GatewayError> {
        let (source, caption) = match payload {
            OutboundPayload::Text(body) => return Ok(ResolvedPayload::Text(body)),
            OutboundPayload::Media { source, caption } => (source, caption),
        };

        let request = match source {
            MediaSource::Url(url) => {
                let response = self
                    .fetcher
                    .get(&url)
                    .send()
                    .await
                    .map_err(|e| GatewayError::Media(format!("Failed to fetch media: {}", e)))?;

                if !response.status().is_success() {
                    return Err(GatewayError::Media(format!(
                        "Media fetch returned {}",
                        response.status()
                    )));
                }

                let mime_type = response
                    .headers()
                    .get(reqwest::header::CONTENT_TYPE)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let file_name = file_name_from_url(&url);
                let bytes = response
                    .bytes()
                    .await
                    .map_err(|e| GatewayError::Media(format!("Failed to read media: {}", e)))?;

                SendMediaRequest {
                    to: recipient.to_string(),
                    data: STANDARD.encode(&bytes),
                    mime_type,
                    file_name,
                    caption,
                }
            }
            MediaSource::Path(path) => {
                let bytes = tokio::fs::read(&path).await.map_err(|e| {
                    GatewayError::Media(format!("Failed to read {}: {}", path.display(), e))
                })?;
                let file_name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "file".into());

                SendMediaRequest {
                    to: recipient.to_string(),
                    data: STANDARD.encode(&bytes),
                    mime_type: mime_for_path(&path).to_string(),
                    file_name,
                    caption,
                }
            }
            MediaSource::Inline {
                data,
                mime_type,
                file_name,
            } => SendMediaRequest {
                to: recipient.to_string(),
                data,
                mime_type,
                file_name,
                caption,
            },
        };

        Ok(ResolvedPayload::Media(request))
    }

    async fn record(&self, attempt: SendAttempt) {
        // The attempt is already the dispatch outcome; a sink failure is an
        // operational problem, not the caller's.
        if let Err(e) = self.log.append(&attempt).await {
            error!("Failed to record send attempt: {}", e);
        }
    }
}

/// Last path segment of a URL, or "file".
fn file_name_from_url(url: &str) -> String {
    url.split('?')
        .next()
        .and_then(|base| base.rsplit('/').next())
        .filter(|name| !name.is_empty() && !name.contains(':'))
        .unwrap_or("file")
        .to_string()
}

/// Mime type from a file extension.
fn mime_for_path(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("mp4") => "video/mp4",
        Some("mp3") => "audio/mpeg",
        Some("ogg") => "audio/ogg",
        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_from_url() {
        assert_eq!(
            file_name_from_url("https://cdn.example.com/media/photo.jpg"),
            "photo.jpg"
        );
        assert_eq!(
            file_name_from_url("https://cdn.example.com/media/photo.jpg?token=abc"),
            "photo.jpg"
        );
        assert_eq!(file_name_from_url("https://cdn.example.com/"), "file");
    }

    #[test]
    fn test_mime_for_path() {
        assert_eq!(mime_for_path(Path::new("a/photo.JPG")), "image/jpeg");
        assert_eq!(mime_for_path(Path::new("doc.pdf")), "application/pdf");
        assert_eq!(mime_for_path(Path::new("blob")), "application/octet-stream");
    }

    #[test]
    fn test_validate_empty_text() {
        let payload = OutboundPayload::Text("  ".into());
        assert!(matches!(
            payload.validate(),
            Err(GatewayError::Validation(_))
        ));
    }

    #[test]
    fn test_validate_empty_media_url() {
        let payload = OutboundPayload::Media {
            source: MediaSource::Url("".into()),
            caption: None,
        };
        assert!(matches!(
            payload.validate(),
            Err(GatewayError::Validation(_))
        ));
    }

    #[test]
    fn test_descriptor_omits_inline_bytes() {
        let payload = OutboundPayload::Media {
            source: MediaSource::Inline {
                data: "aGVsbG8=".into(),
                mime_type: "image/png".into(),
                file_name: "a.png".into(),
            },
            caption: None,
        };

        let descriptor = payload.descriptor();
        let json = serde_json::to_string(&descriptor).unwrap();
        assert!(!json.contains("aGVsbG8="));
        assert!(json.contains("a.png"));
    }
}
