//! HTTP request handlers.

use super::types::{
    AttemptsResponse, HealthResponse, SendMediaRequest, SendMessageRequest, StatusResponse,
};
use super::AppState;
use crate::dispatch::{MediaSource, OutboundPayload, SendReceipt};
use crate::error::GatewayError;
use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use std::convert::Infallible;
use std::path::PathBuf;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};
use tracing::warn;

/// Check the shared-secret key carried in the request body.
fn authorize(state: &AppState, key: Option<&str>) -> Result<(), GatewayError> {
    match &state.auth_key {
        None => Ok(()),
        Some(expected) if key == Some(expected.as_str()) => Ok(()),
        Some(_) => {
            warn!("Rejected request with missing or wrong key");
            Err(GatewayError::Unauthorized)
        }
    }
}

/// Health check endpoint.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let bridge_healthy = state.bridge.health_check().await;

    Json(HealthResponse {
        status: "ok".to_string(),
        session_count: state.registry.count().await,
        bridge_healthy,
    })
}

/// Send a text message.
pub async fn send_message(
    State(state): State<AppState>,
    Json(request): Json<SendMessageRequest>,
) -> Result<Json<SendReceipt>, GatewayError> {
    authorize(&state, request.key.as_deref())?;

    let session_id = request
        .session_id
        .unwrap_or_else(|| state.default_session.clone());
    let phone = request.phone.unwrap_or_default();
    let payload = OutboundPayload::Text(request.message.unwrap_or_default());

    let receipt = state.dispatch.dispatch(&session_id, &phone, payload).await?;
    Ok(Json(receipt))
}

/// Send a media message.
pub async fn send_media(
    State(state): State<AppState>,
    Json(request): Json<SendMediaRequest>,
) -> Result<Json<SendReceipt>, GatewayError> {
    authorize(&state, request.key.as_deref())?;

    let session_id = request
        .session_id
        .unwrap_or_else(|| state.default_session.clone());
    let phone = request.phone.unwrap_or_default();

    let source = if let Some(url) = request.media_url {
        MediaSource::Url(url)
    } else if let Some(path) = request.media_path {
        MediaSource::Path(PathBuf::from(path))
    } else if let Some(data) = request.file_data {
        let mime_type = request
            .mime_type
            .ok_or_else(|| GatewayError::Validation("mime_type is required for file_data".into()))?;
        let file_name = request
            .file_name
            .ok_or_else(|| GatewayError::Validation("file_name is required for file_data".into()))?;
        MediaSource::Inline {
            data,
            mime_type,
            file_name,
        }
    } else {
        return Err(GatewayError::Validation(
            "one of media_url, media_path, file_data is required".into(),
        ));
    };

    let payload = OutboundPayload::Media {
        source,
        caption: request.caption,
    };

    let receipt = state.dispatch.dispatch(&session_id, &phone, payload).await?;
    Ok(Json(receipt))
}

/// Current connection state of one session.
pub async fn session_status(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<StatusResponse>, GatewayError> {
    let session = state
        .registry
        .get(&session_id)
        .await
        .ok_or(GatewayError::SessionNotFound(session_id.clone()))?;

    Ok(Json(StatusResponse {
        session_id,
        state: session.handle.state(),
    }))
}

/// Full send-attempt log in append order.
pub async fn list_attempts(
    State(state): State<AppState>,
) -> Result<Json<AttemptsResponse>, GatewayError> {
    let attempts = state.log.list_all().await?;
    let total = attempts.len();

    Ok(Json(AttemptsResponse { attempts, total }))
}

/// Push channel of connection-state transitions and pairing artifacts.
pub async fn events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.registry.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|event| match event {
        Ok(event) => Event::default()
            .event("connection-status")
            .json_data(&event)
            .ok()
            .map(Ok::<_, Infallible>),
        // Lagged subscribers skip missed transitions
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
