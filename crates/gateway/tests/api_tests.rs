//! Integration tests for the gateway HTTP API.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use bridge_client::BridgeClient;
use gateway::{
    api::{create_router_with_rate_limit, AppState, RateLimitState},
    dispatch::DispatchService,
    normalize::PhoneFormatter,
    registry::SessionRegistry,
};
use send_log::{LogSink, MemoryLog};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

/// Create a test app state backed by an in-memory log.
///
/// The bridge URL points nowhere: these tests never reach a ready session.
fn create_test_state(auth_key: Option<&str>) -> AppState {
    let bridge = BridgeClient::new("http://localhost:9999").unwrap();
    let log: Arc<dyn LogSink> = Arc::new(MemoryLog::new());
    let registry = Arc::new(SessionRegistry::new(bridge.clone(), Duration::from_secs(60)));
    let dispatch = Arc::new(
        DispatchService::new(
            registry.clone(),
            PhoneFormatter::new("62", "c.us"),
            bridge.clone(),
            log.clone(),
            false,
        )
        .unwrap(),
    );

    AppState {
        dispatch,
        registry,
        log,
        bridge,
        auth_key: auth_key.map(String::from),
        default_session: "default".into(),
    }
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let state = create_test_state(None);
    let app = create_router_with_rate_limit(state, RateLimitState::permissive());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["session_count"], 0);
    assert_eq!(json["bridge_healthy"], false);
}

#[tokio::test]
async fn test_send_message_missing_phone() {
    let state = create_test_state(None);
    let log = state.log.clone();
    let app = create_router_with_rate_limit(state, RateLimitState::permissive());

    let response = app
        .oneshot(post_json(
            "/send-message",
            serde_json::json!({ "message": "hello" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");

    // Validation failures never reach the log
    assert!(log.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_send_message_missing_message() {
    let state = create_test_state(None);
    let log = state.log.clone();
    let app = create_router_with_rate_limit(state, RateLimitState::permissive());

    let response = app
        .oneshot(post_json(
            "/send-message",
            serde_json::json!({ "phone": "081234567890" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(log.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_send_media_requires_a_source() {
    let state = create_test_state(None);
    let app = create_router_with_rate_limit(state, RateLimitState::permissive());

    let response = app
        .oneshot(post_json(
            "/send-media",
            serde_json::json!({ "phone": "081234567890" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_send_message_rejects_wrong_key() {
    let state = create_test_state(Some("secret"));
    let app = create_router_with_rate_limit(state, RateLimitState::permissive());

    let response = app
        .clone()
        .oneshot(post_json(
            "/send-message",
            serde_json::json!({ "phone": "0812", "message": "hi", "key": "wrong" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(post_json(
            "/send-message",
            serde_json::json!({ "phone": "0812", "message": "hi" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_send_message_unready_session_is_bad_gateway() {
    let state = create_test_state(None);
    let log = state.log.clone();
    let app = create_router_with_rate_limit(state, RateLimitState::permissive());

    let response = app
        .oneshot(post_json(
            "/send-message",
            serde_json::json!({ "phone": "081234567890", "message": "hi" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json = body_json(response).await;
    assert_eq!(json["code"], "TRANSPORT_ERROR");

    // The failed attempt is logged exactly once
    let attempts = log.list_all().await.unwrap();
    assert_eq!(attempts.len(), 1);
    assert_eq!(attempts[0].recipient, "6281234567890@c.us");
}

#[tokio::test]
async fn test_list_attempts_empty() {
    let state = create_test_state(None);
    let app = create_router_with_rate_limit(state, RateLimitState::permissive());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/attempts")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["total"], 0);
    assert!(json["attempts"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_session_status_not_found() {
    let state = create_test_state(None);
    let app = create_router_with_rate_limit(state, RateLimitState::permissive());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/sessions/ghost/status")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_session_status_after_dispatch_creates_session() {
    let state = create_test_state(None);
    let app = create_router_with_rate_limit(state, RateLimitState::permissive());

    // Dispatch creates the session lazily even though the send fails
    let _ = app
        .clone()
        .oneshot(post_json(
            "/send-message",
            serde_json::json!({ "session_id": "office", "phone": "0812", "message": "hi" }),
        ))
        .await
        .unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/sessions/office/status")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["session_id"], "office");
    assert_eq!(json["status"], "uninitialized");
}

#[tokio::test]
async fn test_rate_limiting() {
    let state = create_test_state(None);
    // Very restrictive rate limit: 1 request per minute
    let rate_limit = RateLimitState::new(1);
    let app = create_router_with_rate_limit(state, rate_limit);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/attempts")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/attempts")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}
