//! HTTP API for the gateway.

mod handlers;
mod middleware;
mod types;

pub use handlers::*;
pub use middleware::{logging_middleware, rate_limit_middleware, RateLimitState};
pub use types::*;

use crate::dispatch::DispatchService;
use crate::registry::SessionRegistry;
use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use bridge_client::BridgeClient;
use send_log::LogSink;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Dispatch orchestrator
    pub dispatch: Arc<DispatchService>,
    /// Session registry
    pub registry: Arc<SessionRegistry>,
    /// Send-attempt log
    pub log: Arc<dyn LogSink>,
    /// Bridge client, used directly for health checks
    pub bridge: BridgeClient,
    /// Shared secret expected in request bodies; None disables auth
    pub auth_key: Option<String>,
    /// Session id used when a request names none
    pub default_session: String,
}

/// Create the API router with default rate limiting.
pub fn create_router(state: AppState) -> Router {
    create_router_with_rate_limit(state, RateLimitState::new(60))
}

/// Create the API router with custom rate limiting.
pub fn create_router_with_rate_limit(state: AppState, rate_limit: RateLimitState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/send-message", post(handlers::send_message))
        .route("/send-media", post(handlers::send_media))
        .route("/sessions/:id/status", get(handlers::session_status))
        .route("/attempts", get(handlers::list_attempts))
        .route("/events", get(handlers::events))
        .layer(axum_middleware::from_fn_with_state(
            rate_limit.clone(),
            rate_limit_middleware,
        ))
        .layer(axum_middleware::from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
