//! Message gateway - Entry point.

use bridge_client::BridgeClient;
use gateway::{
    api::{create_router_with_rate_limit, AppState, RateLimitState},
    config::Config,
    dispatch::DispatchService,
    normalize::PhoneFormatter,
    registry::SessionRegistry,
};
use send_log::{FileLog, LogSink, MemoryLog};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log.level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting message gateway");

    // Initialize bridge client
    let bridge = match BridgeClient::new(&config.bridge.base_url) {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to create bridge client: {}", e);
            std::process::exit(1);
        }
    };

    if !bridge.health_check().await {
        warn!(
            "Bridge not reachable at {} - sessions will pair once it is up",
            config.bridge.base_url
        );
    }

    // Initialize the send-attempt log
    let log: Arc<dyn LogSink> = if config.attempt_log.persist {
        info!("Attempt log at {}", config.attempt_log.path.display());
        Arc::new(FileLog::new(config.attempt_log.path.clone()))
    } else {
        info!("Persistence disabled, using in-memory attempt log");
        Arc::new(MemoryLog::new())
    };

    // Session registry and dispatch service
    let registry = Arc::new(SessionRegistry::new(
        bridge.clone(),
        config.bridge.poll_interval,
    ));

    let formatter = PhoneFormatter::new(
        config.dispatch.national_prefix.clone(),
        config.dispatch.domain_suffix.clone(),
    );

    let dispatch = match DispatchService::new(
        registry.clone(),
        formatter,
        bridge.clone(),
        log.clone(),
        config.dispatch.verify_recipient_exists,
    ) {
        Ok(d) => Arc::new(d),
        Err(e) => {
            error!("Failed to create dispatch service: {}", e);
            std::process::exit(1);
        }
    };

    // Create application state
    let state = AppState {
        dispatch,
        registry,
        log,
        bridge,
        auth_key: config.auth.key.clone(),
        default_session: config.dispatch.default_session.clone(),
    };

    // Create router with rate limiting
    let rate_limit = RateLimitState::new(config.rate_limit.global_per_minute);
    let app = create_router_with_rate_limit(state, rate_limit);

    // Bind to address
    let addr = SocketAddr::new(
        config
            .server
            .listen_addr
            .parse()
            .unwrap_or([0, 0, 0, 0].into()),
        config.server.port,
    );

    info!("Listening on {}", addr);

    let listener = match TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    // Run server
    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }
}
