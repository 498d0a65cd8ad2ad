//! Configuration for the gateway.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Gateway configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Messaging bridge configuration
    #[serde(default)]
    pub bridge: BridgeConfig,

    /// Dispatch behavior configuration
    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// Shared-secret authentication
    #[serde(default)]
    pub auth: AuthConfig,

    /// Send-attempt log configuration
    #[serde(default)]
    pub attempt_log: AttemptLogConfig,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Logging configuration
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Server listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BridgeConfig {
    /// Messaging bridge REST API URL
    #[serde(default = "default_bridge_url")]
    pub base_url: String,

    /// Interval between session status polls
    #[serde(default = "default_poll_interval", with = "humantime_serde")]
    pub poll_interval: Duration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DispatchConfig {
    /// National prefix substituted for a leading "0" in recipient numbers
    #[serde(default = "default_national_prefix")]
    pub national_prefix: String,

    /// Recipient address domain suffix (appended as "@<suffix>")
    #[serde(default = "default_domain_suffix")]
    pub domain_suffix: String,

    /// Query the bridge for recipient registration before sending
    #[serde(default)]
    pub verify_recipient_exists: bool,

    /// Session id used when a request does not name one
    #[serde(default = "default_session_id")]
    pub default_session: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfig {
    /// Shared secret checked against the request body "key" field.
    /// Unset disables the check.
    #[serde(default)]
    pub key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AttemptLogConfig {
    /// Path to the JSON attempt log
    #[serde(default = "default_attempt_log_path")]
    pub path: PathBuf,

    /// Enable persistence (if false, the log is in-memory only)
    #[serde(default = "default_true")]
    pub persist: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    /// Global requests per minute
    #[serde(default = "default_global_rpm")]
    pub global_per_minute: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default implementations
impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            port: default_port(),
        }
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            base_url: default_bridge_url(),
            poll_interval: default_poll_interval(),
        }
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            national_prefix: default_national_prefix(),
            domain_suffix: default_domain_suffix(),
            verify_recipient_exists: false,
            default_session: default_session_id(),
        }
    }
}

impl Default for AttemptLogConfig {
    fn default() -> Self {
        Self {
            path: default_attempt_log_path(),
            persist: true,
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            global_per_minute: default_global_rpm(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// Default value functions
fn default_listen_addr() -> String {
    "0.0.0.0".into()
}

fn default_port() -> u16 {
    3000
}

fn default_bridge_url() -> String {
    "http://bridge:8080".into()
}

fn default_poll_interval() -> Duration {
    Duration::from_secs(2)
}

fn default_national_prefix() -> String {
    "62".into()
}

fn default_domain_suffix() -> String {
    "c.us".into()
}

fn default_session_id() -> String {
    "default".into()
}

fn default_attempt_log_path() -> PathBuf {
    PathBuf::from("/data/attempts.json")
}

fn default_true() -> bool {
    true
}

fn default_global_rpm() -> u32 {
    60
}

fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    .try_parsing(false),
            )
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}
