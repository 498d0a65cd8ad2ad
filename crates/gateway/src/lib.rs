//! Message gateway service.
//!
//! Exposes a small HTTP API for sending outbound chat messages (text and
//! media) through a messaging bridge, tracks each session's connection and
//! pairing state, and persists one record per send attempt.

pub mod api;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod normalize;
pub mod registry;

pub use config::Config;
pub use dispatch::{DispatchService, MediaSource, OutboundPayload, SendReceipt};
pub use error::GatewayError;
pub use normalize::PhoneFormatter;
pub use registry::{Session, SessionRegistry};
