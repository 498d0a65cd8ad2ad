//! Messaging bridge REST API client.
//!
//! Wraps the transport bridge that owns the actual device pairing and wire
//! protocol. This crate exposes a typed HTTP client plus a per-session
//! [`ClientHandle`] that tracks the connection state machine and publishes
//! transitions on subscribable channels.

mod client;
mod error;
mod handle;
mod state;
mod types;

pub use client::BridgeClient;
pub use error::BridgeError;
pub use handle::ClientHandle;
pub use state::{ClientState, StateEvent};
pub use types::*;
