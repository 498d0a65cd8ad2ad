//! Per-session client handle driven by a status poll loop.

use crate::client::BridgeClient;
use crate::state::{ClientState, StateEvent};
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio::time::sleep;
use tracing::{debug, error, warn};

/// Handle to one session's transport connection.
///
/// Construction starts the connect flow and a background poll task; the
/// handle is usable immediately even though the connection may still be
/// pairing. The current state is always readable without blocking.
pub struct ClientHandle {
    session_id: String,
    state_rx: watch::Receiver<ClientState>,
}

impl ClientHandle {
    /// Start the connect flow for `session_id` and spawn its poll loop.
    ///
    /// Every observed transition is published on the returned handle's watch
    /// channel and on the shared `events` channel. The task runs for the
    /// process lifetime; sessions are never evicted.
    pub fn spawn(
        bridge: BridgeClient,
        session_id: String,
        poll_interval: Duration,
        events: broadcast::Sender<StateEvent>,
    ) -> Self {
        let (state_tx, state_rx) = watch::channel(ClientState::Uninitialized);
        let id = session_id.clone();

        tokio::spawn(async move {
            if let Err(e) = bridge.start_session(&id).await {
                warn!(session_id = %id, "Session start failed: {}", e);
            }

            loop {
                match bridge.session_status(&id).await {
                    Ok(status) => match status.to_client_state() {
                        Some(state) => {
                            if *state_tx.borrow() != state {
                                debug!(
                                    session_id = %id,
                                    state = state.label(),
                                    "Connection state changed"
                                );
                                let _ = events.send(StateEvent::new(&id, state.clone()));
                                let _ = state_tx.send(state);
                            }
                        }
                        None => {
                            warn!(session_id = %id, state = %status.state, "Unknown bridge state");
                        }
                    },
                    Err(e) => {
                        error!(session_id = %id, "Status poll error: {}", e);
                        // Back off on error
                        sleep(Duration::from_secs(5)).await;
                        continue;
                    }
                }

                sleep(poll_interval).await;
            }
        });

        Self {
            session_id,
            state_rx,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Current connection state.
    pub fn state(&self) -> ClientState {
        self.state_rx.borrow().clone()
    }

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> watch::Receiver<ClientState> {
        self.state_rx.clone()
    }
}
