//! Session registry: one transport client per session id.

use bridge_client::{BridgeClient, ClientHandle, StateEvent};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex, RwLock};
use tracing::info;

/// One logical messaging account and its live transport client.
pub struct Session {
    /// Transport client handle, owned exclusively by this entry.
    pub handle: ClientHandle,
    /// Serializes sends: at most one in-flight send per session.
    pub send_lock: Mutex<()>,
}

/// Maps a session id to exactly one live client.
///
/// Entries are created lazily on first resolve and live for the process
/// lifetime. No eviction, no cap, no persistence across restarts; every
/// restart re-pairs each session unless the bridge's own credential cache
/// restores it.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, Arc<Session>>>,
    bridge: BridgeClient,
    poll_interval: Duration,
    events: broadcast::Sender<StateEvent>,
}

impl SessionRegistry {
    pub fn new(bridge: BridgeClient, poll_interval: Duration) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            sessions: RwLock::new(HashMap::new()),
            bridge,
            poll_interval,
            events,
        }
    }

    /// Return the existing client for `session_id`, or create one.
    ///
    /// An existing entry is returned unchanged, with no health or staleness
    /// check. A new entry starts its connect flow asynchronously and is
    /// returned immediately; it may not be ready yet.
    pub async fn resolve(&self, session_id: &str) -> Arc<Session> {
        if let Some(session) = self.sessions.read().await.get(session_id) {
            return session.clone();
        }

        let mut sessions = self.sessions.write().await;
        // Another caller may have won the race for the write lock.
        if let Some(session) = sessions.get(session_id) {
            return session.clone();
        }

        let handle = ClientHandle::spawn(
            self.bridge.clone(),
            session_id.to_string(),
            self.poll_interval,
            self.events.clone(),
        );
        let session = Arc::new(Session {
            handle,
            send_lock: Mutex::new(()),
        });
        sessions.insert(session_id.to_string(), session.clone());

        info!(session_id = %session_id, "Session created");
        session
    }

    /// Look up a session without creating it.
    pub async fn get(&self, session_id: &str) -> Option<Arc<Session>> {
        self.sessions.read().await.get(session_id).cloned()
    }

    /// Number of live sessions.
    pub async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Subscribe to connection-state transitions across all sessions.
    pub fn subscribe(&self) -> broadcast::Receiver<StateEvent> {
        self.events.subscribe()
    }
}
