//! Per-switch session tracking.
//!
//! The session table maps a switch id to the transport handle its directives
//! must be routed back over. Entries exist only for the lifetime of the
//! connection: inserted on connect, removed on disconnect. Sessions are
//! independent of each other; there is no cross-switch state.

use std::collections::HashMap;

use tokio::sync::RwLock;
use tracing::debug;

use crate::engine::SwitchId;
use crate::transport::SwitchHandle;

/// Connection-lifecycle state of one switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Connected; baseline table-miss directive not yet installed.
    Handshaking,
    /// Baseline directive installed; packet-in traffic expected.
    Active,
}

/// Transient record for one switch connection.
#[derive(Debug, Clone, Copy)]
pub struct SwitchSession {
    pub switch: SwitchId,
    pub handle: SwitchHandle,
    pub state: SessionState,
}

/// Table of live switch sessions.
#[derive(Debug, Default)]
pub struct SessionTable {
    sessions: RwLock<HashMap<SwitchId, SwitchSession>>,
}

impl SessionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new connection in `Handshaking` state. A stale entry from a
    /// previous connection of the same switch is replaced.
    pub async fn insert(&self, switch: SwitchId, handle: SwitchHandle) {
        let mut sessions = self.sessions.write().await;
        let replaced = sessions
            .insert(
                switch,
                SwitchSession {
                    switch,
                    handle,
                    state: SessionState::Handshaking,
                },
            )
            .is_some();

        debug!(%switch, replaced, "switch session registered");
    }

    /// Mark a session `Active` once its baseline directive is installed.
    pub async fn activate(&self, switch: SwitchId) {
        let mut sessions = self.sessions.write().await;
        if let Some(session) = sessions.get_mut(&switch) {
            session.state = SessionState::Active;
        }
    }

    /// Look up the session for a switch, if connected.
    pub async fn get(&self, switch: SwitchId) -> Option<SwitchSession> {
        self.sessions.read().await.get(&switch).copied()
    }

    /// Remove a session on disconnect. Returns false for unknown switches.
    pub async fn remove(&self, switch: SwitchId) -> bool {
        let removed = self.sessions.write().await.remove(&switch).is_some();
        if removed {
            debug!(%switch, "switch session removed");
        }
        removed
    }

    /// Number of live sessions.
    pub async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }
}
