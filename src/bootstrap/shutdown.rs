use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, warn};

/// Shutdown state machine
///
/// States:
/// 1. Running - normal operation
/// 2. Draining - stop accepting new switches, let sessions close
/// 3. Terminated - all sessions closed or drain period expired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownState {
    Running,
    Draining,
    Terminated,
}

/// Manages graceful shutdown with a drain period
pub struct ShutdownManager {
    /// Current state
    state: watch::Sender<ShutdownState>,

    /// Keeps the watch channel open so `state.send` always applies; without a
    /// live receiver tokio's `Sender::send` refuses to update the value.
    _state_keepalive: watch::Receiver<ShutdownState>,

    /// Drain period duration
    drain_period: Duration,

    /// Active session count
    active_sessions: AtomicU64,
}

impl ShutdownManager {
    pub fn new(drain_period: Duration) -> Arc<Self> {
        let (state, state_keepalive) = watch::channel(ShutdownState::Running);

        Arc::new(Self {
            state,
            _state_keepalive: state_keepalive,
            drain_period,
            active_sessions: AtomicU64::new(0),
        })
    }

    /// Get current state
    pub fn state(&self) -> ShutdownState {
        *self.state.borrow()
    }

    /// Subscribe to state changes
    pub fn subscribe(&self) -> watch::Receiver<ShutdownState> {
        self.state.subscribe()
    }

    /// Start draining (called on SIGTERM/SIGINT)
    pub fn start_drain(&self) {
        if self.state() != ShutdownState::Running {
            return;
        }

        info!(
            drain_period_secs = self.drain_period.as_secs(),
            "starting graceful shutdown drain"
        );

        let _ = self.state.send(ShutdownState::Draining);
    }

    /// Complete shutdown
    pub fn terminate(&self) {
        if self.state() == ShutdownState::Terminated {
            return;
        }

        let active = self.active_sessions.load(Ordering::SeqCst);
        if active > 0 {
            warn!(
                active_sessions = active,
                "force terminating with active switch sessions"
            );
        }

        info!("shutdown complete");
        let _ = self.state.send(ShutdownState::Terminated);
    }

    /// Register a new switch session
    pub fn session_opened(&self) -> bool {
        // Reject new switches during drain
        if self.state() != ShutdownState::Running {
            return false;
        }

        self.active_sessions.fetch_add(1, Ordering::SeqCst);
        true
    }

    /// Unregister a switch session
    pub fn session_closed(&self) {
        let prev = self.active_sessions.fetch_sub(1, Ordering::SeqCst);

        // If draining and no more sessions, complete
        if self.state() == ShutdownState::Draining && prev == 1 {
            self.terminate();
        }
    }

    /// Get active session count
    pub fn active_sessions(&self) -> u64 {
        self.active_sessions.load(Ordering::SeqCst)
    }

    /// Check if accepting new switches
    pub fn is_accepting(&self) -> bool {
        self.state() == ShutdownState::Running
    }
}
