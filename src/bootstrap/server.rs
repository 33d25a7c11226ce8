use anyhow::Result;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::{mpsc, watch};
use tracing::{error, info, warn};

use crate::config::Config;
use crate::controller::AdmissionController;
use crate::rules::{RuleStore, RulesWatcher};
use crate::telemetry::counters;
use crate::transport::FlowProgrammer;

use super::events::SwitchEvent;
use super::shutdown::ShutdownManager;

/// Controller server
///
/// Components:
/// - Admission controller: per-switch sessions and flow verdicts
/// - Rules watcher: hot reload of the rule file, atomic snapshot swap
/// - Shutdown manager: graceful drain on SIGINT
///
/// The protocol transport runs outside this crate; it feeds the event
/// channel and consumes directives through its [`FlowProgrammer`].
pub struct Server<P> {
    /// Configuration
    config: Arc<Config>,

    /// Directive consumer owned by the transport
    programmer: Arc<P>,

    /// Shutdown manager
    shutdown: Arc<ShutdownManager>,
}

impl<P: FlowProgrammer + 'static> Server<P> {
    /// Create a new server instance
    pub fn new(config: Config, programmer: Arc<P>) -> Self {
        let shutdown = ShutdownManager::new(config.settings.drain_timeout);

        Self {
            config: Arc::new(config),
            programmer,
            shutdown,
        }
    }

    /// Run the controller until the event source closes or a signal arrives
    pub async fn run(self, mut events: mpsc::Receiver<SwitchEvent>) -> Result<()> {
        info!(
            rules_file = %self.config.rules.file.display(),
            hot_reload = self.config.rules.hot_reload,
            drain_timeout_secs = self.config.settings.drain_timeout.as_secs(),
            "starting ofwalld controller"
        );

        // Initial rule load. Failures are absorbed here: the controller runs
        // default-deny until a good rule file appears.
        let initial = match RuleStore::load(&self.config.rules.file) {
            Ok(store) => {
                info!(
                    rules = store.len(),
                    skipped = store.skipped(),
                    "firewall rules loaded"
                );
                counters::rules_loaded(store.len());
                Arc::new(store)
            }
            Err(e) => {
                counters::rules_load_failed();
                error!(
                    error = %e,
                    path = %self.config.rules.file.display(),
                    "failed to load firewall rules, running with empty rule set (default deny)"
                );
                Arc::new(RuleStore::empty())
            }
        };

        // With hot reload the watcher owns the live snapshot; otherwise the
        // initial snapshot is pinned for the process lifetime.
        let mut watcher_stop = None;
        let rules_rx = if self.config.rules.hot_reload {
            let mut watcher = RulesWatcher::new(
                &self.config.rules.file,
                initial.clone(),
                self.config.rules.debounce,
            )?;
            let rx = watcher.subscribe();

            match watcher.start() {
                Ok(()) => {
                    let (stop_tx, stop_rx) = watch::channel(false);
                    tokio::spawn(watcher.run(stop_rx));
                    watcher_stop = Some(stop_tx);
                }
                Err(e) => {
                    warn!(error = %e, "failed to watch rule file, hot reload disabled");
                }
            }

            rx
        } else {
            let (_tx, rx) = watch::channel(initial.clone());
            rx
        };

        let controller = AdmissionController::new(self.programmer.clone(), rules_rx);

        info!("ofwalld controller started");

        loop {
            tokio::select! {
                maybe_event = events.recv() => {
                    match maybe_event {
                        Some(SwitchEvent::Connected { switch, handle }) => {
                            if self.shutdown.session_opened() {
                                controller.on_switch_connected(switch, handle).await;
                            } else {
                                warn!(%switch, "draining, rejecting switch connection");
                            }
                        }
                        Some(SwitchEvent::PacketIn { switch, in_port, payload }) => {
                            controller.on_packet_in(switch, in_port, &payload).await;
                        }
                        Some(SwitchEvent::Disconnected { switch }) => {
                            if controller.on_switch_disconnected(switch).await {
                                self.shutdown.session_closed();
                            }
                        }
                        None => {
                            info!("event source closed, shutting down");
                            break;
                        }
                    }
                }
                _ = signal::ctrl_c() => {
                    info!("received shutdown signal");
                    self.shutdown.start_drain();
                    break;
                }
            }
        }

        if let Some(stop) = watcher_stop {
            let _ = stop.send(true);
        }
        self.shutdown.terminate();

        info!(
            sessions = controller.session_count().await,
            "ofwalld controller stopped"
        );

        Ok(())
    }
}
