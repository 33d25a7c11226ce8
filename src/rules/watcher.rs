//! Hot reload of the rule file.
//!
//! Watches the rule source for modification and publishes each successful
//! reload as a new immutable snapshot over a watch channel. Readers in flight
//! keep the snapshot they already hold; a failed reload keeps the current
//! rule set in place.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use notify::{
    event::ModifyKind, Config as NotifyConfig, Event, EventKind, RecommendedWatcher,
    RecursiveMode, Watcher,
};
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

use super::RuleStore;

/// Outcome of one reload attempt.
#[derive(Debug, Clone)]
pub enum ReloadEvent {
    /// Rule file was modified and reloaded.
    Reloaded(Arc<RuleStore>),

    /// Rule file was modified but reload failed; current rules kept.
    ReloadFailed(String),
}

/// Rule-file watcher publishing immutable [`RuleStore`] snapshots.
pub struct RulesWatcher {
    /// Path to the rule file
    path: PathBuf,

    /// File watcher
    watcher: RecommendedWatcher,

    /// Event receiver
    event_rx: mpsc::Receiver<notify::Result<Event>>,

    /// Current rule snapshot
    current: watch::Sender<Arc<RuleStore>>,

    /// Debounce duration (avoid rapid reloads)
    debounce: Duration,
}

impl RulesWatcher {
    /// Create a new watcher around the initial snapshot.
    pub fn new(path: impl AsRef<Path>, initial: Arc<RuleStore>, debounce: Duration) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let (event_tx, event_rx) = mpsc::channel(16);

        let watcher = RecommendedWatcher::new(
            move |res| {
                let _ = event_tx.blocking_send(res);
            },
            NotifyConfig::default().with_poll_interval(Duration::from_secs(1)),
        )?;

        let (current, _) = watch::channel(initial);

        Ok(Self {
            path,
            watcher,
            event_rx,
            current,
            debounce,
        })
    }

    /// Start watching for rule-file changes.
    pub fn start(&mut self) -> Result<()> {
        info!(path = %self.path.display(), "starting rules watcher");

        self.watcher
            .watch(&self.path, RecursiveMode::NonRecursive)?;

        Ok(())
    }

    /// Subscribe to rule snapshots.
    pub fn subscribe(&self) -> watch::Receiver<Arc<RuleStore>> {
        self.current.subscribe()
    }

    /// Get the current snapshot.
    pub fn current(&self) -> Arc<RuleStore> {
        self.current.borrow().clone()
    }

    /// Process events (call in a loop).
    pub async fn process_events(&mut self) -> Option<ReloadEvent> {
        let event = self.event_rx.recv().await?;

        match event {
            Ok(event) => {
                if !matches!(
                    event.kind,
                    EventKind::Modify(ModifyKind::Data(_))
                        | EventKind::Modify(ModifyKind::Any)
                ) {
                    return None;
                }

                debug!(paths = ?event.paths, "rule file modified");

                // Debounce - wait a bit before reloading
                tokio::time::sleep(self.debounce).await;

                match RuleStore::load(&self.path) {
                    Ok(store) => {
                        let store = Arc::new(store);
                        info!(
                            rules = store.len(),
                            skipped = store.skipped(),
                            "firewall rules reloaded"
                        );

                        let _ = self.current.send(store.clone());
                        Some(ReloadEvent::Reloaded(store))
                    }
                    Err(e) => {
                        warn!(error = %e, "rule reload failed, keeping current rules");
                        Some(ReloadEvent::ReloadFailed(e.to_string()))
                    }
                }
            }
            Err(e) => {
                error!(error = %e, "file watcher error");
                None
            }
        }
    }

    /// Run the watcher loop until shutdown.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        loop {
            tokio::select! {
                event = self.process_events() => {
                    if let Some(ReloadEvent::Reloaded(_)) = event {
                        metrics::counter!("ofwalld.rules.reloads").increment(1);
                    } else if let Some(ReloadEvent::ReloadFailed(_)) = event {
                        metrics::counter!("ofwalld.rules.reload_failures").increment(1);
                    }
                }
                _ = shutdown.changed() => {
                    info!("rules watcher shutting down");
                    break;
                }
            }
        }
    }
}
