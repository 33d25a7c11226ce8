//! Packet-admission orchestration.
//!
//! The admission controller owns the switch session table and reacts to the
//! three transport events: switch connect, packet-in, switch disconnect. It
//! evaluates each new flow against the current rule snapshot and hands the
//! resulting directive to the protocol transport.

mod directive;
mod session;

pub use self::directive::{
    FlowAction, FlowDirective, FlowMatch, FLOW_PRIORITY, TABLE_MISS_PRIORITY,
};
pub use self::session::{SessionState, SessionTable, SwitchSession};

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{error, info, trace, warn};

use crate::engine::{self, FlowCandidate, SwitchId, Verdict};
use crate::packet::EthernetFrame;
use crate::rules::RuleStore;
use crate::telemetry::counters;
use crate::transport::{FlowProgrammer, SwitchHandle};

/// Event-driven admission controller.
///
/// Entry points are called by the protocol transport, one event at a time
/// per switch but possibly concurrently across switches; all shared state is
/// behind the session table lock or immutable rule snapshots, so concurrent
/// calls are safe.
pub struct AdmissionController<P> {
    programmer: Arc<P>,
    rules: watch::Receiver<Arc<RuleStore>>,
    sessions: SessionTable,
}

impl<P: FlowProgrammer> AdmissionController<P> {
    pub fn new(programmer: Arc<P>, rules: watch::Receiver<Arc<RuleStore>>) -> Self {
        Self {
            programmer,
            rules,
            sessions: SessionTable::new(),
        }
    }

    /// A switch completed its handshake. Record the session and install the
    /// baseline table-miss directive, exactly once per connection, before any
    /// packet-in for this switch is processed.
    pub async fn on_switch_connected(&self, switch: SwitchId, handle: SwitchHandle) {
        self.sessions.insert(switch, handle).await;

        match self.programmer.install_flow(handle, &FlowDirective::table_miss()) {
            Ok(()) => {
                self.sessions.activate(switch).await;
                counters::switch_connected();
                info!(%switch, "switch connected, table-miss directive installed");
            }
            Err(e) => {
                counters::directive_failed();
                error!(%switch, error = %e, "failed to install table-miss directive");
            }
        }
    }

    /// A packet missed every installed flow and was sent up for a decision.
    pub async fn on_packet_in(&self, switch: SwitchId, in_port: u32, payload: &[u8]) {
        let Some(session) = self.sessions.get(switch).await else {
            warn!(%switch, "packet-in from unknown switch, dropping");
            return;
        };

        let frame = match EthernetFrame::decode(payload) {
            Ok(frame) => frame,
            Err(e) => {
                counters::decode_error();
                warn!(%switch, error = %e, "undecodable packet-in payload, dropping");
                return;
            }
        };

        // LLDP carries no user traffic; it must neither install flows nor
        // show up in verdict logs.
        if frame.is_lldp() {
            trace!(%switch, "ignoring LLDP frame");
            return;
        }

        let candidate = FlowCandidate {
            src: frame.src,
            dst: frame.dst,
            switch,
            in_port,
        };

        // One snapshot per evaluation: a concurrent reload never changes the
        // rule set under an in-flight verdict.
        let snapshot = self.rules.borrow().clone();
        let verdict = engine::evaluate(&snapshot, &candidate);

        let matches = FlowMatch::flow(in_port, frame.src, frame.dst);
        match verdict {
            Verdict::Allow { rule } => {
                counters::packet_allowed();
                info!(
                    %switch,
                    src = %frame.src,
                    dst = %frame.dst,
                    rule,
                    verdict = "allow",
                    "flow admitted"
                );

                if let Err(e) = self
                    .programmer
                    .install_flow(session.handle, &FlowDirective::forward(matches))
                {
                    counters::directive_failed();
                    error!(%switch, error = %e, "failed to install forward flow, packet lost");
                    return;
                }

                // Release the packet that triggered the decision; the new
                // flow entry only covers packets arriving after it.
                if let Err(e) = self.programmer.transmit(
                    session.handle,
                    in_port,
                    FlowAction::Forward,
                    Some(payload),
                ) {
                    counters::directive_failed();
                    error!(%switch, error = %e, "failed to transmit admitted packet, packet lost");
                }
            }
            Verdict::Deny { rule } => {
                counters::packet_denied();
                info!(
                    %switch,
                    src = %frame.src,
                    dst = %frame.dst,
                    rule = rule.map(|r| r as i64).unwrap_or(-1),
                    verdict = "deny",
                    "flow blocked"
                );

                // The in-flight packet is discarded along with the flow.
                if let Err(e) = self
                    .programmer
                    .install_flow(session.handle, &FlowDirective::drop_flow(matches))
                {
                    counters::directive_failed();
                    error!(%switch, error = %e, "failed to install drop flow");
                }
            }
        }
    }

    /// A switch connection went away. Forget the session; the switch will
    /// re-handshake and get a fresh table-miss directive on reconnect.
    /// Returns false if the switch had no session.
    pub async fn on_switch_disconnected(&self, switch: SwitchId) -> bool {
        if self.sessions.remove(switch).await {
            counters::switch_disconnected();
            info!(%switch, "switch disconnected");
            true
        } else {
            warn!(%switch, "disconnect for unknown switch");
            false
        }
    }

    /// Number of live switch sessions.
    pub async fn session_count(&self) -> usize {
        self.sessions.count().await
    }
}
