//! In-memory switch fabric for tests and standalone runs.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use tracing::trace;

use crate::controller::{FlowAction, FlowDirective};

use super::{FlowProgrammer, SwitchHandle, TransportError};

/// A recorded transmit call.
#[derive(Debug, Clone)]
pub struct Transmission {
    pub handle: SwitchHandle,
    pub in_port: u32,
    pub action: FlowAction,
    pub payload: Option<Vec<u8>>,
}

/// Mock fabric that records directives without any switch connections.
///
/// Used by integration tests (in place of a live topology) and by the
/// standalone binary. `fail_next_emission` injects one emission failure to
/// exercise the no-retry error path.
#[derive(Debug, Default)]
pub struct MockFabric {
    installed: Mutex<Vec<(SwitchHandle, FlowDirective)>>,
    transmitted: Mutex<Vec<Transmission>>,
    fail_next: AtomicBool,
    emissions: AtomicU64,
}

impl MockFabric {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next emission (install or transmit) fail.
    pub fn fail_next_emission(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    /// Directives installed on the switch behind `handle`, in order.
    pub fn installed_for(&self, handle: SwitchHandle) -> Vec<FlowDirective> {
        self.installed
            .lock()
            .expect("mock fabric lock poisoned")
            .iter()
            .filter(|(h, _)| *h == handle)
            .map(|(_, d)| d.clone())
            .collect()
    }

    /// All recorded transmissions, in order.
    pub fn transmissions(&self) -> Vec<Transmission> {
        self.transmitted
            .lock()
            .expect("mock fabric lock poisoned")
            .clone()
    }

    /// Total successful emissions (installs plus transmissions).
    pub fn emission_count(&self) -> u64 {
        self.emissions.load(Ordering::SeqCst)
    }

    fn check_fault(&self) -> Result<(), TransportError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(TransportError::Emission("injected fault".into()));
        }
        Ok(())
    }
}

impl FlowProgrammer for MockFabric {
    fn install_flow(
        &self,
        handle: SwitchHandle,
        directive: &FlowDirective,
    ) -> Result<(), TransportError> {
        self.check_fault()?;

        trace!(?handle, ?directive, "mock fabric: flow installed");
        self.installed
            .lock()
            .expect("mock fabric lock poisoned")
            .push((handle, directive.clone()));
        self.emissions.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn transmit(
        &self,
        handle: SwitchHandle,
        in_port: u32,
        action: FlowAction,
        payload: Option<&[u8]>,
    ) -> Result<(), TransportError> {
        self.check_fault()?;

        trace!(?handle, in_port, ?action, "mock fabric: packet transmitted");
        self.transmitted
            .lock()
            .expect("mock fabric lock poisoned")
            .push(Transmission {
                handle,
                in_port,
                action,
                payload: payload.map(<[u8]>::to_vec),
            });
        self.emissions.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
