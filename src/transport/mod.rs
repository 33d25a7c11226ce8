//! Protocol-transport collaborator boundary.
//!
//! The controller core never touches sockets or wire encoding. A transport
//! frontend owns the switch connections, delivers [`crate::bootstrap::SwitchEvent`]s
//! into the core, and consumes flow directives through [`FlowProgrammer`].

mod mock;

pub use self::mock::{MockFabric, Transmission};

use thiserror::Error;

use crate::controller::{FlowAction, FlowDirective};

/// Opaque per-connection token minted by the transport.
///
/// The core stores it only to correlate directives back to the connection
/// that raised the event; the connection itself stays with the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SwitchHandle(pub u64);

/// Errors surfaced by directive emission.
///
/// Emission failures are terminal for the packet concerned: the core logs
/// them and moves on, it never retries.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("switch connection closed")]
    Closed,

    #[error("directive emission failed: {0}")]
    Emission(String),
}

/// Consumer of flow directives, implemented by the protocol transport.
///
/// Both operations are non-blocking hand-offs: the transport enqueues the
/// work onto the connection it owns and reports failure immediately if that
/// is not possible.
pub trait FlowProgrammer: Send + Sync {
    /// Install a flow entry on the switch behind `handle`.
    ///
    /// A [`FlowAction::Drop`] directive encodes as a flow entry with an empty
    /// action set, which silently discards matching packets in hardware.
    fn install_flow(&self, handle: SwitchHandle, directive: &FlowDirective)
        -> Result<(), TransportError>;

    /// Transmit the in-flight payload (or release the buffered packet) with
    /// the given action so the packet that triggered the decision is not
    /// lost while its flow entry is being installed.
    fn transmit(
        &self,
        handle: SwitchHandle,
        in_port: u32,
        action: FlowAction,
        payload: Option<&[u8]>,
    ) -> Result<(), TransportError>;
}
