use tokio::sync::mpsc;

use crate::engine::SwitchId;
use crate::transport::SwitchHandle;

/// Events delivered from the protocol transport into the controller core.
///
/// The transport owns the connections; the core only sees this distilled
/// stream. Per-switch ordering is the transport's responsibility: for one
/// switch, `Connected` precedes every `PacketIn`, which precede
/// `Disconnected`.
#[derive(Debug, Clone)]
pub enum SwitchEvent {
    /// A switch finished its protocol handshake
    Connected {
        switch: SwitchId,
        handle: SwitchHandle,
    },

    /// A packet missed every installed flow entry on the switch
    PacketIn {
        switch: SwitchId,
        in_port: u32,
        payload: Vec<u8>,
    },

    /// A switch connection closed
    Disconnected { switch: SwitchId },
}

/// Sender half handed to the protocol transport.
pub type EventSender = mpsc::Sender<SwitchEvent>;

/// Create the bounded transport-to-core event channel.
pub fn event_channel(capacity: usize) -> (EventSender, mpsc::Receiver<SwitchEvent>) {
    mpsc::channel(capacity)
}
