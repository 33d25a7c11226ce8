//! Flow directives handed to the protocol transport.

use crate::packet::MacAddress;

/// Priority of the baseline table-miss entry.
pub const TABLE_MISS_PRIORITY: u16 = 0;

/// Priority of per-flow forward/drop entries.
pub const FLOW_PRIORITY: u16 = 1;

/// What the switch should do with packets matching a directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowAction {
    /// Send the whole packet to the controller, unbuffered.
    Controller,
    /// Forward through the switch's normal pipeline.
    Forward,
    /// Discard. Encoded on the wire as an empty action set.
    Drop,
}

/// Header pattern a flow entry matches on. All fields unset is a catch-all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlowMatch {
    pub in_port: Option<u32>,
    pub src: Option<MacAddress>,
    pub dst: Option<MacAddress>,
}

impl FlowMatch {
    /// Match every packet.
    pub fn any() -> Self {
        Self::default()
    }

    /// Match one flow: ingress port plus source and destination MAC.
    pub fn flow(in_port: u32, src: MacAddress, dst: MacAddress) -> Self {
        Self {
            in_port: Some(in_port),
            src: Some(src),
            dst: Some(dst),
        }
    }

    /// True if no header field is constrained.
    pub fn is_catch_all(&self) -> bool {
        self.in_port.is_none() && self.src.is_none() && self.dst.is_none()
    }
}

/// The controller's decision artifact: one flow entry to install.
///
/// Consumed by the transport for wire encoding, never retained by the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowDirective {
    pub action: FlowAction,
    pub matches: FlowMatch,
    pub priority: u16,
}

impl FlowDirective {
    /// The baseline directive installed once per switch connection: any
    /// packet missing every installed flow goes to the controller whole.
    pub fn table_miss() -> Self {
        Self {
            action: FlowAction::Controller,
            matches: FlowMatch::any(),
            priority: TABLE_MISS_PRIORITY,
        }
    }

    /// Admit a flow: forward matching packets in hardware from now on.
    pub fn forward(matches: FlowMatch) -> Self {
        Self {
            action: FlowAction::Forward,
            matches,
            priority: FLOW_PRIORITY,
        }
    }

    /// Block a flow: matching packets are silently discarded from now on.
    pub fn drop_flow(matches: FlowMatch) -> Self {
        Self {
            action: FlowAction::Drop,
            matches,
            priority: FLOW_PRIORITY,
        }
    }
}
