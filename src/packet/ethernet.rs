//! Ethernet header decoding for packet-in payloads.
//!
//! Only the outer Ethernet header is decoded here; anything past the
//! ethertype is opaque to the controller and forwarded untouched.

use thiserror::Error;

use super::MacAddress;

/// Minimum length of an untagged Ethernet header.
pub const HEADER_LEN: usize = 14;

/// Ethertype carried by link-layer discovery (LLDP) frames.
pub const ETHERTYPE_LLDP: u16 = 0x88cc;

/// Error produced when a packet-in payload cannot be decoded.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("truncated ethernet frame: {len} bytes, need 14")]
    Truncated { len: usize },
}

/// Decoded Ethernet header of a packet-in payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EthernetFrame {
    pub dst: MacAddress,
    pub src: MacAddress,
    pub ethertype: u16,
}

impl EthernetFrame {
    /// Decode the Ethernet header at the front of `payload`.
    pub fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        if payload.len() < HEADER_LEN {
            return Err(DecodeError::Truncated { len: payload.len() });
        }

        let mut dst = [0u8; 6];
        let mut src = [0u8; 6];
        dst.copy_from_slice(&payload[0..6]);
        src.copy_from_slice(&payload[6..12]);
        let ethertype = u16::from_be_bytes([payload[12], payload[13]]);

        Ok(EthernetFrame {
            dst: MacAddress::new(dst),
            src: MacAddress::new(src),
            ethertype,
        })
    }

    /// True if this frame carries link-layer discovery traffic.
    pub fn is_lldp(&self) -> bool {
        self.ethertype == ETHERTYPE_LLDP
    }
}
