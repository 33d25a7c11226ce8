mod ethernet;
mod mac;

pub use self::ethernet::{DecodeError, EthernetFrame, ETHERTYPE_LLDP, HEADER_LEN};
pub use self::mac::{MacAddress, ParseMacError};
