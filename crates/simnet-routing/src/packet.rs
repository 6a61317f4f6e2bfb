//! The IPv4 header view and the opaque payload handle.
//!
//! The routing core never parses full packets. It sees the already-decoded
//! IPv4 header plus an opaque payload handle, from which it may peek the
//! transport ports when computing a flow hash.

use serde::{Deserialize, Serialize};
use simnet_types::Ipv4Address;

/// IANA protocol number for TCP.
pub const TCP_PROTOCOL: u8 = 6;
/// IANA protocol number for UDP.
pub const UDP_PROTOCOL: u8 = 17;

/// The fields of an IPv4 header the routing decision depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ipv4Header {
    pub source: Ipv4Address,
    pub destination: Ipv4Address,
    pub protocol: u8,
}

impl Ipv4Header {
    pub fn new(source: Ipv4Address, destination: Ipv4Address, protocol: u8) -> Self {
        Ipv4Header {
            source,
            destination,
            protocol,
        }
    }
}

/// An opaque IP payload handle.
///
/// For UDP and TCP payloads the first four bytes are the big-endian source
/// and destination ports, which is all the flow hash ever peeks at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Packet {
    payload: Vec<u8>,
}

impl Packet {
    pub fn new(payload: Vec<u8>) -> Self {
        Packet { payload }
    }

    /// Builds a payload whose transport header carries the given ports.
    pub fn from_transport_ports(source_port: u16, destination_port: u16) -> Self {
        let mut payload = Vec::with_capacity(8);
        payload.extend_from_slice(&source_port.to_be_bytes());
        payload.extend_from_slice(&destination_port.to_be_bytes());
        Packet { payload }
    }

    /// Peeks the (source, destination) ports from the transport header, if
    /// the payload is long enough to carry one.
    pub fn peek_transport_ports(&self) -> Option<(u16, u16)> {
        if self.payload.len() < 4 {
            return None;
        }
        let src = u16::from_be_bytes([self.payload[0], self.payload[1]]);
        let dst = u16::from_be_bytes([self.payload[2], self.payload[3]]);
        Some((src, dst))
    }

    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_peek_transport_ports() {
        let packet = Packet::from_transport_ports(49152, 53);
        assert_eq!(packet.peek_transport_ports(), Some((49152, 53)));
    }

    #[test]
    fn test_peek_short_payload() {
        assert_eq!(Packet::default().peek_transport_ports(), None);
        assert_eq!(Packet::new(vec![0, 80]).peek_transport_ports(), None);
    }
}
