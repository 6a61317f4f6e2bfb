//! Route table entries and resolved-route records.
//!
//! Table entries are plain value records held directly in the table's
//! sequences; resolved routes are the ephemeral results handed to the host
//! stack's callbacks.

use serde::{Deserialize, Serialize};
use simnet_types::{DeviceId, Ipv4Address, Ipv4Mask};
use std::collections::HashMap;
use std::fmt;

/// Classification of a unicast route, derived from its mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    /// A /32 route to a single host.
    Host,
    /// A route to a network (any mask shorter than /32).
    Network,
}

/// A unicast network route.
///
/// A gateway of 0.0.0.0 means the destination is directly connected and no
/// next-hop is involved. Lower metrics are preferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkRouteEntry {
    pub dest_network: Ipv4Address,
    pub dest_mask: Ipv4Mask,
    pub gateway: Ipv4Address,
    pub interface: u32,
    pub metric: u32,
}

impl NetworkRouteEntry {
    /// Creates a gatewayless route to a directly connected network.
    pub fn network(network: Ipv4Address, mask: Ipv4Mask, interface: u32, metric: u32) -> Self {
        NetworkRouteEntry {
            dest_network: network,
            dest_mask: mask,
            gateway: Ipv4Address::UNSPECIFIED,
            interface,
            metric,
        }
    }

    /// Creates a route to a network reachable through a gateway.
    pub fn network_via(
        network: Ipv4Address,
        mask: Ipv4Mask,
        gateway: Ipv4Address,
        interface: u32,
        metric: u32,
    ) -> Self {
        NetworkRouteEntry {
            dest_network: network,
            dest_mask: mask,
            gateway,
            interface,
            metric,
        }
    }

    /// Returns the derived route kind.
    pub fn kind(&self) -> RouteKind {
        if self.dest_mask == Ipv4Mask::ONES {
            RouteKind::Host
        } else {
            RouteKind::Network
        }
    }

    /// Returns true if this is a host (/32) route.
    pub fn is_host(&self) -> bool {
        self.kind() == RouteKind::Host
    }

    /// Returns true if this is a network route.
    pub fn is_network(&self) -> bool {
        self.kind() == RouteKind::Network
    }

    /// Returns true if the route goes through a gateway.
    pub fn is_gateway(&self) -> bool {
        self.gateway != Ipv4Address::UNSPECIFIED
    }

    /// Returns true if the destination falls under this route's prefix.
    pub fn matches(&self, destination: Ipv4Address) -> bool {
        self.dest_mask.is_match(destination, self.dest_network)
    }
}

impl fmt::Display for NetworkRouteEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} via {} if{} metric {}",
            self.dest_network,
            self.dest_mask.prefix_len(),
            self.gateway,
            self.interface,
            self.metric
        )
    }
}

/// A multicast route keyed by (origin, group, input interface).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MulticastRouteEntry {
    /// Expected source address, or 0.0.0.0 for any origin.
    pub origin: Ipv4Address,
    /// Multicast group address (224.0.0.0/4).
    pub group: Ipv4Address,
    /// Interface ingress is expected on, or [`IF_ANY`](crate::IF_ANY).
    pub input_interface: u32,
    /// Interfaces to replicate the packet to, in order.
    pub output_interfaces: Vec<u32>,
}

impl MulticastRouteEntry {
    pub fn new(
        origin: Ipv4Address,
        group: Ipv4Address,
        input_interface: u32,
        output_interfaces: Vec<u32>,
    ) -> Self {
        MulticastRouteEntry {
            origin,
            group,
            input_interface,
            output_interfaces,
        }
    }
}

/// The result of a unicast lookup, handed to the forwarding callback or
/// returned from `route_output`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedRoute {
    pub destination: Ipv4Address,
    pub source: Ipv4Address,
    pub gateway: Ipv4Address,
    pub output_device: DeviceId,
}

/// The result of a multicast lookup: the parent (ingress) interface and a
/// TTL budget per output interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedMulticastRoute {
    pub origin: Ipv4Address,
    pub group: Ipv4Address,
    /// Ingress interface of the matched route (may be the IF_ANY sentinel).
    pub parent: u32,
    pub output_ttls: HashMap<u32, u8>,
}

impl ResolvedMulticastRoute {
    /// Largest TTL a replicated packet may leave with.
    pub const MAX_TTL: u8 = 255;
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn addr(s: &str) -> Ipv4Address {
        s.parse().unwrap()
    }

    #[test]
    fn test_kind_derivation() {
        let host = NetworkRouteEntry::network(addr("10.0.0.1"), Ipv4Mask::ONES, 1, 0);
        assert_eq!(host.kind(), RouteKind::Host);
        assert!(host.is_host());
        assert!(!host.is_gateway());

        let net = NetworkRouteEntry::network(addr("10.0.0.0"), Ipv4Mask::from_prefix_len(8), 1, 0);
        assert_eq!(net.kind(), RouteKind::Network);
        assert!(net.is_network());

        let via = NetworkRouteEntry::network_via(
            addr("0.0.0.0"),
            Ipv4Mask::ZERO,
            addr("192.168.1.1"),
            0,
            0,
        );
        assert!(via.is_gateway());
        assert!(via.is_network());
    }

    #[test]
    fn test_matches() {
        let entry = NetworkRouteEntry::network(addr("10.1.0.0"), Ipv4Mask::from_prefix_len(16), 2, 0);
        assert!(entry.matches(addr("10.1.2.3")));
        assert!(!entry.matches(addr("10.2.2.3")));

        let default = NetworkRouteEntry::network(addr("0.0.0.0"), Ipv4Mask::ZERO, 0, 0);
        assert!(default.matches(addr("8.8.8.8")));
    }

    #[test]
    fn test_display() {
        let entry = NetworkRouteEntry::network_via(
            addr("10.0.0.0"),
            Ipv4Mask::from_prefix_len(8),
            addr("192.168.1.1"),
            3,
            5,
        );
        assert_eq!(entry.to_string(), "10.0.0.0/8 via 192.168.1.1 if3 metric 5");
    }
}
