//! Unicast and multicast route lookup.
//!
//! Unicast selection scans every network route in insertion order, keeping
//! the candidates with the longest matching prefix and, at that prefix
//! length, the smallest metric. Ties are broken by the configured ECMP
//! policy, defaulting to the first-inserted candidate.

use crate::entry::{ResolvedMulticastRoute, ResolvedRoute};
use crate::packet::{Ipv4Header, Packet, TCP_PROTOCOL, UDP_PROTOCOL};
use crate::protocol::StaticRouting;
use crate::stack::IF_ANY;
use rand::Rng;
use simnet_types::{DeviceId, Ipv4Address};
use std::collections::HashMap;
use tracing::{debug, trace};

/// Sums the 5-tuple into a flow key. The value is allowed to wrap; protocols
/// other than UDP and TCP contribute no port bits.
pub(crate) fn flow_hash(header: &Ipv4Header, payload: &Packet) -> u32 {
    let mut tuple_value = header
        .source
        .to_u32()
        .wrapping_add(header.destination.to_u32())
        .wrapping_add(u32::from(header.protocol));
    if header.protocol == UDP_PROTOCOL || header.protocol == TCP_PROTOCOL {
        if let Some((source_port, destination_port)) = payload.peek_transport_ports() {
            trace!(source_port, destination_port, "flow hash over transport ports");
            tuple_value = tuple_value
                .wrapping_add(u32::from(source_port))
                .wrapping_add(u32::from(destination_port));
        }
    }
    tuple_value
}

impl StaticRouting {
    /// Selects the best unicast route for the header, optionally constrained
    /// to one output device.
    ///
    /// # Panics
    ///
    /// Panics if both ECMP modes are enabled, or if the destination is
    /// link-local multicast and no constraint device is given.
    pub(crate) fn lookup_unicast(
        &mut self,
        header: &Ipv4Header,
        payload: &Packet,
        oif: Option<DeviceId>,
    ) -> Option<ResolvedRoute> {
        self.config.assert_ecmp_exclusive();
        let ipv4 = self.stack();

        // Link-local multicast never leaves the link: the caller has to name
        // the interface, and the packet goes out gatewayless.
        if header.destination.is_link_local_multicast() {
            let oif = oif.expect(
                "link-local multicast destination requires an output device constraint",
            );
            let interface = ipv4
                .interface_for_device(oif)
                .expect("constraint device is not a known IPv4 interface");
            return Some(ResolvedRoute {
                destination: header.destination,
                source: ipv4.address(interface, 0).local,
                gateway: Ipv4Address::UNSPECIFIED,
                output_device: oif,
            });
        }

        let mut longest_mask: u8 = 0;
        let mut shortest_metric = u32::MAX;
        let mut candidates: Vec<usize> = Vec::new();

        for (index, entry) in self.table.network_routes().iter().enumerate() {
            if !entry.matches(header.destination) {
                continue;
            }
            let masklen = entry.dest_mask.prefix_len();
            trace!(destination = %header.destination, route = %entry, masklen,
                   "candidate network route");
            if let Some(oif) = oif {
                if oif != ipv4.net_device(entry.interface) {
                    trace!(route = %entry, "not on requested device, skipping");
                    continue;
                }
            }
            if masklen < longest_mask {
                continue;
            }
            if masklen > longest_mask {
                // A longer prefix supersedes every earlier candidate.
                shortest_metric = u32::MAX;
                candidates.clear();
            }
            longest_mask = masklen;
            if entry.metric > shortest_metric {
                continue;
            }
            if entry.metric < shortest_metric {
                candidates.clear();
            }
            shortest_metric = entry.metric;
            candidates.push(index);
        }

        if candidates.is_empty() {
            debug!(destination = %header.destination, "no matching route");
            return None;
        }

        let select_index = if self.config.random_ecmp_routing {
            self.rng.gen_range(0..candidates.len())
        } else if self.config.flow_ecmp_routing && candidates.len() > 1 {
            flow_hash(header, payload) as usize % candidates.len()
        } else {
            0
        };

        let route = *self.table.route(candidates[select_index]);
        let interface = route.interface;
        let resolved = ResolvedRoute {
            destination: route.dest_network,
            source: self.source_address_selection(interface, route.dest_network),
            gateway: route.gateway,
            output_device: ipv4.net_device(interface),
        };
        debug!(destination = %header.destination, gateway = %resolved.gateway,
               interface, "selected route");
        Some(resolved)
    }

    /// Finds the first multicast route for (origin, group, input interface).
    ///
    /// A route matches when its group equals the query group and its input
    /// interface is either the query interface or the IF_ANY wildcard.
    /// Source-specific matches are noted but dispatched like group matches.
    pub(crate) fn lookup_multicast(
        &self,
        origin: Ipv4Address,
        group: Ipv4Address,
        interface: u32,
    ) -> Option<ResolvedMulticastRoute> {
        for route in self.table.multicast_routes() {
            if origin == route.origin && group == route.group {
                debug!(%origin, %group, "source-specific multicast match, dispatching as group match");
            }
            if group == route.group
                && (route.input_interface == IF_ANY || route.input_interface == interface)
            {
                let mut output_ttls = HashMap::new();
                for &output in &route.output_interfaces {
                    if output != 0 {
                        output_ttls.insert(output, ResolvedMulticastRoute::MAX_TTL - 1);
                    }
                }
                debug!(%group, parent = route.input_interface, "multicast route found");
                return Some(ResolvedMulticastRoute {
                    origin: route.origin,
                    group: route.group,
                    parent: route.input_interface,
                    output_ttls,
                });
            }
        }
        debug!(%group, interface, "no multicast route");
        None
    }

    /// Picks the source address for packets leaving `interface` toward
    /// `destination`: the only address if there is exactly one, otherwise the
    /// first non-secondary on-link address, otherwise the first address.
    pub(crate) fn source_address_selection(
        &self,
        interface: u32,
        destination: Ipv4Address,
    ) -> Ipv4Address {
        let ipv4 = self.stack();
        if ipv4.n_addresses(interface) == 1 {
            return ipv4.address(interface, 0).local;
        }
        let candidate = ipv4.address(interface, 0).local;
        for i in 0..ipv4.n_addresses(interface) {
            let test = ipv4.address(interface, i);
            if test.local.combine_mask(test.mask) == destination.combine_mask(test.mask)
                && !test.secondary
            {
                return test.local;
            }
        }
        candidate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn addr(s: &str) -> Ipv4Address {
        s.parse().unwrap()
    }

    #[test]
    fn test_flow_hash_udp_includes_ports() {
        let header = Ipv4Header::new(addr("10.0.0.1"), addr("10.0.0.2"), UDP_PROTOCOL);
        let payload = Packet::from_transport_ports(1000, 2000);
        let expected = addr("10.0.0.1")
            .to_u32()
            .wrapping_add(addr("10.0.0.2").to_u32())
            .wrapping_add(u32::from(UDP_PROTOCOL))
            .wrapping_add(1000)
            .wrapping_add(2000);
        assert_eq!(flow_hash(&header, &payload), expected);
    }

    #[test]
    fn test_flow_hash_other_protocols_ignore_ports() {
        let icmp = 1u8;
        let header = Ipv4Header::new(addr("10.0.0.1"), addr("10.0.0.2"), icmp);
        let with_ports = Packet::from_transport_ports(1000, 2000);
        let without = Packet::default();
        assert_eq!(flow_hash(&header, &with_ports), flow_hash(&header, &without));
    }

    #[test]
    fn test_flow_hash_tcp_matches_udp_composition() {
        let udp = Ipv4Header::new(addr("10.0.0.1"), addr("10.0.0.2"), UDP_PROTOCOL);
        let tcp = Ipv4Header::new(addr("10.0.0.1"), addr("10.0.0.2"), TCP_PROTOCOL);
        let payload = Packet::from_transport_ports(5, 7);
        assert_eq!(
            flow_hash(&tcp, &payload),
            flow_hash(&udp, &payload)
                .wrapping_add(u32::from(TCP_PROTOCOL))
                .wrapping_sub(u32::from(UDP_PROTOCOL))
        );
    }
}
