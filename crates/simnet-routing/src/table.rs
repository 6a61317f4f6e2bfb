//! The static routing table: unicast network routes and multicast routes.
//!
//! Both collections preserve insertion order and perform no deduplication;
//! the same tuple may appear multiple times and first-match semantics under
//! ties are observable. Index accessors treat an out-of-range index as a
//! programming error and panic.

use crate::entry::{MulticastRouteEntry, NetworkRouteEntry};
use simnet_types::{Ipv4Address, Ipv4Mask};
use tracing::debug;

/// The two route collections owned by one routing engine instance.
#[derive(Debug, Clone, Default)]
pub struct StaticRoutingTable {
    network_routes: Vec<NetworkRouteEntry>,
    multicast_routes: Vec<MulticastRouteEntry>,
}

impl StaticRoutingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a gatewayless route to a directly connected network.
    pub fn add_network_route(
        &mut self,
        network: Ipv4Address,
        mask: Ipv4Mask,
        interface: u32,
        metric: u32,
    ) {
        self.network_routes
            .push(NetworkRouteEntry::network(network, mask, interface, metric));
    }

    /// Appends a route to a network reachable through a gateway.
    pub fn add_network_route_via(
        &mut self,
        network: Ipv4Address,
        mask: Ipv4Mask,
        gateway: Ipv4Address,
        interface: u32,
        metric: u32,
    ) {
        self.network_routes.push(NetworkRouteEntry::network_via(
            network, mask, gateway, interface, metric,
        ));
    }

    /// Appends a /32 route to a single host.
    pub fn add_host_route(&mut self, dest: Ipv4Address, interface: u32, metric: u32) {
        self.add_network_route(dest, Ipv4Mask::ONES, interface, metric);
    }

    /// Appends a /32 route to a single host through a gateway.
    pub fn add_host_route_via(
        &mut self,
        dest: Ipv4Address,
        gateway: Ipv4Address,
        interface: u32,
        metric: u32,
    ) {
        self.add_network_route_via(dest, Ipv4Mask::ONES, gateway, interface, metric);
    }

    /// Appends a default (0.0.0.0/0) route through a gateway.
    pub fn set_default_route(&mut self, gateway: Ipv4Address, interface: u32, metric: u32) {
        self.add_network_route_via(
            Ipv4Address::UNSPECIFIED,
            Ipv4Mask::ZERO,
            gateway,
            interface,
            metric,
        );
    }

    /// Appends a multicast route.
    pub fn add_multicast_route(
        &mut self,
        origin: Ipv4Address,
        group: Ipv4Address,
        input_interface: u32,
        output_interfaces: Vec<u32>,
    ) {
        self.multicast_routes.push(MulticastRouteEntry::new(
            origin,
            group,
            input_interface,
            output_interfaces,
        ));
    }

    /// Appends the default multicast route as a 224.0.0.0/240.0.0.0 entry in
    /// the unicast table with metric 0.
    ///
    /// The entry is consulted only when originating packets; the forwarding
    /// path never reads the unicast table for multicast destinations.
    pub fn set_default_multicast_route(&mut self, output_interface: u32) {
        let network = Ipv4Address::new(224, 0, 0, 0);
        let mask = Ipv4Mask::from_prefix_len(4);
        self.add_network_route(network, mask, output_interface, 0);
    }

    pub fn n_routes(&self) -> usize {
        self.network_routes.len()
    }

    /// Returns the `index`-th unicast route in insertion order.
    pub fn route(&self, index: usize) -> &NetworkRouteEntry {
        &self.network_routes[index]
    }

    /// Returns the metric of the `index`-th unicast route.
    pub fn metric(&self, index: usize) -> u32 {
        self.network_routes[index].metric
    }

    /// Removes the `index`-th unicast route.
    pub fn remove_route(&mut self, index: usize) {
        let removed = self.network_routes.remove(index);
        debug!(route = %removed, "removed network route");
    }

    /// Returns the /0 route with the lowest metric. On an exact metric tie
    /// the scan keeps overwriting, so the last tied entry wins. `None` if no
    /// default route is installed.
    pub fn default_route(&self) -> Option<NetworkRouteEntry> {
        let mut shortest_metric = u32::MAX;
        let mut result = None;
        for entry in &self.network_routes {
            if entry.dest_mask.prefix_len() != 0 {
                continue;
            }
            if entry.metric > shortest_metric {
                continue;
            }
            shortest_metric = entry.metric;
            result = Some(*entry);
        }
        result
    }

    pub fn n_multicast_routes(&self) -> usize {
        self.multicast_routes.len()
    }

    /// Returns the `index`-th multicast route in insertion order.
    pub fn multicast_route(&self, index: usize) -> &MulticastRouteEntry {
        &self.multicast_routes[index]
    }

    /// Removes the `index`-th multicast route.
    pub fn remove_multicast_route(&mut self, index: usize) {
        self.multicast_routes.remove(index);
    }

    /// Removes the first multicast route matching (origin, group, input
    /// interface) exactly. Returns whether a route was removed.
    pub fn remove_multicast_route_matching(
        &mut self,
        origin: Ipv4Address,
        group: Ipv4Address,
        input_interface: u32,
    ) -> bool {
        let position = self.multicast_routes.iter().position(|route| {
            route.origin == origin
                && route.group == group
                && route.input_interface == input_interface
        });
        match position {
            Some(index) => {
                self.multicast_routes.remove(index);
                true
            }
            None => false,
        }
    }

    /// Removes every unicast route through the given interface. Multicast
    /// routes are not touched.
    pub fn purge_interface(&mut self, interface: u32) {
        self.network_routes
            .retain(|route| route.interface != interface);
    }

    /// Removes every connected (network-typed, gatewayless or not) route on
    /// the interface whose (network, mask) matches the given pair.
    pub fn purge_connected(&mut self, interface: u32, network: Ipv4Address, mask: Ipv4Mask) {
        self.network_routes.retain(|route| {
            !(route.interface == interface
                && route.is_network()
                && route.dest_network == network
                && route.dest_mask == mask)
        });
    }

    /// Drops every entry in both tables.
    pub fn clear(&mut self) {
        self.network_routes.clear();
        self.multicast_routes.clear();
    }

    pub(crate) fn network_routes(&self) -> &[NetworkRouteEntry] {
        &self.network_routes
    }

    pub(crate) fn multicast_routes(&self) -> &[MulticastRouteEntry] {
        &self.multicast_routes
    }
}
