//! The static routing protocol: table mutation surface, the output/input
//! facade toward the host stack, and the lifecycle hooks that keep connected
//! routes in sync with interface state.

use crate::config::RoutingConfig;
use crate::entry::{MulticastRouteEntry, NetworkRouteEntry, ResolvedMulticastRoute, ResolvedRoute};
use crate::packet::{Ipv4Header, Packet};
use crate::stack::{Ipv4Stack, SocketErrno};
use crate::table::StaticRoutingTable;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use simnet_types::{DeviceId, InterfaceAddress, Ipv4Address, Ipv4Mask};
use std::rc::Rc;
use tracing::debug;

/// The IPv4 static routing engine.
///
/// One instance serves one simulated node. It owns the routing table, borrows
/// the host IPv4 stack through [`Ipv4Stack`], and runs entirely on the
/// simulator's single logical thread; every operation completes synchronously
/// and callbacks are invoked before the facade returns.
pub struct StaticRouting {
    pub(crate) config: RoutingConfig,
    pub(crate) table: StaticRoutingTable,
    pub(crate) ipv4: Option<Rc<dyn Ipv4Stack>>,
    pub(crate) rng: SmallRng,
}

impl StaticRouting {
    /// Creates an engine with the given configuration and an entropy-seeded
    /// RNG for random ECMP.
    ///
    /// # Panics
    ///
    /// Panics if both ECMP modes are enabled.
    pub fn new(config: RoutingConfig) -> Self {
        config.assert_ecmp_exclusive();
        StaticRouting {
            config,
            table: StaticRoutingTable::new(),
            ipv4: None,
            rng: SmallRng::from_entropy(),
        }
    }

    /// Creates an engine whose ECMP RNG is seeded deterministically.
    pub fn with_seed(config: RoutingConfig, seed: u64) -> Self {
        config.assert_ecmp_exclusive();
        StaticRouting {
            config,
            table: StaticRoutingTable::new(),
            ipv4: None,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Binds the engine to the host IPv4 stack and replays up/down
    /// notifications for every current interface.
    ///
    /// # Panics
    ///
    /// Panics if called more than once.
    pub fn set_ipv4(&mut self, ipv4: Rc<dyn Ipv4Stack>) {
        assert!(
            self.ipv4.is_none(),
            "set_ipv4 may only be called once per engine"
        );
        self.ipv4 = Some(Rc::clone(&ipv4));
        for i in 0..ipv4.n_interfaces() {
            if ipv4.is_up(i) {
                self.notify_interface_up(i);
            } else {
                self.notify_interface_down(i);
            }
        }
    }

    pub(crate) fn stack(&self) -> Rc<dyn Ipv4Stack> {
        Rc::clone(
            self.ipv4
                .as_ref()
                .expect("routing engine is not bound to an IPv4 stack"),
        )
    }

    // ===== Table mutation surface =====

    pub fn add_network_route(
        &mut self,
        network: Ipv4Address,
        mask: Ipv4Mask,
        interface: u32,
        metric: u32,
    ) {
        debug!(%network, %mask, interface, metric, "add network route");
        self.table.add_network_route(network, mask, interface, metric);
    }

    pub fn add_network_route_via(
        &mut self,
        network: Ipv4Address,
        mask: Ipv4Mask,
        gateway: Ipv4Address,
        interface: u32,
        metric: u32,
    ) {
        debug!(%network, %mask, %gateway, interface, metric, "add network route via gateway");
        self.table
            .add_network_route_via(network, mask, gateway, interface, metric);
    }

    pub fn add_host_route(&mut self, dest: Ipv4Address, interface: u32, metric: u32) {
        debug!(%dest, interface, metric, "add host route");
        self.table.add_host_route(dest, interface, metric);
    }

    pub fn add_host_route_via(
        &mut self,
        dest: Ipv4Address,
        gateway: Ipv4Address,
        interface: u32,
        metric: u32,
    ) {
        debug!(%dest, %gateway, interface, metric, "add host route via gateway");
        self.table.add_host_route_via(dest, gateway, interface, metric);
    }

    pub fn set_default_route(&mut self, gateway: Ipv4Address, interface: u32, metric: u32) {
        debug!(%gateway, interface, metric, "set default route");
        self.table.set_default_route(gateway, interface, metric);
    }

    pub fn add_multicast_route(
        &mut self,
        origin: Ipv4Address,
        group: Ipv4Address,
        input_interface: u32,
        output_interfaces: Vec<u32>,
    ) {
        debug!(%origin, %group, input_interface, "add multicast route");
        self.table
            .add_multicast_route(origin, group, input_interface, output_interfaces);
    }

    pub fn set_default_multicast_route(&mut self, output_interface: u32) {
        debug!(output_interface, "set default multicast route");
        self.table.set_default_multicast_route(output_interface);
    }

    pub fn n_routes(&self) -> usize {
        self.table.n_routes()
    }

    pub fn route(&self, index: usize) -> &NetworkRouteEntry {
        self.table.route(index)
    }

    pub fn metric(&self, index: usize) -> u32 {
        self.table.metric(index)
    }

    pub fn remove_route(&mut self, index: usize) {
        self.table.remove_route(index);
    }

    pub fn default_route(&self) -> Option<NetworkRouteEntry> {
        self.table.default_route()
    }

    pub fn n_multicast_routes(&self) -> usize {
        self.table.n_multicast_routes()
    }

    pub fn multicast_route(&self, index: usize) -> &MulticastRouteEntry {
        self.table.multicast_route(index)
    }

    pub fn remove_multicast_route(&mut self, index: usize) {
        self.table.remove_multicast_route(index);
    }

    pub fn remove_multicast_route_matching(
        &mut self,
        origin: Ipv4Address,
        group: Ipv4Address,
        input_interface: u32,
    ) -> bool {
        self.table
            .remove_multicast_route_matching(origin, group, input_interface)
    }

    // ===== Facade toward the host stack =====

    /// Selects an egress route for a locally originated packet.
    ///
    /// Multicast destinations fall through to the unicast table: default
    /// multicast routes are stored there and forwarding never consults them,
    /// so origination is tied to a single interface per group.
    pub fn route_output(
        &mut self,
        packet: &Packet,
        header: &Ipv4Header,
        oif: Option<DeviceId>,
    ) -> (Option<ResolvedRoute>, SocketErrno) {
        if header.destination.is_multicast() {
            debug!(destination = %header.destination, "multicast origination, consulting unicast table");
        }
        match self.lookup_unicast(header, packet, oif) {
            Some(route) => (Some(route), SocketErrno::NoError),
            None => (None, SocketErrno::NoRouteToHost),
        }
    }

    /// Routes a received packet: multicast dispatch, local delivery under the
    /// weak end-system model, or unicast forwarding.
    ///
    /// Returns true if one of the callbacks took the packet; false if another
    /// routing protocol may still handle it. Each callback is invoked at most
    /// once.
    ///
    /// # Panics
    ///
    /// Panics if the engine is unbound or `in_device` is not a known IPv4
    /// interface.
    pub fn route_input<U, M, L, E>(
        &mut self,
        packet: &Packet,
        header: &Ipv4Header,
        in_device: DeviceId,
        ucb: U,
        mcb: M,
        lcb: L,
        ecb: E,
    ) -> bool
    where
        U: FnOnce(ResolvedRoute, &Packet, &Ipv4Header),
        M: FnOnce(ResolvedMulticastRoute, &Packet, &Ipv4Header),
        L: FnOnce(&Packet, &Ipv4Header, u32),
        E: FnOnce(&Packet, &Ipv4Header, SocketErrno),
    {
        let ipv4 = self.stack();
        let iif = ipv4
            .interface_for_device(in_device)
            .expect("ingress device is not a known IPv4 interface");

        if header.destination.is_multicast() {
            debug!(destination = %header.destination, iif, "multicast destination");
            return match self.lookup_multicast(header.source, header.destination, iif) {
                Some(mroute) => {
                    mcb(mroute, packet, header);
                    true
                }
                // Let other routing protocols try to handle this.
                None => false,
            };
        }

        if header.destination.is_global_broadcast() {
            // Recognized but neither delivered nor forwarded here.
            debug!("limited broadcast destination, falling through");
        }

        // Weak end-system model: accept delivery when the destination matches
        // any local address on any interface, not only the ingress one.
        for j in 0..ipv4.n_interfaces() {
            for i in 0..ipv4.n_addresses(j) {
                let iaddr = ipv4.address(j, i);
                if header.destination == iaddr.local {
                    if j != iif {
                        debug!(destination = %header.destination, interface = j, iif,
                               "local delivery for an address on another interface");
                    }
                    lcb(packet, header, iif);
                    return true;
                }
                if header.destination == iaddr.broadcast {
                    debug!(destination = %header.destination, interface = j,
                           "local delivery for an interface broadcast address");
                    lcb(packet, header, iif);
                    return true;
                }
            }
        }

        if !ipv4.is_forwarding(iif) {
            debug!(iif, "forwarding disabled on ingress interface");
            ecb(packet, header, SocketErrno::NoRouteToHost);
            return false;
        }

        match self.lookup_unicast(header, packet, None) {
            Some(route) => {
                ucb(route, packet, header);
                true
            }
            None => false,
        }
    }

    // ===== Lifecycle hooks =====

    /// Synthesizes a connected route for every usable address on the
    /// interface. Addresses with an unspecified local part, a zero mask, or
    /// an all-ones mask carry no network and are skipped.
    pub fn notify_interface_up(&mut self, interface: u32) {
        let ipv4 = self.stack();
        for j in 0..ipv4.n_addresses(interface) {
            let iaddr = ipv4.address(interface, j);
            if Self::carries_network(&iaddr) {
                self.add_network_route(
                    iaddr.local.combine_mask(iaddr.mask),
                    iaddr.mask,
                    interface,
                    0,
                );
            }
        }
    }

    /// Removes every unicast route through the interface.
    pub fn notify_interface_down(&mut self, interface: u32) {
        debug!(interface, "interface down, purging its routes");
        self.table.purge_interface(interface);
    }

    /// Synthesizes the connected route for one newly added address, if the
    /// interface is up and the address carries a network.
    pub fn notify_add_address(&mut self, interface: u32, address: InterfaceAddress) {
        let ipv4 = self.stack();
        if !ipv4.is_up(interface) {
            return;
        }
        if Self::carries_network(&address) {
            self.add_network_route(
                address.local.combine_mask(address.mask),
                address.mask,
                interface,
                0,
            );
        }
    }

    /// Removes the connected network route matching a removed address, if the
    /// interface is up.
    pub fn notify_remove_address(&mut self, interface: u32, address: InterfaceAddress) {
        let ipv4 = self.stack();
        if !ipv4.is_up(interface) {
            return;
        }
        debug!(interface, local = %address.local, "address removed, purging connected route");
        self.table.purge_connected(
            interface,
            address.local.combine_mask(address.mask),
            address.mask,
        );
    }

    /// Releases every table entry and drops the stack binding.
    pub fn reset(&mut self) {
        self.table.clear();
        self.ipv4 = None;
    }

    fn carries_network(address: &InterfaceAddress) -> bool {
        address.local != Ipv4Address::UNSPECIFIED
            && address.mask != Ipv4Mask::ZERO
            && address.mask != Ipv4Mask::ONES
    }
}
