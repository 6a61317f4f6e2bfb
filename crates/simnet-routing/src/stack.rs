//! The host IPv4 stack capability consumed by the routing engine.

use simnet_types::{DeviceId, InterfaceAddress};

/// Sentinel interface index meaning "match any input interface" for
/// multicast routes.
pub const IF_ANY: u32 = u32::MAX;

/// Error codes the engine reports to the host stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SocketErrno {
    NoError,
    NoRouteToHost,
}

/// The slice of the host IPv4 stack the routing engine depends on.
///
/// The concrete stack is injected once via
/// [`StaticRouting::set_ipv4`](crate::StaticRouting::set_ipv4); the engine
/// borrows it and never assumes ownership of interfaces or devices. Interface
/// indices handed to these methods always come from the stack itself (either
/// through notifications or [`interface_for_device`](Self::interface_for_device)),
/// so an out-of-range index is a programming error on the stack side.
pub trait Ipv4Stack {
    /// Number of IPv4 interfaces currently configured.
    fn n_interfaces(&self) -> u32;

    /// Returns true if the interface is administratively up.
    fn is_up(&self, interface: u32) -> bool;

    /// Returns true if the interface may forward packets not addressed to
    /// this host.
    fn is_forwarding(&self, interface: u32) -> bool;

    /// Number of addresses configured on the interface.
    fn n_addresses(&self, interface: u32) -> u32;

    /// Returns the `index`-th address record of the interface.
    fn address(&self, interface: u32, index: u32) -> InterfaceAddress;

    /// Returns the net device backing the interface.
    fn net_device(&self, interface: u32) -> DeviceId;

    /// Resolves a device handle back to its interface index, if the device
    /// carries IPv4.
    fn interface_for_device(&self, device: DeviceId) -> Option<u32>;

    /// Looks the device up in the simulator's object name registry.
    fn device_name(&self, _device: DeviceId) -> Option<String> {
        None
    }
}
