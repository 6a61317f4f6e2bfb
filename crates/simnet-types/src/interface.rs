//! Interface address records and device handles.

use crate::{Ipv4Address, Ipv4Mask};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An opaque handle for a net device registered with the simulator's device
/// registry. The routing core never inspects the device itself; it only
/// forwards the handle between the host stack and its callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(u32);

impl DeviceId {
    pub const fn new(index: u32) -> Self {
        DeviceId(index)
    }

    pub const fn index(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dev{}", self.0)
    }
}

/// An IPv4 address as configured on an interface: the local address, its
/// network mask, the derived subnet-directed broadcast address, and whether
/// the address is secondary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceAddress {
    pub local: Ipv4Address,
    pub mask: Ipv4Mask,
    pub broadcast: Ipv4Address,
    pub secondary: bool,
}

impl InterfaceAddress {
    /// Creates a primary interface address with the broadcast address derived
    /// from the local address and mask.
    pub fn new(local: Ipv4Address, mask: Ipv4Mask) -> Self {
        InterfaceAddress {
            local,
            mask,
            broadcast: Ipv4Address::from_u32(local.to_u32() | !mask.bits()),
            secondary: false,
        }
    }

    /// Marks the address as secondary.
    pub fn secondary(mut self) -> Self {
        self.secondary = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_derived_broadcast() {
        let addr = InterfaceAddress::new(
            Ipv4Address::new(10, 0, 1, 5),
            Ipv4Mask::from_prefix_len(24),
        );
        assert_eq!(addr.broadcast, Ipv4Address::new(10, 0, 1, 255));
        assert!(!addr.secondary);
    }

    #[test]
    fn test_secondary() {
        let addr = InterfaceAddress::new(
            Ipv4Address::new(192, 168, 0, 1),
            Ipv4Mask::from_prefix_len(16),
        )
        .secondary();
        assert!(addr.secondary);
    }

    #[test]
    fn test_device_id() {
        let dev = DeviceId::new(3);
        assert_eq!(dev.index(), 3);
        assert_eq!(dev.to_string(), "dev3");
    }
}
