//! Common types for the simnet discrete-event network simulator.
//!
//! This crate provides type-safe representations of the network primitives
//! shared between the simulator core and its protocol models:
//!
//! - [`Ipv4Address`]: 32-bit IPv4 addresses with simulator-relevant predicates
//! - [`Ipv4Mask`]: contiguous-prefix IPv4 network masks
//! - [`InterfaceAddress`]: an (address, mask, broadcast, secondary) record as
//!   configured on an IPv4 interface
//! - [`DeviceId`]: an opaque handle for a net device registered with the
//!   simulator's device registry

mod interface;
mod ip;

pub use interface::{DeviceId, InterfaceAddress};
pub use ip::{Ipv4Address, Ipv4Mask};

/// Common error type for parsing failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid IPv4 address format: {0}")]
    InvalidIpAddress(String),

    #[error("invalid IPv4 mask: {0} (must be a contiguous prefix)")]
    InvalidMask(String),
}
