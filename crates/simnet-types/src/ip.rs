//! IPv4 address and mask types with safe parsing.

use crate::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

/// An IPv4 address held as its raw 32-bit value.
///
/// The routing core spends its time masking, comparing, and summing address
/// bits, so the representation is the bare `u32`; `std::net::Ipv4Addr` only
/// appears at the parsing, display, and serde boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "Ipv4Addr", into = "Ipv4Addr")]
pub struct Ipv4Address(u32);

impl Ipv4Address {
    /// 0.0.0.0, also the "no gateway" marker on routes.
    pub const UNSPECIFIED: Self = Ipv4Address(0);
    /// The limited broadcast address, 255.255.255.255.
    pub const BROADCAST: Self = Ipv4Address(u32::MAX);

    pub const fn new(a: u8, b: u8, c: u8, d: u8) -> Self {
        Ipv4Address(u32::from_be_bytes([a, b, c, d]))
    }

    pub const fn from_u32(bits: u32) -> Self {
        Ipv4Address(bits)
    }

    pub const fn to_u32(&self) -> u32 {
        self.0
    }

    pub const fn octets(&self) -> [u8; 4] {
        self.0.to_be_bytes()
    }

    /// Returns true if this is a multicast address (224.0.0.0/4).
    pub const fn is_multicast(&self) -> bool {
        (self.0 & 0xf000_0000) == 0xe000_0000
    }

    /// Returns true if this is a link-local multicast address (224.0.0.0/24).
    pub const fn is_link_local_multicast(&self) -> bool {
        (self.0 & 0xffff_ff00) == 0xe000_0000
    }

    /// Returns true if this is the limited broadcast address (255.255.255.255).
    pub const fn is_global_broadcast(&self) -> bool {
        self.0 == u32::MAX
    }

    /// Returns the address masked down to its network part.
    pub const fn combine_mask(&self, mask: Ipv4Mask) -> Ipv4Address {
        Ipv4Address(self.0 & mask.bits())
    }
}

impl fmt::Display for Ipv4Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Ipv4Addr::from(self.0).fmt(f)
    }
}

impl FromStr for Ipv4Address {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<Ipv4Addr>() {
            Ok(addr) => Ok(Ipv4Address::from(addr)),
            Err(_) => Err(ParseError::InvalidIpAddress(s.to_string())),
        }
    }
}

impl From<Ipv4Addr> for Ipv4Address {
    fn from(addr: Ipv4Addr) -> Self {
        Ipv4Address(u32::from(addr))
    }
}

impl From<Ipv4Address> for Ipv4Addr {
    fn from(addr: Ipv4Address) -> Self {
        Ipv4Addr::from(addr.0)
    }
}

/// An IPv4 network mask.
///
/// Masks are always contiguous prefixes: the fallible constructors reject
/// bit patterns such as 255.0.255.0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ipv4Mask(u32);

impl Ipv4Mask {
    /// The zero mask, /0.
    pub const ZERO: Self = Ipv4Mask(0);
    /// The all-ones mask, /32.
    pub const ONES: Self = Ipv4Mask(u32::MAX);

    /// Creates a mask from raw bits.
    ///
    /// # Errors
    ///
    /// Returns an error if the bits do not form a contiguous prefix.
    pub fn new(bits: u32) -> Result<Self, ParseError> {
        if bits.leading_ones() + bits.trailing_zeros() != 32 {
            return Err(ParseError::InvalidMask(format!("{:#010x}", bits)));
        }
        Ok(Ipv4Mask(bits))
    }

    /// Creates a mask from a prefix length.
    ///
    /// # Panics
    ///
    /// Panics if `len` is greater than 32. An out-of-range prefix length is a
    /// programming error, not an input error.
    pub fn from_prefix_len(len: u8) -> Self {
        assert!(len <= 32, "prefix length {} out of range", len);
        if len == 0 {
            Ipv4Mask(0)
        } else {
            Ipv4Mask(u32::MAX << (32 - len))
        }
    }

    pub const fn bits(&self) -> u32 {
        self.0
    }

    /// Returns the prefix length in bits.
    pub const fn prefix_len(&self) -> u8 {
        self.0.leading_ones() as u8
    }

    /// Returns true if `a` and `b` fall in the same network under this mask.
    pub const fn is_match(&self, a: Ipv4Address, b: Ipv4Address) -> bool {
        (a.to_u32() & self.0) == (b.to_u32() & self.0)
    }
}

impl fmt::Display for Ipv4Mask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Ipv4Address::from_u32(self.0).fmt(f)
    }
}

impl FromStr for Ipv4Mask {
    type Err = ParseError;

    /// Parses either dotted-quad (`255.255.0.0`) or slash (`/16`) notation.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(len_str) = s.strip_prefix('/') {
            let len: u8 = len_str
                .parse()
                .map_err(|_| ParseError::InvalidMask(s.to_string()))?;
            if len > 32 {
                return Err(ParseError::InvalidMask(s.to_string()));
            }
            return Ok(Ipv4Mask::from_prefix_len(len));
        }
        let addr: Ipv4Addr = s
            .parse()
            .map_err(|_| ParseError::InvalidMask(s.to_string()))?;
        Ipv4Mask::new(u32::from_be_bytes(addr.octets()))
            .map_err(|_| ParseError::InvalidMask(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_ipv4_parse() {
        let addr: Ipv4Address = "192.168.1.1".parse().unwrap();
        assert_eq!(addr.octets(), [192, 168, 1, 1]);
    }

    #[test]
    fn test_ipv4_u32_round_trip() {
        let addr = Ipv4Address::new(10, 0, 0, 1);
        assert_eq!(addr.to_u32(), 0x0a00_0001);
        assert_eq!(Ipv4Address::from_u32(0x0a00_0001), addr);
    }

    #[test]
    fn test_multicast_predicates() {
        let group: Ipv4Address = "224.1.2.3".parse().unwrap();
        assert!(group.is_multicast());
        assert!(!group.is_link_local_multicast());

        let local: Ipv4Address = "224.0.0.13".parse().unwrap();
        assert!(local.is_multicast());
        assert!(local.is_link_local_multicast());

        let unicast: Ipv4Address = "10.0.0.1".parse().unwrap();
        assert!(!unicast.is_multicast());
    }

    #[test]
    fn test_global_broadcast() {
        assert!(Ipv4Address::BROADCAST.is_global_broadcast());
        assert!(!Ipv4Address::new(10, 255, 255, 255).is_global_broadcast());
    }

    #[test]
    fn test_combine_mask() {
        let addr = Ipv4Address::new(10, 1, 2, 3);
        let mask = Ipv4Mask::from_prefix_len(16);
        assert_eq!(addr.combine_mask(mask), Ipv4Address::new(10, 1, 0, 0));
    }

    #[test]
    fn test_mask_prefix_len() {
        assert_eq!(Ipv4Mask::ZERO.prefix_len(), 0);
        assert_eq!(Ipv4Mask::ONES.prefix_len(), 32);
        assert_eq!(Ipv4Mask::from_prefix_len(24).prefix_len(), 24);
        assert_eq!(Ipv4Mask::from_prefix_len(24).to_string(), "255.255.255.0");
    }

    #[test]
    fn test_mask_contiguity() {
        assert!(Ipv4Mask::new(0xffff_0000).is_ok());
        assert!(Ipv4Mask::new(0xff00_ff00).is_err());
        assert!(Ipv4Mask::new(0x0000_ffff).is_err());
    }

    #[test]
    fn test_mask_parse() {
        let dotted: Ipv4Mask = "255.255.255.0".parse().unwrap();
        assert_eq!(dotted.prefix_len(), 24);

        let slash: Ipv4Mask = "/8".parse().unwrap();
        assert_eq!(slash.prefix_len(), 8);

        assert!("255.0.255.0".parse::<Ipv4Mask>().is_err());
        assert!("/33".parse::<Ipv4Mask>().is_err());
    }

    #[test]
    fn test_mask_is_match() {
        let mask = Ipv4Mask::from_prefix_len(8);
        let net = Ipv4Address::new(10, 0, 0, 0);
        assert!(mask.is_match(Ipv4Address::new(10, 1, 2, 3), net));
        assert!(!mask.is_match(Ipv4Address::new(11, 0, 0, 1), net));
    }
}
