//! IPv4 address blocks and CIDR arithmetic.
//!
//! Provides [`Ipv4`] for representing an address block (network address plus
//! prefix length), along with the provider-style capacity and host rules used
//! when carving subnets out of a VPC.

use crate::error::{Result, TopologyError};
use serde::de;
use serde::{Deserialize, Deserializer, Serialize};
use std::net::Ipv4Addr;
use std::str::FromStr;

/// Maximum length for an IPv4 subnet mask (32 bits).
pub const MAX_LENGTH: u8 = 32;

/// Addresses the provider keeps back in every subnet
/// (network, router, DNS, future use, broadcast).
pub const RESERVED_ADDRESSES: u64 = 5;

/// Host addresses skipped at the start of a block when enumerating.
const RESERVED_HEAD: u64 = 3;

/// Host addresses skipped at the end of a block when enumerating.
const RESERVED_TAIL: u64 = 1;

/// Bits added to the prefix when deriving a child block.
pub const CHILD_PREFIX_STEP: u8 = 8;

/// Convert a CIDR prefix length to a subnet mask as u32.
///
/// # Examples
/// ```
/// use vpc_utilization_summary::models::get_cidr_mask;
/// assert_eq!(get_cidr_mask(24).unwrap(), 0xFFFFFF00);
/// ```
pub fn get_cidr_mask(len: u8) -> Result<u32> {
    if len > MAX_LENGTH {
        Err(TopologyError::address_range(
            format!("/{len}"),
            "Network length is too long",
        ))
    } else {
        let right_len = MAX_LENGTH - len;
        let all_bits = u32::MAX as u64;

        let mask = (all_bits >> right_len) << right_len;

        Ok(mask as u32)
    }
}

/// Get the network address for a given IP and prefix length.
pub fn cut_addr(addr: Ipv4Addr, len: u8) -> Result<Ipv4Addr> {
    let mask = get_cidr_mask(len)?;
    Ok(Ipv4Addr::from(u32::from(addr) & mask))
}

/// IPv4 address block in CIDR notation.
///
/// The address is always the network address of the block.
#[derive(Eq, Ord, Debug, Copy, Clone, Hash)]
pub struct Ipv4 {
    /// The network address.
    pub addr: Ipv4Addr,
    /// The prefix length (0-32).
    pub mask: u8,
}

impl Serialize for Ipv4 {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Ipv4 {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Ipv4, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ipv4::new(&s).map_err(|e| de::Error::custom(e.to_string()))
    }
}

impl Ipv4 {
    /// Create a new [`Ipv4`] from a CIDR string (e.g., "10.0.0.0/24").
    ///
    /// Host bits must be zero.
    pub fn new(addr_cidr: &str) -> Result<Ipv4> {
        let addr_cidr = addr_cidr.trim();
        let invalid = |msg: &str| TopologyError::address_range(addr_cidr, msg);

        let (addr, mask) = addr_cidr
            .split_once('/')
            .ok_or_else(|| invalid("Invalid address/mask"))?;
        let addr =
            Ipv4Addr::from_str(addr).map_err(|_| invalid(&format!("Invalid address {addr}")))?;
        let mask = u8::from_str(mask).map_err(|_| invalid(&format!("Invalid mask {mask}")))?;
        Ipv4::from_parts(addr, mask)
    }

    /// Build a block from an address and prefix, rejecting set host bits.
    pub fn from_parts(addr: Ipv4Addr, mask: u8) -> Result<Ipv4> {
        let network = cut_addr(addr, mask)?;
        if network != addr {
            return Err(TopologyError::address_range(
                format!("{addr}/{mask}"),
                format!("host bits set, network address is {network}"),
            ));
        }
        Ok(Ipv4 { addr, mask })
    }

    /// Derive the `index`-th child block one level narrower than `self`.
    ///
    /// The child prefix is `mask + CHILD_PREFIX_STEP`, and `index` fills the
    /// freed bit-group. Index 0 and the all-ones group are reserved, so a /16
    /// parent yields /24 children 1..=254.
    pub fn child_block(&self, index: u32) -> Result<Ipv4> {
        let child_mask = self.mask.saturating_add(CHILD_PREFIX_STEP);
        if child_mask > MAX_LENGTH {
            return Err(TopologyError::address_range(
                self,
                format!("cannot derive a /{child_mask} child"),
            ));
        }
        let max_index = (1u32 << CHILD_PREFIX_STEP) - 2;
        if index == 0 || index > max_index {
            return Err(TopologyError::address_range(
                self,
                format!("child index {index} outside 1..={max_index}"),
            ));
        }
        let shift = MAX_LENGTH - child_mask;
        let bits = u32::from(self.addr) | (index << shift);
        Ipv4::from_parts(Ipv4Addr::from(bits), child_mask)
    }

    /// Total number of addresses in the block.
    pub fn size(&self) -> u64 {
        1u64 << (MAX_LENGTH - self.mask.min(MAX_LENGTH))
    }

    /// Usable host capacity after the provider reservation.
    pub fn capacity(&self) -> u64 {
        self.size().saturating_sub(RESERVED_ADDRESSES)
    }

    /// Ascending host addresses, skipping the first 3 and the last 1.
    ///
    /// Empty when the block holds fewer than 5 addresses.
    pub fn usable_hosts(&self) -> UsableHosts {
        let lo = u32::from(self.addr) as u64;
        let size = self.size();
        if size < RESERVED_ADDRESSES {
            return UsableHosts { next: lo, end: lo };
        }
        UsableHosts {
            next: lo + RESERVED_HEAD,
            end: lo + size - RESERVED_TAIL,
        }
    }

    /// Returns true if `addr` is inside this block.
    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        self.lo() <= addr && addr <= self.hi()
    }

    /// Returns true if `other` lies fully inside this block.
    pub fn contains_block(&self, other: &Ipv4) -> bool {
        other.mask >= self.mask && self.contains(other.lo()) && self.contains(other.hi())
    }

    /// Get the highest (broadcast) address in the block.
    pub fn hi(&self) -> Ipv4Addr {
        let host_bits = (self.size() - 1) as u32;
        Ipv4Addr::from(u32::from(self.addr) | host_bits)
    }

    /// Get the lowest (network) address in the block.
    pub fn lo(&self) -> Ipv4Addr {
        self.addr
    }
}

/// Lazy iterator over the usable hosts of an [`Ipv4`] block.
///
/// Cloning restarts from the current position; call
/// [`Ipv4::usable_hosts`] again to start over.
#[derive(Debug, Clone)]
pub struct UsableHosts {
    next: u64,
    end: u64,
}

impl Iterator for UsableHosts {
    type Item = Ipv4Addr;

    fn next(&mut self) -> Option<Ipv4Addr> {
        if self.next >= self.end {
            return None;
        }
        let addr = Ipv4Addr::from(self.next as u32);
        self.next += 1;
        Some(addr)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end.saturating_sub(self.next) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for UsableHosts {}

impl std::fmt::Display for Ipv4 {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}/{}", self.addr, self.mask)
    }
}

impl PartialEq for Ipv4 {
    fn eq(&self, other: &Ipv4) -> bool {
        self.addr == other.addr && self.mask == other.mask
    }
}

impl PartialOrd for Ipv4 {
    fn partial_cmp(&self, other: &Ipv4) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_cidr_mask() {
        assert_eq!(get_cidr_mask(0).unwrap(), 0x00000000);
        assert_eq!(get_cidr_mask(8).unwrap(), 0xFF000000);
        assert_eq!(get_cidr_mask(16).unwrap(), 0xFFFF0000);
        assert_eq!(get_cidr_mask(24).unwrap(), 0xFFFFFF00);
        assert_eq!(get_cidr_mask(32).unwrap(), 0xFFFFFFFF);
        assert!(get_cidr_mask(33).is_err());
    }

    #[test]
    fn test_cut_addr() {
        let ip = Ipv4Addr::new(192, 168, 1, 42);
        assert_eq!(cut_addr(ip, 24).unwrap(), Ipv4Addr::new(192, 168, 1, 0));
        assert_eq!(cut_addr(ip, 16).unwrap(), Ipv4Addr::new(192, 168, 0, 0));
        assert_eq!(cut_addr(ip, 32).unwrap(), Ipv4Addr::new(192, 168, 1, 42));
        assert!(cut_addr(ip, 33).is_err());
    }

    #[test]
    fn test_new_rejects_host_bits() {
        assert!(Ipv4::new("10.0.0.0/24").is_ok());
        assert!(Ipv4::new("10.0.0.1/24").is_err());
        assert!(Ipv4::new("10.0.0.0/33").is_err());
        assert!(Ipv4::new("10.0.0.0").is_err());
        assert!(Ipv4::new("10.0.0/24").is_err());
    }

    #[test]
    fn test_child_block() {
        let parent = Ipv4::new("10.42.0.0/16").unwrap();
        assert_eq!(parent.child_block(1).unwrap(), Ipv4::new("10.42.1.0/24").unwrap());
        assert_eq!(
            parent.child_block(254).unwrap(),
            Ipv4::new("10.42.254.0/24").unwrap()
        );
        assert!(parent.child_block(0).is_err());
        assert!(parent.child_block(255).is_err());

        let narrow = Ipv4::new("10.42.1.0/28").unwrap();
        assert!(matches!(
            narrow.child_block(1),
            Err(TopologyError::InvalidAddressRange { .. })
        ));
    }

    #[test]
    fn test_child_blocks_are_disjoint_and_contained() {
        let parent = Ipv4::new("10.7.0.0/16").unwrap();
        let a = parent.child_block(1).unwrap();
        let b = parent.child_block(2).unwrap();
        assert!(parent.contains_block(&a));
        assert!(parent.contains_block(&b));
        assert!(a.hi() < b.lo());
    }

    #[test]
    fn test_capacity() {
        for mask in 0..=MAX_LENGTH {
            let block = Ipv4 {
                addr: Ipv4Addr::new(0, 0, 0, 0),
                mask,
            };
            assert_eq!(block.size(), 1u64 << (32 - mask));
            assert_eq!(block.capacity(), block.size().saturating_sub(5));
        }
        assert_eq!(Ipv4::new("10.0.0.0/24").unwrap().capacity(), 251);
        assert_eq!(Ipv4::new("10.0.0.0/16").unwrap().capacity(), 65531);
        assert_eq!(Ipv4::new("10.0.0.0/29").unwrap().capacity(), 3);
        assert_eq!(Ipv4::new("10.0.0.0/30").unwrap().capacity(), 0);
        assert_eq!(Ipv4::new("10.0.0.0/32").unwrap().capacity(), 0);
    }

    #[test]
    fn test_usable_hosts() {
        let block = Ipv4::new("10.1.2.0/24").unwrap();
        let hosts: Vec<Ipv4Addr> = block.usable_hosts().collect();
        assert_eq!(hosts.len() as u64, block.size() - 4);
        assert_eq!(hosts[0], Ipv4Addr::new(10, 1, 2, 3));
        assert_eq!(hosts[hosts.len() - 1], Ipv4Addr::new(10, 1, 2, 254));
        assert!(hosts.windows(2).all(|w| w[0] < w[1]));

        // Restartable: a fresh call yields the same sequence.
        assert_eq!(block.usable_hosts().collect::<Vec<_>>(), hosts);
        assert_eq!(block.usable_hosts().len(), 252);
    }

    #[test]
    fn test_usable_hosts_small_blocks() {
        let block = Ipv4::new("10.1.2.8/29").unwrap();
        let hosts: Vec<Ipv4Addr> = block.usable_hosts().collect();
        assert_eq!(
            hosts,
            vec![
                Ipv4Addr::new(10, 1, 2, 11),
                Ipv4Addr::new(10, 1, 2, 12),
                Ipv4Addr::new(10, 1, 2, 13),
                Ipv4Addr::new(10, 1, 2, 14),
            ]
        );
        assert_eq!(Ipv4::new("10.1.2.0/30").unwrap().usable_hosts().count(), 0);
        assert_eq!(Ipv4::new("10.1.2.0/31").unwrap().usable_hosts().count(), 0);
    }

    #[test]
    fn test_ip4_cmp_overlap() {
        let ip1 = Ipv4::new("10.0.10.0/24").unwrap();
        let ip2 = Ipv4::new("10.0.0.0/8").unwrap();
        let ip3 = Ipv4::new("10.0.10.64/26").unwrap();

        assert!(ip1 > ip2);
        assert!(ip1 < ip3);
        assert!(ip2.hi() > ip1.hi());
        assert_eq!(ip2.hi(), Ipv4Addr::new(10, 255, 255, 255));
        assert!(ip2.contains_block(&ip1));
        assert!(!ip1.contains_block(&ip2));
    }

    #[test]
    fn test_serde_round_trip_string() {
        let block = Ipv4::new("10.3.0.0/16").unwrap();
        let json = serde_json::to_string(&block).unwrap();
        assert_eq!(json, "\"10.3.0.0/16\"");
        let back: Ipv4 = serde_json::from_str(&json).unwrap();
        assert_eq!(back, block);
        assert!(serde_json::from_str::<Ipv4>("\"10.3.0.1/16\"").is_err());
    }
}
