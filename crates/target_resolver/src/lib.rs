//! Target Resolver - CIDR parsing and address enumeration
//!
//! Turns user input into scan targets. Supported forms:
//! - CIDR: "192.168.1.0/24" (host bits in the base are allowed and masked off)
//! - single IPv4 address: "10.0.0.7" (treated as a /32 when a range is expected)
//!
//! Enumeration is lazy: [`NetworkRange::addresses`] hands out a fresh
//! iterator over every address in the block, network and broadcast
//! included, without materialising the block.

use ipnet::Ipv4Net;
use serde::{Serialize, Serializer};
use std::fmt;
use std::iter::FusedIterator;
use std::net::Ipv4Addr;
use std::str::FromStr;

use netsweep_common::ScanError;

/// An IPv4 CIDR block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NetworkRange {
    net: Ipv4Net,
}

impl NetworkRange {
    /// Build a range from a base address and prefix length in `[0, 32]`.
    pub fn new(base: Ipv4Addr, prefix: u8) -> Result<Self, ScanError> {
        let net = Ipv4Net::new(base, prefix).map_err(|_| {
            ScanError::InvalidRange(format!("{base}/{prefix}: prefix must be within 0..=32"))
        })?;
        Ok(Self { net })
    }

    /// The address as given, host bits included.
    #[inline]
    #[must_use]
    pub fn base(&self) -> Ipv4Addr {
        self.net.addr()
    }

    #[inline]
    #[must_use]
    pub fn prefix_len(&self) -> u8 {
        self.net.prefix_len()
    }

    /// First address of the block.
    #[inline]
    #[must_use]
    pub fn network(&self) -> Ipv4Addr {
        self.net.network()
    }

    /// Last address of the block.
    #[inline]
    #[must_use]
    pub fn broadcast(&self) -> Ipv4Addr {
        self.net.broadcast()
    }

    /// Number of addresses in the block, `2^(32 - prefix)`.
    #[inline]
    #[must_use]
    pub fn address_count(&self) -> u64 {
        1u64 << (32 - u32::from(self.prefix_len()))
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        self.net.contains(&addr)
    }

    /// Lazily enumerate every address of the block in ascending order.
    /// Each call starts over from the network address.
    #[must_use]
    pub fn addresses(&self) -> Addresses {
        Addresses {
            next: u64::from(u32::from(self.network())),
            end: u64::from(u32::from(self.broadcast())),
        }
    }
}

impl fmt::Display for NetworkRange {
    /// Prints the normalised block, e.g. `192.168.1.0/24` for input `192.168.1.77/24`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network(), self.prefix_len())
    }
}

impl FromStr for NetworkRange {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (addr, prefix) = match s.split_once('/') {
            Some((addr, prefix)) => {
                let prefix = prefix.trim().parse::<u8>().map_err(|_| {
                    ScanError::InvalidRange(format!("{s}: invalid prefix length"))
                })?;
                (addr, prefix)
            }
            None => (s, 32),
        };
        let base = addr
            .trim()
            .parse::<Ipv4Addr>()
            .map_err(|_| ScanError::InvalidRange(format!("{s}: invalid base address")))?;
        NetworkRange::new(base, prefix)
    }
}

impl From<Ipv4Addr> for NetworkRange {
    fn from(addr: Ipv4Addr) -> Self {
        Self {
            net: Ipv4Net::from(addr),
        }
    }
}

impl Serialize for NetworkRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Iterator over the addresses of a [`NetworkRange`].
///
/// Cursor is kept in `u64` so a block ending at 255.255.255.255 terminates.
#[derive(Debug, Clone)]
pub struct Addresses {
    next: u64,
    end: u64,
}

impl Iterator for Addresses {
    type Item = Ipv4Addr;

    fn next(&mut self) -> Option<Ipv4Addr> {
        if self.next > self.end {
            return None;
        }
        let addr = Ipv4Addr::from(self.next as u32);
        self.next += 1;
        Some(addr)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.end + 1).saturating_sub(self.next);
        match usize::try_from(remaining) {
            Ok(n) => (n, Some(n)),
            Err(_) => (usize::MAX, None),
        }
    }

    fn nth(&mut self, n: usize) -> Option<Ipv4Addr> {
        self.next = self.next.saturating_add(n as u64);
        self.next()
    }
}

impl FusedIterator for Addresses {}

/// Parse a single IPv4 address.
pub fn parse_address(s: &str) -> Result<Ipv4Addr, ScanError> {
    s.trim()
        .parse::<Ipv4Addr>()
        .map_err(|_| ScanError::InvalidAddress(format!("{s:?} is not an IPv4 address")))
}
