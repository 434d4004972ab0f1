//! Link-layer rewrite tables: interface → source MAC and next-hop IP →
//! destination MAC.
//!
//! Both tables are written by the control plane and read by the pipeline.
//! `DashMap` gives per-key atomic replace semantics, so a reader sees either
//! the old or the new MAC for a key, never a torn one.

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use dashmap::DashMap;
use thiserror::Error;

/// Six-byte IEEE 802 hardware address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MacAddr(pub [u8; 6]);

impl MacAddr {
    pub const fn octets(&self) -> [u8; 6] {
        self.0
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = &self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            m[0], m[1], m[2], m[3], m[4], m[5]
        )
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid MAC address {0:?}")]
pub struct InvalidMac(String);

impl FromStr for MacAddr {
    type Err = InvalidMac;

    /// Parse colon-separated hex octets, e.g. `aa:bb:cc:dd:ee:01`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut octets = [0u8; 6];
        let mut parts = s.split(':');
        for slot in octets.iter_mut() {
            let part = parts.next().ok_or_else(|| InvalidMac(s.to_string()))?;
            if part.is_empty() || part.len() > 2 {
                return Err(InvalidMac(s.to_string()));
            }
            *slot = u8::from_str_radix(part, 16).map_err(|_| InvalidMac(s.to_string()))?;
        }
        if parts.next().is_some() {
            return Err(InvalidMac(s.to_string()));
        }
        Ok(MacAddr(octets))
    }
}

/// Outbound interface index → source MAC to stamp on redirected frames.
#[derive(Default)]
pub struct InterfaceTable {
    entries: DashMap<u32, MacAddr>,
}

impl InterfaceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, ifindex: u32, mac: MacAddr) {
        self.entries.insert(ifindex, mac);
    }

    pub fn get(&self, ifindex: u32) -> Option<MacAddr> {
        self.entries.get(&ifindex).map(|entry| *entry)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Next-hop IPv4 address → destination MAC.
#[derive(Default)]
pub struct NeighborTable {
    entries: DashMap<Ipv4Addr, MacAddr>,
}

impl NeighborTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, addr: Ipv4Addr, mac: MacAddr) {
        self.entries.insert(addr, mac);
    }

    pub fn get(&self, addr: Ipv4Addr) -> Option<MacAddr> {
        self.entries.get(&addr).map(|entry| *entry)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
