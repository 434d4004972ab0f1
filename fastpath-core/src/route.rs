//! Longest-prefix-match route table.
//!
//! Entries are keyed by `(prefix_len, network)` with host bits masked off
//! on insert, so there is exactly one slot per distinct prefix. Lookup
//! probes prefix lengths from 32 down to 0 and returns the first hit,
//! which by construction is the longest match. Cost is bounded by 33
//! keyed reads regardless of how many routes are installed.

use std::net::Ipv4Addr;

use dashmap::DashMap;
use ipnet::Ipv4Net;

/// Where a matched packet goes: the outbound interface and the gateway to
/// resolve the destination MAC through. An unspecified (0.0.0.0) gateway
/// means the destination is directly connected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NextHop {
    pub ifindex: u32,
    pub gateway: Ipv4Addr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct RouteKey {
    prefix_len: u8,
    network: u32,
}

fn prefix_mask(prefix_len: u8) -> u32 {
    match prefix_len {
        0 => 0,
        n => u32::MAX << (32 - u32::from(n)),
    }
}

#[derive(Default)]
pub struct RouteTable {
    entries: DashMap<RouteKey, NextHop>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install or replace the route for `net`. The network address is
    /// canonicalized by `Ipv4Net`, so two spellings of the same prefix
    /// land on the same slot.
    pub fn insert(&self, net: Ipv4Net, next_hop: NextHop) {
        let key = RouteKey {
            prefix_len: net.prefix_len(),
            network: u32::from(net.network()),
        };
        self.entries.insert(key, next_hop);
    }

    /// Longest-prefix match for `dst`, or `None` when no installed prefix
    /// contains it.
    pub fn lookup(&self, dst: Ipv4Addr) -> Option<NextHop> {
        let addr = u32::from(dst);
        for prefix_len in (0..=32u8).rev() {
            let key = RouteKey {
                prefix_len,
                network: addr & prefix_mask(prefix_len),
            };
            if let Some(entry) = self.entries.get(&key) {
                return Some(*entry);
            }
        }
        None
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
