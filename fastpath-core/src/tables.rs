//! Control-plane table handles consumed by the pipeline.
//!
//! The pipeline only ever performs single-key reads; writes happen in an
//! external control plane that replaces whole entries. `SharedTables` is
//! the in-process realization: `DashMap`-backed, so concurrent readers
//! observe either the old or the new value for a key, never a torn one,
//! and nothing takes a table-wide lock.

use std::net::Ipv4Addr;
use std::sync::Arc;

use dashmap::DashSet;

use crate::error::TableUnavailable;
use crate::l2::{InterfaceTable, MacAddr, NeighborTable};
use crate::route::{NextHop, RouteTable};

/// Read-only capability the pipeline holds against control-plane state.
///
/// A handle whose backing store is gone reports `TableUnavailable`; the
/// pipeline fails closed on it.
pub trait ForwardingTables {
    fn route(&self, dst: Ipv4Addr) -> Result<Option<NextHop>, TableUnavailable>;
    fn source_mac(&self, ifindex: u32) -> Result<Option<MacAddr>, TableUnavailable>;
    fn neighbor_mac(&self, addr: Ipv4Addr) -> Result<Option<MacAddr>, TableUnavailable>;
    fn is_local(&self, addr: Ipv4Addr) -> Result<bool, TableUnavailable>;
}

/// In-process tables shared between the control plane (writer) and any
/// number of concurrent pipeline invocations (readers).
#[derive(Default)]
pub struct SharedTables {
    routes: RouteTable,
    interfaces: InterfaceTable,
    neighbors: NeighborTable,
    local_addrs: DashSet<Ipv4Addr>,
}

impl SharedTables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn interfaces(&self) -> &InterfaceTable {
        &self.interfaces
    }

    pub fn neighbors(&self) -> &NeighborTable {
        &self.neighbors
    }

    /// Register an address owned by the local stack; frames addressed to
    /// it bypass routing and are passed up unmodified.
    pub fn add_local_address(&self, addr: Ipv4Addr) {
        self.local_addrs.insert(addr);
    }

    pub fn local_address_count(&self) -> usize {
        self.local_addrs.len()
    }
}

impl ForwardingTables for SharedTables {
    fn route(&self, dst: Ipv4Addr) -> Result<Option<NextHop>, TableUnavailable> {
        Ok(self.routes.lookup(dst))
    }

    fn source_mac(&self, ifindex: u32) -> Result<Option<MacAddr>, TableUnavailable> {
        Ok(self.interfaces.get(ifindex))
    }

    fn neighbor_mac(&self, addr: Ipv4Addr) -> Result<Option<MacAddr>, TableUnavailable> {
        Ok(self.neighbors.get(addr))
    }

    fn is_local(&self, addr: Ipv4Addr) -> Result<bool, TableUnavailable> {
        Ok(self.local_addrs.contains(&addr))
    }
}

impl<T: ForwardingTables + ?Sized> ForwardingTables for Arc<T> {
    fn route(&self, dst: Ipv4Addr) -> Result<Option<NextHop>, TableUnavailable> {
        (**self).route(dst)
    }

    fn source_mac(&self, ifindex: u32) -> Result<Option<MacAddr>, TableUnavailable> {
        (**self).source_mac(ifindex)
    }

    fn neighbor_mac(&self, addr: Ipv4Addr) -> Result<Option<MacAddr>, TableUnavailable> {
        (**self).neighbor_mac(addr)
    }

    fn is_local(&self, addr: Ipv4Addr) -> Result<bool, TableUnavailable> {
        (**self).is_local(addr)
    }
}
