//! The per-frame forwarding state machine.
//!
//! One invocation per received frame, no state shared between frames.
//! The default action is DROP: any validation fault short-circuits to a
//! drop rather than forwarding or passing the frame up.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::checksum;
use crate::error::DropReason;
use crate::packet::{EthernetFrame, Ipv4Header, ETHERTYPE_ARP, ETHERTYPE_IPV4};
use crate::stats::{ActionKind, CounterBank};
use crate::tables::ForwardingTables;

/// Terminal decision for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Deliver to the local network stack, frame unmodified.
    Pass,
    /// Discard; nothing is transmitted.
    Drop,
    /// Transmit the rewritten frame out of the named interface.
    Redirect(u32),
}

impl Action {
    pub fn kind(self) -> ActionKind {
        match self {
            Action::Pass => ActionKind::Pass,
            Action::Drop => ActionKind::Drop,
            Action::Redirect(_) => ActionKind::Redirect,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Pass => f.write_str("PASS"),
            Action::Drop => f.write_str("DROP"),
            Action::Redirect(ifindex) => write!(f, "REDIRECT({ifindex})"),
        }
    }
}

/// The forwarding pipeline. Holds a read capability on the control-plane
/// tables and the shared counter bank; everything else is frame-scoped.
pub struct Forwarder<T> {
    tables: T,
    counters: Arc<CounterBank>,
}

impl<T: ForwardingTables> Forwarder<T> {
    pub fn new(tables: T, counters: Arc<CounterBank>) -> Self {
        Self { tables, counters }
    }

    pub fn counters(&self) -> &CounterBank {
        &self.counters
    }

    /// Run one frame through the pipeline. The buffer is mutated in place
    /// only on the REDIRECT path.
    ///
    /// Counters are attributed to the default (DROP) slot before any
    /// parsing, once per frame, with the frame's original byte length.
    pub fn process(&self, frame: &mut [u8]) -> Action {
        self.counters.record(ActionKind::Drop, frame.len());
        match self.decide(frame) {
            Ok(action) => action,
            Err(reason) => {
                debug!(%reason, len = frame.len(), "dropping frame");
                Action::Drop
            }
        }
    }

    fn decide(&self, frame: &mut [u8]) -> Result<Action, DropReason> {
        let mut eth = EthernetFrame::parse(&mut *frame)?;
        match eth.ether_type() {
            // ARP goes to the local stack so the kernel can keep resolving.
            ETHERTYPE_ARP => return Ok(Action::Pass),
            ETHERTYPE_IPV4 => {}
            other => return Err(DropReason::UnsupportedProtocol(other)),
        }

        let mut ip = Ipv4Header::parse(eth.payload_mut())?;
        let dst = ip.dst_addr();
        trace!(%dst, ttl = ip.ttl(), "ipv4 frame");

        if self.tables.is_local(dst)? {
            return Ok(Action::Pass);
        }

        let hop = self.tables.route(dst)?.ok_or(DropReason::NoRoute(dst))?;
        debug!(%dst, ifindex = hop.ifindex, gateway = %hop.gateway, "route hit");

        // Saturating: a TTL-0 frame must not wrap back to 255.
        let ttl = ip.ttl().saturating_sub(1);
        ip.set_ttl(ttl);
        let csum = checksum::header_checksum(ip.bytes(), ip.header_len());
        ip.set_checksum(csum);
        trace!(ttl, checksum = csum, "rewrote ipv4 header");

        match self.tables.source_mac(hop.ifindex)? {
            Some(mac) => eth.set_src_mac(mac),
            None => warn!(ifindex = hop.ifindex, "no interface mac, source unchanged"),
        }
        let next_hop_addr = if hop.gateway.is_unspecified() {
            dst
        } else {
            hop.gateway
        };
        match self.tables.neighbor_mac(next_hop_addr)? {
            Some(mac) => eth.set_dst_mac(mac),
            None => warn!(neighbor = %next_hop_addr, "no neighbor mac, destination unchanged"),
        }

        Ok(Action::Redirect(hop.ifindex))
    }
}
