//! IPv4 fast-path forwarding engine.
//!
//! This crate makes one forwarding decision per received Ethernet frame:
//! parse, classify, longest-prefix-match route lookup, in-place header
//! rewrite (TTL, checksum, MAC addresses), and a terminal action of
//! PASS, DROP, or REDIRECT. The pipeline never blocks and does a bounded
//! amount of work per frame; the route/MAC tables it reads are owned and
//! written by an external control plane.

pub mod checksum;
pub mod error;
pub mod l2;
pub mod packet;
pub mod pipeline;
pub mod route;
pub mod stats;
pub mod tables;

pub use error::{DropReason, ParseError, TableUnavailable};
pub use l2::MacAddr;
pub use pipeline::{Action, Forwarder};
pub use route::NextHop;
pub use stats::{ActionKind, CounterBank, CounterSnapshot};
pub use tables::{ForwardingTables, SharedTables};
