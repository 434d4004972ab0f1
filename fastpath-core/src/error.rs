use std::net::Ipv4Addr;

use thiserror::Error;

/// Failure from one of the packet view constructors.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// The buffer ends before the header does.
    #[error("frame truncated: need {needed} bytes, have {len}")]
    Truncated { needed: usize, len: usize },

    /// The IP version nibble is not 4.
    #[error("unsupported IP version {0}")]
    Version(u8),

    /// The IHL nibble is below the 5-word minimum.
    #[error("invalid IPv4 header length {0} words")]
    HeaderLength(u8),
}

/// Reported by a table handle whose backing store cannot be reached.
/// The pipeline fails closed on it.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("lookup table unavailable")]
pub struct TableUnavailable;

/// Why a frame was dropped.
///
/// Every variant is terminal for its frame and never affects the frames
/// that follow. Missing MAC-table entries are deliberately absent here:
/// they are non-fatal and only produce a diagnostic.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    #[error("malformed frame: {0}")]
    Malformed(#[from] ParseError),

    #[error("unsupported ether-type {0:#06x}")]
    UnsupportedProtocol(u16),

    #[error("no route to {0}")]
    NoRoute(Ipv4Addr),

    #[error(transparent)]
    TableUnavailable(#[from] TableUnavailable),
}
