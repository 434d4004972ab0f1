//! Per-action packet/byte counters.
//!
//! One fixed slot per forwarding action, lock-free `fetch_add`, never
//! reset. Each pipeline invocation contributes exactly one increment,
//! attributed to the action in effect when the frame is first seen.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Counter slot selector. `Redirect` is a single slot; the outbound
/// interface of a redirect is not part of the counter key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Pass,
    Drop,
    Redirect,
}

impl ActionKind {
    pub const ALL: [ActionKind; 3] = [ActionKind::Pass, ActionKind::Drop, ActionKind::Redirect];

    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::Pass => "PASS",
            ActionKind::Drop => "DROP",
            ActionKind::Redirect => "REDIRECT",
        }
    }

    fn index(self) -> usize {
        match self {
            ActionKind::Pass => 0,
            ActionKind::Drop => 1,
            ActionKind::Redirect => 2,
        }
    }
}

#[derive(Default)]
struct Slot {
    packets: AtomicU64,
    bytes: AtomicU64,
}

/// Point-in-time copy of one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CounterSnapshot {
    pub packets: u64,
    pub bytes: u64,
}

pub struct CounterBank {
    slots: [Slot; ActionKind::ALL.len()],
}

impl Default for CounterBank {
    fn default() -> Self {
        Self::new()
    }
}

impl CounterBank {
    pub fn new() -> Self {
        Self {
            slots: std::array::from_fn(|_| Slot::default()),
        }
    }

    /// Add one packet and `bytes` bytes to the slot for `kind`.
    pub fn record(&self, kind: ActionKind, bytes: usize) {
        let slot = &self.slots[kind.index()];
        slot.packets.fetch_add(1, Ordering::Relaxed);
        slot.bytes.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self, kind: ActionKind) -> CounterSnapshot {
        let slot = &self.slots[kind.index()];
        CounterSnapshot {
            packets: slot.packets.load(Ordering::Relaxed),
            bytes: slot.bytes.load(Ordering::Relaxed),
        }
    }

    /// Packet count summed over every slot. Equals the number of frames
    /// processed, since each frame is recorded exactly once.
    pub fn total_packets(&self) -> u64 {
        ActionKind::ALL
            .iter()
            .map(|kind| self.snapshot(*kind).packets)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_accumulates() {
        let bank = CounterBank::new();
        bank.record(ActionKind::Drop, 60);
        bank.record(ActionKind::Drop, 40);

        let snap = bank.snapshot(ActionKind::Drop);
        assert_eq!(snap.packets, 2);
        assert_eq!(snap.bytes, 100);
    }

    #[test]
    fn test_slots_are_independent() {
        let bank = CounterBank::new();
        bank.record(ActionKind::Pass, 10);
        bank.record(ActionKind::Redirect, 20);

        assert_eq!(bank.snapshot(ActionKind::Pass).bytes, 10);
        assert_eq!(bank.snapshot(ActionKind::Redirect).bytes, 20);
        assert_eq!(bank.snapshot(ActionKind::Drop).packets, 0);
    }

    #[test]
    fn test_total_packets_sums_all_slots() {
        let bank = CounterBank::new();
        bank.record(ActionKind::Pass, 1);
        bank.record(ActionKind::Drop, 1);
        bank.record(ActionKind::Drop, 1);
        bank.record(ActionKind::Redirect, 1);
        assert_eq!(bank.total_packets(), 4);
    }
}
