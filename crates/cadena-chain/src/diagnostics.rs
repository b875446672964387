//! Lock-free counters written by the audio thread.
//!
//! The render path never logs. Anything worth reporting is counted here
//! with a relaxed `fetch_add`, and the control side turns a
//! [`DiagnosticsSnapshot`] into log lines when it chooses to.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Event counters shared between the two contexts.
#[derive(Debug, Default)]
pub struct Diagnostics {
    orders_adopted: AtomicU64,
    orders_rejected: AtomicU64,
    positions_skipped: AtomicU64,
    pushes_dropped: AtomicU64,
    blocks_processed: AtomicU64,
}

impl Diagnostics {
    /// All counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn order_adopted(&self) {
        self.orders_adopted.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn order_rejected(&self) {
        self.orders_rejected.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn positions_skipped(&self, count: usize) {
        if count > 0 {
            self.positions_skipped.fetch_add(count as u64, Ordering::Relaxed);
        }
    }

    #[inline]
    pub(crate) fn push_dropped(&self) {
        self.pushes_dropped.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn block_processed(&self) {
        self.blocks_processed.fetch_add(1, Ordering::Relaxed);
    }

    /// Read every counter. Individual values are exact; the set is not read
    /// atomically as a whole.
    pub fn snapshot(&self) -> DiagnosticsSnapshot {
        DiagnosticsSnapshot {
            orders_adopted: self.orders_adopted.load(Ordering::Relaxed),
            orders_rejected: self.orders_rejected.load(Ordering::Relaxed),
            positions_skipped: self.positions_skipped.load(Ordering::Relaxed),
            pushes_dropped: self.pushes_dropped.load(Ordering::Relaxed),
            blocks_processed: self.blocks_processed.load(Ordering::Relaxed),
        }
    }
}

/// Plain copy of the [`Diagnostics`] counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DiagnosticsSnapshot {
    /// Queued orders that became the working order.
    pub orders_adopted: u64,
    /// Queued orders refused by the audio thread (not a permutation).
    pub orders_rejected: u64,
    /// Chain positions that resolved to no stage.
    pub positions_skipped: u64,
    /// Pushes refused because the queue was full.
    pub pushes_dropped: u64,
    /// Blocks rendered.
    pub blocks_processed: u64,
}

impl fmt::Display for DiagnosticsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "blocks={} adopted={} rejected={} skipped={} dropped={}",
            self.blocks_processed,
            self.orders_adopted,
            self.orders_rejected,
            self.positions_skipped,
            self.pushes_dropped
        )
    }
}
