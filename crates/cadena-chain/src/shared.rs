//! State visible to both contexts besides the parameters.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::{ChainOrder, Diagnostics};

/// Published working order and diagnostics, shared behind an `Arc`.
///
/// The audio thread is the only writer of the published order; it stores
/// the packed order with `Release` after adopting it. Readers load with
/// `Acquire` and always see a whole order.
#[derive(Debug)]
pub struct ChainShared {
    published: AtomicU64,
    diagnostics: Diagnostics,
}

impl ChainShared {
    /// Shared state starting at `order`.
    pub fn new(order: ChainOrder) -> Self {
        Self {
            published: AtomicU64::new(order.to_bits()),
            diagnostics: Diagnostics::new(),
        }
    }

    /// Working order most recently adopted by the audio thread.
    #[inline]
    pub fn published_order(&self) -> ChainOrder {
        ChainOrder::from_bits(self.published.load(Ordering::Acquire))
    }

    #[inline]
    pub(crate) fn publish(&self, order: ChainOrder) {
        self.published.store(order.to_bits(), Ordering::Release);
    }

    /// Event counters.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_replaces_order() {
        let shared = ChainShared::new(ChainOrder::STANDARD);
        assert_eq!(shared.published_order(), ChainOrder::STANDARD);

        let swapped = ChainOrder::STANDARD.with_swapped(1, 2).unwrap();
        shared.publish(swapped);
        assert_eq!(shared.published_order(), swapped);
    }
}
