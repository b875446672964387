//! Lock-free SPSC queue carrying chain orders from control to audio.
//!
//! The control thread pushes; the audio thread pulls once per block. Both
//! operations are wait-free single attempts: a full queue rejects the push,
//! an empty queue returns `None`. Neither side ever blocks, locks or
//! allocates.
//!
//! Each slot is an `AtomicU64` holding a packed [`ChainOrder`], so an entry
//! is published and consumed as one word and cannot tear.
//!
//! Memory ordering:
//! - producer stores the slot, then publishes `tail` with `Release`
//! - consumer loads `tail` with `Acquire`, reads the slot, then frees it by
//!   storing `head` with `Release`
//! - producer loads `head` with `Acquire` before reusing a slot
//!
//! The single-producer / single-consumer contract is enforced by ownership:
//! [`OrderQueue::with_capacity`] returns exactly one [`OrderProducer`] and one
//! [`OrderConsumer`], neither is `Clone`, and both operations take `&mut self`.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use crate::{ChainError, ChainOrder};

/// Requested capacity when none is configured. Rounded up to 128 slots.
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

/// Keeps `head` and `tail` on separate cache lines.
#[repr(align(64))]
struct CachePadded<T>(T);

/// Shared ring storage. Only reachable through the producer and consumer
/// handles.
pub struct OrderQueue {
    slots: Box<[AtomicU64]>,
    /// Capacity mask (capacity is a power of two)
    mask: usize,
    /// Next slot to read (modified by the consumer only)
    head: CachePadded<AtomicUsize>,
    /// Next slot to write (modified by the producer only)
    tail: CachePadded<AtomicUsize>,
}

impl OrderQueue {
    /// Create a queue holding at least `min_capacity` orders (rounded up to a
    /// power of two, minimum 2) and split it into its two handles.
    ///
    /// Allocates; call from the control context during setup.
    ///
    /// # Example
    ///
    /// ```rust
    /// use cadena_chain::{ChainOrder, OrderQueue};
    ///
    /// let (mut producer, mut consumer) = OrderQueue::with_capacity(4);
    /// producer.push(ChainOrder::STANDARD).unwrap();
    /// assert_eq!(consumer.pull(), Some(ChainOrder::STANDARD));
    /// assert_eq!(consumer.pull(), None);
    /// ```
    pub fn with_capacity(min_capacity: usize) -> (OrderProducer, OrderConsumer) {
        let capacity = min_capacity.max(2).next_power_of_two();
        let slots = (0..capacity).map(|_| AtomicU64::new(0)).collect();
        let queue = Arc::new(Self {
            slots,
            mask: capacity - 1,
            head: CachePadded(AtomicUsize::new(0)),
            tail: CachePadded(AtomicUsize::new(0)),
        });
        (
            OrderProducer {
                queue: Arc::clone(&queue),
            },
            OrderConsumer { queue },
        )
    }

    /// Number of slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Entries waiting. A snapshot; the other side may change it at once.
    #[inline]
    pub fn len(&self) -> usize {
        // Head first: the tail read afterwards can only be further ahead
        let head = self.head.0.load(Ordering::Acquire);
        let tail = self.tail.0.load(Ordering::Acquire);
        tail.wrapping_sub(head)
    }

    /// Whether no entry is waiting.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Control-side handle: the only writer.
pub struct OrderProducer {
    queue: Arc<OrderQueue>,
}

impl OrderProducer {
    /// Enqueue a chain order.
    ///
    /// Non-empty orders must be permutations and are rejected with
    /// [`ChainError::NotPermutation`] otherwise. [`ChainOrder::EMPTY`] is
    /// accepted and ignored by the consumer. When every slot is taken the
    /// order is dropped and [`ChainError::QueueFull`] returned; there is no
    /// retry.
    pub fn push(&mut self, order: ChainOrder) -> Result<(), ChainError> {
        if !order.is_empty() {
            order.validate()?;
        }
        if self.push_unchecked(order) {
            Ok(())
        } else {
            Err(ChainError::QueueFull)
        }
    }

    /// Boolean form of [`push`](Self::push): `true` when the order was
    /// accepted.
    pub fn try_push(&mut self, order: ChainOrder) -> bool {
        self.push(order).is_ok()
    }

    /// Enqueue without validation. Returns `false` when full.
    pub(crate) fn push_unchecked(&mut self, order: ChainOrder) -> bool {
        let q = &*self.queue;
        let tail = q.tail.0.load(Ordering::Relaxed);
        let head = q.head.0.load(Ordering::Acquire);

        if tail.wrapping_sub(head) >= q.capacity() {
            return false;
        }

        q.slots[tail & q.mask].store(order.to_bits(), Ordering::Relaxed);
        q.tail.0.store(tail.wrapping_add(1), Ordering::Release);
        true
    }

    /// Number of slots.
    pub fn capacity(&self) -> usize {
        self.queue.capacity()
    }

    /// Entries waiting.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether no entry is waiting.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

/// Audio-side handle: the only reader.
pub struct OrderConsumer {
    queue: Arc<OrderQueue>,
}

impl OrderConsumer {
    /// Dequeue the oldest order, or `None` when empty.
    #[inline]
    pub fn pull(&mut self) -> Option<ChainOrder> {
        let q = &*self.queue;
        let head = q.head.0.load(Ordering::Relaxed);
        let tail = q.tail.0.load(Ordering::Acquire);

        if head == tail {
            return None;
        }

        let bits = q.slots[head & q.mask].load(Ordering::Relaxed);
        q.head.0.store(head.wrapping_add(1), Ordering::Release);
        Some(ChainOrder::from_bits(bits))
    }

    /// Pull until empty and return the last entry.
    ///
    /// Bounded by the queue capacity plus whatever the producer manages to
    /// add meanwhile; each step is a single wait-free pull.
    #[inline]
    pub fn drain_latest(&mut self) -> Option<ChainOrder> {
        let mut latest = None;
        while let Some(order) = self.pull() {
            latest = Some(order);
        }
        latest
    }

    /// Number of slots.
    pub fn capacity(&self) -> usize {
        self.queue.capacity()
    }

    /// Entries waiting.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether no entry is waiting.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
