//! Bounded handoff buffer between log delivery and the config forwarding task.
//!
//! Producers call [`Mailbox::deliver`] from any thread without ever waiting on the consumer.
//! The single consumer awaits [`Mailbox::notified`] and then drains with
//! [`Mailbox::retrieve`] until it returns `None`: notifications are coalesced, so one wake-up
//! may stand for any number of deliveries.
//!
//! The capacity is a sanity bound, not a working queue size. Once it is reached the oldest
//! pending item is evicted, trading stale items for liveness.

mod ring_buffer;

use std::sync::{
    Mutex, MutexGuard, PoisonError,
    atomic::{AtomicU64, Ordering},
};

use tokio::sync::{Notify, futures::Notified};

use ring_buffer::RingBuffer;

/// Maximum number of configs held by the tracker's mailbox. In normal operation the mailbox
/// holds zero or one config.
pub const CONFIG_MAILBOX_SANITY_LIMIT: usize = 100;

#[derive(Debug)]
pub struct Mailbox<T> {
    queue: Mutex<RingBuffer<T>>,
    notify: Notify,
    evicted: AtomicU64,
}

impl<T> Mailbox<T> {
    /// Creates an empty mailbox holding at most `capacity` pending items.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            queue: Mutex::new(RingBuffer::new(capacity)),
            notify: Notify::new(),
            evicted: AtomicU64::new(0),
        }
    }

    /// Enqueues `item` and wakes the consumer.
    ///
    /// Returns `true` if an older item had to be evicted to make room.
    pub fn deliver(&self, item: T) -> bool {
        let evicted = self.queue().push(item).is_some();
        if evicted {
            let total = self.evicted.fetch_add(1, Ordering::Relaxed) + 1;
            warn!(
                capacity = self.capacity(),
                total_evicted = total,
                "Mailbox full, evicted oldest pending item"
            );
        }
        // Stores at most one permit while nobody waits, which is what coalesces wake-ups.
        self.notify.notify_one();
        evicted
    }

    /// Completes once items were delivered since the last completed wake-up.
    ///
    /// The returned future may also complete with the mailbox already drained; consumers must
    /// tolerate an empty [`retrieve`](Mailbox::retrieve).
    pub fn notified(&self) -> Notified<'_> {
        self.notify.notified()
    }

    /// Removes and returns the oldest pending item.
    pub fn retrieve(&self) -> Option<T> {
        self.queue().pop_front()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.queue().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.queue().capacity()
    }

    /// Number of items evicted since creation.
    #[must_use]
    pub fn evicted(&self) -> u64 {
        self.evicted.load(Ordering::Relaxed)
    }

    fn queue(&self) -> MutexGuard<'_, RingBuffer<T>> {
        // The buffer holds no invariant a panicking holder could break halfway.
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
