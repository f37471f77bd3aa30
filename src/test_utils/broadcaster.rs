//! An in-memory log broadcaster.

use std::{
    collections::HashSet,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicBool, Ordering},
    },
};

use alloy::primitives::{Address, B256};

use crate::{
    broadcast::{Broadcast, BroadcastError, LogBroadcaster, LogListener},
    eth::EventLog,
};

/// Consumption records are keyed the way a log broadcaster keys them in its database.
type ConsumptionKey = (i32, B256, u64);

/// Delivers logs synchronously to registered listeners and keeps consumption records in
/// memory.
#[derive(Default)]
pub struct FakeBroadcaster {
    disconnected: AtomicBool,
    listeners: Mutex<Vec<(Address, Arc<dyn LogListener>)>>,
    consumed: Arc<Mutex<HashSet<ConsumptionKey>>>,
}

impl FakeBroadcaster {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A broadcaster reporting that it has no node connection on registration.
    #[must_use]
    pub fn disconnected() -> Arc<Self> {
        let broadcaster = Self::default();
        broadcaster.disconnected.store(true, Ordering::SeqCst);
        Arc::new(broadcaster)
    }

    /// Number of listeners registered for `address`.
    #[must_use]
    pub fn listener_count(&self, address: Address) -> usize {
        lock(&self.listeners).iter().filter(|(registered, _)| *registered == address).count()
    }

    /// Delivers `log` to every listener registered for the log's address.
    pub fn broadcast(&self, log: &EventLog) {
        self.broadcast_to(log.address, log);
    }

    /// Delivers `log` to every listener registered for `address`, whatever address the log
    /// carries.
    pub fn broadcast_to(&self, address: Address, log: &EventLog) {
        for listener in self.listeners_for(address) {
            let broadcast = FakeBroadcast {
                log: log.deep_copy(),
                job_id: listener.job_id(),
                consumed: Arc::clone(&self.consumed),
            };
            listener.handle_log(Ok(&broadcast));
        }
    }

    /// Reports an upstream failure to every listener registered for `address`.
    pub fn broadcast_error(&self, address: Address, error: &BroadcastError) {
        for listener in self.listeners_for(address) {
            listener.handle_log(Err(error));
        }
    }

    /// Whether `job_id` consumed `log`.
    #[must_use]
    pub fn is_consumed(&self, job_id: i32, log: &EventLog) -> bool {
        lock(&self.consumed).contains(&consumption_key(job_id, log))
    }

    fn listeners_for(&self, address: Address) -> Vec<Arc<dyn LogListener>> {
        lock(&self.listeners)
            .iter()
            .filter(|(registered, _)| *registered == address)
            .map(|(_, listener)| Arc::clone(listener))
            .collect()
    }
}

impl LogBroadcaster for FakeBroadcaster {
    fn register(&self, address: Address, listener: Arc<dyn LogListener>) -> bool {
        lock(&self.listeners).push((address, listener));
        !self.disconnected.load(Ordering::SeqCst)
    }

    fn unregister(&self, address: Address, listener: &Arc<dyn LogListener>) {
        lock(&self.listeners).retain(|(registered, registered_listener)| {
            !(*registered == address && Arc::ptr_eq(registered_listener, listener))
        });
    }
}

/// A single delivery made by [`FakeBroadcaster`].
pub struct FakeBroadcast {
    log: EventLog,
    job_id: i32,
    consumed: Arc<Mutex<HashSet<ConsumptionKey>>>,
}

impl Broadcast for FakeBroadcast {
    fn raw_log(&self) -> &EventLog {
        &self.log
    }

    fn was_already_consumed(&self) -> Result<bool, BroadcastError> {
        Ok(lock(&self.consumed).contains(&consumption_key(self.job_id, &self.log)))
    }

    fn mark_consumed(&self) -> Result<(), BroadcastError> {
        lock(&self.consumed).insert(consumption_key(self.job_id, &self.log));
        Ok(())
    }
}

fn consumption_key(job_id: i32, log: &EventLog) -> ConsumptionKey {
    (job_id, log.block_hash, log.log_index)
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
