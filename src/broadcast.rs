//! Interfaces between the tracker and the external log broadcaster.
//!
//! The broadcaster owns the node subscription, fans logs out to registered listeners and records
//! which listener already consumed which log. The tracker only sees the traits in this module.

use std::sync::Arc;

use alloy::primitives::Address;
use thiserror::Error;

use crate::eth::EventLog;

/// Failure reported by the broadcaster, either for an earlier pipeline stage or for its
/// consumption bookkeeping.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct BroadcastError(pub String);

impl BroadcastError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// A single log delivered to a single listener.
pub trait Broadcast: Send + Sync {
    /// The delivered log. Each listener receives its own copy.
    fn raw_log(&self) -> &EventLog;

    /// Whether this listener already consumed this log in an earlier delivery.
    ///
    /// # Errors
    ///
    /// Fails when the consumption record cannot be read.
    fn was_already_consumed(&self) -> Result<bool, BroadcastError>;

    /// Records that this listener consumed this log.
    ///
    /// # Errors
    ///
    /// Fails when the consumption record cannot be written.
    fn mark_consumed(&self) -> Result<(), BroadcastError>;
}

/// Receiver side of the broadcaster.
pub trait LogListener: Send + Sync {
    /// Called when the broadcaster's node subscription (re)connects.
    fn on_connect(&self);

    /// Called when the broadcaster's node subscription drops.
    fn on_disconnect(&self);

    /// Delivers a log, or the error of an earlier pipeline stage.
    ///
    /// Must return promptly: the broadcaster delivers to all listeners from its own task.
    fn handle_log(&self, broadcast: Result<&dyn Broadcast, &BroadcastError>);

    /// Job owning this listener; used by the broadcaster to key consumption records.
    fn job_id(&self) -> i32;

    /// Whether [`job_id`](LogListener::job_id) refers to a v2 job.
    fn is_v2_job(&self) -> bool {
        true
    }
}

/// Registration side of the broadcaster.
pub trait LogBroadcaster: Send + Sync {
    /// Subscribes `listener` to logs emitted by `address`.
    ///
    /// Returns whether the broadcaster is currently connected to a node. Registration is kept
    /// either way and logs flow once the broadcaster (re)connects.
    fn register(&self, address: Address, listener: Arc<dyn LogListener>) -> bool;

    /// Removes a registration made with [`register`](LogBroadcaster::register).
    fn unregister(&self, address: Address, listener: &Arc<dyn LogListener>);
}
