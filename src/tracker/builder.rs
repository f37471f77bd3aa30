use std::sync::Arc;

use alloy::primitives::Address;

use crate::{
    TrackerError, broadcast::LogBroadcaster, client::ChainClient,
    mailbox::CONFIG_MAILBOX_SANITY_LIMIT, tracker::ContractTracker,
};

/// Builds a [`ContractTracker`].
///
/// ```ignore
/// let tracker = ContractTrackerBuilder::new()
///     .job_id(42)
///     .build(aggregator_address, provider, broadcaster)?;
/// tracker.start()?;
/// ```
#[derive(Clone, Debug)]
pub struct ContractTrackerBuilder {
    job_id: i32,
    mailbox_capacity: usize,
}

impl Default for ContractTrackerBuilder {
    fn default() -> Self {
        Self { job_id: 0, mailbox_capacity: CONFIG_MAILBOX_SANITY_LIMIT }
    }
}

impl ContractTrackerBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Job the tracker consumes logs on behalf of.
    #[must_use]
    pub fn job_id(mut self, job_id: i32) -> Self {
        self.job_id = job_id;
        self
    }

    /// Maximum number of configs waiting to be forwarded before the oldest is evicted.
    ///
    /// Defaults to [`CONFIG_MAILBOX_SANITY_LIMIT`].
    #[must_use]
    pub fn mailbox_capacity(mut self, capacity: usize) -> Self {
        self.mailbox_capacity = capacity;
        self
    }

    /// Creates a tracker for the aggregator at `contract_address`. The tracker does nothing until
    /// [`ContractTracker::start`] is called.
    ///
    /// # Errors
    ///
    /// [`TrackerError::InvalidMailboxCapacity`] if the mailbox capacity is zero.
    pub fn build<C: ChainClient>(
        self,
        contract_address: Address,
        client: C,
        broadcaster: Arc<dyn LogBroadcaster>,
    ) -> Result<Arc<ContractTracker<C>>, TrackerError> {
        if self.mailbox_capacity == 0 {
            return Err(TrackerError::InvalidMailboxCapacity);
        }
        Ok(Arc::new(ContractTracker::new(
            contract_address,
            client,
            broadcaster,
            self.job_id,
            self.mailbox_capacity,
        )))
    }
}
