//! The tracker bridging a contract's logs to a stream of new configs.
//!
//! Logs arrive on the broadcaster's task through [`LogListener::handle_log`], which never
//! blocks: a new config is dropped into a bounded [`Mailbox`] and a dedicated forwarding task
//! hands it to the subscriber at whatever pace the subscriber receives.
//!
//! ```text
//! broadcaster -> handle_log -> mailbox -> forwarding task -> ConfigSubscription
//! ```

mod builder;
mod forward;
mod lifecycle;
mod listener;
mod reads;
mod round;
mod subscription;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use alloy::primitives::Address;
use tokio::{runtime::Handle, sync::mpsc, task::JoinHandle};
use tokio_util::sync::CancellationToken;

pub use builder::ContractTrackerBuilder;
pub use lifecycle::LifecycleState;
pub use reads::ContractConfigTracker;
pub use round::RoundRequest;
pub use subscription::ConfigSubscription;

use crate::{
    TrackerError,
    broadcast::{LogBroadcaster, LogListener},
    client::ChainClient,
    contract::{ConfigDigest, ContractConfig},
    mailbox::Mailbox,
};
use lifecycle::StartStopOnce;
use round::LatestRoundRequested;

/// Tracks the config and round requests of one `OffchainAggregator` contract.
///
/// Built with [`ContractTrackerBuilder`]. Between [`start`](ContractTracker::start) and
/// [`close`](ContractTracker::close) the tracker is registered with the log broadcaster; chain
/// reads through [`ContractConfigTracker`] work in any state.
pub struct ContractTracker<C> {
    client: C,
    broadcaster: Arc<dyn LogBroadcaster>,
    contract_address: Address,
    job_id: i32,
    lifecycle: StartStopOnce,
    stop: CancellationToken,
    forwarder: Mutex<Option<JoinHandle<()>>>,
    configs: Arc<Mailbox<ContractConfig>>,
    config_sender: Mutex<Option<mpsc::Sender<ContractConfig>>>,
    config_receiver: Mutex<Option<mpsc::Receiver<ContractConfig>>>,
    last_config_digest: Mutex<Option<ConfigDigest>>,
    latest_round_requested: LatestRoundRequested,
}

impl<C> ContractTracker<C> {
    pub(crate) fn new(
        contract_address: Address,
        client: C,
        broadcaster: Arc<dyn LogBroadcaster>,
        job_id: i32,
        mailbox_capacity: usize,
    ) -> Self {
        // A single slot: the subscriber sees configs one at a time, the backlog stays in the
        // mailbox where it is bounded.
        let (sender, receiver) = mpsc::channel(1);
        Self {
            client,
            broadcaster,
            contract_address,
            job_id,
            lifecycle: StartStopOnce::new(),
            stop: CancellationToken::new(),
            forwarder: Mutex::new(None),
            configs: Arc::new(Mailbox::new(mailbox_capacity)),
            config_sender: Mutex::new(Some(sender)),
            config_receiver: Mutex::new(Some(receiver)),
            last_config_digest: Mutex::new(None),
            latest_round_requested: LatestRoundRequested::default(),
        }
    }

    #[must_use]
    pub fn contract_address(&self) -> Address {
        self.contract_address
    }

    #[must_use]
    pub fn job_id(&self) -> i32 {
        self.job_id
    }

    #[must_use]
    pub fn state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    /// Number of configs handled but not yet handed to the subscriber.
    #[must_use]
    pub fn pending_configs(&self) -> usize {
        self.configs.len()
    }
}

impl<C: ChainClient + 'static> ContractTracker<C> {
    /// Registers with the log broadcaster and spawns the config forwarding task.
    ///
    /// A broadcaster that is not connected yet is only logged; logs flow once it connects.
    ///
    /// # Errors
    ///
    /// - [`TrackerError::NoRuntime`] if called outside a Tokio runtime. The tracker stays
    ///   `NotStarted` and can be started again from within one.
    /// - [`TrackerError::AlreadyStarted`] if the tracker was started before, even if it was
    ///   closed since.
    pub fn start(self: &Arc<Self>) -> Result<(), TrackerError> {
        let runtime = Handle::try_current().map_err(|_| TrackerError::NoRuntime)?;
        self.lifecycle.try_start()?;

        if let Some(sender) = lock(&self.config_sender).take() {
            let handle = runtime.spawn(forward::forward_configs(
                Arc::clone(&self.configs),
                sender,
                self.stop.clone(),
            ));
            *lock(&self.forwarder) = Some(handle);
        }

        let listener: Arc<dyn LogListener> = Arc::clone(self) as Arc<dyn LogListener>;
        let connected = self.broadcaster.register(self.contract_address, listener);
        if !connected {
            warn!(
                job_id = self.job_id,
                contract_address = %self.contract_address,
                "Log broadcaster is not connected, contract configs will be tracked once it is"
            );
        }

        info!(
            job_id = self.job_id,
            contract_address = %self.contract_address,
            "Contract tracker started"
        );
        Ok(())
    }

    /// Stops the forwarding task, waits for it to exit and unregisters from the broadcaster.
    ///
    /// The config stream ends once the forwarding task is gone. Configs still pending in the
    /// mailbox are dropped.
    ///
    /// # Errors
    ///
    /// [`TrackerError::NotStarted`] or [`TrackerError::AlreadyStopped`] if the tracker is not
    /// running.
    pub async fn close(self: &Arc<Self>) -> Result<(), TrackerError> {
        self.lifecycle.try_stop()?;
        self.stop.cancel();

        let forwarder = lock(&self.forwarder).take();
        if let Some(forwarder) = forwarder
            && let Err(err) = forwarder.await
        {
            error!(job_id = self.job_id, error = %err, "Config forwarding task failed");
        }

        let listener: Arc<dyn LogListener> = Arc::clone(self) as Arc<dyn LogListener>;
        self.broadcaster.unregister(self.contract_address, &listener);

        info!(
            job_id = self.job_id,
            contract_address = %self.contract_address,
            "Contract tracker stopped"
        );
        Ok(())
    }
}

impl<C> Drop for ContractTracker<C> {
    fn drop(&mut self) {
        self.stop.cancel();
    }
}

impl<C> std::fmt::Debug for ContractTracker<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContractTracker")
            .field("contract_address", &self.contract_address)
            .field("job_id", &self.job_id)
            .field("state", &self.lifecycle.state())
            .field("pending_configs", &self.configs.len())
            .finish_non_exhaustive()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
