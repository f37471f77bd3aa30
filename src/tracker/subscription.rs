use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::contract::ContractConfig;

/// The stream of new contract configs, handed out once per tracker by
/// [`ContractConfigTracker::subscribe_to_new_configs`](crate::ContractConfigTracker::subscribe_to_new_configs).
///
/// Configs are yielded in the order their `ConfigSet` logs were handled. The stream ends once
/// the tracker is closed.
///
/// # Example
///
/// ```ignore
/// let mut configs = tracker.subscribe_to_new_configs()?.stream();
///
/// while let Some(config) = configs.next().await {
///     // reconfigure
/// }
/// ```
#[derive(Debug)]
pub struct ConfigSubscription {
    inner: ReceiverStream<ContractConfig>,
}

impl ConfigSubscription {
    pub(crate) fn new(receiver: mpsc::Receiver<ContractConfig>) -> Self {
        Self { inner: ReceiverStream::new(receiver) }
    }

    /// The underlying config stream.
    #[must_use]
    pub fn stream(self) -> ReceiverStream<ContractConfig> {
        self.inner
    }
}
