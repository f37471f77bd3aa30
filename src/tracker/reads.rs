use std::time::Duration;

use alloy::{rpc::types::Filter, sol_types::SolCall};

use crate::{
    TrackerError,
    client::ChainClient,
    contract::{
        CONFIG_SET_TOPIC, ConfigDigest, ContractConfig, decode_config_set, ensure_address,
        latestConfigDetailsCall,
    },
    tracker::{ConfigSubscription, ContractTracker, RoundRequest, lock},
};

/// What the consensus protocol asks of a contract config tracker.
pub trait ContractConfigTracker: Send + Sync {
    /// Hands out the stream of configs seen in `ConfigSet` logs after
    /// [`start`](ContractTracker::start).
    ///
    /// # Errors
    ///
    /// [`TrackerError::AlreadySubscribed`] if the stream was handed out before.
    fn subscribe_to_new_configs(&self) -> Result<ConfigSubscription, TrackerError>;

    /// The block number the current config was set in, and its digest. A contract that was
    /// never configured reports `(0, ConfigDigest::ZERO)`.
    fn latest_config_details(
        &self,
    ) -> impl Future<Output = Result<(u64, ConfigDigest), TrackerError>> + Send;

    /// The config set by the last `ConfigSet` log in block `changed_in_block`.
    fn config_from_logs(
        &self,
        changed_in_block: u64,
    ) -> impl Future<Output = Result<ContractConfig, TrackerError>> + Send;

    /// Number of the latest block known to the node.
    fn latest_block_height(&self) -> impl Future<Output = Result<u64, TrackerError>> + Send;

    /// The latest round request seen in logs. `lookback` is accepted for interface
    /// compatibility; the answer comes from the tracker's memory.
    fn latest_round_requested(
        &self,
        lookback: Duration,
    ) -> impl Future<Output = Result<RoundRequest, TrackerError>> + Send;
}

impl<C: ChainClient> ContractConfigTracker for ContractTracker<C> {
    fn subscribe_to_new_configs(&self) -> Result<ConfigSubscription, TrackerError> {
        lock(&self.config_receiver)
            .take()
            .map(ConfigSubscription::new)
            .ok_or(TrackerError::AlreadySubscribed)
    }

    async fn latest_config_details(&self) -> Result<(u64, ConfigDigest), TrackerError> {
        let input = latestConfigDetailsCall {}.abi_encode();
        let output = self
            .client
            .call_contract(self.contract_address, input.into())
            .await
            .map_err(TrackerError::rpc("error getting latest config details"))?;
        let details = latestConfigDetailsCall::abi_decode_returns(&output)
            .map_err(TrackerError::decode("error decoding latest config details"))?;
        Ok((u64::from(details.blockNumber), details.configDigest))
    }

    async fn config_from_logs(&self, changed_in_block: u64) -> Result<ContractConfig, TrackerError> {
        let filter = Filter::new()
            .address(self.contract_address)
            .event_signature(CONFIG_SET_TOPIC)
            .from_block(changed_in_block)
            .to_block(changed_in_block);
        let logs = self
            .client
            .filter_logs(&filter)
            .await
            .map_err(TrackerError::rpc("error filtering ConfigSet logs"))?;

        // A block may set the config more than once; the last log wins.
        let Some(latest) = logs.last() else {
            return Err(TrackerError::NoConfigLogs {
                contract: self.contract_address,
                block: changed_in_block,
            });
        };
        let event = decode_config_set(latest)?;
        ensure_address(latest, self.contract_address)?;
        Ok(ContractConfig::from_config_set(self.contract_address, event))
    }

    async fn latest_block_height(&self) -> Result<u64, TrackerError> {
        let head = self
            .client
            .latest_header()
            .await
            .map_err(TrackerError::rpc("error getting latest block header"))?;
        head.map(|header| header.number).ok_or(TrackerError::MissingHead)
    }

    async fn latest_round_requested(&self, _lookback: Duration) -> Result<RoundRequest, TrackerError> {
        Ok(self.latest_round_requested.get())
    }
}
