//! Bindings for the `OffchainAggregator` contract events and calls used by the tracker.

use alloy::{
    primitives::{Address, B256, Bytes, FixedBytes, keccak256},
    sol,
    sol_types::{SolEvent, SolType, sol_data},
};
use serde::{Deserialize, Serialize};

use crate::{
    TrackerError,
    eth::{EventLog, LogError},
};

sol! {
    #[derive(Debug, PartialEq, Eq)]
    contract OffchainAggregator {
        event ConfigSet(
            uint32 previousConfigBlockNumber,
            uint64 configCount,
            address[] signers,
            address[] transmitters,
            uint8 threshold,
            uint64 encodedConfigVersion,
            bytes encoded
        );

        event RoundRequested(address indexed requester, bytes16 configDigest, uint32 epoch, uint8 round);

        function latestConfigDetails()
            external
            view
            returns (uint32 configCount, uint32 blockNumber, bytes16 configDigest);
    }
}

pub use OffchainAggregator::{ConfigSet, RoundRequested, latestConfigDetailsCall};

/// Topic 0 of `ConfigSet` logs.
pub const CONFIG_SET_TOPIC: B256 = ConfigSet::SIGNATURE_HASH;
/// Topic 0 of `RoundRequested` logs.
pub const ROUND_REQUESTED_TOPIC: B256 = RoundRequested::SIGNATURE_HASH;

/// Identifies one configuration of an aggregator contract.
pub type ConfigDigest = FixedBytes<16>;

/// A contract configuration in the form the consensus protocol consumes it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractConfig {
    pub config_digest: ConfigDigest,
    pub signers: Vec<Address>,
    pub transmitters: Vec<Address>,
    pub threshold: u8,
    pub encoded_config_version: u64,
    pub encoded: Bytes,
}

impl ContractConfig {
    /// Projects a `ConfigSet` event emitted by `contract` into a [`ContractConfig`].
    #[must_use]
    pub fn from_config_set(contract: Address, event: ConfigSet) -> Self {
        let config_digest = config_digest(
            contract,
            event.configCount,
            &event.signers,
            &event.transmitters,
            event.threshold,
            event.encodedConfigVersion,
            &event.encoded,
        );
        Self {
            config_digest,
            signers: event.signers,
            transmitters: event.transmitters,
            threshold: event.threshold,
            encoded_config_version: event.encodedConfigVersion,
            encoded: event.encoded,
        }
    }
}

/// The first 16 bytes of the keccak-256 hash of the ABI-encoded configuration.
///
/// Every oracle computes the digest the same way from the `ConfigSet` event, so it binds the
/// configuration to the contract that emitted it and to its position in the config sequence.
#[must_use]
pub fn config_digest(
    contract: Address,
    config_count: u64,
    signers: &[Address],
    transmitters: &[Address],
    threshold: u8,
    encoded_config_version: u64,
    encoded: &Bytes,
) -> ConfigDigest {
    type ConfigMessage = (
        sol_data::Address,
        sol_data::Uint<64>,
        sol_data::Array<sol_data::Address>,
        sol_data::Array<sol_data::Address>,
        sol_data::Uint<8>,
        sol_data::Uint<64>,
        sol_data::Bytes,
    );
    let message = ConfigMessage::abi_encode_params(&(
        contract,
        config_count,
        signers.to_vec(),
        transmitters.to_vec(),
        threshold,
        encoded_config_version,
        encoded.clone(),
    ));
    ConfigDigest::from_slice(&keccak256(message)[..16])
}

/// Decodes a `ConfigSet` log.
///
/// # Errors
///
/// [`TrackerError::Decode`] if the log is not a well-formed `ConfigSet` event,
/// [`TrackerError::Log`] if it carries more topics than any EVM log can.
pub fn decode_config_set(log: &EventLog) -> Result<ConfigSet, TrackerError> {
    decode(log)
}

/// Decodes a `RoundRequested` log.
///
/// # Errors
///
/// [`TrackerError::Decode`] if the log is not a well-formed `RoundRequested` event,
/// [`TrackerError::Log`] if it carries more topics than any EVM log can.
pub fn decode_round_requested(log: &EventLog) -> Result<RoundRequested, TrackerError> {
    decode(log)
}

fn decode<E: SolEvent>(log: &EventLog) -> Result<E, TrackerError> {
    let data = log.log_data().ok_or(LogError::TooManyTopics { count: log.topics.len() })?;
    E::decode_log_data(&data).map_err(TrackerError::decode(E::SIGNATURE))
}

/// Checks that `log` was emitted by `expected`.
///
/// # Errors
///
/// [`TrackerError::AddressMismatch`] otherwise.
pub(crate) fn ensure_address(log: &EventLog, expected: Address) -> Result<(), TrackerError> {
    if log.address == expected {
        Ok(())
    } else {
        Err(TrackerError::AddressMismatch { actual: log.address, expected })
    }
}
