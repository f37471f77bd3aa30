//! Builders for `OffchainAggregator` events and the logs carrying them.

use alloy::{
    primitives::{Address, B256, Bytes, FixedBytes},
    sol_types::SolEvent,
};

use crate::{
    contract::{ConfigSet, ContractConfig, RoundRequested},
    eth::EventLog,
};

/// A two-signer `ConfigSet` event; distinct `config_count`s yield distinct config digests.
#[must_use]
pub fn config_set(config_count: u64) -> ConfigSet {
    ConfigSet {
        previousConfigBlockNumber: 10,
        configCount: config_count,
        signers: vec![Address::repeat_byte(1), Address::repeat_byte(2)],
        transmitters: vec![Address::repeat_byte(3), Address::repeat_byte(4)],
        threshold: 1,
        encodedConfigVersion: 1,
        encoded: Bytes::from(vec![0xc0, 0xff, 0xee]),
    }
}

/// The config the tracker projects from [`config_set`] emitted by `contract`.
#[must_use]
pub fn contract_config(contract: Address, config_count: u64) -> ContractConfig {
    ContractConfig::from_config_set(contract, config_set(config_count))
}

#[must_use]
pub fn round_requested(epoch: u32, round: u8) -> RoundRequested {
    RoundRequested {
        requester: Address::repeat_byte(9),
        configDigest: FixedBytes::repeat_byte(7),
        epoch,
        round,
    }
}

/// A log of `event` emitted by `address` in block 100.
///
/// The block hash is derived from the event data so distinct events never share a consumption
/// record in [`FakeBroadcaster`](crate::test_utils::FakeBroadcaster).
#[must_use]
pub fn event_log<E: SolEvent>(address: Address, event: &E) -> EventLog {
    let data = event.encode_log_data();
    let block_hash = alloy::primitives::keccak256(
        [data.topics().iter().flat_map(|topic| topic.0).collect::<Vec<_>>(), data.data.to_vec()]
            .concat(),
    );
    EventLog {
        address,
        topics: data.topics().to_vec(),
        data: data.data.into(),
        block_number: 100,
        block_hash,
        transaction_hash: B256::repeat_byte(0x11),
        ..Default::default()
    }
}
