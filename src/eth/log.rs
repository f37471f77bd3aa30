use std::ops::Deref;

use alloy::{
    primitives::{Address, B256, Bytes, LogData},
    rpc::types::Log as RpcLog,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced when reading attacker-influenced parts of an [`EventLog`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LogError {
    /// The requested topic index is past the end of the topic list.
    #[error("unable to get topic #{index}, log has {count} topic(s)")]
    TopicOutOfRange { index: usize, count: usize },

    /// A byte range was outside the payload or inverted.
    #[error("out of bounds slice access [{start}, {end}) into {len} byte(s)")]
    SliceOutOfBounds { start: i64, end: i64, len: usize },

    /// The log carries more topics than the four an EVM log can have.
    #[error("log has {count} topics, at most 4 are allowed")]
    TooManyTopics { count: usize },
}

/// Log payload bytes as submitted on-chain.
///
/// Anyone can emit arbitrary data from a contract, so ranges into the payload are only handed out
/// through [`UntrustedBytes::safe_slice`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct UntrustedBytes(Bytes);

impl UntrustedBytes {
    /// Returns `payload[start..end]`, or [`LogError::SliceOutOfBounds`] where a plain slice index
    /// would panic.
    ///
    /// Offsets are signed since they are usually decoded from the payload itself.
    ///
    /// # Errors
    ///
    /// Fails when `start < 0`, `end < 0`, `start > end` or `end > len`.
    pub fn safe_slice(&self, start: i64, end: i64) -> Result<&[u8], LogError> {
        let len = self.0.len();
        let out_of_bounds = LogError::SliceOutOfBounds { start, end, len };
        if start < 0 || end < 0 || start > end {
            return Err(out_of_bounds);
        }
        let (Ok(start), Ok(end)) = (usize::try_from(start), usize::try_from(end)) else {
            return Err(out_of_bounds);
        };
        if end > len {
            return Err(out_of_bounds);
        }
        Ok(&self.0[start..end])
    }

    #[must_use]
    pub fn into_bytes(self) -> Bytes {
        self.0
    }
}

impl Deref for UntrustedBytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Bytes> for UntrustedBytes {
    fn from(bytes: Bytes) -> Self {
        Self(bytes)
    }
}

impl From<Vec<u8>> for UntrustedBytes {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes.into())
    }
}

/// A contract log event as delivered by the node.
///
/// `address`, `topics` and `data` are consensus fields and attacker-influenced. The remaining
/// fields are filled in by the node and are not secured by consensus.
///
/// Serializes exactly like an Ethereum JSON-RPC log object.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RpcLog", into = "RpcLog")]
pub struct EventLog {
    /// Contract that emitted the event.
    pub address: Address,
    pub topics: Vec<B256>,
    /// Usually ABI-encoded.
    pub data: UntrustedBytes,
    pub block_number: u64,
    pub transaction_hash: B256,
    pub transaction_index: u64,
    pub block_hash: B256,
    /// Index of the log in the block.
    pub log_index: u64,
    /// Set when the log was reverted by a chain reorganization. Such a log retracts an earlier
    /// delivery and must never be treated as new data.
    pub removed: bool,
}

impl EventLog {
    /// Returns the topic at `index`.
    ///
    /// # Errors
    ///
    /// [`LogError::TopicOutOfRange`] if the log has fewer than `index + 1` topics.
    pub fn topic(&self, index: usize) -> Result<B256, LogError> {
        self.topics
            .get(index)
            .copied()
            .ok_or(LogError::TopicOutOfRange { index, count: self.topics.len() })
    }

    /// Returns a copy owning its own topic list and payload buffer.
    ///
    /// A single subscription may fan one log out to many listeners; each of them gets a copy
    /// that shares no storage with the others.
    #[must_use]
    pub fn deep_copy(&self) -> Self {
        Self {
            topics: self.topics.to_vec(),
            data: UntrustedBytes(Bytes::copy_from_slice(&self.data)),
            ..*self
        }
    }

    /// Consensus part of the log in the form expected by the ABI decoders.
    ///
    /// Returns `None` for more than four topics, which no EVM log can carry.
    #[must_use]
    pub fn log_data(&self) -> Option<LogData> {
        LogData::new(self.topics.clone(), self.data.0.clone())
    }
}

impl From<RpcLog> for EventLog {
    fn from(log: RpcLog) -> Self {
        Self {
            address: log.inner.address,
            topics: log.inner.topics().to_vec(),
            data: log.inner.data.data.clone().into(),
            block_number: log.block_number.unwrap_or_default(),
            transaction_hash: log.transaction_hash.unwrap_or_default(),
            transaction_index: log.transaction_index.unwrap_or_default(),
            block_hash: log.block_hash.unwrap_or_default(),
            log_index: log.log_index.unwrap_or_default(),
            removed: log.removed,
        }
    }
}

impl From<EventLog> for RpcLog {
    fn from(log: EventLog) -> Self {
        RpcLog {
            inner: alloy::primitives::Log {
                address: log.address,
                data: LogData::new_unchecked(log.topics, log.data.into_bytes()),
            },
            block_hash: Some(log.block_hash),
            block_number: Some(log.block_number),
            block_timestamp: None,
            transaction_hash: Some(log.transaction_hash),
            transaction_index: Some(log.transaction_index),
            log_index: Some(log.log_index),
            removed: log.removed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{address, b256, bytes};

    fn sample_log() -> EventLog {
        EventLog {
            address: address!("0x00000000000000000000000000000000000000aa"),
            topics: vec![
                b256!("0x1111111111111111111111111111111111111111111111111111111111111111"),
                b256!("0x2222222222222222222222222222222222222222222222222222222222222222"),
            ],
            data: bytes!("0x0102030405").into(),
            block_number: 42,
            transaction_hash: B256::repeat_byte(0x33),
            transaction_index: 3,
            block_hash: B256::repeat_byte(0x44),
            log_index: 7,
            removed: false,
        }
    }

    #[test]
    fn topic_returns_existing_topics() {
        let log = sample_log();
        assert_eq!(log.topic(0), Ok(log.topics[0]));
        assert_eq!(log.topic(1), Ok(log.topics[1]));
    }

    #[test]
    fn topic_past_the_end_is_an_error() {
        let log = sample_log();
        assert_eq!(log.topic(2), Err(LogError::TopicOutOfRange { index: 2, count: 2 }));
        assert!(EventLog::default().topic(0).is_err());
    }

    #[test]
    fn deep_copy_shares_no_storage() {
        let original = sample_log();
        let mut copy = original.deep_copy();
        assert_eq!(copy, original);

        assert_ne!(copy.topics.as_ptr(), original.topics.as_ptr());
        assert_ne!(copy.data.as_ptr(), original.data.as_ptr());

        copy.topics[0] = B256::ZERO;
        copy.topics.push(B256::ZERO);
        copy.data = vec![9u8; 3].into();
        copy.removed = true;

        assert_eq!(original, sample_log());
    }

    #[test]
    fn deep_copy_of_empty_log() {
        let log = EventLog::default();
        assert_eq!(log.deep_copy(), log);
    }

    #[test]
    fn safe_slice_rejects_every_invalid_range() {
        let data = sample_log().data;
        let len = i64::try_from(data.len()).unwrap();
        let invalid = [(-1, 2), (0, -1), (-3, -1), (3, 2), (0, len + 1), (len + 1, len + 2)];
        for (start, end) in invalid {
            let result = data.safe_slice(start, end);
            assert!(
                matches!(result, Err(LogError::SliceOutOfBounds { .. })),
                "[{start}, {end}) should be rejected, got {result:?}"
            );
        }
    }

    #[test]
    fn safe_slice_returns_exact_subslice_for_valid_ranges() {
        let data = sample_log().data;
        let len = data.len();
        for start in 0..=len {
            for end in start..=len {
                let slice = data.safe_slice(start as i64, end as i64).unwrap();
                assert_eq!(slice, &data[start..end]);
            }
        }
    }

    #[test]
    fn converts_from_rpc_log_with_missing_fields() {
        let rpc = RpcLog {
            inner: alloy::primitives::Log {
                address: address!("0x00000000000000000000000000000000000000bb"),
                data: LogData::new_unchecked(vec![B256::repeat_byte(1)], Bytes::from(vec![1, 2])),
            },
            block_hash: None,
            block_number: None,
            block_timestamp: None,
            transaction_hash: None,
            transaction_index: None,
            log_index: None,
            removed: true,
        };

        let log = EventLog::from(rpc);
        assert_eq!(log.topics, vec![B256::repeat_byte(1)]);
        assert_eq!(&*log.data, &[1, 2]);
        assert_eq!(log.block_number, 0);
        assert!(log.removed);
    }

    #[test]
    fn json_matches_rpc_log_format() {
        let log = sample_log();
        let json = serde_json::to_value(&log).unwrap();
        assert_eq!(json["blockNumber"], "0x2a");
        assert_eq!(json["logIndex"], "0x7");
        assert_eq!(json["data"], "0x0102030405");
        assert_eq!(json["removed"], false);

        let back: EventLog = serde_json::from_value(json).unwrap();
        assert_eq!(back, log);
    }
}
