use std::sync::Arc;

use alloy::{
    primitives::Address,
    transports::{RpcError, TransportErrorKind},
};
use thiserror::Error;

use crate::eth::LogError;

/// Errors returned by the tracker.
///
/// Lifecycle misuse leaves the tracker in the state it was in. Upstream failures are wrapped
/// with context and never retried here; retry policy belongs to the caller owning the client.
#[derive(Error, Debug, Clone)]
pub enum TrackerError {
    /// `start` was called on a tracker that was already started or stopped.
    #[error("contract tracker already started")]
    AlreadyStarted,

    /// `start` was called outside a Tokio runtime.
    #[error("contract tracker must be started from within a Tokio runtime")]
    NoRuntime,

    /// `close` was called before `start`.
    #[error("contract tracker was never started")]
    NotStarted,

    /// `close` was called twice.
    #[error("contract tracker already stopped")]
    AlreadyStopped,

    /// The config stream was already handed out.
    #[error("new configs are already subscribed to")]
    AlreadySubscribed,

    /// The configured mailbox capacity is invalid (must be greater than zero).
    #[error("mailbox capacity must be greater than 0")]
    InvalidMailboxCapacity,

    /// The underlying RPC transport returned an error.
    #[error("{context}: {source}")]
    RpcError {
        context: &'static str,
        #[source]
        source: Arc<RpcError<TransportErrorKind>>,
    },

    /// A log or call result could not be ABI-decoded.
    #[error("{context}: {source}")]
    Decode {
        context: &'static str,
        #[source]
        source: Arc<alloy::sol_types::Error>,
    },

    /// A log claims to come from a contract other than the tracked one.
    #[error("log address of {actual} does not match configured contract address of {expected}")]
    AddressMismatch { actual: Address, expected: Address },

    /// No `ConfigSet` log exists in the block the caller expected it in.
    #[error("contract with address {contract} has no ConfigSet logs in block {block}")]
    NoConfigLogs { contract: Address, block: u64 },

    /// The node returned no head block.
    #[error("got nil head")]
    MissingHead,

    #[error(transparent)]
    Log(#[from] LogError),
}

impl TrackerError {
    pub(crate) fn rpc(context: &'static str) -> impl FnOnce(RpcError<TransportErrorKind>) -> Self {
        move |source| TrackerError::RpcError { context, source: Arc::new(source) }
    }

    pub(crate) fn decode(context: &'static str) -> impl FnOnce(alloy::sol_types::Error) -> Self {
        move |source| TrackerError::Decode { context, source: Arc::new(source) }
    }
}
