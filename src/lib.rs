//! Contract-Tracker follows an `OffchainAggregator` contract on behalf of an off-chain reporting
//! job.
//!
//! The main entry point is [`ContractTracker`], built via [`ContractTrackerBuilder`]. It answers
//! the consensus protocol's questions about the contract through [`ContractConfigTracker`]:
//!
//! - the stream of new configs, fed by `ConfigSet` logs
//!   ([`ContractConfigTracker::subscribe_to_new_configs`]);
//! - the latest round request, fed by `RoundRequested` logs;
//! - the current config details, a config rebuilt from the logs of a given block and the latest
//!   block height, read directly from the node.
//!
//! # Logs
//!
//! The tracker does not subscribe to the node itself. It registers as a [`LogListener`] with an
//! external [`LogBroadcaster`] which owns the node subscription and records, per job, which logs
//! were already consumed. The tracker marks a log consumed once it acted on it, so a log
//! redelivered after a restart may be acted on twice: subscribers must tolerate seeing the same
//! config again.
//!
//! Logs flagged as removed by a reorg are ignored.
//!
//! # Backpressure
//!
//! Log handling never waits on the config subscriber. New configs go through a bounded mailbox
//! that evicts the oldest pending config when full (see [`CONFIG_MAILBOX_SANITY_LIMIT`]); in
//! practice it never holds more than one.
//!
//! # Chain reads
//!
//! Reads go through a [`ChainClient`], implemented for every alloy
//! [`Provider`](alloy::providers::Provider). Failures are wrapped with context and returned as
//! is. Timeouts and retries are the client's business.

#[macro_use]
mod logging;

pub mod broadcast;
pub mod client;
pub mod contract;
pub mod eth;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

mod error;
mod mailbox;
mod tracker;

pub use broadcast::{Broadcast, BroadcastError, LogBroadcaster, LogListener};
pub use client::ChainClient;
pub use contract::{ConfigDigest, ContractConfig};
pub use error::TrackerError;
pub use mailbox::{CONFIG_MAILBOX_SANITY_LIMIT, Mailbox};
pub use tracker::{
    ConfigSubscription, ContractConfigTracker, ContractTracker, ContractTrackerBuilder,
    LifecycleState, RoundRequest,
};
