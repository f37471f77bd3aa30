//! Helpers for exercising a tracker without a node: contract log builders, an in-memory log
//! broadcaster and assertions over the config stream.

pub mod broadcaster;
pub mod logs;
pub mod macros;

pub use broadcaster::{FakeBroadcast, FakeBroadcaster};
