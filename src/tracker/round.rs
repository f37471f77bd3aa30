use std::sync::{PoisonError, RwLock};

use crate::contract::{ConfigDigest, RoundRequested};

/// Latest round requested from the contract via a `RoundRequested` event.
///
/// The zero value means no request was observed yet, which is not an error.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RoundRequest {
    pub config_digest: ConfigDigest,
    pub epoch: u32,
    pub round: u8,
}

impl From<&RoundRequested> for RoundRequest {
    fn from(event: &RoundRequested) -> Self {
        Self { config_digest: event.configDigest, epoch: event.epoch, round: event.round }
    }
}

/// In-memory, lock-guarded [`RoundRequest`] that only moves forward.
#[derive(Debug, Default)]
pub(crate) struct LatestRoundRequested(RwLock<RoundRequest>);

impl LatestRoundRequested {
    pub fn get(&self) -> RoundRequest {
        *self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stores `candidate` if neither its epoch nor its round is lower than the stored ones.
    ///
    /// Returns the stored value when `candidate` is rejected as out of date.
    pub fn advance(&self, candidate: RoundRequest) -> Result<(), RoundRequest> {
        let mut latest = self.0.write().unwrap_or_else(PoisonError::into_inner);
        if candidate.epoch >= latest.epoch && candidate.round >= latest.round {
            *latest = candidate;
            Ok(())
        } else {
            Err(*latest)
        }
    }
}
