use std::sync::atomic::{AtomicU8, Ordering};

use crate::TrackerError;

/// Lifecycle of a [`ContractTracker`](crate::ContractTracker). Each transition happens at most
/// once.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum LifecycleState {
    NotStarted = 0,
    Started = 1,
    Stopped = 2,
}

impl LifecycleState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => LifecycleState::NotStarted,
            1 => LifecycleState::Started,
            _ => LifecycleState::Stopped,
        }
    }
}

#[derive(Debug)]
pub(crate) struct StartStopOnce(AtomicU8);

impl StartStopOnce {
    pub fn new() -> Self {
        Self(AtomicU8::new(LifecycleState::NotStarted as u8))
    }

    pub fn state(&self) -> LifecycleState {
        LifecycleState::from_u8(self.0.load(Ordering::Acquire))
    }

    /// `NotStarted -> Started`.
    pub fn try_start(&self) -> Result<(), TrackerError> {
        self.transition(LifecycleState::NotStarted, LifecycleState::Started)
            .map_err(|_| TrackerError::AlreadyStarted)
    }

    /// `Started -> Stopped`.
    pub fn try_stop(&self) -> Result<(), TrackerError> {
        self.transition(LifecycleState::Started, LifecycleState::Stopped).map_err(|actual| {
            match actual {
                LifecycleState::NotStarted => TrackerError::NotStarted,
                _ => TrackerError::AlreadyStopped,
            }
        })
    }

    fn transition(&self, from: LifecycleState, to: LifecycleState) -> Result<(), LifecycleState> {
        self.0
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(LifecycleState::from_u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transitions_once_in_each_direction() {
        let lifecycle = StartStopOnce::new();
        assert_eq!(lifecycle.state(), LifecycleState::NotStarted);

        lifecycle.try_start().unwrap();
        assert_eq!(lifecycle.state(), LifecycleState::Started);
        assert!(matches!(lifecycle.try_start(), Err(TrackerError::AlreadyStarted)));

        lifecycle.try_stop().unwrap();
        assert_eq!(lifecycle.state(), LifecycleState::Stopped);
        assert!(matches!(lifecycle.try_stop(), Err(TrackerError::AlreadyStopped)));
        assert!(matches!(lifecycle.try_start(), Err(TrackerError::AlreadyStarted)));
        assert_eq!(lifecycle.state(), LifecycleState::Stopped);
    }

    #[test]
    fn stop_before_start_fails_without_changing_state() {
        let lifecycle = StartStopOnce::new();
        assert!(matches!(lifecycle.try_stop(), Err(TrackerError::NotStarted)));
        assert_eq!(lifecycle.state(), LifecycleState::NotStarted);
    }
}
