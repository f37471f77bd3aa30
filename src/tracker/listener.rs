use crate::{
    TrackerError,
    broadcast::{Broadcast, BroadcastError, LogListener},
    client::ChainClient,
    contract::{
        CONFIG_SET_TOPIC, ContractConfig, ROUND_REQUESTED_TOPIC, decode_config_set,
        decode_round_requested, ensure_address,
    },
    eth::EventLog,
    tracker::{ContractTracker, RoundRequest, lock},
};

impl<C: ChainClient + 'static> LogListener for ContractTracker<C> {
    fn on_connect(&self) {}

    fn on_disconnect(&self) {}

    /// Logs are marked consumed only once they were acted upon. A log that fails to decode or
    /// comes from another address is dropped unconsumed.
    fn handle_log(&self, broadcast: Result<&dyn Broadcast, &BroadcastError>) {
        let broadcast = match broadcast {
            Ok(broadcast) => broadcast,
            Err(err) => {
                error!(job_id = self.job_id, error = %err, "Got error from log broadcaster");
                return;
            }
        };

        match broadcast.was_already_consumed() {
            Ok(false) => {}
            Ok(true) => return,
            Err(err) => {
                error!(
                    job_id = self.job_id,
                    error = %err,
                    "Could not determine if log was already consumed"
                );
                return;
            }
        }

        let log = broadcast.raw_log();
        if log.removed {
            debug!(
                job_id = self.job_id,
                block_number = log.block_number,
                log_index = log.log_index,
                "Ignoring removed log"
            );
            return;
        }
        let Ok(topic) = log.topic(0) else {
            debug!(job_id = self.job_id, "Ignoring log without topics");
            return;
        };

        let handled = if topic == CONFIG_SET_TOPIC {
            self.handle_config_set(log)
        } else if topic == ROUND_REQUESTED_TOPIC {
            self.handle_round_requested(log)
        } else {
            debug!(job_id = self.job_id, topic = %topic, "Ignoring log with unknown topic");
            Ok(())
        };
        if let Err(err) = handled {
            error!(
                job_id = self.job_id,
                block_number = log.block_number,
                log_index = log.log_index,
                error = %err,
                "Could not handle log"
            );
            return;
        }

        if let Err(err) = broadcast.mark_consumed() {
            error!(job_id = self.job_id, error = %err, "Could not mark log consumed");
        }
    }

    fn job_id(&self) -> i32 {
        self.job_id
    }
}

impl<C> ContractTracker<C> {
    fn handle_config_set(&self, log: &EventLog) -> Result<(), TrackerError> {
        ensure_address(log, self.contract_address)?;
        let event = decode_config_set(log)?;
        let config = ContractConfig::from_config_set(self.contract_address, event);

        let mut last_config_digest = lock(&self.last_config_digest);
        if *last_config_digest == Some(config.config_digest) {
            debug!(
                job_id = self.job_id,
                config_digest = %config.config_digest,
                "Skipping config already forwarded"
            );
            return Ok(());
        }
        *last_config_digest = Some(config.config_digest);

        debug!(
            job_id = self.job_id,
            config_digest = %config.config_digest,
            "Got new contract config"
        );
        self.configs.deliver(config);
        Ok(())
    }

    fn handle_round_requested(&self, log: &EventLog) -> Result<(), TrackerError> {
        ensure_address(log, self.contract_address)?;
        let event = decode_round_requested(log)?;
        let candidate = RoundRequest::from(&event);

        match self.latest_round_requested.advance(candidate) {
            Ok(()) => debug!(
                job_id = self.job_id,
                epoch = candidate.epoch,
                round = candidate.round,
                "Got new round request"
            ),
            Err(latest) => warn!(
                job_id = self.job_id,
                epoch = candidate.epoch,
                round = candidate.round,
                latest_epoch = latest.epoch,
                latest_round = latest.round,
                "Ignoring out of date round request"
            ),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    };

    use alloy::{
        network::Ethereum,
        primitives::{Address, B256},
        providers::{RootProvider, mock::Asserter},
        rpc::client::RpcClient,
    };

    use super::*;
    use crate::{
        ContractTrackerBuilder,
        broadcast::LogBroadcaster,
        test_utils::logs::{config_set, event_log, round_requested},
    };

    const CONTRACT: Address = Address::repeat_byte(0xaa);

    struct NoopBroadcaster;

    impl LogBroadcaster for NoopBroadcaster {
        fn register(&self, _: Address, _: Arc<dyn LogListener>) -> bool {
            true
        }

        fn unregister(&self, _: Address, _: &Arc<dyn LogListener>) {}
    }

    struct TestBroadcast {
        log: EventLog,
        consumed: AtomicBool,
        consumption_error: Mutex<Option<BroadcastError>>,
    }

    impl TestBroadcast {
        fn new(log: EventLog) -> Self {
            Self { log, consumed: AtomicBool::new(false), consumption_error: Mutex::new(None) }
        }

        fn consumed(&self) -> bool {
            self.consumed.load(Ordering::SeqCst)
        }
    }

    impl Broadcast for TestBroadcast {
        fn raw_log(&self) -> &EventLog {
            &self.log
        }

        fn was_already_consumed(&self) -> Result<bool, BroadcastError> {
            match self.consumption_error.lock().unwrap().clone() {
                Some(err) => Err(err),
                None => Ok(self.consumed()),
            }
        }

        fn mark_consumed(&self) -> Result<(), BroadcastError> {
            self.consumed.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    fn tracker() -> Arc<ContractTracker<RootProvider<Ethereum>>> {
        let client = RootProvider::new(RpcClient::mocked(Asserter::new()));
        ContractTrackerBuilder::new().build(CONTRACT, client, Arc::new(NoopBroadcaster)).unwrap()
    }

    fn deliver(tracker: &impl LogListener, log: EventLog) -> TestBroadcast {
        let broadcast = TestBroadcast::new(log);
        tracker.handle_log(Ok(&broadcast));
        broadcast
    }

    #[test]
    fn config_set_is_queued_and_consumed() {
        let tracker = tracker();
        let broadcast = deliver(&*tracker, event_log(CONTRACT, &config_set(1)));

        assert!(broadcast.consumed());
        assert_eq!(tracker.pending_configs(), 1);
        assert_eq!(
            tracker.configs.retrieve(),
            Some(ContractConfig::from_config_set(CONTRACT, config_set(1)))
        );
    }

    #[test]
    fn repeated_config_digest_is_queued_once() {
        let tracker = tracker();
        let first = deliver(&*tracker, event_log(CONTRACT, &config_set(1)));
        let second = deliver(&*tracker, event_log(CONTRACT, &config_set(1)));

        assert!(first.consumed() && second.consumed());
        assert_eq!(tracker.pending_configs(), 1);

        deliver(&*tracker, event_log(CONTRACT, &config_set(2)));
        assert_eq!(tracker.pending_configs(), 2);
    }

    #[test]
    fn already_consumed_log_is_skipped() {
        let tracker = tracker();
        let broadcast = TestBroadcast::new(event_log(CONTRACT, &config_set(1)));
        broadcast.consumed.store(true, Ordering::SeqCst);

        tracker.handle_log(Ok(&broadcast));

        assert_eq!(tracker.pending_configs(), 0);
    }

    #[test]
    fn consumption_lookup_failure_drops_the_log() {
        let tracker = tracker();
        let broadcast = TestBroadcast::new(event_log(CONTRACT, &config_set(1)));
        *broadcast.consumption_error.lock().unwrap() = Some(BroadcastError::new("db down"));

        tracker.handle_log(Ok(&broadcast));

        assert_eq!(tracker.pending_configs(), 0);
        assert!(!broadcast.consumed());
    }

    #[test]
    fn upstream_error_is_ignored() {
        let tracker = tracker();
        tracker.handle_log(Err(&BroadcastError::new("subscription dropped")));
        assert_eq!(tracker.pending_configs(), 0);
    }

    #[test]
    fn foreign_address_is_dropped_unconsumed() {
        let tracker = tracker();
        let other = Address::repeat_byte(0xbb);

        let config = deliver(&*tracker, event_log(other, &config_set(1)));
        let round = deliver(&*tracker, event_log(other, &round_requested(1, 1)));

        assert!(!config.consumed() && !round.consumed());
        assert_eq!(tracker.pending_configs(), 0);
        assert_eq!(tracker.latest_round_requested.get(), RoundRequest::default());
    }

    #[test]
    fn malformed_log_is_dropped_unconsumed() {
        let tracker = tracker();
        let mut log = event_log(CONTRACT, &config_set(1));
        log.data = vec![0u8; 10].into();

        let broadcast = deliver(&*tracker, log);

        assert!(!broadcast.consumed());
        assert_eq!(tracker.pending_configs(), 0);
    }

    #[test]
    fn removed_log_is_not_acted_upon() {
        let tracker = tracker();
        let mut log = event_log(CONTRACT, &config_set(1));
        log.removed = true;

        let broadcast = deliver(&*tracker, log);

        assert!(!broadcast.consumed());
        assert_eq!(tracker.pending_configs(), 0);
    }

    #[test]
    fn unknown_topic_is_consumed_without_effect() {
        let tracker = tracker();
        let mut log = event_log(CONTRACT, &config_set(1));
        log.topics = vec![B256::repeat_byte(0x42)];

        let broadcast = deliver(&*tracker, log);

        assert!(broadcast.consumed());
        assert_eq!(tracker.pending_configs(), 0);
    }

    #[test]
    fn log_without_topics_is_ignored() {
        let tracker = tracker();
        let mut log = event_log(CONTRACT, &config_set(1));
        log.topics.clear();

        let broadcast = deliver(&*tracker, log);

        assert!(!broadcast.consumed());
        assert_eq!(tracker.pending_configs(), 0);
    }

    #[test]
    fn round_requests_only_move_forward() {
        let tracker = tracker();

        for (epoch, round) in [(5, 3), (5, 2), (4, 9)] {
            let broadcast = deliver(&*tracker, event_log(CONTRACT, &round_requested(epoch, round)));
            assert!(broadcast.consumed());
        }

        let latest = tracker.latest_round_requested.get();
        assert_eq!((latest.epoch, latest.round), (5, 3));
        assert_eq!(latest.config_digest, round_requested(5, 3).configDigest);
    }
}
