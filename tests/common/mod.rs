#![allow(dead_code)]

use std::sync::{Arc, Once};

use alloy::{
    network::Ethereum,
    primitives::Address,
    providers::{RootProvider, mock::Asserter},
    rpc::client::RpcClient,
    sol_types::SolEvent,
};
use contract_tracker::{
    ContractTracker, ContractTrackerBuilder,
    eth::EventLog,
    test_utils::{FakeBroadcaster, logs::event_log},
};
use tracing_subscriber::EnvFilter;

pub const CONTRACT: Address = Address::repeat_byte(0xaa);
pub const OTHER_CONTRACT: Address = Address::repeat_byte(0xbb);
pub const JOB_ID: i32 = 42;

pub struct TrackerSetup {
    pub tracker: Arc<ContractTracker<RootProvider<Ethereum>>>,
    pub broadcaster: Arc<FakeBroadcaster>,
    pub asserter: Asserter,
}

impl TrackerSetup {
    /// Emits `event` from the tracked contract through the broadcaster and returns the log.
    pub fn emit<E: SolEvent>(&self, event: &E) -> EventLog {
        let log = event_log(CONTRACT, event);
        self.broadcaster.broadcast(&log);
        log
    }
}

pub fn setup() -> TrackerSetup {
    setup_with(FakeBroadcaster::new(), ContractTrackerBuilder::new())
}

pub fn setup_with(
    broadcaster: Arc<FakeBroadcaster>,
    builder: ContractTrackerBuilder,
) -> TrackerSetup {
    init_tracing();
    let asserter = Asserter::new();
    let provider = RootProvider::<Ethereum>::new(RpcClient::mocked(asserter.clone()));
    let tracker = builder
        .job_id(JOB_ID)
        .build(CONTRACT, provider, broadcaster.clone())
        .expect("valid tracker configuration");
    TrackerSetup { tracker, broadcaster, asserter }
}

fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}
