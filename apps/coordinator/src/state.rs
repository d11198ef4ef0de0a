use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use fuzzctl_infra_broker::{Broker, BrokerClient};
use fuzzctl_infra_store::Store;

/// In-memory bookkeeping for a task currently being fanned out. Lives from
/// creation until either every assigned worker reports or the task is
/// abandoned; owned exclusively by the result fan-in loop.
#[derive(Debug, Clone)]
pub struct ActiveTask {
    pub results_received: usize,
    pub total_workers: usize,
}

/// Generic over the broker implementation so the fan-in logic in
/// `task_manager` can be driven by `fuzzctl_infra_broker::testing::InMemoryBroker`
/// in tests rather than a live Redis. Production code always uses the default
/// `BrokerClient`.
#[derive(Clone)]
pub struct AppState<B: Broker = BrokerClient> {
    pub store: Store,
    pub broker: B,
    pub active_tasks: Arc<Mutex<HashMap<String, ActiveTask>>>,
}

impl<B: Broker> AppState<B> {
    pub fn new(store: Store, broker: B) -> Self {
        Self {
            store,
            broker,
            active_tasks: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}
