use thiserror::Error;

use fuzzctl_infra_broker::BrokerError;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error(transparent)]
    Broker(#[from] BrokerError),
    #[error("fuzzer timed out after {0}s")]
    FuzzerTimeout(u64),
    #[error("fuzzer invocation failed: {0}")]
    FuzzerFailure(String),
}
