use thiserror::Error;

use fuzzctl_infra_broker::BrokerError;
use fuzzctl_infra_store::StoreError;

#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error(transparent)]
    Broker(#[from] BrokerError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("unknown wordlist: {0}")]
    UnknownWordlist(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("no active workers available for this scan")]
    NoActiveWorkers,
}
