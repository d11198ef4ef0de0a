use std::collections::HashMap;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

use crate::errors::BrokerError;

/// The broker operations the coordinator and worker agree on. Abstracted so
/// the fan-in logic in `task_manager` can be exercised against
/// [`crate::testing::InMemoryBroker`] instead of a live Redis.
#[async_trait]
pub trait Broker: Clone + Send + Sync + 'static {
    async fn push<T: Serialize + Sync>(&self, queue: &str, payload: &T) -> Result<(), BrokerError>;

    /// Blocks up to `timeout_secs` for the next item's raw body, without
    /// attempting to decode it. Lets callers fall back to a partial decode
    /// when the full payload doesn't parse.
    async fn blocking_pop_raw(&self, queue: &str, timeout_secs: f64) -> Result<Option<String>, BrokerError>;

    /// Non-blocking raw pop; returns `None` immediately if the queue is empty.
    async fn non_blocking_pop_raw(&self, queue: &str) -> Result<Option<String>, BrokerError>;

    async fn blocking_pop<T: DeserializeOwned>(
        &self,
        queue: &str,
        timeout_secs: f64,
    ) -> Result<Option<T>, BrokerError> {
        match self.blocking_pop_raw(queue, timeout_secs).await? {
            Some(body) => Ok(Some(serde_json::from_str(&body)?)),
            None => Ok(None),
        }
    }

    async fn non_blocking_pop<T: DeserializeOwned>(&self, queue: &str) -> Result<Option<T>, BrokerError> {
        match self.non_blocking_pop_raw(queue).await? {
            Some(body) => Ok(Some(serde_json::from_str(&body)?)),
            None => Ok(None),
        }
    }

    async fn hash_set<T: Serialize + Sync>(&self, hash: &str, key: &str, value: &T)
        -> Result<(), BrokerError>;

    async fn hash_get_all<T: DeserializeOwned>(&self, hash: &str) -> Result<HashMap<String, T>, BrokerError>;

    async fn hash_delete(&self, hash: &str, key: &str) -> Result<(), BrokerError>;
}
