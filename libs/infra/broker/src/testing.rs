//! An in-memory stand-in for [`crate::BrokerClient`], so the fan-in logic
//! built on top of [`crate::Broker`] can be exercised hermetically.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::Mutex;

use crate::errors::BrokerError;
use crate::port::Broker;

#[derive(Clone, Default)]
pub struct InMemoryBroker {
    queues: Arc<Mutex<HashMap<String, VecDeque<String>>>>,
    hashes: Arc<Mutex<HashMap<String, HashMap<String, String>>>>,
}

impl InMemoryBroker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues a raw, unvalidated payload — used to exercise the malformed-
    /// message path without going through `serde_json::to_string` first.
    pub async fn push_raw(&self, queue: &str, body: impl Into<String>) {
        self.queues
            .lock()
            .await
            .entry(queue.to_string())
            .or_default()
            .push_back(body.into());
    }
}

#[async_trait]
impl Broker for InMemoryBroker {
    async fn push<T: Serialize + Sync>(&self, queue: &str, payload: &T) -> Result<(), BrokerError> {
        let body = serde_json::to_string(payload)?;
        self.push_raw(queue, body).await;
        Ok(())
    }

    async fn blocking_pop_raw(&self, queue: &str, _timeout_secs: f64) -> Result<Option<String>, BrokerError> {
        self.non_blocking_pop_raw(queue).await
    }

    async fn non_blocking_pop_raw(&self, queue: &str) -> Result<Option<String>, BrokerError> {
        let mut queues = self.queues.lock().await;
        Ok(queues.get_mut(queue).and_then(|q| q.pop_front()))
    }

    async fn hash_set<T: Serialize + Sync>(
        &self,
        hash: &str,
        key: &str,
        value: &T,
    ) -> Result<(), BrokerError> {
        let body = serde_json::to_string(value)?;
        self.hashes
            .lock()
            .await
            .entry(hash.to_string())
            .or_default()
            .insert(key.to_string(), body);
        Ok(())
    }

    async fn hash_get_all<T: DeserializeOwned>(&self, hash: &str) -> Result<HashMap<String, T>, BrokerError> {
        let raw = self.hashes.lock().await.get(hash).cloned().unwrap_or_default();
        let mut out = HashMap::with_capacity(raw.len());
        for (k, v) in raw {
            match serde_json::from_str(&v) {
                Ok(parsed) => {
                    out.insert(k, parsed);
                }
                Err(err) => {
                    tracing::warn!(key = %k, %err, "dropping malformed hash entry");
                }
            }
        }
        Ok(out)
    }

    async fn hash_delete(&self, hash: &str, key: &str) -> Result<(), BrokerError> {
        if let Some(entries) = self.hashes.lock().await.get_mut(hash) {
            entries.remove(key);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn push_then_pop_round_trips() {
        let broker = InMemoryBroker::new();
        broker.push("q", &"hello".to_string()).await.unwrap();
        let popped: Option<String> = broker.non_blocking_pop("q").await.unwrap();
        assert_eq!(popped, Some("hello".to_string()));
        let empty: Option<String> = broker.non_blocking_pop("q").await.unwrap();
        assert_eq!(empty, None);
    }

    #[tokio::test]
    async fn raw_malformed_payload_surfaces_as_decode_error() {
        let broker = InMemoryBroker::new();
        broker.push_raw("q", "not json").await;
        let result: Result<Option<String>, BrokerError> = broker.non_blocking_pop("q").await;
        assert!(matches!(result, Err(BrokerError::Malformed(_))));
    }

    #[tokio::test]
    async fn hash_set_and_get_all_round_trip() {
        let broker = InMemoryBroker::new();
        broker.hash_set("h", "k1", &42i32).await.unwrap();
        let all: HashMap<String, i32> = broker.hash_get_all("h").await.unwrap();
        assert_eq!(all.get("k1"), Some(&42));

        broker.hash_delete("h", "k1").await.unwrap();
        let all: HashMap<String, i32> = broker.hash_get_all("h").await.unwrap();
        assert!(all.is_empty());
    }
}
