use std::collections::HashMap;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde::{de::DeserializeOwned, Serialize};
use tracing::instrument;

use crate::errors::BrokerError;
use crate::port::Broker;

/// Thin typed wrapper over the broker primitives the coordinator and worker
/// agree on: FIFO queues (push / blocking pop / non-blocking pop) and hashes
/// (set / get-all / delete). Backed by Redis; `ConnectionManager` reconnects
/// transparently so callers don't need their own retry loop around a dropped
/// connection.
#[derive(Clone)]
pub struct BrokerClient {
    conn: ConnectionManager,
}

impl BrokerClient {
    #[instrument(skip(redis_url))]
    pub async fn connect(redis_url: &str) -> Result<Self, BrokerError> {
        let client = redis::Client::open(redis_url)?;
        let conn = client.get_connection_manager().await?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl Broker for BrokerClient {
    async fn push<T: Serialize + Sync>(&self, queue: &str, payload: &T) -> Result<(), BrokerError> {
        let body = serde_json::to_string(payload)?;
        let mut conn = self.conn.clone();
        conn.rpush::<_, _, ()>(queue, body).await?;
        Ok(())
    }

    /// Blocks up to `timeout_secs` for the next item, returning `None` on
    /// timeout rather than erroring.
    async fn blocking_pop_raw(&self, queue: &str, timeout_secs: f64) -> Result<Option<String>, BrokerError> {
        let mut conn = self.conn.clone();
        let reply: Option<(String, String)> = conn.blpop(queue, timeout_secs).await?;
        Ok(reply.map(|(_, body)| body))
    }

    /// Non-blocking pop; returns `None` immediately if the queue is empty.
    async fn non_blocking_pop_raw(&self, queue: &str) -> Result<Option<String>, BrokerError> {
        let mut conn = self.conn.clone();
        let reply: Option<String> = conn.lpop(queue, None).await?;
        Ok(reply)
    }

    async fn hash_set<T: Serialize + Sync>(
        &self,
        hash: &str,
        key: &str,
        value: &T,
    ) -> Result<(), BrokerError> {
        let body = serde_json::to_string(value)?;
        let mut conn = self.conn.clone();
        conn.hset::<_, _, _, ()>(hash, key, body).await?;
        Ok(())
    }

    async fn hash_get_all<T: DeserializeOwned>(&self, hash: &str) -> Result<HashMap<String, T>, BrokerError> {
        let mut conn = self.conn.clone();
        let raw: HashMap<String, String> = conn.hgetall(hash).await?;
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
        let mut conn = self.conn.clone();
        conn.hdel::<_, _, ()>(hash, key).await?;
        Ok(())
    }
}
