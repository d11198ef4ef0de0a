use thiserror::Error;

#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("broker unavailable: {0}")]
    Unavailable(#[from] redis::RedisError),
    #[error("malformed payload: {0}")]
    Malformed(#[from] serde_json::Error),
}
