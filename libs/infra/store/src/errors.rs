use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("connection error: {0}")]
    Connection(String),
    #[error("query error: {0}")]
    Query(#[from] libsql::Error),
    #[error("mapping error: {0}")]
    Mapping(String),
    #[error("duplicate id")]
    DuplicateId,
}
