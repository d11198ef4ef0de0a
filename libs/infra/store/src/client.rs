use std::sync::Arc;

use libsql::{Builder, Connection, Database};
use tracing::{error, info, instrument};

use crate::errors::StoreError;
use crate::schema::apply_schema;

/// Owns the libsql driver and, for in-memory databases, an anchor connection
/// that keeps the schema alive for the process lifetime (SQLite would
/// otherwise drop an in-memory database as soon as its one connection closes).
#[derive(Clone)]
pub struct StoreClient {
    driver: Arc<Database>,
    _memory_anchor: Option<Arc<Connection>>,
}

impl StoreClient {
    #[instrument(skip(auth_token))]
    pub async fn connect(db_path: &str, auth_token: Option<String>) -> Result<Self, StoreError> {
        if db_path.is_empty() {
            return Err(StoreError::Connection("db path is empty".into()));
        }

        info!(db_path, "connecting to store");

        let is_remote = db_path.starts_with("libsql://") || db_path.starts_with("https://");
        let is_memory = db_path == ":memory:" || db_path.contains("mode=memory");

        let driver = if is_remote {
            let token = auth_token
                .ok_or_else(|| StoreError::Connection("remote store requires an auth token".into()))?;
            Builder::new_remote(db_path.to_string(), token).build().await
        } else {
            Builder::new_local(db_path).build().await
        }
        .map_err(|e| StoreError::Connection(format!("failed to open driver: {e}")))?;

        let driver = Arc::new(driver);
        let anchor = if is_memory {
            let conn = driver
                .connect()
                .map_err(|e| StoreError::Connection(format!("failed to anchor memory db: {e}")))?;
            apply_schema(&conn).await?;
            Some(Arc::new(conn))
        } else {
            let conn = driver
                .connect()
                .map_err(|e| StoreError::Connection(format!("failed to bootstrap schema: {e}")))?;
            apply_schema(&conn).await?;
            None
        };

        Ok(Self {
            driver,
            _memory_anchor: anchor,
        })
    }

    pub fn get_connection(&self) -> Result<Connection, StoreError> {
        self.driver.connect().map_err(|e| {
            error!(%e, "failed to allocate connection");
            StoreError::Connection(e.to_string())
        })
    }
}
