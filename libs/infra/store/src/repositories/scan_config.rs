use libsql::params;
use tracing::instrument;

use fuzzctl_domain_models::scan_config::ScanConfig;

use crate::client::StoreClient;
use crate::errors::StoreError;

pub struct ScanConfigRepository {
    client: StoreClient,
}

impl ScanConfigRepository {
    pub fn new(client: StoreClient) -> Self {
        Self { client }
    }

    #[instrument(skip(self, config))]
    pub async fn save(&self, config: &ScanConfig) -> Result<(), StoreError> {
        let conn = self.client.get_connection()?;
        let extensions_json = config
            .extensions
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| StoreError::Mapping(e.to_string()))?;
        let headers_json = config
            .headers
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| StoreError::Mapping(e.to_string()))?;

        conn.execute(
            r#"
            INSERT INTO scan_configs (
                config_id, name, target, wordlist, threads_per_worker, rate_limit,
                follow_redirects, recursive, extensions, headers, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            ON CONFLICT(config_id) DO UPDATE SET
                name = excluded.name, target = excluded.target, wordlist = excluded.wordlist,
                threads_per_worker = excluded.threads_per_worker, rate_limit = excluded.rate_limit,
                follow_redirects = excluded.follow_redirects, recursive = excluded.recursive,
                extensions = excluded.extensions, headers = excluded.headers
            "#,
            params![
                config.config_id.clone(),
                config.name.clone(),
                config.target.clone(),
                config.wordlist.clone(),
                config.threads_per_worker,
                config.rate_limit,
                config.follow_redirects as i64,
                config.recursive as i64,
                extensions_json,
                headers_json,
                config.created_at.to_rfc3339(),
            ],
        )
        .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn get_all(&self) -> Result<Vec<ScanConfig>, StoreError> {
        let conn = self.client.get_connection()?;
        let mut rows = conn
            .query(
                r#"
                SELECT config_id, name, target, wordlist, threads_per_worker, rate_limit,
                       follow_redirects, recursive, extensions, headers, created_at
                FROM scan_configs ORDER BY created_at DESC
                "#,
                (),
            )
            .await?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            out.push(map_row_to_config(&row)?);
        }
        Ok(out)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, config_id: &str) -> Result<Option<ScanConfig>, StoreError> {
        let conn = self.client.get_connection()?;
        let mut rows = conn
            .query(
                r#"
                SELECT config_id, name, target, wordlist, threads_per_worker, rate_limit,
                       follow_redirects, recursive, extensions, headers, created_at
                FROM scan_configs WHERE config_id = ?1
                "#,
                params![config_id],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(map_row_to_config(&row)?)),
            None => Ok(None),
        }
    }
}

fn map_row_to_config(row: &libsql::Row) -> Result<ScanConfig, StoreError> {
    let extensions_json: Option<String> = row.get(8)?;
    let headers_json: Option<String> = row.get(9)?;
    let created_at: String = row.get(10)?;
    let follow_redirects: i64 = row.get(6)?;
    let recursive: i64 = row.get(7)?;

    Ok(ScanConfig {
        config_id: row.get(0)?,
        name: row.get(1)?,
        target: row.get(2)?,
        wordlist: row.get(3)?,
        threads_per_worker: row.get(4)?,
        rate_limit: row.get(5)?,
        follow_redirects: follow_redirects != 0,
        recursive: recursive != 0,
        extensions: extensions_json
            .map(|s| serde_json::from_str(&s))
            .transpose()
            .map_err(|e| StoreError::Mapping(e.to_string()))?,
        headers: headers_json
            .map(|s| serde_json::from_str(&s))
            .transpose()
            .map_err(|e| StoreError::Mapping(e.to_string()))?,
        created_at: chrono::DateTime::parse_from_rfc3339(&created_at)
            .map_err(|e| StoreError::Mapping(e.to_string()))?
            .with_timezone(&chrono::Utc),
    })
}
