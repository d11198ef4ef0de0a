use libsql::params;
use tracing::instrument;

use fuzzctl_domain_models::wordlist::WordlistEntry;

use crate::client::StoreClient;
use crate::errors::StoreError;

/// Append-only name -> path registry consulted by task creation.
pub struct WordlistRepository {
    client: StoreClient,
}

impl WordlistRepository {
    pub fn new(client: StoreClient) -> Self {
        Self { client }
    }

    #[instrument(skip(self))]
    pub async fn register(&self, name: &str, path: &str) -> Result<(), StoreError> {
        let conn = self.client.get_connection()?;
        conn.execute(
            r#"
            INSERT INTO wordlists (name, path, registered_at) VALUES (?1, ?2, ?3)
            ON CONFLICT(name) DO UPDATE SET path = excluded.path
            "#,
            params![name, path, chrono::Utc::now().to_rfc3339()],
        )
        .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn resolve(&self, name: &str) -> Result<Option<String>, StoreError> {
        let conn = self.client.get_connection()?;
        let mut rows = conn
            .query("SELECT path FROM wordlists WHERE name = ?1", params![name])
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<WordlistEntry>, StoreError> {
        let conn = self.client.get_connection()?;
        let mut rows = conn
            .query("SELECT name, path, registered_at FROM wordlists ORDER BY name", ())
            .await?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            let registered_at: String = row.get(2)?;
            out.push(WordlistEntry {
                name: row.get(0)?,
                path: row.get(1)?,
                registered_at: chrono::DateTime::parse_from_rfc3339(&registered_at)
                    .map_err(|e| StoreError::Mapping(e.to_string()))?
                    .with_timezone(&chrono::Utc),
            });
        }
        Ok(out)
    }

    /// Seeds the registry with the default wordlists a fresh install ships
    /// with, mirroring what the original tool hardcoded at startup. A no-op
    /// for names that are already registered.
    #[instrument(skip(self))]
    pub async fn seed_defaults(&self) -> Result<(), StoreError> {
        const DEFAULTS: &[(&str, &str)] = &[
            ("common.txt", "/opt/wordlists/common.txt"),
            ("directory-list.txt", "/opt/wordlists/directory-list.txt"),
            ("api-wordlist.txt", "/opt/wordlists/api-wordlist.txt"),
            ("custom.txt", "/opt/wordlists/custom.txt"),
        ];
        for (name, path) in DEFAULTS {
            let conn = self.client.get_connection()?;
            conn.execute(
                "INSERT INTO wordlists (name, path, registered_at) VALUES (?1, ?2, ?3) ON CONFLICT(name) DO NOTHING",
                params![*name, *path, chrono::Utc::now().to_rfc3339()],
            )
            .await?;
        }
        Ok(())
    }
}
