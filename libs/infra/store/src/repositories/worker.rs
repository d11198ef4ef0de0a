use libsql::params;
use tracing::instrument;

use crate::client::StoreClient;
use crate::errors::StoreError;

/// Durable worker history, distinct from the broker's live liveness hashes.
/// Tracks first-registration and lifetime completed-task counts so they
/// survive a broker restart.
pub struct WorkerRepository {
    client: StoreClient,
}

#[derive(Debug, Clone)]
pub struct WorkerRow {
    pub worker_id: String,
    pub hostname: String,
    pub threads: u32,
    pub current_task: Option<String>,
    pub last_seen: Option<String>,
    pub tasks_completed: i64,
    pub registered_at: String,
}

impl WorkerRepository {
    pub fn new(client: StoreClient) -> Self {
        Self { client }
    }

    #[instrument(skip(self))]
    pub async fn upsert_heartbeat(
        &self,
        worker_id: &str,
        hostname: &str,
        threads: u32,
        current_task: Option<&str>,
    ) -> Result<(), StoreError> {
        let conn = self.client.get_connection()?;
        let now = chrono::Utc::now().to_rfc3339();
        conn.execute(
            r#"
            INSERT INTO workers (worker_id, hostname, threads, current_task, last_seen, tasks_completed, registered_at)
            VALUES (?1, ?2, ?3, ?4, ?5, 0, ?5)
            ON CONFLICT(worker_id) DO UPDATE SET
                hostname = excluded.hostname,
                threads = excluded.threads,
                current_task = excluded.current_task,
                last_seen = excluded.last_seen
            "#,
            params![worker_id, hostname, threads, current_task, now],
        )
        .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn increment_tasks_completed(&self, worker_id: &str) -> Result<(), StoreError> {
        let conn = self.client.get_connection()?;
        conn.execute(
            "UPDATE workers SET tasks_completed = tasks_completed + 1 WHERE worker_id = ?1",
            params![worker_id],
        )
        .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn get_all(&self) -> Result<Vec<WorkerRow>, StoreError> {
        let conn = self.client.get_connection()?;
        let mut rows = conn
            .query(
                "SELECT worker_id, hostname, threads, current_task, last_seen, tasks_completed, registered_at FROM workers",
                (),
            )
            .await?;

        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            out.push(WorkerRow {
                worker_id: row.get(0)?,
                hostname: row.get(1)?,
                threads: row.get(2)?,
                current_task: row.get(3)?,
                last_seen: row.get(4)?,
                tasks_completed: row.get(5)?,
                registered_at: row.get(6)?,
            });
        }
        Ok(out)
    }
}
