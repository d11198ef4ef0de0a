use libsql::params;
use tracing::instrument;

use fuzzctl_domain_models::task::{Task, TaskOptions, TaskStatus};

use crate::client::StoreClient;
use crate::errors::StoreError;

pub struct TaskRepository {
    client: StoreClient,
}

impl TaskRepository {
    pub fn new(client: StoreClient) -> Self {
        Self { client }
    }

    #[instrument(skip(self, task))]
    pub async fn save_task(&self, task: &Task) -> Result<(), StoreError> {
        let conn = self.client.get_connection()?;
        let options_json = serde_json::to_string(&task.options)
            .map_err(|e| StoreError::Mapping(e.to_string()))?;
        let worker_ids_json = serde_json::to_string(&task.worker_ids)
            .map_err(|e| StoreError::Mapping(e.to_string()))?;

        let affected = conn
            .execute(
                r#"
                INSERT INTO tasks (
                    task_id, target, wordlist_name, wordlist_path, options,
                    worker_ids, status, progress, findings_count, created_at, completed_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                ON CONFLICT(task_id) DO NOTHING
            "#,
                params![
                    task.task_id.clone(),
                    task.target.clone(),
                    task.wordlist_name.clone(),
                    task.wordlist_path.clone(),
                    options_json,
                    worker_ids_json,
                    task.status.as_str(),
                    task.progress,
                    task.findings_count,
                    task.created_at.to_rfc3339(),
                    task.completed_at.map(|t| t.to_rfc3339()),
                ],
            )
            .await?;

        if affected == 0 {
            return Err(StoreError::DuplicateId);
        }
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn update_task_progress(&self, task_id: &str, progress: f64) -> Result<(), StoreError> {
        let clamped = progress.clamp(0.0, 100.0);
        let conn = self.client.get_connection()?;
        conn.execute(
            "UPDATE tasks SET progress = ?1, status = CASE WHEN status = 'pending' THEN 'in_progress' ELSE status END WHERE task_id = ?2",
            params![clamped, task_id],
        )
        .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn complete_task(&self, task_id: &str, findings_count: i64) -> Result<(), StoreError> {
        let conn = self.client.get_connection()?;
        conn.execute(
            r#"
            UPDATE tasks
            SET status = 'completed', progress = 100.0, findings_count = ?1,
                completed_at = ?2
            WHERE task_id = ?3
            "#,
            params![findings_count, chrono::Utc::now().to_rfc3339(), task_id],
        )
        .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn get_tasks(&self, limit: i64) -> Result<Vec<Task>, StoreError> {
        let conn = self.client.get_connection()?;
        let mut rows = conn
            .query(
                r#"
                SELECT task_id, target, wordlist_name, wordlist_path, options, worker_ids,
                       status, progress, findings_count, created_at, completed_at
                FROM tasks ORDER BY created_at DESC LIMIT ?1
                "#,
                params![limit],
            )
            .await?;

        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            out.push(map_row_to_task(&row)?);
        }
        Ok(out)
    }

    #[instrument(skip(self))]
    pub async fn get_task(&self, task_id: &str) -> Result<Option<Task>, StoreError> {
        let conn = self.client.get_connection()?;
        let mut rows = conn
            .query(
                r#"
                SELECT task_id, target, wordlist_name, wordlist_path, options, worker_ids,
                       status, progress, findings_count, created_at, completed_at
                FROM tasks WHERE task_id = ?1
                "#,
                params![task_id],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(map_row_to_task(&row)?)),
            None => Ok(None),
        }
    }
}

fn map_row_to_task(row: &libsql::Row) -> Result<Task, StoreError> {
    let options_json: String = row.get(4)?;
    let worker_ids_json: String = row.get(5)?;
    let created_at: String = row.get(9)?;
    let completed_at: Option<String> = row.get(10)?;

    Ok(Task {
        task_id: row.get(0)?,
        target: row.get(1)?,
        wordlist_name: row.get(2)?,
        wordlist_path: row.get(3)?,
        options: serde_json::from_str::<TaskOptions>(&options_json)
            .map_err(|e| StoreError::Mapping(e.to_string()))?,
        worker_ids: serde_json::from_str::<Vec<String>>(&worker_ids_json)
            .map_err(|e| StoreError::Mapping(e.to_string()))?,
        status: TaskStatus::from_str(&row.get::<String>(6)?),
        progress: row.get(7)?,
        findings_count: row.get(8)?,
        created_at: chrono::DateTime::parse_from_rfc3339(&created_at)
            .map_err(|e| StoreError::Mapping(e.to_string()))?
            .with_timezone(&chrono::Utc),
        completed_at: completed_at
            .map(|s| {
                chrono::DateTime::parse_from_rfc3339(&s)
                    .map(|d| d.with_timezone(&chrono::Utc))
                    .map_err(|e| StoreError::Mapping(e.to_string()))
            })
            .transpose()?,
    })
}
