use libsql::params;
use tracing::instrument;

use fuzzctl_domain_models::finding::{Finding, Severity};
use fuzzctl_domain_models::summary::SecuritySummary;

use crate::client::StoreClient;
use crate::errors::StoreError;

pub struct FindingRepository {
    client: StoreClient,
}

impl FindingRepository {
    pub fn new(client: StoreClient) -> Self {
        Self { client }
    }

    /// Upserts one finding; a conflict on `finding_id` is silently ignored so
    /// replaying the same result message never duplicates a row.
    #[instrument(skip(self, finding))]
    pub async fn save_finding(&self, finding: &Finding) -> Result<(), StoreError> {
        let conn = self.client.get_connection()?;
        let issues_json = serde_json::to_string(&finding.detected_issues)
            .map_err(|e| StoreError::Mapping(e.to_string()))?;

        conn.execute(
            r#"
            INSERT INTO findings (
                finding_id, task_id, url, status_code, content_length, words, lines,
                severity, detected_issues, raw_response, checked, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            ON CONFLICT(finding_id) DO NOTHING
            "#,
            params![
                finding.finding_id.clone(),
                finding.task_id.clone(),
                finding.url.clone(),
                finding.status_code,
                finding.content_length,
                finding.words,
                finding.lines,
                finding.severity.as_str(),
                issues_json,
                finding.raw_response.clone(),
                finding.checked as i64,
                finding.created_at.to_rfc3339(),
            ],
        )
        .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn count_for_task(&self, task_id: &str) -> Result<i64, StoreError> {
        let conn = self.client.get_connection()?;
        let mut rows = conn
            .query(
                "SELECT COUNT(*) FROM findings WHERE task_id = ?1",
                params![task_id],
            )
            .await?;
        let count = match rows.next().await? {
            Some(row) => row.get(0)?,
            None => 0,
        };
        Ok(count)
    }

    /// `task_id` and `checked` combine as an AND filter when both are given.
    #[instrument(skip(self))]
    pub async fn get_findings(
        &self,
        task_id: Option<&str>,
        checked: Option<bool>,
    ) -> Result<Vec<Finding>, StoreError> {
        let conn = self.client.get_connection()?;

        let mut sql = String::from(
            r#"
            SELECT f.finding_id, f.task_id, f.url, f.status_code, f.content_length, f.words,
                   f.lines, f.severity, f.detected_issues, f.raw_response, f.checked, f.created_at,
                   t.target, t.wordlist_name
            FROM findings f
            JOIN tasks t ON t.task_id = f.task_id
            WHERE 1 = 1
            "#,
        );
        let mut bound: Vec<libsql::Value> = Vec::new();
        if let Some(task_id) = task_id {
            bound.push(task_id.into());
            sql.push_str(&format!(" AND f.task_id = ?{}", bound.len()));
        }
        if let Some(checked) = checked {
            bound.push((checked as i64).into());
            sql.push_str(&format!(" AND f.checked = ?{}", bound.len()));
        }
        sql.push_str(" ORDER BY f.created_at DESC");

        let mut rows = conn.query(&sql, bound).await?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            out.push(map_row_to_finding(&row)?);
        }
        Ok(out)
    }

    #[instrument(skip(self))]
    pub async fn mark_finding_checked(&self, finding_id: &str, checked: bool) -> Result<(), StoreError> {
        let conn = self.client.get_connection()?;
        conn.execute(
            "UPDATE findings SET checked = ?1 WHERE finding_id = ?2",
            params![checked as i64, finding_id],
        )
        .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn security_summary(&self, recent_limit: i64) -> Result<SecuritySummary, StoreError> {
        let conn = self.client.get_connection()?;

        let mut severity_stats = std::collections::HashMap::new();
        let mut rows = conn
            .query("SELECT severity, COUNT(*) FROM findings GROUP BY severity", ())
            .await?;
        while let Some(row) = rows.next().await? {
            let severity: String = row.get(0)?;
            let count: i64 = row.get(1)?;
            severity_stats.insert(severity, count);
        }

        let mut rows = conn
            .query("SELECT COUNT(*) FROM findings WHERE checked = 0", ())
            .await?;
        let unchecked_count: i64 = match rows.next().await? {
            Some(row) => row.get(0)?,
            None => 0,
        };

        let mut rows = conn.query("SELECT COUNT(*) FROM findings", ()).await?;
        let total_findings: i64 = match rows.next().await? {
            Some(row) => row.get(0)?,
            None => 0,
        };

        let mut rows = conn
            .query(
                r#"
                SELECT f.finding_id, f.task_id, f.url, f.status_code, f.content_length, f.words,
                       f.lines, f.severity, f.detected_issues, f.raw_response, f.checked, f.created_at,
                       t.target, t.wordlist_name
                FROM findings f
                JOIN tasks t ON t.task_id = f.task_id
                WHERE f.severity = 'critical'
                ORDER BY f.created_at DESC
                LIMIT ?1
                "#,
                params![recent_limit],
            )
            .await?;
        let mut recent_critical = Vec::new();
        while let Some(row) = rows.next().await? {
            recent_critical.push(map_row_to_finding(&row)?);
        }

        Ok(SecuritySummary {
            severity_stats,
            unchecked_count,
            total_findings,
            recent_critical,
        })
    }
}

fn map_row_to_finding(row: &libsql::Row) -> Result<Finding, StoreError> {
    let issues_json: String = row.get(8)?;
    let created_at: String = row.get(11)?;
    let checked: i64 = row.get(10)?;

    Ok(Finding {
        finding_id: row.get(0)?,
        task_id: row.get(1)?,
        url: row.get(2)?,
        status_code: row.get(3)?,
        content_length: row.get(4)?,
        words: row.get(5)?,
        lines: row.get(6)?,
        severity: Severity::from_str(&row.get::<String>(7)?),
        detected_issues: serde_json::from_str(&issues_json)
            .map_err(|e| StoreError::Mapping(e.to_string()))?,
        raw_response: row.get(9)?,
        checked: checked != 0,
        created_at: chrono::DateTime::parse_from_rfc3339(&created_at)
            .map_err(|e| StoreError::Mapping(e.to_string()))?
            .with_timezone(&chrono::Utc),
        target: row.get(12)?,
        wordlist_name: row.get(13)?,
    })
}
