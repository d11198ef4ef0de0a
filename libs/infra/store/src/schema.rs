use libsql::Connection;
use tracing::{debug, info, instrument, warn};

use crate::errors::StoreError;

const TABLES: &[(&str, &str)] = &[
    (
        "TABLE_TASKS",
        r#"
        CREATE TABLE IF NOT EXISTS tasks (
            task_id TEXT PRIMARY KEY,
            target TEXT NOT NULL,
            wordlist_name TEXT NOT NULL,
            wordlist_path TEXT NOT NULL,
            options TEXT NOT NULL,
            worker_ids TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'pending',
            progress REAL NOT NULL DEFAULT 0,
            findings_count INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            completed_at TEXT
        );
    "#,
    ),
    (
        "TABLE_FINDINGS",
        r#"
        CREATE TABLE IF NOT EXISTS findings (
            finding_id TEXT PRIMARY KEY,
            task_id TEXT NOT NULL,
            url TEXT NOT NULL,
            status_code INTEGER NOT NULL,
            content_length INTEGER NOT NULL,
            words INTEGER NOT NULL,
            lines INTEGER NOT NULL,
            severity TEXT NOT NULL,
            detected_issues TEXT NOT NULL,
            raw_response TEXT,
            checked INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        );
    "#,
    ),
    (
        "TABLE_WORKERS",
        r#"
        CREATE TABLE IF NOT EXISTS workers (
            worker_id TEXT PRIMARY KEY,
            hostname TEXT NOT NULL,
            threads INTEGER NOT NULL DEFAULT 10,
            current_task TEXT,
            last_seen TEXT,
            tasks_completed INTEGER NOT NULL DEFAULT 0,
            registered_at TEXT NOT NULL
        );
    "#,
    ),
    (
        "TABLE_SCAN_CONFIGS",
        r#"
        CREATE TABLE IF NOT EXISTS scan_configs (
            config_id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            target TEXT NOT NULL,
            wordlist TEXT NOT NULL,
            threads_per_worker INTEGER NOT NULL DEFAULT 10,
            rate_limit INTEGER,
            follow_redirects INTEGER NOT NULL DEFAULT 1,
            recursive INTEGER NOT NULL DEFAULT 0,
            extensions TEXT,
            headers TEXT,
            created_at TEXT NOT NULL
        );
    "#,
    ),
    (
        "TABLE_WORDLISTS",
        r#"
        CREATE TABLE IF NOT EXISTS wordlists (
            name TEXT PRIMARY KEY,
            path TEXT NOT NULL,
            registered_at TEXT NOT NULL
        );
    "#,
    ),
];

const INDEXES: &[(&str, &str)] = &[
    (
        "IDX_FINDINGS_TASK",
        "CREATE INDEX IF NOT EXISTS idx_findings_task ON findings(task_id);",
    ),
    (
        "IDX_FINDINGS_SEVERITY",
        "CREATE INDEX IF NOT EXISTS idx_findings_severity ON findings(severity);",
    ),
];

/// ALTER TABLE statements for columns added after the initial table
/// definitions shipped. Tolerant of "duplicate column name" so re-running
/// against an already-migrated database is a no-op.
const EVOLUTIONS: &[(&str, &str)] = &[];

#[instrument(skip(conn))]
pub async fn apply_schema(conn: &Connection) -> Result<(), StoreError> {
    for (name, sql) in TABLES {
        debug!("creating table: {name}");
        conn.execute(sql, ()).await?;
    }
    for (name, sql) in EVOLUTIONS {
        match conn.execute(sql, ()).await {
            Ok(_) => info!("applied evolution {name}"),
            Err(e) if e.to_string().contains("duplicate column name") => {
                debug!("evolution {name} already applied");
            }
            Err(e) => warn!("evolution {name} failed: {e}"),
        }
    }
    for (name, sql) in INDEXES {
        debug!("creating index: {name}");
        conn.execute(sql, ()).await?;
    }
    Ok(())
}
