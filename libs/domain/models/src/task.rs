use serde::{Deserialize, Serialize};

/// Lifecycle state of a distributed scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "pending" => TaskStatus::Pending,
            "completed" => TaskStatus::Completed,
            "failed" => TaskStatus::Failed,
            _ => TaskStatus::InProgress,
        }
    }
}

/// The recognized option-bag keys from the fuzzer invocation contract.
/// Unrecognized keys round-trip through `extra` rather than being rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskOptions {
    pub method: Option<String>,
    #[serde(default)]
    pub headers: Vec<String>,
    pub data: Option<String>,
    pub cookies: Option<String>,
    pub threads: Option<u32>,
    pub rate: Option<u32>,
    pub timeout: Option<u64>,
    pub recursive: Option<bool>,
    pub follow_redirects: Option<bool>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl TaskOptions {
    pub fn timeout_or_default(&self) -> u64 {
        self.timeout.unwrap_or(7200)
    }

    pub fn threads_or_default(&self) -> u32 {
        self.threads.unwrap_or(10)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub task_id: String,
    pub target: String,
    pub wordlist_name: String,
    pub wordlist_path: String,
    pub options: TaskOptions,
    pub worker_ids: Vec<String>,
    pub status: TaskStatus,
    pub progress: f64,
    pub findings_count: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl Task {
    pub fn new(
        task_id: String,
        target: String,
        wordlist_name: String,
        wordlist_path: String,
        options: TaskOptions,
        worker_ids: Vec<String>,
    ) -> Self {
        Self {
            task_id,
            target,
            wordlist_name,
            wordlist_path,
            options,
            worker_ids,
            status: TaskStatus::Pending,
            progress: 0.0,
            findings_count: 0,
            created_at: chrono::Utc::now(),
            completed_at: None,
        }
    }
}
