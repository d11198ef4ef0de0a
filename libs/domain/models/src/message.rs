use serde::{Deserialize, Serialize};

use crate::task::TaskOptions;

/// Wire payload pushed to a worker's `tasks:<worker_id>` queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskMessage {
    pub task_id: String,
    pub target: String,
    pub wordlist_name: String,
    pub wordlist_path: String,
    pub options: TaskOptions,
    pub worker_ids: Vec<String>,
    pub worker_id: String,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControlCommand {
    UpdateThreads { threads: u32, timestamp: i64 },
    Pause { timestamp: i64 },
    Resume { timestamp: i64 },
    Shutdown { timestamp: i64 },
}

/// A single URL/status/length record as emitted by the fuzzer binary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FuzzerRecord {
    pub url: String,
    pub status: i64,
    pub length: i64,
    pub words: i64,
    pub lines: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultStatus {
    Completed,
    Failed,
}

/// Wire payload pushed by a worker onto the shared `results` queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultMessage {
    pub task_id: String,
    pub worker_id: String,
    pub status: ResultStatus,
    #[serde(default)]
    pub results: Vec<FuzzerRecord>,
    pub error: Option<String>,
    pub timestamp: i64,
}
