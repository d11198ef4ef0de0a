use serde::{Deserialize, Serialize};

/// Heartbeat payload a worker writes to the broker's health hash every 30s.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerHeartbeat {
    pub worker_id: String,
    pub status: String,
    pub timestamp: i64,
    pub current_threads: u32,
    pub processor_status: String,
}

/// Static descriptor a worker writes to `workers:active` on registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerDescriptor {
    pub worker_id: String,
    pub hostname: String,
    pub threads: u32,
    pub registered_at: i64,
}

/// The joined active/offline view the Worker Registry exposes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerView {
    pub worker_id: String,
    pub hostname: String,
    pub status: String,
    pub threads: u32,
    pub current_task: Option<String>,
    pub last_seen: Option<i64>,
    pub tasks_completed: i64,
    pub registered_at: Option<i64>,
}
