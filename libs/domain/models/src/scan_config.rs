use serde::{Deserialize, Serialize};

/// A named, reusable preset over the options a scan is created with.
/// Resolving a config to concrete `create_scan` arguments is the caller's job;
/// the Task Manager never reads this table implicitly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    pub config_id: String,
    pub name: String,
    pub target: String,
    pub wordlist: String,
    pub threads_per_worker: u32,
    pub rate_limit: Option<u32>,
    pub follow_redirects: bool,
    pub recursive: bool,
    pub extensions: Option<Vec<String>>,
    pub headers: Option<Vec<String>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
