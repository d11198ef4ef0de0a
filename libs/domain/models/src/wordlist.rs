use serde::{Deserialize, Serialize};

/// One entry in the append-only wordlist name -> path registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordlistEntry {
    pub name: String,
    pub path: String,
    pub registered_at: chrono::DateTime<chrono::Utc>,
}
