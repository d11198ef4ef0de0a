use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::finding::Finding;

/// Read-only aggregate over the findings table, for the Public API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecuritySummary {
    pub severity_stats: HashMap<String, i64>,
    pub unchecked_count: i64,
    pub total_findings: i64,
    pub recent_critical: Vec<Finding>,
}
