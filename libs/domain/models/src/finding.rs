use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "critical" => Severity::Critical,
            "high" => Severity::High,
            "medium" => Severity::Medium,
            "low" => Severity::Low,
            _ => Severity::Info,
        }
    }
}

/// A classified observation derived from one raw fuzzer record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    pub finding_id: String,
    pub task_id: String,
    pub url: String,
    pub status_code: i64,
    pub content_length: i64,
    pub words: i64,
    pub lines: i64,
    pub severity: Severity,
    pub detected_issues: Vec<String>,
    pub raw_response: Option<String>,
    pub checked: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    /// Present only on findings returned from a joined read (e.g. `list_findings`).
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub wordlist_name: Option<String>,
}
