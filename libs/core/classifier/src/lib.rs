//! Pure, deterministic translation of a raw fuzzer record into a [`Finding`].
//!
//! Nothing in this crate performs I/O; `classify` is a plain function of its
//! inputs so it can be exercised in tests without a broker or a store.

use fuzzctl_domain_models::finding::{Finding, Severity};
use fuzzctl_domain_models::message::FuzzerRecord;
use sha2::{Digest, Sha256};
use tracing::instrument;

/// Status codes that are dropped outright unless some other signal fired.
const DROP_STATUSES: [i64; 3] = [400, 404, 500];

/// (pattern alternatives, severity, label shown in the `Finding`'s issue text).
const URL_PATTERNS: &[(&[&str], Severity, &str)] = &[
    (
        &["password", "pwd", "pass", "key", "secret", "token"],
        Severity::High,
        "password|pwd|pass|key|secret|token",
    ),
    (
        &["backup", "dump", "archive", "old"],
        Severity::Medium,
        "backup|dump|archive|old",
    ),
    (
        &["admin", "login", "auth", "dashboard"],
        Severity::Medium,
        "admin|login|auth|dashboard",
    ),
    (
        &["config", "configuration", "setting"],
        Severity::High,
        "config|configuration|setting",
    ),
    (
        &[".git", ".env", ".bak", ".old"],
        Severity::Critical,
        r"\.git|\.env|\.bak|\.old",
    ),
    (
        &["phpinfo", "test", "debug"],
        Severity::Medium,
        "phpinfo|test|debug",
    ),
];

const SENSITIVE_EXTENSIONS: [&str; 6] = [".git", ".env", ".bak", ".old", ".tar", ".zip"];

/// Derives a stable `finding_id` from `(task_id, url)` so that re-delivering
/// the same result never produces a duplicate row. A digest is used here
/// instead of a language hash because those are not guaranteed stable across
/// process restarts.
pub fn finding_id(task_id: &str, url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(task_id.as_bytes());
    hasher.update(b":");
    hasher.update(url.as_bytes());
    let digest = hasher.finalize();
    format!("finding_{}", &hex::encode(digest)[..16])
}

fn pattern_issues(url: &str) -> Vec<(Severity, String)> {
    let lowered = url.to_lowercase();
    URL_PATTERNS
        .iter()
        .filter(|(needles, _, _)| needles.iter().any(|n| lowered.contains(n)))
        .map(|(_, severity, label)| {
            let prefix = severity.as_str().to_uppercase();
            (
                *severity,
                format!("{prefix}: Suspicious pattern in URL: {label}"),
            )
        })
        .collect()
}

fn extension_issue(url: &str) -> Option<(Severity, String)> {
    let lowered = url.to_lowercase();
    if SENSITIVE_EXTENSIONS.iter().any(|ext| lowered.ends_with(ext)) {
        Some((
            Severity::Critical,
            "CRITICAL: Sensitive file extension detected".to_string(),
        ))
    } else {
        None
    }
}

fn status_annotation(status: i64) -> Option<&'static str> {
    match status {
        200 => Some("Valid resource found"),
        301 | 302 => Some("Redirect found"),
        403 => Some("Access forbidden - possible privilege escalation"),
        500 => Some("Server error - possible vulnerability"),
        _ => None,
    }
}

fn length_annotation(length: i64) -> Option<&'static str> {
    if length == 0 {
        Some("Empty response")
    } else if length > 1_000_000 {
        Some("Large response - possible data exposure")
    } else if length < 100 {
        Some("Very small response - possible error page")
    } else {
        None
    }
}

/// Classifies one raw fuzzer record, returning `None` if it carries no
/// signal worth surfacing.
#[instrument(skip(record), fields(url = %record.url, status = record.status))]
pub fn classify(task_id: &str, record: &FuzzerRecord) -> Option<Finding> {
    let mut severities: Vec<Severity> = Vec::new();
    let mut issues: Vec<String> = Vec::new();

    for (severity, text) in pattern_issues(&record.url) {
        severities.push(severity);
        issues.push(text);
    }
    if let Some((severity, text)) = extension_issue(&record.url) {
        severities.push(severity);
        issues.push(text);
    }

    if DROP_STATUSES.contains(&record.status) && issues.is_empty() {
        return None;
    }

    if let Some(text) = status_annotation(record.status) {
        issues.push(text.to_string());
    }
    if let Some(text) = length_annotation(record.length) {
        issues.push(text.to_string());
    }

    let severity = if let Some(worst) = severities.iter().max().copied() {
        worst
    } else if !issues.is_empty() {
        Severity::Low
    } else if matches!(record.status, 200 | 301 | 302 | 403) {
        issues.push(format!("Interesting status code: {}", record.status));
        Severity::Info
    } else {
        return None;
    };

    Some(Finding {
        finding_id: finding_id(task_id, &record.url),
        task_id: task_id.to_string(),
        url: record.url.clone(),
        status_code: record.status,
        content_length: record.length,
        words: record.words,
        lines: record.lines,
        severity,
        detected_issues: issues,
        raw_response: None,
        checked: false,
        created_at: chrono::Utc::now(),
        target: None,
        wordlist_name: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(url: &str, status: i64, length: i64) -> FuzzerRecord {
        FuzzerRecord {
            url: url.to_string(),
            status,
            length,
            words: 1,
            lines: 1,
        }
    }

    #[test]
    fn s1_admin_path_is_medium() {
        let f = classify("task_1", &rec("https://t/admin", 200, 512)).unwrap();
        assert_eq!(f.severity, Severity::Medium);
        assert!(f
            .detected_issues
            .iter()
            .any(|i| i.contains("Suspicious pattern in URL")));
        assert!(f.detected_issues.iter().any(|i| i == "Valid resource found"));
    }

    #[test]
    fn s2_git_config_is_critical() {
        let f = classify("task_1", &rec("https://t/.git/config", 200, 2048)).unwrap();
        assert_eq!(f.severity, Severity::Critical);
    }

    #[test]
    fn s3_plain_404_is_dropped() {
        assert!(classify("task_1", &rec("https://t/about", 404, 0)).is_none());
    }

    #[test]
    fn s4_forbidden_small_body_is_low() {
        let f = classify("task_1", &rec("https://t/api/v1", 403, 50)).unwrap();
        assert_eq!(f.severity, Severity::Low);
        assert!(f
            .detected_issues
            .contains(&"Access forbidden - possible privilege escalation".to_string()));
        assert!(f
            .detected_issues
            .contains(&"Very small response - possible error page".to_string()));
    }

    #[test]
    fn s6_finding_id_is_stable_across_calls() {
        let a = finding_id("task_1", "https://t/admin");
        let b = finding_id("task_1", "https://t/admin");
        assert_eq!(a, b);
    }

    #[test]
    fn finding_id_differs_by_url() {
        assert_ne!(
            finding_id("task_1", "https://t/admin"),
            finding_id("task_1", "https://t/login")
        );
    }

    #[test]
    fn redirect_with_no_pattern_match_is_low() {
        let f = classify("task_1", &rec("https://t/somepage", 301, 500)).unwrap();
        assert_eq!(f.severity, Severity::Low);
        assert!(f.detected_issues.iter().any(|i| i == "Redirect found"));
    }

    #[test]
    fn uninteresting_status_with_no_signal_is_dropped() {
        assert!(classify("task_1", &rec("https://t/nope", 400, 10)).is_none());
    }
}
