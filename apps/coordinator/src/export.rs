use fuzzctl_domain_models::finding::Finding;

pub fn to_json(findings: &[Finding]) -> anyhow::Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(findings)?)
}

pub fn to_csv(findings: &[Finding]) -> anyhow::Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "URL",
        "Status Code",
        "Content Length",
        "Severity",
        "Detected Issues",
        "Checked",
        "Created At",
    ])?;
    for finding in findings {
        writer.write_record([
            finding.url.clone(),
            finding.status_code.to_string(),
            finding.content_length.to_string(),
            finding.severity.as_str().to_string(),
            finding.detected_issues.join("; "),
            if finding.checked { "Yes".to_string() } else { "No".to_string() },
            finding.created_at.to_rfc3339(),
        ])?;
    }
    Ok(writer.into_inner()?)
}

pub fn to_html(findings: &[Finding]) -> anyhow::Result<Vec<u8>> {
    let mut html = String::from(
        r#"<!DOCTYPE html><html><head><meta charset="utf-8"><style>
table { border-collapse: collapse; width: 100%; }
td, th { border: 1px solid #ccc; padding: 4px 8px; text-align: left; }
.critical { background: #ffcccc; }
.high { background: #ffe0b3; }
.medium { background: #fff6b3; }
.low { background: #e0f0ff; }
.info { background: #f2f2f2; }
</style></head><body><table>
<tr><th>Target</th><th>Wordlist</th><th>URL</th><th>Status Code</th><th>Content Length</th><th>Severity</th><th>Detected Issues</th><th>Checked</th><th>Created At</th></tr>
"#,
    );

    for finding in findings {
        html.push_str(&format!(
            "<tr class=\"{}\"><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            finding.severity.as_str(),
            escape(finding.target.as_deref().unwrap_or("")),
            escape(finding.wordlist_name.as_deref().unwrap_or("")),
            escape(&finding.url),
            finding.status_code,
            finding.content_length,
            finding.severity.as_str(),
            escape(&finding.detected_issues.join("; ")),
            if finding.checked { "Yes" } else { "No" },
            finding.created_at.to_rfc3339(),
        ));
    }

    html.push_str("</table></body></html>");
    Ok(html.into_bytes())
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use fuzzctl_domain_models::finding::Severity;

    fn sample_finding() -> Finding {
        Finding {
            finding_id: "f1".to_string(),
            task_id: "task_1".to_string(),
            url: "https://t/<admin>".to_string(),
            status_code: 200,
            content_length: 1024,
            words: 10,
            lines: 2,
            severity: Severity::Critical,
            detected_issues: vec!["exposed config".to_string()],
            raw_response: None,
            checked: false,
            created_at: chrono::Utc::now(),
            target: Some("https://t/FUZZ".to_string()),
            wordlist_name: Some("common.txt".to_string()),
        }
    }

    #[test]
    fn json_export_round_trips_through_serde() {
        let bytes = to_json(&[sample_finding()]).unwrap();
        let parsed: Vec<Finding> = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].finding_id, "f1");
    }

    #[test]
    fn csv_export_includes_header_and_one_row_per_finding() {
        let bytes = to_csv(&[sample_finding(), sample_finding()]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("URL,Status Code"));
        assert!(lines[1].contains("critical"));
    }

    #[test]
    fn html_export_escapes_finding_urls() {
        let bytes = to_html(&[sample_finding()]).unwrap();
        let html = String::from_utf8(bytes).unwrap();
        assert!(html.contains("&lt;admin&gt;"));
        assert!(!html.contains("<admin>"));
    }
}
