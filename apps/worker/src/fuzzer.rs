use std::process::Stdio;
use std::time::Duration;

use serde::Deserialize;
use tokio::process::Command;
use tracing::{instrument, warn};

use fuzzctl_domain_models::message::FuzzerRecord;
use fuzzctl_domain_models::task::TaskOptions;

use crate::errors::WorkerError;

#[derive(Debug, Deserialize)]
struct FuzzerOutput {
    #[serde(default)]
    results: Vec<FuzzerRecord>,
}

/// Translates the recognized option-bag keys into the external fuzzer's CLI
/// flags. Kept separate from process spawning so the mapping can be tested
/// without an actual binary on disk.
fn build_args(target: &str, wordlist_path: &str, options: &TaskOptions) -> Vec<String> {
    let mut args = vec![
        "-u".to_string(),
        target.to_string(),
        "-w".to_string(),
        wordlist_path.to_string(),
        "-o".to_string(),
        "-".to_string(),
        "-of".to_string(),
        "json".to_string(),
        "-t".to_string(),
        options.threads_or_default().to_string(),
    ];

    if let Some(method) = &options.method {
        args.push("-X".to_string());
        args.push(method.clone());
    }
    for header in &options.headers {
        args.push("-H".to_string());
        args.push(header.clone());
    }
    if let Some(data) = &options.data {
        args.push("-d".to_string());
        args.push(data.clone());
    }
    if let Some(cookies) = &options.cookies {
        args.push("-b".to_string());
        args.push(cookies.clone());
    }
    if let Some(rate) = options.rate {
        args.push("-rate".to_string());
        args.push(rate.to_string());
    }

    args
}

/// Invokes the external fuzzer binary against `target` with `wordlist_path`,
/// translating the recognized option-bag keys into CLI flags, and parses its
/// JSON stdout. A non-zero exit, a timeout, or unparseable output all surface
/// as `Err` so the caller can report a `failed` result rather than silently
/// treating it as success.
#[instrument(skip(options), fields(target))]
pub async fn run_fuzzer(
    binary: &str,
    target: &str,
    wordlist_path: &str,
    options: &TaskOptions,
) -> Result<Vec<FuzzerRecord>, WorkerError> {
    let timeout_secs = options.timeout_or_default();

    let mut command = Command::new(binary);
    command
        .args(build_args(target, wordlist_path, options))
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let child = command
        .spawn()
        .map_err(|e| WorkerError::FuzzerFailure(format!("failed to spawn {binary}: {e}")))?;

    let output = tokio::time::timeout(Duration::from_secs(timeout_secs), child.wait_with_output())
        .await
        .map_err(|_| WorkerError::FuzzerTimeout(timeout_secs))?
        .map_err(|e| WorkerError::FuzzerFailure(format!("process error: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(WorkerError::FuzzerFailure(format!(
            "exit status {:?}: {stderr}",
            output.status.code()
        )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let parsed: FuzzerOutput = serde_json::from_str(&stdout).map_err(|e| {
        warn!(%e, "failed to parse fuzzer output");
        WorkerError::FuzzerFailure(format!("failed to parse fuzzer output: {e}"))
    })?;

    Ok(parsed.results)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_only_emit_the_required_flags() {
        let args = build_args("https://t/FUZZ", "common.txt", &TaskOptions::default());
        assert_eq!(
            args,
            vec![
                "-u", "https://t/FUZZ", "-w", "common.txt", "-o", "-", "-of", "json", "-t", "10",
            ]
        );
    }

    #[test]
    fn optional_fields_each_add_their_own_flag() {
        let options = TaskOptions {
            method: Some("POST".to_string()),
            headers: vec!["X-Foo: bar".to_string(), "X-Baz: qux".to_string()],
            data: Some("a=1".to_string()),
            cookies: Some("session=abc".to_string()),
            rate: Some(50),
            ..TaskOptions::default()
        };
        let args = build_args("https://t/FUZZ", "common.txt", &options);

        assert!(args.windows(2).any(|w| w == ["-X", "POST"]));
        assert_eq!(args.iter().filter(|a| a.as_str() == "-H").count(), 2);
        assert!(args.windows(2).any(|w| w == ["-H", "X-Foo: bar"]));
        assert!(args.windows(2).any(|w| w == ["-d", "a=1"]));
        assert!(args.windows(2).any(|w| w == ["-b", "session=abc"]));
        assert!(args.windows(2).any(|w| w == ["-rate", "50"]));
    }

    #[test]
    fn absent_optional_fields_omit_their_flags() {
        let args = build_args("https://t/FUZZ", "common.txt", &TaskOptions::default());
        for flag in ["-X", "-H", "-d", "-b", "-rate"] {
            assert!(!args.iter().any(|a| a == flag));
        }
    }
}
