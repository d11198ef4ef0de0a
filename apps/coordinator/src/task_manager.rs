use chrono::Utc;
use tracing::{info, instrument, warn};

use fuzzctl_core_classifier::classify;
use fuzzctl_domain_models::message::{ResultMessage, ResultStatus, TaskMessage};
use fuzzctl_domain_models::task::{Task, TaskOptions};
use fuzzctl_infra_broker::keyspace::{task_queue, RESULTS_QUEUE};
use fuzzctl_infra_broker::{Broker, BrokerError};

use crate::errors::CoordinatorError;
use crate::state::{ActiveTask, AppState};
use crate::worker_registry;

/// Creates a task, persists it as `pending`, and fans one task message out to
/// every worker in `worker_ids` (a worker listed twice receives two messages
/// and is expected to reply twice).
#[instrument(skip(state, options))]
pub async fn create_task<B: Broker>(
    state: &AppState<B>,
    target: String,
    wordlist_name: String,
    wordlist_path: String,
    worker_ids: Vec<String>,
    options: TaskOptions,
) -> Result<String, CoordinatorError> {
    let task_id = format!("task_{}", &uuid::Uuid::new_v4().simple().to_string()[..8]);

    let task = Task::new(
        task_id.clone(),
        target.clone(),
        wordlist_name.clone(),
        wordlist_path.clone(),
        options.clone(),
        worker_ids.clone(),
    );
    state.store.tasks.save_task(&task).await?;

    let created_at = Utc::now().timestamp();
    for worker_id in &worker_ids {
        let message = TaskMessage {
            task_id: task_id.clone(),
            target: target.clone(),
            wordlist_name: wordlist_name.clone(),
            wordlist_path: wordlist_path.clone(),
            options: options.clone(),
            worker_ids: worker_ids.clone(),
            worker_id: worker_id.clone(),
            created_at,
        };
        state.broker.push(&task_queue(worker_id), &message).await?;
    }

    let mut active = state.active_tasks.lock().await;
    active.insert(
        task_id.clone(),
        ActiveTask {
            results_received: 0,
            total_workers: worker_ids.len(),
        },
    );

    info!(task_id, workers = worker_ids.len(), "task created and dispatched");
    Ok(task_id)
}

/// Public-API convenience wrapper: resolves `wordlist_name` and validates
/// that the requested workers exist and are active before creating the task.
#[instrument(skip(state, options))]
pub async fn create_scan<B: Broker>(
    state: &AppState<B>,
    target: String,
    wordlist_name: String,
    worker_ids: Vec<String>,
    options: TaskOptions,
) -> Result<String, CoordinatorError> {
    if worker_ids.is_empty() {
        return Err(CoordinatorError::NoActiveWorkers);
    }

    let wordlist_path = state
        .store
        .wordlists
        .resolve(&wordlist_name)
        .await?
        .ok_or_else(|| CoordinatorError::UnknownWordlist(wordlist_name.clone()))?;

    let mut any_active = false;
    for worker_id in &worker_ids {
        if worker_registry::is_active(state, worker_id).await? {
            any_active = true;
            break;
        }
    }
    if !any_active {
        return Err(CoordinatorError::NoActiveWorkers);
    }

    create_task(state, target, wordlist_name, wordlist_path, worker_ids, options).await
}

/// Extracts just enough of a result payload to advance fan-in accounting when
/// the rest of the message fails to decode.
fn extract_task_and_worker_id(raw: &str) -> Option<(String, String)> {
    let value: serde_json::Value = serde_json::from_str(raw).ok()?;
    let task_id = value.get("task_id")?.as_str()?.to_string();
    let worker_id = value.get("worker_id")?.as_str()?.to_string();
    Some((task_id, worker_id))
}

/// Blocks on the shared `results` queue and processes one result at a time.
/// Runs for the lifetime of the process; the caller spawns it as a
/// background task.
pub async fn run_result_loop<B: Broker>(state: AppState<B>) {
    loop {
        match state.broker.blocking_pop_raw(RESULTS_QUEUE, 1.0).await {
            Ok(Some(body)) => match serde_json::from_str::<ResultMessage>(&body) {
                Ok(message) => {
                    if let Err(err) = process_result(&state, message).await {
                        warn!(%err, "failed to process result message");
                    }
                }
                Err(err) => {
                    warn!(%err, "dropping malformed result message");
                    if let Some((task_id, worker_id)) = extract_task_and_worker_id(&body) {
                        if let Err(err) = advance_progress(&state, &task_id, &worker_id).await {
                            warn!(%err, "failed to advance progress for malformed result");
                        }
                    }
                }
            },
            Ok(None) => {}
            Err(err @ BrokerError::Unavailable(_)) => {
                warn!(%err, "broker unavailable in result loop, retrying in 5s");
                tokio::time::sleep(std::time::Duration::from_secs(5)).await;
            }
            Err(BrokerError::Malformed(err)) => {
                warn!(%err, "unexpected decode error popping raw result payload");
            }
        }
    }
}

#[instrument(skip(state, message), fields(task_id = %message.task_id, worker_id = %message.worker_id))]
pub async fn process_result<B: Broker>(
    state: &AppState<B>,
    message: ResultMessage,
) -> Result<(), CoordinatorError> {
    match message.status {
        ResultStatus::Completed => {
            for record in &message.results {
                if let Some(finding) = classify(&message.task_id, record) {
                    state.store.findings.save_finding(&finding).await?;
                }
            }
            advance_progress(state, &message.task_id, &message.worker_id).await?;
        }
        ResultStatus::Failed => {
            warn!(
                task_id = %message.task_id,
                worker_id = %message.worker_id,
                error = ?message.error,
                "worker reported failure"
            );
            // A failed worker does not count toward the fan-in: the task is
            // left `in_progress` until its remaining workers report.
        }
    }
    Ok(())
}

/// Progress as a percentage of workers reported so far, and whether every
/// assigned worker has now reported. `total_workers` is the multiset size
/// from task creation (a worker listed twice counts twice).
fn progress_after_report(results_received: usize, total_workers: usize) -> (f64, bool) {
    let progress = 100.0 * results_received as f64 / total_workers as f64;
    let finished = results_received >= total_workers;
    (progress, finished)
}

/// Advances one worker's fan-in count for a task and completes it once every
/// assigned worker has reported. Public so both the decoded-result path and
/// the malformed-result path (which only recovers `task_id`/`worker_id`) can
/// drive the same accounting, and so it can be exercised directly in tests.
pub async fn advance_progress<B: Broker>(
    state: &AppState<B>,
    task_id: &str,
    worker_id: &str,
) -> Result<(), CoordinatorError> {
    let done = {
        let mut active = state.active_tasks.lock().await;
        match active.get_mut(task_id) {
            Some(entry) => {
                entry.results_received += 1;
                progress_after_report(entry.results_received, entry.total_workers)
            }
            None => {
                warn!(task_id, worker_id, "result for unknown or already-closed task");
                return Ok(());
            }
        }
    };

    state.store.tasks.update_task_progress(task_id, done.0).await?;
    state.store.workers.increment_tasks_completed(worker_id).await?;

    if done.1 {
        let total_findings = state.store.findings.count_for_task(task_id).await?;
        state.store.tasks.complete_task(task_id, total_findings).await?;
        state.active_tasks.lock().await.remove(task_id);
        info!(task_id, total_findings, "task completed");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s1_progress_reaches_fifty_then_one_hundred_across_two_workers() {
        let (p1, done1) = progress_after_report(1, 2);
        assert_eq!(p1, 50.0);
        assert!(!done1);

        let (p2, done2) = progress_after_report(2, 2);
        assert_eq!(p2, 100.0);
        assert!(done2);
    }

    #[test]
    fn progress_never_exceeds_one_hundred_for_well_formed_input() {
        let (progress, _) = progress_after_report(3, 3);
        assert_eq!(progress, 100.0);
    }

    #[test]
    fn completion_invariant_triggers_only_when_all_workers_reported() {
        assert!(!progress_after_report(2, 3).1);
        assert!(progress_after_report(3, 3).1);
    }

    #[test]
    fn extract_task_and_worker_id_tolerates_missing_optional_fields() {
        let raw = r#"{"task_id":"t1","worker_id":"w1","status":"not_a_valid_enum_variant"}"#;
        assert_eq!(
            extract_task_and_worker_id(raw),
            Some(("t1".to_string(), "w1".to_string()))
        );
    }

    #[test]
    fn extract_task_and_worker_id_returns_none_for_unparseable_json() {
        assert_eq!(extract_task_and_worker_id("not json at all"), None);
    }
}
