use chrono::Utc;
use tracing::instrument;

use fuzzctl_domain_models::message::ControlCommand;
use fuzzctl_domain_models::worker::{WorkerDescriptor, WorkerHeartbeat, WorkerView};
use fuzzctl_infra_broker::keyspace::{control_queue, WORKERS_ACTIVE_HASH, WORKERS_HEALTH_HASH};
use fuzzctl_infra_broker::Broker;

use crate::errors::CoordinatorError;
use crate::state::AppState;

/// A health hash entry older than this is considered stale (3x the worker's
/// 30-second heartbeat interval).
const STALENESS_THRESHOLD_SECS: i64 = 90;

fn is_fresh(now: i64, last_seen: i64) -> bool {
    now - last_seen < STALENESS_THRESHOLD_SECS
}

fn validate_thread_count(threads: u32) -> Result<(), CoordinatorError> {
    if !(1..=100).contains(&threads) {
        return Err(CoordinatorError::InvalidInput(format!(
            "threads must be between 1 and 100, got {threads}"
        )));
    }
    Ok(())
}

#[instrument(skip(state))]
pub async fn list_workers(state: &AppState) -> Result<Vec<WorkerView>, CoordinatorError> {
    let active: std::collections::HashMap<String, WorkerDescriptor> =
        state.broker.hash_get_all(WORKERS_ACTIVE_HASH).await?;
    let health: std::collections::HashMap<String, WorkerHeartbeat> =
        state.broker.hash_get_all(WORKERS_HEALTH_HASH).await?;
    let history = state.store.workers.get_all().await?;
    let history_by_id: std::collections::HashMap<_, _> =
        history.into_iter().map(|r| (r.worker_id.clone(), r)).collect();

    let now = Utc::now().timestamp();

    let mut views = Vec::new();
    for (worker_id, descriptor) in &active {
        let beat = health.get(worker_id);
        let fresh = beat.map(|b| is_fresh(now, b.timestamp)).unwrap_or(false);
        let history = history_by_id.get(worker_id);

        views.push(WorkerView {
            worker_id: worker_id.clone(),
            hostname: descriptor.hostname.clone(),
            status: if fresh { "active".to_string() } else { "offline".to_string() },
            threads: beat.map(|b| b.current_threads).unwrap_or(descriptor.threads),
            current_task: beat.and_then(|b| b.processor_status.strip_prefix("running:").map(String::from)),
            last_seen: beat.map(|b| b.timestamp),
            tasks_completed: history.map(|h| h.tasks_completed).unwrap_or(0),
            registered_at: Some(descriptor.registered_at),
        });
    }

    Ok(views)
}

/// Periodically reflects the broker's live registration/health hashes into
/// the Store's `workers` table so worker history survives a broker restart.
/// The broker hashes remain the sole source of truth for liveness; this loop
/// only keeps the durable record in sync.
pub async fn run_sync_loop(state: AppState) {
    loop {
        if let Err(err) = sync_once(&state).await {
            tracing::warn!(%err, "worker registry sync failed");
        }
        tokio::time::sleep(std::time::Duration::from_secs(30)).await;
    }
}

async fn sync_once(state: &AppState) -> Result<(), CoordinatorError> {
    let active: std::collections::HashMap<String, WorkerDescriptor> =
        state.broker.hash_get_all(WORKERS_ACTIVE_HASH).await?;
    let health: std::collections::HashMap<String, WorkerHeartbeat> =
        state.broker.hash_get_all(WORKERS_HEALTH_HASH).await?;

    for (worker_id, descriptor) in &active {
        let threads = health.get(worker_id).map(|b| b.current_threads).unwrap_or(descriptor.threads);
        let current_task = health.get(worker_id).and_then(|b| b.processor_status.strip_prefix("running:"));
        state
            .store
            .workers
            .upsert_heartbeat(worker_id, &descriptor.hostname, threads, current_task)
            .await?;
    }
    Ok(())
}

#[instrument(skip(state))]
pub async fn is_active(state: &AppState, worker_id: &str) -> Result<bool, CoordinatorError> {
    let workers = list_workers(state).await?;
    Ok(workers
        .iter()
        .any(|w| w.worker_id == worker_id && w.status == "active"))
}

/// Validates the requested thread count and pushes an `update_threads`
/// control message; the coordinator never waits for acknowledgment.
#[instrument(skip(state))]
pub async fn adjust_worker(
    state: &AppState,
    worker_id: &str,
    threads: u32,
) -> Result<(), CoordinatorError> {
    validate_thread_count(threads)?;

    let command = ControlCommand::UpdateThreads {
        threads,
        timestamp: Utc::now().timestamp(),
    };
    state.broker.push(&control_queue(worker_id), &command).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s5_out_of_range_threads_rejected() {
        let err = validate_thread_count(150).unwrap_err();
        assert!(matches!(err, CoordinatorError::InvalidInput(_)));
        assert!(validate_thread_count(1).is_ok());
        assert!(validate_thread_count(100).is_ok());
        assert!(validate_thread_count(0).is_err());
    }

    #[test]
    fn membership_freshness_respects_staleness_threshold() {
        let now = 1_000_000;
        assert!(is_fresh(now, now - 89));
        assert!(!is_fresh(now, now - 90));
        assert!(!is_fresh(now, now - 9_000));
    }
}
