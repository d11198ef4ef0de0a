use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use fuzzctl_domain_models::message::{ControlCommand, ResultMessage, ResultStatus, TaskMessage};
use fuzzctl_domain_models::worker::{WorkerDescriptor, WorkerHeartbeat};
use fuzzctl_infra_broker::keyspace::{
    control_queue, task_queue, RESULTS_QUEUE, WORKERS_ACTIVE_HASH, WORKERS_HEALTH_HASH,
};
use fuzzctl_infra_broker::{Broker, BrokerClient, BrokerError};

use crate::fuzzer;

fn clamp_threads(threads: u32) -> u32 {
    threads.clamp(1, 100)
}

/// Runs the three cooperative loops of a worker node: task consumption,
/// control command handling, and periodic health reporting.
pub struct Agent {
    broker: BrokerClient,
    worker_id: String,
    hostname: String,
    fuzzer_binary: String,
    threads: Arc<AtomicU32>,
    paused: Arc<AtomicBool>,
    shutdown: Arc<AtomicBool>,
    current_task: Arc<Mutex<Option<String>>>,
}

impl Agent {
    pub fn new(
        broker: BrokerClient,
        worker_id: String,
        hostname: String,
        fuzzer_binary: String,
        initial_threads: u32,
        shutdown: Arc<AtomicBool>,
    ) -> Self {
        Self {
            broker,
            worker_id,
            hostname,
            fuzzer_binary,
            threads: Arc::new(AtomicU32::new(clamp_threads(initial_threads))),
            paused: Arc::new(AtomicBool::new(false)),
            shutdown,
            current_task: Arc::new(Mutex::new(None)),
        }
    }

    #[instrument(skip(self))]
    pub async fn register(&self) -> Result<(), crate::errors::WorkerError> {
        let descriptor = WorkerDescriptor {
            worker_id: self.worker_id.clone(),
            hostname: self.hostname.clone(),
            threads: self.threads.load(Ordering::Relaxed),
            registered_at: Utc::now().timestamp(),
        };
        self.broker
            .hash_set(WORKERS_ACTIVE_HASH, &self.worker_id, &descriptor)
            .await?;
        info!(worker_id = %self.worker_id, "registered with broker");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn unregister(&self) {
        if let Err(err) = self.broker.hash_delete(WORKERS_ACTIVE_HASH, &self.worker_id).await {
            warn!(%err, "failed to unregister from workers:active");
        }
        if let Err(err) = self.broker.hash_delete(WORKERS_HEALTH_HASH, &self.worker_id).await {
            warn!(%err, "failed to unregister from workers:health");
        }
    }

    pub async fn run(self: Arc<Self>) {
        let task_loop = tokio::spawn(self.clone().task_loop());
        let control_loop = tokio::spawn(self.clone().control_loop());
        let health_loop = tokio::spawn(self.clone().health_loop());

        let _ = tokio::join!(task_loop, control_loop, health_loop);
    }

    async fn task_loop(self: Arc<Self>) {
        loop {
            if self.shutdown.load(Ordering::SeqCst) {
                break;
            }
            if self.paused.load(Ordering::SeqCst) {
                tokio::time::sleep(Duration::from_secs(1)).await;
                continue;
            }

            match self
                .broker
                .blocking_pop::<TaskMessage>(&task_queue(&self.worker_id), 1.0)
                .await
            {
                Ok(Some(message)) => self.handle_task(message).await,
                Ok(None) => {}
                Err(BrokerError::Malformed(err)) => {
                    warn!(%err, "dropping malformed task message");
                }
                Err(err @ BrokerError::Unavailable(_)) => {
                    warn!(%err, "broker unavailable in task loop, retrying in 5s");
                    tokio::time::sleep(Duration::from_secs(5)).await;
                }
            }
        }
    }

    #[instrument(skip(self, message), fields(task_id = %message.task_id))]
    async fn handle_task(&self, message: TaskMessage) {
        *self.current_task.lock().await = Some(message.task_id.clone());

        let result = fuzzer::run_fuzzer(
            &self.fuzzer_binary,
            &message.target,
            &message.wordlist_path,
            &message.options,
        )
        .await;

        let result_message = match result {
            Ok(records) => ResultMessage {
                task_id: message.task_id.clone(),
                worker_id: self.worker_id.clone(),
                status: ResultStatus::Completed,
                results: records,
                error: None,
                timestamp: Utc::now().timestamp(),
            },
            Err(err) => {
                warn!(task_id = %message.task_id, %err, "fuzzer invocation failed");
                ResultMessage {
                    task_id: message.task_id.clone(),
                    worker_id: self.worker_id.clone(),
                    status: ResultStatus::Failed,
                    results: Vec::new(),
                    error: Some(err.to_string()),
                    timestamp: Utc::now().timestamp(),
                }
            }
        };

        if let Err(err) = self.broker.push(RESULTS_QUEUE, &result_message).await {
            warn!(%err, "failed to push result message");
        }

        *self.current_task.lock().await = None;
    }

    async fn control_loop(self: Arc<Self>) {
        loop {
            if self.shutdown.load(Ordering::SeqCst) {
                break;
            }

            match self
                .broker
                .non_blocking_pop::<ControlCommand>(&control_queue(&self.worker_id))
                .await
            {
                Ok(Some(command)) => self.apply_control_command(command),
                Ok(None) => {}
                Err(err) => warn!(%err, "broker unavailable in control loop"),
            }

            tokio::time::sleep(Duration::from_secs(1)).await;
        }
    }

    fn apply_control_command(&self, command: ControlCommand) {
        match command {
            ControlCommand::UpdateThreads { threads, .. } => {
                let clamped = clamp_threads(threads);
                self.threads.store(clamped, Ordering::SeqCst);
                info!(threads = clamped, "thread count updated");
            }
            ControlCommand::Pause { .. } => {
                self.paused.store(true, Ordering::SeqCst);
                info!("task loop paused");
            }
            ControlCommand::Resume { .. } => {
                self.paused.store(false, Ordering::SeqCst);
                info!("task loop resumed");
            }
            ControlCommand::Shutdown { .. } => {
                info!("shutdown command received");
                self.shutdown.store(true, Ordering::SeqCst);
            }
        }
    }

    async fn health_loop(self: Arc<Self>) {
        loop {
            if self.shutdown.load(Ordering::SeqCst) {
                break;
            }

            let processor_status = match &*self.current_task.lock().await {
                Some(task_id) => format!("running:{task_id}"),
                None => "idle".to_string(),
            };

            let heartbeat = WorkerHeartbeat {
                worker_id: self.worker_id.clone(),
                status: "active".to_string(),
                timestamp: Utc::now().timestamp(),
                current_threads: self.threads.load(Ordering::Relaxed),
                processor_status,
            };

            if let Err(err) = self
                .broker
                .hash_set(WORKERS_HEALTH_HASH, &self.worker_id, &heartbeat)
                .await
            {
                warn!(%err, "failed to write heartbeat");
            }

            tokio::time::sleep(Duration::from_secs(30)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thread_updates_clamp_to_the_one_to_one_hundred_range() {
        assert_eq!(clamp_threads(0), 1);
        assert_eq!(clamp_threads(1), 1);
        assert_eq!(clamp_threads(50), 50);
        assert_eq!(clamp_threads(100), 100);
        assert_eq!(clamp_threads(500), 100);
    }
}
