use fuzzctl_domain_models::finding::Finding;
use fuzzctl_domain_models::scan_config::ScanConfig;
use fuzzctl_domain_models::summary::SecuritySummary;
use fuzzctl_domain_models::task::{Task, TaskOptions};
use fuzzctl_domain_models::wordlist::WordlistEntry;
use fuzzctl_domain_models::worker::WorkerView;
use tracing::instrument;

use crate::errors::CoordinatorError;
use crate::export;
use crate::state::AppState;
use crate::task_manager;
use crate::worker_registry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
    Html,
}

/// The operation surface a presentation layer drives, gathered behind shared
/// coordinator state. Thin: every method delegates to `task_manager`,
/// `worker_registry`, or a `Store` repository.
#[derive(Clone)]
pub struct CoordinatorApi {
    state: AppState,
}

impl CoordinatorApi {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    #[instrument(skip(self, options))]
    pub async fn create_scan(
        &self,
        target: String,
        wordlist_name: String,
        worker_ids: Vec<String>,
        options: TaskOptions,
    ) -> Result<String, CoordinatorError> {
        task_manager::create_scan(&self.state, target, wordlist_name, worker_ids, options).await
    }

    pub async fn list_tasks(&self, limit: i64) -> Result<Vec<Task>, CoordinatorError> {
        Ok(self.state.store.tasks.get_tasks(limit).await?)
    }

    pub async fn list_findings(
        &self,
        task_id: Option<&str>,
        checked: Option<bool>,
    ) -> Result<Vec<Finding>, CoordinatorError> {
        Ok(self.state.store.findings.get_findings(task_id, checked).await?)
    }

    pub async fn mark_finding_checked(
        &self,
        finding_id: &str,
        checked: bool,
    ) -> Result<(), CoordinatorError> {
        Ok(self
            .state
            .store
            .findings
            .mark_finding_checked(finding_id, checked)
            .await?)
    }

    pub async fn list_workers(&self) -> Result<Vec<WorkerView>, CoordinatorError> {
        worker_registry::list_workers(&self.state).await
    }

    pub async fn adjust_worker(&self, worker_id: &str, threads: u32) -> Result<(), CoordinatorError> {
        worker_registry::adjust_worker(&self.state, worker_id, threads).await
    }

    pub async fn security_summary(&self) -> Result<SecuritySummary, CoordinatorError> {
        Ok(self.state.store.findings.security_summary(10).await?)
    }

    pub async fn export_findings(
        &self,
        format: ExportFormat,
        task_id: Option<&str>,
    ) -> Result<Vec<u8>, anyhow::Error> {
        let findings = self.list_findings(task_id, None).await?;
        match format {
            ExportFormat::Json => export::to_json(&findings),
            ExportFormat::Csv => export::to_csv(&findings),
            ExportFormat::Html => export::to_html(&findings),
        }
    }

    pub async fn register_wordlist(&self, name: &str, path: &str) -> Result<(), CoordinatorError> {
        Ok(self.state.store.wordlists.register(name, path).await?)
    }

    pub async fn list_wordlists(&self) -> Result<Vec<WordlistEntry>, CoordinatorError> {
        Ok(self.state.store.wordlists.list().await?)
    }

    pub async fn save_scan_config(&self, config: &ScanConfig) -> Result<(), CoordinatorError> {
        Ok(self.state.store.scan_configs.save(config).await?)
    }

    pub async fn list_scan_configs(&self) -> Result<Vec<ScanConfig>, CoordinatorError> {
        Ok(self.state.store.scan_configs.get_all().await?)
    }
}
