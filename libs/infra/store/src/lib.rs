pub mod client;
pub mod errors;
pub mod repositories;
pub mod schema;

pub use client::StoreClient;
pub use errors::StoreError;
pub use repositories::{
    FindingRepository, ScanConfigRepository, TaskRepository, WordlistRepository, WorkerRepository,
};

/// Groups one repository per table behind a single connected client. Created
/// once at startup and cloned (cheaply, the underlying driver is `Arc`-backed)
/// into whichever loops need it.
#[derive(Clone)]
pub struct Store {
    pub tasks: std::sync::Arc<TaskRepository>,
    pub findings: std::sync::Arc<FindingRepository>,
    pub workers: std::sync::Arc<WorkerRepository>,
    pub wordlists: std::sync::Arc<WordlistRepository>,
    pub scan_configs: std::sync::Arc<ScanConfigRepository>,
}

impl Store {
    pub async fn connect(db_path: &str, auth_token: Option<String>) -> Result<Self, StoreError> {
        let client = StoreClient::connect(db_path, auth_token).await?;
        Ok(Self {
            tasks: std::sync::Arc::new(TaskRepository::new(client.clone())),
            findings: std::sync::Arc::new(FindingRepository::new(client.clone())),
            workers: std::sync::Arc::new(WorkerRepository::new(client.clone())),
            wordlists: std::sync::Arc::new(WordlistRepository::new(client.clone())),
            scan_configs: std::sync::Arc::new(ScanConfigRepository::new(client)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fuzzctl_domain_models::task::{Task, TaskOptions};

    async fn memory_store() -> Store {
        Store::connect(":memory:", None).await.unwrap()
    }

    #[tokio::test]
    async fn save_and_fetch_task_round_trips() {
        let store = memory_store().await;
        let task = Task::new(
            "task_1".into(),
            "https://t/FUZZ".into(),
            "common.txt".into(),
            "/opt/wordlists/common.txt".into(),
            TaskOptions::default(),
            vec!["w1".into()],
        );
        store.tasks.save_task(&task).await.unwrap();

        let fetched = store.tasks.get_task("task_1").await.unwrap().unwrap();
        assert_eq!(fetched.target, "https://t/FUZZ");
        assert_eq!(fetched.worker_ids, vec!["w1".to_string()]);
    }

    #[tokio::test]
    async fn save_task_rejects_duplicate_id() {
        let store = memory_store().await;
        let task = Task::new(
            "task_dup".into(),
            "https://t/FUZZ".into(),
            "common.txt".into(),
            "/opt/wordlists/common.txt".into(),
            TaskOptions::default(),
            vec!["w1".into()],
        );
        store.tasks.save_task(&task).await.unwrap();
        let err = store.tasks.save_task(&task).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateId));
    }

    #[tokio::test]
    async fn wordlist_registry_seeds_and_resolves() {
        let store = memory_store().await;
        store.wordlists.seed_defaults().await.unwrap();
        let resolved = store.wordlists.resolve("common.txt").await.unwrap();
        assert_eq!(resolved, Some("/opt/wordlists/common.txt".to_string()));
        assert_eq!(store.wordlists.resolve("nope.txt").await.unwrap(), None);
    }

    #[tokio::test]
    async fn on_disk_database_survives_reconnect() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("fuzzctl.db");
        let db_path = db_path.to_str().unwrap().to_string();

        {
            let store = Store::connect(&db_path, None).await.unwrap();
            let task = Task::new(
                "task_disk".into(),
                "https://t/FUZZ".into(),
                "common.txt".into(),
                "/opt/wordlists/common.txt".into(),
                TaskOptions::default(),
                vec!["w1".into()],
            );
            store.tasks.save_task(&task).await.unwrap();
        }

        let reopened = Store::connect(&db_path, None).await.unwrap();
        let fetched = reopened.tasks.get_task("task_disk").await.unwrap().unwrap();
        assert_eq!(fetched.target, "https://t/FUZZ");
    }
}
