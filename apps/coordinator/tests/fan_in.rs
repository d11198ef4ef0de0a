use fuzzctl_coordinator::state::AppState;
use fuzzctl_coordinator::task_manager;
use fuzzctl_domain_models::message::{FuzzerRecord, ResultMessage, ResultStatus};
use fuzzctl_domain_models::task::{TaskOptions, TaskStatus};
use fuzzctl_infra_broker::testing::InMemoryBroker;
use fuzzctl_infra_store::Store;

async fn test_state() -> AppState<InMemoryBroker> {
    let store = Store::connect(":memory:", None).await.unwrap();
    AppState::new(store, InMemoryBroker::new())
}

fn admin_record() -> FuzzerRecord {
    FuzzerRecord {
        url: "https://t/admin".to_string(),
        status: 200,
        length: 512,
        words: 10,
        lines: 5,
    }
}

#[tokio::test]
async fn s1_two_workers_fan_in_to_completion() {
    let state = test_state().await;
    let task_id = task_manager::create_task(
        &state,
        "https://t/FUZZ".to_string(),
        "common.txt".to_string(),
        "/opt/wordlists/common.txt".to_string(),
        vec!["w1".to_string(), "w2".to_string()],
        TaskOptions::default(),
    )
    .await
    .unwrap();

    task_manager::process_result(
        &state,
        ResultMessage {
            task_id: task_id.clone(),
            worker_id: "w1".to_string(),
            status: ResultStatus::Completed,
            results: vec![admin_record()],
            error: None,
            timestamp: 0,
        },
    )
    .await
    .unwrap();

    let mid = state.store.tasks.get_task(&task_id).await.unwrap().unwrap();
    assert_eq!(mid.progress, 50.0);
    assert_eq!(mid.status, TaskStatus::InProgress);

    task_manager::process_result(
        &state,
        ResultMessage {
            task_id: task_id.clone(),
            worker_id: "w2".to_string(),
            status: ResultStatus::Completed,
            results: vec![],
            error: None,
            timestamp: 0,
        },
    )
    .await
    .unwrap();

    let done = state.store.tasks.get_task(&task_id).await.unwrap().unwrap();
    assert_eq!(done.progress, 100.0);
    assert_eq!(done.status, TaskStatus::Completed);
    assert_eq!(done.findings_count, 1);
}

#[tokio::test]
async fn s6_replaying_a_completed_result_does_not_duplicate_the_finding() {
    let state = test_state().await;
    let task_id = task_manager::create_task(
        &state,
        "https://t/FUZZ".to_string(),
        "common.txt".to_string(),
        "/opt/wordlists/common.txt".to_string(),
        vec!["w1".to_string()],
        TaskOptions::default(),
    )
    .await
    .unwrap();

    let message = ResultMessage {
        task_id: task_id.clone(),
        worker_id: "w1".to_string(),
        status: ResultStatus::Completed,
        results: vec![admin_record()],
        error: None,
        timestamp: 0,
    };

    task_manager::process_result(&state, message.clone()).await.unwrap();
    let after_first = state.store.findings.count_for_task(&task_id).await.unwrap();
    assert_eq!(after_first, 1);

    // The task is already closed out of `active_tasks`, so the redelivery is
    // logged and dropped rather than re-advancing a finished task's progress.
    task_manager::process_result(&state, message).await.unwrap();
    let after_replay = state.store.findings.count_for_task(&task_id).await.unwrap();
    assert_eq!(after_replay, 1);
}

#[tokio::test]
async fn all_workers_failing_leaves_the_task_in_progress() {
    let state = test_state().await;
    let task_id = task_manager::create_task(
        &state,
        "https://t/FUZZ".to_string(),
        "common.txt".to_string(),
        "/opt/wordlists/common.txt".to_string(),
        vec!["w1".to_string(), "w2".to_string()],
        TaskOptions::default(),
    )
    .await
    .unwrap();

    for worker_id in ["w1", "w2"] {
        task_manager::process_result(
            &state,
            ResultMessage {
                task_id: task_id.clone(),
                worker_id: worker_id.to_string(),
                status: ResultStatus::Failed,
                results: vec![],
                error: Some("fuzzer crashed".to_string()),
                timestamp: 0,
            },
        )
        .await
        .unwrap();
    }

    let task = state.store.tasks.get_task(&task_id).await.unwrap().unwrap();
    assert_eq!(task.status, TaskStatus::Pending);
    assert_eq!(task.progress, 0.0);
}

#[tokio::test]
async fn a_malformed_result_still_advances_the_fan_in_count() {
    let state = test_state().await;
    let task_id = task_manager::create_task(
        &state,
        "https://t/FUZZ".to_string(),
        "common.txt".to_string(),
        "/opt/wordlists/common.txt".to_string(),
        vec!["w1".to_string()],
        TaskOptions::default(),
    )
    .await
    .unwrap();

    // Simulates the partial decode `run_result_loop` performs when a result
    // body fails to parse as a full `ResultMessage` but still carries
    // recoverable `task_id`/`worker_id` fields.
    task_manager::advance_progress(&state, &task_id, "w1").await.unwrap();

    let task = state.store.tasks.get_task(&task_id).await.unwrap().unwrap();
    assert_eq!(task.status, TaskStatus::Completed);
    assert_eq!(task.progress, 100.0);
}
