//! Name helpers for the broker keyspace. Kept in one place so the string
//! layout only needs to change here if the wire topology ever does.

pub const RESULTS_QUEUE: &str = "results";
pub const WORKERS_ACTIVE_HASH: &str = "workers:active";
pub const WORKERS_HEALTH_HASH: &str = "workers:health";

pub fn task_queue(worker_id: &str) -> String {
    format!("tasks:{worker_id}")
}

pub fn control_queue(worker_id: &str) -> String {
    format!("control:{worker_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_names_are_namespaced_per_worker() {
        assert_eq!(task_queue("w1"), "tasks:w1");
        assert_eq!(control_queue("w1"), "control:w1");
        assert_ne!(task_queue("w1"), task_queue("w2"));
    }
}
