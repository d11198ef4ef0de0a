pub mod finding;
pub mod message;
pub mod scan_config;
pub mod summary;
pub mod task;
pub mod wordlist;
pub mod worker;

pub use finding::Finding;
pub use message::{ControlCommand, FuzzerRecord, ResultMessage, ResultStatus, TaskMessage};
pub use scan_config::ScanConfig;
pub use summary::SecuritySummary;
pub use task::{Task, TaskOptions, TaskStatus};
pub use wordlist::WordlistEntry;
pub use worker::{WorkerHeartbeat, WorkerView};
