pub mod finding;
pub mod scan_config;
pub mod task;
pub mod wordlist;
pub mod worker;

pub use finding::FindingRepository;
pub use scan_config::ScanConfigRepository;
pub use task::TaskRepository;
pub use wordlist::WordlistRepository;
pub use worker::WorkerRepository;
