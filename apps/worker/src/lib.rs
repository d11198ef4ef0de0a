pub mod agent;
pub mod cli;
pub mod errors;
pub mod fuzzer;

pub mod prelude {
    pub use crate::agent::Agent;
    pub use crate::cli::Cli;
    pub use crate::errors::WorkerError;
}
