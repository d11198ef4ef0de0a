pub mod api;
pub mod cli;
pub mod errors;
pub mod export;
pub mod handlers;
pub mod routes;
pub mod state;
pub mod task_manager;
pub mod worker_registry;

pub mod prelude {
    pub use crate::api::CoordinatorApi;
    pub use crate::cli::Cli;
    pub use crate::errors::CoordinatorError;
    pub use crate::state::AppState;
}
