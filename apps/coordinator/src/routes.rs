use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::CoordinatorApi;
use crate::handlers;

pub fn build_router(api: CoordinatorApi) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(Duration::from_secs(3600));

    Router::new()
        .route("/health", get(handlers::health))
        .nest(
            "/api/v1",
            Router::new()
                .route("/scans", post(handlers::create_scan))
                .route("/tasks", get(handlers::list_tasks))
                .route("/findings", get(handlers::list_findings))
                .route("/findings/:finding_id/checked", post(handlers::mark_finding_checked))
                .route("/findings/export", get(handlers::export_findings))
                .route("/workers", get(handlers::list_workers))
                .route("/workers/:worker_id/threads", post(handlers::adjust_worker))
                .route("/security/summary", get(handlers::security_summary))
                .route("/wordlists", get(handlers::list_wordlists).post(handlers::register_wordlist))
                .route("/scan-configs", get(handlers::list_scan_configs).post(handlers::save_scan_config)),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(api)
}
