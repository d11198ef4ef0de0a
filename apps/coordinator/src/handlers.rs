use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

use fuzzctl_domain_models::scan_config::ScanConfig;
use fuzzctl_domain_models::task::TaskOptions;

use crate::api::{CoordinatorApi, ExportFormat};
use crate::errors::CoordinatorError;

impl IntoResponse for CoordinatorError {
    fn into_response(self) -> Response {
        let status = match &self {
            CoordinatorError::UnknownWordlist(_) | CoordinatorError::InvalidInput(_) => {
                StatusCode::BAD_REQUEST
            }
            CoordinatorError::NoActiveWorkers => StatusCode::CONFLICT,
            CoordinatorError::Broker(_) | CoordinatorError::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateScanRequest {
    pub target: String,
    pub wordlist_name: String,
    pub worker_ids: Vec<String>,
    #[serde(default)]
    pub options: TaskOptions,
}

#[derive(Debug, Serialize)]
pub struct CreateScanResponse {
    pub task_id: String,
}

pub async fn create_scan(
    State(api): State<CoordinatorApi>,
    Json(req): Json<CreateScanRequest>,
) -> Result<Json<CreateScanResponse>, CoordinatorError> {
    let task_id = api
        .create_scan(req.target, req.wordlist_name, req.worker_ids, req.options)
        .await?;
    Ok(Json(CreateScanResponse { task_id }))
}

#[derive(Debug, Deserialize)]
pub struct ListTasksQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    100
}

pub async fn list_tasks(
    State(api): State<CoordinatorApi>,
    Query(q): Query<ListTasksQuery>,
) -> Result<Response, CoordinatorError> {
    let tasks = api.list_tasks(q.limit).await?;
    Ok(Json(tasks).into_response())
}

#[derive(Debug, Deserialize)]
pub struct ListFindingsQuery {
    pub task_id: Option<String>,
    pub checked: Option<bool>,
}

pub async fn list_findings(
    State(api): State<CoordinatorApi>,
    Query(q): Query<ListFindingsQuery>,
) -> Result<Response, CoordinatorError> {
    let findings = api.list_findings(q.task_id.as_deref(), q.checked).await?;
    Ok(Json(findings).into_response())
}

#[derive(Debug, Deserialize)]
pub struct MarkCheckedRequest {
    pub checked: bool,
}

pub async fn mark_finding_checked(
    State(api): State<CoordinatorApi>,
    Path(finding_id): Path<String>,
    Json(req): Json<MarkCheckedRequest>,
) -> Result<StatusCode, CoordinatorError> {
    api.mark_finding_checked(&finding_id, req.checked).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_workers(State(api): State<CoordinatorApi>) -> Result<Response, CoordinatorError> {
    Ok(Json(api.list_workers().await?).into_response())
}

#[derive(Debug, Deserialize)]
pub struct AdjustWorkerRequest {
    pub threads: u32,
}

pub async fn adjust_worker(
    State(api): State<CoordinatorApi>,
    Path(worker_id): Path<String>,
    Json(req): Json<AdjustWorkerRequest>,
) -> Result<StatusCode, CoordinatorError> {
    api.adjust_worker(&worker_id, req.threads).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn security_summary(
    State(api): State<CoordinatorApi>,
) -> Result<Response, CoordinatorError> {
    Ok(Json(api.security_summary().await?).into_response())
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub format: String,
    pub task_id: Option<String>,
}

pub async fn export_findings(
    State(api): State<CoordinatorApi>,
    Query(q): Query<ExportQuery>,
) -> Response {
    let format = match q.format.as_str() {
        "json" => ExportFormat::Json,
        "csv" => ExportFormat::Csv,
        "html" => ExportFormat::Html,
        other => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": format!("unknown export format: {other}") })),
            )
                .into_response();
        }
    };

    match api.export_findings(format, q.task_id.as_deref()).await {
        Ok(bytes) => {
            let content_type = match format {
                ExportFormat::Json => "application/json",
                ExportFormat::Csv => "text/csv",
                ExportFormat::Html => "text/html",
            };
            ([(axum::http::header::CONTENT_TYPE, content_type)], bytes).into_response()
        }
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": err.to_string() })),
        )
            .into_response(),
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterWordlistRequest {
    pub name: String,
    pub path: String,
}

pub async fn register_wordlist(
    State(api): State<CoordinatorApi>,
    Json(req): Json<RegisterWordlistRequest>,
) -> Result<StatusCode, CoordinatorError> {
    api.register_wordlist(&req.name, &req.path).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_wordlists(
    State(api): State<CoordinatorApi>,
) -> Result<Response, CoordinatorError> {
    Ok(Json(api.list_wordlists().await?).into_response())
}

pub async fn save_scan_config(
    State(api): State<CoordinatorApi>,
    Json(config): Json<ScanConfig>,
) -> Result<StatusCode, CoordinatorError> {
    api.save_scan_config(&config).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_scan_configs(
    State(api): State<CoordinatorApi>,
) -> Result<Response, CoordinatorError> {
    Ok(Json(api.list_scan_configs().await?).into_response())
}

pub async fn health() -> &'static str {
    "OK"
}
