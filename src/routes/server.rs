// /api/server: version banner, time, log streams, task trigger

use axum::{
    Router,
    extract::{Query, State},
    routing::{get, post},
};
use chrono::{SecondsFormat, Utc};
use serde::Deserialize;

use super::{ApiError, ApiResult, AppState, ok};
use crate::version;

pub(super) fn router() -> Router<AppState> {
    Router::new()
        .route("/ping", get(ping)) // GET /api/server/ping
        .route("/time", get(time)) // GET /api/server/time
        .route("/log", get(read_log)) // GET /api/server/log?name=
        .route("/log/delete", post(delete_log)) // POST /api/server/log/delete
        .route("/log/purge", post(purge_logs)) // POST /api/server/log/purge
        .route("/task/run", post(run_task)) // POST /api/server/task/run
}

async fn ping() -> ApiResult {
    ok(version::banner())
}

async fn time() -> ApiResult {
    ok(serde_json::json!({
        "time": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        "timezone": iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string()),
    }))
}

#[derive(Deserialize)]
struct LogQuery {
    name: Option<String>,
}

async fn read_log(State(state): State<AppState>, Query(query): Query<LogQuery>) -> ApiResult {
    let name = query.name.ok_or(ApiError::MissingParams)?;
    ok(state.logs.read(&name)?)
}

#[derive(Deserialize)]
struct DeleteLogBody {
    log: Option<String>,
}

async fn delete_log(
    State(state): State<AppState>,
    body: Option<axum::Json<DeleteLogBody>>,
) -> ApiResult {
    let name = body
        .and_then(|axum::Json(b)| b.log)
        .ok_or(ApiError::MissingParams)?;
    state.logs.delete(&name)?;
    ok("success")
}

#[derive(Deserialize)]
struct PurgeBody {
    group: Option<String>,
}

async fn purge_logs(
    State(state): State<AppState>,
    body: Option<axum::Json<PurgeBody>>,
) -> ApiResult {
    let group = body
        .and_then(|axum::Json(b)| b.group)
        .ok_or(ApiError::MissingParams)?;
    let removed = state.logs.purge_group(&group)?;
    ok(format!("Purged {} log file(s)", removed))
}

#[derive(Deserialize)]
struct TaskBody {
    task: Option<String>,
}

async fn run_task(
    State(state): State<AppState>,
    body: Option<axum::Json<TaskBody>>,
) -> ApiResult {
    let task = body
        .and_then(|axum::Json(b)| b.task)
        .ok_or(ApiError::MissingParams)?;
    state
        .logs
        .append("task", &format!("Task '{}' triggered", task))?;
    ok(format!("Task '{}' triggered", task))
}
