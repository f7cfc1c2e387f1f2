// HTTP surface: response envelope, API-key gate, and the /api routers.

mod database;
mod docker;
mod docker_api;
mod files;
mod notification;
mod server;
mod stats;

use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::config::AppConfig;
use crate::docker_repo::DockerRepo;
use crate::file_store::FileStore;
use crate::log_store::LogStore;
use crate::settings_repo::SettingsRepo;
use crate::stats::StatsEngine;
use crate::version;

#[derive(Clone)]
pub struct AppState {
    pub docker: Arc<DockerRepo>,
    pub stats: Arc<StatsEngine>,
    pub settings: Arc<SettingsRepo>,
    pub files: Arc<FileStore>,
    pub logs: Arc<LogStore>,
    pub config: AppConfig,
}

/// Error half of the response envelope, mapped onto HTTP status codes.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Missing required param(s)")]
    MissingParams,
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingParams => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Daemon not-found responses keep their 404; everything else is a 500
    /// with the daemon's message passed through.
    pub(crate) fn from_docker(e: anyhow::Error) -> Self {
        if let Some(bollard::errors::Error::DockerResponseServerError {
            status_code: 404,
            message,
        }) = e.downcast_ref::<bollard::errors::Error>()
        {
            return ApiError::NotFound(message.clone());
        }
        ApiError::Internal(e.to_string())
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = axum::Json(serde_json::json!({
            "code": status.as_u16(),
            "error": self.to_string(),
        }));
        (status, body).into_response()
    }
}

pub(crate) type ApiResult = Result<axum::Json<serde_json::Value>, ApiError>;

/// Success half of the envelope: `{code: 200, response: {result}}`.
pub(crate) fn ok(result: impl Serialize) -> ApiResult {
    let result = serde_json::to_value(result)
        .map_err(|e| ApiError::Internal(format!("serializing response: {}", e)))?;
    Ok(axum::Json(serde_json::json!({
        "code": 200,
        "response": { "result": result },
    })))
}

async fn require_api_key(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let header_key = req
        .headers()
        .get("x-api-key")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let query_key = req.uri().query().and_then(|q| {
        q.split('&')
            .find_map(|pair| pair.strip_prefix("apikey="))
            .map(str::to_string)
    });
    let provided = header_key.or(query_key);
    if provided.as_deref() != Some(state.config.server.api_key.as_str()) {
        let body = axum::Json(serde_json::json!({
            "code": 401,
            "error": "Invalid apikey",
        }));
        return (StatusCode::UNAUTHORIZED, body).into_response();
    }
    next.run(req).await
}

async fn landing() -> impl IntoResponse {
    format!(
        "{} v{} - headless container fleet agent. REST API under /api, auth via x-api-key header or ?apikey=.",
        version::NAME,
        version::VERSION
    )
}

/// Unknown /api paths answer 405 with the envelope, like the rest of the API.
async fn api_fallback(req: Request) -> Response {
    let endpoint = req.uri().path().trim_start_matches('/').to_string();
    let body = axum::Json(serde_json::json!({
        "code": 405,
        "error": format!("Invalid {} request (endpoint={})", req.method(), endpoint),
    }));
    (StatusCode::METHOD_NOT_ALLOWED, body).into_response()
}

pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .nest("/server", server::router())
        .nest("/docker", docker::router())
        .nest("/dockerAPI", docker_api::router())
        .nest("/stats", stats::router())
        .nest("/database", database::router())
        .nest("/file", files::router())
        .nest("/notification", notification::router())
        .fallback(api_fallback)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_api_key,
        ));
    Router::new()
        .route("/", get(landing)) // GET /
        .route("/ping", get(|| async { "pong" })) // GET /ping (no auth)
        .nest("/api", api)
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}
