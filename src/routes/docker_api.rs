// /api/dockerAPI: container recreation from its live configuration

use axum::{
    Router,
    extract::{Query, State},
    routing::get,
};
use serde::Deserialize;

use super::{ApiError, ApiResult, AppState, ok};

pub(super) fn router() -> Router<AppState> {
    Router::new().route("/container/create", get(container_recreate))
}

#[derive(Deserialize)]
struct NameQuery {
    name: Option<String>,
}

/// Stop, remove and recreate the named container from its inspect record,
/// then return the replacement's inspect record.
async fn container_recreate(
    State(state): State<AppState>,
    Query(query): Query<NameQuery>,
) -> ApiResult {
    let name = query.name.ok_or(ApiError::MissingParams)?;
    let inspect = state
        .docker
        .recreate_container(&name)
        .await
        .map_err(ApiError::from_docker)?;
    ok(inspect)
}
