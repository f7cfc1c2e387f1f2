// /api/stats: enriched container list, fleet metrics, fleet overview

use axum::{Router, extract::State, routing::get};

use super::{ApiResult, AppState, ok};

pub(super) fn router() -> Router<AppState> {
    Router::new()
        .route("/containers", get(containers)) // GET /api/stats/containers
        .route("/metrics", get(metrics)) // GET /api/stats/metrics
        .route("/overview", get(overview)) // GET /api/stats/overview
}

async fn containers(State(state): State<AppState>) -> ApiResult {
    ok(state.stats.list_enriched_containers().await?)
}

async fn metrics(State(state): State<AppState>) -> ApiResult {
    ok(state.stats.fleet_metrics().await?)
}

async fn overview(State(state): State<AppState>) -> ApiResult {
    ok(state.stats.overview().await?)
}
