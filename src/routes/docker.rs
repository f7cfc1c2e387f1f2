// /api/docker: container lifecycle, image/network/volume management,
// orphan detection and the declarative reverse-translations.

use axum::{
    Router,
    extract::{Query, State},
    routing::{get, post},
};
use futures_util::future::join_all;
use serde::Deserialize;
use tracing::warn;

use super::{ApiError, ApiResult, AppState, ok};
use crate::stats::{format, translate, view::ImageSizeIndex};

pub(super) fn router() -> Router<AppState> {
    Router::new()
        .route("/processList", get(process_list))
        .route("/container/inspect", get(container_inspect))
        .route("/container/logs", get(container_logs))
        .route("/container/start", post(container_start))
        .route("/container/stop", post(container_stop))
        .route("/container/restart", post(container_restart))
        .route("/container/kill", post(container_kill))
        .route("/container/pull", post(container_pull))
        .route("/container/remove", post(container_remove))
        .route("/container/create", post(container_create))
        .route("/container/ports", get(container_ports))
        .route("/create/compose", get(create_compose))
        .route("/create/run", get(create_run))
        .route("/image/remove", post(image_remove))
        .route("/images/sizes", get(images_sizes))
        .route("/networks", get(networks))
        .route("/network/remove", post(network_remove))
        .route("/orphans/containers", get(orphan_containers))
        .route("/orphans/networks", get(orphan_networks))
        .route("/orphans/volumes", get(orphan_volumes))
        .route("/permissions", get(permissions))
        .route("/stats", get(raw_stats))
        .route("/unused/containers", get(unused_containers))
        .route("/volume/remove", post(volume_remove))
}

#[derive(Deserialize)]
struct NameQuery {
    name: Option<String>,
}

#[derive(Deserialize)]
struct NameBody {
    name: Option<String>,
}

fn required<T>(value: Option<T>) -> Result<T, ApiError> {
    value.ok_or(ApiError::MissingParams)
}

fn body_name(body: Option<axum::Json<NameBody>>) -> Result<String, ApiError> {
    required(body.and_then(|axum::Json(b)| b.name))
}

async fn process_list(State(state): State<AppState>) -> ApiResult {
    let containers = state
        .docker
        .list_containers(true)
        .await
        .map_err(ApiError::from_docker)?;
    ok(containers)
}

async fn container_inspect(
    State(state): State<AppState>,
    Query(query): Query<NameQuery>,
) -> ApiResult {
    let name = required(query.name)?;
    let inspect = state
        .docker
        .inspect_container(&name)
        .await
        .map_err(ApiError::from_docker)?;
    ok(inspect)
}

async fn container_logs(
    State(state): State<AppState>,
    Query(query): Query<NameQuery>,
) -> ApiResult {
    let name = required(query.name)?;
    let logs = state
        .docker
        .container_logs(&name, 100)
        .await
        .map_err(ApiError::from_docker)?;
    ok(logs)
}

async fn container_start(
    State(state): State<AppState>,
    body: Option<axum::Json<NameBody>>,
) -> ApiResult {
    let name = body_name(body)?;
    state
        .docker
        .start_container(&name)
        .await
        .map_err(ApiError::from_docker)?;
    ok("success")
}

async fn container_stop(
    State(state): State<AppState>,
    body: Option<axum::Json<NameBody>>,
) -> ApiResult {
    let name = body_name(body)?;
    state
        .docker
        .stop_container(&name)
        .await
        .map_err(ApiError::from_docker)?;
    ok("success")
}

async fn container_restart(
    State(state): State<AppState>,
    body: Option<axum::Json<NameBody>>,
) -> ApiResult {
    let name = body_name(body)?;
    state
        .docker
        .restart_container(&name)
        .await
        .map_err(ApiError::from_docker)?;
    ok("success")
}

async fn container_kill(
    State(state): State<AppState>,
    body: Option<axum::Json<NameBody>>,
) -> ApiResult {
    let name = body_name(body)?;
    state
        .docker
        .kill_container(&name)
        .await
        .map_err(ApiError::from_docker)?;
    ok("success")
}

async fn container_pull(
    State(state): State<AppState>,
    body: Option<axum::Json<NameBody>>,
) -> ApiResult {
    let name = body_name(body)?;
    state
        .docker
        .pull_container_image(&name)
        .await
        .map_err(ApiError::from_docker)?;
    ok("success")
}

async fn container_remove(
    State(state): State<AppState>,
    body: Option<axum::Json<NameBody>>,
) -> ApiResult {
    let name = body_name(body)?;
    state
        .docker
        .remove_container(&name, false)
        .await
        .map_err(ApiError::from_docker)?;
    ok("success")
}

#[derive(Deserialize)]
struct CreateBody {
    inspect: Option<serde_json::Value>,
}

async fn container_create(
    State(state): State<AppState>,
    body: Option<axum::Json<CreateBody>>,
) -> ApiResult {
    let spec = required(body.and_then(|axum::Json(b)| b.inspect))?;
    let name = spec
        .get("name")
        .and_then(|v| v.as_str())
        .map(str::to_string);
    let create_body = serde_json::from_value(spec)
        .map_err(|e| ApiError::Internal(format!("invalid container spec: {}", e)))?;
    let id = state
        .docker
        .create_container(name.as_deref(), create_body)
        .await
        .map_err(ApiError::from_docker)?;
    state
        .docker
        .start_container(&id)
        .await
        .map_err(ApiError::from_docker)?;
    let inspect = state
        .docker
        .inspect_container(&id)
        .await
        .map_err(ApiError::from_docker)?;
    ok(inspect)
}

async fn container_ports(
    State(state): State<AppState>,
    Query(query): Query<NameQuery>,
) -> ApiResult {
    let name = required(query.name)?;
    let inspect = state
        .docker
        .inspect_container(&name)
        .await
        .map_err(ApiError::from_docker)?;
    let ports = inspect
        .network_settings
        .as_ref()
        .and_then(|n| n.ports.clone())
        .unwrap_or_default();
    ok(ports)
}

async fn create_compose(
    State(state): State<AppState>,
    Query(query): Query<NameQuery>,
) -> ApiResult {
    let name = required(query.name)?;
    let inspect = state
        .docker
        .inspect_container(&name)
        .await
        .map_err(ApiError::from_docker)?;
    ok(translate::build_compose_service(&inspect))
}

async fn create_run(
    State(state): State<AppState>,
    Query(query): Query<NameQuery>,
) -> ApiResult {
    let name = required(query.name)?;
    let inspect = state
        .docker
        .inspect_container(&name)
        .await
        .map_err(ApiError::from_docker)?;
    ok(translate::build_run_command(&inspect))
}

#[derive(Deserialize)]
struct ImageBody {
    image: Option<String>,
}

async fn image_remove(
    State(state): State<AppState>,
    body: Option<axum::Json<ImageBody>>,
) -> ApiResult {
    let image = required(body.and_then(|axum::Json(b)| b.image))?;
    state
        .docker
        .remove_image(&image, false)
        .await
        .map_err(ApiError::from_docker)?;
    ok("success")
}

async fn images_sizes(State(state): State<AppState>) -> ApiResult {
    let images = state
        .docker
        .list_images()
        .await
        .map_err(ApiError::from_docker)?;
    let sizes: Vec<serde_json::Value> = images
        .iter()
        .map(|image| {
            serde_json::json!({
                "id": image.id,
                "tags": image.repo_tags,
                "size": image.size,
                "sizeFormatted": format::format_bytes_decimal(image.size.max(0) as u64),
                "created": image.created,
            })
        })
        .collect();
    ok(sizes)
}

async fn networks(State(state): State<AppState>) -> ApiResult {
    let networks = state
        .docker
        .list_networks()
        .await
        .map_err(ApiError::from_docker)?;
    ok(networks)
}

async fn network_remove(
    State(state): State<AppState>,
    body: Option<axum::Json<NameBody>>,
) -> ApiResult {
    let name = body_name(body)?;
    state
        .docker
        .remove_network(&name)
        .await
        .map_err(ApiError::from_docker)?;
    ok("success")
}

/// Containers whose image reference no longer matches any local image.
async fn orphan_containers(State(state): State<AppState>) -> ApiResult {
    let containers = state
        .docker
        .list_containers(true)
        .await
        .map_err(ApiError::from_docker)?;
    let images = state
        .docker
        .list_images()
        .await
        .map_err(ApiError::from_docker)?;
    let index = ImageSizeIndex::new(&images);
    let orphans: Vec<_> = containers
        .into_iter()
        .filter(|c| {
            c.image
                .as_deref()
                .map(|image| index.lookup(image).is_none())
                .unwrap_or(false)
        })
        .collect();
    ok(orphans)
}

const BUILTIN_NETWORKS: [&str; 3] = ["bridge", "host", "none"];

/// User networks with no attached containers.
async fn orphan_networks(State(state): State<AppState>) -> ApiResult {
    let networks = state
        .docker
        .list_networks()
        .await
        .map_err(ApiError::from_docker)?;
    let orphans: Vec<_> = networks
        .into_iter()
        .filter(|n| {
            let name = n.name.as_deref().unwrap_or_default();
            let attached = n.containers.as_ref().map(|c| c.len()).unwrap_or(0);
            attached == 0 && !BUILTIN_NETWORKS.contains(&name)
        })
        .collect();
    ok(orphans)
}

/// Volumes carrying no labels at all, i.e. not managed by anything.
async fn orphan_volumes(State(state): State<AppState>) -> ApiResult {
    let volumes = state
        .docker
        .list_volumes()
        .await
        .map_err(ApiError::from_docker)?;
    let orphans: Vec<_> = volumes
        .into_iter()
        .filter(|v| v.labels.is_empty())
        .collect();
    ok(orphans)
}

async fn permissions(State(state): State<AppState>) -> ApiResult {
    let has_access = state.docker.ping().await.is_ok();
    ok(serde_json::json!({ "hasAccess": has_access }))
}

/// Raw single-sample stats for every running container. A container whose
/// sample fails is skipped; the others still report.
async fn raw_stats(State(state): State<AppState>) -> ApiResult {
    let containers = state
        .docker
        .list_running_containers()
        .await
        .map_err(ApiError::from_docker)?;
    let docker = &state.docker;
    let samples = join_all(containers.iter().map(|c| async move {
        let id = c.id.as_deref().unwrap_or_default();
        match docker.stats_snapshot(id).await {
            Ok(stats) => Some(serde_json::json!({
                "id": id,
                "name": c
                    .names
                    .as_ref()
                    .and_then(|n| n.first())
                    .map(|n| n.trim_start_matches('/'))
                    .unwrap_or_default(),
                "stats": stats,
            })),
            Err(e) => {
                warn!(error = %e, container = id, "stats sample failed; skipping");
                None
            }
        }
    }))
    .await;
    let samples: Vec<_> = samples.into_iter().flatten().collect();
    ok(samples)
}

/// Containers created but never started.
async fn unused_containers(State(state): State<AppState>) -> ApiResult {
    let containers = state
        .docker
        .list_containers(true)
        .await
        .map_err(ApiError::from_docker)?;
    let unused: Vec<_> = containers
        .into_iter()
        .filter(|c| {
            c.state
                .as_ref()
                .map(|s| s.to_string() == "created")
                .unwrap_or(false)
        })
        .collect();
    ok(unused)
}

#[derive(Deserialize)]
struct VolumeBody {
    id: Option<String>,
}

async fn volume_remove(
    State(state): State<AppState>,
    body: Option<axum::Json<VolumeBody>>,
) -> ApiResult {
    let id = required(body.and_then(|axum::Json(b)| b.id))?;
    state
        .docker
        .remove_volume(&id)
        .await
        .map_err(ApiError::from_docker)?;
    ok("success")
}
