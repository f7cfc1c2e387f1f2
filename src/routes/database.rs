// /api/database: settings, per-container settings, groups, links,
// notification config, servers and migrations.

use axum::{
    Router,
    extract::{Query, State},
    routing::{get, post},
};
use serde::Deserialize;
use std::collections::BTreeMap;

use super::{ApiError, ApiResult, AppState, ok};
use crate::models::ContainerSettingsPatch;

pub(super) fn router() -> Router<AppState> {
    Router::new()
        // Container settings
        .route("/container/add", post(container_add))
        .route("/container/update", post(container_update))
        .route("/container/hash", get(container_by_hash))
        .route("/containers", get(containers))
        // Groups
        .route("/container/group/add", post(group_add))
        .route("/container/group/delete", post(group_delete))
        .route("/group/container/update", post(group_rename))
        .route("/group/hash", get(group_by_hash))
        .route("/groups", get(groups))
        // Group/container links
        .route("/group/container/link/add", post(group_link_add))
        .route("/group/container/link/remove", post(group_link_remove))
        .route("/group/container/links", get(group_container_links))
        .route("/group/links", get(group_links))
        // Notifications
        .route("/notification/platforms", get(notification_platforms))
        .route("/notification/triggers", get(notification_triggers))
        .route("/notification/trigger/enabled", get(trigger_enabled))
        .route("/notification/link/add", post(notification_link_add))
        .route("/notification/link/delete", post(notification_link_delete))
        .route("/notification/link/update", post(notification_link_update))
        .route("/notification/link/platform/name", get(notification_link_by_name))
        .route("/links", get(links))
        // Migrations
        .route("/migrations", get(migrations))
        // Servers
        .route("/servers", get(servers).post(replace_servers))
        // Settings
        .route("/settings", get(settings).post(update_settings))
        .route("/setting", post(update_setting))
}

// --- Container settings ---

#[derive(Deserialize)]
struct ContainerBody {
    hash: Option<String>,
    #[serde(flatten)]
    patch: ContainerSettingsPatch,
}

async fn container_add(
    State(state): State<AppState>,
    body: Option<axum::Json<ContainerBody>>,
) -> ApiResult {
    let body = body.ok_or(ApiError::MissingParams)?.0;
    let hash = body.hash.ok_or(ApiError::MissingParams)?;
    state.settings.add_container(&hash, &body.patch).await?;
    ok("success")
}

async fn container_update(
    State(state): State<AppState>,
    body: Option<axum::Json<ContainerBody>>,
) -> ApiResult {
    let body = body.ok_or(ApiError::MissingParams)?.0;
    let hash = body.hash.ok_or(ApiError::MissingParams)?;
    if state.settings.update_container(&hash, &body.patch).await? {
        ok("success")
    } else {
        ok("nothing to update")
    }
}

#[derive(Deserialize)]
struct HashQuery {
    hash: Option<String>,
}

async fn container_by_hash(
    State(state): State<AppState>,
    Query(query): Query<HashQuery>,
) -> ApiResult {
    let hash = query.hash.ok_or(ApiError::MissingParams)?;
    ok(state.settings.container_by_hash(&hash).await?)
}

async fn containers(State(state): State<AppState>) -> ApiResult {
    ok(state.settings.containers().await?)
}

// --- Groups ---

#[derive(Deserialize)]
struct GroupAddBody {
    name: Option<String>,
}

async fn group_add(
    State(state): State<AppState>,
    body: Option<axum::Json<GroupAddBody>>,
) -> ApiResult {
    let name = body
        .and_then(|axum::Json(b)| b.name)
        .ok_or(ApiError::MissingParams)?;
    let id = state.settings.add_group(&name).await?;
    ok(serde_json::json!({ "id": id }))
}

#[derive(Deserialize)]
struct GroupDeleteBody {
    id: Option<i64>,
}

async fn group_delete(
    State(state): State<AppState>,
    body: Option<axum::Json<GroupDeleteBody>>,
) -> ApiResult {
    let id = body
        .and_then(|axum::Json(b)| b.id)
        .ok_or(ApiError::MissingParams)?;
    state.settings.delete_group(id).await?;
    ok("success")
}

#[derive(Deserialize)]
struct GroupRenameBody {
    name: Option<String>,
    id: Option<i64>,
}

async fn group_rename(
    State(state): State<AppState>,
    body: Option<axum::Json<GroupRenameBody>>,
) -> ApiResult {
    let body = body.ok_or(ApiError::MissingParams)?.0;
    let (name, id) = match (body.name, body.id) {
        (Some(name), Some(id)) => (name, id),
        _ => return Err(ApiError::MissingParams),
    };
    state.settings.rename_group(id, &name).await?;
    ok("success")
}

async fn group_by_hash(
    State(state): State<AppState>,
    Query(query): Query<HashQuery>,
) -> ApiResult {
    let hash = query.hash.ok_or(ApiError::MissingParams)?;
    let id: i64 = hash.parse().unwrap_or_default();
    ok(state.settings.group_by_id(id).await?)
}

async fn groups(State(state): State<AppState>) -> ApiResult {
    ok(state.settings.groups().await?)
}

// --- Group/container links ---

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroupLinkBody {
    group_id: Option<i64>,
    container_id: Option<i64>,
}

async fn group_link_add(
    State(state): State<AppState>,
    body: Option<axum::Json<GroupLinkBody>>,
) -> ApiResult {
    let body = body.ok_or(ApiError::MissingParams)?.0;
    let (group_id, container_id) = match (body.group_id, body.container_id) {
        (Some(g), Some(c)) => (g, c),
        _ => return Err(ApiError::MissingParams),
    };
    state.settings.add_group_link(group_id, container_id).await?;
    ok("success")
}

async fn group_link_remove(
    State(state): State<AppState>,
    body: Option<axum::Json<GroupLinkBody>>,
) -> ApiResult {
    let body = body.ok_or(ApiError::MissingParams)?.0;
    let (group_id, container_id) = match (body.group_id, body.container_id) {
        (Some(g), Some(c)) => (g, c),
        _ => return Err(ApiError::MissingParams),
    };
    state
        .settings
        .remove_group_link(group_id, container_id)
        .await?;
    ok("success")
}

#[derive(Deserialize)]
struct GroupQuery {
    group: Option<i64>,
}

async fn group_container_links(
    State(state): State<AppState>,
    Query(query): Query<GroupQuery>,
) -> ApiResult {
    let group = query.group.ok_or(ApiError::MissingParams)?;
    ok(state.settings.containers_in_group(group).await?)
}

async fn group_links(State(state): State<AppState>) -> ApiResult {
    ok(state.settings.group_links().await?)
}

// --- Notifications ---

async fn notification_platforms(State(state): State<AppState>) -> ApiResult {
    ok(state.settings.notification_platforms().await?)
}

async fn notification_triggers(State(state): State<AppState>) -> ApiResult {
    ok(state.settings.notification_triggers().await?)
}

#[derive(Deserialize)]
struct TriggerQuery {
    trigger: Option<i64>,
}

async fn trigger_enabled(
    State(state): State<AppState>,
    Query(query): Query<TriggerQuery>,
) -> ApiResult {
    let trigger = query.trigger.ok_or(ApiError::MissingParams)?;
    ok(state.settings.trigger_enabled(trigger).await?)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LinkAddBody {
    platform_id: Option<i64>,
    trigger_ids: Option<serde_json::Value>,
    platform_parameters: Option<serde_json::Value>,
    sender_name: Option<String>,
}

async fn notification_link_add(
    State(state): State<AppState>,
    body: Option<axum::Json<LinkAddBody>>,
) -> ApiResult {
    let body = body.ok_or(ApiError::MissingParams)?.0;
    let (platform_id, trigger_ids, platform_parameters, sender_name) = match (
        body.platform_id,
        body.trigger_ids,
        body.platform_parameters,
        body.sender_name,
    ) {
        (Some(p), Some(t), Some(pp), Some(s)) => (p, t, pp, s),
        _ => return Err(ApiError::MissingParams),
    };
    let id = state
        .settings
        .add_notification_link(platform_id, &trigger_ids, &platform_parameters, &sender_name)
        .await?;
    ok(serde_json::json!({ "id": id }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LinkDeleteBody {
    link_id: Option<i64>,
}

async fn notification_link_delete(
    State(state): State<AppState>,
    body: Option<axum::Json<LinkDeleteBody>>,
) -> ApiResult {
    let link_id = body
        .and_then(|axum::Json(b)| b.link_id)
        .ok_or(ApiError::MissingParams)?;
    state.settings.delete_notification_link(link_id).await?;
    ok("success")
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LinkUpdateBody {
    link_id: Option<i64>,
    platform_id: Option<i64>,
    trigger_ids: Option<serde_json::Value>,
    platform_parameters: Option<serde_json::Value>,
    sender_name: Option<String>,
}

async fn notification_link_update(
    State(state): State<AppState>,
    body: Option<axum::Json<LinkUpdateBody>>,
) -> ApiResult {
    let body = body.ok_or(ApiError::MissingParams)?.0;
    let (link_id, platform_id, trigger_ids, platform_parameters, sender_name) = match (
        body.link_id,
        body.platform_id,
        body.trigger_ids,
        body.platform_parameters,
        body.sender_name,
    ) {
        (Some(l), Some(p), Some(t), Some(pp), Some(s)) => (l, p, t, pp, s),
        _ => return Err(ApiError::MissingParams),
    };
    state
        .settings
        .update_notification_link(link_id, platform_id, &trigger_ids, &platform_parameters, &sender_name)
        .await?;
    ok("success")
}

#[derive(Deserialize)]
struct NameQuery {
    name: Option<String>,
}

async fn notification_link_by_name(
    State(state): State<AppState>,
    Query(query): Query<NameQuery>,
) -> ApiResult {
    let name = query.name.ok_or(ApiError::MissingParams)?;
    ok(state.settings.notification_link_by_sender(&name).await?)
}

async fn links(State(state): State<AppState>) -> ApiResult {
    ok(state.settings.notification_links().await?)
}

// --- Migrations ---

async fn migrations(State(state): State<AppState>) -> ApiResult {
    ok(state.settings.migrations().await?)
}

// --- Servers ---

async fn servers(State(state): State<AppState>) -> ApiResult {
    ok(state.settings.servers().await?)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServerListEntry {
    #[serde(default)]
    name: String,
    #[serde(default)]
    host: String,
    #[serde(default, alias = "api_key")]
    api_key: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServerListBody {
    server_list: Option<Vec<ServerListEntry>>,
}

async fn replace_servers(
    State(state): State<AppState>,
    body: Option<axum::Json<ServerListBody>>,
) -> ApiResult {
    let list = body
        .and_then(|axum::Json(b)| b.server_list)
        .ok_or(ApiError::MissingParams)?;
    let entries: Vec<(String, String, String)> = list
        .into_iter()
        .map(|s| (s.name, s.host, s.api_key))
        .collect();
    state.settings.replace_servers(&entries).await?;
    ok("success")
}

// --- Settings ---

async fn settings(State(state): State<AppState>) -> ApiResult {
    ok(state.settings.settings().await?)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsBody {
    new_settings: Option<BTreeMap<String, serde_json::Value>>,
}

fn setting_value(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    }
}

async fn update_settings(
    State(state): State<AppState>,
    body: Option<axum::Json<SettingsBody>>,
) -> ApiResult {
    let new_settings = body
        .and_then(|axum::Json(b)| b.new_settings)
        .ok_or(ApiError::MissingParams)?;
    let as_strings: BTreeMap<String, String> = new_settings
        .into_iter()
        .map(|(k, v)| (k, setting_value(v)))
        .collect();
    state.settings.upsert_settings(&as_strings).await?;
    ok("success")
}

#[derive(Deserialize)]
struct SettingBody {
    setting: Option<String>,
    value: Option<serde_json::Value>,
}

async fn update_setting(
    State(state): State<AppState>,
    body: Option<axum::Json<SettingBody>>,
) -> ApiResult {
    let body = body.ok_or(ApiError::MissingParams)?.0;
    let (setting, value) = match (body.setting, body.value) {
        (Some(setting), Some(value)) => (setting, value),
        _ => return Err(ApiError::MissingParams),
    };
    state
        .settings
        .upsert_setting(&setting, &setting_value(value))
        .await?;
    ok("success")
}
