// /api/notification: test-fire a configured notification link

use axum::{Router, extract::State, routing::post};
use serde::Deserialize;

use super::{ApiError, ApiResult, AppState, ok};

pub(super) fn router() -> Router<AppState> {
    Router::new().route("/test", post(test_notification))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TestBody {
    link_id: Option<i64>,
    name: Option<String>,
}

async fn test_notification(
    State(state): State<AppState>,
    body: Option<axum::Json<TestBody>>,
) -> ApiResult {
    let body = body.ok_or(ApiError::MissingParams)?.0;
    let (link_id, name) = match (body.link_id, body.name) {
        (Some(link_id), Some(name)) => (link_id, name),
        _ => return Err(ApiError::MissingParams),
    };
    let link = state
        .settings
        .notification_link_by_id(link_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Notification link not found".to_string()))?;
    let platform = state
        .settings
        .notification_platform_by_id(link.platform_id)
        .await?
        .map(|p| p.name)
        .unwrap_or_else(|| "unknown".to_string());
    state.logs.append(
        "notification",
        &format!(
            "Test notification sent to {} via link {} ({})",
            platform, link_id, name
        ),
    )?;
    ok("Test notification queued")
}
