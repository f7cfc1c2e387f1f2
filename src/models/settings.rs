// Rows of the relational settings/notification store.
// Field names follow the column names so the JSON surface matches the schema.

use serde::{Deserialize, Serialize};

/// Per-container agent settings, keyed by the container hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ContainerSettings {
    pub id: i64,
    pub hash: String,
    pub updates: i64,
    pub frequency: String,
    #[sqlx(rename = "restartUnhealthy")]
    #[serde(rename = "restartUnhealthy")]
    pub restart_unhealthy: i64,
    #[sqlx(rename = "disableNotifications")]
    #[serde(rename = "disableNotifications")]
    pub disable_notifications: i64,
    #[sqlx(rename = "shutdownDelay")]
    #[serde(rename = "shutdownDelay")]
    pub shutdown_delay: i64,
    #[sqlx(rename = "shutdownDelaySeconds")]
    #[serde(rename = "shutdownDelaySeconds")]
    pub shutdown_delay_seconds: i64,
}

/// Partial update for container settings; absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContainerSettingsPatch {
    pub updates: Option<i64>,
    pub frequency: Option<String>,
    #[serde(rename = "restartUnhealthy")]
    pub restart_unhealthy: Option<i64>,
    #[serde(rename = "disableNotifications")]
    pub disable_notifications: Option<i64>,
    #[serde(rename = "shutdownDelay")]
    pub shutdown_delay: Option<i64>,
    #[serde(rename = "shutdownDelaySeconds")]
    pub shutdown_delay_seconds: Option<i64>,
}

impl ContainerSettingsPatch {
    pub fn is_empty(&self) -> bool {
        self.updates.is_none()
            && self.frequency.is_none()
            && self.restart_unhealthy.is_none()
            && self.disable_notifications.is_none()
            && self.shutdown_delay.is_none()
            && self.shutdown_delay_seconds.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Group {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct GroupLink {
    pub id: i64,
    pub group_id: i64,
    pub container_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct NotificationPlatform {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct NotificationTrigger {
    pub id: i64,
    pub name: String,
    pub enabled: i64,
}

/// A platform/trigger binding; trigger_ids and platform_parameters are stored
/// as JSON text and surfaced as parsed values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationLink {
    pub id: i64,
    pub platform_id: i64,
    pub trigger_ids: serde_json::Value,
    pub platform_parameters: serde_json::Value,
    pub sender_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ServerEntry {
    pub id: i64,
    pub name: String,
    pub host: String,
    pub api_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct MigrationRow {
    pub id: i64,
    pub name: String,
    pub applied_at: String,
}
