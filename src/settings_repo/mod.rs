// SQLite settings/notification store. One pool, WAL mode, idempotent init
// that creates the schema and seeds stock rows on first run.

use crate::models::{
    ContainerSettings, ContainerSettingsPatch, Group, GroupLink, MigrationRow, NotificationLink,
    NotificationPlatform, NotificationTrigger, ServerEntry,
};
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

pub struct SettingsRepo {
    pool: SqlitePool,
}

const DEFAULT_PLATFORMS: [(&str, &str); 8] = [
    ("Discord", "discord"),
    ("Telegram", "telegram"),
    ("Slack", "slack"),
    ("Pushover", "pushover"),
    ("Email", "email"),
    ("Gotify", "gotify"),
    ("Ntfy", "ntfy"),
    ("Webhook", "webhook"),
];

const DEFAULT_TRIGGERS: [&str; 6] = [
    "Container Started",
    "Container Stopped",
    "Container Unhealthy",
    "Container Updated",
    "Update Available",
    "Container Error",
];

impl SettingsRepo {
    pub async fn connect(path: &str) -> anyhow::Result<Self> {
        if let Some(parent) = Path::new(path).parent() {
            std::fs::create_dir_all(parent)?;
        }
        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}", path))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .busy_timeout(std::time::Duration::from_secs(5))
            .foreign_keys(true)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);
        let pool = SqlitePoolOptions::new().connect_with(opts).await?;
        Ok(Self { pool })
    }

    /// Create the schema and seed defaults. Safe to call on every startup.
    pub async fn init(&self, default_api_key: &str) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS migrations (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                applied_at TEXT DEFAULT (datetime('now'))
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE TABLE IF NOT EXISTS settings (key TEXT PRIMARY KEY, value TEXT)")
            .execute(&self.pool)
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS containers (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                hash TEXT NOT NULL UNIQUE,
                updates INTEGER DEFAULT 0,
                frequency TEXT DEFAULT '',
                restartUnhealthy INTEGER DEFAULT 0,
                disableNotifications INTEGER DEFAULT 0,
                shutdownDelay INTEGER DEFAULT 0,
                shutdownDelaySeconds INTEGER DEFAULT 0
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS groups_ (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS group_container_links (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                group_id INTEGER NOT NULL,
                container_id INTEGER NOT NULL,
                FOREIGN KEY (group_id) REFERENCES groups_(id) ON DELETE CASCADE,
                FOREIGN KEY (container_id) REFERENCES containers(id) ON DELETE CASCADE,
                UNIQUE(group_id, container_id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS notification_platforms (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                type TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS notification_triggers (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                enabled INTEGER DEFAULT 1
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS notification_links (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                platform_id INTEGER NOT NULL,
                trigger_ids TEXT NOT NULL DEFAULT '[]',
                platform_parameters TEXT NOT NULL DEFAULT '{}',
                sender_name TEXT NOT NULL DEFAULT '',
                FOREIGN KEY (platform_id) REFERENCES notification_platforms(id) ON DELETE CASCADE
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS servers (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                host TEXT NOT NULL,
                api_key TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        self.seed_defaults(default_api_key).await?;

        sqlx::query("INSERT OR IGNORE INTO migrations (name) VALUES ($1)")
            .bind("001_initial_schema")
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn seed_defaults(&self, default_api_key: &str) -> anyhow::Result<()> {
        let count: i64 = sqlx::query("SELECT COUNT(*) AS c FROM settings")
            .fetch_one(&self.pool)
            .await?
            .try_get("c")?;
        if count == 0 {
            let defaults = [
                ("apiKey", default_api_key),
                ("theme", "dark"),
                ("updateCheckFrequency", "*/30 * * * *"),
                ("autoUpdate", "0"),
                ("notificationsEnabled", "1"),
                ("pruneImages", "0"),
            ];
            for (key, value) in defaults {
                sqlx::query("INSERT OR IGNORE INTO settings (key, value) VALUES ($1, $2)")
                    .bind(key)
                    .bind(value)
                    .execute(&self.pool)
                    .await?;
            }
        }

        let count: i64 = sqlx::query("SELECT COUNT(*) AS c FROM notification_platforms")
            .fetch_one(&self.pool)
            .await?
            .try_get("c")?;
        if count == 0 {
            for (name, kind) in DEFAULT_PLATFORMS {
                sqlx::query("INSERT INTO notification_platforms (name, type) VALUES ($1, $2)")
                    .bind(name)
                    .bind(kind)
                    .execute(&self.pool)
                    .await?;
            }
        }

        let count: i64 = sqlx::query("SELECT COUNT(*) AS c FROM notification_triggers")
            .fetch_one(&self.pool)
            .await?
            .try_get("c")?;
        if count == 0 {
            for name in DEFAULT_TRIGGERS {
                sqlx::query("INSERT INTO notification_triggers (name) VALUES ($1)")
                    .bind(name)
                    .execute(&self.pool)
                    .await?;
            }
        }
        Ok(())
    }

    // --- Container settings ---

    pub async fn add_container(
        &self,
        hash: &str,
        patch: &ContainerSettingsPatch,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO containers
                (hash, updates, frequency, restartUnhealthy, disableNotifications, shutdownDelay, shutdownDelaySeconds)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(hash)
        .bind(patch.updates.unwrap_or(0))
        .bind(patch.frequency.clone().unwrap_or_default())
        .bind(patch.restart_unhealthy.unwrap_or(0))
        .bind(patch.disable_notifications.unwrap_or(0))
        .bind(patch.shutdown_delay.unwrap_or(0))
        .bind(patch.shutdown_delay_seconds.unwrap_or(0))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Apply only the fields present in the patch. Returns false when the
    /// patch is empty and nothing was written.
    pub async fn update_container(
        &self,
        hash: &str,
        patch: &ContainerSettingsPatch,
    ) -> anyhow::Result<bool> {
        if patch.is_empty() {
            return Ok(false);
        }
        let mut qb = sqlx::QueryBuilder::<sqlx::Sqlite>::new("UPDATE containers SET ");
        let mut sep = qb.separated(", ");
        if let Some(updates) = patch.updates {
            sep.push("updates = ").push_bind_unseparated(updates);
        }
        if let Some(frequency) = &patch.frequency {
            sep.push("frequency = ").push_bind_unseparated(frequency);
        }
        if let Some(v) = patch.restart_unhealthy {
            sep.push("restartUnhealthy = ").push_bind_unseparated(v);
        }
        if let Some(v) = patch.disable_notifications {
            sep.push("disableNotifications = ").push_bind_unseparated(v);
        }
        if let Some(v) = patch.shutdown_delay {
            sep.push("shutdownDelay = ").push_bind_unseparated(v);
        }
        if let Some(v) = patch.shutdown_delay_seconds {
            sep.push("shutdownDelaySeconds = ").push_bind_unseparated(v);
        }
        qb.push(" WHERE hash = ").push_bind(hash);
        qb.build().execute(&self.pool).await?;
        Ok(true)
    }

    pub async fn container_by_hash(&self, hash: &str) -> anyhow::Result<Option<ContainerSettings>> {
        Ok(
            sqlx::query_as::<_, ContainerSettings>("SELECT * FROM containers WHERE hash = $1")
                .bind(hash)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    pub async fn containers(&self) -> anyhow::Result<Vec<ContainerSettings>> {
        Ok(
            sqlx::query_as::<_, ContainerSettings>("SELECT * FROM containers ORDER BY id")
                .fetch_all(&self.pool)
                .await?,
        )
    }

    // --- Groups ---

    pub async fn add_group(&self, name: &str) -> anyhow::Result<i64> {
        let result = sqlx::query("INSERT INTO groups_ (name) VALUES ($1)")
            .bind(name)
            .execute(&self.pool)
            .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn delete_group(&self, id: i64) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM groups_ WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn rename_group(&self, id: i64, name: &str) -> anyhow::Result<()> {
        sqlx::query("UPDATE groups_ SET name = $1 WHERE id = $2")
            .bind(name)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn group_by_id(&self, id: i64) -> anyhow::Result<Option<Group>> {
        Ok(
            sqlx::query_as::<_, Group>("SELECT * FROM groups_ WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    pub async fn groups(&self) -> anyhow::Result<Vec<Group>> {
        Ok(sqlx::query_as::<_, Group>("SELECT * FROM groups_ ORDER BY id")
            .fetch_all(&self.pool)
            .await?)
    }

    pub async fn add_group_link(&self, group_id: i64, container_id: i64) -> anyhow::Result<()> {
        sqlx::query("INSERT INTO group_container_links (group_id, container_id) VALUES ($1, $2)")
            .bind(group_id)
            .bind(container_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn remove_group_link(&self, group_id: i64, container_id: i64) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM group_container_links WHERE group_id = $1 AND container_id = $2")
            .bind(group_id)
            .bind(container_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn containers_in_group(&self, group_id: i64) -> anyhow::Result<Vec<ContainerSettings>> {
        Ok(sqlx::query_as::<_, ContainerSettings>(
            r#"
            SELECT c.* FROM containers c
            JOIN group_container_links gcl ON c.id = gcl.container_id
            WHERE gcl.group_id = $1
            ORDER BY c.id
            "#,
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?)
    }

    pub async fn group_links(&self) -> anyhow::Result<Vec<GroupLink>> {
        Ok(
            sqlx::query_as::<_, GroupLink>("SELECT * FROM group_container_links ORDER BY id")
                .fetch_all(&self.pool)
                .await?,
        )
    }

    // --- Notifications ---

    pub async fn notification_platforms(&self) -> anyhow::Result<Vec<NotificationPlatform>> {
        Ok(sqlx::query_as::<_, NotificationPlatform>(
            "SELECT * FROM notification_platforms ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    pub async fn notification_platform_by_id(
        &self,
        id: i64,
    ) -> anyhow::Result<Option<NotificationPlatform>> {
        Ok(sqlx::query_as::<_, NotificationPlatform>(
            "SELECT * FROM notification_platforms WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    pub async fn notification_triggers(&self) -> anyhow::Result<Vec<NotificationTrigger>> {
        Ok(sqlx::query_as::<_, NotificationTrigger>(
            "SELECT * FROM notification_triggers ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    pub async fn trigger_enabled(&self, id: i64) -> anyhow::Result<Option<i64>> {
        let row = sqlx::query("SELECT enabled FROM notification_triggers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => Ok(Some(row.try_get("enabled")?)),
            None => Ok(None),
        }
    }

    pub async fn add_notification_link(
        &self,
        platform_id: i64,
        trigger_ids: &serde_json::Value,
        platform_parameters: &serde_json::Value,
        sender_name: &str,
    ) -> anyhow::Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO notification_links (platform_id, trigger_ids, platform_parameters, sender_name)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(platform_id)
        .bind(trigger_ids.to_string())
        .bind(platform_parameters.to_string())
        .bind(sender_name)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn update_notification_link(
        &self,
        link_id: i64,
        platform_id: i64,
        trigger_ids: &serde_json::Value,
        platform_parameters: &serde_json::Value,
        sender_name: &str,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE notification_links
            SET platform_id = $1, trigger_ids = $2, platform_parameters = $3, sender_name = $4
            WHERE id = $5
            "#,
        )
        .bind(platform_id)
        .bind(trigger_ids.to_string())
        .bind(platform_parameters.to_string())
        .bind(sender_name)
        .bind(link_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn delete_notification_link(&self, link_id: i64) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM notification_links WHERE id = $1")
            .bind(link_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn notification_link_by_id(&self, id: i64) -> anyhow::Result<Option<NotificationLink>> {
        let row = sqlx::query("SELECT * FROM notification_links WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(parse_link_row).transpose()
    }

    pub async fn notification_link_by_sender(
        &self,
        sender_name: &str,
    ) -> anyhow::Result<Option<NotificationLink>> {
        let row = sqlx::query("SELECT * FROM notification_links WHERE sender_name = $1")
            .bind(sender_name)
            .fetch_optional(&self.pool)
            .await?;
        row.map(parse_link_row).transpose()
    }

    pub async fn notification_links(&self) -> anyhow::Result<Vec<NotificationLink>> {
        let rows = sqlx::query("SELECT * FROM notification_links ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(parse_link_row).collect()
    }

    // --- Migrations ---

    pub async fn migrations(&self) -> anyhow::Result<Vec<MigrationRow>> {
        Ok(
            sqlx::query_as::<_, MigrationRow>("SELECT * FROM migrations ORDER BY id")
                .fetch_all(&self.pool)
                .await?,
        )
    }

    // --- Servers ---

    pub async fn servers(&self) -> anyhow::Result<Vec<ServerEntry>> {
        Ok(sqlx::query_as::<_, ServerEntry>("SELECT * FROM servers ORDER BY id")
            .fetch_all(&self.pool)
            .await?)
    }

    /// Replace the full server list atomically.
    pub async fn replace_servers(
        &self,
        servers: &[(String, String, String)],
    ) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM servers").execute(&mut *tx).await?;
        for (name, host, api_key) in servers {
            sqlx::query("INSERT INTO servers (name, host, api_key) VALUES ($1, $2, $3)")
                .bind(name)
                .bind(host)
                .bind(api_key)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    // --- Settings ---

    pub async fn settings(&self) -> anyhow::Result<BTreeMap<String, String>> {
        let rows = sqlx::query("SELECT key, value FROM settings")
            .fetch_all(&self.pool)
            .await?;
        let mut out = BTreeMap::new();
        for row in rows {
            let key: String = row.try_get("key")?;
            let value: Option<String> = row.try_get("value")?;
            out.insert(key, value.unwrap_or_default());
        }
        Ok(out)
    }

    pub async fn upsert_setting(&self, key: &str, value: &str) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO settings (key, value) VALUES ($1, $2) ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn upsert_settings(&self, settings: &BTreeMap<String, String>) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await?;
        for (key, value) in settings {
            sqlx::query(
                "INSERT INTO settings (key, value) VALUES ($1, $2) ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            )
            .bind(key)
            .bind(value)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }
}

fn parse_link_row(row: SqliteRow) -> anyhow::Result<NotificationLink> {
    let trigger_ids: String = row.try_get("trigger_ids")?;
    let platform_parameters: String = row.try_get("platform_parameters")?;
    Ok(NotificationLink {
        id: row.try_get("id")?,
        platform_id: row.try_get("platform_id")?,
        trigger_ids: serde_json::from_str(&trigger_ids)
            .unwrap_or(serde_json::Value::Array(Vec::new())),
        platform_parameters: serde_json::from_str(&platform_parameters)
            .unwrap_or_else(|_| serde_json::json!({})),
        sender_name: row.try_get("sender_name")?,
    })
}
