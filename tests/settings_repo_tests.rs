// SQLite settings store tests against a temp database

use dockhand::models::ContainerSettingsPatch;
use dockhand::settings_repo::SettingsRepo;

async fn repo() -> (tempfile::TempDir, SettingsRepo) {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("agent.db");
    let repo = SettingsRepo::connect(path.to_str().expect("utf8 path"))
        .await
        .expect("connect");
    repo.init("testkey").await.expect("init");
    (dir, repo)
}

#[tokio::test]
async fn init_seeds_defaults_and_is_idempotent() {
    let (_dir, repo) = repo().await;

    let settings = repo.settings().await.expect("settings");
    assert_eq!(settings.get("apiKey").map(String::as_str), Some("testkey"));
    assert_eq!(settings.get("theme").map(String::as_str), Some("dark"));
    assert_eq!(settings.get("autoUpdate").map(String::as_str), Some("0"));

    let platforms = repo.notification_platforms().await.expect("platforms");
    assert_eq!(platforms.len(), 8);
    assert!(platforms.iter().any(|p| p.kind == "discord"));

    let triggers = repo.notification_triggers().await.expect("triggers");
    assert_eq!(triggers.len(), 6);
    assert!(triggers.iter().all(|t| t.enabled == 1));

    // Second init must not duplicate seeds.
    repo.init("testkey").await.expect("re-init");
    assert_eq!(repo.notification_platforms().await.expect("platforms").len(), 8);
    assert_eq!(repo.notification_triggers().await.expect("triggers").len(), 6);

    let migrations = repo.migrations().await.expect("migrations");
    assert_eq!(migrations.len(), 1);
    assert_eq!(migrations[0].name, "001_initial_schema");
}

#[tokio::test]
async fn container_settings_roundtrip_and_patch() {
    let (_dir, repo) = repo().await;

    let patch = ContainerSettingsPatch {
        updates: Some(1),
        frequency: Some("*/30 * * * *".to_string()),
        ..Default::default()
    };
    repo.add_container("abc123", &patch).await.expect("add");

    let row = repo
        .container_by_hash("abc123")
        .await
        .expect("query")
        .expect("row");
    assert_eq!(row.updates, 1);
    assert_eq!(row.frequency, "*/30 * * * *");
    assert_eq!(row.restart_unhealthy, 0);

    // Empty patch writes nothing.
    let applied = repo
        .update_container("abc123", &ContainerSettingsPatch::default())
        .await
        .expect("update");
    assert!(!applied);

    let applied = repo
        .update_container(
            "abc123",
            &ContainerSettingsPatch {
                restart_unhealthy: Some(1),
                shutdown_delay_seconds: Some(30),
                ..Default::default()
            },
        )
        .await
        .expect("update");
    assert!(applied);

    let row = repo
        .container_by_hash("abc123")
        .await
        .expect("query")
        .expect("row");
    assert_eq!(row.restart_unhealthy, 1);
    assert_eq!(row.shutdown_delay_seconds, 30);
    // Untouched fields keep their values.
    assert_eq!(row.updates, 1);

    assert!(repo.container_by_hash("missing").await.expect("query").is_none());
    assert_eq!(repo.containers().await.expect("all").len(), 1);
}

#[tokio::test]
async fn groups_and_links() {
    let (_dir, repo) = repo().await;

    repo.add_container("c1", &ContainerSettingsPatch::default())
        .await
        .expect("add container");
    let container = repo
        .container_by_hash("c1")
        .await
        .expect("query")
        .expect("row");

    let group_id = repo.add_group("media").await.expect("add group");
    assert!(group_id > 0);
    repo.rename_group(group_id, "media-stack").await.expect("rename");
    let group = repo.group_by_id(group_id).await.expect("query").expect("group");
    assert_eq!(group.name, "media-stack");

    repo.add_group_link(group_id, container.id).await.expect("link");
    let members = repo.containers_in_group(group_id).await.expect("members");
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].hash, "c1");
    assert_eq!(repo.group_links().await.expect("links").len(), 1);

    repo.remove_group_link(group_id, container.id)
        .await
        .expect("unlink");
    assert!(repo.containers_in_group(group_id).await.expect("members").is_empty());

    repo.delete_group(group_id).await.expect("delete");
    assert!(repo.group_by_id(group_id).await.expect("query").is_none());
}

#[tokio::test]
async fn notification_links_store_json_payloads() {
    let (_dir, repo) = repo().await;

    let platforms = repo.notification_platforms().await.expect("platforms");
    let platform_id = platforms[0].id;

    let triggers = serde_json::json!([1, 2, 3]);
    let params = serde_json::json!({ "webhook": "https://example.test/hook" });
    let link_id = repo
        .add_notification_link(platform_id, &triggers, &params, "homelab")
        .await
        .expect("add link");

    let link = repo
        .notification_link_by_id(link_id)
        .await
        .expect("query")
        .expect("link");
    assert_eq!(link.platform_id, platform_id);
    assert_eq!(link.trigger_ids, triggers);
    assert_eq!(link.platform_parameters, params);
    assert_eq!(link.sender_name, "homelab");

    let by_name = repo
        .notification_link_by_sender("homelab")
        .await
        .expect("query")
        .expect("link");
    assert_eq!(by_name.id, link_id);

    repo.update_notification_link(
        link_id,
        platform_id,
        &serde_json::json!([4]),
        &serde_json::json!({}),
        "renamed",
    )
    .await
    .expect("update");
    let link = repo
        .notification_link_by_id(link_id)
        .await
        .expect("query")
        .expect("link");
    assert_eq!(link.sender_name, "renamed");
    assert_eq!(link.trigger_ids, serde_json::json!([4]));

    assert_eq!(repo.notification_links().await.expect("all").len(), 1);
    repo.delete_notification_link(link_id).await.expect("delete");
    assert!(repo.notification_link_by_id(link_id).await.expect("query").is_none());
}

#[tokio::test]
async fn trigger_enabled_lookup() {
    let (_dir, repo) = repo().await;
    let triggers = repo.notification_triggers().await.expect("triggers");
    assert_eq!(
        repo.trigger_enabled(triggers[0].id).await.expect("query"),
        Some(1)
    );
    assert_eq!(repo.trigger_enabled(9999).await.expect("query"), None);
}

#[tokio::test]
async fn servers_replace_whole_list() {
    let (_dir, repo) = repo().await;
    assert!(repo.servers().await.expect("servers").is_empty());

    repo.replace_servers(&[
        ("one".to_string(), "http://a".to_string(), "k1".to_string()),
        ("two".to_string(), "http://b".to_string(), "k2".to_string()),
    ])
    .await
    .expect("replace");
    assert_eq!(repo.servers().await.expect("servers").len(), 2);

    repo.replace_servers(&[(
        "three".to_string(),
        "http://c".to_string(),
        "k3".to_string(),
    )])
    .await
    .expect("replace");
    let servers = repo.servers().await.expect("servers");
    assert_eq!(servers.len(), 1);
    assert_eq!(servers[0].name, "three");
}

#[tokio::test]
async fn settings_upserts() {
    let (_dir, repo) = repo().await;
    repo.upsert_setting("theme", "light").await.expect("upsert");
    assert_eq!(
        repo.settings().await.expect("settings").get("theme").map(String::as_str),
        Some("light")
    );

    let mut batch = std::collections::BTreeMap::new();
    batch.insert("theme".to_string(), "dark".to_string());
    batch.insert("newKey".to_string(), "42".to_string());
    repo.upsert_settings(&batch).await.expect("batch upsert");
    let settings = repo.settings().await.expect("settings");
    assert_eq!(settings.get("theme").map(String::as_str), Some("dark"));
    assert_eq!(settings.get("newKey").map(String::as_str), Some("42"));
}
