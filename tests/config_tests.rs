// Config loading and validation tests

use dockhand::config::AppConfig;

const VALID_CONFIG: &str = r#"
[server]
port = 9999
host = "0.0.0.0"
name = "local"
api_key = "secret"

[database]
path = "config/agent.db"

[files]
config_dir = "config"
log_dir = "config/logs"
"#;

#[test]
fn test_config_loads_from_str() {
    let config = AppConfig::load_from_str(VALID_CONFIG).expect("load_from_str");
    assert_eq!(config.server.port, 9999);
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.name, "local");
    assert_eq!(config.server.api_key, "secret");
    assert_eq!(config.database.path, "config/agent.db");
    assert_eq!(config.files.config_dir, "config");
    assert_eq!(config.files.log_dir, "config/logs");
}

#[test]
fn test_config_server_name_defaults_to_local() {
    let without_name = VALID_CONFIG.replace("name = \"local\"\n", "");
    let config = AppConfig::load_from_str(&without_name).expect("load_from_str");
    assert_eq!(config.server.name, "local");
}

#[test]
fn test_config_validation_rejects_invalid_port() {
    let bad = VALID_CONFIG.replace("port = 9999", "port = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("server.port"));
}

#[test]
fn test_config_validation_rejects_empty_api_key() {
    let bad = VALID_CONFIG.replace("api_key = \"secret\"", "api_key = \"\"");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("server.api_key"));
}

#[test]
fn test_config_validation_rejects_empty_db_path() {
    let bad = VALID_CONFIG.replace("path = \"config/agent.db\"", "path = \"\"");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("database.path"));
}

#[test]
fn test_config_validation_rejects_empty_config_dir() {
    let bad = VALID_CONFIG.replace("config_dir = \"config\"", "config_dir = \"\"");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("files.config_dir"));
}

#[test]
fn test_config_validation_rejects_empty_log_dir() {
    let bad = VALID_CONFIG.replace("log_dir = \"config/logs\"", "log_dir = \"\"");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("files.log_dir"));
}

#[test]
fn test_config_rejects_missing_section() {
    let bad = VALID_CONFIG.replace("[files]", "[other]");
    assert!(AppConfig::load_from_str(&bad).is_err());
}
