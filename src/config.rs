use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub files: FilesConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    /// Host identifier attached to every enriched container view.
    #[serde(default = "default_server_name")]
    pub name: String,
    /// Key checked against the x-api-key header (or ?apikey=) on /api routes.
    pub api_key: String,
}

fn default_server_name() -> String {
    "local".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FilesConfig {
    /// Directory for the named JSON blob files.
    pub config_dir: String,
    /// Directory for the named .log streams.
    pub log_dir: String,
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(
            !self.server.api_key.is_empty(),
            "server.api_key must be non-empty"
        );
        anyhow::ensure!(
            !self.database.path.is_empty(),
            "database.path must be non-empty"
        );
        anyhow::ensure!(
            !self.files.config_dir.is_empty(),
            "files.config_dir must be non-empty"
        );
        anyhow::ensure!(
            !self.files.log_dir.is_empty(),
            "files.log_dir must be non-empty"
        );
        Ok(())
    }
}
