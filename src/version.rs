// Build-time version from Cargo.toml

/// Package version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Package name (from Cargo.toml).
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// REST surface version, reported next to the package version by /api/server/ping.
pub const API_VERSION: &str = "1.0.0";

/// Version banner in the form "v{package} - v{api}".
pub fn banner() -> String {
    format!("v{} - v{}", VERSION, API_VERSION)
}
