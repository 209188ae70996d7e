//! Configuration types.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::catalog::default_database_path;

/// Default port for the HTTP server.
pub const DEFAULT_PORT: u16 = 3000;

/// Database path value that selects an in-memory store.
pub const IN_MEMORY_PATH: &str = ":memory:";

/// Top-level configuration loaded from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Storage and seeding settings.
    pub database: DatabaseConfig,
}

impl CatalogConfig {
    /// Anchor relative paths read from a config file at `base`.
    ///
    /// `:memory:` and absolute paths are left untouched.
    pub fn resolve_relative_to(&mut self, base: &Path) {
        let anchor = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        };
        anchor(&mut self.server.static_dir);
        if let Some(seed_file) = self.database.seed_file.as_mut() {
            anchor(seed_file);
        }
        if !self.database.is_in_memory() {
            if let Some(path) = self.database.path.as_mut() {
                anchor(path);
            }
        }
    }
}

/// Configuration for the HTTP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Whether to enable permissive CORS.
    pub cors_permissive: bool,
    /// Directory served for every path that is not an API route.
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            cors_permissive: true,
            static_dir: PathBuf::from("public"),
        }
    }
}

impl ServerConfig {
    /// Get the configured address as a string.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Configuration for the catalog database.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database file; `:memory:` selects an in-memory store.
    pub path: Option<PathBuf>,
    /// Seed an empty store before serving.
    pub seed_on_start: bool,
    /// TOML seed file used instead of the built-in catalog.
    pub seed_file: Option<PathBuf>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: None,
            seed_on_start: true,
            seed_file: None,
        }
    }
}

impl DatabaseConfig {
    /// The configured path, or the per-user default location.
    #[must_use]
    pub fn resolved_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(default_database_path)
    }

    /// Whether the store should live in memory only.
    #[must_use]
    pub fn is_in_memory(&self) -> bool {
        self.path
            .as_deref()
            .is_some_and(|p| p.as_os_str() == IN_MEMORY_PATH)
    }
}
