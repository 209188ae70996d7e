//! Locating and reading the catalog config file.

use std::path::{Path, PathBuf};

use super::types::CatalogConfig;

/// Environment variable naming a config file to use before the search paths.
pub const CONFIG_ENV: &str = "ROLE_CATALOG_CONFIG";

/// File name looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = ".role-catalog.toml";

/// Where the configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// A file given explicitly; it must exist.
    Explicit(PathBuf),
    /// The first existing file among candidate locations.
    Search(Vec<PathBuf>),
}

/// A parsed configuration and the file it was read from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: CatalogConfig,
    /// `None` when no file was found and defaults apply.
    pub file: Option<PathBuf>,
}

/// Resolves a [`CatalogConfig`] from an explicit file or the usual locations.
#[derive(Debug)]
pub struct ConfigLoader {
    source: ConfigSource,
}

impl ConfigLoader {
    /// Search `$ROLE_CATALOG_CONFIG`, then `./.role-catalog.toml`, then
    /// `<config_dir>/role-catalog/config.toml`.
    #[must_use]
    pub fn new() -> Self {
        Self::searching(std::env::var_os(CONFIG_ENV).map(PathBuf::from))
    }

    fn searching(env_path: Option<PathBuf>) -> Self {
        let candidates = env_path
            .into_iter()
            .chain(std::iter::once(PathBuf::from(LOCAL_CONFIG_FILE)))
            .chain(dirs::config_dir().map(|dir| dir.join("role-catalog").join("config.toml")))
            .collect();
        Self {
            source: ConfigSource::Search(candidates),
        }
    }

    /// Load exactly `path`. A missing file is an error rather than a fallback
    /// to defaults.
    #[must_use]
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            source: ConfigSource::Explicit(path),
        }
    }

    #[must_use]
    pub fn source(&self) -> &ConfigSource {
        &self.source
    }

    /// The file [`load`](Self::load) would read, if any.
    #[must_use]
    pub fn find_config_file(&self) -> Option<PathBuf> {
        match &self.source {
            ConfigSource::Explicit(path) => Some(path.clone()),
            ConfigSource::Search(candidates) => candidates.iter().find(|p| p.is_file()).cloned(),
        }
    }

    /// Read and parse the config file.
    ///
    /// Relative paths inside the file are anchored at the file's directory.
    /// Defaults are returned when searching finds nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the chosen file cannot be read or parsed.
    pub fn load(&self) -> Result<LoadedConfig, ConfigError> {
        let Some(file) = self.find_config_file() else {
            tracing::debug!("No config file found, using defaults");
            return Ok(LoadedConfig {
                config: CatalogConfig::default(),
                file: None,
            });
        };

        let config = read_config(&file)?;
        tracing::debug!(path = %file.display(), "Loaded config file");
        Ok(LoadedConfig {
            config,
            file: Some(file),
        })
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn read_config(file: &Path) -> Result<CatalogConfig, ConfigError> {
    let content = std::fs::read_to_string(file).map_err(|source| ConfigError::ReadError {
        path: file.to_path_buf(),
        source,
    })?;
    let mut config: CatalogConfig =
        toml::from_str(&content).map_err(|source| ConfigError::ParseError {
            path: file.to_path_buf(),
            source,
        })?;

    if let Some(dir) = file.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        config.resolve_relative_to(dir);
    }
    Ok(config)
}

/// Errors that can occur during configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
}
