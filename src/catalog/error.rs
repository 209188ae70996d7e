//! Catalog error types.

use std::path::PathBuf;

use super::types::EntityKind;

/// Errors that can occur while reading or seeding the catalog.
#[derive(thiserror::Error, Debug)]
pub enum CatalogError {
    /// The requested entity does not exist.
    #[error("{kind} not found: {key}")]
    NotFound { kind: EntityKind, key: String },

    /// Failed to open or create database.
    #[error("Failed to open database at {path}: {source}")]
    DatabaseOpen {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Failed to execute SQL.
    #[error("Database query failed: {0}")]
    Query(#[from] rusqlite::Error),

    /// No pooled read connection could be obtained.
    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// Seed data or a lookup key was rejected before touching the store.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Failed to read a seed file.
    #[error("Failed to read seed file {path}: {source}")]
    SeedRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse a seed file.
    #[error("Failed to parse seed data: {0}")]
    SeedParse(#[from] toml::de::Error),

    /// Blocking task was cancelled.
    #[error("Blocking task cancelled")]
    TaskCancelled,

    /// Failed to create parent directory.
    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CatalogError {
    pub(crate) fn not_found(kind: EntityKind, key: impl ToString) -> Self {
        Self::NotFound {
            kind,
            key: key.to_string(),
        }
    }

    /// Whether this error means the requested entity is absent.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Whether this error was caused by bad input rather than storage.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
