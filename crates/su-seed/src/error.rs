//! Error types for su-seed

use su_core::CoreError;
use su_db::DbError;
use su_migrate::MigrateError;
use thiserror::Error;

/// Seed pipeline errors
#[derive(Error, Debug)]
pub enum SeedError {
    /// S001: A seed CSV cannot be loaded
    #[error("[S001] Malformed seed file '{path}': {reason}")]
    MalformedSeedFile { path: String, reason: String },

    /// S002: Filesystem operation on seed data failed
    #[error("[S002] {action} '{path}': {source}")]
    Io {
        action: &'static str,
        path: String,
        source: std::io::Error,
    },

    /// S003: The seed query file exists but cannot be read
    #[error("[S003] Cannot read seed query file '{path}': {source}")]
    QueryFile {
        path: String,
        source: std::io::Error,
    },

    /// S004: Catalog listing returned rows in an unexpected shape
    #[error("[S004] Unexpected table listing row: '{row}'")]
    TableListing { row: String },

    #[error(transparent)]
    Migrate(#[from] MigrateError),

    #[error(transparent)]
    Db(#[from] DbError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl SeedError {
    pub(crate) fn io(action: &'static str, path: &std::path::Path, source: std::io::Error) -> Self {
        SeedError::Io {
            action,
            path: path.display().to_string(),
            source,
        }
    }

    /// True when the caller aborted the operation.
    pub fn is_cancelled(&self) -> bool {
        match self {
            SeedError::Migrate(e) => e.is_cancelled(),
            SeedError::Db(e) => e.is_cancelled(),
            _ => false,
        }
    }
}

/// Result type alias for SeedError
pub type SeedResult<T> = Result<T, SeedError>;
