//! Error types for su-core

use thiserror::Error;

/// Core error type for Seedup
#[derive(Error, Debug)]
pub enum CoreError {
    /// C001: A migration or seed directory could not be enumerated
    #[error("[C001] Cannot read directory '{path}': {source}")]
    DirectoryError {
        path: String,
        source: std::io::Error,
    },

    /// C002: File name does not follow `<14-digit-version>_<slug>.sql`
    #[error("[C002] Invalid migration file name '{name}': expected <YYYYMMDDHHMMSS>_<slug>.sql")]
    InvalidMigrationName { name: String },

    /// C003: Version string is not a 14-digit timestamp
    #[error("[C003] Invalid migration version '{version}': expected 14 digits")]
    InvalidVersion { version: String },

    /// C004: Configuration file not found
    #[error("[C004] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// C005: Invalid configuration value
    #[error("[C005] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// C006: IO error with file path context
    #[error("[C006] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// C007: YAML parse error
    #[error("[C007] Config parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// C008: Text bound for a psql meta-command line spans several lines
    #[error("[C008] {value:?} contains a line break and cannot appear in a psql meta-command")]
    LineBreakInMetaCommand { value: String },
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
