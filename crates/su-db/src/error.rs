//! Error types for su-db

use thiserror::Error;

/// Failures talking to external tools and the database
#[derive(Error, Debug)]
pub enum DbError {
    /// X001: External command exited unsuccessfully
    #[error("[X001] `{command}` failed ({status}){}", stderr_suffix(.stderr))]
    ExternalProcess {
        command: String,
        status: String,
        stderr: String,
    },

    /// X002: Operation aborted by the caller
    #[error("[X002] Cancelled while running `{command}`")]
    Cancelled { command: String },

    /// X003: External command could not be started
    #[error("[X003] Failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    /// X004: Connection URL could not be understood
    #[error("[X004] Invalid database URL: {0}")]
    InvalidUrl(String),

    /// X005: Output of an external command could not be interpreted
    #[error("[X005] Unexpected output from `{command}`: {message}")]
    UnexpectedOutput { command: String, message: String },
}

impl DbError {
    /// True when the caller aborted the operation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DbError::Cancelled { .. })
    }
}

fn stderr_suffix(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {}", trimmed)
    }
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;
