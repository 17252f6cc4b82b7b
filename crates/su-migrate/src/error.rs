//! Error types for su-migrate

use std::fmt::Write;
use su_core::CoreError;
use su_db::DbError;
use thiserror::Error;

/// A branch-added migration that must be renamed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Remediation {
    /// Base name of the offending file
    pub file: String,
    /// Same slug under a fresh timestamp, distinct per offender
    pub suggested: String,
}

impl Remediation {
    /// Shell command performing the rename.
    pub fn git_mv(&self, dir: &str) -> String {
        format!("git mv {dir}/{} {dir}/{}", self.file, self.suggested)
    }
}

/// Migration tooling errors
#[derive(Error, Debug)]
pub enum MigrateError {
    /// M001: Branch-added migrations are not the newest in the directory
    #[error("[M001] {}", render_violation(.dir, .offenders))]
    OrderingViolation {
        dir: String,
        offenders: Vec<Remediation>,
    },

    /// M002: Nothing recorded as applied, so there is nothing to flatten
    #[error("[M002] No applied migrations found; run migrations before flattening")]
    NoAppliedMigrations,

    /// M003: A migration file could not be deleted
    #[error("[M003] Failed to remove migration file '{path}': {source}")]
    RemoveFile {
        path: String,
        source: std::io::Error,
    },

    /// M004: A migration file could not be written
    #[error("[M004] Failed to write migration file '{path}': {source}")]
    WriteFile {
        path: String,
        source: std::io::Error,
    },

    /// M005: Another migration already uses the version
    #[error("[M005] Migration version {version} is already used by '{existing}'")]
    DuplicateVersion { version: String, existing: String },

    /// M006: Migration name cannot form a valid file name
    #[error("[M006] Invalid migration name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    /// M007: Two migrations already in the directory share a version
    #[error("[M007] Migrations {} share version {version}; versions must be unique", .files.join(", "))]
    SharedVersion { version: String, files: Vec<String> },

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Db(#[from] DbError),
}

impl MigrateError {
    /// True when the caller aborted the operation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, MigrateError::Db(e) if e.is_cancelled())
    }
}

fn render_violation(dir: &str, offenders: &[Remediation]) -> String {
    let mut msg = String::from("New migrations must have the latest timestamps\n\nTo fix:\n");
    for offender in offenders {
        let _ = write!(msg, "\n  $ {}", offender.git_mv(dir));
    }
    msg
}

/// Result type alias for MigrateError
pub type MigrateResult<T> = Result<T, MigrateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_mv_keeps_slug() {
        let r = Remediation {
            file: "20240101120000_sneaky.sql".to_string(),
            suggested: "20240105000000_sneaky.sql".to_string(),
        };
        assert_eq!(
            r.git_mv("db/migrations"),
            "git mv db/migrations/20240101120000_sneaky.sql db/migrations/20240105000000_sneaky.sql"
        );
    }

    #[test]
    fn test_violation_message_lists_every_offender() {
        let err = MigrateError::OrderingViolation {
            dir: "migrations".to_string(),
            offenders: vec![
                Remediation {
                    file: "20240101120000_a.sql".to_string(),
                    suggested: "20240105000000_a.sql".to_string(),
                },
                Remediation {
                    file: "20231231000000_b.sql".to_string(),
                    suggested: "20240105000000_b.sql".to_string(),
                },
            ],
        };
        let msg = err.to_string();
        assert!(msg.starts_with("[M001] New migrations must have the latest timestamps"));
        assert!(msg.contains(
            "$ git mv migrations/20240101120000_a.sql migrations/20240105000000_a.sql"
        ));
        assert!(msg.contains("migrations/20231231000000_b.sql"));
    }

    #[test]
    fn test_shared_version_message() {
        let err = MigrateError::SharedVersion {
            version: "20240102000000".to_string(),
            files: vec!["20240102000000_a.sql".to_string(), "20240102000000_b.sql".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "[M007] Migrations 20240102000000_a.sql, 20240102000000_b.sql share version 20240102000000; versions must be unique"
        );
    }

    #[test]
    fn test_is_cancelled() {
        let err = MigrateError::from(DbError::Cancelled {
            command: "git fetch".to_string(),
        });
        assert!(err.is_cancelled());
        assert!(!MigrateError::NoAppliedMigrations.is_cancelled());
    }
}
