//! Collaborator traits
//!
//! Business logic talks to external programs only through these traits.
//! Each has one shell-backed implementation in this crate and a fake in
//! [`crate::test_utils`].

use crate::error::DbResult;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use su_core::AppliedVersion;

/// Runs external commands.
///
/// Implementations must honor cancellation: a cancelled call returns
/// [`DbError::Cancelled`](crate::DbError::Cancelled) and leaves no child
/// process running.
#[async_trait]
pub trait Executor: Send + Sync {
    /// Run a command, streaming its stdout to the terminal
    async fn run(&self, program: &str, args: &[String]) -> DbResult<()>;

    /// Run a command and return its captured stdout
    async fn run_with_output(&self, program: &str, args: &[String]) -> DbResult<String>;

    /// Run a command feeding `stdin` to its standard input
    async fn run_with_stdin(&self, program: &str, args: &[String], stdin: &[u8]) -> DbResult<()>;

    /// Run one SQL statement and return tuples-only output, one row per
    /// line, columns separated by [`SQL_FIELD_SEPARATOR`]
    async fn run_sql(&self, database_url: &str, sql: &str) -> DbResult<String>;

    /// Run a SQL script file, stopping at the first error
    async fn run_sql_file(&self, database_url: &str, path: &Path) -> DbResult<()>;
}

/// Column separator in [`Executor::run_sql`] output.
pub const SQL_FIELD_SEPARATOR: char = '\t';

/// The external migration runner
#[async_trait]
pub trait MigrationRunner: Send + Sync {
    /// Apply every pending migration
    async fn apply_all(&self, database_url: &str, migrations_dir: &Path) -> DbResult<()>;

    /// Apply the next pending migration only
    async fn apply_next(&self, database_url: &str, migrations_dir: &Path) -> DbResult<()>;

    /// Roll back the most recently applied migration
    async fn rollback_last(&self, database_url: &str, migrations_dir: &Path) -> DbResult<()>;

    /// Print migration status
    async fn status(&self, database_url: &str, migrations_dir: &Path) -> DbResult<()>;

    /// Versions recorded as applied, ascending
    async fn applied_versions(&self, database_url: &str) -> DbResult<Vec<AppliedVersion>>;

    /// Bookkeeping table name, possibly schema-qualified
    fn version_table(&self) -> &str;
}

/// The version-control tool
#[async_trait]
pub trait VersionControl: Send + Sync {
    /// Refresh the remote-tracking reference of `branch`
    async fn fetch(&self, branch: &str) -> DbResult<()>;

    /// Paths matching `pattern` added between the remote `branch` and the
    /// working tree
    async fn added_files(&self, branch: &str, pattern: &str) -> DbResult<Vec<PathBuf>>;

    /// Whether the current directory is inside a repository
    async fn is_repository(&self) -> bool;
}

/// Produces a structure-only dump of a live database
#[async_trait]
pub trait SchemaDumper: Send + Sync {
    /// Dump schema without data, owners or privileges, skipping
    /// `exclude_tables` (schema-qualified names)
    async fn dump_schema(&self, database_url: &str, exclude_tables: &[String]) -> DbResult<String>;
}

/// Options for schema documentation
#[derive(Debug, Clone, Default)]
pub struct DocOptions {
    /// Output file; stdout when `None`
    pub output: Option<PathBuf>,
    /// Schemas to include; the generator's default when empty
    pub schemas: Vec<String>,
    pub exclude_tables: Vec<String>,
    /// Include every non-system schema, overriding `schemas`
    pub all_schemas: bool,
}

/// Generates schema documentation from a live database
#[async_trait]
pub trait DocGenerator: Send + Sync {
    async fn generate(&self, database_url: &str, options: &DocOptions) -> DbResult<()>;
}
