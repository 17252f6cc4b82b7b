//! su-db - External collaborator layer for Seedup
//!
//! This crate provides the traits business logic uses to reach external
//! programs (psql, goose, git, pg_dump, dbml) and their process-backed
//! implementations.

pub mod admin;
pub mod dbml;
pub mod error;
pub mod git;
pub mod goose;
pub mod pg_dump;
pub mod shell;
pub mod traits;
pub mod url;

#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;

pub use admin::DbAdmin;
pub use dbml::DbmlCli;
pub use error::{DbError, DbResult};
pub use git::GitCli;
pub use goose::GooseRunner;
pub use pg_dump::PgDump;
pub use shell::ShellExecutor;
pub use traits::{
    DocGenerator, DocOptions, Executor, MigrationRunner, SchemaDumper, VersionControl,
    SQL_FIELD_SEPARATOR,
};
pub use url::DatabaseUrl;
