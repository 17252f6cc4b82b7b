//! su-migrate - Migration history tooling for Seedup
//!
//! Guards the ordering of migrations added on a branch, collapses applied
//! history into a single initial migration and authors new migration files.

pub mod check;
pub mod create;
pub mod error;
pub mod flatten;

pub use check::{CheckOutcome, OrderingChecker};
pub use create::create_migration;
pub use error::{MigrateError, MigrateResult, Remediation};
pub use flatten::{FlattenReport, Flattener};
