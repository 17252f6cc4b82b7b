//! su-core - Core library for Seedup
//!
//! Shared domain model: migration versions and files, the migrations
//! directory listing, seedable tables, SQL quoting and project configuration.

pub mod config;
pub mod error;
pub mod migration;
pub mod names;
mod newtype_string;
pub mod sql_utils;
pub mod table;
pub mod version;

pub use config::{Config, ToolsConfig};
pub use error::{CoreError, CoreResult};
pub use migration::{list_all, MigrationFile};
pub use names::{AppliedVersion, BaseBranch, SeedName};
pub use table::TableInfo;
pub use version::MigrationVersion;
