//! su-seed - Seed snapshot and restore pipelines for Seedup
//!
//! A seed set is a directory of `<schema>.<table>.csv` files captured from a
//! live database through session-temporary staging tables, optionally
//! curated by a `<name>.sql` query file, and replayed into a fresh database
//! between the baseline migration and the rest.

pub mod apply;
pub mod create;
pub mod error;
pub mod script;
mod seeder;

pub use apply::ApplyReport;
pub use create::{CreateOptions, CreateReport};
pub use error::{SeedError, SeedResult};
pub use script::SeedFile;
pub use seeder::Seeder;
