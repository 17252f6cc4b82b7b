//! User tables eligible for seeding.

use crate::error::CoreResult;
use crate::sql_utils::{ensure_single_line, quote_ident, quote_qualified};
use std::fmt;

/// Schema used when a seed file name carries no schema part.
pub const DEFAULT_SCHEMA: &str = "public";

/// Namespace holding the per-session staging tables.
pub const STAGING_NAMESPACE: &str = "pg_temp";

/// Schemas never seeded.
const SYSTEM_SCHEMAS: [&str; 2] = ["information_schema", "pg_catalog"];

/// A schema-qualified table
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TableInfo {
    pub schema: String,
    pub name: String,
}

impl TableInfo {
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
        }
    }

    /// Map a seed CSV file stem back to its table.
    ///
    /// The schema is everything before the first `.`; a stem without a dot
    /// targets [`DEFAULT_SCHEMA`]. Returns `None` for an empty stem or an
    /// empty part.
    pub fn from_seed_stem(stem: &str) -> Option<Self> {
        let (schema, name) = match stem.split_once('.') {
            Some((schema, name)) => (schema, name),
            None => (DEFAULT_SCHEMA, stem),
        };
        if schema.is_empty() || name.is_empty() {
            return None;
        }
        Some(Self::new(schema, name))
    }

    /// `"schema"."name"`
    pub fn quoted(&self) -> String {
        quote_qualified(&self.schema, &self.name)
    }

    /// `<schema>.<table>.csv`
    pub fn csv_file_name(&self) -> String {
        format!("{}.{}.csv", self.schema, self.name)
    }

    /// Session-temporary staging table, `pg_temp."seed.<schema>.<table>"`.
    ///
    /// The whole `seed.<schema>.<table>` string is one identifier, so it can
    /// never collide with a real table.
    pub fn staging_table(&self) -> String {
        format!(
            "{}.{}",
            STAGING_NAMESPACE,
            quote_ident(&format!("seed.{}.{}", self.schema, self.name))
        )
    }

    /// Fail unless both parts can be named on a psql meta-command line.
    pub fn ensure_single_line(&self) -> CoreResult<()> {
        ensure_single_line(&self.schema)?;
        ensure_single_line(&self.name)
    }

    /// Whether the table lives in a schema that may be seeded and is not
    /// the migration runner's bookkeeping table.
    pub fn is_eligible(&self, version_table: &str) -> bool {
        if SYSTEM_SCHEMAS.contains(&self.schema.as_str()) || self.schema.starts_with("pg_temp") {
            return false;
        }
        let bookkeeping = match version_table.split_once('.') {
            Some((schema, name)) => self.schema == schema && self.name == name,
            None => self.name == version_table,
        };
        !bookkeeping
    }
}

impl fmt::Display for TableInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.name)
    }
}
