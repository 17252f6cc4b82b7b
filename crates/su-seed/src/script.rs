//! psql scripts for extracting and loading seed data
//!
//! Both scripts run in a single psql session: staging tables are
//! session-temporary and the load relies on one transaction.

use std::fmt::Write;
use std::path::{Path, PathBuf};
use su_core::sql_utils::{quote_ident, quote_psql_arg};
use su_core::{CoreResult, TableInfo};

/// A validated seed CSV ready to load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedFile {
    pub table: TableInfo,
    /// Absolute path, so the script is independent of psql's working directory
    pub path: PathBuf,
    /// First header column, touched after loading to re-check constraints
    pub first_column: String,
}

/// Script copying every table through its staging table into `output_dir`.
///
/// Staging tables start empty; `query` is expected to fill them. Fails when
/// a table name or the output path would break a meta-command line.
pub fn extract_script(
    tables: &[TableInfo],
    query: Option<&str>,
    output_dir: &Path,
) -> CoreResult<String> {
    let mut script = String::new();

    for table in tables {
        table.ensure_single_line()?;
        let _ = writeln!(
            script,
            "CREATE TEMP TABLE {} (LIKE {} INCLUDING ALL);",
            table.staging_table(),
            table.quoted()
        );
    }

    if let Some(query) = query {
        script.push('\n');
        script.push_str(query);
        script.push('\n');
    }

    for table in tables {
        let csv_path = output_dir.join(table.csv_file_name());
        let _ = writeln!(
            script,
            "\\copy {} TO {} CSV HEADER",
            table.staging_table(),
            quote_psql_arg(&csv_path.to_string_lossy())?
        );
        let _ = writeln!(
            script,
            "\\echo {}",
            quote_psql_arg(&format!("Exported {}", table))?
        );
    }

    Ok(script)
}

/// Script loading every file in one transaction with triggers and foreign
/// keys suspended, then re-validating each table once they are back on.
pub fn load_script(files: &[SeedFile]) -> CoreResult<String> {
    let mut script = String::from("BEGIN;\nSET session_replication_role = 'replica';\n");

    for file in files {
        file.table.ensure_single_line()?;
        let _ = writeln!(
            script,
            "\\copy {} FROM {} WITH CSV HEADER",
            file.table.quoted(),
            quote_psql_arg(&file.path.to_string_lossy())?
        );
    }

    script.push_str("SET session_replication_role = 'origin';\n");

    for file in files {
        let column = quote_ident(&file.first_column);
        let _ = writeln!(
            script,
            "UPDATE {} SET {} = {};",
            file.table.quoted(),
            column,
            column
        );
    }

    script.push_str("COMMIT;\n");
    Ok(script)
}
