//! Seed snapshot: export curated table data and rebaseline migrations

use crate::error::{SeedError, SeedResult};
use crate::script::extract_script;
use crate::seeder::{csv_files, Seeder};
use std::path::{Path, PathBuf};
use su_core::migration::file_name;
use su_core::TableInfo;
use su_db::SQL_FIELD_SEPARATOR;
use su_migrate::{FlattenReport, Flattener};

/// User tables, system and temporary schemas excluded.
pub const TABLES_SQL: &str = "SELECT schemaname, tablename \
FROM pg_catalog.pg_tables \
WHERE schemaname NOT IN ('information_schema', 'pg_catalog') \
AND schemaname NOT LIKE 'pg\\_temp%' \
ORDER BY schemaname, tablename";

#[derive(Debug, Clone, Copy, Default)]
pub struct CreateOptions {
    /// Run the extraction but leave seed and migration files untouched
    pub dry_run: bool,
}

/// Outcome of a snapshot
#[derive(Debug)]
pub struct CreateReport {
    pub tables: Vec<TableInfo>,
    /// CSV file names produced by the extraction
    pub files: Vec<String>,
    /// `None` on a dry run
    pub flatten: Option<FlattenReport>,
}

impl Seeder {
    /// Snapshot the database into `seed_dir` and flatten `migrations_dir`.
    ///
    /// Every eligible table gets an empty session-temporary staging copy;
    /// `query_file` fills them, and whatever they hold is exported. Export
    /// goes to a scratch directory first, so a failed extraction leaves the
    /// existing seed set as it was.
    pub async fn create(
        &self,
        database_url: &str,
        migrations_dir: &Path,
        seed_dir: &Path,
        query_file: Option<&Path>,
        options: CreateOptions,
    ) -> SeedResult<CreateReport> {
        log::info!("Preparing seed directory {}", seed_dir.display());
        std::fs::create_dir_all(seed_dir)
            .map_err(|e| SeedError::io("Cannot create seed directory", seed_dir, e))?;

        let tables = self.list_tables(database_url).await?;
        log::info!("Found {} tables to export", tables.len());

        let query = read_query_file(query_file)?;
        let scratch = tempfile::Builder::new()
            .prefix("seedup-seed-")
            .tempdir()
            .map_err(|e| SeedError::io("Cannot create scratch directory in", &std::env::temp_dir(), e))?;

        let script = extract_script(&tables, query.as_deref(), scratch.path())?;
        log::info!("Exporting {} tables...", tables.len());
        self.run_script(database_url, "seed-create-", &script).await?;

        let exported = csv_files(scratch.path())?;
        let files = exported.iter().map(|p| file_name(p)).collect();

        if options.dry_run {
            log::info!("Dry run, leaving seed and migration files untouched");
            return Ok(CreateReport {
                tables,
                files,
                flatten: None,
            });
        }

        log::info!("Flattening migrations...");
        let flattener = Flattener::new(self.runner.clone(), self.dumper.clone());
        let flatten = flattener.flatten(database_url, migrations_dir).await?;

        log::info!("Replacing seed files in {}", seed_dir.display());
        replace_seed_files(seed_dir, &exported)?;

        Ok(CreateReport {
            tables,
            files,
            flatten: Some(flatten),
        })
    }

    async fn list_tables(&self, database_url: &str) -> SeedResult<Vec<TableInfo>> {
        let output = self.exec.run_sql(database_url, TABLES_SQL).await?;
        let version_table = self.runner.version_table();

        let mut tables = Vec::new();
        for row in output.lines().filter(|l| !l.trim().is_empty()) {
            let Some((schema, name)) = row.split_once(SQL_FIELD_SEPARATOR) else {
                return Err(SeedError::TableListing {
                    row: row.to_string(),
                });
            };
            let table = TableInfo::new(schema.trim(), name.trim());
            table.ensure_single_line()?;
            if table.is_eligible(version_table) {
                tables.push(table);
            } else {
                log::debug!("Skipping {}", table);
            }
        }
        Ok(tables)
    }
}

/// Contents of the query file; a missing file only warrants a warning.
fn read_query_file(query_file: Option<&Path>) -> SeedResult<Option<String>> {
    let Some(path) = query_file else {
        return Ok(None);
    };
    match std::fs::read_to_string(path) {
        Ok(query) => Ok(Some(query)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::warn!(
                "Seed query file '{}' not found, exporting empty staging tables",
                path.display()
            );
            Ok(None)
        }
        Err(e) => Err(SeedError::QueryFile {
            path: path.display().to_string(),
            source: e,
        }),
    }
}

/// Replace the CSVs in `seed_dir` with `new_files`.
///
/// New files are copied into a staging directory inside `seed_dir` first and
/// renamed into place after the old set is removed, so a failed copy leaves
/// the old set intact.
fn replace_seed_files(seed_dir: &Path, new_files: &[PathBuf]) -> SeedResult<()> {
    let staging = tempfile::Builder::new()
        .prefix(".seedup-staging-")
        .tempdir_in(seed_dir)
        .map_err(|e| SeedError::io("Cannot create staging directory in", seed_dir, e))?;

    let mut staged = Vec::with_capacity(new_files.len());
    for source in new_files {
        let name = file_name(source);
        let dest = staging.path().join(&name);
        std::fs::copy(source, &dest).map_err(|e| SeedError::io("Cannot copy", source, e))?;
        staged.push((dest, seed_dir.join(name)));
    }

    for old in csv_files(seed_dir)? {
        std::fs::remove_file(&old).map_err(|e| SeedError::io("Cannot remove", &old, e))?;
        log::info!("Removed {}", old.display());
    }

    for (from, to) in &staged {
        std::fs::rename(from, to).map_err(|e| SeedError::io("Cannot move seed file to", to, e))?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "create_test.rs"]
mod tests;
