//! Seed restore: baseline migration, bulk load, remaining migrations

use crate::error::{SeedError, SeedResult};
use crate::script::{load_script, SeedFile};
use crate::seeder::{csv_files, Seeder};
use std::path::Path;
use su_core::TableInfo;

/// Outcome of a restore
#[derive(Debug, Default)]
pub struct ApplyReport {
    /// Tables loaded, in load order
    pub loaded: Vec<TableInfo>,
}

impl Seeder {
    /// Restore the seed set in `seed_dir` into a freshly created database.
    ///
    /// Applies the next pending migration (the flattened baseline the data
    /// was captured against), loads every CSV in one transaction, then
    /// applies the rest. Every file is validated before the database is
    /// touched. A failed load rolls back but leaves the baseline applied.
    pub async fn apply(
        &self,
        database_url: &str,
        migrations_dir: &Path,
        seed_dir: &Path,
    ) -> SeedResult<ApplyReport> {
        let files = read_seed_dir(seed_dir)?;
        let script = if files.is_empty() {
            None
        } else {
            Some(load_script(&files)?)
        };

        log::info!("Running initial migration...");
        self.runner.apply_next(database_url, migrations_dir).await?;

        match &script {
            None => log::info!("No CSV files in {}, nothing to load", seed_dir.display()),
            Some(script) => {
                log::info!("Loading {} seed files...", files.len());
                self.run_script(database_url, "seed-apply-", script).await?;
            }
        }

        log::info!("Running remaining migrations...");
        self.runner.apply_all(database_url, migrations_dir).await?;

        Ok(ApplyReport {
            loaded: files.into_iter().map(|f| f.table).collect(),
        })
    }
}

/// Validate every CSV in `seed_dir`. A missing directory is an empty set.
pub fn read_seed_dir(seed_dir: &Path) -> SeedResult<Vec<SeedFile>> {
    if !seed_dir.exists() {
        log::warn!(
            "Seed directory '{}' does not exist, treating it as empty",
            seed_dir.display()
        );
        return Ok(Vec::new());
    }
    csv_files(seed_dir)?
        .iter()
        .map(|path| read_seed_file(path))
        .collect()
}

/// Resolve the target table and first header column of one seed CSV.
pub fn read_seed_file(path: &Path) -> SeedResult<SeedFile> {
    let malformed = |reason: String| SeedError::MalformedSeedFile {
        path: path.display().to_string(),
        reason,
    };

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let table = TableInfo::from_seed_stem(&stem)
        .ok_or_else(|| malformed("file name must be <schema>.<table>.csv".to_string()))?;
    if table.ensure_single_line().is_err() {
        return Err(malformed("file name contains a line break".to_string()));
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| malformed(e.to_string()))?;
    let headers = reader.headers().map_err(|e| malformed(e.to_string()))?;
    let first_column = match headers.get(0) {
        None => return Err(malformed("missing header row".to_string())),
        Some(column) if column.trim().is_empty() => {
            return Err(malformed("first header column is empty".to_string()))
        }
        Some(column) => column.trim().to_string(),
    };

    let path = std::fs::canonicalize(path).map_err(|e| SeedError::io("Cannot resolve", path, e))?;

    Ok(SeedFile {
        table,
        path,
        first_column,
    })
}

#[cfg(test)]
#[path = "apply_test.rs"]
mod tests;
