//! Collapse applied migration history into one initial migration

use crate::error::{MigrateError, MigrateResult};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use su_core::table::DEFAULT_SCHEMA;
use su_db::{MigrationRunner, SchemaDumper};

/// Goose annotations wrapping the dumped schema.
const UP_HEADER: &str = "-- +goose Up\n-- +goose StatementBegin\n";
const UP_FOOTER: &str = "\n-- +goose StatementEnd\n";

/// Slug of the generated migration.
pub const INITIAL_SLUG: &str = "initial";

/// What a flatten changed on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlattenReport {
    /// Number of versions recorded as applied
    pub applied: usize,
    /// Migration files deleted, in deletion order
    pub removed: Vec<PathBuf>,
    /// The generated `<latest>_initial.sql`
    pub written: PathBuf,
}

pub struct Flattener {
    runner: Arc<dyn MigrationRunner>,
    dumper: Arc<dyn SchemaDumper>,
}

impl Flattener {
    pub fn new(runner: Arc<dyn MigrationRunner>, dumper: Arc<dyn SchemaDumper>) -> Self {
        Self { runner, dumper }
    }

    /// Replace every applied migration in `migrations_dir` with a single
    /// migration holding the live schema, versioned as the latest applied
    /// version.
    ///
    /// The new file is staged in the same directory before any deletion and
    /// renamed into place last, so a failed dump or write leaves the history
    /// untouched. A crash between the deletions and the rename is not
    /// recoverable from here.
    pub async fn flatten(
        &self,
        database_url: &str,
        migrations_dir: &Path,
    ) -> MigrateResult<FlattenReport> {
        let versions = self.runner.applied_versions(database_url).await?;
        let Some(latest) = versions.last() else {
            return Err(MigrateError::NoAppliedMigrations);
        };
        log::info!(
            "{} applied migrations, latest {}",
            versions.len(),
            latest
        );

        log::info!("Dumping schema...");
        let dump = self
            .dumper
            .dump_schema(database_url, &self.excluded_tables())
            .await?;
        let contents = initial_migration(&clean_schema_dump(&dump));

        let written = migrations_dir.join(format!("{}_{}.sql", latest, INITIAL_SLUG));
        let staged = stage(migrations_dir, &contents)?;

        let mut removed = Vec::new();
        for version in &versions {
            for path in files_for_version(migrations_dir, version.as_str()) {
                std::fs::remove_file(&path).map_err(|e| MigrateError::RemoveFile {
                    path: path.display().to_string(),
                    source: e,
                })?;
                log::info!("Removed {}", path.display());
                removed.push(path);
            }
        }

        staged
            .persist(&written)
            .map_err(|e| MigrateError::WriteFile {
                path: written.display().to_string(),
                source: e.error,
            })?;
        make_world_readable(&written);
        log::info!("Wrote {}", written.display());

        Ok(FlattenReport {
            applied: versions.len(),
            removed,
            written,
        })
    }

    /// The bookkeeping table and its id sequence, schema-qualified.
    fn excluded_tables(&self) -> Vec<String> {
        let table = self.runner.version_table();
        let qualified = if table.contains('.') {
            table.to_string()
        } else {
            format!("{}.{}", DEFAULT_SCHEMA, table)
        };
        let sequence = format!("{}_id_seq", qualified);
        vec![qualified, sequence]
    }
}

/// Strip statements that break replaying the dump through the runner.
///
/// pg_dump pins `search_path` to empty through `set_config`, which would
/// leak into the runner's session, and recent versions wrap the dump in
/// `\restrict` / `\unrestrict` meta-commands the runner cannot execute.
pub fn clean_schema_dump(dump: &str) -> String {
    dump.split('\n')
        .filter(|line| !(line.contains("set_config") && line.contains("search_path")))
        .filter(|line| !(line.starts_with("\\restrict") || line.starts_with("\\unrestrict")))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Wrap a cleaned schema dump as a goose up-migration.
pub fn initial_migration(schema: &str) -> String {
    format!("{}{}{}", UP_HEADER, schema, UP_FOOTER)
}

fn files_for_version(migrations_dir: &Path, version: &str) -> Vec<PathBuf> {
    let pattern = format!(
        "{}/{}_*.sql",
        glob::Pattern::escape(&migrations_dir.to_string_lossy()),
        glob::Pattern::escape(version)
    );
    match glob::glob(&pattern) {
        Ok(paths) => paths.filter_map(Result::ok).collect(),
        Err(e) => {
            log::warn!("Invalid pattern {}: {}", pattern, e);
            Vec::new()
        }
    }
}

fn stage(migrations_dir: &Path, contents: &str) -> MigrateResult<tempfile::NamedTempFile> {
    let write_err = |e| MigrateError::WriteFile {
        path: migrations_dir.display().to_string(),
        source: e,
    };
    let mut staged = tempfile::Builder::new()
        .prefix(".flatten-")
        .suffix(".tmp")
        .tempfile_in(migrations_dir)
        .map_err(write_err)?;
    staged.write_all(contents.as_bytes()).map_err(write_err)?;
    staged.flush().map_err(write_err)?;
    Ok(staged)
}

/// Temp files are created owner-only; migrations are shared source files.
#[cfg(unix)]
fn make_world_readable(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    if let Err(e) = std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o644)) {
        log::warn!("Could not set permissions on {}: {}", path.display(), e);
    }
}

#[cfg(not(unix))]
fn make_world_readable(_path: &Path) {}

#[cfg(test)]
#[path = "flatten_test.rs"]
mod tests;
