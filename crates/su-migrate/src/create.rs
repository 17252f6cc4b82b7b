//! Authoring new migration files

use crate::error::{MigrateError, MigrateResult};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use su_core::migration::is_migration_file_name;
use su_core::{list_all, MigrationVersion};

/// Empty up/down skeleton for a new migration.
pub const MIGRATION_TEMPLATE: &str = "-- +goose Up
-- +goose StatementBegin

-- +goose StatementEnd

-- +goose Down
-- +goose StatementBegin

-- +goose StatementEnd
";

/// Create `<version>_<name>.sql` in `migrations_dir` (created if missing)
/// and return its path.
///
/// Refuses to reuse a version already present in the directory, since the
/// runner keys applied state by version alone.
pub fn create_migration(
    migrations_dir: &Path,
    name: &str,
    version: &MigrationVersion,
) -> MigrateResult<PathBuf> {
    let file_name = format!("{}_{}.sql", version, name);
    if name.trim().is_empty() || !is_migration_file_name(&file_name) {
        return Err(MigrateError::InvalidName {
            name: name.to_string(),
            reason: "must be non-empty and must not contain '/'".to_string(),
        });
    }

    std::fs::create_dir_all(migrations_dir).map_err(|e| MigrateError::WriteFile {
        path: migrations_dir.display().to_string(),
        source: e,
    })?;

    if let Some(existing) = list_all(migrations_dir)?
        .into_iter()
        .find(|m| &m.version == version)
    {
        return Err(MigrateError::DuplicateVersion {
            version: version.to_string(),
            existing: existing.file_name(),
        });
    }

    let path = migrations_dir.join(&file_name);
    let write_err = |e| MigrateError::WriteFile {
        path: path.display().to_string(),
        source: e,
    };
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .map_err(write_err)?;
    file.write_all(MIGRATION_TEMPLATE.as_bytes())
        .map_err(write_err)?;

    Ok(path)
}
