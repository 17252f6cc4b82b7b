//! Migration directory model
//!
//! A migrations directory holds SQL files named `<version>_<slug>.sql`, where
//! `version` is a [`MigrationVersion`]. The directory is mutated externally
//! (checkouts, flattening), so listings are never cached.

use crate::error::{CoreError, CoreResult};
use crate::version::MigrationVersion;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Glob matching every migration candidate inside a directory.
pub const MIGRATION_GLOB: &str = "*.sql";

static MIGRATION_NAME_RE: OnceLock<Regex> = OnceLock::new();

fn migration_name_regex() -> &'static Regex {
    MIGRATION_NAME_RE
        .get_or_init(|| Regex::new(r"^(\d{14})_([^/]+)\.sql$").expect("valid regex"))
}

/// A migration file on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationFile {
    pub version: MigrationVersion,
    pub slug: String,
    pub path: PathBuf,
}

impl MigrationFile {
    /// Build from a path whose file name follows the migration convention.
    pub fn from_path(path: impl Into<PathBuf>) -> CoreResult<Self> {
        let path = path.into();
        let name = file_name(&path);
        let (version, slug) = split_file_name(&name)?;
        Ok(Self {
            version,
            slug,
            path,
        })
    }

    /// `<version>_<slug>.sql`
    pub fn file_name(&self) -> String {
        format!("{}_{}.sql", self.version, self.slug)
    }
}

/// Split `<version>_<slug>.sql` into its parts.
pub fn split_file_name(name: &str) -> CoreResult<(MigrationVersion, String)> {
    let caps = migration_name_regex()
        .captures(name)
        .ok_or_else(|| CoreError::InvalidMigrationName {
            name: name.to_string(),
        })?;
    let version = MigrationVersion::parse(&caps[1])?;
    Ok((version, caps[2].to_string()))
}

/// Whether `name` is a well-formed migration file name.
pub fn is_migration_file_name(name: &str) -> bool {
    migration_name_regex().is_match(name)
}

/// Final path component as a string, independent of how the path was rooted.
///
/// Git reports repository-relative paths while directory listings carry the
/// caller's prefix; comparing by this value makes both agree.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// List every migration in `dir`, newest first.
///
/// Ties on version are broken by slug. Files not following the naming
/// convention are skipped.
pub fn list_all(dir: &Path) -> CoreResult<Vec<MigrationFile>> {
    let entries = std::fs::read_dir(dir).map_err(|e| CoreError::DirectoryError {
        path: dir.display().to_string(),
        source: e,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| CoreError::DirectoryError {
            path: dir.display().to_string(),
            source: e,
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        match MigrationFile::from_path(&path) {
            Ok(file) => files.push(file),
            Err(_) => log::debug!("Skipping non-migration file {}", path.display()),
        }
    }

    sort_descending(&mut files);
    Ok(files)
}

/// Sort newest first, ties broken by slug.
pub fn sort_descending(files: &mut [MigrationFile]) {
    files.sort_by(|a, b| (&b.version, &b.slug).cmp(&(&a.version, &a.slug)));
}

#[cfg(test)]
#[path = "migration_test.rs"]
mod tests;
