//! Ordering invariant: migrations added on a branch must be the newest ones
//!
//! When two branches each add a migration, the one merged second can carry an
//! older timestamp than one already applied in shared environments, and the
//! runner would silently skip it. The check compares the branch's added files
//! against the top of the directory listing.

use crate::error::{MigrateError, MigrateResult, Remediation};
use std::path::Path;
use std::sync::Arc;
use su_core::migration::{file_name, sort_descending, MIGRATION_GLOB};
use su_core::{list_all, BaseBranch, MigrationFile, MigrationVersion};
use su_db::VersionControl;

/// Result of a passing check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    /// The branch adds no migrations
    NoNewMigrations,
    /// The branch adds `count` migrations, all newer than the rest
    Ordered { count: usize },
}

pub struct OrderingChecker {
    vcs: Arc<dyn VersionControl>,
}

impl OrderingChecker {
    pub fn new(vcs: Arc<dyn VersionControl>) -> Self {
        Self { vcs }
    }

    /// Verify that migrations added relative to `base` sort above every
    /// pre-existing migration in `migrations_dir`.
    pub async fn check(
        &self,
        migrations_dir: &Path,
        base: &BaseBranch,
    ) -> MigrateResult<CheckOutcome> {
        self.check_at(migrations_dir, base, MigrationVersion::now())
            .await
    }

    /// [`check`](Self::check) with the remediation timestamp fixed.
    pub async fn check_at(
        &self,
        migrations_dir: &Path,
        base: &BaseBranch,
        now: MigrationVersion,
    ) -> MigrateResult<CheckOutcome> {
        match self.vcs.fetch(base).await {
            Ok(()) => {}
            Err(e) if e.is_cancelled() => return Err(e.into()),
            Err(e) => log::warn!(
                "Could not fetch '{}', comparing against the local ref: {}",
                base,
                e
            ),
        }

        let all = list_all(migrations_dir)?;
        let added = self.added_migrations(migrations_dir, base).await?;

        if added.is_empty() {
            return Ok(CheckOutcome::NoNewMigrations);
        }

        let ordered = added.len() <= all.len()
            && all
                .iter()
                .zip(&added)
                .all(|(existing, new)| file_name(&existing.path) == file_name(&new.path))
            && shared_version(&added).is_none()
            && strictly_newer(&added, all.get(added.len()));

        if !ordered {
            return Err(MigrateError::OrderingViolation {
                dir: migrations_dir.display().to_string(),
                offenders: remediations(&added, &now)?,
            });
        }

        if let Some((newer, older)) = shared_version(&all[added.len()..]) {
            return Err(MigrateError::SharedVersion {
                version: older.version.to_string(),
                files: vec![file_name(&older.path), file_name(&newer.path)],
            });
        }

        Ok(CheckOutcome::Ordered { count: added.len() })
    }

    /// Migrations added relative to the base, newest first.
    ///
    /// Paths that do not follow the migration naming convention are ignored,
    /// the same way the directory listing ignores them.
    async fn added_migrations(
        &self,
        migrations_dir: &Path,
        base: &BaseBranch,
    ) -> MigrateResult<Vec<MigrationFile>> {
        let pattern = migrations_dir.join(MIGRATION_GLOB).display().to_string();
        let paths = self.vcs.added_files(base, &pattern).await?;

        let mut added: Vec<MigrationFile> = paths
            .into_iter()
            .filter_map(|path| match MigrationFile::from_path(&path) {
                Ok(m) => Some(m),
                Err(_) => {
                    log::debug!("Ignoring added file '{}'", path.display());
                    None
                }
            })
            .collect();
        sort_descending(&mut added);
        added.dedup_by(|a, b| a.version == b.version && a.slug == b.slug);
        Ok(added)
    }
}

/// A shared timestamp is ambiguous even when the slugs happen to sort the
/// added file first.
fn strictly_newer(added: &[MigrationFile], next_existing: Option<&MigrationFile>) -> bool {
    match (added.last(), next_existing) {
        (Some(oldest_added), Some(existing)) => oldest_added.version > existing.version,
        _ => true,
    }
}

/// First adjacent pair with the same version in a sorted listing.
fn shared_version(files: &[MigrationFile]) -> Option<(&MigrationFile, &MigrationFile)> {
    files
        .windows(2)
        .find(|pair| pair[0].version == pair[1].version)
        .map(|pair| (&pair[0], &pair[1]))
}

/// One rename per added file, on consecutive seconds from `now` so the
/// renamed files keep their relative order and never share a version.
fn remediations(added: &[MigrationFile], now: &MigrationVersion) -> MigrateResult<Vec<Remediation>> {
    let last = added.len() as i64 - 1;
    added
        .iter()
        .enumerate()
        .map(|(i, m)| {
            let version = now.later_by(last - i as i64)?;
            Ok(Remediation {
                file: file_name(&m.path),
                suggested: format!("{}_{}.sql", version, m.slug),
            })
        })
        .collect()
}

#[cfg(test)]
#[path = "check_test.rs"]
mod tests;
