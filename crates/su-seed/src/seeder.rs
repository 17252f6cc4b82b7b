//! The seed pipelines' shared collaborators and helpers

use crate::error::{SeedError, SeedResult};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use su_db::{Executor, MigrationRunner, SchemaDumper};

/// Snapshots and restores seed sets
pub struct Seeder {
    pub(crate) exec: Arc<dyn Executor>,
    pub(crate) runner: Arc<dyn MigrationRunner>,
    pub(crate) dumper: Arc<dyn SchemaDumper>,
}

impl Seeder {
    pub fn new(
        exec: Arc<dyn Executor>,
        runner: Arc<dyn MigrationRunner>,
        dumper: Arc<dyn SchemaDumper>,
    ) -> Self {
        Self {
            exec,
            runner,
            dumper,
        }
    }

    /// Write `script` to a temp file and run it in one psql session.
    ///
    /// The file is removed when this returns, whatever the outcome.
    pub(crate) async fn run_script(
        &self,
        database_url: &str,
        prefix: &str,
        script: &str,
    ) -> SeedResult<()> {
        let tmp_dir = std::env::temp_dir();
        let io_err = |e| SeedError::io("Cannot write seed script in", &tmp_dir, e);
        let mut file = tempfile::Builder::new()
            .prefix(prefix)
            .suffix(".sql")
            .tempfile()
            .map_err(io_err)?;
        file.write_all(script.as_bytes()).map_err(io_err)?;
        file.flush().map_err(io_err)?;

        log::info!("Running seed script {}", file.path().display());
        self.exec.run_sql_file(database_url, file.path()).await?;
        Ok(())
    }
}

/// `*.csv` files directly inside `dir`, sorted by name.
pub(crate) fn csv_files(dir: &Path) -> SeedResult<Vec<PathBuf>> {
    let pattern = format!(
        "{}/*.csv",
        glob::Pattern::escape(&dir.to_string_lossy())
    );
    let paths = glob::glob(&pattern).map_err(|e| SeedError::Io {
        action: "Invalid seed directory",
        path: dir.display().to_string(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidInput, e.msg),
    })?;

    let mut files = Vec::new();
    for entry in paths {
        let path = entry.map_err(|e| {
            let path = e.path().to_path_buf();
            SeedError::io("Cannot read", &path, std::io::Error::from(e))
        })?;
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
