//! Runtime context for CLI commands

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use su_core::{BaseBranch, Config, SeedName, ToolsConfig};
use su_db::{
    DbAdmin, DbmlCli, Executor, GitCli, GooseRunner, MigrationRunner, PgDump, SchemaDumper,
    ShellExecutor, VersionControl,
};
use su_migrate::{Flattener, OrderingChecker};
use su_seed::Seeder;
use tokio_util::sync::CancellationToken;

use crate::cli::GlobalArgs;

/// Effective settings: flags and environment, then seedup.yml, then defaults
#[derive(Debug, Clone)]
pub(crate) struct Settings {
    pub database_url: Option<String>,
    pub admin_url: Option<String>,
    pub migrations_dir: PathBuf,
    pub seed_dir: PathBuf,
    pub base_branch: String,
    pub tools: ToolsConfig,
}

impl Settings {
    pub(crate) fn resolve(args: &GlobalArgs, config: Config) -> Self {
        let migrations_dir = args
            .migrations_dir
            .clone()
            .unwrap_or_else(|| config.migrations_dir());
        let seed_dir = args.seed_dir.clone().unwrap_or_else(|| config.seed_dir());
        let base_branch = config.base_branch().to_string();
        Self {
            database_url: args.database_url.clone().or(config.database_url),
            admin_url: config.admin_url,
            migrations_dir,
            seed_dir,
            base_branch,
            tools: config.tools,
        }
    }
}

/// Runtime context holding resolved settings and the process executor
pub(crate) struct RuntimeContext {
    pub settings: Settings,
    exec: Arc<dyn Executor>,
}

impl RuntimeContext {
    /// Create a new runtime context from global arguments
    pub(crate) fn new(args: &GlobalArgs, cancel: CancellationToken) -> Result<Self> {
        let config = match &args.config {
            Some(path) => Config::load(path).context("Failed to load configuration file")?,
            None => Config::load_from_dir(Path::new("."))
                .context("Failed to load project configuration")?,
        };
        let settings = Settings::resolve(args, config);
        let exec: Arc<dyn Executor> =
            Arc::new(ShellExecutor::new(cancel).with_psql(settings.tools.psql.clone()));
        Ok(Self { settings, exec })
    }

    /// The connection URL, required by every database command
    pub(crate) fn database_url(&self) -> Result<&str> {
        self.settings.database_url.as_deref().context(
            "Database URL required (use -d, DATABASE_URL or database_url in seedup.yml)",
        )
    }

    /// `--base-branch` if given, otherwise the configured branch
    pub(crate) fn base_branch(&self, flag: Option<&BaseBranch>) -> Result<BaseBranch> {
        match flag {
            Some(branch) => Ok(branch.clone()),
            None => BaseBranch::try_new(self.settings.base_branch.as_str())
                .with_context(|| format!("Invalid base branch '{}'", self.settings.base_branch)),
        }
    }

    pub(crate) fn seed_set_dir(&self, name: &SeedName) -> PathBuf {
        self.settings.seed_dir.join(name.as_str())
    }

    pub(crate) fn runner(&self) -> Arc<dyn MigrationRunner> {
        let tools = &self.settings.tools;
        Arc::new(
            GooseRunner::new(self.exec.clone())
                .with_program(tools.goose.clone())
                .with_version_table(tools.version_table.clone()),
        )
    }

    pub(crate) fn version_control(&self) -> Arc<dyn VersionControl> {
        let tools = &self.settings.tools;
        Arc::new(
            GitCli::new(self.exec.clone())
                .with_program(tools.git.clone())
                .with_remote(tools.remote.clone()),
        )
    }

    fn dumper(&self) -> Arc<dyn SchemaDumper> {
        Arc::new(PgDump::new(self.exec.clone()).with_program(self.settings.tools.pg_dump.clone()))
    }

    pub(crate) fn doc_generator(&self) -> DbmlCli {
        DbmlCli::new(self.exec.clone()).with_program(self.settings.tools.dbml.clone())
    }

    pub(crate) fn checker(&self) -> OrderingChecker {
        OrderingChecker::new(self.version_control())
    }

    pub(crate) fn flattener(&self) -> Flattener {
        Flattener::new(self.runner(), self.dumper())
    }

    pub(crate) fn seeder(&self) -> Seeder {
        Seeder::new(self.exec.clone(), self.runner(), self.dumper())
    }

    /// Administration of the database in the connection URL
    pub(crate) fn admin(&self, admin_url: Option<&str>) -> Result<DbAdmin> {
        let admin_url = admin_url.or(self.settings.admin_url.as_deref());
        DbAdmin::new(self.exec.clone(), self.database_url()?, admin_url)
            .context("Invalid database URL")
    }
}
