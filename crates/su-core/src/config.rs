//! Configuration types and parsing for seedup.yml
//!
//! Every field is optional; command-line flags and environment variables
//! take precedence over the file, and the file over the built-in defaults.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File names searched for in the project directory, in order.
pub const CONFIG_FILE_NAMES: [&str; 2] = ["seedup.yml", "seedup.yaml"];

/// Project configuration from seedup.yml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// PostgreSQL connection URL
    #[serde(default)]
    pub database_url: Option<String>,

    /// Superuser URL for database/user administration
    #[serde(default)]
    pub admin_url: Option<String>,

    /// Directory holding `<version>_<slug>.sql` migrations
    #[serde(default)]
    pub migrations_dir: Option<PathBuf>,

    /// Directory holding seed sets (`<name>/` and `<name>.sql`)
    #[serde(default)]
    pub seed_dir: Option<PathBuf>,

    /// Branch new migrations are compared against
    #[serde(default)]
    pub base_branch: Option<String>,

    /// External tool locations
    #[serde(default)]
    pub tools: ToolsConfig,
}

/// Names (or paths) of the external binaries and the runner's table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolsConfig {
    #[serde(default = "default_goose")]
    pub goose: String,

    #[serde(default = "default_psql")]
    pub psql: String,

    #[serde(default = "default_pg_dump")]
    pub pg_dump: String,

    #[serde(default = "default_git")]
    pub git: String,

    #[serde(default = "default_dbml")]
    pub dbml: String,

    /// Remote the base branch is fetched from
    #[serde(default = "default_remote")]
    pub remote: String,

    /// Bookkeeping table of the migration runner, optionally schema-qualified
    #[serde(default = "default_version_table")]
    pub version_table: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            goose: default_goose(),
            psql: default_psql(),
            pg_dump: default_pg_dump(),
            git: default_git(),
            dbml: default_dbml(),
            remote: default_remote(),
            version_table: default_version_table(),
        }
    }
}

fn default_goose() -> String {
    "goose".to_string()
}

fn default_psql() -> String {
    "psql".to_string()
}

fn default_pg_dump() -> String {
    "pg_dump".to_string()
}

fn default_git() -> String {
    "git".to_string()
}

fn default_dbml() -> String {
    "dbml".to_string()
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_version_table() -> String {
    DEFAULT_VERSION_TABLE.to_string()
}

/// goose's bookkeeping table
pub const DEFAULT_VERSION_TABLE: &str = "goose_db_version";

pub const DEFAULT_MIGRATIONS_DIR: &str = "./migrations";

pub const DEFAULT_SEED_DIR: &str = "./seed";

pub const DEFAULT_BASE_BRANCH: &str = "main";

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load seedup.yml / seedup.yaml from `dir`, or defaults when neither exists
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        for name in CONFIG_FILE_NAMES {
            let path = dir.join(name);
            if path.exists() {
                log::debug!("Loading config from {}", path.display());
                return Self::load(&path);
            }
        }
        Ok(Self::default())
    }

    fn validate(&self) -> CoreResult<()> {
        if self.tools.version_table.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "tools.version_table cannot be empty".to_string(),
            });
        }
        if let Some(branch) = &self.base_branch {
            if crate::BaseBranch::try_new(branch.as_str()).is_none() {
                return Err(CoreError::ConfigInvalid {
                    message: format!("base_branch '{}' is not a valid branch name", branch),
                });
            }
        }
        Ok(())
    }

    /// Migrations directory, falling back to `./migrations`
    pub fn migrations_dir(&self) -> PathBuf {
        self.migrations_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MIGRATIONS_DIR))
    }

    /// Seed directory, falling back to `./seed`
    pub fn seed_dir(&self) -> PathBuf {
        self.seed_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SEED_DIR))
    }

    /// Base branch, falling back to `main`
    pub fn base_branch(&self) -> &str {
        self.base_branch.as_deref().unwrap_or(DEFAULT_BASE_BRANCH)
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
