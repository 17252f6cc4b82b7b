//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use su_core::{BaseBranch, SeedName};

/// Seedup - Postgres migration and seed data management
///
/// Wraps goose for migrations, guards migration ordering in CI and captures
/// and restores curated seed data sets.
#[derive(Parser, Debug)]
#[command(name = "seedup")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// PostgreSQL connection URL
    #[arg(short, long, global = true, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: Option<String>,

    /// Migrations directory [default: ./migrations]
    #[arg(short, long, global = true, env = "MIGRATIONS_DIR")]
    pub migrations_dir: Option<PathBuf>,

    /// Seed data directory [default: ./seed]
    #[arg(long, global = true, env = "SEED_DIR")]
    pub seed_dir: Option<PathBuf>,

    /// Config file path [default: ./seedup.yml]
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Verify that migrations added on this branch have the latest timestamps
    Check(CheckArgs),

    /// Replace applied migrations with a single initial migration
    Flatten,

    /// Run goose migrations
    Migrate(MigrateArgs),

    /// Create and apply seed data sets
    Seed(SeedArgs),

    /// Create, drop and set up the database
    Db(DbArgs),

    /// Generate DBML documentation from the database schema
    Dbml(DbmlArgs),
}

/// Arguments for the check command
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Branch to compare against [default: main]
    #[arg(long, env = "BASE_BRANCH")]
    pub base_branch: Option<BaseBranch>,
}

/// Arguments for the migrate command
#[derive(Args, Debug)]
pub struct MigrateArgs {
    #[command(subcommand)]
    pub command: MigrateCommands,
}

#[derive(Subcommand, Debug)]
pub enum MigrateCommands {
    /// Apply all pending migrations
    Up,

    /// Apply the next pending migration
    UpByOne,

    /// Roll back the last applied migration
    Down,

    /// Show migration status
    Status,

    /// Create a new empty migration
    Create(CreateMigrationArgs),
}

#[derive(Args, Debug)]
pub struct CreateMigrationArgs {
    /// Migration name, used as the file slug
    pub name: String,
}

/// Arguments for the seed command
#[derive(Args, Debug)]
pub struct SeedArgs {
    #[command(subcommand)]
    pub command: SeedCommands,
}

#[derive(Subcommand, Debug)]
pub enum SeedCommands {
    /// Export a seed set from the database and flatten migrations
    ///
    /// Runs `<seed-dir>/<name>.sql` against empty staging tables named
    /// pg_temp."seed.<schema>.<table>" and exports them to `<seed-dir>/<name>/`.
    Create(SeedCreateArgs),

    /// Load a seed set into a fresh database
    ///
    /// Applies the initial migration, loads `<seed-dir>/<name>/*.csv`, then
    /// applies the remaining migrations.
    Apply(SeedApplyArgs),
}

#[derive(Args, Debug)]
pub struct SeedCreateArgs {
    /// Seed set name, e.g. dev
    pub name: SeedName,

    /// Run the export without modifying seed or migration files
    #[arg(long)]
    pub dry_run: bool,

    /// Query file [default: <seed-dir>/<name>.sql]
    #[arg(long)]
    pub query_file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct SeedApplyArgs {
    /// Seed set name, e.g. dev
    pub name: SeedName,
}

/// Arguments for the db command
#[derive(Args, Debug)]
pub struct DbArgs {
    /// Superuser URL for administration [default: current OS user on the
    /// postgres database]
    #[arg(long, global = true, env = "ADMIN_URL", hide_env_values = true)]
    pub admin_url: Option<String>,

    #[command(subcommand)]
    pub command: DbCommands,
}

#[derive(Subcommand, Debug)]
pub enum DbCommands {
    /// Create the database if it does not exist
    Create,

    /// Drop the database
    Drop(DbDropArgs),

    /// Recreate the database from scratch, migrate and seed it
    Setup(DbSetupArgs),
}

#[derive(Args, Debug)]
pub struct DbDropArgs {
    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct DbSetupArgs {
    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub force: bool,

    /// Seed set to apply after creating the database
    #[arg(long)]
    pub seed_name: Option<SeedName>,

    /// Do not apply seed data
    #[arg(long, conflicts_with = "seed_name")]
    pub skip_seed: bool,
}

/// Arguments for the dbml command
#[derive(Args, Debug)]
pub struct DbmlArgs {
    /// Output file [default: stdout]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Schemas to include (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub schemas: Vec<String>,

    /// Tables to exclude (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub exclude_tables: Vec<String>,

    /// Include every non-system schema
    #[arg(short, long, conflicts_with = "schemas")]
    pub all_schemas: bool,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
