//! Migrate command implementation

use anyhow::{Context, Result};
use su_core::MigrationVersion;
use su_migrate::create_migration;

use crate::cli::{MigrateArgs, MigrateCommands};
use crate::context::RuntimeContext;

/// Execute the migrate command
pub(crate) async fn execute(args: &MigrateArgs, ctx: &RuntimeContext) -> Result<()> {
    let dir = &ctx.settings.migrations_dir;
    let runner = ctx.runner();

    match &args.command {
        MigrateCommands::Create(create) => {
            let path = create_migration(dir, &create.name, &MigrationVersion::now())
                .context("Failed to create migration")?;
            println!("Created {}", path.display());
        }
        MigrateCommands::Up => runner
            .apply_all(ctx.database_url()?, dir)
            .await
            .context("Failed to apply migrations")?,
        MigrateCommands::UpByOne => runner
            .apply_next(ctx.database_url()?, dir)
            .await
            .context("Failed to apply the next migration")?,
        MigrateCommands::Down => runner
            .rollback_last(ctx.database_url()?, dir)
            .await
            .context("Failed to roll back the last migration")?,
        MigrateCommands::Status => runner
            .status(ctx.database_url()?, dir)
            .await
            .context("Failed to read migration status")?,
    }
    Ok(())
}
