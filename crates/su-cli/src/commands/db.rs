//! Db command implementation

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use su_core::list_all;
use su_seed::apply::read_seed_dir;

use crate::cli::{DbArgs, DbCommands, DbDropArgs, DbSetupArgs};
use crate::commands::common::confirm;
use crate::context::RuntimeContext;

/// Execute the db command
pub(crate) async fn execute(args: &DbArgs, ctx: &RuntimeContext) -> Result<()> {
    let admin_url = args.admin_url.as_deref();
    match &args.command {
        DbCommands::Create => execute_create(admin_url, ctx).await,
        DbCommands::Drop(drop) => execute_drop(drop, admin_url, ctx).await,
        DbCommands::Setup(setup) => execute_setup(setup, admin_url, ctx).await,
    }
}

async fn execute_create(admin_url: Option<&str>, ctx: &RuntimeContext) -> Result<()> {
    let admin = ctx.admin(admin_url)?;
    let created = admin
        .create_database()
        .await
        .context("Failed to create database")?;

    if created {
        println!("Database '{}' created successfully.", admin.database());
    } else {
        println!("Database '{}' already exists.", admin.database());
    }
    Ok(())
}

async fn execute_drop(args: &DbDropArgs, admin_url: Option<&str>, ctx: &RuntimeContext) -> Result<()> {
    let admin = ctx.admin(admin_url)?;
    if !args.force && !confirm(&format!("Drop database '{}'?", admin.database()))? {
        println!("Aborted.");
        return Ok(());
    }

    admin
        .drop_database()
        .await
        .context("Failed to drop database")?;
    println!("Database '{}' dropped.", admin.database());
    Ok(())
}

/// What `db setup` does after the database exists
#[derive(Debug, PartialEq, Eq)]
enum SetupPlan {
    /// Restore the seed set, which migrates around the load itself
    Seed(PathBuf),
    /// Apply every migration
    Migrate,
    Nothing,
}

fn setup_plan(args: &DbSetupArgs, seed_root: &Path, migrations_dir: &Path) -> Result<SetupPlan> {
    if !args.skip_seed {
        match &args.seed_name {
            Some(name) => {
                let seed_dir = seed_root.join(name.as_str());
                if read_seed_dir(&seed_dir)?.is_empty() {
                    println!(
                        "No seed CSV files found in '{}', skipping seeds",
                        seed_dir.display()
                    );
                } else {
                    return Ok(SetupPlan::Seed(seed_dir));
                }
            }
            None => println!("No --seed-name provided, skipping seeds"),
        }
    }

    let has_migrations = migrations_dir.is_dir() && !list_all(migrations_dir)?.is_empty();
    if has_migrations {
        Ok(SetupPlan::Migrate)
    } else {
        println!("No migration files found, skipping migrations");
        Ok(SetupPlan::Nothing)
    }
}

async fn execute_setup(
    args: &DbSetupArgs,
    admin_url: Option<&str>,
    ctx: &RuntimeContext,
) -> Result<()> {
    let url = ctx.database_url()?;
    let admin = ctx.admin(admin_url)?;
    let migrations_dir = &ctx.settings.migrations_dir;

    if !args.force
        && !confirm(&format!(
            "This will DROP and recreate database '{}'. Continue?",
            admin.database()
        ))?
    {
        println!("Aborted.");
        return Ok(());
    }

    // Validate seed files before anything is dropped.
    let plan = setup_plan(args, &ctx.settings.seed_dir, migrations_dir)?;

    // The owner role must exist before the database is recreated for it.
    println!("Creating user '{}' if not exists...", admin.user());
    admin.create_user().await.context("Failed to create user")?;

    println!("Dropping database '{}' if exists...", admin.database());
    admin
        .drop_database()
        .await
        .context("Failed to drop database")?;

    println!("Creating database '{}'...", admin.database());
    admin
        .create_database()
        .await
        .context("Failed to create database")?;

    println!("Setting up permissions...");
    admin
        .grant_permissions()
        .await
        .context("Failed to grant permissions")?;

    match plan {
        SetupPlan::Seed(seed_dir) => {
            println!("Applying seeds from '{}'...", seed_dir.display());
            ctx.seeder()
                .apply(url, migrations_dir, &seed_dir)
                .await
                .context("Failed to apply seeds")?;
        }
        SetupPlan::Migrate => {
            println!("Running migrations...");
            ctx.runner()
                .apply_all(url, migrations_dir)
                .await
                .context("Failed to run migrations")?;
        }
        SetupPlan::Nothing => {}
    }

    println!("Database setup completed successfully.");
    Ok(())
}
