//! Seed command implementation

use anyhow::{Context, Result};
use su_seed::CreateOptions;

use crate::cli::{SeedApplyArgs, SeedArgs, SeedCommands, SeedCreateArgs};
use crate::context::RuntimeContext;

/// Execute the seed command
pub(crate) async fn execute(args: &SeedArgs, ctx: &RuntimeContext) -> Result<()> {
    match &args.command {
        SeedCommands::Create(create) => execute_create(create, ctx).await,
        SeedCommands::Apply(apply) => execute_apply(apply, ctx).await,
    }
}

async fn execute_create(args: &SeedCreateArgs, ctx: &RuntimeContext) -> Result<()> {
    let url = ctx.database_url()?;
    let seed_dir = ctx.seed_set_dir(&args.name);
    let query_file = args
        .query_file
        .clone()
        .unwrap_or_else(|| ctx.settings.seed_dir.join(format!("{}.sql", args.name)));

    println!("Creating seed '{}' from the database...", args.name);
    let report = ctx
        .seeder()
        .create(
            url,
            &ctx.settings.migrations_dir,
            &seed_dir,
            Some(&query_file),
            CreateOptions {
                dry_run: args.dry_run,
            },
        )
        .await
        .with_context(|| format!("Failed to create seed '{}'", args.name))?;

    match &report.flatten {
        None => println!(
            "Dry run: exported {} tables, no files were modified",
            report.files.len()
        ),
        Some(flatten) => {
            println!(
                "Wrote {} seed files to {}",
                report.files.len(),
                seed_dir.display()
            );
            println!("Flattened migrations into {}", flatten.written.display());
        }
    }
    Ok(())
}

async fn execute_apply(args: &SeedApplyArgs, ctx: &RuntimeContext) -> Result<()> {
    let url = ctx.database_url()?;
    let seed_dir = ctx.seed_set_dir(&args.name);

    let report = ctx
        .seeder()
        .apply(url, &ctx.settings.migrations_dir, &seed_dir)
        .await
        .with_context(|| format!("Failed to apply seed '{}'", args.name))?;

    println!(
        "Seed '{}' applied ({} tables loaded)",
        args.name,
        report.loaded.len()
    );
    Ok(())
}
