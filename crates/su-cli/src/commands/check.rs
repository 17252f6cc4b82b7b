//! Check command implementation

use anyhow::{bail, Context, Result};
use su_migrate::{CheckOutcome, MigrateError};

use crate::cli::CheckArgs;
use crate::commands::common::ExitCode;
use crate::context::RuntimeContext;

/// Execute the check command
pub(crate) async fn execute(args: &CheckArgs, ctx: &RuntimeContext) -> Result<()> {
    if !ctx.version_control().is_repository().await {
        bail!("Not in a git repository");
    }
    let base = ctx.base_branch(args.base_branch.as_ref())?;
    let migrations_dir = &ctx.settings.migrations_dir;

    match ctx.checker().check(migrations_dir, &base).await {
        Ok(CheckOutcome::NoNewMigrations) => {
            println!("No new migrations added");
            Ok(())
        }
        Ok(CheckOutcome::Ordered { count }) => {
            println!(
                "{} new migration(s) have the latest timestamps, all is good",
                count
            );
            Ok(())
        }
        Err(err @ MigrateError::OrderingViolation { .. }) => {
            eprintln!("Error: {}", err);
            Err(ExitCode(1).into())
        }
        Err(err) => Err(err).with_context(|| {
            format!(
                "Failed to check migrations in {} against origin/{}",
                migrations_dir.display(),
                base
            )
        }),
    }
}
