//! Flatten command implementation

use anyhow::{Context, Result};

use crate::context::RuntimeContext;

/// Execute the flatten command
pub(crate) async fn execute(ctx: &RuntimeContext) -> Result<()> {
    let url = ctx.database_url()?;
    let migrations_dir = &ctx.settings.migrations_dir;

    println!("Flattening migrations...");
    let report = ctx
        .flattener()
        .flatten(url, migrations_dir)
        .await
        .context("Failed to flatten migrations")?;

    println!(
        "Flattened {} applied migrations ({} files removed) into {}",
        report.applied,
        report.removed.len(),
        report.written.display()
    );
    Ok(())
}
