//! Dbml command implementation

use anyhow::{Context, Result};
use su_db::{DocGenerator, DocOptions};

use crate::cli::DbmlArgs;
use crate::context::RuntimeContext;

/// Execute the dbml command
pub(crate) async fn execute(args: &DbmlArgs, ctx: &RuntimeContext) -> Result<()> {
    let url = ctx.database_url()?;
    let options = DocOptions {
        output: args.output.clone(),
        schemas: args.schemas.clone(),
        exclude_tables: args.exclude_tables.clone(),
        all_schemas: args.all_schemas,
    };

    ctx.doc_generator()
        .generate(url, &options)
        .await
        .context("Failed to generate DBML")?;

    if let Some(output) = &options.output {
        println!("Wrote {}", output.display());
    }
    Ok(())
}
