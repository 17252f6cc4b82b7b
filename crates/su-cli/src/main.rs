//! Seedup CLI - Postgres migration ordering, history flattening and seed data

use anyhow::Result;
use clap::Parser;
use env_logger::Env;
use tokio_util::sync::CancellationToken;

mod cli;
mod commands;
mod context;

use cli::{Cli, Commands};
use commands::{check, common, db, dbml, flatten, migrate, seed};
use context::RuntimeContext;

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.global.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::debug!("Interrupt received, cancelling");
            on_signal.cancel();
        }
    });

    match run(&cli, cancel).await {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(err) => std::process::ExitCode::from(common::exit_code_for(&err)),
    }
}

async fn run(cli: &Cli, cancel: CancellationToken) -> Result<()> {
    let ctx = RuntimeContext::new(&cli.global, cancel)?;

    match &cli.command {
        Commands::Check(args) => check::execute(args, &ctx).await,
        Commands::Flatten => flatten::execute(&ctx).await,
        Commands::Migrate(args) => migrate::execute(args, &ctx).await,
        Commands::Seed(args) => seed::execute(args, &ctx).await,
        Commands::Db(args) => db::execute(args, &ctx).await,
        Commands::Dbml(args) => dbml::execute(args, &ctx).await,
    }
}
