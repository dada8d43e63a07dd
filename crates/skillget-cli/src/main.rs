//! CLI entry point for `skill-get`.
//!
//! Parses arguments, loads the client configuration once, and hands off to
//! the matching module under `commands/`.  Any error reaching `main` is
//! printed as a single `✗` line on stderr and the process exits with 1.

mod cli;
mod commands;
mod helpers;
mod ui;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use crate::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is the normal case.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    helpers::init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            ui::error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = helpers::load_config()?;

    match cli.command {
        Commands::Install {
            target,
            version,
            force,
            local,
        } => commands::install::execute(&config, &target, &version, force, local).await,
        Commands::Remove { name, yes } => commands::remove::execute(&config, &name, yes),
        Commands::Update { name, check } => {
            commands::update::execute(&config, name.as_deref(), check).await
        }
        Commands::List { json } => commands::list::execute(&config, json),
        Commands::Info { name, json } => commands::info::execute(&config, &name, json).await,
        Commands::Search {
            query,
            category,
            limit,
            page,
            json,
        } => {
            commands::search::execute(&config, query.as_deref(), category, limit, page, json).await
        }
        Commands::Browse { category } => commands::search::browse(&config, category).await,
        Commands::Login => commands::auth::login(&mut config).await,
        Commands::Logout => commands::auth::logout(&mut config),
        Commands::Whoami => commands::auth::whoami(&config).await,
        Commands::Publish {
            path,
            dry_run,
            yes,
        } => commands::publish::execute(&config, &path, dry_run, yes).await,
        Commands::Config { agent, api, list } => {
            commands::config::execute(&mut config, agent.as_deref(), api.as_deref(), list)
        }
    }
}
