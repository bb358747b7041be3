//! Diario CLI - the day's journal entry and checklist from the terminal

mod auth;
mod cli;
mod commands;
mod config_profiles;
mod error;
#[cfg(test)]
mod tests;

use clap::{CommandFactory, Parser};
use tracing_subscriber::filter::Directive;

use crate::cli::{Cli, Commands};
use crate::commands::auth_cmd::run_auth;
use crate::commands::config::run_config;
use crate::commands::entry::{run_show, run_write};
use crate::commands::task::run_task;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    if let Ok(directive) = "diario=info".parse::<Directive>() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let profile = cli.profile.as_deref();
    let date = cli.date.as_deref();

    match cli.command {
        Some(Commands::Show { json }) => run_show(profile, date, json).await?,
        Some(Commands::Write { text, clear }) => run_write(profile, date, &text, clear).await?,
        Some(Commands::Task { command }) => run_task(command, profile, date).await?,
        Some(Commands::Auth { command }) => run_auth(command, profile).await?,
        Some(Commands::Config { command }) => run_config(command, profile)?,
        None => {
            Cli::command().print_help().map_err(CliError::Io)?;
            println!();
        }
    }

    Ok(())
}
