mod account;
mod api;
mod assign;
mod cli;
mod config;
mod error;
mod error_ext;
mod live;
mod selection;
mod session;
mod ui;

use clap::Parser;
use cli::{Cli, Command};
use config::AppConfig;
use error::Result;
use error_ext::ResultExt;
use session::{SessionContext, SessionStore};
use std::env;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use ui::{toast, MessageSeverity};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_directive = if cli.verbose { "liveroom=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            toast(MessageSeverity::Error, e.to_string());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let workspace = env::current_dir().context("Failed to get current directory")?;
    let config = AppConfig::load(&workspace, cli.overrides());
    tracing::debug!(api = %config.api_url, ws = %config.ws_url, data_dir = %config.data_dir.display(), "Configuration loaded");

    let mut ctx = SessionContext::restore(SessionStore::new(&config.data_dir))?;

    match cli.command {
        Command::Login { email, password } => {
            account::login(&config, &mut ctx, &email, password).await
        }
        Command::Logout => account::logout(&mut ctx),
        Command::Whoami { refresh } => account::whoami(&config, &mut ctx, refresh).await,
        Command::Live { room } => live::run_room(&config, &ctx, &room).await,
        Command::AssignStudents { batch } => assign::assign_students(&config, &ctx, &batch).await,
        Command::AssignBatches { assessment } => {
            assign::assign_batches(&config, &ctx, &assessment).await
        }
    }
}
