//! notekeep command line entry point.
//!
//! Every command prints one JSON document on stdout. Failures go to stderr
//! and map onto distinct exit codes by error class.

mod cli;
mod commands;
mod config;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use config::Config;
use notekeep_core::{ErrorClass, ServiceError};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            exit_code_for(&err)
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    let level = config.log_level(cli.log_level.as_deref());
    let log_dir = config.log_dir(cli.log_dir.as_ref())?;
    // Logging failures are reported, never fatal.
    if let Err(err) = notekeep_core::init_logging(&level, &log_dir.to_string_lossy()) {
        eprintln!("warning: logging disabled: {err}");
    }

    let db_path = config.db_path(cli.db.as_ref());
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let conn = notekeep_core::db::open_db(&db_path)
        .with_context(|| format!("failed to open database {}", db_path.display()))?;

    let output = commands::execute(&conn, cli.command)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn exit_code_for(err: &anyhow::Error) -> ExitCode {
    match err.downcast_ref::<ServiceError>().map(ServiceError::class) {
        Some(ErrorClass::InvalidInput) => ExitCode::from(2),
        Some(ErrorClass::NotFound) => ExitCode::from(3),
        Some(ErrorClass::Conflict) => ExitCode::from(4),
        Some(ErrorClass::Internal) | None => ExitCode::FAILURE,
    }
}
