//! Network Auto-Post CLI
//!
//! Replays save events against a network snapshot so replication policies
//! can be tried without a live platform.

mod cli;
mod commands;
mod error;
mod logging;

use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use commands::ReplayOptions;
use error::Result;

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Some(cmd) => execute_command(cmd),
        None => {
            println!(
                "{} Run {} for usage.",
                "autopost".bold(),
                "autopost --help".cyan()
            );
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn execute_command(cmd: Commands) -> Result<ExitCode> {
    tracing::debug!("Executing {:?}", cmd);
    match cmd {
        Commands::Replay {
            network,
            policy,
            overrides,
            site,
            document,
            fields_event,
            write,
            json,
        } => commands::run_replay(&ReplayOptions {
            network,
            policy,
            overrides,
            site,
            document,
            fields_event,
            write,
            json,
        }),
        Commands::Links {
            network,
            site,
            document,
            json,
        } => commands::run_links(&network, site, document, json).map(|()| ExitCode::SUCCESS),
        Commands::CheckPolicy { path } => commands::run_check_policy(&path),
    }
}
