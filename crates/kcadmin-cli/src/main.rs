//! kcadmin - command-line client for a Keycloak-style admin API.
//!
//! This is a thin wrapper over `kcadmin-http`, intended for manual
//! exploration of a realm and for scripting.

mod cli;
mod commands;
mod connection;
mod output;
mod profile;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use cli::{Cli, Commands};
use commands::{config, groups, request, token, users};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.json_logs);

    let result = match cli.command {
        Commands::Config(cmd) => config::handle(cmd, &cli.connection),
        Commands::Token(args) => token::run(args, &cli.connection).await,
        Commands::Groups(cmd) => groups::handle(cmd, &cli.connection).await,
        Commands::Users(cmd) => users::handle(cmd, &cli.connection).await,
        Commands::Request(args) => request::run(args, &cli.connection).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output::error(&format!("{:#}", err));
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbosity: u8, json: bool) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}
