#![deny(missing_docs)]

//! # Trellis
//!
//! Command line entry point.
//!
//! Supported Commands:
//! - `check`: validate every feature contract against its handler and print the report.
//! - `serve`: validate, then bind the routes and run the HTTP server.

use clap::{Parser, Subcommand};
use std::process::ExitCode;
use trellis_cli::logging::{self, LogFormat};
use trellis_cli::{check, serve};

#[derive(Parser, Debug)]
#[clap(author, version, about = "Contract-checked feature framework")]
struct Cli {
    /// Log line format.
    #[clap(long, global = true, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate contracts and print the report.
    Check(check::CheckArgs),
    /// Validate contracts, then serve the bound routes.
    Serve(serve::ServeArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.log_format);

    let outcome = match &cli.command {
        Commands::Check(args) => check::execute(args).map(|_| ()),
        Commands::Serve(args) => serve::execute(args),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
