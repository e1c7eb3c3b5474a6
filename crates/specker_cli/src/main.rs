//! specker CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error (including a queried tag that does not exist)
//! - 2: Invalid arguments, unreadable input or configuration
//! - 3: Malformed input
//! - 4: Render failure

use std::io;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use specker_model::SpecError;

mod commands;
mod error;
mod passes;
mod session;

use commands::{Cli, Commands};
use error::CliError;
use session::Session;

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const MALFORMED_INPUT: u8 = 3;
    pub const RENDER_FAILURE: u8 = 4;
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.quiet);

    let result = Session::load(cli.config.as_deref()).and_then(|session| match cli.command {
        Commands::Render(args) => commands::render::execute(args, &session),
        Commands::Show(args) => commands::show::execute(args, &session),
        Commands::Get(args) => commands::get::execute(args, &session),
        Commands::Set(args) => commands::set::execute(args, &session),
        Commands::BumpRelease(args) => commands::bump_release::execute(args, &session),
        Commands::AddChangelog(args) => commands::add_changelog::execute(args, &session),
    });

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            let exit_code = categorize_error(&e);
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_code)
        }
    }
}

/// Route diagnostics to stderr; `RUST_LOG` wins over the verbosity flags.
fn init_logging(verbose: bool, quiet: bool) {
    let default_level = if verbose {
        "specker=debug"
    } else if quiet {
        "error"
    } else {
        "specker=info,warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let log_result = tracing_subscriber::registry()
        .with(fmt::layer().with_target(verbose).with_writer(io::stderr))
        .with(filter)
        .try_init();

    if log_result.is_err() {
        // Logging already initialized, continue
    }
}

/// Categorize error to determine exit code
fn categorize_error(e: &anyhow::Error) -> u8 {
    for cause in e.chain() {
        if let Some(err) = cause.downcast_ref::<SpecError>() {
            return match err {
                SpecError::MalformedInput { .. } => ExitCodes::MALFORMED_INPUT,
                SpecError::InvalidSectionState { .. }
                | SpecError::NoModel
                | SpecError::ReaderBusy => ExitCodes::RENDER_FAILURE,
                SpecError::Io(_) | SpecError::Config { .. } | SpecError::Toml(_) => {
                    ExitCodes::INVALID_ARGS
                }
                SpecError::IndexOutOfRange { .. } => ExitCodes::GENERAL_ERROR,
            };
        }
        if let Some(err) = cause.downcast_ref::<CliError>() {
            return err.exit_code();
        }
        if cause.downcast_ref::<io::Error>().is_some() {
            return ExitCodes::INVALID_ARGS;
        }
    }
    ExitCodes::GENERAL_ERROR
}
