//! periphgen: peripheral configuration generator
//!
//! Entry point for the periphgen application.

use periphgen::config::{Cli, Command, ConfigError, Document, Settings, write_default_config};
use std::process::ExitCode;

mod app;
mod run;

use app::{exit_code, print_config_hint, setup_tracing};
use run::{Outcome, RunError};

/// Main entry point.
///
/// Excluded from coverage as it's the thin wrapper around testable components.
#[cfg(not(tarpaulin_include))]
fn main() -> ExitCode {
    let cli = Cli::parse_args();
    setup_tracing(cli.verbose);

    // Handle init subcommand
    if let Some(Command::Init { output }) = &cli.command {
        return handle_init(output);
    }

    // Load and validate configuration
    let (settings, document) = match load(&cli) {
        Ok(loaded) => loaded,
        Err(e) => return config_failure(&e),
    };
    tracing::info!("{settings}");

    let mut stdout = std::io::stdout().lock();
    match run::execute(&settings, &document, cli.is_check(), &mut stdout) {
        Ok(outcome) => {
            report(&outcome);
            exit_code::SUCCESS
        }
        Err(RunError::Config(e)) => config_failure(&e),
        Err(e) => {
            tracing::error!("Build error: {e}");
            exit_code::runtime_error()
        }
    }
}

fn load(cli: &Cli) -> Result<(Settings, Document), ConfigError> {
    let document = Document::load(&cli.config_path())?;
    let settings = Settings::from_raw(cli, &document)?;
    Ok((settings, document))
}

fn config_failure(error: &ConfigError) -> ExitCode {
    eprintln!("Configuration error: {error}");
    print_config_hint(error);
    exit_code::CONFIG_ERROR
}

#[cfg(not(tarpaulin_include))]
fn report(outcome: &Outcome) {
    match outcome {
        Outcome::Checked { operations, flags } => {
            println!("Configuration is valid: {operations} operation(s), {flags} build flag(s)");
        }
        Outcome::Printed => {}
        Outcome::Written(paths) => {
            for path in paths {
                println!("Wrote {}", path.display());
            }
        }
    }
}

/// Handles the `init` subcommand.
fn handle_init(output: &std::path::Path) -> ExitCode {
    match write_default_config(output) {
        Ok(()) => {
            println!("Configuration template written to: {}", output.display());
            exit_code::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            exit_code::CONFIG_ERROR
        }
    }
}
