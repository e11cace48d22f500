//! CLI entry point for computing behavioural indicators.
//!
//! Parses command-line arguments with clap, runs the selected command,
//! renders the summary to stdout, and maps errors to a failing exit code.
//! Logging is initialised eagerly so later operations can emit structured
//! diagnostics via `tracing`.

use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use metabehave_cli::{
    cli::{Cli, CliError, render_summary, run_cli},
    logging::{self, LoggingError, LoggingInit},
};
use tracing::{debug, error, field};

/// Parse CLI arguments, execute the command, render the summary, and flush the
/// output stream.
fn try_main() -> Result<()> {
    let cli = Cli::parse();
    let summary = run_cli(cli).context("failed to execute command")?;
    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());
    render_summary(&summary, &mut writer).context("failed to render summary")?;
    writer.flush().context("failed to flush output")?;
    Ok(())
}

fn main() -> ExitCode {
    match logging::init_logging() {
        Ok(LoggingInit::Installed) => {}
        Ok(LoggingInit::AlreadyConfigured) => {
            debug!("structured logging already configured by another subscriber");
        }
        Err(err) => {
            report_logging_init_error(&err);
            return ExitCode::FAILURE;
        }
    }

    if let Err(err) = try_main() {
        let code = err.downcast_ref::<CliError>().map(CliError::code);
        error!(
            error = %err,
            code = code.map(field::display),
            "command execution failed"
        );
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

#[expect(
    clippy::print_stderr,
    reason = "Emit one-off diagnostic before tracing is initialized"
)]
fn report_logging_init_error(err: &LoggingError) {
    eprintln!("failed to initialize logging: {err}");
}
