//! Command-line interface orchestration for the behavioural indicators.
//!
//! Each indicator family has its own command reading a single artefact, and
//! the `run` command reports every indicator of a run directory through an
//! [`IndicatorSession`](crate::session::IndicatorSession).

mod commands;

pub use commands::{
    BestMatchArgs, Cli, CliError, ColumnArgs, Command, ExecutionSummary, InteractionArgs,
    NetworkArgs, RegressionArgs, RunArgs, StnArgs, render_summary, run_cli,
};
