//! Command implementations and argument parsing for the metabehave CLI.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use metabehave_core::{
    DEFAULT_RELATIVE_DELTA, IndicatorError, InteractionConfig, InteractionSummary,
    RegressionConfig, RegressionIndicator, SlopeIndices, StnConfig, StnSummary, SweepStep,
    TimeSeries,
};
use metabehave_providers_csv::{
    ProviderError, RunLayout, TrajectoryColumns, load_interaction_log, load_time_series,
    load_time_series_parquet, load_trajectories,
};
use thiserror::Error;
use tracing::{Span, field, info, instrument};

use crate::session::{IndicatorReport, IndicatorSession, SessionError};

const DEFAULT_X_COLUMN: &str = "iteration";

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(
    name = "metabehave",
    about = "Compute behavioural indicators of metaheuristic runs."
)]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Fit a two-segment regression to one per-iteration metric.
    Regression(RegressionArgs),
    /// Summarise the search trajectory network of a trajectory CSV.
    Stn(StnArgs),
    /// Analyse the interaction network of an interaction log.
    Interaction(InteractionArgs),
    /// Report every indicator of a run directory.
    Run(RunArgs),
}

/// Options accepted by the `regression` command.
#[derive(Debug, Args, Clone)]
pub struct RegressionArgs {
    /// CSV or Parquet file holding the metric.
    pub path: PathBuf,

    /// Column holding the iteration number.
    #[arg(long, default_value = DEFAULT_X_COLUMN)]
    pub x: String,

    /// Column holding the metric (defaults to the file stem).
    #[arg(long)]
    pub y: Option<String>,

    /// Index of the slope reported as "before".
    #[arg(long, default_value_t = 0)]
    pub before: usize,

    /// Index of the slope reported as "after".
    #[arg(long, default_value_t = 1)]
    pub after: usize,
}

/// Options accepted by the `stn` command.
#[derive(Debug, Args, Clone)]
pub struct StnArgs {
    /// Trajectory CSV file.
    pub path: PathBuf,

    /// Best fitness known for the problem instance.
    #[arg(long = "global-best", allow_hyphen_values = true)]
    pub global_best: f64,

    #[command(flatten)]
    pub matching: BestMatchArgs,

    #[command(flatten)]
    pub columns: ColumnArgs,
}

/// Best-state matching knobs shared by `stn` and `run`.
#[derive(Debug, Args, Clone)]
pub struct BestMatchArgs {
    /// Require fitness to equal the global best exactly.
    #[arg(long = "exact-best")]
    pub exact_best: bool,

    /// Relative tolerance used when matching the global best.
    #[arg(long = "relative-delta", default_value_t = DEFAULT_RELATIVE_DELTA)]
    pub relative_delta: f64,
}

impl BestMatchArgs {
    fn config(&self) -> StnConfig {
        StnConfig::new()
            .with_best_fit_delta(!self.exact_best)
            .with_relative_delta(self.relative_delta)
    }
}

/// Trajectory column overrides.
#[derive(Debug, Args, Clone, Default)]
pub struct ColumnArgs {
    /// Column holding the run identifier.
    #[arg(long = "run-column")]
    pub run: Option<String>,

    /// Column holding the iteration number.
    #[arg(long = "iteration-column")]
    pub iteration: Option<String>,

    /// Column holding the state label.
    #[arg(long = "state-column")]
    pub state: Option<String>,

    /// Column holding the fitness.
    #[arg(long = "fitness-column")]
    pub fitness: Option<String>,
}

impl ColumnArgs {
    fn columns(&self) -> TrajectoryColumns {
        let mut columns = TrajectoryColumns::default();
        if let Some(run) = &self.run {
            columns.run.clone_from(run);
        }
        if let Some(iteration) = &self.iteration {
            columns.iteration.clone_from(iteration);
        }
        if let Some(state) = &self.state {
            columns.state.clone_from(state);
        }
        if let Some(fitness) = &self.fitness {
            columns.fitness.clone_from(fitness);
        }
        columns
    }
}

/// Options accepted by the `interaction` command.
#[derive(Debug, Args, Clone)]
pub struct InteractionArgs {
    /// Interaction log file.
    pub path: PathBuf,

    /// Population index of the returned solution.
    #[arg(long = "solution-index")]
    pub solution_index: usize,

    /// Number of iterations the run lasted.
    #[arg(long = "total-iterations")]
    pub total_iterations: u64,

    #[command(flatten)]
    pub network: NetworkArgs,
}

/// Interaction network knobs shared by `interaction` and `run`.
#[derive(Debug, Args, Clone)]
pub struct NetworkArgs {
    /// Number of consecutive iterations merged into one window.
    #[arg(long = "window-size", default_value_t = 1)]
    pub window_size: usize,

    /// Fixed threshold increment (defaults to the distinct edge weights).
    #[arg(long = "sweep-step")]
    pub sweep_step: Option<f64>,

    /// Last iteration included in the network.
    #[arg(long = "until-iteration")]
    pub until_iteration: Option<u64>,
}

impl NetworkArgs {
    fn config(&self) -> InteractionConfig {
        let step = self.sweep_step.map_or(SweepStep::DistinctWeights, SweepStep::Fixed);
        InteractionConfig::new()
            .with_window_size(self.window_size)
            .with_sweep_step(step)
            .with_until_iteration(self.until_iteration)
    }
}

/// Options accepted by the `run` command.
#[derive(Debug, Args, Clone)]
pub struct RunArgs {
    /// Run directory holding the artefacts.
    pub dir: PathBuf,

    /// Override the metadata file name.
    #[arg(long)]
    pub metadata: Option<String>,

    /// Override the trajectory file name.
    #[arg(long)]
    pub trajectories: Option<String>,

    /// Override the interaction log file name.
    #[arg(long)]
    pub interactions: Option<String>,

    /// Override the feasibility trace file name.
    #[arg(long)]
    pub infeasible: Option<String>,

    #[command(flatten)]
    pub matching: BestMatchArgs,

    #[command(flatten)]
    pub columns: ColumnArgs,

    #[command(flatten)]
    pub network: NetworkArgs,
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// An input artefact could not be loaded.
    #[error(transparent)]
    Provider(#[from] ProviderError),
    /// An indicator could not be computed.
    #[error(transparent)]
    Indicator(#[from] IndicatorError),
    /// The run directory could not be opened.
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl CliError {
    /// Returns the stable code of the underlying failure.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Provider(err) => err.code(),
            Self::Indicator(err) => err.source_code(),
            Self::Session(err) => err.code(),
        }
    }
}

/// Summarises the outcome of executing a CLI command.
#[derive(Debug, Clone)]
pub enum ExecutionSummary {
    /// Regression indicator of one metric.
    Regression {
        /// Metric the series was read from.
        metric: String,
        /// Selected slopes and knee.
        indicator: RegressionIndicator,
    },
    /// Trajectory network statistics.
    Trajectory(StnSummary),
    /// Interaction network statistics.
    Interaction(InteractionSummary),
    /// Every indicator of a run directory.
    Run {
        /// Run directory the indicators were computed for.
        root: PathBuf,
        /// Indicator outcomes in reporting order.
        reports: Vec<IndicatorReport>,
    },
}

/// Executes the CLI command represented by `cli`.
///
/// # Errors
/// Returns [`CliError`] when loading or computation fails. The `run` command
/// only fails when the run metadata cannot be read; individual indicator
/// failures are reported in the summary.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use metabehave_cli::cli::{Cli, Command, ExecutionSummary, InteractionArgs, NetworkArgs, run_cli};
/// # use tempfile::NamedTempFile;
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let file = NamedTempFile::new()?;
/// std::fs::write(file.path(), "ig:0 0 1 1 0\n")?;
/// let cli = Cli {
///     command: Command::Interaction(InteractionArgs {
///         path: file.path().to_path_buf(),
///         solution_index: 0,
///         total_iterations: 1,
///         network: NetworkArgs { window_size: 1, sweep_step: None, until_iteration: None },
///     }),
/// };
/// let ExecutionSummary::Interaction(summary) = run_cli(cli)? else {
///     panic!("interaction command must report an interaction summary");
/// };
/// assert_eq!(summary.node_count, 2);
/// # Ok(())
/// # }
/// ```
#[instrument(
    name = "cli.run",
    err,
    skip(cli),
    fields(command = field::Empty),
)]
pub fn run_cli(cli: Cli) -> Result<ExecutionSummary, CliError> {
    let span = Span::current();
    match cli.command {
        Command::Regression(args) => {
            span.record("command", field::display("regression"));
            run_regression(args)
        }
        Command::Stn(args) => {
            span.record("command", field::display("stn"));
            run_stn(args)
        }
        Command::Interaction(args) => {
            span.record("command", field::display("interaction"));
            run_interaction(args)
        }
        Command::Run(args) => {
            span.record("command", field::display("run"));
            run_directory(args)
        }
    }
}

#[instrument(
    name = "cli.regression",
    err,
    skip(args),
    fields(path = %args.path.display(), metric = field::Empty),
)]
pub(super) fn run_regression(args: RegressionArgs) -> Result<ExecutionSummary, CliError> {
    let RegressionArgs {
        path,
        x,
        y,
        before,
        after,
    } = args;
    let metric = derive_metric_name(&path, y.as_deref());
    Span::current().record("metric", field::display(&metric));

    let series = load_series(&path, &x, &metric)?;
    let indicator = RegressionConfig::new()
        .with_slope_indices(SlopeIndices::new(before, after))
        .evaluate(&series)
        .map_err(|err| IndicatorError::regression(metric.as_str(), err))?;
    info!(
        metric = metric.as_str(),
        before = indicator.before,
        after = indicator.after,
        "regression completed"
    );
    Ok(ExecutionSummary::Regression { metric, indicator })
}

#[instrument(name = "cli.stn", err, skip(args), fields(path = %args.path.display()))]
pub(super) fn run_stn(args: StnArgs) -> Result<ExecutionSummary, CliError> {
    let records = load_trajectories(&args.path, &args.columns.columns())?;
    let summary = args
        .matching
        .config()
        .build_graph(&records, args.global_best)
        .map_err(|err| IndicatorError::trajectory("stn", err))?
        .summary();
    info!(
        nodes = summary.n_total,
        best = summary.n_best,
        "trajectory network completed"
    );
    Ok(ExecutionSummary::Trajectory(summary))
}

#[instrument(
    name = "cli.interaction",
    err,
    skip(args),
    fields(path = %args.path.display(), window_size = args.network.window_size),
)]
pub(super) fn run_interaction(args: InteractionArgs) -> Result<ExecutionSummary, CliError> {
    let log = load_interaction_log(&args.path)?;
    let summary = args
        .network
        .config()
        .analyze(&log, args.solution_index, args.total_iterations)
        .map_err(|err| IndicatorError::interaction("interaction", err))?;
    info!(
        nodes = summary.node_count,
        edges = summary.edge_count,
        "interaction network completed"
    );
    Ok(ExecutionSummary::Interaction(summary))
}

#[instrument(
    name = "cli.run_directory",
    err,
    skip(args),
    fields(dir = %args.dir.display(), unavailable = field::Empty),
)]
pub(super) fn run_directory(args: RunArgs) -> Result<ExecutionSummary, CliError> {
    let RunArgs {
        dir,
        metadata,
        trajectories,
        interactions,
        infeasible,
        matching,
        columns,
        network,
    } = args;
    let mut layout = RunLayout::new(&dir);
    if let Some(name) = metadata {
        layout = layout.with_metadata(name);
    }
    if let Some(name) = trajectories {
        layout = layout.with_trajectories(name);
    }
    if let Some(name) = interactions {
        layout = layout.with_interactions(name);
    }
    if let Some(name) = infeasible {
        layout = layout.with_infeasible(name);
    }

    let session = IndicatorSession::with_layout(layout)?
        .with_stn_config(matching.config())
        .with_trajectory_columns(columns.columns())
        .with_interaction_config(network.config());
    let reports = session.report();
    let unavailable = reports.iter().filter(|report| report.value.is_err()).count();
    Span::current().record("unavailable", unavailable);
    info!(
        indicators = reports.len(),
        unavailable, "run directory completed"
    );
    Ok(ExecutionSummary::Run { root: dir, reports })
}

fn load_series(path: &Path, x: &str, y: &str) -> Result<TimeSeries, ProviderError> {
    let is_parquet = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("parquet"));
    if is_parquet {
        load_time_series_parquet(path, x, y)
    } else {
        load_time_series(path, x, y)
    }
}

pub(super) fn derive_metric_name(path: &Path, override_name: Option<&str>) -> String {
    if let Some(name) = override_name {
        return name.to_owned();
    }

    path.file_stem()
        .and_then(|value| value.to_str())
        .map(ToOwned::to_owned)
        .unwrap_or_else(|| "value".to_owned())
}

/// Renders `summary` to `writer` as `name: value` lines.
///
/// Indicators that could not be computed are rendered as `unavailable`
/// followed by the stable error code.
///
/// # Errors
/// Returns [`io::Error`] if writing to the supplied writer fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use std::io::Cursor;
/// # use metabehave_cli::cli::{ExecutionSummary, render_summary};
/// # use metabehave_core::RegressionIndicator;
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let summary = ExecutionSummary::Regression {
///     metric: "diversity".into(),
///     indicator: RegressionIndicator { before: -2.0, after: 0.0, knee_x: 4.0, knee_y: 2.0 },
/// };
/// let mut buffer = Cursor::new(Vec::new());
/// render_summary(&summary, &mut buffer)?;
/// let text = String::from_utf8(buffer.into_inner())?;
/// assert!(text.contains("before: -2"));
/// # Ok(())
/// # }
/// ```
pub fn render_summary(summary: &ExecutionSummary, mut writer: impl Write) -> io::Result<()> {
    match summary {
        ExecutionSummary::Regression { metric, indicator } => {
            writeln!(writer, "metric: {metric}")?;
            writeln!(writer, "before: {}", indicator.before)?;
            writeln!(writer, "after: {}", indicator.after)?;
            writeln!(writer, "knee_x: {}", indicator.knee_x)?;
            writeln!(writer, "knee_y: {}", indicator.knee_y)?;
        }
        ExecutionSummary::Trajectory(stn) => {
            writeln!(writer, "ntotal: {}", stn.n_total)?;
            writeln!(writer, "nbest: {}", stn.n_best)?;
            writeln!(writer, "nshared: {}", stn.n_shared)?;
            writeln!(writer, "best_strength: {}", stn.best_strength)?;
            writeln!(writer, "edges: {}", stn.n_edges)?;
            writeln!(writer, "transitions: {}", stn.n_transitions)?;
            writeln!(writer, "runs: {}", stn.n_runs)?;
        }
        ExecutionSummary::Interaction(network) => {
            writeln!(writer, "IDRoC: {}", network.diversity_rate_of_change)?;
            writeln!(writer, "ID: {}", network.mean_diversity)?;
            writeln!(writer, "GC: {}", network.mean_giant_component)?;
            writeln!(writer, "ISS: {}", network.solution_strength)?;
            writeln!(writer, "nodes: {}", network.node_count)?;
            writeln!(writer, "edges: {}", network.edge_count)?;
            match network.sweep_step {
                SweepStep::DistinctWeights => writeln!(writer, "sweep_step: distinct")?,
                SweepStep::Fixed(step) => writeln!(writer, "sweep_step: {step}")?,
            }
        }
        ExecutionSummary::Run { root, reports } => {
            writeln!(writer, "run: {}", root.display())?;
            for report in reports {
                match &report.value {
                    Ok(value) => writeln!(writer, "{}: {value}", report.name)?,
                    Err(err) => writeln!(writer, "{}: unavailable ({})", report.name, err.code())?,
                }
            }
        }
    }
    Ok(())
}
