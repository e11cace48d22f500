//! Search trajectory networks.
//!
//! A search trajectory network (STN) records every distinct state visited by
//! one or more search trajectories as a node and every observed transition as
//! a weighted directed edge. Its topology summarises how local the search was:
//! many shared nodes indicate repeated visits to the same region, while a high
//! in-degree at the best nodes indicates that many paths converged on the
//! optimum.

mod graph;

use thiserror::Error;
use tracing::{debug, instrument};

use crate::error::define_error_codes;

pub use self::graph::{StateNode, StnGraph};

/// Relative tolerance used when best-fit delta matching is enabled.
pub const DEFAULT_RELATIVE_DELTA: f64 = 1e-6;

/// Errors raised while building or summarising a search trajectory network.
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum StnError {
    /// The trajectories contained no records.
    #[error("trajectory input produced no nodes")]
    EmptyTrajectory,
    /// A record carried a NaN or infinite fitness.
    #[error("run {run} iteration {iteration} has a non-finite fitness")]
    NonFiniteFitness {
        /// Run that produced the record.
        run: u64,
        /// Iteration of the offending record.
        iteration: u64,
    },
    /// The global best fitness was NaN or infinite.
    #[error("global best fitness must be finite (got {value})")]
    NonFiniteGlobalBest {
        /// Rejected best fitness.
        value: f64,
    },
    /// The configured relative delta was negative or non-finite.
    #[error("relative best-fit delta must be finite and non-negative (got {value})")]
    InvalidDelta {
        /// Rejected delta.
        value: f64,
    },
}

define_error_codes! {
    /// Stable codes describing [`StnError`] variants.
    enum StnErrorCode for StnError {
        /// The trajectories contained no records.
        EmptyTrajectory => EmptyTrajectory => "STN_EMPTY_TRAJECTORY",
        /// A record carried a NaN or infinite fitness.
        NonFiniteFitness => NonFiniteFitness { .. } => "STN_NON_FINITE_FITNESS",
        /// The global best fitness was NaN or infinite.
        NonFiniteGlobalBest => NonFiniteGlobalBest { .. } => "STN_NON_FINITE_GLOBAL_BEST",
        /// The configured relative delta was negative or non-finite.
        InvalidDelta => InvalidDelta { .. } => "STN_INVALID_DELTA",
    }
}

/// One row of a trajectory log.
#[derive(Debug, Clone, PartialEq)]
pub struct TrajectoryRecord {
    /// Identifier of the trajectory (run) the record belongs to.
    pub run: u64,
    /// Iteration at which the state was observed.
    pub iteration: u64,
    /// Structural key of the visited state.
    pub state: String,
    /// Fitness of the state when it was observed.
    pub fitness: f64,
}

impl TrajectoryRecord {
    /// Creates a record.
    pub fn new(run: u64, iteration: u64, state: impl Into<String>, fitness: f64) -> Self {
        Self {
            run,
            iteration,
            state: state.into(),
            fitness,
        }
    }
}

/// How a state's fitness is matched against the global best.
///
/// # Examples
/// ```
/// use metabehave_core::StnConfig;
///
/// let exact = StnConfig::new().with_best_fit_delta(false);
/// assert!(exact.matches_best(1.0, 1.0));
/// assert!(!exact.matches_best(1.0 + 1e-9, 1.0));
///
/// let tolerant = StnConfig::new();
/// assert!(tolerant.matches_best(1.0 + 1e-9, 1.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StnConfig {
    best_fit_delta: bool,
    relative_delta: f64,
}

impl Default for StnConfig {
    fn default() -> Self {
        Self {
            best_fit_delta: true,
            relative_delta: DEFAULT_RELATIVE_DELTA,
        }
    }
}

impl StnConfig {
    /// Creates the default configuration with delta matching enabled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables tolerant best-fit matching.
    #[must_use]
    pub const fn with_best_fit_delta(mut self, enabled: bool) -> Self {
        self.best_fit_delta = enabled;
        self
    }

    /// Overrides the relative tolerance used when delta matching is enabled.
    #[must_use]
    pub const fn with_relative_delta(mut self, delta: f64) -> Self {
        self.relative_delta = delta;
        self
    }

    /// Returns whether tolerant best-fit matching is enabled.
    #[must_use]
    pub const fn best_fit_delta(&self) -> bool {
        self.best_fit_delta
    }

    /// Returns the relative tolerance.
    #[must_use]
    pub const fn relative_delta(&self) -> f64 {
        self.relative_delta
    }

    /// Decides whether `fitness` counts as the global `best`.
    ///
    /// Tolerant matching accepts `|fitness - best| <= delta * max(1, |best|)`.
    #[must_use]
    pub fn matches_best(&self, fitness: f64, best: f64) -> bool {
        if self.best_fit_delta {
            (fitness - best).abs() <= self.relative_delta * best.abs().max(1.0)
        } else {
            fitness == best
        }
    }

    fn validate(&self, global_best_fitness: f64) -> Result<(), StnError> {
        if !self.relative_delta.is_finite() || self.relative_delta < 0.0 {
            return Err(StnError::InvalidDelta {
                value: self.relative_delta,
            });
        }
        if !global_best_fitness.is_finite() {
            return Err(StnError::NonFiniteGlobalBest {
                value: global_best_fitness,
            });
        }
        Ok(())
    }

    /// Builds the network for `records` against `global_best_fitness`.
    ///
    /// # Errors
    /// Returns [`StnError::EmptyTrajectory`] when no record is supplied,
    /// [`StnError::NonFiniteFitness`] for records with NaN or infinite
    /// fitness, and configuration errors for an invalid delta or best value.
    #[instrument(
        name = "core.stn.build",
        err,
        skip(self, records),
        fields(records = records.len(), best_fit_delta = self.best_fit_delta),
    )]
    pub fn build_graph(
        &self,
        records: &[TrajectoryRecord],
        global_best_fitness: f64,
    ) -> Result<StnGraph, StnError> {
        self.validate(global_best_fitness)?;
        let graph = StnGraph::build(records, |fitness| {
            self.matches_best(fitness, global_best_fitness)
        })?;
        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "search trajectory network built"
        );
        Ok(graph)
    }
}

/// Topological statistics of a search trajectory network.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StnSummary {
    /// Number of distinct states.
    pub n_total: usize,
    /// Number of states matching the global best.
    pub n_best: usize,
    /// Number of states visited at least twice.
    pub n_shared: usize,
    /// Sum over best states of in-degree normalised by the number of
    /// distinct non-self-loop edges.
    pub best_strength: f64,
    /// Number of distinct edges, self-loops included.
    pub n_edges: usize,
    /// Total number of observed transitions.
    pub n_transitions: u64,
    /// Number of distinct runs.
    pub n_runs: usize,
}

/// Builds a search trajectory network and summarises its topology.
///
/// `best_fit_delta` selects tolerant matching against `global_best_fitness`
/// using [`DEFAULT_RELATIVE_DELTA`]; use [`StnConfig`] for a custom delta.
///
/// # Errors
/// Returns [`StnError::EmptyTrajectory`] when the input yields no nodes and
/// [`StnError::NonFiniteFitness`] when a record carries a non-finite fitness.
///
/// # Examples
/// ```
/// use metabehave_core::{TrajectoryRecord, build_stn};
///
/// let records: Vec<_> = (0..5)
///     .map(|iteration| TrajectoryRecord::new(0, iteration, "x=1", 0.0))
///     .collect();
/// let summary = build_stn(&records, 0.0, true)?;
/// assert_eq!(summary.n_total, 1);
/// assert_eq!(summary.n_shared, 1);
/// assert_eq!(summary.n_transitions, 4);
/// # Ok::<(), metabehave_core::StnError>(())
/// ```
pub fn build_stn(
    trajectories: &[TrajectoryRecord],
    global_best_fitness: f64,
    best_fit_delta: bool,
) -> Result<StnSummary, StnError> {
    let graph = StnConfig::new()
        .with_best_fit_delta(best_fit_delta)
        .build_graph(trajectories, global_best_fitness)?;
    Ok(graph.summary())
}
