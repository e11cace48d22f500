//! Interaction network analysis.
//!
//! The interaction network (IN) links population members that influenced one
//! another during a run. Edge weights count how often a pair interacted,
//! normalised by the largest possible count. Sweeping a weight threshold over
//! the network and watching it fall apart yields the interaction diversity
//! and giant-component indicators; the weighted degree of the returned
//! solution measures how much it was influenced.

mod graph;
mod log;
mod sweep;
mod union_find;

use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::error::define_error_codes;

pub use self::{
    graph::{InfluenceEdge, InfluenceGraph},
    log::{InteractionLog, IterationMatrix},
    sweep::{
        CurvePoint, GiantComponentCurve, MAX_SWEEP_STEPS, SweepCurves, SweepStep,
        low_edges_weight_removal,
    },
};

/// Errors raised while building or analysing an interaction network.
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum InteractionError {
    /// An iteration did not provide a square matrix for the population.
    #[error("iteration {iteration} holds {actual} counts but {expected} were expected")]
    RaggedMatrix {
        /// Iteration whose matrix was malformed.
        iteration: u64,
        /// Number of counts required (`population²`).
        expected: usize,
        /// Number of counts supplied.
        actual: usize,
    },
    /// An interaction named a member outside the population.
    #[error("member {member} is outside a population of {population}")]
    MemberOutOfRange {
        /// Offending member index.
        member: usize,
        /// Population size.
        population: usize,
    },
    /// The total iteration count was zero.
    #[error("total iterations must be positive")]
    InvalidTotalIterations,
    /// The window size was zero.
    #[error("window size must be positive")]
    InvalidWindowSize,
    /// The fixed sweep step was unusable.
    #[error("sweep step must be positive, finite and coarse enough (got {step})")]
    InvalidSweepStep {
        /// Rejected step.
        step: f64,
    },
    /// More iterations were logged than the run declared.
    #[error("{used} iterations were logged but the run declared {total_iterations}")]
    IterationCountMismatch {
        /// Iterations used for construction.
        used: usize,
        /// Declared number of iterations.
        total_iterations: u64,
    },
    /// The solution member never interacted.
    #[error("solution index {index} is not one of the {nodes} interacting members")]
    UnknownSolutionIndex {
        /// Requested member.
        index: usize,
        /// Number of nodes in the graph.
        nodes: usize,
    },
    /// A sweep curve never left its first value.
    #[error("curve of {points} points never leaves its initial value {value}")]
    DegenerateCurve {
        /// Value the curve is stuck at.
        value: usize,
        /// Number of points on the curve.
        points: usize,
    },
}

define_error_codes! {
    /// Stable codes describing [`InteractionError`] variants.
    enum InteractionErrorCode for InteractionError {
        /// An iteration did not provide a square matrix.
        RaggedMatrix => RaggedMatrix { .. } => "INTERACTION_RAGGED_MATRIX",
        /// An interaction named a member outside the population.
        MemberOutOfRange => MemberOutOfRange { .. } => "INTERACTION_MEMBER_OUT_OF_RANGE",
        /// The total iteration count was zero.
        InvalidTotalIterations => InvalidTotalIterations => "INTERACTION_INVALID_TOTAL_ITERATIONS",
        /// The window size was zero.
        InvalidWindowSize => InvalidWindowSize => "INTERACTION_INVALID_WINDOW_SIZE",
        /// The fixed sweep step was unusable.
        InvalidSweepStep => InvalidSweepStep { .. } => "INTERACTION_INVALID_SWEEP_STEP",
        /// More iterations were logged than the run declared.
        IterationCountMismatch => IterationCountMismatch { .. } => "INTERACTION_ITERATION_COUNT_MISMATCH",
        /// The solution member never interacted.
        UnknownSolutionIndex => UnknownSolutionIndex { .. } => "INTERACTION_UNKNOWN_SOLUTION_INDEX",
        /// A sweep curve never left its first value.
        DegenerateCurve => DegenerateCurve { .. } => "INTERACTION_DEGENERATE_CURVE",
    }
}

/// Construction and sweep parameters for interaction analysis.
///
/// # Examples
/// ```
/// use metabehave_core::{InteractionConfig, SweepStep};
///
/// let config = InteractionConfig::new()
///     .with_window_size(5)
///     .with_sweep_step(SweepStep::Fixed(0.05))
///     .with_until_iteration(Some(100));
/// assert_eq!(config.window_size(), 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionConfig {
    window_size: usize,
    sweep_step: SweepStep,
    until_iteration: Option<u64>,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            window_size: 1,
            sweep_step: SweepStep::DistinctWeights,
            until_iteration: None,
        }
    }
}

impl InteractionConfig {
    /// Creates the default configuration: unit windows, one sweep step per
    /// distinct weight, and the whole log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of consecutive iterations merged into one window.
    #[must_use]
    pub const fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }

    /// Sets the sweep threshold progression.
    #[must_use]
    pub const fn with_sweep_step(mut self, step: SweepStep) -> Self {
        self.sweep_step = step;
        self
    }

    /// Limits construction to iterations up to and including `until`.
    #[must_use]
    pub const fn with_until_iteration(mut self, until: Option<u64>) -> Self {
        self.until_iteration = until;
        self
    }

    /// Returns the window size.
    #[must_use]
    pub const fn window_size(&self) -> usize {
        self.window_size
    }

    /// Returns the sweep step.
    #[must_use]
    pub const fn sweep_step(&self) -> SweepStep {
        self.sweep_step
    }

    /// Returns the construction bound, if any.
    #[must_use]
    pub const fn until_iteration(&self) -> Option<u64> {
        self.until_iteration
    }

    /// Builds the influence graph described by this configuration.
    ///
    /// # Errors
    /// See [`InfluenceGraph::from_log`].
    pub fn build_graph(
        &self,
        log: &InteractionLog,
        total_iterations: u64,
    ) -> Result<InfluenceGraph, InteractionError> {
        InfluenceGraph::from_log(log, self.window_size, self.until_iteration, total_iterations)
    }

    /// Builds the network and computes every interaction indicator.
    ///
    /// A network that never fragments reports a zero diversity rate of change.
    /// A log without any interaction yields an all-zero summary.
    ///
    /// # Errors
    /// Returns construction errors from [`InfluenceGraph::from_log`],
    /// [`InteractionError::InvalidSweepStep`] for an unusable step, and
    /// [`InteractionError::UnknownSolutionIndex`] when `solution_index` never
    /// interacted in a non-empty network.
    #[instrument(
        name = "core.interaction.analyze",
        err,
        skip(self, log),
        fields(iterations = log.len(), population = log.population()),
    )]
    pub fn analyze(
        &self,
        log: &InteractionLog,
        solution_index: usize,
        total_iterations: u64,
    ) -> Result<InteractionSummary, InteractionError> {
        let sweep_step = self.sweep_step.validate()?;
        let graph = self.build_graph(log, total_iterations)?;
        if graph.edge_count() == 0 {
            warn!("interaction log holds no interactions; reporting zeros");
            return Ok(InteractionSummary {
                sweep_step,
                ..InteractionSummary::default()
            });
        }

        let curves = low_edges_weight_removal(&graph, sweep_step)?;
        let solution_strength = graph.strength(solution_index)?;
        let diversity_rate_of_change = match curves.components.rate_of_change() {
            Ok(slope) => slope,
            Err(err) => {
                warn!(code = %err.code(), "interaction diversity curve is degenerate; reporting zero");
                0.0
            }
        };

        let summary = InteractionSummary {
            mean_diversity: curves.components.mean_value(),
            mean_giant_component: curves.largest.mean_value(),
            diversity_rate_of_change,
            solution_strength,
            node_count: graph.node_count(),
            edge_count: graph.edge_count(),
            sweep_step,
        };
        debug!(?summary, "interaction network analysed");
        Ok(summary)
    }
}

/// Indicators derived from one interaction network.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InteractionSummary {
    /// Mean of the component-count curve (interaction diversity).
    pub mean_diversity: f64,
    /// Mean of the largest-component curve.
    pub mean_giant_component: f64,
    /// Slope of the trimmed component-count curve (IDRoC).
    pub diversity_rate_of_change: f64,
    /// Normalised weighted degree of the solution member (ISS).
    pub solution_strength: f64,
    /// Number of members that interacted.
    pub node_count: usize,
    /// Number of distinct interacting pairs.
    pub edge_count: usize,
    /// Threshold progression used by the sweep.
    pub sweep_step: SweepStep,
}

/// Analyses `interactions` with unit windows and distinct-weight sweeping.
///
/// # Errors
/// See [`InteractionConfig::analyze`].
///
/// # Examples
/// ```
/// use metabehave_core::{InteractionLog, analyze_interaction_network};
///
/// let mut log = InteractionLog::new(3);
/// log.push_pairs(0, &[(0, 1), (1, 0), (1, 2)])?;
/// log.push_pairs(1, &[(0, 1)])?;
/// let summary = analyze_interaction_network(&log, 1, 2)?;
/// assert_eq!(summary.node_count, 3);
/// assert!((summary.solution_strength - 1.0).abs() < 1e-12);
/// # Ok::<(), metabehave_core::InteractionError>(())
/// ```
pub fn analyze_interaction_network(
    interactions: &InteractionLog,
    solution_index: usize,
    total_iterations: u64,
) -> Result<InteractionSummary, InteractionError> {
    InteractionConfig::new().analyze(interactions, solution_index, total_iterations)
}

#[cfg(test)]
mod tests;
