//! Per-run context shared by every indicator of a run.

/// Facts recorded about one optimisation run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunMetadata {
    /// Number of objective-function evaluations performed.
    pub fitness_evaluations: u64,
    /// Number of iterations the run lasted.
    pub total_iterations: u64,
    /// Number of iterations spent in infeasible space; may be fractional when
    /// averaged over the population.
    pub infeasible_iterations: f64,
    /// Best fitness known for the problem instance.
    pub global_best_fitness: f64,
    /// Population index of the solution the run returned.
    pub solution_index: usize,
}
