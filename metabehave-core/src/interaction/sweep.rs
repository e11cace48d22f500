//! Giant-component death curves.
//!
//! Raising a weight threshold removes weak edges and fragments the influence
//! graph. The sweep records the number of connected components and the size
//! of the largest one at every threshold. Instead of deleting edges it
//! replays them from the heaviest to the lightest through a union-find, so
//! each curve is produced in a single pass over the sorted edges.

use tracing::{debug, instrument};

use super::{InfluenceGraph, InteractionError, union_find::DisjointSet};
use crate::regression::ordinary_least_squares;

/// Upper bound on the number of thresholds a fixed step may generate.
pub const MAX_SWEEP_STEPS: usize = 1_000_000;

/// Threshold progression of the sweep.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum SweepStep {
    /// Step from one distinct edge weight to the next.
    #[default]
    DistinctWeights,
    /// Step by a fixed amount of normalised weight.
    Fixed(f64),
}

impl SweepStep {
    pub(super) fn validate(self) -> Result<Self, InteractionError> {
        match self {
            Self::Fixed(step) if !step.is_finite() || step <= 0.0 => {
                Err(InteractionError::InvalidSweepStep { step })
            }
            other => Ok(other),
        }
    }
}

/// One point of a sweep curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurvePoint {
    /// Normalised weight threshold; edges at or below it are removed.
    pub threshold: f64,
    /// Measured value at the threshold.
    pub value: usize,
}

/// A sweep curve ordered by ascending threshold.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GiantComponentCurve {
    points: Vec<CurvePoint>,
}

impl GiantComponentCurve {
    /// Wraps points that are already ordered by ascending threshold.
    #[must_use]
    pub fn from_points(points: Vec<CurvePoint>) -> Self {
        Self { points }
    }

    /// Returns the curve points.
    #[must_use]
    pub fn points(&self) -> &[CurvePoint] {
        &self.points
    }

    /// Returns whether the curve has no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns the mean of the values, or `0.0` for an empty curve.
    #[must_use]
    pub fn mean_value(&self) -> f64 {
        if self.points.is_empty() {
            return 0.0;
        }
        let total: f64 = self.points.iter().map(|point| point.value as f64).sum();
        total / self.points.len() as f64
    }

    /// Drops the leading run of points equal to the first value, keeping the
    /// last point of that run.
    ///
    /// # Errors
    /// Returns [`InteractionError::DegenerateCurve`] when the curve is empty
    /// or never leaves its first value.
    ///
    /// # Examples
    /// ```
    /// use metabehave_core::{CurvePoint, GiantComponentCurve};
    ///
    /// let curve = GiantComponentCurve::from_points(
    ///     [1, 1, 1, 2, 3, 4]
    ///         .into_iter()
    ///         .enumerate()
    ///         .map(|(i, value)| CurvePoint { threshold: i as f64, value })
    ///         .collect(),
    /// );
    /// let values: Vec<usize> = curve.trim_leading()?.iter().map(|p| p.value).collect();
    /// assert_eq!(values, vec![1, 2, 3, 4]);
    /// # Ok::<(), metabehave_core::InteractionError>(())
    /// ```
    pub fn trim_leading(&self) -> Result<&[CurvePoint], InteractionError> {
        let first = self
            .points
            .first()
            .ok_or(InteractionError::DegenerateCurve { value: 0, points: 0 })?;
        let run = self
            .points
            .iter()
            .take_while(|point| point.value == first.value)
            .count();
        if run == self.points.len() {
            return Err(InteractionError::DegenerateCurve {
                value: first.value,
                points: self.points.len(),
            });
        }
        Ok(&self.points[run - 1..])
    }

    /// Returns the least-squares slope of the trimmed curve.
    ///
    /// # Errors
    /// Returns [`InteractionError::DegenerateCurve`] when the curve never
    /// changes value.
    pub fn rate_of_change(&self) -> Result<f64, InteractionError> {
        let trimmed = self.trim_leading()?;
        let points: Vec<(f64, f64)> = trimmed
            .iter()
            .map(|point| (point.threshold, point.value as f64))
            .collect();
        ordinary_least_squares(&points)
            .map(|fit| fit.slope)
            .ok_or(InteractionError::DegenerateCurve {
                value: trimmed[0].value,
                points: trimmed.len(),
            })
    }
}

/// The two curves produced by one sweep.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SweepCurves {
    /// Number of connected components per threshold.
    pub components: GiantComponentCurve,
    /// Size of the largest connected component per threshold.
    pub largest: GiantComponentCurve,
}

/// Sweeps the edge-weight threshold upwards until no edge survives.
///
/// At threshold `t` only edges with normalised weight strictly greater than
/// `t` are kept. The first threshold is `0` (the full graph) and the last is
/// the first one at or above the heaviest edge. An empty graph yields empty
/// curves.
///
/// # Errors
/// Returns [`InteractionError::InvalidSweepStep`] for a non-positive or
/// non-finite fixed step, or one that would produce more than
/// [`MAX_SWEEP_STEPS`] thresholds.
#[instrument(
    name = "core.interaction.sweep",
    err,
    skip(graph),
    fields(nodes = graph.node_count(), edges = graph.edge_count()),
)]
pub fn low_edges_weight_removal(
    graph: &InfluenceGraph,
    step: SweepStep,
) -> Result<SweepCurves, InteractionError> {
    let step = step.validate()?;
    let mut edges = graph.dense_edges();
    if edges.is_empty() {
        return Ok(SweepCurves::default());
    }
    edges.sort_by(|left, right| right.2.total_cmp(&left.2));
    let thresholds = thresholds(&edges, step)?;

    let mut set = DisjointSet::new(graph.node_count());
    let mut pending = edges.iter().peekable();
    let mut components = Vec::with_capacity(thresholds.len());
    let mut largest = Vec::with_capacity(thresholds.len());
    for &threshold in thresholds.iter().rev() {
        while let Some(&(a, b, _)) = pending.next_if(|edge| edge.2 > threshold) {
            set.union(a, b);
        }
        components.push(CurvePoint {
            threshold,
            value: set.components(),
        });
        largest.push(CurvePoint {
            threshold,
            value: set.largest(),
        });
    }
    components.reverse();
    largest.reverse();

    debug!(thresholds = thresholds.len(), "sweep complete");
    Ok(SweepCurves {
        components: GiantComponentCurve::from_points(components),
        largest: GiantComponentCurve::from_points(largest),
    })
}

/// Ascending thresholds; `edges` must be sorted by descending weight.
fn thresholds(edges: &[(usize, usize, f64)], step: SweepStep) -> Result<Vec<f64>, InteractionError> {
    let heaviest = edges.first().map_or(0.0, |edge| edge.2);
    match step {
        SweepStep::DistinctWeights => {
            let mut thresholds = vec![0.0];
            thresholds.extend(edges.iter().rev().map(|edge| edge.2));
            thresholds.dedup();
            Ok(thresholds)
        }
        SweepStep::Fixed(size) => {
            let count = (heaviest / size).ceil();
            if !count.is_finite() || count >= MAX_SWEEP_STEPS as f64 {
                return Err(InteractionError::InvalidSweepStep { step: size });
            }
            let mut thresholds = Vec::with_capacity(count as usize + 1);
            let mut k = 0_u32;
            loop {
                let threshold = f64::from(k) * size;
                thresholds.push(threshold);
                if threshold >= heaviest {
                    break;
                }
                k += 1;
            }
            Ok(thresholds)
        }
    }
}
