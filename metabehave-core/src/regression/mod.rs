//! Piecewise regression indicators.
//!
//! A two-segment continuous piecewise-linear model is fitted to a metric
//! series; the slopes before and after the breakpoint describe how quickly the
//! metric changed during the two phases of a run, and the breakpoint itself is
//! the knee marking the phase transition.
//!
//! The same fit backs every rate-of-change indicator (diversity, convergence,
//! accuracy, locality, separation, mobility); only the metric column differs.

mod linear;
mod piecewise;

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, instrument};

use crate::{error::define_error_codes, series::TimeSeries};

pub use self::linear::{LinearFit, ordinary_least_squares};

/// Minimum number of distinct x values needed to identify two segments.
pub const MIN_DISTINCT_X: usize = 4;

/// Errors raised while fitting regression indicators.
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum RegressionError {
    /// Too few distinct x values survived sanitisation.
    #[error("metric `{metric}` has {distinct} distinct x values but {required} are required")]
    InsufficientData {
        /// Metric whose series was too short.
        metric: Arc<str>,
        /// Distinct x values available after cleaning.
        distinct: usize,
        /// Distinct x values required by the fit.
        required: usize,
    },
    /// Every candidate breakpoint produced a singular least-squares system.
    #[error("metric `{metric}` admits no well-conditioned breakpoint")]
    NoFeasibleBreakpoint {
        /// Metric whose series could not be segmented.
        metric: Arc<str>,
    },
    /// A caller requested a slope index the model does not expose.
    #[error("slope index {index} is out of range; the model exposes {available} slopes")]
    SlopeIndexOutOfRange {
        /// Requested zero-based slope index.
        index: usize,
        /// Number of slopes exposed by the model.
        available: usize,
    },
}

define_error_codes! {
    /// Stable codes describing [`RegressionError`] variants.
    enum RegressionErrorCode for RegressionError {
        /// Too few distinct x values survived sanitisation.
        InsufficientData => InsufficientData { .. } => "REGRESSION_INSUFFICIENT_DATA",
        /// Every candidate breakpoint produced a singular system.
        NoFeasibleBreakpoint => NoFeasibleBreakpoint { .. } => "REGRESSION_NO_FEASIBLE_BREAKPOINT",
        /// A caller requested a slope index the model does not expose.
        SlopeIndexOutOfRange => SlopeIndexOutOfRange { .. } => "REGRESSION_SLOPE_INDEX_OUT_OF_RANGE",
    }
}

/// Zero-based indices selecting the two meaningful slopes of a fit.
///
/// # Examples
/// ```
/// use metabehave_core::SlopeIndices;
///
/// let indices = SlopeIndices::default();
/// assert_eq!((indices.before(), indices.after()), (0, 1));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlopeIndices {
    before: usize,
    after: usize,
}

impl Default for SlopeIndices {
    fn default() -> Self {
        Self::new(0, 1)
    }
}

impl SlopeIndices {
    /// Creates a selection of two slope indices.
    #[must_use]
    pub const fn new(before: usize, after: usize) -> Self {
        Self { before, after }
    }

    /// Index of the slope reported as the "before" value.
    #[must_use]
    pub const fn before(&self) -> usize {
        self.before
    }

    /// Index of the slope reported as the "after" value.
    #[must_use]
    pub const fn after(&self) -> usize {
        self.after
    }
}

/// A fitted continuous two-segment linear model.
///
/// The model is `y = b0 + b1 * (x - origin) + b2 * max(0, x - breakpoint)`,
/// which yields slope `b1` before the breakpoint and `b1 + b2` after it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PiecewiseFit {
    origin: f64,
    breakpoint: f64,
    intercept: f64,
    slopes: [f64; 2],
    sum_squared_residuals: f64,
}

impl PiecewiseFit {
    /// Returns the knee x-position.
    #[must_use]
    pub const fn breakpoint(&self) -> f64 {
        self.breakpoint
    }

    /// Returns the segment slopes ordered by segment index.
    #[must_use]
    pub fn slopes(&self) -> &[f64] {
        &self.slopes
    }

    /// Returns the model value at the smallest observed x.
    #[must_use]
    pub const fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Returns the residual sum of squares of the fit.
    #[must_use]
    pub const fn sum_squared_residuals(&self) -> f64 {
        self.sum_squared_residuals
    }

    /// Evaluates the fitted model at `x`.
    #[must_use]
    pub fn predict(&self, x: f64) -> f64 {
        let [before, after] = self.slopes;
        let hinge = (x - self.breakpoint).max(0.0);
        self.intercept + before * (x - self.origin) + (after - before) * hinge
    }

    /// Returns the model prediction at the breakpoint.
    #[must_use]
    pub fn knee_y(&self) -> f64 {
        self.predict(self.breakpoint)
    }

    /// Returns the slope at `index`.
    ///
    /// # Errors
    /// Returns [`RegressionError::SlopeIndexOutOfRange`] when `index` does not
    /// name a segment.
    pub fn slope(&self, index: usize) -> Result<f64, RegressionError> {
        self.slopes
            .get(index)
            .copied()
            .ok_or(RegressionError::SlopeIndexOutOfRange {
                index,
                available: self.slopes.len(),
            })
    }

    /// Reduces the fit to the two selected slopes and the knee point.
    ///
    /// # Errors
    /// Returns [`RegressionError::SlopeIndexOutOfRange`] when either index
    /// does not name a segment.
    pub fn indicator(&self, indices: SlopeIndices) -> Result<RegressionIndicator, RegressionError> {
        Ok(RegressionIndicator {
            before: self.slope(indices.before())?,
            after: self.slope(indices.after())?,
            knee_x: self.breakpoint,
            knee_y: self.knee_y(),
        })
    }
}

/// The four floats reported for a regression indicator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegressionIndicator {
    /// Slope of the segment selected as "before".
    pub before: f64,
    /// Slope of the segment selected as "after".
    pub after: f64,
    /// Knee x-position.
    pub knee_x: f64,
    /// Model prediction at the knee.
    pub knee_y: f64,
}

/// Slope selection applied when reducing a fit to an indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegressionConfig {
    slope_indices: SlopeIndices,
}

impl RegressionConfig {
    /// Creates the default configuration selecting slopes `(0, 1)`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the slope indices.
    #[must_use]
    pub const fn with_slope_indices(mut self, indices: SlopeIndices) -> Self {
        self.slope_indices = indices;
        self
    }

    /// Returns the configured slope indices.
    #[must_use]
    pub const fn slope_indices(&self) -> SlopeIndices {
        self.slope_indices
    }

    /// Fits `series` and reduces the fit to the configured slopes.
    ///
    /// # Errors
    /// Propagates fitting errors from [`fit_regression_indicator`] and
    /// [`RegressionError::SlopeIndexOutOfRange`] for unusable indices.
    pub fn evaluate(&self, series: &TimeSeries) -> Result<RegressionIndicator, RegressionError> {
        fit_regression_indicator(series)?.indicator(self.slope_indices)
    }
}

/// Fits a continuous two-segment piecewise-linear model to `series`.
///
/// The breakpoint is searched jointly with the segment coefficients to
/// minimise the residual sum of squares and always lies strictly inside the
/// observed x-range.
///
/// # Errors
/// Returns [`RegressionError::InsufficientData`] when fewer than
/// [`MIN_DISTINCT_X`] distinct x values are available, and
/// [`RegressionError::NoFeasibleBreakpoint`] when no candidate breakpoint
/// yields a solvable system.
///
/// # Examples
/// ```
/// use metabehave_core::{TimeSeries, fit_regression_indicator};
///
/// let series = TimeSeries::from_pairs(
///     "diversity",
///     (0..=20).map(|i| {
///         let x = f64::from(i);
///         (x, if x <= 10.0 { 2.0 * x } else { 30.0 - x })
///     }),
/// );
/// let fit = fit_regression_indicator(&series)?;
/// assert!((fit.slopes()[0] - 2.0).abs() < 1e-6);
/// assert!((fit.slopes()[1] + 1.0).abs() < 1e-6);
/// assert!((fit.breakpoint() - 10.0).abs() < 1.0);
/// # Ok::<(), metabehave_core::RegressionError>(())
/// ```
#[instrument(
    name = "core.regression.fit",
    err,
    skip(series),
    fields(metric = %series.metric(), samples = series.len()),
)]
pub fn fit_regression_indicator(series: &TimeSeries) -> Result<PiecewiseFit, RegressionError> {
    let distinct = series.distinct_x();
    if distinct.len() < MIN_DISTINCT_X {
        return Err(RegressionError::InsufficientData {
            metric: series.metric_arc(),
            distinct: distinct.len(),
            required: MIN_DISTINCT_X,
        });
    }

    let fit = piecewise::fit_two_segments(series.samples(), &distinct).ok_or_else(|| {
        RegressionError::NoFeasibleBreakpoint {
            metric: series.metric_arc(),
        }
    })?;
    debug!(
        breakpoint = fit.breakpoint,
        slope_before = fit.slopes[0],
        slope_after = fit.slopes[1],
        ssr = fit.sum_squared_residuals,
        "piecewise fit converged"
    );
    Ok(fit)
}

#[cfg(test)]
mod tests;
