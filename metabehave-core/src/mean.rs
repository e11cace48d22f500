//! Mean-based indicators: exploration share, evaluation effort and the share
//! of the run spent in infeasible space.

use std::sync::Arc;

use thiserror::Error;

use crate::{error::define_error_codes, metadata::RunMetadata, series::TimeSeries};

/// Errors raised while computing mean indicators.
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum MeanIndicatorError {
    /// No finite sample survived sanitisation.
    #[error("metric `{metric}` has no finite samples")]
    EmptySeries {
        /// Metric whose series was empty.
        metric: Arc<str>,
    },
    /// The series maximum cannot scale the values into a percentage.
    #[error("metric `{metric}` has non-positive maximum {maximum}")]
    NonPositiveMaximum {
        /// Metric whose series was rejected.
        metric: Arc<str>,
        /// Largest observed value.
        maximum: f64,
    },
    /// The run declared zero iterations.
    #[error("run metadata declares zero iterations")]
    ZeroIterations,
}

define_error_codes! {
    /// Stable codes describing [`MeanIndicatorError`] variants.
    enum MeanIndicatorErrorCode for MeanIndicatorError {
        /// No finite sample survived sanitisation.
        EmptySeries => EmptySeries { .. } => "MEAN_EMPTY_SERIES",
        /// The series maximum cannot scale the values.
        NonPositiveMaximum => NonPositiveMaximum { .. } => "MEAN_NON_POSITIVE_MAXIMUM",
        /// The run declared zero iterations.
        ZeroIterations => ZeroIterations => "MEAN_ZERO_ITERATIONS",
    }
}

/// Mean of every value expressed as a percentage of the series maximum (XPL%).
///
/// # Errors
/// Returns [`MeanIndicatorError::EmptySeries`] for an empty series and
/// [`MeanIndicatorError::NonPositiveMaximum`] when the maximum is not positive.
///
/// # Examples
/// ```
/// use metabehave_core::{TimeSeries, explore_percent};
///
/// let diversity = TimeSeries::from_pairs("diversity", [(0.0, 4.0), (1.0, 2.0), (2.0, 0.0)]);
/// assert!((explore_percent(&diversity)? - 50.0).abs() < 1e-12);
/// # Ok::<(), metabehave_core::MeanIndicatorError>(())
/// ```
pub fn explore_percent(series: &TimeSeries) -> Result<f64, MeanIndicatorError> {
    let maximum = series
        .samples()
        .iter()
        .map(|sample| sample.y())
        .max_by(f64::total_cmp)
        .ok_or_else(|| MeanIndicatorError::EmptySeries {
            metric: series.metric_arc(),
        })?;
    if maximum <= 0.0 {
        return Err(MeanIndicatorError::NonPositiveMaximum {
            metric: series.metric_arc(),
            maximum,
        });
    }
    let total: f64 = series
        .samples()
        .iter()
        .map(|sample| sample.y() / maximum * 100.0)
        .sum();
    Ok(total / series.len() as f64)
}

/// Plain mean of the series values.
///
/// # Errors
/// Returns [`MeanIndicatorError::EmptySeries`] for an empty series.
pub fn series_mean(series: &TimeSeries) -> Result<f64, MeanIndicatorError> {
    if series.is_empty() {
        return Err(MeanIndicatorError::EmptySeries {
            metric: series.metric_arc(),
        });
    }
    let total: f64 = series.samples().iter().map(|sample| sample.y()).sum();
    Ok(total / series.len() as f64)
}

/// Mean number of fitness evaluations per iteration (ENES).
///
/// # Errors
/// Returns [`MeanIndicatorError::ZeroIterations`] when the run declares no
/// iterations.
pub fn evaluation_effort(metadata: &RunMetadata) -> Result<f64, MeanIndicatorError> {
    if metadata.total_iterations == 0 {
        return Err(MeanIndicatorError::ZeroIterations);
    }
    Ok(metadata.fitness_evaluations as f64 / metadata.total_iterations as f64)
}

/// Share of iterations spent in infeasible space.
///
/// # Errors
/// Returns [`MeanIndicatorError::ZeroIterations`] when the run declares no
/// iterations.
pub fn infeasible_share(metadata: &RunMetadata) -> Result<f64, MeanIndicatorError> {
    if metadata.total_iterations == 0 {
        return Err(MeanIndicatorError::ZeroIterations);
    }
    Ok(metadata.infeasible_iterations / metadata.total_iterations as f64)
}
