//! Sanitised per-iteration metric series.

use std::{fmt, sync::Arc};

use tracing::warn;

/// A single `(x, y)` observation of a metric.
///
/// # Examples
/// ```
/// use metabehave_core::Sample;
///
/// let sample = Sample::new(3.0, 0.5);
/// assert_eq!(sample.x(), 3.0);
/// assert_eq!(sample.y(), 0.5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    x: f64,
    y: f64,
}

impl Sample {
    /// Creates a sample from its coordinates.
    #[rustfmt::skip]
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self { Self { x, y } }

    /// Returns the iteration coordinate.
    #[rustfmt::skip]
    #[must_use]
    pub const fn x(&self) -> f64 { self.x }

    /// Returns the metric value.
    #[rustfmt::skip]
    #[must_use]
    pub const fn y(&self) -> f64 { self.y }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Ordered metric samples with every non-finite row removed.
///
/// Rows holding NaN or an infinity in either coordinate are dropped on
/// construction; survivors keep their relative order.
///
/// # Examples
/// ```
/// use metabehave_core::TimeSeries;
///
/// let series = TimeSeries::from_pairs(
///     "diversity",
///     [(0.0, 1.0), (1.0, f64::NAN), (2.0, 0.5), (3.0, f64::INFINITY)],
/// );
/// assert_eq!(series.len(), 2);
/// assert_eq!(series.dropped(), 2);
/// assert_eq!(series.metric(), "diversity");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    metric: Arc<str>,
    samples: Vec<Sample>,
    dropped: usize,
}

impl TimeSeries {
    /// Builds a series from samples, dropping non-finite rows.
    pub fn from_samples(
        metric: impl Into<Arc<str>>,
        samples: impl IntoIterator<Item = Sample>,
    ) -> Self {
        let metric = metric.into();
        let mut dropped = 0_usize;
        let samples: Vec<Sample> = samples
            .into_iter()
            .filter(|sample| {
                let keep = sample.is_finite();
                if !keep {
                    dropped += 1;
                }
                keep
            })
            .collect();
        if dropped > 0 {
            warn!(metric = %metric, dropped, kept = samples.len(), "dropped non-finite rows");
        }
        Self {
            metric,
            samples,
            dropped,
        }
    }

    /// Builds a series from `(x, y)` tuples, dropping non-finite rows.
    pub fn from_pairs(
        metric: impl Into<Arc<str>>,
        pairs: impl IntoIterator<Item = (f64, f64)>,
    ) -> Self {
        Self::from_samples(metric, pairs.into_iter().map(|(x, y)| Sample::new(x, y)))
    }

    /// Returns the name of the metric held by the series.
    #[must_use]
    pub fn metric(&self) -> &str {
        &self.metric
    }

    pub(crate) fn metric_arc(&self) -> Arc<str> {
        Arc::clone(&self.metric)
    }

    /// Returns the surviving samples in input order.
    #[must_use]
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Returns the number of surviving samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns whether no sample survived sanitisation.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Returns how many rows were removed for holding non-finite values.
    #[must_use]
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Returns the distinct x values in ascending order.
    ///
    /// # Examples
    /// ```
    /// use metabehave_core::TimeSeries;
    ///
    /// let series = TimeSeries::from_pairs("fitness", [(2.0, 1.0), (0.0, 1.0), (2.0, 3.0)]);
    /// assert_eq!(series.distinct_x(), vec![0.0, 2.0]);
    /// ```
    #[must_use]
    pub fn distinct_x(&self) -> Vec<f64> {
        let mut xs: Vec<f64> = self.samples.iter().map(Sample::x).collect();
        xs.sort_by(f64::total_cmp);
        xs.dedup();
        xs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[rstest]
    #[case::nan_x(f64::NAN, 1.0)]
    #[case::nan_y(1.0, f64::NAN)]
    #[case::positive_infinity(1.0, f64::INFINITY)]
    #[case::negative_infinity(f64::NEG_INFINITY, 1.0)]
    fn drops_non_finite_rows(#[case] x: f64, #[case] y: f64) {
        let series = TimeSeries::from_pairs("metric", [(0.0, 0.0), (x, y), (2.0, 2.0)]);
        assert_eq!(series.dropped(), 1);
        assert_eq!(
            series.samples(),
            &[Sample::new(0.0, 0.0), Sample::new(2.0, 2.0)]
        );
    }

    #[test]
    fn preserves_order_of_survivors() {
        let series = TimeSeries::from_pairs(
            "metric",
            [(3.0, 1.0), (f64::NAN, 0.0), (1.0, 2.0), (2.0, 3.0)],
        );
        let xs: Vec<f64> = series.samples().iter().map(Sample::x).collect();
        assert_eq!(xs, vec![3.0, 1.0, 2.0]);
    }

    #[test]
    fn empty_input_yields_empty_series() {
        let series = TimeSeries::from_pairs("metric", std::iter::empty());
        assert!(series.is_empty());
        assert!(series.distinct_x().is_empty());
    }
}
