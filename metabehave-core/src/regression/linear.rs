//! Ordinary least-squares line fitting.

/// Slope and intercept of a fitted straight line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    /// Change in y per unit of x.
    pub slope: f64,
    /// Value of the line at `x = 0`.
    pub intercept: f64,
}

/// Fits `y = slope * x + intercept` to `points` by ordinary least squares.
///
/// Returns `None` when fewer than two distinct x values are present, since
/// the slope is undefined in that case.
///
/// # Examples
/// ```
/// use metabehave_core::ordinary_least_squares;
///
/// let fit = ordinary_least_squares(&[(0.0, 1.0), (1.0, 3.0), (2.0, 5.0)]).expect("line");
/// assert!((fit.slope - 2.0).abs() < 1e-12);
/// assert!((fit.intercept - 1.0).abs() < 1e-12);
/// ```
#[must_use]
pub fn ordinary_least_squares(points: &[(f64, f64)]) -> Option<LinearFit> {
    if points.is_empty() {
        return None;
    }
    let count = points.len() as f64;
    let (sum_x, sum_y) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), &(x, y)| (sx + x, sy + y));
    let (mean_x, mean_y) = (sum_x / count, sum_y / count);

    let (covariance, variance) = points.iter().fold((0.0, 0.0), |(cov, var), &(x, y)| {
        let dx = x - mean_x;
        (cov + dx * (y - mean_y), var + dx * dx)
    });
    if variance <= 0.0 {
        return None;
    }

    let slope = covariance / variance;
    Some(LinearFit {
        slope,
        intercept: mean_y - slope * mean_x,
    })
}
