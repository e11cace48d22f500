//! Breakpoint search for the two-segment continuous linear model.
//!
//! For a fixed breakpoint the model is linear in its three coefficients, so
//! each candidate is solved exactly through the normal equations. The search
//! scans every distinct interior x value and every midpoint between
//! neighbouring distinct x values, then refines the best candidate with a
//! golden-section search inside the bracket formed by its neighbours. The
//! refined breakpoint replaces the scanned one only when it strictly lowers the
//! residual sum of squares.

use nalgebra::{Matrix3, Vector3};

use super::PiecewiseFit;
use crate::series::Sample;

const GOLDEN_SECTION_ITERATIONS: usize = 200;
const RELATIVE_BRACKET_TOLERANCE: f64 = 1e-10;

/// Fits the model over `samples` whose distinct x values are `distinct`.
///
/// `distinct` must be sorted ascending and hold at least three values so that
/// an interior breakpoint exists.
pub(super) fn fit_two_segments(samples: &[Sample], distinct: &[f64]) -> Option<PiecewiseFit> {
    let (&origin, &last) = (distinct.first()?, distinct.last()?);
    let candidates = candidate_breakpoints(distinct);

    let mut best: Option<(usize, PiecewiseFit)> = None;
    for (position, &breakpoint) in candidates.iter().enumerate() {
        let Some(fit) = solve_at(samples, origin, breakpoint) else {
            continue;
        };
        let improves = best
            .as_ref()
            .is_none_or(|(_, current)| fit.sum_squared_residuals < current.sum_squared_residuals);
        if improves {
            best = Some((position, fit));
        }
    }

    let (position, scanned) = best?;
    let lower = position
        .checked_sub(1)
        .and_then(|left| candidates.get(left).copied())
        .unwrap_or(origin);
    let upper = candidates.get(position + 1).copied().unwrap_or(last);

    let refined = golden_section(samples, origin, lower, upper, last - origin)
        .filter(|fit| fit.sum_squared_residuals < scanned.sum_squared_residuals);
    Some(refined.unwrap_or(scanned))
}

fn candidate_breakpoints(distinct: &[f64]) -> Vec<f64> {
    let mut candidates = Vec::with_capacity(distinct.len().saturating_mul(2));
    let interior_end = distinct.len().saturating_sub(1);
    for (index, pair) in distinct.windows(2).enumerate() {
        let [left, right] = [pair[0], pair[1]];
        candidates.push(left + (right - left) / 2.0);
        if index + 1 < interior_end {
            candidates.push(right);
        }
    }
    candidates
}

fn golden_section(
    samples: &[Sample],
    origin: f64,
    mut lower: f64,
    mut upper: f64,
    span: f64,
) -> Option<PiecewiseFit> {
    let inverse_phi = (5.0_f64.sqrt() - 1.0) / 2.0;
    let tolerance = span.abs() * RELATIVE_BRACKET_TOLERANCE;
    let score = |breakpoint: f64| {
        solve_at(samples, origin, breakpoint)
            .map_or(f64::INFINITY, |fit| fit.sum_squared_residuals)
    };

    let mut left = upper - inverse_phi * (upper - lower);
    let mut right = lower + inverse_phi * (upper - lower);
    let mut left_score = score(left);
    let mut right_score = score(right);

    for _ in 0..GOLDEN_SECTION_ITERATIONS {
        if upper - lower <= tolerance {
            break;
        }
        if left_score < right_score {
            upper = right;
            right = left;
            right_score = left_score;
            left = upper - inverse_phi * (upper - lower);
            left_score = score(left);
        } else {
            lower = left;
            left = right;
            left_score = right_score;
            right = lower + inverse_phi * (upper - lower);
            right_score = score(right);
        }
    }

    solve_at(samples, origin, lower + (upper - lower) / 2.0)
}

/// Solves the least-squares coefficients for a fixed breakpoint.
fn solve_at(samples: &[Sample], origin: f64, breakpoint: f64) -> Option<PiecewiseFit> {
    let mut gram = Matrix3::<f64>::zeros();
    let mut moment = Vector3::<f64>::zeros();
    for sample in samples {
        let row = design_row(sample.x(), origin, breakpoint);
        gram += row * row.transpose();
        moment += row * sample.y();
    }

    let coefficients = gram.cholesky()?.solve(&moment);
    if coefficients.iter().any(|value| !value.is_finite()) {
        return None;
    }

    let sum_squared_residuals = samples
        .iter()
        .map(|sample| {
            let residual =
                sample.y() - design_row(sample.x(), origin, breakpoint).dot(&coefficients);
            residual * residual
        })
        .sum();

    Some(PiecewiseFit {
        origin,
        breakpoint,
        intercept: coefficients[0],
        slopes: [coefficients[1], coefficients[1] + coefficients[2]],
        sum_squared_residuals,
    })
}

fn design_row(x: f64, origin: f64, breakpoint: f64) -> Vector3<f64> {
    Vector3::new(1.0, x - origin, (x - breakpoint).max(0.0))
}
