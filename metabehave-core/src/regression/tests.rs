//! Unit tests for the piecewise regression indicator.

use approx::assert_abs_diff_eq;
use proptest::prelude::*;
use rstest::rstest;

use super::*;
use crate::series::TimeSeries;

fn hinge_series(knee: f64, before: f64, after: f64, end: i32) -> TimeSeries {
    TimeSeries::from_pairs(
        "synthetic",
        (0..=end).map(|i| {
            let x = f64::from(i);
            let y = if x <= knee {
                before * x
            } else {
                before * knee + after * (x - knee)
            };
            (x, y)
        }),
    )
}

#[rstest]
#[case::rise_then_fall(10.0, 2.0, -1.0, 20)]
#[case::fall_then_flat(5.0, -3.0, 0.0, 12)]
#[case::slow_then_fast(14.0, 0.5, 4.0, 30)]
fn recovers_noiseless_two_segment_shape(
    #[case] knee: f64,
    #[case] before: f64,
    #[case] after: f64,
    #[case] end: i32,
) {
    let series = hinge_series(knee, before, after, end);
    let fit = fit_regression_indicator(&series).expect("fit must succeed");

    assert_abs_diff_eq!(fit.slopes()[0], before, epsilon = 1e-3);
    assert_abs_diff_eq!(fit.slopes()[1], after, epsilon = 1e-3);
    assert!((fit.breakpoint() - knee).abs() <= 1.0);
    assert_abs_diff_eq!(fit.knee_y(), before * knee, epsilon = 1e-3);
}

#[test]
fn knee_y_is_model_prediction_not_a_sample() {
    let series = TimeSeries::from_pairs(
        "noisy",
        [
            (0.0, 0.1),
            (1.0, 0.9),
            (2.0, 2.2),
            (3.0, 2.9),
            (4.0, 3.1),
            (5.0, 2.8),
            (6.0, 3.05),
        ],
    );
    let fit = fit_regression_indicator(&series).expect("fit must succeed");
    assert_abs_diff_eq!(fit.knee_y(), fit.predict(fit.breakpoint()), epsilon = 1e-12);
    assert!(fit.breakpoint() > 0.0 && fit.breakpoint() < 6.0);
}

#[test]
fn breakpoint_lies_strictly_inside_observed_range() {
    let series = TimeSeries::from_pairs("linear", (0..10).map(|i| (f64::from(i), 3.0)));
    let fit = fit_regression_indicator(&series).expect("fit must succeed");
    assert!(fit.breakpoint() > 0.0);
    assert!(fit.breakpoint() < 9.0);
    assert_abs_diff_eq!(fit.slopes()[0], 0.0, epsilon = 1e-9);
    assert_abs_diff_eq!(fit.slopes()[1], 0.0, epsilon = 1e-9);
}

#[rstest]
#[case::exactly_minimum(4, true)]
#[case::one_fewer(3, false)]
#[case::single_point(1, false)]
fn enforces_minimum_distinct_x(#[case] points: i32, #[case] accepted: bool) {
    let series = TimeSeries::from_pairs(
        "boundary",
        (0..points).map(|i| (f64::from(i), f64::from(i * i))),
    );
    let result = fit_regression_indicator(&series);
    if accepted {
        assert!(result.is_ok(), "expected fit, got {result:?}");
    } else {
        assert!(matches!(
            result,
            Err(RegressionError::InsufficientData { distinct, required: MIN_DISTINCT_X, .. })
                if distinct == usize::try_from(points).expect("non-negative")
        ));
    }
}

#[test]
fn counts_distinct_x_after_sanitisation() {
    let series = TimeSeries::from_pairs(
        "dirty",
        [
            (0.0, 1.0),
            (1.0, f64::NAN),
            (2.0, 2.0),
            (2.0, 2.5),
            (3.0, f64::INFINITY),
            (4.0, 1.0),
        ],
    );
    let err = fit_regression_indicator(&series).expect_err("three distinct x remain");
    assert_eq!(err.code(), RegressionErrorCode::InsufficientData);
    assert_eq!(err.code().as_str(), "REGRESSION_INSUFFICIENT_DATA");
}

#[rstest]
#[case(SlopeIndices::new(0, 1), Ok((2.0, -1.0)))]
#[case(SlopeIndices::new(1, 0), Ok((-1.0, 2.0)))]
#[case(SlopeIndices::new(0, 2), Err(2))]
fn indicator_selects_requested_slopes(
    #[case] indices: SlopeIndices,
    #[case] expected: Result<(f64, f64), usize>,
) {
    let fit = fit_regression_indicator(&hinge_series(10.0, 2.0, -1.0, 20)).expect("fit");
    match (fit.indicator(indices), expected) {
        (Ok(indicator), Ok((before, after))) => {
            assert_abs_diff_eq!(indicator.before, before, epsilon = 1e-3);
            assert_abs_diff_eq!(indicator.after, after, epsilon = 1e-3);
            assert_abs_diff_eq!(indicator.knee_x, fit.breakpoint());
            assert_abs_diff_eq!(indicator.knee_y, fit.knee_y());
        }
        (Err(RegressionError::SlopeIndexOutOfRange { index, available }), Err(bad)) => {
            assert_eq!(index, bad);
            assert_eq!(available, 2);
        }
        (actual, expected) => panic!("unexpected outcome {actual:?}, expected {expected:?}"),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn fitting_is_idempotent(
        ys in prop::collection::vec(-100.0_f64..100.0, 4..40),
    ) {
        let series = TimeSeries::from_pairs(
            "random",
            ys.iter().enumerate().map(|(i, &y)| (i as f64, y)),
        );
        let first = fit_regression_indicator(&series).expect("fit");
        let second = fit_regression_indicator(&series).expect("fit");
        prop_assert_eq!(first, second);
        prop_assert!(first.breakpoint() > 0.0);
        prop_assert!(first.breakpoint() < (ys.len() - 1) as f64);
    }

    #[test]
    fn recovers_random_hinges(
        knee in 3_i32..17,
        before in -5.0_f64..5.0,
        after in -5.0_f64..5.0,
    ) {
        prop_assume!((before - after).abs() > 0.1);
        let series = hinge_series(f64::from(knee), before, after, 20);
        let fit = fit_regression_indicator(&series).expect("fit");
        prop_assert!((fit.slopes()[0] - before).abs() < 1e-3);
        prop_assert!((fit.slopes()[1] - after).abs() < 1e-3);
        prop_assert!((fit.breakpoint() - f64::from(knee)).abs() <= 1.0);
    }
}
