mod common;

use approx::assert_abs_diff_eq;
use metabehave_core::{
    InteractionConfig, InteractionLog, RegressionConfig, SlopeIndices, StnConfig, SweepStep,
    analyze_interaction_network, build_stn, fit_regression_indicator,
};
use rstest::rstest;

use common::{hinge, ring, trajectory};

#[test]
fn regression_indicator_reports_slopes_and_knee() {
    let series = hinge("distance", 12.0, -2.0, -0.25, 40);
    let indicator = RegressionConfig::new()
        .evaluate(&series)
        .expect("indicator must be computed");

    assert_abs_diff_eq!(indicator.before, -2.0, epsilon = 1e-3);
    assert_abs_diff_eq!(indicator.after, -0.25, epsilon = 1e-3);
    assert!((indicator.knee_x - 12.0).abs() <= 1.0);
    assert_abs_diff_eq!(indicator.knee_y, -24.0, epsilon = 1e-2);
}

#[test]
fn swapped_slope_indices_swap_the_report() {
    let series = hinge("value", 8.0, 1.0, 3.0, 20);
    let forward = RegressionConfig::new().evaluate(&series).expect("indicator");
    let swapped = RegressionConfig::new()
        .with_slope_indices(SlopeIndices::new(1, 0))
        .evaluate(&series)
        .expect("indicator");
    assert_abs_diff_eq!(forward.before, swapped.after);
    assert_abs_diff_eq!(forward.after, swapped.before);
}

#[test]
fn regression_is_deterministic_across_calls() {
    let series = hinge("diversity", 5.5, 4.0, -1.0, 15);
    let first = fit_regression_indicator(&series).expect("fit");
    let second = fit_regression_indicator(&series).expect("fit");
    assert_eq!(first, second);
}

#[test]
fn identical_states_form_a_single_self_looped_node() {
    let records = trajectory(0, &[("s", 3.0); 5]);
    let summary = build_stn(&records, 3.0, true).expect("network");
    assert_eq!(summary.n_total, 1);
    assert_eq!(summary.n_shared, 1);
    assert_eq!(summary.n_edges, 1);
    assert_eq!(summary.n_transitions, 4);
}

#[test]
fn single_iteration_run_contributes_a_node_without_edges() {
    let records = trajectory(0, &[("only", 1.0)]);
    let summary = build_stn(&records, 0.0, true).expect("network");
    assert_eq!(summary.n_total, 1);
    assert_eq!(summary.n_edges, 0);
    assert_eq!(summary.n_best, 0);
    assert_abs_diff_eq!(summary.best_strength, 0.0);
}

#[test]
fn shared_states_across_runs_are_counted_once() {
    let mut records = trajectory(0, &[("a", 4.0), ("m", 2.0), ("best", 0.0)]);
    records.extend(trajectory(1, &[("b", 5.0), ("m", 2.0), ("best", 0.0)]));
    let graph = StnConfig::new().build_graph(&records, 0.0).expect("network");
    let summary = graph.summary();

    assert_eq!(summary.n_total, 4);
    assert_eq!(summary.n_shared, 2);
    assert_eq!(summary.n_best, 1);
    assert_eq!(graph.transitions("m", "best"), Some(2));
    assert_abs_diff_eq!(summary.best_strength, 1.0 / 3.0, epsilon = 1e-12);
}

#[test]
fn ring_network_fragments_in_one_step() {
    let summary = analyze_interaction_network(&ring(4, 3), 0, 3).expect("analysis");

    assert_abs_diff_eq!(summary.mean_diversity, 2.5);
    assert_abs_diff_eq!(summary.mean_giant_component, 2.5);
    assert_abs_diff_eq!(summary.diversity_rate_of_change, 6.0, epsilon = 1e-9);
    assert_abs_diff_eq!(summary.solution_strength, 1.0, epsilon = 1e-12);
}

#[rstest]
#[case::distinct(SweepStep::DistinctWeights)]
#[case::fixed(SweepStep::Fixed(0.1))]
fn sweep_policy_is_recorded(#[case] step: SweepStep) {
    let summary = InteractionConfig::new()
        .with_sweep_step(step)
        .analyze(&ring(5, 2), 2, 2)
        .expect("analysis");
    assert_eq!(summary.sweep_step, step);
    assert_eq!(summary.node_count, 5);
}

#[test]
fn network_without_interactions_does_not_fail() {
    let summary = analyze_interaction_network(&InteractionLog::new(4), 0, 10).expect("analysis");
    assert_abs_diff_eq!(summary.mean_diversity, 0.0);
    assert_abs_diff_eq!(summary.mean_giant_component, 0.0);
    assert_abs_diff_eq!(summary.diversity_rate_of_change, 0.0);
    assert!(summary.solution_strength.is_finite());
}
