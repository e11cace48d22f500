//! Unit tests for interaction network analysis.

use approx::assert_abs_diff_eq;
use proptest::prelude::*;
use rstest::rstest;

use super::*;

/// Four members: a strong `0-1` tie and a weak chain `1-2-3`.
fn chain_log() -> InteractionLog {
    let mut log = InteractionLog::new(4);
    log.push_pairs(0, &[(0, 1), (1, 0), (1, 2)])
        .expect("pairs are in range");
    log.push_pairs(1, &[(0, 1), (2, 3)])
        .expect("pairs are in range");
    log
}

fn values(curve: &GiantComponentCurve) -> Vec<usize> {
    curve.points().iter().map(|point| point.value).collect()
}

fn thresholds(curve: &GiantComponentCurve) -> Vec<f64> {
    curve.points().iter().map(|point| point.threshold).collect()
}

#[test]
fn normalises_weights_by_twice_the_iteration_count() {
    let graph = InteractionConfig::new()
        .build_graph(&chain_log(), 2)
        .expect("graph must build");

    assert_eq!(graph.node_count(), 4);
    assert_eq!(graph.edge_count(), 3);
    assert_eq!(graph.weight(0, 1), Some(0.75));
    assert_eq!(graph.weight(1, 0), Some(0.75));
    assert_eq!(graph.weight(2, 3), Some(0.25));
    assert_eq!(graph.weight(0, 3), None);
    let raw: Vec<(usize, usize, u64)> = graph
        .edges()
        .map(|edge| (edge.source, edge.target, edge.raw))
        .collect();
    assert_eq!(raw, vec![(0, 1, 3), (1, 2, 1), (2, 3, 1)]);
}

#[rstest]
#[case::unit_windows(1, 2)]
#[case::merged_window(2, 1)]
fn windows_count_each_pair_once(#[case] window_size: usize, #[case] expected_raw: u64) {
    let mut log = InteractionLog::new(2);
    log.push_pairs(0, &[(0, 1)]).expect("in range");
    log.push_pairs(1, &[(0, 1)]).expect("in range");
    let graph = InteractionConfig::new()
        .with_window_size(window_size)
        .build_graph(&log, 2)
        .expect("graph must build");
    let edge = graph.edges().next().expect("one edge");
    assert_eq!(edge.raw, expected_raw);
}

#[test]
fn until_iteration_limits_construction() {
    let graph = InteractionConfig::new()
        .with_until_iteration(Some(0))
        .build_graph(&chain_log(), 2)
        .expect("graph must build");
    assert_eq!(graph.node_count(), 3);
    assert!(!graph.contains(3));
    assert_eq!(graph.weight(0, 1), Some(0.5));
}

#[test]
fn self_interactions_are_ignored() {
    let mut log = InteractionLog::new(2);
    log.push_iteration(0, vec![3, 0, 0, 2]).expect("square matrix");
    let graph = InteractionConfig::new()
        .build_graph(&log, 1)
        .expect("graph must build");
    assert_eq!(graph.node_count(), 0);
}

#[test]
fn sweep_records_fragmentation_per_distinct_weight() {
    let graph = InteractionConfig::new()
        .build_graph(&chain_log(), 2)
        .expect("graph must build");
    let curves = low_edges_weight_removal(&graph, SweepStep::DistinctWeights).expect("sweep");

    assert_eq!(thresholds(&curves.components), vec![0.0, 0.25, 0.75]);
    assert_eq!(values(&curves.components), vec![1, 3, 4]);
    assert_eq!(values(&curves.largest), vec![4, 2, 1]);
}

#[test]
fn fixed_step_sweeps_until_heaviest_edge_is_removed() {
    let graph = InteractionConfig::new()
        .build_graph(&chain_log(), 2)
        .expect("graph must build");
    let curves = low_edges_weight_removal(&graph, SweepStep::Fixed(0.5)).expect("sweep");

    assert_eq!(thresholds(&curves.components), vec![0.0, 0.5, 1.0]);
    assert_eq!(values(&curves.components), vec![1, 3, 4]);
}

#[rstest]
#[case::zero(0.0)]
#[case::negative(-0.1)]
#[case::nan(f64::NAN)]
#[case::too_fine(1e-9)]
fn rejects_unusable_fixed_steps(#[case] step: f64) {
    let graph = InteractionConfig::new()
        .build_graph(&chain_log(), 2)
        .expect("graph must build");
    let err = low_edges_weight_removal(&graph, SweepStep::Fixed(step)).expect_err("bad step");
    assert_eq!(err.code(), InteractionErrorCode::InvalidSweepStep);
}

#[test]
fn analyze_reports_every_indicator() {
    let summary = analyze_interaction_network(&chain_log(), 1, 2).expect("analysis");

    assert_abs_diff_eq!(summary.mean_diversity, 8.0 / 3.0, epsilon = 1e-12);
    assert_abs_diff_eq!(summary.mean_giant_component, 7.0 / 3.0, epsilon = 1e-12);
    assert_abs_diff_eq!(summary.diversity_rate_of_change, 26.0 / 7.0, epsilon = 1e-9);
    assert_abs_diff_eq!(summary.solution_strength, 1.0, epsilon = 1e-12);
    assert_eq!((summary.node_count, summary.edge_count), (4, 3));
    assert_eq!(summary.sweep_step, SweepStep::DistinctWeights);
}

#[test]
fn analyze_is_deterministic() {
    let log = chain_log();
    let first = analyze_interaction_network(&log, 3, 2).expect("analysis");
    let second = analyze_interaction_network(&log, 3, 2).expect("analysis");
    assert_eq!(first, second);
    assert_abs_diff_eq!(first.solution_strength, 0.25, epsilon = 1e-12);
}

#[test]
fn empty_network_reports_zeros() {
    let mut log = InteractionLog::new(3);
    log.push_iteration(0, vec![0; 9]).expect("square matrix");
    let summary = analyze_interaction_network(&log, 0, 1).expect("empty network is not an error");
    assert_eq!(summary, InteractionSummary::default());

    let curves = low_edges_weight_removal(
        &InteractionConfig::new()
            .build_graph(&InteractionLog::new(0), 1)
            .expect("graph must build"),
        SweepStep::default(),
    )
    .expect("sweep");
    assert!(curves.components.is_empty());
    assert_abs_diff_eq!(curves.components.mean_value(), 0.0);
}

#[test]
fn unknown_solution_index_is_reported() {
    let err = analyze_interaction_network(&chain_log(), 9, 2).expect_err("member 9 never interacted");
    assert_eq!(err, InteractionError::UnknownSolutionIndex { index: 9, nodes: 4 });
}

#[rstest]
#[case::zero_iterations(InteractionConfig::new(), 0, InteractionErrorCode::InvalidTotalIterations)]
#[case::zero_window(
    InteractionConfig::new().with_window_size(0),
    2,
    InteractionErrorCode::InvalidWindowSize
)]
fn rejects_invalid_construction(
    #[case] config: InteractionConfig,
    #[case] total_iterations: u64,
    #[case] expected: InteractionErrorCode,
) {
    let err = config
        .analyze(&chain_log(), 0, total_iterations)
        .expect_err("construction must fail");
    assert_eq!(err.code(), expected);
}

#[test]
fn initial_population_entry_is_skipped() {
    let mut log = InteractionLog::new(3);
    log.push_pairs(0, &[(0, 2), (2, 0)]).expect("pairs are in range");
    log.push_pairs(1, &[(0, 1), (1, 0)]).expect("pairs are in range");
    log.push_pairs(2, &[(0, 1), (1, 2)]).expect("pairs are in range");

    let graph = InteractionConfig::new()
        .build_graph(&log, 2)
        .expect("an initial entry plus two iterations fits two iterations");
    assert_eq!(graph.weight(0, 2), None);
    assert_eq!(graph.weight(0, 1), Some(0.75));
    assert_eq!(graph.weight(1, 2), Some(0.25));
    assert!(graph.edges().all(|edge| edge.weight <= 1.0));
}

#[rstest]
#[case::one_extra_without_initial_entry(&[1, 2, 3], None, 2, 3)]
#[case::two_extra_with_initial_entry(&[0, 1, 2, 3], None, 2, 4)]
#[case::truncated_log_still_too_long(&[0, 1, 2, 3], Some(2), 1, 3)]
fn rejects_logs_longer_than_the_run(
    #[case] iterations: &[u64],
    #[case] until_iteration: Option<u64>,
    #[case] total_iterations: u64,
    #[case] used: usize,
) {
    let mut log = InteractionLog::new(2);
    for &iteration in iterations {
        log.push_pairs(iteration, &[(0, 1)]).expect("pairs are in range");
    }
    let err = InteractionConfig::new()
        .with_until_iteration(until_iteration)
        .build_graph(&log, total_iterations)
        .expect_err("too many iterations");
    assert_eq!(err, InteractionError::IterationCountMismatch { used, total_iterations });
}

#[test]
fn push_iteration_rejects_ragged_matrix() {
    let mut log = InteractionLog::new(3);
    let err = log
        .push_iteration(4, vec![0; 8])
        .expect_err("eight counts cannot form a 3x3 matrix");
    assert_eq!(
        err,
        InteractionError::RaggedMatrix {
            iteration: 4,
            expected: 9,
            actual: 8
        }
    );
    assert!(log.is_empty());
}

#[test]
fn push_pairs_rejects_unknown_members() {
    let mut log = InteractionLog::new(2);
    let err = log.push_pairs(0, &[(0, 2)]).expect_err("member 2 is out of range");
    assert_eq!(err.code().as_str(), "INTERACTION_MEMBER_OUT_OF_RANGE");
}

#[rstest]
#[case::rises_after_plateau(vec![1, 1, 1, 2, 3, 4], vec![1, 2, 3, 4])]
#[case::no_plateau(vec![2, 3, 5], vec![2, 3, 5])]
fn trim_keeps_last_point_of_leading_run(#[case] input: Vec<usize>, #[case] expected: Vec<usize>) {
    let curve = GiantComponentCurve::from_points(
        input
            .into_iter()
            .zip(0_u32..)
            .map(|(value, i)| CurvePoint {
                threshold: f64::from(i),
                value,
            })
            .collect(),
    );
    let trimmed: Vec<usize> = curve
        .trim_leading()
        .expect("curve changes value")
        .iter()
        .map(|point| point.value)
        .collect();
    assert_eq!(trimmed, expected);
}

#[rstest]
#[case::flat(vec![3, 3, 3])]
#[case::empty(vec![])]
fn flat_curves_are_degenerate(#[case] input: Vec<usize>) {
    let curve = GiantComponentCurve::from_points(
        input
            .into_iter()
            .map(|value| CurvePoint {
                threshold: 0.0,
                value,
            })
            .collect(),
    );
    let err = curve.rate_of_change().expect_err("flat curve");
    assert_eq!(err.code(), InteractionErrorCode::DegenerateCurve);
}

fn arbitrary_log() -> impl Strategy<Value = InteractionLog> {
    prop::collection::vec(prop::collection::vec((0_usize..6, 0_usize..6), 0..8), 1..6).prop_map(
        |iterations| {
            let mut log = InteractionLog::new(6);
            for (pairs, iteration) in iterations.iter().zip(0_u64..) {
                log.push_pairs(iteration, pairs).expect("pairs are in range");
            }
            log
        },
    )
}

proptest! {
    #[test]
    fn sweep_curves_are_monotone(log in arbitrary_log()) {
        let graph = InteractionConfig::new()
            .build_graph(&log, log.len() as u64)
            .expect("graph must build");
        let curves = low_edges_weight_removal(&graph, SweepStep::DistinctWeights).expect("sweep");

        let components = curves.components.points();
        let largest = curves.largest.points();
        prop_assert_eq!(components.len(), largest.len());
        for pair in components.windows(2) {
            prop_assert!(pair[0].threshold < pair[1].threshold);
            prop_assert!(pair[0].value <= pair[1].value);
        }
        for pair in largest.windows(2) {
            prop_assert!(pair[0].value >= pair[1].value);
        }
        if let Some(last) = components.last() {
            prop_assert_eq!(last.value, graph.node_count());
        }
        for edge in graph.edges() {
            prop_assert!(edge.weight > 0.0 && edge.weight <= 1.0);
        }
    }
}
