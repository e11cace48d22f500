#![allow(dead_code, reason = "each integration test uses a subset of the helpers")]

pub mod recording;

use metabehave_core::{InteractionLog, TimeSeries, TrajectoryRecord};

/// Noiseless two-segment series meeting at `knee`.
#[must_use]
pub fn hinge(metric: &str, knee: f64, before: f64, after: f64, end: u32) -> TimeSeries {
    TimeSeries::from_pairs(
        metric,
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

/// One run visiting `states` in order with the given fitness values.
#[must_use]
pub fn trajectory(run: u64, states: &[(&str, f64)]) -> Vec<TrajectoryRecord> {
    states
        .iter()
        .zip(0_u64..)
        .map(|(&(state, fitness), iteration)| TrajectoryRecord::new(run, iteration, state, fitness))
        .collect()
}

/// A ring of `population` members where each member influences the next once
/// per iteration.
#[must_use]
pub fn ring(population: usize, iterations: u64) -> InteractionLog {
    let pairs: Vec<(usize, usize)> = (0..population)
        .map(|member| (member, (member + 1) % population))
        .collect();
    let mut log = InteractionLog::new(population);
    for iteration in 0..iterations {
        log.push_pairs(iteration, &pairs).expect("ring members are in range");
    }
    log
}
