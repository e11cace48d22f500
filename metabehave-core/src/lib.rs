//! Behavioural indicators for metaheuristic runs.
//!
//! The engine turns the traces of an optimisation run into numbers that
//! describe how the search behaved: piecewise regression slopes over
//! per-iteration metrics, the topology of the search trajectory network, and
//! the fragmentation of the interaction network between population members.
#![cfg_attr(docsrs, feature(doc_cfg))]

mod error;
mod interaction;
mod mean;
mod metadata;
mod regression;
mod series;
mod stn;

pub use crate::{
    error::{IndicatorError, IndicatorErrorCode, Result},
    interaction::{
        CurvePoint, GiantComponentCurve, InfluenceEdge, InfluenceGraph, InteractionConfig,
        InteractionError, InteractionErrorCode, InteractionLog, InteractionSummary,
        IterationMatrix, MAX_SWEEP_STEPS, SweepCurves, SweepStep, analyze_interaction_network,
        low_edges_weight_removal,
    },
    mean::{
        MeanIndicatorError, MeanIndicatorErrorCode, evaluation_effort, explore_percent,
        infeasible_share, series_mean,
    },
    metadata::RunMetadata,
    regression::{
        LinearFit, MIN_DISTINCT_X, PiecewiseFit, RegressionConfig, RegressionError,
        RegressionErrorCode, RegressionIndicator, SlopeIndices, fit_regression_indicator,
        ordinary_least_squares,
    },
    series::{Sample, TimeSeries},
    stn::{
        DEFAULT_RELATIVE_DELTA, StateNode, StnConfig, StnError, StnErrorCode, StnGraph, StnSummary,
        TrajectoryRecord, build_stn,
    },
};
