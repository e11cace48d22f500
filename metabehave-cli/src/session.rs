//! Per-run memoisation of indicator groups.
//!
//! An [`IndicatorSession`] binds one run directory. Each indicator group is
//! loaded and computed at most once; the cached `Result` is returned on every
//! later call, so a zero-valued indicator is never recomputed and a failed
//! group keeps reporting the same error without touching the disk again.

use std::{path::PathBuf, sync::Arc};

use metabehave_core::{
    IndicatorError, InteractionConfig, InteractionSummary, RegressionConfig, RegressionIndicator,
    RunMetadata, StnConfig, StnSummary, TimeSeries, evaluation_effort, explore_percent,
    infeasible_share, series_mean,
};
use metabehave_providers_csv::{
    ProviderError, RunLayout, TrajectoryColumns, load_interaction_log, load_metadata,
    load_time_series, load_trajectories,
};
use once_cell::unsync::OnceCell;
use thiserror::Error;
use tracing::{debug, instrument};

const ITERATION_COLUMN: &str = "iteration";
const INFEASIBLE_COLUMN: &str = "f_percent";

/// Failure to produce one indicator group of a session.
#[derive(Debug, Clone, Error)]
pub enum SessionError {
    /// The artefact backing the indicator could not be loaded.
    #[error("indicator `{indicator}` could not load its input: {source}")]
    Provider {
        /// Indicator group whose input failed to load.
        indicator: &'static str,
        /// Loader failure, shared between cached copies.
        #[source]
        source: Arc<ProviderError>,
    },
    /// The indicator could not be computed from its input.
    #[error(transparent)]
    Indicator(#[from] IndicatorError),
}

impl SessionError {
    fn provider(indicator: &'static str, source: ProviderError) -> Self {
        Self::Provider {
            indicator,
            source: Arc::new(source),
        }
    }

    /// Returns the stable code of the underlying failure.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Provider { source, .. } => source.code(),
            Self::Indicator(err) => err.source_code(),
        }
    }
}

/// One named indicator and its outcome.
#[derive(Debug, Clone)]
pub struct IndicatorReport {
    /// Conventional indicator name, such as `DRoC` or `XPL%`.
    pub name: &'static str,
    /// Computed value or the reason it is unavailable.
    pub value: Result<f64, SessionError>,
}

/// Lazily computed indicators of one run directory.
///
/// # Examples
/// ```no_run
/// use metabehave_cli::session::IndicatorSession;
///
/// let session = IndicatorSession::open("runs/ga-0")?;
/// for report in session.report() {
///     println!("{}: {:?}", report.name, report.value.ok());
/// }
/// # Ok::<(), metabehave_cli::session::SessionError>(())
/// ```
#[derive(Debug)]
pub struct IndicatorSession {
    layout: RunLayout,
    metadata: RunMetadata,
    regression: RegressionConfig,
    stn: StnConfig,
    interaction: InteractionConfig,
    columns: TrajectoryColumns,
    diversity_series: OnceCell<Result<TimeSeries, SessionError>>,
    diversity: OnceCell<Result<RegressionIndicator, SessionError>>,
    distance: OnceCell<Result<RegressionIndicator, SessionError>>,
    value: OnceCell<Result<RegressionIndicator, SessionError>>,
    trajectories: OnceCell<Result<StnSummary, SessionError>>,
    interactions: OnceCell<Result<InteractionSummary, SessionError>>,
    infeasible: OnceCell<Result<f64, SessionError>>,
}

impl IndicatorSession {
    /// Opens the run directory at `root` with the default file layout.
    ///
    /// # Errors
    /// Returns [`SessionError::Provider`] when `metadata.json` cannot be read.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, SessionError> {
        Self::with_layout(RunLayout::new(root))
    }

    /// Opens a run directory described by `layout`.
    ///
    /// The metadata file is read eagerly; every other artefact is loaded on
    /// first use.
    ///
    /// # Errors
    /// Returns [`SessionError::Provider`] when the metadata cannot be read.
    #[instrument(
        name = "cli.session.open",
        err,
        skip(layout),
        fields(root = %layout.root().display()),
    )]
    pub fn with_layout(layout: RunLayout) -> Result<Self, SessionError> {
        let metadata = load_metadata(layout.metadata())
            .map_err(|err| SessionError::provider("metadata", err))?;
        debug!(?metadata, "run metadata loaded");
        Ok(Self {
            layout,
            metadata,
            regression: RegressionConfig::default(),
            stn: StnConfig::default(),
            interaction: InteractionConfig::default(),
            columns: TrajectoryColumns::default(),
            diversity_series: OnceCell::new(),
            diversity: OnceCell::new(),
            distance: OnceCell::new(),
            value: OnceCell::new(),
            trajectories: OnceCell::new(),
            interactions: OnceCell::new(),
            infeasible: OnceCell::new(),
        })
    }

    /// Replaces the regression configuration.
    #[must_use]
    pub fn with_regression_config(mut self, config: RegressionConfig) -> Self {
        self.regression = config;
        self
    }

    /// Replaces the trajectory network configuration.
    #[must_use]
    pub fn with_stn_config(mut self, config: StnConfig) -> Self {
        self.stn = config;
        self
    }

    /// Replaces the interaction network configuration.
    #[must_use]
    pub fn with_interaction_config(mut self, config: InteractionConfig) -> Self {
        self.interaction = config;
        self
    }

    /// Replaces the trajectory column names.
    #[must_use]
    pub fn with_trajectory_columns(mut self, columns: TrajectoryColumns) -> Self {
        self.columns = columns;
        self
    }

    /// Returns the metadata of the run.
    #[must_use]
    pub const fn metadata(&self) -> &RunMetadata {
        &self.metadata
    }

    /// Returns the file layout of the run.
    #[must_use]
    pub const fn layout(&self) -> &RunLayout {
        &self.layout
    }

    fn diversity_series(&self) -> Result<&TimeSeries, SessionError> {
        self.diversity_series
            .get_or_init(|| {
                load_time_series(self.layout.diversity(), ITERATION_COLUMN, "diversity")
                    .map_err(|err| SessionError::provider("diversity", err))
            })
            .as_ref()
            .map_err(Clone::clone)
    }

    /// Returns the diversity regression (DRoC, CRoC and the knee).
    ///
    /// # Errors
    /// Returns the cached load or fit failure of the diversity group.
    pub fn diversity(&self) -> Result<RegressionIndicator, SessionError> {
        self.diversity
            .get_or_init(|| {
                let series = self.diversity_series()?;
                self.regression
                    .evaluate(series)
                    .map_err(|err| IndicatorError::regression("diversity", err).into())
            })
            .clone()
    }

    fn regression_group(
        &self,
        cell: &OnceCell<Result<RegressionIndicator, SessionError>>,
        path: PathBuf,
        metric: &'static str,
    ) -> Result<RegressionIndicator, SessionError> {
        cell.get_or_init(|| {
            let series = load_time_series(path, ITERATION_COLUMN, metric)
                .map_err(|err| SessionError::provider(metric, err))?;
            self.regression
                .evaluate(&series)
                .map_err(|err| IndicatorError::regression(metric, err).into())
        })
        .clone()
    }

    /// Returns the distance-to-best regression (ARoC_A, LRoC_A and the knee).
    ///
    /// # Errors
    /// Returns the cached load or fit failure of the distance group.
    pub fn distance(&self) -> Result<RegressionIndicator, SessionError> {
        self.regression_group(&self.distance, self.layout.distance(), "distance")
    }

    /// Returns the value-to-best regression (ARoC_B, LRoC_B and the knee).
    ///
    /// # Errors
    /// Returns the cached load or fit failure of the value group.
    pub fn value(&self) -> Result<RegressionIndicator, SessionError> {
        self.regression_group(&self.value, self.layout.value(), "value")
    }

    /// Returns the trajectory network statistics, building them on first use.
    ///
    /// # Errors
    /// Returns the cached load or build failure.
    pub fn trajectories(&self) -> Result<StnSummary, SessionError> {
        self.trajectories
            .get_or_init(|| {
                let records = load_trajectories(self.layout.trajectories(), &self.columns)
                    .map_err(|err| SessionError::provider("stn", err))?;
                let graph = self
                    .stn
                    .build_graph(&records, self.metadata.global_best_fitness)
                    .map_err(|err| IndicatorError::trajectory("stn", err))?;
                Ok(graph.summary())
            })
            .clone()
    }

    /// Returns the interaction network statistics, analysing them on first use.
    ///
    /// # Errors
    /// Returns the cached load or analysis failure.
    pub fn interactions(&self) -> Result<InteractionSummary, SessionError> {
        self.interactions
            .get_or_init(|| {
                let log = load_interaction_log(self.layout.interactions())
                    .map_err(|err| SessionError::provider("interaction", err))?;
                self.interaction
                    .analyze(
                        &log,
                        self.metadata.solution_index,
                        self.metadata.total_iterations,
                    )
                    .map_err(|err| IndicatorError::interaction("interaction", err).into())
            })
            .clone()
    }

    /// Diversity rate of change before the knee.
    ///
    /// # Errors
    /// Returns the cached failure of the diversity group.
    pub fn droc(&self) -> Result<f64, SessionError> {
        Ok(self.diversity()?.before)
    }

    /// Diversity rate of change after the knee.
    ///
    /// # Errors
    /// Returns the cached failure of the diversity group.
    pub fn croc(&self) -> Result<f64, SessionError> {
        Ok(self.diversity()?.after)
    }

    /// Distance-to-best rate of change before the knee.
    ///
    /// # Errors
    /// Returns the cached failure of the distance group.
    pub fn aroc_a(&self) -> Result<f64, SessionError> {
        Ok(self.distance()?.before)
    }

    /// Distance-to-best rate of change after the knee.
    ///
    /// # Errors
    /// Returns the cached failure of the distance group.
    pub fn lroc_a(&self) -> Result<f64, SessionError> {
        Ok(self.distance()?.after)
    }

    /// Value-to-best rate of change before the knee.
    ///
    /// # Errors
    /// Returns the cached failure of the value group.
    pub fn aroc_b(&self) -> Result<f64, SessionError> {
        Ok(self.value()?.before)
    }

    /// Value-to-best rate of change after the knee.
    ///
    /// # Errors
    /// Returns the cached failure of the value group.
    pub fn lroc_b(&self) -> Result<f64, SessionError> {
        Ok(self.value()?.after)
    }

    /// Mean fitness evaluations per iteration.
    ///
    /// # Errors
    /// Fails when the metadata declares zero iterations.
    pub fn enes(&self) -> Result<f64, SessionError> {
        evaluation_effort(&self.metadata)
            .map_err(|err| IndicatorError::mean("ENES", err).into())
    }

    /// Share of iterations spent in infeasible space.
    ///
    /// # Errors
    /// Fails when the metadata declares zero iterations.
    pub fn infeasible_percent(&self) -> Result<f64, SessionError> {
        infeasible_share(&self.metadata)
            .map_err(|err| IndicatorError::mean("INFEASIBLE%", err).into())
    }

    /// Mean of the `f_percent` column recorded while the run executed (F%).
    ///
    /// # Errors
    /// Returns the cached load failure or a mean-indicator failure.
    pub fn infeasible_mean(&self) -> Result<f64, SessionError> {
        self.infeasible
            .get_or_init(|| {
                let series = load_time_series(
                    self.layout.infeasible(),
                    ITERATION_COLUMN,
                    INFEASIBLE_COLUMN,
                )
                .map_err(|err| SessionError::provider("F%", err))?;
                series_mean(&series).map_err(|err| IndicatorError::mean("F%", err).into())
            })
            .clone()
    }

    /// Mean diversity as a percentage of its maximum.
    ///
    /// # Errors
    /// Returns the cached diversity load failure or a mean-indicator failure.
    pub fn explore_percent(&self) -> Result<f64, SessionError> {
        explore_percent(self.diversity_series()?)
            .map_err(|err| IndicatorError::mean("XPL%", err).into())
    }

    /// Computes every indicator, reporting each independently.
    #[must_use]
    pub fn report(&self) -> Vec<IndicatorReport> {
        let stn = self.trajectories();
        let interactions = self.interactions();
        let from_stn = |f: fn(&StnSummary) -> f64| stn.as_ref().map(f).map_err(Clone::clone);
        let from_interactions =
            |f: fn(&InteractionSummary) -> f64| interactions.as_ref().map(f).map_err(Clone::clone);
        let diversity = self.diversity();
        let distance = self.distance();
        let value = self.value();
        let knee = |group: &Result<RegressionIndicator, SessionError>,
                    f: fn(&RegressionIndicator) -> f64| {
            group.as_ref().map(f).map_err(Clone::clone)
        };

        let entries: [(&'static str, Result<f64, SessionError>); 24] = [
            ("DRoC", self.droc()),
            ("CRoC", self.croc()),
            ("diversity_knee_x", knee(&diversity, |fit| fit.knee_x)),
            ("diversity_knee_y", knee(&diversity, |fit| fit.knee_y)),
            ("ARoC_A", self.aroc_a()),
            ("LRoC_A", self.lroc_a()),
            ("distance_knee_x", knee(&distance, |fit| fit.knee_x)),
            ("distance_knee_y", knee(&distance, |fit| fit.knee_y)),
            ("ARoC_B", self.aroc_b()),
            ("LRoC_B", self.lroc_b()),
            ("value_knee_x", knee(&value, |fit| fit.knee_x)),
            ("value_knee_y", knee(&value, |fit| fit.knee_y)),
            ("ntotal", from_stn(|s| s.n_total as f64)),
            ("nbest", from_stn(|s| s.n_best as f64)),
            ("nshared", from_stn(|s| s.n_shared as f64)),
            ("best_strength", from_stn(|s| s.best_strength)),
            ("IDRoC", from_interactions(|s| s.diversity_rate_of_change)),
            ("ID", from_interactions(|s| s.mean_diversity)),
            ("GC", from_interactions(|s| s.mean_giant_component)),
            ("ISS", from_interactions(|s| s.solution_strength)),
            ("ENES", self.enes()),
            ("INFEASIBLE%", self.infeasible_percent()),
            ("F%", self.infeasible_mean()),
            ("XPL%", self.explore_percent()),
        ];
        entries
            .into_iter()
            .map(|(name, value)| IndicatorReport { name, value })
            .collect()
    }
}
