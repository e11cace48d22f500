//! File names of the artefacts stored in one run directory.
use std::path::{Path, PathBuf};

/// Locations of the artefacts written for one optimisation run.
///
/// # Examples
/// ```
/// use metabehave_providers_csv::RunLayout;
///
/// let layout = RunLayout::new("runs/0042").with_trajectories("trajectories.csv");
/// assert!(layout.metadata().ends_with("metadata.json"));
/// assert!(layout.trajectories().ends_with("trajectories.csv"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunLayout {
    root: PathBuf,
    metadata: String,
    diversity: String,
    distance: String,
    value: String,
    trajectories: String,
    interactions: String,
    infeasible: String,
}

impl RunLayout {
    /// Uses the default file names inside `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            metadata: "metadata.json".to_owned(),
            diversity: "diversity.csv".to_owned(),
            distance: "distance.csv".to_owned(),
            value: "value.csv".to_owned(),
            trajectories: "stn.csv".to_owned(),
            interactions: "interaction.txt".to_owned(),
            infeasible: "f_percent.csv".to_owned(),
        }
    }

    /// Overrides the trajectory file name.
    #[must_use]
    pub fn with_trajectories(mut self, name: impl Into<String>) -> Self {
        self.trajectories = name.into();
        self
    }

    /// Overrides the interaction log file name.
    #[must_use]
    pub fn with_interactions(mut self, name: impl Into<String>) -> Self {
        self.interactions = name.into();
        self
    }

    /// Overrides the per-iteration infeasible share file name.
    #[must_use]
    pub fn with_infeasible(mut self, name: impl Into<String>) -> Self {
        self.infeasible = name.into();
        self
    }

    /// Overrides the metadata file name.
    #[must_use]
    pub fn with_metadata(mut self, name: impl Into<String>) -> Self {
        self.metadata = name.into();
        self
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn metadata(&self) -> PathBuf {
        self.root.join(&self.metadata)
    }

    #[must_use]
    pub fn diversity(&self) -> PathBuf {
        self.root.join(&self.diversity)
    }

    #[must_use]
    pub fn distance(&self) -> PathBuf {
        self.root.join(&self.distance)
    }

    #[must_use]
    pub fn value(&self) -> PathBuf {
        self.root.join(&self.value)
    }

    #[must_use]
    pub fn trajectories(&self) -> PathBuf {
        self.root.join(&self.trajectories)
    }

    #[must_use]
    pub fn interactions(&self) -> PathBuf {
        self.root.join(&self.interactions)
    }

    /// CSV holding the `f_percent` column recorded while the run executed.
    #[must_use]
    pub fn infeasible(&self) -> PathBuf {
        self.root.join(&self.infeasible)
    }
}
