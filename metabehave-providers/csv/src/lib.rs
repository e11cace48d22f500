//! Loaders turning run artefacts on disk into indicator engine inputs.

mod errors;
mod interaction;
mod layout;
mod metadata;
mod series;
mod trajectory;

pub use errors::ProviderError;
pub use interaction::{load_interaction_log, read_interaction_log};
pub use layout::RunLayout;
pub use metadata::{MetadataFile, load_metadata, read_metadata};
pub use series::{
    load_time_series, load_time_series_parquet, read_time_series, read_time_series_parquet,
};
pub use trajectory::{TrajectoryColumns, load_trajectories, read_trajectories, read_trajectories_with};

#[cfg(test)]
mod tests;
