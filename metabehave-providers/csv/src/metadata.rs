//! Loading per-run metadata from `metadata.json`.
use std::{io::Read, path::Path};

use metabehave_core::RunMetadata;
use serde::Deserialize;

use crate::errors::{ProviderError, open};

/// On-disk shape of `metadata.json`.
///
/// Counts are read as floats because some writers emit them as `1000.0`;
/// [`TryFrom`] checks they are whole and non-negative.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[deny(missing_docs)]
pub struct MetadataFile {
    /// Objective function calls made during the run.
    pub fitness_evaluations: f64,
    /// Iterations the run executed.
    pub total_iterations: f64,
    /// Iterations spent in infeasible space; may be fractional.
    pub infeasible_iterations: f64,
    /// Best fitness known for the problem instance.
    pub global_best_fitness: f64,
    /// Population slot tracked by the interaction network.
    pub solution_index: f64,
}

impl TryFrom<MetadataFile> for RunMetadata {
    type Error = ProviderError;

    fn try_from(file: MetadataFile) -> Result<Self, Self::Error> {
        Ok(Self {
            fitness_evaluations: whole("fitness_evaluations", file.fitness_evaluations)?,
            total_iterations: whole("total_iterations", file.total_iterations)?,
            infeasible_iterations: file.infeasible_iterations,
            global_best_fitness: file.global_best_fitness,
            solution_index: usize::try_from(whole("solution_index", file.solution_index)?)
                .map_err(|err| ProviderError::InvalidMetadata {
                    field: "solution_index",
                    reason: err.to_string(),
                })?,
        })
    }
}

fn whole(field: &'static str, value: f64) -> Result<u64, ProviderError> {
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 || value > u64::MAX as f64 {
        return Err(ProviderError::InvalidMetadata {
            field,
            reason: format!("expected a non-negative whole number, got {value}"),
        });
    }
    Ok(value as u64)
}

/// Reads run metadata from JSON.
///
/// # Errors
/// Returns [`ProviderError::Json`] for malformed JSON or missing fields and
/// [`ProviderError::InvalidMetadata`] for counts that are not whole numbers.
///
/// # Examples
/// ```
/// use metabehave_providers_csv::read_metadata;
///
/// let raw = r#"{"fitness_evaluations": 500, "total_iterations": 50,
///     "infeasible_iterations": 2.5, "global_best_fitness": 0.0, "solution_index": 3}"#;
/// let metadata = read_metadata(raw.as_bytes())?;
/// assert_eq!(metadata.total_iterations, 50);
/// assert_eq!(metadata.solution_index, 3);
/// # Ok::<(), metabehave_providers_csv::ProviderError>(())
/// ```
pub fn read_metadata<R: Read>(reader: R) -> Result<RunMetadata, ProviderError> {
    let file: MetadataFile = serde_json::from_reader(reader)?;
    RunMetadata::try_from(file)
}

/// Opens `path` and reads its run metadata.
///
/// # Errors
/// Returns [`ProviderError::Open`] when the file cannot be opened, otherwise
/// see [`read_metadata`].
pub fn load_metadata(path: impl AsRef<Path>) -> Result<RunMetadata, ProviderError> {
    read_metadata(open(path.as_ref())?)
}
