//! Loading search trajectories from CSV.
use std::{io::Read, path::Path};

use metabehave_core::TrajectoryRecord;
use serde::Deserialize;

use crate::{
    errors::{ProviderError, open},
    series::column_index,
};

/// Column names of a trajectory CSV.
#[derive(Debug, Clone, PartialEq, Eq)]
#[deny(missing_docs)]
pub struct TrajectoryColumns {
    /// Integer run identifier.
    pub run: String,
    /// Integer iteration within the run.
    pub iteration: String,
    /// Opaque state label; equal labels are the same node.
    pub state: String,
    /// Fitness of the state as a float literal.
    pub fitness: String,
}

impl Default for TrajectoryColumns {
    fn default() -> Self {
        Self {
            run: "run".to_owned(),
            iteration: "iteration".to_owned(),
            state: "state".to_owned(),
            fitness: "fitness".to_owned(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TrajectoryRow {
    run: u64,
    iteration: u64,
    state: String,
    fitness: String,
}

/// Reads trajectory rows using the default column names.
///
/// # Errors
/// See [`read_trajectories_with`].
///
/// # Examples
/// ```
/// use metabehave_providers_csv::read_trajectories;
///
/// let raw = "run,iteration,state,fitness\n0,0,a,3.5\n0,1,b,1.0\n";
/// let records = read_trajectories(raw.as_bytes())?;
/// assert_eq!(records.len(), 2);
/// assert_eq!(records[1].state, "b");
/// # Ok::<(), metabehave_providers_csv::ProviderError>(())
/// ```
pub fn read_trajectories<R: Read>(reader: R) -> Result<Vec<TrajectoryRecord>, ProviderError> {
    read_trajectories_with(reader, &TrajectoryColumns::default())
}

/// Reads trajectory rows whose columns are named by `columns`.
///
/// Extra columns are ignored. The fitness column accepts any float literal,
/// including `inf` and `NaN`, which the network builder then rejects.
///
/// # Errors
/// Returns [`ProviderError::ColumnNotFound`] when a named column is missing,
/// [`ProviderError::InvalidValue`] for an unparsable fitness, and
/// [`ProviderError::Csv`] for malformed rows.
pub fn read_trajectories_with<R: Read>(
    reader: R,
    columns: &TrajectoryColumns,
) -> Result<Vec<TrajectoryRecord>, ProviderError> {
    let mut csv = csv::Reader::from_reader(reader);
    let headers = csv.headers()?.clone();
    let mut canonical: Vec<String> = headers.iter().map(str::to_owned).collect();
    for (name, field) in [
        (&columns.run, "run"),
        (&columns.iteration, "iteration"),
        (&columns.state, "state"),
        (&columns.fitness, "fitness"),
    ] {
        let index = column_index(&headers, name)?;
        if let Some(slot) = canonical.get_mut(index) {
            field.clone_into(slot);
        }
    }
    csv.set_headers(csv::StringRecord::from(canonical));

    let mut records = Vec::new();
    for (row, result) in csv.deserialize::<TrajectoryRow>().enumerate() {
        let raw = result?;
        let fitness = raw
            .fitness
            .trim()
            .parse::<f64>()
            .map_err(|_| ProviderError::InvalidValue {
                row,
                column: columns.fitness.clone(),
                value: raw.fitness.clone(),
            })?;
        records.push(TrajectoryRecord::new(raw.run, raw.iteration, raw.state, fitness));
    }
    Ok(records)
}

/// Opens `path` and reads its trajectory rows.
///
/// # Errors
/// Returns [`ProviderError::Open`] when the file cannot be opened, otherwise
/// see [`read_trajectories_with`].
pub fn load_trajectories(
    path: impl AsRef<Path>,
    columns: &TrajectoryColumns,
) -> Result<Vec<TrajectoryRecord>, ProviderError> {
    read_trajectories_with(open(path.as_ref())?, columns)
}
