use std::{io, path::PathBuf};

use arrow_schema::{ArrowError, DataType};
use metabehave_core::InteractionError;
use thiserror::Error;

/// Errors raised while loading run artefacts.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("failed to open `{}`: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("column `{column}` not found")]
    ColumnNotFound { column: String },
    #[error("column `{column}` must be numeric but found {actual:?}")]
    InvalidColumnType { column: String, actual: DataType },
    #[error("row {row} column `{column}` holds unusable value `{value}`")]
    InvalidValue {
        row: usize,
        column: String,
        value: String,
    },
    #[error("interaction line {line}: token `{token}` is not a non-negative integer")]
    InvalidInteractionToken { line: usize, token: String },
    #[error("interaction line {line} lacks an iteration number")]
    MissingIteration { line: usize },
    #[error("interaction line {line} holds {values} counts, which is not a square matrix")]
    NonSquareMatrix { line: usize, values: usize },
    #[error("interaction log holds no iterations")]
    EmptyInteractionLog,
    #[error("metadata field `{field}` is invalid: {reason}")]
    InvalidMetadata { field: &'static str, reason: String },
    #[error(transparent)]
    Interaction(#[from] InteractionError),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("arrow error: {0}")]
    Arrow(#[from] ArrowError),
    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}

impl ProviderError {
    /// Returns a stable machine-readable code for the error.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Open { .. } | Self::Io(_) => "PROVIDER_IO",
            Self::ColumnNotFound { .. } => "PROVIDER_COLUMN_NOT_FOUND",
            Self::InvalidColumnType { .. } => "PROVIDER_INVALID_COLUMN_TYPE",
            Self::InvalidValue { .. } => "PROVIDER_INVALID_VALUE",
            Self::InvalidInteractionToken { .. }
            | Self::MissingIteration { .. }
            | Self::NonSquareMatrix { .. } => "PROVIDER_INVALID_INTERACTION_LINE",
            Self::EmptyInteractionLog => "PROVIDER_EMPTY_INTERACTION_LOG",
            Self::InvalidMetadata { .. } => "PROVIDER_INVALID_METADATA",
            Self::Interaction(error) => error.code().as_str(),
            Self::Csv(_) => "PROVIDER_CSV",
            Self::Json(_) => "PROVIDER_JSON",
            Self::Arrow(_) => "PROVIDER_ARROW",
            Self::Parquet(_) => "PROVIDER_PARQUET",
        }
    }
}

pub(crate) fn open(path: &std::path::Path) -> Result<std::fs::File, ProviderError> {
    std::fs::File::open(path).map_err(|source| ProviderError::Open {
        path: path.to_path_buf(),
        source,
    })
}
