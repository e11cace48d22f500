//! Loading metric series from named columns.
use std::{io::Read, path::Path};

use arrow_array::{
    Array, ArrayRef, Float32Array, Float64Array, Int32Array, Int64Array, RecordBatchReader,
};
use arrow_schema::DataType;
use metabehave_core::TimeSeries;
use parquet::{
    arrow::{ProjectionMask, arrow_reader::ParquetRecordBatchReaderBuilder},
    file::reader::ChunkReader,
};
use tracing::debug;

use crate::errors::{ProviderError, open};

const BYTE_ORDER_MARK: char = '\u{feff}';

/// Reads the `x` and `y` columns of a CSV document into a series named `y`.
///
/// Cells that do not parse as floats become NaN, so their rows are dropped by
/// [`TimeSeries`] sanitisation.
///
/// # Errors
/// Returns [`ProviderError::ColumnNotFound`] when either column is missing
/// from the header, and [`ProviderError::Csv`] for malformed CSV.
///
/// # Examples
/// ```
/// use metabehave_providers_csv::read_time_series;
///
/// let raw = "iteration,diversity\n0,1.5\n1,oops\n2,0.5\n";
/// let series = read_time_series(raw.as_bytes(), "iteration", "diversity")?;
/// assert_eq!(series.len(), 2);
/// # Ok::<(), metabehave_providers_csv::ProviderError>(())
/// ```
pub fn read_time_series<R: Read>(reader: R, x: &str, y: &str) -> Result<TimeSeries, ProviderError> {
    let mut csv = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = csv.headers()?.clone();
    let x_index = column_index(&headers, x)?;
    let y_index = column_index(&headers, y)?;

    let mut pairs = Vec::new();
    for record in csv.records() {
        let record = record?;
        pairs.push((
            parse_cell(record.get(x_index)),
            parse_cell(record.get(y_index)),
        ));
    }
    debug!(metric = y, rows = pairs.len(), "series read");
    Ok(TimeSeries::from_pairs(y, pairs))
}

/// Opens `path` and reads the `x` and `y` columns.
///
/// # Errors
/// Returns [`ProviderError::Open`] when the file cannot be opened, otherwise
/// see [`read_time_series`].
pub fn load_time_series(path: impl AsRef<Path>, x: &str, y: &str) -> Result<TimeSeries, ProviderError> {
    read_time_series(open(path.as_ref())?, x, y)
}

/// Reads the `x` and `y` columns of a Parquet file into a series named `y`.
///
/// Float and integer columns are accepted; nulls become NaN.
///
/// # Errors
/// Returns [`ProviderError::ColumnNotFound`] for a missing column,
/// [`ProviderError::InvalidColumnType`] for a non-numeric one, and Parquet or
/// Arrow errors raised while decoding.
pub fn read_time_series_parquet<R>(reader: R, x: &str, y: &str) -> Result<TimeSeries, ProviderError>
where
    R: ChunkReader + Send + 'static,
{
    let builder = ParquetRecordBatchReaderBuilder::try_new(reader)?;
    let mask = ProjectionMask::columns(builder.parquet_schema(), [x, y]);
    let batches = builder.with_projection(mask).build()?;
    let schema = batches.schema();
    let x_index = schema
        .index_of(x)
        .map_err(|_| ProviderError::ColumnNotFound { column: x.to_owned() })?;
    let y_index = schema
        .index_of(y)
        .map_err(|_| ProviderError::ColumnNotFound { column: y.to_owned() })?;

    let mut pairs = Vec::new();
    for batch in batches {
        let batch = batch?;
        let xs = numeric_values(batch.column(x_index), x)?;
        let ys = numeric_values(batch.column(y_index), y)?;
        pairs.extend(xs.into_iter().zip(ys));
    }
    Ok(TimeSeries::from_pairs(y, pairs))
}

/// Opens `path` and reads the `x` and `y` Parquet columns.
///
/// # Errors
/// See [`read_time_series_parquet`].
pub fn load_time_series_parquet(
    path: impl AsRef<Path>,
    x: &str,
    y: &str,
) -> Result<TimeSeries, ProviderError> {
    read_time_series_parquet(open(path.as_ref())?, x, y)
}

pub(crate) fn column_index(headers: &csv::StringRecord, column: &str) -> Result<usize, ProviderError> {
    headers
        .iter()
        .position(|header| header.trim_start_matches(BYTE_ORDER_MARK).trim() == column)
        .ok_or_else(|| ProviderError::ColumnNotFound {
            column: column.to_owned(),
        })
}

fn parse_cell(cell: Option<&str>) -> f64 {
    cell.and_then(|value| value.trim().parse::<f64>().ok())
        .unwrap_or(f64::NAN)
}

fn numeric_values(array: &ArrayRef, column: &str) -> Result<Vec<f64>, ProviderError> {
    fn collect<A: Array>(array: &A, value: impl Fn(usize) -> f64) -> Vec<f64> {
        (0..array.len())
            .map(|row| if array.is_null(row) { f64::NAN } else { value(row) })
            .collect()
    }

    let invalid = || ProviderError::InvalidColumnType {
        column: column.to_owned(),
        actual: array.data_type().clone(),
    };
    let any = array.as_any();
    match array.data_type() {
        DataType::Float64 => {
            let values = any.downcast_ref::<Float64Array>().ok_or_else(invalid)?;
            Ok(collect(values, |row| values.value(row)))
        }
        DataType::Float32 => {
            let values = any.downcast_ref::<Float32Array>().ok_or_else(invalid)?;
            Ok(collect(values, |row| f64::from(values.value(row))))
        }
        DataType::Int64 => {
            let values = any.downcast_ref::<Int64Array>().ok_or_else(invalid)?;
            Ok(collect(values, |row| values.value(row) as f64))
        }
        DataType::Int32 => {
            let values = any.downcast_ref::<Int32Array>().ok_or_else(invalid)?;
            Ok(collect(values, |row| f64::from(values.value(row))))
        }
        _ => Err(invalid()),
    }
}
