use std::sync::Arc;

use arrow_array::{ArrayRef, Float32Array, Float64Array, Int64Array, StringArray};
use metabehave_core::Sample;
use rstest::rstest;

use super::{ProviderError, support::write_parquet};
use crate::{read_time_series, read_time_series_parquet};

#[rstest]
#[case::plain("iteration,diversity\n0,2.0\n1,1.0\n")]
#[case::byte_order_mark("\u{feff}iteration,diversity\n0,2.0\n1,1.0\n")]
#[case::padded_header(" iteration , diversity \n0,2.0\n1,1.0\n")]
fn reads_named_columns(#[case] raw: &str) {
    let series = read_time_series(raw.as_bytes(), "iteration", "diversity").expect("series");
    assert_eq!(series.metric(), "diversity");
    assert_eq!(
        series.samples(),
        &[Sample::new(0.0, 2.0), Sample::new(1.0, 1.0)]
    );
}

#[test]
fn unparsable_and_non_finite_cells_drop_their_rows() {
    let raw = "iteration,other,distance\n0,x,1.0\n1,x,n/a\n2,x,inf\n3,x,\n4,x,0.5\n";
    let series = read_time_series(raw.as_bytes(), "iteration", "distance").expect("series");
    assert_eq!(series.len(), 2);
    assert_eq!(series.dropped(), 3);
}

#[test]
fn missing_column_is_reported() {
    let err = read_time_series("iteration,value\n0,1\n".as_bytes(), "iteration", "diversity")
        .expect_err("diversity column is absent");
    assert!(matches!(
        err,
        ProviderError::ColumnNotFound { column } if column == "diversity"
    ));
}

#[test]
fn reads_parquet_columns_of_mixed_numeric_types() {
    let bytes = write_parquet(vec![
        ("iteration", Arc::new(Int64Array::from(vec![0, 1, 2])) as ArrayRef),
        (
            "value",
            Arc::new(Float64Array::from(vec![Some(3.0), None, Some(1.0)])) as ArrayRef,
        ),
    ]);
    let series = read_time_series_parquet(bytes, "iteration", "value").expect("series");
    assert_eq!(
        series.samples(),
        &[Sample::new(0.0, 3.0), Sample::new(2.0, 1.0)]
    );
    assert_eq!(series.dropped(), 1);
}

#[test]
fn reads_float32_parquet_columns() {
    let bytes = write_parquet(vec![
        ("x", Arc::new(Float32Array::from(vec![0.0_f32, 1.0])) as ArrayRef),
        ("y", Arc::new(Float32Array::from(vec![0.5_f32, 0.25])) as ArrayRef),
    ]);
    let series = read_time_series_parquet(bytes, "x", "y").expect("series");
    assert_eq!(series.len(), 2);
}

#[test]
fn rejects_non_numeric_parquet_columns() {
    let bytes = write_parquet(vec![
        ("iteration", Arc::new(Int64Array::from(vec![0, 1])) as ArrayRef),
        ("label", Arc::new(StringArray::from(vec!["a", "b"])) as ArrayRef),
    ]);
    let err = read_time_series_parquet(bytes, "iteration", "label").expect_err("strings");
    assert!(matches!(err, ProviderError::InvalidColumnType { .. }));
}

#[test]
fn reports_missing_parquet_columns() {
    let bytes = write_parquet(vec![(
        "iteration",
        Arc::new(Int64Array::from(vec![0, 1])) as ArrayRef,
    )]);
    let err = read_time_series_parquet(bytes, "iteration", "value").expect_err("missing column");
    assert!(matches!(
        err,
        ProviderError::ColumnNotFound { column } if column == "value"
    ));
}
