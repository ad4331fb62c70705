//! Parquet payload encoding for data array values.

use std::sync::Arc;

use arrow::array::{Array, Float64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;

use super::{StoreConfig, StoreError};

/// Name of the single payload column
pub(crate) const VALUE_COLUMN: &str = "value";

fn payload_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![Field::new(
        VALUE_COLUMN,
        DataType::Float64,
        false,
    )]))
}

/// Encode flattened array values into an in-memory Parquet file
pub(super) fn encode_payload(
    array_name: &str,
    values: &[f64],
    config: &StoreConfig,
) -> Result<Vec<u8>, StoreError> {
    let schema = payload_schema();
    let props = config.to_writer_properties(array_name);

    let column = Float64Array::from(values.to_vec());
    let batch = RecordBatch::try_new(schema.clone(), vec![Arc::new(column)])?;

    let mut buffer = Vec::new();
    let mut writer = ArrowWriter::try_new(&mut buffer, schema, Some(props))?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(buffer)
}

/// Decode a payload written by [`encode_payload`]
pub(super) fn decode_payload(bytes: Bytes) -> Result<Vec<f64>, StoreError> {
    let reader = ParquetRecordBatchReaderBuilder::try_new(bytes)?.build()?;

    let mut values = Vec::new();
    for batch in reader {
        let batch = batch?;
        let column = batch
            .column_by_name(VALUE_COLUMN)
            .ok_or_else(|| {
                StoreError::InvalidFormat(format!("payload missing '{}' column", VALUE_COLUMN))
            })?
            .as_any()
            .downcast_ref::<Float64Array>()
            .ok_or_else(|| {
                StoreError::InvalidFormat(format!("'{}' column is not Float64", VALUE_COLUMN))
            })?;
        values.reserve(column.len());
        values.extend(column.values().iter().copied());
    }
    Ok(values)
}
