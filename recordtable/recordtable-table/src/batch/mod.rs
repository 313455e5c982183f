//! Conversion from materialized rows to Arrow `RecordBatch`.
//!
//! Rows are positional value arrays matching the fields of the target schema,
//! as produced by a [`RecordEnumerator`](crate::RecordEnumerator).

mod append;
mod builder;
mod scalar;

use std::sync::Arc;

use arrow::{
    array::ArrayRef,
    datatypes::{DataType, SchemaRef},
    record_batch::RecordBatch,
};
use recordtable_core::Value;

use crate::error::TableError;

/// Convert rows to a RecordBatch with `schema`.
///
/// A row shorter than the schema is padded with nulls.
pub fn rows_to_record_batch(
    schema: &SchemaRef,
    rows: &[Vec<Value>],
) -> Result<RecordBatch, TableError> {
    if rows.is_empty() {
        return Ok(RecordBatch::new_empty(Arc::clone(schema)));
    }

    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(schema.fields().len());
    for (i, field) in schema.fields().iter().enumerate() {
        let values: Vec<&Value> = rows
            .iter()
            .map(|row| row.get(i).unwrap_or(&Value::Null))
            .collect();
        let array = build_array_from_values(field.data_type(), &values).map_err(|err| match err {
            append::AppendError::Value(source) => TableError::Decode {
                column: field.name().clone(),
                source,
            },
            append::AppendError::Table(err) => err,
        })?;
        arrays.push(array);
    }

    Ok(RecordBatch::try_new(Arc::clone(schema), arrays)?)
}

fn build_array_from_values(
    dt: &DataType,
    values: &[&Value],
) -> Result<ArrayRef, append::AppendError> {
    let capacity = match dt {
        DataType::List(_) | DataType::Map(_, _) => values.len().saturating_mul(4),
        _ => values.len(),
    };
    let mut builder = builder::make_builder(dt, capacity)?;
    for value in values {
        append::append_value_to_builder(&mut builder, dt, value)?;
    }
    Ok(builder.finish())
}
