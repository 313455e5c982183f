use std::sync::Arc;

use arrow::datatypes::{DataType, Field, Schema, TimeUnit};

use crate::{
    error::MappingError,
    rel::{RelDataType, RelField, RelType},
};

// ---------------------------------------------------------------------------
// Convert relational row types to Arrow schemas
// ---------------------------------------------------------------------------

/// Converts a struct row type into an Arrow `Schema`, one column per field.
pub fn row_type_to_arrow_schema(row_type: &RelType) -> Result<Schema, MappingError> {
    let fields = row_type.fields().ok_or_else(|| MappingError::NotAStruct {
        rel_type: row_type.to_string(),
    })?;
    let arrow_fields: Vec<Field> = fields.iter().map(rel_field_to_arrow_field).collect();
    Ok(Schema::new(arrow_fields))
}

fn rel_field_to_arrow_field(f: &RelField) -> Field {
    Field::new(
        &f.name,
        rel_type_to_arrow(&f.rel_type),
        f.rel_type.nullable,
    )
}

/// Arrow data type of one relational type. Nullability belongs to the
/// enclosing Arrow field.
pub fn rel_type_to_arrow(rel_type: &RelType) -> DataType {
    match &rel_type.data_type {
        RelDataType::Any => DataType::Null,
        RelDataType::Boolean => DataType::Boolean,
        RelDataType::Integer => DataType::Int32,
        RelDataType::BigInt => DataType::Int64,
        RelDataType::Float => DataType::Float32,
        RelDataType::Double => DataType::Float64,
        RelDataType::Varchar | RelDataType::Symbol => DataType::Utf8,
        RelDataType::Binary(None) => DataType::Binary,
        RelDataType::Binary(Some(size)) => DataType::FixedSizeBinary(*size as i32),
        RelDataType::Date => DataType::Date32,
        RelDataType::Timestamp => {
            DataType::Timestamp(TimeUnit::Millisecond, Some(Arc::from(crate::TIMESTAMP_TZ)))
        }
        RelDataType::Struct(fields) => {
            let arrow_fields: Vec<Field> = fields.iter().map(rel_field_to_arrow_field).collect();
            DataType::Struct(arrow_fields.into())
        }
        RelDataType::Array(elem) | RelDataType::Multiset(elem) => {
            let child_dt = rel_type_to_arrow(elem);
            DataType::List(Arc::new(Field::new("item", child_dt, elem.nullable)))
        }
        RelDataType::Map { key, value } => {
            let key_field = Field::new("key", rel_type_to_arrow(key), false);
            let val_field = Field::new("value", rel_type_to_arrow(value), value.nullable);
            let entry_struct = DataType::Struct(vec![key_field, val_field].into());
            let entry_field = Field::new("entries", entry_struct, false);
            DataType::Map(Arc::new(entry_field), false)
        }
    }
}
