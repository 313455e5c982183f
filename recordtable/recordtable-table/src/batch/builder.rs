use arrow::{
    array::{
        ArrayBuilder, BinaryBuilder, BooleanBuilder, Date32Builder, FixedSizeBinaryBuilder,
        Float32Builder, Float64Builder, Int32Builder, Int64Builder, ListBuilder, MapBuilder,
        MapFieldNames, NullBuilder, StringBuilder, StructBuilder, TimestampMillisecondBuilder,
    },
    datatypes::{DataType, Field, TimeUnit},
};

use crate::error::TableError;

pub(super) fn make_builder(
    dt: &DataType,
    capacity: usize,
) -> Result<Box<dyn ArrayBuilder>, TableError> {
    Ok(match dt {
        DataType::Null => Box::new(NullBuilder::new()),
        DataType::Boolean => Box::new(BooleanBuilder::with_capacity(capacity)),
        DataType::Int32 => Box::new(Int32Builder::with_capacity(capacity)),
        DataType::Int64 => Box::new(Int64Builder::with_capacity(capacity)),
        DataType::Float32 => Box::new(Float32Builder::with_capacity(capacity)),
        DataType::Float64 => Box::new(Float64Builder::with_capacity(capacity)),
        DataType::Utf8 => Box::new(StringBuilder::with_capacity(capacity, 64)),
        DataType::Binary => Box::new(BinaryBuilder::with_capacity(capacity, 64)),
        DataType::FixedSizeBinary(width) => {
            Box::new(FixedSizeBinaryBuilder::with_capacity(capacity, *width))
        }
        DataType::Date32 => Box::new(Date32Builder::with_capacity(capacity)),
        DataType::Timestamp(TimeUnit::Millisecond, _) => {
            Box::new(TimestampMillisecondBuilder::with_capacity(capacity).with_data_type(dt.clone()))
        }
        DataType::List(field) => {
            let child = make_builder(field.data_type(), capacity)?;
            Box::new(ListBuilder::new(child).with_field(field.clone()))
        }
        DataType::Struct(fields) => {
            let child_builders = fields
                .iter()
                .map(|f| make_builder(f.data_type(), capacity))
                .collect::<Result<Vec<_>, _>>()?;
            let fields_vec: Vec<Field> = fields.iter().map(|f| f.as_ref().clone()).collect();
            Box::new(StructBuilder::new(fields_vec, child_builders))
        }
        DataType::Map(entry_field, _) => {
            let (key_field, value_field) = map_entry_fields(entry_field.data_type())?;
            let key_builder = make_builder(key_field.data_type(), capacity)?;
            let value_builder = make_builder(value_field.data_type(), capacity)?;
            Box::new(
                MapBuilder::new(
                    Some(MapFieldNames {
                        entry: entry_field.name().to_string(),
                        key: key_field.name().to_string(),
                        value: value_field.name().to_string(),
                    }),
                    key_builder,
                    value_builder,
                )
                .with_keys_field(key_field.clone())
                .with_values_field(value_field.clone()),
            )
        }
        other => {
            return Err(TableError::UnsupportedArrowType {
                data_type: other.to_string(),
            });
        }
    })
}

/// Key and value fields of a map's entry struct.
pub(super) fn map_entry_fields(
    entry: &DataType,
) -> Result<(&arrow::datatypes::FieldRef, &arrow::datatypes::FieldRef), TableError> {
    match entry {
        DataType::Struct(fields) if fields.len() == 2 => Ok((&fields[0], &fields[1])),
        other => Err(TableError::UnsupportedArrowType {
            data_type: format!("map entries of {other}"),
        }),
    }
}
