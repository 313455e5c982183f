use arrow::{
    array::{
        ArrayBuilder, BinaryBuilder, BooleanBuilder, Date32Builder, FixedSizeBinaryBuilder,
        Float32Builder, Float64Builder, Int32Builder, Int64Builder, ListBuilder, MapBuilder,
        NullBuilder, StringBuilder, StructBuilder, TimestampMillisecondBuilder,
    },
    datatypes::{DataType, Fields},
    error::ArrowError,
};
use recordtable_core::{Value, ValueTypeError};

use super::{
    builder::map_entry_fields,
    scalar::{ScalarValue, scalar_value_for_datatype},
};
use crate::error::TableError;

pub(super) enum AppendError {
    Value(ValueTypeError),
    Table(TableError),
}

impl From<ValueTypeError> for AppendError {
    fn from(err: ValueTypeError) -> Self {
        AppendError::Value(err)
    }
}

impl From<TableError> for AppendError {
    fn from(err: TableError) -> Self {
        AppendError::Table(err)
    }
}

impl From<ArrowError> for AppendError {
    fn from(err: ArrowError) -> Self {
        AppendError::Table(err.into())
    }
}

/// Downcast a builder created by `make_builder` for the same data type.
fn cast_builder<T: ArrayBuilder>(builder: &mut Box<dyn ArrayBuilder>) -> Result<&mut T, TableError> {
    builder
        .as_any_mut()
        .downcast_mut::<T>()
        .ok_or_else(|| TableError::UnsupportedArrowType {
            data_type: format!("builder is not a {}", std::any::type_name::<T>()),
        })
}

fn append_scalar_dyn(
    builder: &mut Box<dyn ArrayBuilder>,
    scalar: &ScalarValue<'_>,
) -> Result<(), AppendError> {
    match scalar {
        ScalarValue::Null => cast_builder::<NullBuilder>(builder)?.append_null(),
        ScalarValue::Boolean(v) => cast_builder::<BooleanBuilder>(builder)?.append_option(*v),
        ScalarValue::Int32(v) => cast_builder::<Int32Builder>(builder)?.append_option(*v),
        ScalarValue::Int64(v) => cast_builder::<Int64Builder>(builder)?.append_option(*v),
        ScalarValue::Float32(v) => cast_builder::<Float32Builder>(builder)?.append_option(*v),
        ScalarValue::Float64(v) => cast_builder::<Float64Builder>(builder)?.append_option(*v),
        ScalarValue::Utf8(v) => cast_builder::<StringBuilder>(builder)?.append_option(*v),
        ScalarValue::Binary(v) => cast_builder::<BinaryBuilder>(builder)?.append_option(*v),
        ScalarValue::FixedSizeBinary(v) => {
            let b = cast_builder::<FixedSizeBinaryBuilder>(builder)?;
            match v {
                Some(bytes) => b.append_value(bytes)?,
                None => b.append_null(),
            }
        }
        ScalarValue::Date32(v) => cast_builder::<Date32Builder>(builder)?.append_option(*v),
        ScalarValue::TimestampMillisecond(v) => {
            cast_builder::<TimestampMillisecondBuilder>(builder)?.append_option(*v)
        }
    }
    Ok(())
}

fn append_list_elements(
    child_builder: &mut Box<dyn ArrayBuilder>,
    elem_dt: &DataType,
    value: &Value,
) -> Result<bool, AppendError> {
    match value {
        Value::Array(items) => {
            for item in items {
                append_value_to_builder(child_builder, elem_dt, item)?;
            }
            Ok(true)
        }
        Value::Null => Ok(false),
        _ => Err(value.type_mismatch("Array").into()),
    }
}

fn append_map_entries(
    map_builder: &mut MapBuilder<Box<dyn ArrayBuilder>, Box<dyn ArrayBuilder>>,
    key_dt: &DataType,
    value_dt: &DataType,
    value: &Value,
) -> Result<bool, AppendError> {
    match value {
        Value::Map(entries) => {
            for (key, map_value) in entries {
                let key = Value::String(key.clone());
                append_value_to_builder(map_builder.keys(), key_dt, &key)?;
                append_value_to_builder(map_builder.values(), value_dt, map_value)?;
            }
            Ok(true)
        }
        Value::Null => Ok(false),
        _ => Err(value.type_mismatch("Map").into()),
    }
}

fn append_struct(b: &mut StructBuilder, fields: &Fields, value: &Value) -> Result<(), AppendError> {
    match value {
        Value::Record(children) => {
            for (i, field) in fields.iter().enumerate() {
                let child_value = children.get(i).unwrap_or(&Value::Null);
                append_value_to_struct_field(b, i, field.data_type(), child_value)?;
            }
            b.append(true);
        }
        Value::Null => {
            for (i, field) in fields.iter().enumerate() {
                append_value_to_struct_field(b, i, field.data_type(), &Value::Null)?;
            }
            b.append(false);
        }
        _ => return Err(value.type_mismatch("Record").into()),
    }
    Ok(())
}

pub(super) fn append_value_to_builder(
    builder: &mut Box<dyn ArrayBuilder>,
    dt: &DataType,
    value: &Value,
) -> Result<(), AppendError> {
    if let Some(scalar) = scalar_value_for_datatype(dt, value)? {
        return append_scalar_dyn(builder, &scalar);
    }

    match dt {
        DataType::List(field) => {
            let b = cast_builder::<ListBuilder<Box<dyn ArrayBuilder>>>(builder)?;
            let valid = append_list_elements(b.values(), field.data_type(), value)?;
            b.append(valid);
        }
        DataType::Struct(fields) => {
            let b = cast_builder::<StructBuilder>(builder)?;
            append_struct(b, fields, value)?;
        }
        DataType::Map(entry_field, _) => {
            let (key_field, value_field) = map_entry_fields(entry_field.data_type())?;
            let b = cast_builder::<MapBuilder<Box<dyn ArrayBuilder>, Box<dyn ArrayBuilder>>>(
                builder,
            )?;
            let valid =
                append_map_entries(b, key_field.data_type(), value_field.data_type(), value)?;
            b.append(valid)?;
        }
        other => {
            return Err(TableError::UnsupportedArrowType {
                data_type: other.to_string(),
            }
            .into());
        }
    }
    Ok(())
}

fn append_value_to_struct_field(
    sb: &mut StructBuilder,
    index: usize,
    dt: &DataType,
    value: &Value,
) -> Result<(), AppendError> {
    append_value_to_builder(&mut sb.field_builders_mut()[index], dt, value)
}
