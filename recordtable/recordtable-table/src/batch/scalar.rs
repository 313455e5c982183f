use arrow::datatypes::{DataType, TimeUnit};
use chrono::Datelike;
use recordtable_core::{Value, ValueTypeError};

const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

pub(super) enum ScalarValue<'a> {
    Null,
    Boolean(Option<bool>),
    Int32(Option<i32>),
    Int64(Option<i64>),
    Float32(Option<f32>),
    Float64(Option<f64>),
    Utf8(Option<&'a str>),
    Binary(Option<&'a [u8]>),
    FixedSizeBinary(Option<&'a [u8]>),
    Date32(Option<i32>),
    TimestampMillisecond(Option<i64>),
}

/// Scalar form of `value` for a primitive `dt`; `Ok(None)` for nested types.
pub(super) fn scalar_value_for_datatype<'a>(
    dt: &DataType,
    value: &'a Value,
) -> Result<Option<ScalarValue<'a>>, ValueTypeError> {
    Ok(Some(match dt {
        DataType::Null => ScalarValue::Null,
        DataType::Boolean => ScalarValue::Boolean(value.try_bool()?),
        DataType::Int32 => ScalarValue::Int32(value.try_i32()?),
        DataType::Int64 => ScalarValue::Int64(value.try_i64()?),
        DataType::Float32 => ScalarValue::Float32(value.try_f32()?),
        DataType::Float64 => ScalarValue::Float64(value.try_f64()?),
        DataType::Utf8 => ScalarValue::Utf8(value.try_str()?),
        DataType::Binary => ScalarValue::Binary(value.try_bytes()?),
        DataType::FixedSizeBinary(_) => ScalarValue::FixedSizeBinary(value.try_bytes()?),
        DataType::Date32 => ScalarValue::Date32(
            value
                .try_date()?
                .map(|d| d.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE),
        ),
        DataType::Timestamp(TimeUnit::Millisecond, _) => {
            ScalarValue::TimestampMillisecond(value.try_timestamp()?.map(|ts| ts.timestamp_millis()))
        }
        _ => return Ok(None),
    }))
}
