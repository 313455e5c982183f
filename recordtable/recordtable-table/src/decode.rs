//! Record → row materialization driven by logical types.

use std::sync::Arc;

use chrono::{DateTime, Days, NaiveDate, Utc};
use recordtable_core::{
    LogicalType, SchemaError, SchemaId, SchemaKind, Schemas, Value, ValueTypeError,
};
use recordtable_expr::parse_date;
use recordtable_visit::contains_logical_types;

use crate::error::TableError;

/// Decodes the plain values of a record into domain values.
///
/// `date` becomes [`Value::Date`], `instant` becomes [`Value::Timestamp`] and
/// `decimal` becomes [`Value::Double`], at any depth. Columns with no logical
/// type below them are moved through untouched.
#[derive(Debug)]
pub struct RowDecoder {
    schemas: Arc<Schemas>,
    columns: Vec<Column>,
}

#[derive(Debug)]
struct Column {
    name: String,
    schema: SchemaId,
    decode: bool,
}

impl RowDecoder {
    pub fn new(schemas: Arc<Schemas>, root: SchemaId) -> Result<Self, TableError> {
        let node = schemas
            .get(root)
            .ok_or(SchemaError::UnknownId { id: root })?;
        let SchemaKind::Record { fields, .. } = &node.kind else {
            return Err(TableError::NotARecord {
                id: root,
                found: node.type_name(),
            });
        };
        let columns = fields
            .iter()
            .map(|field| {
                Ok(Column {
                    name: field.name.clone(),
                    schema: field.schema,
                    decode: contains_logical_types(&schemas, field.schema)?,
                })
            })
            .collect::<Result<Vec<_>, TableError>>()?;
        Ok(Self { schemas, columns })
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// True when no column needs decoding.
    pub fn is_passthrough(&self) -> bool {
        self.columns.iter().all(|c| !c.decode)
    }

    /// Decode `values` into `row`, replacing its contents.
    ///
    /// `layout[i]` is the column position of `values[i]`; `None` means the
    /// values are the full row in column order.
    pub fn decode_into(
        &self,
        values: Vec<Value>,
        layout: Option<&[usize]>,
        row: &mut Vec<Value>,
    ) -> Result<(), TableError> {
        row.clear();
        for (i, value) in values.into_iter().enumerate() {
            let position = layout.map_or(Some(i), |l| l.get(i).copied());
            let column = position.and_then(|p| self.columns.get(p));
            match column {
                Some(column) if column.decode => {
                    let decoded = decode_value(&self.schemas, column.schema, value).map_err(
                        |source| TableError::Decode {
                            column: column.name.clone(),
                            source,
                        },
                    )?;
                    row.push(decoded);
                }
                _ => row.push(value),
            }
        }
        Ok(())
    }
}

fn decode_value(schemas: &Schemas, id: SchemaId, value: Value) -> Result<Value, ValueTypeError> {
    let Some(node) = schemas.get(id) else {
        return Ok(value);
    };
    if value.is_null() {
        return Ok(value);
    }
    match &node.logical_type {
        Some(LogicalType::Date) => return decode_date(value),
        Some(LogicalType::Instant) => return decode_instant(value),
        Some(LogicalType::Decimal { scale, .. }) => return decode_decimal(value, *scale),
        _ => {}
    }
    match (&node.kind, value) {
        (SchemaKind::Record { fields, .. }, Value::Record(values)) => values
            .into_iter()
            .enumerate()
            .map(|(i, v)| match fields.get(i) {
                Some(field) => decode_value(schemas, field.schema, v),
                None => Ok(v),
            })
            .collect::<Result<_, _>>()
            .map(Value::Record),
        (SchemaKind::Array(item), Value::Array(items)) => items
            .into_iter()
            .map(|v| decode_value(schemas, *item, v))
            .collect::<Result<_, _>>()
            .map(Value::Array),
        (SchemaKind::Map(inner), Value::Map(entries)) => entries
            .into_iter()
            .map(|(k, v)| Ok((k, decode_value(schemas, *inner, v)?)))
            .collect::<Result<_, _>>()
            .map(Value::Map),
        (SchemaKind::Union(_), value) => {
            let branch = schemas.non_null_branch(id);
            if branch == id {
                Ok(value)
            } else {
                decode_value(schemas, branch, value)
            }
        }
        (_, value) => Ok(value),
    }
}

const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

fn decode_date(value: Value) -> Result<Value, ValueTypeError> {
    let date = match &value {
        Value::Date(_) => return Ok(value),
        Value::Int(days) => epoch_days(i64::from(*days)),
        Value::Long(days) => epoch_days(*days),
        Value::String(text) => parse_date(text),
        _ => None,
    };
    date.map(Value::Date)
        .ok_or_else(|| value.type_mismatch("date (epoch days or YYYY-MM-DD)"))
}

fn epoch_days(days: i64) -> Option<NaiveDate> {
    let epoch = NaiveDate::from_num_days_from_ce_opt(UNIX_EPOCH_DAYS_FROM_CE)?;
    if days >= 0 {
        epoch.checked_add_days(Days::new(days.unsigned_abs()))
    } else {
        epoch.checked_sub_days(Days::new(days.unsigned_abs()))
    }
}

fn decode_instant(value: Value) -> Result<Value, ValueTypeError> {
    let millis = match &value {
        Value::Timestamp(_) => return Ok(value),
        Value::Long(ms) => Some(*ms),
        Value::Int(ms) => Some(i64::from(*ms)),
        _ => None,
    };
    millis
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(Value::Timestamp)
        .ok_or_else(|| value.type_mismatch("instant (epoch milliseconds)"))
}

/// Big-endian two's complement unscaled integer, divided by `10^scale`.
fn decode_decimal(value: Value, scale: u32) -> Result<Value, ValueTypeError> {
    let unscaled = match &value {
        Value::Double(_) => return Ok(value),
        Value::Bytes(bytes) if !bytes.is_empty() && bytes.len() <= 16 => {
            let fill = if bytes[0] & 0x80 != 0 { 0xff } else { 0x00 };
            let mut buf = [fill; 16];
            buf[16 - bytes.len()..].copy_from_slice(bytes);
            i128::from_be_bytes(buf)
        }
        _ => return Err(value.type_mismatch("decimal (at most 16 bytes)")),
    };
    Ok(Value::Double(unscaled as f64 / 10f64.powi(scale as i32)))
}
