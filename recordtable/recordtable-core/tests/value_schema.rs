use std::sync::Arc;

use chrono::NaiveDate;
use recordtable_core::{
    Field, LogicalType, Name, Record, RecordStream, SchemaKind, Schemas, StreamError, Value,
    VecRecordStream,
};

#[test]
fn value_string_creates_arc_str_value() {
    let value = Value::string("hello");
    match value {
        Value::String(s) => assert_eq!(&*s, "hello"),
        other => panic!("unexpected value variant: {:?}", other),
    }
}

#[test]
fn widening_accessors_accept_narrower_variants() {
    assert_eq!(Value::Int(7).try_i64().unwrap(), Some(7));
    assert_eq!(Value::Float(1.5).try_f64().unwrap(), Some(1.5));
    assert_eq!(Value::symbol("RED").try_str().unwrap(), Some("RED"));
    assert_eq!(Value::Null.try_i64().unwrap(), None);
}

#[test]
fn accessor_reports_type_mismatch() {
    let err = Value::Boolean(true).try_str().unwrap_err();
    assert_eq!(err.expected, "String");
    assert_eq!(err.actual, "Boolean");
    assert_eq!(err.to_string(), "expected String, found Boolean");
}

#[test]
fn materialized_values_expose_dates() {
    let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
    assert_eq!(Value::Date(date).try_date().unwrap(), Some(date));
    assert!(Value::Long(0).try_date().is_err());
}

#[test]
fn record_values_are_positional() {
    let mut schemas = Schemas::new();
    let int = schemas.int();
    let string = schemas.string();
    let user = schemas
        .record(
            Name::new("User"),
            vec![Field::new("id", int), Field::new("name", string)],
        )
        .unwrap();

    let record = Record::new(user, vec![Value::Int(1), Value::string("ada")]);
    assert_eq!(record.schema(), user);
    assert_eq!(record.len(), 2);
    assert_eq!(record.get(1), Some(&Value::String(Arc::from("ada"))));
    assert_eq!(record.get(2), None);
}

#[test]
fn vec_stream_yields_then_refuses_after_close() {
    let mut schemas = Schemas::new();
    let int = schemas.int();
    let row = schemas
        .record(Name::new("Row"), vec![Field::new("n", int)])
        .unwrap();
    let mut stream = VecRecordStream::new(vec![
        Record::new(row, vec![Value::Int(1)]),
        Record::new(row, vec![Value::Int(2)]),
    ]);

    assert_eq!(stream.next_record().unwrap().unwrap().values(), &[Value::Int(1)]);
    stream.close().unwrap();
    stream.close().unwrap();
    assert!(matches!(stream.next_record(), Err(StreamError::Closed)));
}

#[test]
fn logical_type_names_round_trip() {
    assert_eq!(LogicalType::from_name("date"), LogicalType::Date);
    assert_eq!(LogicalType::from_name("timestamp-millis"), LogicalType::Instant);
    assert_eq!(
        LogicalType::from_name("uuid"),
        LogicalType::Other("uuid".to_string())
    );
    assert_eq!(
        LogicalType::Decimal {
            precision: 10,
            scale: 2
        }
        .to_string(),
        "decimal(10, 2)"
    );
}

#[test]
fn helpers_attach_logical_types() {
    let mut schemas = Schemas::new();
    let date = schemas.date();
    let instant = schemas.instant();
    assert!(matches!(schemas[date].kind, SchemaKind::Int));
    assert_eq!(schemas[date].logical_type, Some(LogicalType::Date));
    assert!(matches!(schemas[instant].kind, SchemaKind::Long));
    assert_eq!(schemas[instant].logical_type, Some(LogicalType::Instant));
}
