use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use chrono::{NaiveDate, TimeZone, Utc};
use recordtable_core::{Field, Name, Record, Schemas, Value};
use recordtable_expr::{col, lit};
use recordtable_table::{
    FilterableTable, RowDecoder, ScanContext, ScannableTable, Table, TableBuilder, TableError,
};

#[test]
fn logical_types_are_decoded_at_any_depth() {
    let mut schemas = Schemas::new();
    let date = schemas.date();
    let instant = schemas.instant();
    let price = schemas.decimal(10, 2);
    let maybe_date = schemas.nullable(date).unwrap();
    let dates = schemas.array(maybe_date).unwrap();
    let prices = schemas.map(price).unwrap();
    let string = schemas.string();
    let order = schemas
        .record(
            Name::new("Order"),
            vec![
                Field::new("id", string),
                Field::new("placed", instant),
                Field::new("due", dates),
                Field::new("prices", prices),
            ],
        )
        .unwrap();
    let decoder = RowDecoder::new(Arc::new(schemas), order).unwrap();
    assert!(!decoder.is_passthrough());

    let mut row = Vec::new();
    decoder
        .decode_into(
            vec![
                Value::string("o-1"),
                Value::Long(86_400_000),
                Value::Array(vec![Value::Int(1), Value::Null, Value::string("2024-02-29")]),
                Value::Map(vec![(Arc::from("net"), Value::bytes([0xff, 0x38]))]),
            ],
            None,
            &mut row,
        )
        .unwrap();

    assert_eq!(row[0], Value::string("o-1"));
    assert_eq!(
        row[1],
        Value::Timestamp(Utc.with_ymd_and_hms(1970, 1, 2, 0, 0, 0).unwrap())
    );
    assert_eq!(
        row[2],
        Value::Array(vec![
            Value::Date(NaiveDate::from_ymd_opt(1970, 1, 2).unwrap()),
            Value::Null,
            Value::Date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()),
        ])
    );
    // 0xff38 is -200, scale 2
    assert_eq!(row[3], Value::Map(vec![(Arc::from("net"), Value::Double(-2.0))]));
}

#[test]
fn projected_layouts_decode_by_column() {
    let mut schemas = Schemas::new();
    let int = schemas.int();
    let date = schemas.date();
    let root = schemas
        .record(
            Name::new("Event"),
            vec![Field::new("n", int), Field::new("day", date)],
        )
        .unwrap();
    let decoder = RowDecoder::new(Arc::new(schemas), root).unwrap();

    let mut row = Vec::new();
    decoder
        .decode_into(vec![Value::Int(0), Value::Int(7)], Some(&[1, 0]), &mut row)
        .unwrap();
    assert_eq!(
        row,
        vec![
            Value::Date(NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()),
            Value::Int(7),
        ]
    );
}

#[test]
fn malformed_values_name_the_column() {
    let mut schemas = Schemas::new();
    let date = schemas.date();
    let root = schemas
        .record(Name::new("Event"), vec![Field::new("day", date)])
        .unwrap();
    let table = TableBuilder::new(Arc::new(schemas), root)
        .with_records(vec![Record::new(root, vec![Value::string("not a date")])])
        .build_scannable()
        .unwrap();

    let mut enumerator = table.scan(&ScanContext::new()).unwrap();
    match enumerator.move_next() {
        Err(TableError::Decode { column, .. }) => assert_eq!(column, "day"),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn filters_see_decoded_dates() {
    let mut schemas = Schemas::new();
    let date = schemas.date();
    let root = schemas
        .record(Name::new("Event"), vec![Field::new("day", date)])
        .unwrap();
    let records = (0..5)
        .map(|days| Record::new(root, vec![Value::Int(days * 365)]))
        .collect();
    let table = TableBuilder::new(Arc::new(schemas), root)
        .with_records(records)
        .build_filterable()
        .unwrap();

    let mut filters = vec![col(0).gt_eq(lit("1972-01-01"))];
    let rows: Vec<_> = table
        .scan_filtered(&ScanContext::new(), &mut filters)
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert!(filters.is_empty());
    // 730 days is 1972-01-01
    assert_eq!(rows.len(), 3);
}

fn chain(depth: usize) -> (Arc<Schemas>, recordtable_core::SchemaId) {
    let mut schemas = Schemas::new();
    let mut id = schemas.date();
    for level in 0..depth {
        id = schemas
            .record(Name::new(format!("Level{level}")), vec![Field::new("inner", id)])
            .unwrap();
    }
    (Arc::new(schemas), id)
}

#[test]
fn decoder_setup_handles_deep_schemas() {
    let (schemas, root) = chain(20_000);
    let started = Instant::now();
    let decoder = RowDecoder::new(schemas, root).unwrap();
    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(decoder.width(), 1);
    assert!(!decoder.is_passthrough());
}

#[test]
fn tables_build_over_deeply_nested_records() {
    let (schemas, root) = chain(1_000);
    let started = Instant::now();
    let table = TableBuilder::new(schemas, root).build_scannable().unwrap();
    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(table.arrow_schema().fields().len(), 1);
    assert!(table.row_type().fields().is_some());

    let mut rows = table.scan(&ScanContext::new()).unwrap();
    assert!(!rows.move_next().unwrap());
}
