use std::sync::Arc;

use recordtable::{
    Field, Name, ProjectableFilterableTable, Record, ScanContext, Schemas, TableBuilder, Value,
    arrow::array::{Array, Int32Array, StringArray},
    compile_sql_filter, expr, fingerprint, project, table::MemorySupplier, to_relational,
    types::RelDataType,
};

fn users() -> (Arc<Schemas>, recordtable::SchemaId, Vec<Record>) {
    let mut schemas = Schemas::new();
    let int = schemas.int();
    let string = schemas.string();
    let maybe_string = schemas.nullable(string).unwrap();
    let city = schemas.string();
    let address = schemas
        .record(Name::new("Address"), vec![Field::new("city", city)])
        .unwrap();
    let root = schemas
        .record(
            Name::new("User"),
            vec![
                Field::new("id", int),
                Field::new("name", maybe_string),
                Field::new("address", address),
            ],
        )
        .unwrap();
    let records = vec![
        Record::new(
            root,
            vec![Value::Int(1), Value::string("Ann"), Value::Record(vec![Value::string("Oslo")])],
        ),
        Record::new(
            root,
            vec![Value::Int(2), Value::Null, Value::Record(vec![Value::string("Rome")])],
        ),
        Record::new(
            root,
            vec![Value::Int(3), Value::string("Bob"), Value::Record(vec![Value::string("Lima")])],
        ),
    ];
    (Arc::new(schemas), root, records)
}

#[test]
fn sql_filter_and_projection_into_arrow() {
    let (schemas, root, records) = users();
    let table = TableBuilder::new(Arc::clone(&schemas), root)
        .with_supplier(MemorySupplier::new(records).with_projection_pushdown(true))
        .build_projectable_filterable()
        .unwrap();

    let filter = compile_sql_filter(Arc::clone(&schemas), root, "name IS NOT NULL AND id > 1")
        .unwrap()
        .filter;
    let mut filters = vec![filter];
    let batches = table
        .scan_projected(&ScanContext::new(), &mut filters, Some(&[1, 0]))
        .unwrap()
        .collect_batches()
        .unwrap();
    assert!(filters.is_empty());
    assert_eq!(batches.len(), 1);

    let batch = &batches[0];
    let names = batch.column(0).as_any().downcast_ref::<StringArray>().unwrap();
    let ids = batch.column(1).as_any().downcast_ref::<Int32Array>().unwrap();
    assert_eq!(batch.num_rows(), 1);
    assert_eq!(names.value(0), "Bob");
    assert_eq!(ids.value(0), 3);
}

#[test]
fn projected_schema_keeps_its_fingerprint_stable() {
    let (schemas, root, _) = users();
    let (projected, projected_root) = project(&schemas, root, &["address.city", "id"]).unwrap();
    let row_type = to_relational(&projected, projected_root).unwrap();
    let names: Vec<_> = row_type
        .fields()
        .unwrap()
        .iter()
        .map(|f| f.name.as_str())
        .collect();
    assert_eq!(names, vec!["address", "id"]);
    assert!(matches!(
        row_type.fields().unwrap()[0].rel_type.data_type,
        RelDataType::Struct(_)
    ));

    let (again, again_root) = project(&schemas, root, &["address.city", "id"]).unwrap();
    assert_eq!(
        fingerprint(&projected, projected_root).unwrap(),
        fingerprint(&again, again_root).unwrap()
    );
}

#[test]
fn expression_helpers_are_reachable() {
    let (schemas, root, _) = users();
    let row_type = to_relational(&schemas, root).unwrap();
    let text = recordtable::render(&[expr::col(0).eq(expr::lit(1))], &row_type).unwrap();
    assert_eq!(text, r#"("id" = 1)"#);
}
