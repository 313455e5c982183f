use std::sync::Arc;

use recordtable_core::{Field, Name, Schemas, Value};
use recordtable_expr::{Catalog, EvalContext, PlanError, col, lit};
use recordtable_table::{SingleTableCatalog, TableError, compile_sql_filter};

fn user() -> (Arc<Schemas>, recordtable_core::SchemaId) {
    let mut schemas = Schemas::new();
    let int = schemas.int();
    let string = schemas.string();
    let created = schemas.date();
    let root = schemas
        .record(
            Name::new("User").with_namespace("app"),
            vec![
                Field::new("id", int),
                Field::new("name", string),
                Field::new("created", created),
            ],
        )
        .unwrap();
    (Arc::new(schemas), root)
}

#[test]
fn catalog_exposes_the_record_by_full_name() {
    let (schemas, root) = user();
    let catalog = SingleTableCatalog::new(schemas, root).unwrap();
    assert_eq!(catalog.name(), "app.User");
    assert!(catalog.row_type("app.User").is_some());
    assert!(catalog.row_type("User").is_none());
}

#[test]
fn textual_filter_round_trip() {
    let (schemas, root) = user();
    let compiled = compile_sql_filter(schemas, root, "id > 30 AND name = 'Bob'").unwrap();
    assert_eq!(compiled.filter, col(0).gt(lit(30)).and(col(1).eq(lit("Bob"))));

    let mut ctx = EvalContext::new();
    let bob = |id| [Value::Int(id), Value::string("Bob"), Value::Null];
    assert!(compiled.predicate.evaluate(&bob(31), &mut ctx));
    assert!(!compiled.predicate.evaluate(&bob(25), &mut ctx));
}

#[test]
fn textual_filter_errors() {
    let (schemas, root) = user();
    assert!(matches!(
        compile_sql_filter(Arc::clone(&schemas), root, "nickname = 'x'"),
        Err(TableError::Plan(PlanError::UnknownColumn { .. }))
    ));
    assert!(matches!(
        compile_sql_filter(schemas, root, "created = 'soon'"),
        Err(TableError::Plan(PlanError::Compile(_)))
    ));
}
