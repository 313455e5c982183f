use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use recordtable_core::{Field, LogicalType, Name, SchemaKind, SchemaNode, Schemas};
use recordtable_types::{
    MappingError, RelDataType, RelField, RelType, TypeMemo, to_relational, to_relational_with_memo,
};

#[test]
fn user_record_maps_field_by_field() {
    let mut schemas = Schemas::new();
    let int = schemas.int();
    let string = schemas.string();
    let created = schemas.date();
    let user = schemas
        .record(
            Name::new("User"),
            vec![
                Field::new("id", int),
                Field::new("name", string),
                Field::new("created", created),
            ],
        )
        .unwrap();

    let row_type = to_relational(&schemas, user).unwrap();
    assert_eq!(
        row_type,
        RelType::not_null(RelDataType::Struct(
            vec![
                RelField::new("id", RelDataType::Integer, false),
                RelField::new("name", RelDataType::Varchar, false),
                RelField::new("created", RelDataType::Date, false),
            ]
            .into()
        ))
    );
    assert_eq!(
        row_type.to_string(),
        "STRUCT(id INTEGER NOT NULL, name VARCHAR NOT NULL, created DATE NOT NULL) NOT NULL"
    );
}

#[test]
fn nullable_union_in_either_order() {
    let mut schemas = Schemas::new();
    let null = schemas.null();
    let string = schemas.string();
    let null_first = schemas.union(vec![null, string]).unwrap();
    let null_last = schemas.union(vec![string, null]).unwrap();

    let expected = RelType::nullable(RelDataType::Varchar);
    assert_eq!(to_relational(&schemas, null_first).unwrap(), expected);
    assert_eq!(to_relational(&schemas, null_last).unwrap(), expected);
}

#[test]
fn wider_union_is_unsupported() {
    let mut schemas = Schemas::new();
    let null = schemas.null();
    let string = schemas.string();
    let int = schemas.int();
    let union = schemas.union(vec![null, string, int]).unwrap();

    let err = to_relational(&schemas, union).unwrap_err();
    assert_eq!(
        err,
        MappingError::UnsupportedUnion {
            id: union,
            branches: vec!["null".into(), "string".into(), "int".into()],
        }
    );
}

#[test]
fn bare_null_is_unsupported() {
    let mut schemas = Schemas::new();
    let null = schemas.null();
    assert!(matches!(
        to_relational(&schemas, null),
        Err(MappingError::UnsupportedNull { .. })
    ));

    let record = schemas
        .record(Name::new("Holder"), vec![Field::new("nothing", null)])
        .unwrap();
    assert!(matches!(
        to_relational(&schemas, record),
        Err(MappingError::UnsupportedNull { .. })
    ));
}

#[test]
fn structural_mapping_of_scalars_and_containers() {
    let mut schemas = Schemas::new();
    let cases = [
        (schemas.boolean(), RelDataType::Boolean),
        (schemas.long(), RelDataType::BigInt),
        (schemas.float(), RelDataType::Float),
        (schemas.double(), RelDataType::Double),
        (schemas.bytes(), RelDataType::Binary(None)),
        (schemas.fixed(Name::new("md5"), 16), RelDataType::Binary(Some(16))),
        (
            schemas.enumeration(Name::new("Color"), ["RED"]),
            RelDataType::Symbol,
        ),
        (schemas.instant(), RelDataType::Timestamp),
        (schemas.decimal(10, 2), RelDataType::Double),
    ];
    for (id, expected) in cases {
        assert_eq!(to_relational(&schemas, id).unwrap().data_type, expected);
    }

    let int = schemas.int();
    let ints = schemas.array(int).unwrap();
    let by_name = schemas.map(int).unwrap();
    assert_eq!(
        to_relational(&schemas, ints).unwrap().data_type,
        RelDataType::Array(Arc::new(RelType::not_null(RelDataType::Integer)))
    );
    assert_eq!(
        to_relational(&schemas, by_name).unwrap().data_type,
        RelDataType::Map {
            key: Arc::new(RelType::not_null(RelDataType::Varchar)),
            value: Arc::new(RelType::not_null(RelDataType::Integer)),
        }
    );
}

#[test]
fn other_logical_type_falls_back_to_structure() {
    let mut schemas = Schemas::new();
    let uuid = schemas
        .add(
            SchemaNode::new(SchemaKind::String)
                .with_logical_type(LogicalType::Other("uuid".to_string())),
        )
        .unwrap();
    let iso_date = schemas
        .add(SchemaNode::new(SchemaKind::String).with_logical_type(LogicalType::Date))
        .unwrap();
    assert_eq!(
        to_relational(&schemas, uuid).unwrap().data_type,
        RelDataType::Varchar
    );
    assert_eq!(
        to_relational(&schemas, iso_date).unwrap().data_type,
        RelDataType::Date
    );
}

#[test]
fn recursive_reference_maps_to_nullable_any() {
    let mut schemas = Schemas::new();
    let node = schemas.declare_record(Name::new("Node"));
    let int = schemas.int();
    let next = schemas.nullable(node).unwrap();
    let children = schemas.map(node).unwrap();
    schemas
        .define_record(
            node,
            vec![
                Field::new("value", int),
                Field::new("next", next),
                Field::new("children", children),
            ],
        )
        .unwrap();

    let row_type = to_relational(&schemas, node).unwrap();
    let fields = row_type.fields().unwrap();
    assert_eq!(fields[1].rel_type, RelType::nullable(RelDataType::Any));
    assert_eq!(
        fields[2].rel_type.data_type,
        RelDataType::Map {
            key: Arc::new(RelType::not_null(RelDataType::Varchar)),
            value: Arc::new(RelType::nullable(RelDataType::Any)),
        }
    );
}

#[test]
fn memo_records_every_node_and_is_reused() {
    let mut schemas = Schemas::new();
    let int = schemas.int();
    let ints = schemas.array(int).unwrap();
    let root = schemas
        .record(Name::new("Row"), vec![Field::new("ints", ints)])
        .unwrap();

    let mut memo = TypeMemo::new();
    let first = to_relational_with_memo(&schemas, root, &mut memo).unwrap();
    assert!(memo.contains_key(&int));
    assert!(memo.contains_key(&ints));
    assert!(memo.contains_key(&root));

    let second = to_relational_with_memo(&schemas, root, &mut memo).unwrap();
    assert_eq!(first, second);
    assert_eq!(memo.len(), 3);
}

#[test]
fn cyclic_entries_do_not_outlive_the_call() {
    let mut schemas = Schemas::new();
    let node = schemas.declare_record(Name::new("Node"));
    let children = schemas.array(node).unwrap();
    let int = schemas.int();
    schemas
        .define_record(
            node,
            vec![Field::new("value", int), Field::new("children", children)],
        )
        .unwrap();

    let mut memo = TypeMemo::new();
    to_relational_with_memo(&schemas, node, &mut memo).unwrap();
    assert!(memo.contains_key(&int));
    assert!(!memo.contains_key(&children));
    assert!(!memo.contains_key(&node));

    let shared = to_relational_with_memo(&schemas, children, &mut memo).unwrap();
    let fresh = to_relational(&schemas, children).unwrap();
    assert_eq!(shared, fresh);
    let RelDataType::Array(elem) = &fresh.data_type else {
        panic!("expected an array, got {fresh}");
    };
    assert!(matches!(elem.data_type, RelDataType::Struct(_)));
}

#[test]
fn deep_chain_converts_in_linear_time() {
    const DEPTH: usize = 20_000;
    let mut schemas = Schemas::new();
    let mut id = schemas.int();
    for level in 0..DEPTH {
        id = schemas
            .record(Name::new(format!("Level{level}")), vec![Field::new("inner", id)])
            .unwrap();
    }

    let started = Instant::now();
    let row_type = to_relational(&schemas, id).unwrap();
    assert!(started.elapsed() < Duration::from_secs(5));

    let mut depth = 0;
    let mut current = &row_type;
    while let Some(fields) = current.fields() {
        assert_eq!(fields.len(), 1);
        current = &fields[0].rel_type;
        depth += 1;
    }
    assert_eq!(depth, DEPTH);
    assert_eq!(current.data_type, RelDataType::Integer);

    let copy = row_type.clone();
    drop(row_type);
    assert!(copy.fields().is_some());
}
