use std::sync::Arc;

use recordtable_core::{LogicalType, SchemaKind, Schemas};
use recordtable_types::{
    MappingError, RelDataType, RelField, RelType, TypeCache, to_relational, to_schema,
};

fn supported_types() -> Vec<RelType> {
    let scalars = [
        RelDataType::Integer,
        RelDataType::BigInt,
        RelDataType::Varchar,
        RelDataType::Double,
        RelDataType::Float,
        RelDataType::Boolean,
        RelDataType::Date,
        RelDataType::Timestamp,
        RelDataType::Binary(None),
        RelDataType::Binary(Some(12)),
    ];
    let mut types: Vec<RelType> = scalars
        .iter()
        .flat_map(|t| [RelType::not_null(t.clone()), RelType::nullable(t.clone())])
        .collect();

    types.push(RelType::nullable(RelDataType::Array(Arc::new(
        RelType::nullable(RelDataType::Varchar),
    ))));
    types.push(RelType::not_null(RelDataType::Map {
        key: Arc::new(RelType::not_null(RelDataType::Varchar)),
        value: Arc::new(RelType::nullable(RelDataType::Date)),
    }));
    types.push(RelType::not_null(RelDataType::Struct(
        vec![
            RelField::new("id", RelDataType::BigInt, false),
            RelField::new("email", RelDataType::Varchar, true),
            RelField::new(
                "address",
                RelDataType::Struct(
                    vec![
                        RelField::new("city", RelDataType::Varchar, false),
                        RelField::new("since", RelDataType::Timestamp, true),
                    ]
                    .into(),
                ),
                true,
            ),
        ]
        .into(),
    )));
    types
}

#[test]
fn every_supported_type_survives_a_round_trip() {
    for rel_type in supported_types() {
        let mut schemas = Schemas::new();
        let id = to_schema(&rel_type, &mut schemas).unwrap();
        assert_eq!(to_relational(&schemas, id).unwrap(), rel_type, "{rel_type}");
    }
}

#[test]
fn dates_and_timestamps_carry_logical_types() {
    let mut schemas = Schemas::new();
    let date = to_schema(&RelType::not_null(RelDataType::Date), &mut schemas).unwrap();
    let ts = to_schema(&RelType::not_null(RelDataType::Timestamp), &mut schemas).unwrap();
    assert!(matches!(schemas[date].kind, SchemaKind::String));
    assert_eq!(schemas[date].logical_type, Some(LogicalType::Date));
    assert!(matches!(schemas[ts].kind, SchemaKind::Long));
    assert_eq!(schemas[ts].logical_type, Some(LogicalType::Instant));
}

#[test]
fn structs_and_fixed_get_generated_names() {
    let mut schemas = Schemas::new();
    let row = RelType::not_null(RelDataType::Struct(
        vec![RelField::new("hash", RelDataType::Binary(Some(16)), false)].into(),
    ));
    let id = to_schema(&row, &mut schemas).unwrap();
    assert_eq!(schemas[id].kind.name().unwrap().fullname(), "record_0");
    let hash = schemas.field(id, "hash").unwrap().schema;
    assert_eq!(
        schemas[hash].kind,
        SchemaKind::Fixed {
            name: recordtable_core::Name::new("fixed_16"),
            size: 16
        }
    );
}

#[test]
fn multiset_becomes_array() {
    let mut schemas = Schemas::new();
    let bag = RelType::not_null(RelDataType::Multiset(Arc::new(RelType::not_null(
        RelDataType::Integer,
    ))));
    let id = to_schema(&bag, &mut schemas).unwrap();
    assert!(matches!(schemas[id].kind, SchemaKind::Array(_)));
}

#[test]
fn unmappable_types_are_rejected() {
    for rel_type in [
        RelType::not_null(RelDataType::Symbol),
        RelType::nullable(RelDataType::Any),
        RelType::not_null(RelDataType::Map {
            key: Arc::new(RelType::not_null(RelDataType::Integer)),
            value: Arc::new(RelType::not_null(RelDataType::Integer)),
        }),
    ] {
        let mut schemas = Schemas::new();
        assert!(matches!(
            to_schema(&rel_type, &mut schemas),
            Err(MappingError::UnsupportedRelType { .. })
        ));
    }
}

#[test]
fn cache_hits_structurally_equal_schemas_across_arenas() {
    let rel_type = supported_types().pop().unwrap();
    let mut cache = TypeCache::new();

    let mut first = Schemas::new();
    let a = to_schema(&rel_type, &mut first).unwrap();
    let mut second = Schemas::new();
    let b = to_schema(&rel_type, &mut second).unwrap();

    assert_eq!(cache.get_or_convert(&first, a).unwrap(), rel_type);
    assert_eq!(cache.get_or_convert(&second, b).unwrap(), rel_type);
    assert_eq!(cache.len(), 1);
}
