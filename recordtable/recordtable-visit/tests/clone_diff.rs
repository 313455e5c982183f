use recordtable_core::{Field, LogicalType, Name, SchemaId, SchemaKind, Schemas, SortOrder, Value};
use recordtable_visit::{
    CopyPolicy, DiffKind, SchemaDiff, clone_into, clone_schema, diff, fingerprint,
};

/// `Node { value: int (doc), next: [null, Node], born: date }` with metadata.
fn linked_list() -> (Schemas, SchemaId) {
    let mut schemas = Schemas::new();
    let node = schemas.declare_record(Name::new("Node").with_namespace("com.acme"));
    schemas
        .annotate_pending(node, |n| {
            n.doc = Some("a list cell".to_string());
            n.props.insert("owner".to_string(), "storage".to_string());
        })
        .unwrap();
    let int = schemas.int();
    let next = schemas.nullable(node).unwrap();
    let born = schemas.date();
    schemas
        .define_record(
            node,
            vec![
                Field::new("value", int)
                    .with_default(Value::Int(0))
                    .with_order(SortOrder::Descending)
                    .with_doc("payload"),
                Field::new("next", next),
                Field::new("born", born),
            ],
        )
        .unwrap();
    (schemas, node)
}

#[test]
fn everything_copy_is_indistinguishable() {
    let (src, root) = linked_list();
    let (dst, copy) = clone_schema(&src, root, CopyPolicy::Everything).unwrap();

    assert!(diff(&src, root, &dst, copy).is_empty());
    let value = dst.field(copy, "value").unwrap();
    assert_eq!(value.default, Some(Value::Int(0)));
    assert_eq!(value.order, SortOrder::Descending);
    assert_eq!(dst[copy].doc.as_deref(), Some("a list cell"));
}

#[test]
fn essentials_copy_keeps_structure_and_logical_types() {
    let (src, root) = linked_list();
    let (dst, copy) = clone_schema(&src, root, CopyPolicy::Essentials).unwrap();

    let next = dst.field(copy, "next").unwrap().schema;
    assert_eq!(dst.non_null_branch(next), copy);
    let born = dst.field(copy, "born").unwrap().schema;
    assert_eq!(dst[born].logical_type, Some(LogicalType::Date));
    assert_eq!(dst[copy].doc, None);
    assert_eq!(
        fingerprint(&src, root).unwrap(),
        fingerprint(&dst, copy).unwrap()
    );

    let diffs = diff(&src, root, &dst, copy);
    assert!(diffs.contains(&SchemaDiff {
        path: String::new(),
        kind: DiffKind::DocMismatch {
            left: Some("a list cell".to_string()),
            right: None,
        },
    }));
    assert!(diffs.contains(&SchemaDiff {
        path: "value".to_string(),
        kind: DiffKind::DefaultMismatch {
            left: Some(Value::Int(0)),
            right: None,
        },
    }));
    assert!(diffs.iter().any(|d| matches!(
        &d.kind,
        DiffKind::PropertyMismatch { key, .. } if key == "owner"
    )));
}

#[test]
fn clone_into_existing_arena_keeps_its_nodes() {
    let (src, root) = linked_list();
    let mut dst = Schemas::new();
    let existing = dst.string();
    let copy = clone_into(&src, root, &mut dst, CopyPolicy::Essentials).unwrap();
    assert!(matches!(dst[existing].kind, SchemaKind::String));
    assert!(matches!(dst[copy].kind, SchemaKind::Record { .. }));
}

/// `User { id: int, name: string, tags: array<string> }`
fn user_v1() -> (Schemas, SchemaId) {
    let mut schemas = Schemas::new();
    let int = schemas.int();
    let string = schemas.string();
    let tags = schemas.array(string).unwrap();
    let root = schemas
        .record(
            Name::new("User"),
            vec![
                Field::new("id", int),
                Field::new("name", string),
                Field::new("tags", tags),
            ],
        )
        .unwrap();
    (schemas, root)
}

/// `User { id: long, tags: array<int>, email: string }`
fn user_v2() -> (Schemas, SchemaId) {
    let mut schemas = Schemas::new();
    let long = schemas.long();
    let int = schemas.int();
    let string = schemas.string();
    let tags = schemas.array(int).unwrap();
    let root = schemas
        .record(
            Name::new("User"),
            vec![
                Field::new("id", long),
                Field::new("tags", tags),
                Field::new("email", string),
            ],
        )
        .unwrap();
    (schemas, root)
}

#[test]
fn diff_reports_paths_in_declaration_order() {
    let (left, lroot) = user_v1();
    let (right, rroot) = user_v2();
    let diffs = diff(&left, lroot, &right, rroot);

    let rendered: Vec<String> = diffs.iter().map(ToString::to_string).collect();
    assert_eq!(
        rendered,
        [
            "<root>: field 'name' missing on the right",
            "<root>: field 'email' missing on the left",
            "id: type int != long",
            "tags[]: type string != int",
        ]
    );
}

#[test]
fn diff_of_recursive_schemas_terminates() {
    fn node(value_is_long: bool) -> (Schemas, SchemaId) {
        let mut schemas = Schemas::new();
        let node = schemas.declare_record(Name::new("Node"));
        let value = if value_is_long {
            schemas.long()
        } else {
            schemas.int()
        };
        let next = schemas.nullable(node).unwrap();
        schemas
            .define_record(node, vec![Field::new("value", value), Field::new("next", next)])
            .unwrap();
        (schemas, node)
    }

    let (left, lroot) = node(false);
    let (right, rroot) = node(true);
    let diffs = diff(&left, lroot, &right, rroot);
    assert_eq!(diffs.len(), 1);
    assert_eq!(diffs[0].path, "value");
}

#[test]
fn diff_names_fixed_and_enums() {
    let mut left = Schemas::new();
    let lhash = left.fixed(Name::new("md5"), 16);
    let lcolor = left.enumeration(Name::new("Color"), ["RED", "GREEN"]);
    let lroot = left
        .record(
            Name::new("Item"),
            vec![Field::new("hash", lhash), Field::new("color", lcolor)],
        )
        .unwrap();

    let mut right = Schemas::new();
    let rhash = right.fixed(Name::new("sha1"), 20);
    let rcolor = right.enumeration(Name::new("Color"), ["RED", "BLUE"]);
    let rroot = right
        .record(
            Name::new("Item"),
            vec![Field::new("hash", rhash), Field::new("color", rcolor)],
        )
        .unwrap();

    let kinds: Vec<DiffKind> = diff(&left, lroot, &right, rroot)
        .into_iter()
        .map(|d| d.kind)
        .collect();
    assert_eq!(
        kinds,
        [
            DiffKind::NameMismatch {
                left: "md5".to_string(),
                right: "sha1".to_string(),
            },
            DiffKind::FixedSizeMismatch {
                left: 16,
                right: 20
            },
            DiffKind::EnumSymbolsMismatch {
                left: vec!["RED".to_string(), "GREEN".to_string()],
                right: vec!["RED".to_string(), "BLUE".to_string()],
            },
        ]
    );
}
