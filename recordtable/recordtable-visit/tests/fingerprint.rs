use std::time::{Duration, Instant};

use recordtable_core::{Field, Name, SchemaId, Schemas};
use recordtable_visit::{EMPTY_FINGERPRINT, canonical_form, fingerprint, rabin_fingerprint};

#[test]
fn empty_input_has_empty_fingerprint() {
    assert_eq!(rabin_fingerprint(b""), EMPTY_FINGERPRINT);
    assert_ne!(rabin_fingerprint(b"\"int\""), EMPTY_FINGERPRINT);
}

#[test]
fn primitive_canonical_form_is_quoted_name() {
    let mut schemas = Schemas::new();
    let long = schemas.long();
    assert_eq!(canonical_form(&schemas, long).unwrap(), "\"long\"");
    let instant = schemas.instant();
    assert_eq!(
        canonical_form(&schemas, instant).unwrap(),
        r#"{"type":"long","logicalType":"instant"}"#
    );
}

#[test]
fn record_canonical_form_uses_full_names_and_drops_docs() {
    let mut schemas = Schemas::new();
    let int = schemas.int();
    let born = schemas.date();
    let root = schemas
        .record(
            Name::new("User").with_namespace("com.acme"),
            vec![
                Field::new("id", int).with_doc("primary key"),
                Field::new("born", born),
            ],
        )
        .unwrap();

    assert_eq!(
        canonical_form(&schemas, root).unwrap(),
        concat!(
            r#"{"name":"com.acme.User","type":"record","fields":["#,
            r#"{"name":"id","type":"int"},"#,
            r#"{"name":"born","type":{"type":"int","logicalType":"date"}}]}"#
        )
    );
}

fn linked(field: &str) -> (Schemas, SchemaId) {
    let mut schemas = Schemas::new();
    let node = schemas.declare_record(Name::new("Node"));
    let next = schemas.nullable(node).unwrap();
    schemas
        .define_record(node, vec![Field::new(field, next)])
        .unwrap();
    (schemas, node)
}

#[test]
fn back_reference_renders_by_name() {
    let (schemas, node) = linked("next");
    assert_eq!(
        canonical_form(&schemas, node).unwrap(),
        r#"{"name":"Node","type":"record","fields":[{"name":"next","type":["null","Node"]}]}"#
    );
}

#[test]
fn fingerprint_tracks_structure() {
    let (a, a_root) = linked("next");
    let (b, b_root) = linked("next");
    let (c, c_root) = linked("tail");
    assert_eq!(fingerprint(&a, a_root).unwrap(), fingerprint(&b, b_root).unwrap());
    assert_ne!(fingerprint(&a, a_root).unwrap(), fingerprint(&c, c_root).unwrap());
}

#[test]
fn enum_defined_once_then_named() {
    let mut schemas = Schemas::new();
    let color = schemas.enumeration(Name::new("Color"), ["RED", "GREEN"]);
    let root = schemas
        .record(
            Name::new("Paint"),
            vec![Field::new("inside", color), Field::new("outside", color)],
        )
        .unwrap();
    assert_eq!(
        canonical_form(&schemas, root).unwrap(),
        concat!(
            r#"{"name":"Paint","type":"record","fields":["#,
            r#"{"name":"inside","type":{"name":"Color","type":"enum","symbols":["RED","GREEN"]}},"#,
            r#"{"name":"outside","type":"Color"}]}"#
        )
    );
}

#[test]
fn deep_chain_canonical_form_is_linear() {
    const DEPTH: usize = 20_000;
    let mut schemas = Schemas::new();
    let mut id = schemas.int();
    for level in 0..DEPTH {
        id = schemas
            .record(Name::new(format!("L{level}")), vec![Field::new("x", id)])
            .unwrap();
    }

    let started = Instant::now();
    let text = canonical_form(&schemas, id).unwrap();
    assert!(started.elapsed() < Duration::from_secs(5));

    assert!(text.starts_with(r#"{"name":"L19999","type":"record","fields":[{"name":"x","type":{"name":"L19998""#));
    assert!(text.ends_with(r#"{"name":"x","type":"int"}]}}]}"#));
    assert_eq!(text.matches(r#""type":"record""#).count(), DEPTH);
    assert_eq!(fingerprint(&schemas, id).unwrap(), rabin_fingerprint(text.as_bytes()));
}
