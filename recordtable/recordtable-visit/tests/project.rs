use recordtable_core::{Field, Name, SchemaError, SchemaId, SchemaKind, Schemas};
use recordtable_visit::project;

/// `User { id: int, name: string, address: [null, Address { city, zip }],
/// orders: array<Order { sku: string, qty: int }> }`
fn user() -> (Schemas, SchemaId) {
    let mut schemas = Schemas::new();
    let int = schemas.int();
    let string = schemas.string();
    let address = schemas
        .record(
            Name::new("Address"),
            vec![Field::new("city", string), Field::new("zip", string)],
        )
        .unwrap();
    let maybe_address = schemas.nullable(address).unwrap();
    let order = schemas
        .record(
            Name::new("Order"),
            vec![Field::new("sku", string), Field::new("qty", int)],
        )
        .unwrap();
    let orders = schemas.array(order).unwrap();
    let root = schemas
        .record(
            Name::new("User"),
            vec![
                Field::new("id", int),
                Field::new("name", string),
                Field::new("address", maybe_address),
                Field::new("orders", orders),
            ],
        )
        .unwrap();
    (schemas, root)
}

fn field_names(schemas: &Schemas, record: SchemaId) -> Vec<&str> {
    schemas[record]
        .fields()
        .iter()
        .map(|f| f.name.as_str())
        .collect()
}

#[test]
fn keeps_selected_fields_in_first_mention_order() {
    let (src, root) = user();
    let (dst, projected) = project(&src, root, &["address.city", "id", "orders.sku"]).unwrap();

    assert_eq!(field_names(&dst, projected), ["address", "id", "orders"]);

    let address = dst.field(projected, "address").unwrap().schema;
    let inner = dst.non_null_branch(address);
    assert_ne!(inner, address);
    assert_eq!(field_names(&dst, inner), ["city"]);

    let orders = dst.field(projected, "orders").unwrap().schema;
    let SchemaKind::Array(order) = dst[orders].kind else {
        panic!("orders should stay an array");
    };
    assert_eq!(field_names(&dst, order), ["sku"]);
}

#[test]
fn whole_field_mention_wins() {
    let (src, root) = user();
    let (dst, projected) = project(&src, root, &["address.city", "address"]).unwrap();
    let address = dst.field(projected, "address").unwrap().schema;
    assert_eq!(field_names(&dst, dst.non_null_branch(address)), ["city", "zip"]);
}

#[test]
fn unknown_path_is_reported() {
    let (src, root) = user();
    let err = project(&src, root, &["address.country"]).unwrap_err();
    assert_eq!(
        err,
        SchemaError::UnknownField {
            path: "address.country".to_string()
        }
    );
}

#[test]
fn path_through_scalar_is_reported() {
    let (src, root) = user();
    let err = project(&src, root, &["id.value"]).unwrap_err();
    assert_eq!(
        err,
        SchemaError::NotARecord {
            path: "id".to_string(),
            found: "int",
        }
    );
}
