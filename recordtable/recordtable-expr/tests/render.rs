use chrono::NaiveDate;
use recordtable_expr::{CompileError, call, col, lit, render};
use recordtable_types::{RelDataType, RelField, RelType};

fn row_type() -> RelType {
    RelType::not_null(RelDataType::Struct(
        vec![
            RelField::new("age", RelDataType::Integer, true),
            RelField::new("full \"name\"", RelDataType::Varchar, true),
            RelField::new("created", RelDataType::Date, true),
            RelField::new("seen", RelDataType::Timestamp, true),
        ]
        .into(),
    ))
}

#[test]
fn filters_are_parenthesized_and_joined() {
    let text = render(
        &[col(0).gt(lit(30)), col(1).eq(lit("O'Brien")).or(col(1).is_null())],
        &row_type(),
    )
    .unwrap();
    assert_eq!(
        text,
        r#"("age" > 30) AND (("full ""name""" = 'O''Brien') OR ("full ""name""" IS NULL))"#
    );
}

#[test]
fn dates_render_as_casts() {
    let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    let seen = date.and_hms_opt(12, 30, 0).unwrap().and_utc();
    let text = render(
        &[col(2).eq(lit(date)), col(3).lt(lit(seen))],
        &row_type(),
    )
    .unwrap();
    assert_eq!(
        text,
        "(\"created\" = CAST('2024-03-01' AS DATE)) AND \
         (\"seen\" < CAST('2024-03-01 12:30:00.000' AS TIMESTAMP))"
    );
}

#[test]
fn lists_negation_and_patterns() {
    let text = render(
        &[
            col(0).in_list(vec![lit(1), lit(2)], true),
            col(1).like(lit("B%")).not(),
        ],
        &row_type(),
    )
    .unwrap();
    assert_eq!(
        text,
        r#"("age" NOT IN (1, 2)) AND (NOT ("full ""name""" LIKE 'B%'))"#
    );
}

#[test]
fn rendering_rejects_what_cannot_compile() {
    assert_eq!(
        render(&[call("f", vec![]).eq(lit(1))], &row_type()).unwrap_err(),
        CompileError::UnsupportedFunction {
            name: "f".to_string()
        }
    );
}
