use std::collections::HashMap;

use chrono::NaiveDate;
use recordtable_core::Value;
use recordtable_expr::{
    Catalog, CompileError, EvalContext, Expr, Literal, LogicalPlan, PlanError, col, compile, lit,
    plan_sql,
};
use recordtable_types::{RelDataType, RelField, RelType};

struct Tables(HashMap<String, RelType>);

impl Catalog for Tables {
    fn row_type(&self, table: &str) -> Option<RelType> {
        self.0.get(table).cloned()
    }
}

fn catalog() -> Tables {
    let users = RelType::not_null(RelDataType::Struct(
        vec![
            RelField::new("id", RelDataType::Integer, false),
            RelField::new("Name", RelDataType::Varchar, true),
            RelField::new("created", RelDataType::Date, true),
        ]
        .into(),
    ));
    Tables(HashMap::from([("User".to_string(), users)]))
}

#[test]
fn select_without_where_is_a_scan() {
    let plan = plan_sql(r#"SELECT * FROM "User""#, &catalog()).unwrap();
    assert!(matches!(plan, LogicalPlan::Scan { .. }));
    assert_eq!(plan.table(), "User");
    assert!(plan.filter().is_none());
}

#[test]
fn where_clause_resolves_columns() {
    let plan = plan_sql(
        r#"SELECT * FROM "User" WHERE id > 30 AND name = 'Bob'"#,
        &catalog(),
    )
    .unwrap();
    assert_eq!(
        plan.filter(),
        Some(&col(0).gt(lit(30)).and(col(1).eq(lit("Bob"))))
    );
}

#[test]
fn between_and_negative_numbers() {
    let plan = plan_sql(
        r#"SELECT * FROM "User" WHERE id BETWEEN -5 AND 2.5"#,
        &catalog(),
    )
    .unwrap();
    assert_eq!(
        plan.filter(),
        Some(&col(0).gt_eq(lit(-5i64)).and(col(0).lt_eq(lit(2.5))))
    );
}

#[test]
fn cast_literals_become_dates() {
    let plan = plan_sql(
        r#"SELECT * FROM "User" WHERE created >= CAST('2024-01-01' AS DATE)"#,
        &catalog(),
    )
    .unwrap();
    let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    assert_eq!(
        plan.filter(),
        Some(&col(2).gt_eq(Expr::Literal(Literal::Date(date))))
    );

    let predicate = compile(std::slice::from_ref(plan.filter().unwrap()), plan.row_type()).unwrap();
    let row = [
        Value::Int(1),
        Value::Null,
        Value::Date(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()),
    ];
    assert!(predicate.evaluate(&row, &mut EvalContext::new()));
}

#[test]
fn planning_errors() {
    let catalog = catalog();
    assert!(matches!(
        plan_sql("SELECT * FROM missing", &catalog),
        Err(PlanError::UnknownTable { name }) if name == "missing"
    ));
    assert!(matches!(
        plan_sql(r#"SELECT * FROM "User" WHERE age > 1"#, &catalog),
        Err(PlanError::UnknownColumn { name }) if name == "age"
    ));
    assert!(matches!(
        plan_sql(r#"SELECT id FROM "User""#, &catalog),
        Err(PlanError::Unsupported(_))
    ));
    assert!(matches!(
        plan_sql(r#"SELECT * FROM "User" ORDER BY id"#, &catalog),
        Err(PlanError::Unsupported(_))
    ));
    assert!(matches!(
        plan_sql(r#"SELECT * FROM "User" WHERE id = 'one'"#, &catalog),
        Err(PlanError::Compile(CompileError::TypeMismatch { .. }))
    ));
    assert!(matches!(
        plan_sql("SELEC * FROM x", &catalog),
        Err(PlanError::Parse(_))
    ));
}
