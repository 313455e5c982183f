//! SQL text for pushed-down filters.

use std::fmt::Write;

use recordtable_types::{RelFields, RelType};

use crate::{
    compile::compile,
    error::CompileError,
    expr::{Expr, Literal},
    literal::{format_date, format_timestamp},
};

/// Render `filters` as a single SQL condition over the fields of `row_type`.
///
/// Filters are type checked first, so only expressions that would compile
/// are rendered. Each filter is wrapped in parentheses and joined with `AND`.
pub fn render(filters: &[Expr], row_type: &RelType) -> Result<String, CompileError> {
    compile(filters, row_type)?;
    let fields = row_type.fields().ok_or_else(|| CompileError::NotAStruct {
        rel_type: row_type.to_string(),
    })?;
    let mut out = String::new();
    for (i, filter) in filters.iter().enumerate() {
        if i > 0 {
            out.push_str(" AND ");
        }
        out.push('(');
        write_expr(&mut out, filter, fields);
        out.push(')');
    }
    Ok(out)
}

/// Quote an identifier, doubling embedded quotes.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn is_atomic(expr: &Expr) -> bool {
    matches!(expr, Expr::Column(_) | Expr::Literal(_) | Expr::Call { .. })
}

fn write_operand(out: &mut String, expr: &Expr, fields: &RelFields) {
    if is_atomic(expr) {
        write_expr(out, expr, fields);
    } else {
        out.push('(');
        write_expr(out, expr, fields);
        out.push(')');
    }
}

fn write_expr(out: &mut String, expr: &Expr, fields: &RelFields) {
    match expr {
        Expr::Column(column) => match fields.get(*column) {
            Some(field) => out.push_str(&quote_ident(&field.name)),
            None => {
                let _ = write!(out, "${column}");
            }
        },
        Expr::Literal(literal) => write_literal(out, literal),
        Expr::Binary { op, left, right } => {
            write_operand(out, left, fields);
            let _ = write!(out, " {} ", op.symbol());
            write_operand(out, right, fields);
        }
        Expr::Not(inner) => {
            out.push_str("NOT ");
            write_operand(out, inner, fields);
        }
        Expr::IsNull { expr, negated } => {
            write_operand(out, expr, fields);
            out.push_str(if *negated { " IS NOT NULL" } else { " IS NULL" });
        }
        Expr::InList {
            expr,
            list,
            negated,
        } => {
            write_operand(out, expr, fields);
            out.push_str(if *negated { " NOT IN (" } else { " IN (" });
            for (i, item) in list.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_operand(out, item, fields);
            }
            out.push(')');
        }
        Expr::Like {
            expr,
            pattern,
            negated,
        } => {
            write_operand(out, expr, fields);
            out.push_str(if *negated { " NOT LIKE " } else { " LIKE " });
            write_operand(out, pattern, fields);
        }
        Expr::Call { name, args } => {
            out.push_str(name);
            out.push('(');
            for (i, arg) in args.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_expr(out, arg, fields);
            }
            out.push(')');
        }
    }
}

fn write_literal(out: &mut String, literal: &Literal) {
    match literal {
        Literal::Null => out.push_str("NULL"),
        Literal::Boolean(v) => out.push_str(if *v { "TRUE" } else { "FALSE" }),
        Literal::Integer(v) => {
            let _ = write!(out, "{v}");
        }
        Literal::Double(v) => {
            let _ = write!(out, "{v:?}");
        }
        Literal::String(v) => {
            let _ = write!(out, "'{}'", v.replace('\'', "''"));
        }
        Literal::Date(v) => {
            let _ = write!(out, "CAST('{}' AS DATE)", format_date(v));
        }
        Literal::Timestamp(v) => {
            let _ = write!(out, "CAST('{}' AS TIMESTAMP)", format_timestamp(v));
        }
    }
}

