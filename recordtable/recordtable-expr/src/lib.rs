//! Filter expressions and predicate compilation for `recordtable`.
//!
//! A query engine hands over filters as [`Expr`] trees whose columns are
//! positions in a row type. They are consumed in one of three ways:
//! - [`compile`] type checks a conjunction of filters and produces a
//!   [`RowPredicate`], a flat postfix program evaluated per row with SQL
//!   three-valued logic.
//! - [`render`] produces the equivalent SQL condition text.
//! - [`plan_sql`] goes the other way and turns `SELECT * FROM t WHERE ...`
//!   into a [`LogicalPlan`] carrying a validated filter.
//!
//! ```rust
//! use recordtable_core::Value;
//! use recordtable_expr::{EvalContext, col, compile, lit};
//! use recordtable_types::{RelDataType, RelField, RelType};
//!
//! let row_type = RelType::not_null(RelDataType::Struct(
//!     vec![RelField::new("age", RelDataType::Integer, false)].into(),
//! ));
//! let predicate = compile(&[col(0).gt(lit(30))], &row_type).unwrap();
//! let mut ctx = EvalContext::new();
//! assert!(predicate.evaluate(&[Value::Int(31)], &mut ctx));
//! assert!(!predicate.evaluate(&[Value::Int(25)], &mut ctx));
//! ```
mod compile;
pub mod error;
mod expr;
mod literal;
mod plan;
mod render;

pub use compile::{EvalContext, RowPredicate, compile};
pub use error::{CompileError, PlanError};
pub use expr::{BinaryOp, Expr, Literal, call, col, lit, null};
pub use literal::{format_date, format_timestamp, parse_date, parse_timestamp};
pub use plan::{Catalog, LogicalPlan, plan_sql};
pub use render::{quote_ident, render};
