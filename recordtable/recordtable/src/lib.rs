//! Self-describing record sources as relational tables.
//!
//! This crate re-exports the workspace: the schema model ([`core`]), schema
//! graph traversal ([`visit`]), the relational type bridge ([`types`]),
//! filter expressions ([`expr`]) and the table adapters ([`table`]). The
//! entry points most callers need are also available at the top level.

pub use recordtable_core as core;
pub use recordtable_expr as expr;
pub use recordtable_table as table;
pub use recordtable_types as types;
pub use recordtable_visit as visit;

pub use arrow;
pub use recordtable_core::{Field, Name, Record, RecordStream, SchemaId, Schemas, Value};
pub use recordtable_expr::{Expr, compile, render};
pub use recordtable_table::{
    FilterableRecordTable, FilterableTable, ProjectableFilterableRecordTable,
    ProjectableFilterableTable, ScanContext, ScannableRecordTable, ScannableTable, Table,
    TableBuilder, TableError, compile_sql_filter,
};
pub use recordtable_types::{to_relational, to_schema};
pub use recordtable_visit::{
    canonical_form, clone_schema, diff, fingerprint, format_schema, project, visit,
};
