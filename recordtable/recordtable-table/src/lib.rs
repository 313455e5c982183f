//! Table adapters over record sources for `recordtable`.
//!
//! A record schema plus a [`RecordSupplier`] becomes a table a query engine
//! can scan. Tables come in three tiers:
//! 1. [`ScannableRecordTable`] for full scans.
//! 2. [`FilterableRecordTable`], which takes over the filters it can compile.
//! 3. [`ProjectableFilterableRecordTable`], which also returns only the
//!    requested columns.
//!
//! Every scan returns a [`RecordEnumerator`]: a cursor that decodes logical
//! types, applies whatever the supplier did not, honours cancellation and
//! deadlines from the [`ScanContext`], and can be drained into Arrow
//! `RecordBatch`es.
//!
//! # Typical Flow
//! ```rust
//! use std::sync::Arc;
//!
//! use recordtable_core::{Field, Name, Record, Schemas, Value};
//! use recordtable_expr::{col, lit};
//! use recordtable_table::{FilterableTable, ScanContext, TableBuilder};
//!
//! let mut schemas = Schemas::new();
//! let int = schemas.int();
//! let user = schemas.record(Name::new("User"), vec![Field::new("age", int)]).unwrap();
//! let records = vec![
//!     Record::new(user, vec![Value::Int(25)]),
//!     Record::new(user, vec![Value::Int(31)]),
//! ];
//! let table = TableBuilder::new(Arc::new(schemas), user)
//!     .with_records(records)
//!     .build_filterable()
//!     .unwrap();
//!
//! let mut filters = vec![col(0).gt(lit(30))];
//! let rows: Vec<_> = table
//!     .scan_filtered(&ScanContext::new(), &mut filters)
//!     .unwrap()
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//! assert!(filters.is_empty());
//! assert_eq!(rows, vec![vec![Value::Int(31)]]);
//! ```
mod batch;
mod context;
mod decode;
mod enumerator;
pub mod error;
mod supplier;
mod table;
mod text;

pub use batch::rows_to_record_batch;
pub use context::{CancelFlag, ScanContext};
pub use decode::RowDecoder;
pub use enumerator::{EnumeratorState, RecordEnumerator};
pub use error::TableError;
pub use supplier::{EmptySupplier, MemorySupplier, OpenedStream, RecordSupplier, ScanRequest};
pub use table::{
    FilterableRecordTable, FilterableTable, ProjectableFilterableRecordTable,
    ProjectableFilterableTable, ScannableRecordTable, ScannableTable, Table, TableBuilder,
};
pub use text::{SingleTableCatalog, SqlFilter, compile_sql_filter};
