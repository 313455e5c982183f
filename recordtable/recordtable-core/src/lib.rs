//! Schema model and record primitives for `recordtable`.
//!
//! This crate provides the self-describing, possibly recursive schema graph
//! ([`Schemas`] / [`SchemaNode`]), the [`Value`] and [`Record`] row
//! representation, and the closeable [`RecordStream`] contract that record
//! sources implement.

mod error;
mod record;
mod schema;
mod stream;
mod value;

pub use error::{SchemaError, StreamError, ValueTypeError};
pub use record::Record;
pub use schema::{Field, LogicalType, Name, SchemaId, SchemaKind, SchemaNode, Schemas, SortOrder};
pub use stream::{RecordStream, VecRecordStream};
pub use value::Value;
