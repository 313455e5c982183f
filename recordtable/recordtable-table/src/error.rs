//! Error types for table adapters and enumerators.

use arrow::error::ArrowError;
use recordtable_core::{SchemaError, SchemaId, StreamError, ValueTypeError};
use recordtable_expr::{CompileError, PlanError};
use recordtable_types::MappingError;

use crate::enumerator::EnumeratorState;

/// Errors produced while building tables or scanning them.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    /// The table root schema is not a record.
    #[error("table root {id} is a {found}, not a record")]
    NotARecord { id: SchemaId, found: &'static str },

    /// The row schema has no relational type.
    #[error(transparent)]
    Mapping(#[from] MappingError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// The record supplier or its stream failed.
    #[error(transparent)]
    Stream(#[from] StreamError),

    /// A value did not match its column's schema.
    #[error("failed to decode column '{column}': {source}")]
    Decode {
        column: String,
        #[source]
        source: ValueTypeError,
    },

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error(transparent)]
    Arrow(#[from] ArrowError),

    /// An Arrow column type has no builder.
    #[error("unsupported Arrow data type {data_type}")]
    UnsupportedArrowType { data_type: String },

    /// The scan's cancellation flag was set.
    #[error("scan was cancelled")]
    Cancelled,

    /// The scan ran past its deadline.
    #[error("scan deadline exceeded")]
    DeadlineExceeded,

    /// The enumerator was used in a state that does not allow the operation.
    #[error("cannot {operation} an enumerator that is {state}")]
    InvalidState {
        state: EnumeratorState,
        operation: &'static str,
    },

    /// A projected column does not exist in the row type.
    #[error("projected column {column} is out of range for a row of {width} columns")]
    ProjectionOutOfRange { column: usize, width: usize },
}
