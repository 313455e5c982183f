//! Error types for the schema model and record streams.

use crate::schema::SchemaId;

/// Error returned when building or querying a [`Schemas`](crate::Schemas) arena.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    /// A node refers to a child id that does not exist in the arena.
    #[error("unknown schema id {id}")]
    UnknownId { id: SchemaId },

    /// Two fields of one record share a name.
    #[error("duplicate field '{field}' in record '{record}'")]
    DuplicateField { record: String, field: String },

    /// A union lists another union as a direct branch.
    #[error("union {id} directly contains another union")]
    NestedUnion { id: SchemaId },

    /// Fields were supplied for a node that is not a declared, undefined record.
    #[error("schema {id} is not a record awaiting its fields")]
    NotPendingRecord { id: SchemaId },

    /// A schema was expected to be a record.
    #[error("'{path}' is a {found}, not a record")]
    NotARecord { path: String, found: &'static str },

    /// A field path did not resolve.
    #[error("unknown field '{path}'")]
    UnknownField { path: String },
}

/// Error produced by a [`RecordStream`](crate::RecordStream).
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// The underlying source failed while producing the next record.
    #[error("failed to read record: {source}")]
    Read {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The stream was used after `close`.
    #[error("record stream is closed")]
    Closed,

    /// Releasing the underlying resource failed.
    #[error("failed to close record stream: {source}")]
    Close {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl StreamError {
    pub fn read(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Read {
            source: source.into(),
        }
    }
}

/// A [`Value`](crate::Value) did not have the variant a caller asked for.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("expected {expected}, found {actual}")]
pub struct ValueTypeError {
    pub expected: String,
    pub actual: String,
}

impl ValueTypeError {
    pub fn new(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self {
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}
