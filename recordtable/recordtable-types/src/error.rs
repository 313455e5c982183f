use recordtable_core::{SchemaError, SchemaId};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MappingError {
    #[error("union {id} of [{}] is not supported; only [null, T] is", branches.join(", "))]
    UnsupportedUnion { id: SchemaId, branches: Vec<String> },
    #[error("bare null schema {id} has no relational type")]
    UnsupportedNull { id: SchemaId },
    #[error("relational type {rel_type} has no schema equivalent")]
    UnsupportedRelType { rel_type: String },
    #[error("row type must be a struct, found {rel_type}")]
    NotAStruct { rel_type: String },
    #[error("schema {id} was not resolved")]
    Unresolved { id: SchemaId },
    #[error(transparent)]
    Schema(#[from] SchemaError),
}
