//! Arena-based schema model.

mod arena;
mod types;

pub use arena::Schemas;
pub use types::{Field, LogicalType, Name, SchemaId, SchemaKind, SchemaNode, SortOrder};
