//! Type system bridge for `recordtable`.
//!
//! This crate maps between the schema model of `recordtable-core` and the
//! relational type algebra seen by a query engine:
//! 1. [`to_relational`] turns a schema node into a [`RelType`]. Logical types
//!    win over the structural mapping, nullable unions become nullable types
//!    and recursive back-references become nullable `ANY`.
//! 2. [`to_schema`] builds a schema for a [`RelType`], so that
//!    `to_relational(to_schema(t)) == t` for every supported `t`.
//!
//! Row types can also be exported as Arrow schemas with
//! [`row_type_to_arrow_schema`].
//!
//! # Typical Flow
//! ```rust
//! use recordtable_core::{Field, Name, Schemas};
//! use recordtable_types::{RelDataType, to_relational};
//!
//! let mut schemas = Schemas::new();
//! let int = schemas.int();
//! let user = schemas.record(Name::new("User"), vec![Field::new("id", int)]).unwrap();
//! let row_type = to_relational(&schemas, user).unwrap();
//! assert!(matches!(row_type.data_type, RelDataType::Struct(_)));
//! ```
mod export;
mod bridge;
mod cache;
pub mod error;
mod rel;
mod reverse;

pub use export::{rel_type_to_arrow, row_type_to_arrow_schema};
pub use bridge::{TypeMemo, to_relational, to_relational_with_memo};
pub use cache::TypeCache;
pub use error::MappingError;
pub use rel::{RelDataType, RelField, RelFields, RelType};
pub use reverse::to_schema;

pub(crate) const TIMESTAMP_TZ: &str = "+00:00";
